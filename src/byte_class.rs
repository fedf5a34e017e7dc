pub(crate) const TAG_CONT: u8 = 0b1000_0000;
pub(crate) const TAG_TWO_B: u8 = 0b1100_0000;
pub(crate) const TAG_THREE_B: u8 = 0b1110_0000;
pub(crate) const TAG_FOUR_B: u8 = 0b1111_0000;

pub(crate) const CONT_PREFIX_MASK: u8 = 0b1100_0000;
pub(crate) const CONT_VALUE_MASK: u8 = 0b0011_1111;

/// The role a single byte can play in a UTF-8 sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteClass {
    /// `0x00..=0x7F`, a complete sequence on its own.
    Ascii,
    /// `0x80..=0xBF`, `10xxxxxx`.
    Continuation,
    /// `0xC2..=0xDF`, starts a 2-byte sequence.
    Lead2,
    /// `0xE0..=0xEF`, starts a 3-byte sequence.
    Lead3,
    /// `0xF0..=0xF4`, starts a 4-byte sequence.
    Lead4,
    /// `0xC0`, `0xC1` and `0xF5..=0xFF`, never valid anywhere.
    Invalid,
}

impl ByteClass {
    /// Total length of the sequence this byte starts, or `None` if it cannot
    /// start one.
    pub fn sequence_len(self) -> Option<usize> {
        match self {
            ByteClass::Ascii => Some(1),
            ByteClass::Lead2 => Some(2),
            ByteClass::Lead3 => Some(3),
            ByteClass::Lead4 => Some(4),
            ByteClass::Continuation | ByteClass::Invalid => None,
        }
    }

    /// Payload bits carried by a lead byte of this class.
    pub(crate) fn lead_payload(self, byte: u8) -> u32 {
        match self {
            ByteClass::Ascii => u32::from(byte),
            ByteClass::Lead2 => u32::from(byte & !TAG_THREE_B),
            ByteClass::Lead3 => u32::from(byte & !TAG_FOUR_B),
            ByteClass::Lead4 => u32::from(byte & 0b0000_0111),
            ByteClass::Continuation | ByteClass::Invalid => 0,
        }
    }
}

/// Classifies a single byte.
#[inline]
pub fn classify(byte: u8) -> ByteClass {
    match byte {
        0x00..=0x7F => ByteClass::Ascii,
        0x80..=0xBF => ByteClass::Continuation,
        0xC2..=0xDF => ByteClass::Lead2,
        0xE0..=0xEF => ByteClass::Lead3,
        0xF0..=0xF4 => ByteClass::Lead4,
        0xC0 | 0xC1 | 0xF5..=0xFF => ByteClass::Invalid,
    }
}

/// Whether `byte` has the `10xxxxxx` shape.
#[inline]
pub fn is_continuation(byte: u8) -> bool {
    (byte & CONT_PREFIX_MASK) == TAG_CONT
}

#[inline]
pub(crate) fn acc_cont_byte(value: u32, byte: u8) -> u32 {
    (value << 6) | u32::from(byte & CONT_VALUE_MASK)
}

#[cfg(test)]
mod tests {
    use super::{classify, is_continuation, ByteClass};

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(ByteClass::Ascii, classify(0x00));
        assert_eq!(ByteClass::Ascii, classify(0x7F));
        assert_eq!(ByteClass::Continuation, classify(0x80));
        assert_eq!(ByteClass::Continuation, classify(0xBF));
        assert_eq!(ByteClass::Invalid, classify(0xC0));
        assert_eq!(ByteClass::Invalid, classify(0xC1));
        assert_eq!(ByteClass::Lead2, classify(0xC2));
        assert_eq!(ByteClass::Lead2, classify(0xDF));
        assert_eq!(ByteClass::Lead3, classify(0xE0));
        assert_eq!(ByteClass::Lead3, classify(0xEF));
        assert_eq!(ByteClass::Lead4, classify(0xF0));
        assert_eq!(ByteClass::Lead4, classify(0xF4));
        assert_eq!(ByteClass::Invalid, classify(0xF5));
        assert_eq!(ByteClass::Invalid, classify(0xFF));
    }

    #[test]
    fn test_continuation_agrees_with_class() {
        for b in 0..=u8::MAX {
            assert_eq!(is_continuation(b), classify(b) == ByteClass::Continuation);
        }
    }

    #[test]
    fn test_sequence_len() {
        assert_eq!(Some(1), classify(b'a').sequence_len());
        assert_eq!(Some(3), classify(0xE4).sequence_len());
        assert_eq!(None, classify(0xBF).sequence_len());
        assert_eq!(None, classify(0xF8).sequence_len());
    }
}

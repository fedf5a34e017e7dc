use crate::byte_class::{acc_cont_byte, classify, is_continuation, ByteClass};
use crate::error::{Utf8Error, Utf8ErrorKind};
use std::str;

const CONT_LOWER: u8 = 0x80;
const CONT_UPPER: u8 = 0xBF;

const MIN_TWO_B: u32 = 0x80;
const MIN_THREE_B: u32 = 0x800;
const MIN_FOUR_B: u32 = 0x1_0000;

const SURROGATES: std::ops::RangeInclusive<u32> = 0xD800..=0xDFFF;
const MAX_SCALAR: u32 = 0x10_FFFF;

/// A byte-at-a-time UTF-8 validator and decoder.
///
/// The validator is a finite automaton. It starts in the ground state, and
/// input is well-formed exactly when every byte is accepted and the automaton
/// is back in the ground state once input ends.
///
/// After an error the automaton returns to the ground state. The byte that
/// triggered the error counts as consumed, except a byte that cut a sequence
/// short without being a continuation byte: it is left unconsumed, and
/// pushing it again decodes it as the start of the next sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utf8Validator {
    /// Continuation bytes still expected for the current sequence.
    pending: u8,
    /// Bytes of the current sequence accepted so far.
    accepted: u8,
    value: u32,
    /// Smallest value the current sequence length may encode.
    min: u32,
    /// Allowed range for the next continuation byte.
    lower: u8,
    upper: u8,
    /// Offset of the current sequence's lead byte.
    start: usize,
    offset: usize,
}

impl Default for Utf8Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Utf8Validator {
    /// Creates a validator in the ground state at offset zero.
    pub const fn new() -> Self {
        Utf8Validator {
            pending: 0,
            accepted: 0,
            value: 0,
            min: 0,
            lower: CONT_LOWER,
            upper: CONT_UPPER,
            start: 0,
            offset: 0,
        }
    }

    /// Returns to the ground state and rewinds the offset to zero.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether no sequence is in progress.
    pub fn is_ground(&self) -> bool {
        self.pending == 0
    }

    /// Number of bytes pushed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn to_ground(&mut self) {
        self.pending = 0;
        self.accepted = 0;
        self.value = 0;
        self.min = 0;
        self.lower = CONT_LOWER;
        self.upper = CONT_UPPER;
    }

    fn fail(&mut self, kind: Utf8ErrorKind, offset: usize, error_len: u8) -> Utf8Error {
        self.to_ground();
        Utf8Error::new(kind, offset, error_len)
    }

    fn begin(&mut self, byte: u8, class: ByteClass, at: usize) {
        let (pending, min) = match class {
            ByteClass::Lead2 => (1, MIN_TWO_B),
            ByteClass::Lead3 => (2, MIN_THREE_B),
            _ => (3, MIN_FOUR_B),
        };
        // Only the first continuation byte is narrowed.
        let (lower, upper) = match byte {
            0xE0 => (0xA0, CONT_UPPER),
            0xED => (CONT_LOWER, 0x9F),
            0xF0 => (0x90, CONT_UPPER),
            0xF4 => (CONT_LOWER, 0x8F),
            _ => (CONT_LOWER, CONT_UPPER),
        };
        self.pending = pending;
        self.accepted = 1;
        self.value = class.lead_payload(byte);
        self.min = min;
        self.lower = lower;
        self.upper = upper;
        self.start = at;
    }

    /// Feeds one byte.
    ///
    /// Returns `Ok(Some(ch))` when `byte` completes a scalar value and
    /// `Ok(None)` while a multi-byte sequence is still in progress.
    pub fn push(&mut self, byte: u8) -> Result<Option<char>, Utf8Error> {
        let at = self.offset;
        self.offset += 1;

        if self.pending == 0 {
            let class = classify(byte);
            return match class {
                ByteClass::Ascii => Ok(Some(char::from(byte))),
                ByteClass::Continuation => {
                    Err(self.fail(Utf8ErrorKind::UnexpectedContinuation(byte), at, 1))
                }
                ByteClass::Invalid => Err(self.fail(Utf8ErrorKind::InvalidLeadByte(byte), at, 1)),
                ByteClass::Lead2 | ByteClass::Lead3 | ByteClass::Lead4 => {
                    self.begin(byte, class, at);
                    Ok(None)
                }
            };
        }

        let start = self.start;
        if !is_continuation(byte) {
            self.offset = at;
            let accepted = self.accepted;
            return Err(self.fail(Utf8ErrorKind::InvalidContinuation(byte), start, accepted));
        }
        if byte < self.lower {
            return Err(self.fail(Utf8ErrorKind::Overlong, start, 1));
        }
        if byte > self.upper {
            let kind = if self.min == MIN_THREE_B {
                Utf8ErrorKind::Surrogate
            } else {
                Utf8ErrorKind::OutOfRange
            };
            return Err(self.fail(kind, start, 1));
        }

        self.value = acc_cont_byte(self.value, byte);
        self.accepted += 1;
        self.pending -= 1;
        self.lower = CONT_LOWER;
        self.upper = CONT_UPPER;
        if self.pending != 0 {
            return Ok(None);
        }

        let value = self.value;
        let accepted = self.accepted;
        if value < self.min {
            return Err(self.fail(Utf8ErrorKind::Overlong, start, accepted));
        }
        if SURROGATES.contains(&value) {
            return Err(self.fail(Utf8ErrorKind::Surrogate, start, accepted));
        }
        if value > MAX_SCALAR {
            return Err(self.fail(Utf8ErrorKind::OutOfRange, start, accepted));
        }
        self.to_ground();
        match char::from_u32(value) {
            Some(ch) => Ok(Some(ch)),
            None => Err(Utf8Error::new(Utf8ErrorKind::OutOfRange, start, accepted)),
        }
    }

    /// Signals end of input.
    ///
    /// Fails with [`Utf8ErrorKind::Truncated`] at the lead byte's offset if a
    /// sequence is still in progress.
    pub fn finish(&mut self) -> Result<(), Utf8Error> {
        if self.pending == 0 {
            return Ok(());
        }
        let start = self.start;
        Err(self.fail(Utf8ErrorKind::Truncated, start, 0))
    }
}

fn run_validation(bytes: &[u8]) -> Result<(), Utf8Error> {
    let mut validator = Utf8Validator::new();
    let mut rest = bytes;
    loop {
        if validator.is_ground() {
            let ascii_len = rest.iter().take_while(|b| b.is_ascii()).count();
            validator.offset += ascii_len;
            rest = &rest[ascii_len..];
        }
        match *rest {
            [] => break,
            [head, ref tail @ ..] => {
                validator.push(head)?;
                rest = tail;
            }
        }
    }
    validator.finish()
}

/// Whether `bytes` is well-formed UTF-8. The empty sequence is valid.
pub fn validate(bytes: &[u8]) -> bool {
    run_validation(bytes).is_ok()
}

/// Decodes `bytes` into scalar values, or reports the first violation.
pub fn decode(bytes: &[u8]) -> Result<Vec<char>, Utf8Error> {
    let mut validator = Utf8Validator::new();
    let mut chars = Vec::with_capacity(bytes.len());
    for &byte in bytes {
        if let Some(ch) = validator.push(byte)? {
            chars.push(ch);
        }
    }
    validator.finish()?;
    Ok(chars)
}

/// Validates `bytes` and borrows them as a string slice.
pub fn decode_str(bytes: &[u8]) -> Result<&str, Utf8Error> {
    run_validation(bytes)?;
    // SAFETY: `run_validation` accepts exactly the well-formed UTF-8 sequences.
    Ok(unsafe { str::from_utf8_unchecked(bytes) })
}

#[cfg(test)]
mod tests {
    use super::{decode, decode_str, validate, Utf8Validator};
    use crate::error::Utf8ErrorKind;
    use quickcheck_macros::quickcheck;
    use rstest::rstest;

    #[test]
    fn test_empty_is_valid() {
        assert!(validate(b""));
        assert_eq!(Ok(vec![]), decode(b""));
    }

    #[test]
    fn test_decode_cjk() {
        let bytes = [0xE4, 0xB8, 0xAD];
        assert!(validate(&bytes));
        assert_eq!(Ok(vec!['\u{4E2D}']), decode(&bytes));
        assert_eq!(Ok("中"), decode_str(&bytes));
    }

    #[test]
    fn test_decode_mixed() {
        let text = "a\u{E9}\u{20AC}\u{1F600}z";
        assert_eq!(
            Ok(text.chars().collect::<Vec<_>>()),
            decode(text.as_bytes())
        );
    }

    #[rstest]
    #[case::overlong_nul(&[0xC0, 0x80], 0, Utf8ErrorKind::InvalidLeadByte(0xC0))]
    #[case::overlong_three(&[0xE0, 0x80, 0x80], 0, Utf8ErrorKind::Overlong)]
    #[case::overlong_four(&[0xF0, 0x80, 0x80, 0x80], 0, Utf8ErrorKind::Overlong)]
    #[case::surrogate(&[0xED, 0xA0, 0x80], 0, Utf8ErrorKind::Surrogate)]
    #[case::above_max(&[0xF4, 0x90, 0x80, 0x80], 0, Utf8ErrorKind::OutOfRange)]
    #[case::five_byte_lead(&[b'a', 0xF8, 0x88, 0x80, 0x80, 0x80], 1, Utf8ErrorKind::InvalidLeadByte(0xF8))]
    #[case::stray_continuation(&[b'a', b'b', 0x80], 2, Utf8ErrorKind::UnexpectedContinuation(0x80))]
    #[case::missing_continuation(&[0xE4, 0xB8, b'A'], 0, Utf8ErrorKind::InvalidContinuation(b'A'))]
    #[case::truncated_three(&[b'x', 0xE4, 0xB8], 1, Utf8ErrorKind::Truncated)]
    #[case::truncated_four(&[0xF0, 0x9F, 0x98], 0, Utf8ErrorKind::Truncated)]
    fn test_rejects(
        #[case] bytes: &[u8],
        #[case] offset: usize,
        #[case] kind: Utf8ErrorKind,
    ) {
        assert!(!validate(bytes));
        let err = decode(bytes).unwrap_err();
        assert_eq!(offset, err.offset());
        assert_eq!(kind, err.kind());
        assert_eq!(Err(err), decode_str(bytes));
    }

    #[test]
    fn test_streaming_state() {
        let mut validator = Utf8Validator::new();
        assert_eq!(Ok(None), validator.push(0xE4));
        assert!(!validator.is_ground());
        assert_eq!(Ok(None), validator.push(0xB8));
        assert_eq!(Ok(Some('中')), validator.push(0xAD));
        assert!(validator.is_ground());
        assert_eq!(3, validator.offset());
        assert_eq!(Ok(()), validator.finish());

        assert_eq!(Ok(None), validator.push(0xC3));
        let err = validator.finish().unwrap_err();
        assert_eq!(Utf8ErrorKind::Truncated, err.kind());
        assert_eq!(3, err.offset());
        assert!(validator.is_ground());
    }

    #[test]
    fn test_error_recovers_to_ground() {
        let mut validator = Utf8Validator::new();
        assert_eq!(Ok(None), validator.push(0xE0));
        assert!(validator.push(0x80).is_err());
        assert!(validator.is_ground());
        assert_eq!(2, validator.offset());
        assert_eq!(Ok(Some('b')), validator.push(b'b'));
    }

    #[test]
    fn test_interrupting_byte_is_not_consumed() {
        let mut validator = Utf8Validator::new();
        assert_eq!(Ok(None), validator.push(0xC3));
        let err = validator.push(b'a').unwrap_err();
        assert_eq!(Utf8ErrorKind::InvalidContinuation(b'a'), err.kind());
        assert_eq!(0, err.offset());
        assert!(validator.is_ground());
        assert_eq!(1, validator.offset());
        assert_eq!(Ok(Some('a')), validator.push(b'a'));
        assert_eq!(2, validator.offset());

        // A new lead byte starts the next sequence once pushed again.
        assert_eq!(Ok(None), validator.push(0xE4));
        assert!(validator.push(0xC3).is_err());
        assert_eq!(Ok(None), validator.push(0xC3));
        assert_eq!(Ok(Some('\u{E9}')), validator.push(0xA9));
        assert_eq!(5, validator.offset());
    }

    #[quickcheck]
    fn agrees_with_std(bytes: Vec<u8>) -> bool {
        match (std::str::from_utf8(&bytes), decode(&bytes)) {
            (Ok(s), Ok(chars)) => s.chars().eq(chars.into_iter()),
            (Err(std_err), Err(err)) => {
                std_err.valid_up_to() == err.offset() && std_err.error_len() == err.error_len()
            }
            _ => false,
        }
    }

    #[quickcheck]
    fn accepts_encoded_strings(s: String) -> bool {
        validate(s.as_bytes()) && decode_str(s.as_bytes()) == Ok(s.as_str())
    }
}

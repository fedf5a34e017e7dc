use crate::detect::Endianness;

/// The encoding a byte-order mark announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BomEncoding {
    /// UTF-8.
    Utf8,
    /// UTF-16 in the given byte order.
    Utf16(Endianness),
    /// UTF-32 in the given byte order.
    Utf32(Endianness),
}

/// A byte-order mark signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bom {
    /// The signature bytes.
    pub bytes: &'static [u8],
    /// What the signature announces.
    pub encoding: BomEncoding,
    /// Whether this is a BOM that was itself mis-decoded and re-encoded as
    /// UTF-8 (the surrounding text is UTF-8).
    pub mojibake: bool,
}

impl Bom {
    /// Length of the signature in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the signature has no bytes. Never true for [`BOMS`].
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

const fn bom(bytes: &'static [u8], encoding: BomEncoding, mojibake: bool) -> Bom {
    Bom {
        bytes,
        encoding,
        mojibake,
    }
}

/// Known signatures, longest first so that a prefix never shadows a longer mark.
pub static BOMS: [Bom; 8] = [
    // "ï»¿" after a Windows-1252 round trip
    bom(b"\xC3\xAF\xC2\xBB\xC2\xBF", BomEncoding::Utf8, true),
    bom(b"\x00\x00\xFE\xFF", BomEncoding::Utf32(Endianness::Big), false),
    bom(b"\xFF\xFE\x00\x00", BomEncoding::Utf32(Endianness::Little), false),
    // "þÿ" and "ÿþ"
    bom(b"\xC3\xBE\xC3\xBF", BomEncoding::Utf8, true),
    bom(b"\xC3\xBF\xC3\xBE", BomEncoding::Utf8, true),
    bom(b"\xEF\xBB\xBF", BomEncoding::Utf8, false),
    bom(b"\xFE\xFF", BomEncoding::Utf16(Endianness::Big), false),
    bom(b"\xFF\xFE", BomEncoding::Utf16(Endianness::Little), false),
];

/// Finds the byte-order mark `bytes` starts with.
pub fn sniff(bytes: &[u8]) -> Option<&'static Bom> {
    BOMS.iter().find(|bom| bytes.starts_with(bom.bytes))
}

/// Whether `bytes` starts with a byte-order mark.
pub fn has_bom(bytes: &[u8]) -> bool {
    sniff(bytes).is_some()
}

/// `bytes` without its leading byte-order mark, if any.
pub fn strip_bom(bytes: &[u8]) -> &[u8] {
    match sniff(bytes) {
        Some(bom) => &bytes[bom.len()..],
        None => bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::{has_bom, sniff, strip_bom, BomEncoding, BOMS};
    use crate::detect::Endianness;

    #[test]
    fn test_sniff_prefers_longest() {
        let utf32 = sniff(b"\xFF\xFE\x00\x00h\x00\x00\x00").unwrap();
        assert_eq!(BomEncoding::Utf32(Endianness::Little), utf32.encoding);
        let utf16 = sniff(b"\xFF\xFEh\x00").unwrap();
        assert_eq!(BomEncoding::Utf16(Endianness::Little), utf16.encoding);
        assert_eq!(2, utf16.len());
    }

    #[test]
    fn test_strip_bom() {
        assert_eq!(b"abc", strip_bom(b"\xEF\xBB\xBFabc"));
        assert_eq!(b"abc", strip_bom(b"\xC3\xAF\xC2\xBB\xC2\xBFabc"));
        assert_eq!(b"abc", strip_bom(b"abc"));
        assert_eq!(b"", strip_bom(b"\xFE\xFF"));
    }

    #[test]
    fn test_has_bom() {
        assert!(has_bom(b"\xFE\xFF\x00a"));
        assert!(!has_bom(b"\xFE"));
        assert!(!has_bom(b""));
        assert!(sniff(b"\xC3\xBF\xC3\xBEx").unwrap().mojibake);
    }

    #[test]
    fn test_signatures_are_longest_first() {
        assert!(BOMS.iter().all(|bom| !bom.is_empty()));
        assert!(BOMS.windows(2).all(|w| w[0].len() >= w[1].len()));
    }
}

use crate::bom::{self, BomEncoding};
use crate::detect::{self, EncodingGuess};
use crate::error::ConvertError;
use crate::utf8;
use std::borrow::Cow;
use std::str;

fn strip_matching_bom(bytes: &[u8], matches: impl Fn(BomEncoding) -> bool) -> &[u8] {
    match bom::sniff(bytes) {
        Some(bom) if matches(bom.encoding) => &bytes[bom.len()..],
        _ => bytes,
    }
}

/// Decodes `bytes` as the encoding `guess` names, dropping a leading
/// byte-order mark that agrees with it.
pub fn decode_as(bytes: &[u8], guess: EncodingGuess) -> Result<Cow<'_, str>, ConvertError> {
    let unmappable = ConvertError::Unmappable {
        encoding: guess.name(),
    };
    match guess {
        EncodingGuess::Ascii | EncodingGuess::Utf8 => {
            let body = strip_matching_bom(bytes, |found| found == BomEncoding::Utf8);
            Ok(Cow::Borrowed(utf8::decode_str(body)?))
        }
        EncodingGuess::Utf16(endian) => {
            let body = strip_matching_bom(bytes, |found| found == BomEncoding::Utf16(endian));
            detect::decode_utf16(body, endian)
                .map(Cow::Owned)
                .ok_or(unmappable)
        }
        EncodingGuess::Utf32(endian) => {
            let body = strip_matching_bom(bytes, |found| found == BomEncoding::Utf32(endian));
            detect::decode_utf32(body, endian)
                .map(Cow::Owned)
                .ok_or(unmappable)
        }
        EncodingGuess::Legacy(encoding) => encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .ok_or(unmappable),
        EncodingGuess::Unknown => Err(ConvertError::UnknownEncoding),
    }
}

/// Detects the encoding of `bytes` and decodes them.
pub fn to_utf8(bytes: &[u8]) -> Result<Cow<'_, str>, ConvertError> {
    decode_as(bytes, detect::detect(bytes))
}

/// Repairs ill-formed UTF-8.
///
/// Each maximal ill-formed subpart is replaced with `replacement`, or dropped
/// when `replacement` is `None`. Well-formed input is borrowed unchanged.
pub fn clean_utf8(bytes: &[u8], replacement: Option<char>) -> Cow<'_, str> {
    let mut rest = bytes;
    let mut out = String::new();
    loop {
        let err = match utf8::decode_str(rest) {
            Ok(valid) if rest.len() == bytes.len() => return Cow::Borrowed(valid),
            Ok(valid) => {
                out.push_str(valid);
                return Cow::Owned(out);
            }
            Err(err) => err,
        };
        let (valid, after) = rest.split_at(err.offset());
        // SAFETY: everything before the error offset has been validated.
        out.push_str(unsafe { str::from_utf8_unchecked(valid) });
        if let Some(ch) = replacement {
            out.push(ch);
        }
        let skip = err.error_len().unwrap_or(after.len());
        rest = &after[skip..];
    }
}

#[cfg(test)]
mod tests {
    use super::{clean_utf8, decode_as, to_utf8};
    use crate::detect::{EncodingGuess, Endianness};
    use crate::error::{ConvertError, Utf8ErrorKind};
    use quickcheck_macros::quickcheck;
    use std::borrow::Cow;

    #[test]
    fn test_to_utf8() {
        assert_eq!(Ok(Cow::Borrowed("plain")), to_utf8(b"plain"));
        assert_eq!("caf\u{E9}", to_utf8(b"\xEF\xBB\xBFcaf\xC3\xA9").unwrap());
        assert_eq!("hi", to_utf8(b"\xFF\xFEh\x00i\x00").unwrap());
        assert_eq!("hello", to_utf8(b"h\x00e\x00l\x00l\x00o\x00").unwrap());
        assert_eq!("hi", to_utf8(b"\x00\x00\xFE\xFF\x00\x00\x00h\x00\x00\x00i").unwrap());
        assert_eq!("caf\u{E9}", to_utf8(b"caf\xE9").unwrap());
    }

    #[test]
    fn test_decode_as_reports_errors() {
        let err = decode_as(b"ab\xC3", EncodingGuess::Utf8).unwrap_err();
        match err {
            ConvertError::Malformed(err) => {
                assert_eq!(Utf8ErrorKind::Truncated, err.kind());
                assert_eq!(2, err.offset());
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(
            Err(ConvertError::Unmappable {
                encoding: "UTF-16LE"
            }),
            decode_as(b"abc", EncodingGuess::Utf16(Endianness::Little))
        );
        assert_eq!(
            Err(ConvertError::UnknownEncoding),
            decode_as(b"abc", EncodingGuess::Unknown)
        );
    }

    #[test]
    fn test_bom_of_other_encoding_is_kept() {
        // A Windows-1252 text may legitimately start with "ÿþ".
        let decoded = decode_as(b"\xFF\xFEx", EncodingGuess::Legacy(encoding_rs::WINDOWS_1252));
        assert_eq!("\u{FF}\u{FE}x", decoded.unwrap());
    }

    #[test]
    fn test_clean_utf8() {
        assert!(matches!(clean_utf8(b"fine", None), Cow::Borrowed("fine")));
        assert_eq!("ab", clean_utf8(b"a\xFFb", None));
        assert_eq!("a\u{FFFD}b", clean_utf8(b"a\xFFb", Some('\u{FFFD}')));
        assert_eq!("a???", clean_utf8(b"a\xE4\xB8\xC0\x80", Some('?')));
        assert_eq!("x?", clean_utf8(b"x\xF0\x9F", Some('?')));
    }

    #[quickcheck]
    fn clean_matches_std_lossy(bytes: Vec<u8>) -> bool {
        clean_utf8(&bytes, Some('\u{FFFD}')) == String::from_utf8_lossy(&bytes)
    }
}

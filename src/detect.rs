use crate::bom::{self, BomEncoding};
use crate::utf8;
use encoding_rs::Encoding;
use tracing::trace;

/// Byte order of a multi-byte encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Endianness {
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
}

/// The outcome of encoding detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingGuess {
    /// Printable 7-bit text.
    Ascii,
    /// Well-formed UTF-8.
    Utf8,
    /// UTF-16 in the given byte order.
    Utf16(Endianness),
    /// UTF-32 in the given byte order.
    Utf32(Endianness),
    /// A legacy encoding that reproduces the input exactly.
    Legacy(&'static Encoding),
    /// No confident guess.
    Unknown,
}

impl EncodingGuess {
    /// A conventional label for the guess.
    pub fn name(&self) -> &'static str {
        match self {
            EncodingGuess::Ascii => "ASCII",
            EncodingGuess::Utf8 => "UTF-8",
            EncodingGuess::Utf16(Endianness::Little) => "UTF-16LE",
            EncodingGuess::Utf16(Endianness::Big) => "UTF-16BE",
            EncodingGuess::Utf32(Endianness::Little) => "UTF-32LE",
            EncodingGuess::Utf32(Endianness::Big) => "UTF-32BE",
            EncodingGuess::Legacy(encoding) => encoding.name(),
            EncodingGuess::Unknown => "unknown",
        }
    }
}

impl From<BomEncoding> for EncodingGuess {
    fn from(encoding: BomEncoding) -> Self {
        match encoding {
            BomEncoding::Utf8 => EncodingGuess::Utf8,
            BomEncoding::Utf16(endian) => EncodingGuess::Utf16(endian),
            BomEncoding::Utf32(endian) => EncodingGuess::Utf32(endian),
        }
    }
}

/// Legacy encodings tried, in order, when nothing else matched.
///
/// `windows-1252` (which also serves the `ISO-8859-1` label) maps every byte,
/// so it accepts any input that reaches it. Callers that expect CJK text
/// should put those encodings first with [`Detector::with_candidates`].
pub fn default_legacy_candidates() -> Vec<&'static Encoding> {
    vec![
        encoding_rs::WINDOWS_1252,
        encoding_rs::ISO_8859_2,
        encoding_rs::ISO_8859_15,
        encoding_rs::WINDOWS_1250,
        encoding_rs::WINDOWS_1251,
        encoding_rs::KOI8_R,
        encoding_rs::WINDOWS_874,
        encoding_rs::SHIFT_JIS,
        encoding_rs::EUC_JP,
        encoding_rs::GB18030,
        encoding_rs::BIG5,
        encoding_rs::EUC_KR,
    ]
}

static BINARY_MAGIC: [&[u8]; 8] = [
    b"\x89PNG\r\n\x1A\n",
    b"\xFF\xD8\xFF",
    b"GIF87a",
    b"GIF89a",
    b"%PDF-",
    b"PK\x03\x04",
    b"\x1F\x8B",
    b"\x7FELF",
];

/// C0 controls other than tab, line feed, vertical tab, form feed, carriage
/// return and escape, plus DEL.
#[inline]
pub fn is_disallowed_control(byte: u8) -> bool {
    matches!(byte, 0x00..=0x08 | 0x0E..=0x1A | 0x1C..=0x1F | 0x7F)
}

/// Whether every byte is ASCII and none is a disallowed control character.
pub fn is_ascii_text(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| b.is_ascii() && !is_disallowed_control(b))
}

/// Whether `bytes` starts with the signature of a common binary file format.
pub fn has_binary_magic(bytes: &[u8]) -> bool {
    BINARY_MAGIC.iter().any(|magic| bytes.starts_with(magic))
}

/// Whether `bytes` is more plausibly binary data than text.
///
/// True for input containing NUL, starting with a well-known binary file
/// signature, or made of more than 10% disallowed control bytes.
pub fn looks_binary(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }
    if bytes.contains(&0) || has_binary_magic(bytes) {
        return true;
    }
    let controls = bytes.iter().filter(|&&b| is_disallowed_control(b)).count();
    controls * 10 > bytes.len()
}

/// Encoding detection with a configurable legacy fallback list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detector {
    /// Encodings tried in order by the round-trip fallback.
    pub legacy_candidates: Vec<&'static Encoding>,
}

impl Default for Detector {
    fn default() -> Self {
        Detector {
            legacy_candidates: default_legacy_candidates(),
        }
    }
}

impl Detector {
    /// A detector whose fallback tries `candidates` in order.
    pub fn with_candidates(candidates: &[&'static Encoding]) -> Self {
        Detector {
            legacy_candidates: candidates.to_vec(),
        }
    }

    /// Guesses the encoding of `bytes`. The first matching heuristic wins:
    ///
    /// 1. a byte-order mark,
    /// 2. printable ASCII,
    /// 3. well-formed UTF-8 that does not look binary,
    /// 4. for binary-looking input without a binary file signature, UTF-32
    ///    and then UTF-16 round-trip votes,
    /// 5. otherwise the first legacy candidate that round-trips exactly.
    pub fn detect(&self, bytes: &[u8]) -> EncodingGuess {
        if let Some(bom) = bom::sniff(bytes) {
            trace!(len = bom.len(), mojibake = bom.mojibake, "byte-order mark found");
            return bom.encoding.into();
        }
        if is_ascii_text(bytes) {
            return EncodingGuess::Ascii;
        }
        let binary = looks_binary(bytes);
        if !binary && utf8::validate(bytes) {
            return EncodingGuess::Utf8;
        }
        if binary {
            if has_binary_magic(bytes) {
                trace!("binary file signature");
                return EncodingGuess::Unknown;
            }
            let guess = detect_wide(bytes).unwrap_or(EncodingGuess::Unknown);
            trace!(guess = guess.name(), "binary-looking input");
            return guess;
        }
        match self.detect_legacy(bytes) {
            Some(encoding) => EncodingGuess::Legacy(encoding),
            None => {
                trace!(len = bytes.len(), "no legacy candidate round-trips");
                EncodingGuess::Unknown
            }
        }
    }

    fn detect_legacy(&self, bytes: &[u8]) -> Option<&'static Encoding> {
        self.legacy_candidates
            .iter()
            .copied()
            .find(|&encoding| round_trips(encoding, bytes))
    }
}

/// Guesses the encoding of `bytes` with the default [`Detector`].
///
/// Detection never fails; ambiguous input yields [`EncodingGuess::Unknown`].
pub fn detect(bytes: &[u8]) -> EncodingGuess {
    Detector::default().detect(bytes)
}

fn round_trips(encoding: &'static Encoding, bytes: &[u8]) -> bool {
    let decoded = match encoding.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(decoded) => decoded,
        None => return false,
    };
    let (encoded, _, had_errors) = encoding.encode(&decoded);
    !had_errors && encoded[..] == *bytes
}

pub(crate) fn decode_utf16(bytes: &[u8], endian: Endianness) -> Option<String> {
    let encoding = match endian {
        Endianness::Little => encoding_rs::UTF_16LE,
        Endianness::Big => encoding_rs::UTF_16BE,
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|decoded| decoded.into_owned())
}

pub(crate) fn encode_utf16(s: &str, endian: Endianness) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len() * 2);
    for unit in s.encode_utf16() {
        match endian {
            Endianness::Little => out.extend_from_slice(&unit.to_le_bytes()),
            Endianness::Big => out.extend_from_slice(&unit.to_be_bytes()),
        }
    }
    out
}

pub(crate) fn decode_utf32(bytes: &[u8], endian: Endianness) -> Option<String> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    bytes
        .chunks_exact(4)
        .map(|unit| {
            let unit = [unit[0], unit[1], unit[2], unit[3]];
            let code = match endian {
                Endianness::Little => u32::from_le_bytes(unit),
                Endianness::Big => u32::from_be_bytes(unit),
            };
            char::from_u32(code)
        })
        .collect()
}

pub(crate) fn encode_utf32(s: &str, endian: Endianness) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len() * 4);
    for ch in s.chars() {
        match endian {
            Endianness::Little => out.extend_from_slice(&u32::from(ch).to_le_bytes()),
            Endianness::Big => out.extend_from_slice(&u32::from(ch).to_be_bytes()),
        }
    }
    out
}

type WideDecode = fn(&[u8], Endianness) -> Option<String>;
type WideEncode = fn(&str, Endianness) -> Vec<u8>;

/// Decodes, re-encodes and re-decodes `bytes`; if that is lossless, counts
/// the distinct decoded characters that also occur as raw bytes in the input.
fn round_trip_votes(
    bytes: &[u8],
    endian: Endianness,
    decode: WideDecode,
    encode: WideEncode,
) -> usize {
    let first = match decode(bytes, endian) {
        Some(first) if !first.is_empty() => first,
        _ => return 0,
    };
    let reencoded = encode(&first, endian);
    match decode(&reencoded, endian) {
        Some(second) if second == first => {}
        _ => return 0,
    }

    let mut byte_seen = [false; 256];
    for &b in bytes {
        byte_seen[usize::from(b)] = true;
    }
    let mut distinct = first.chars().collect::<Vec<_>>();
    distinct.sort_unstable();
    distinct.dedup();
    distinct
        .into_iter()
        .filter(|&ch| u8::try_from(u32::from(ch)).map_or(false, |b| byte_seen[usize::from(b)]))
        .count()
}

fn vote(bytes: &[u8], decode: WideDecode, encode: WideEncode) -> Option<Endianness> {
    let little = round_trip_votes(bytes, Endianness::Little, decode, encode);
    let big = round_trip_votes(bytes, Endianness::Big, decode, encode);
    trace!(little, big, "byte order votes");
    match little.cmp(&big) {
        std::cmp::Ordering::Greater => Some(Endianness::Little),
        std::cmp::Ordering::Less => Some(Endianness::Big),
        std::cmp::Ordering::Equal => None,
    }
}

fn detect_wide(bytes: &[u8]) -> Option<EncodingGuess> {
    if let Some(endian) = vote(bytes, decode_utf32, encode_utf32) {
        return Some(EncodingGuess::Utf32(endian));
    }
    vote(bytes, decode_utf16, encode_utf16).map(EncodingGuess::Utf16)
}

use crate::byte_class::{classify, ByteClass, TAG_CONT, TAG_FOUR_B, TAG_THREE_B, TAG_TWO_B};
use crate::error::{CodepointError, Utf8Error, Utf8ErrorKind};
use crate::utf8::Utf8Validator;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Longest UTF-8 encoding of a scalar value.
pub const MAX_UTF8_LEN: usize = 4;

/// The UTF-8 bytes of a single scalar value.
pub type EncodedScalar = SmallVec<[u8; MAX_UTF8_LEN]>;

const END_ONE_B: u32 = 0x80;
const END_TWO_B: u32 = 0x800;
const END_THREE_B: u32 = 0x1_0000;
const END_FOUR_B: u32 = 0x11_0000;

/// Checks that `code` is a Unicode scalar value.
pub fn scalar(code: u32) -> Result<char, CodepointError> {
    match code {
        0xD800..=0xDFFF => Err(CodepointError::Surrogate(code)),
        _ if code >= END_FOUR_B => Err(CodepointError::OutOfRange(code)),
        _ => char::from_u32(code).ok_or(CodepointError::OutOfRange(code)),
    }
}

/// Number of bytes the UTF-8 encoding of `code` takes.
pub fn len_utf8(code: u32) -> Result<usize, CodepointError> {
    let code = u32::from(scalar(code)?);
    Ok(if code < END_ONE_B {
        1
    } else if code < END_TWO_B {
        2
    } else if code < END_THREE_B {
        3
    } else {
        4
    })
}

/// Encodes `code` into the front of `buf`, returning the number of bytes written.
///
/// # Panics
///
/// Panics if `buf` is too short. Four bytes are always enough.
pub fn encode_into(code: u32, buf: &mut [u8]) -> Result<usize, CodepointError> {
    let len = len_utf8(code)?;
    assert!(
        buf.len() >= len,
        "encode_into: {} bytes needed, the buffer has {}",
        len,
        buf.len()
    );
    match (len, &mut buf[..]) {
        (1, [a, ..]) => {
            *a = code as u8;
        }
        (2, [a, b, ..]) => {
            *a = (code >> 6 & 0x1F) as u8 | TAG_TWO_B;
            *b = (code & 0x3F) as u8 | TAG_CONT;
        }
        (3, [a, b, c, ..]) => {
            *a = (code >> 12 & 0x0F) as u8 | TAG_THREE_B;
            *b = (code >> 6 & 0x3F) as u8 | TAG_CONT;
            *c = (code & 0x3F) as u8 | TAG_CONT;
        }
        (4, [a, b, c, d, ..]) => {
            *a = (code >> 18 & 0x07) as u8 | TAG_FOUR_B;
            *b = (code >> 12 & 0x3F) as u8 | TAG_CONT;
            *c = (code >> 6 & 0x3F) as u8 | TAG_CONT;
            *d = (code & 0x3F) as u8 | TAG_CONT;
        }
        _ => unreachable!(),
    };
    Ok(len)
}

/// Encodes `code` as UTF-8, rejecting surrogates and values above `U+10FFFF`.
pub fn encode(code: u32) -> Result<EncodedScalar, CodepointError> {
    let mut buf = [0u8; MAX_UTF8_LEN];
    let len = encode_into(code, &mut buf)?;
    Ok(SmallVec::from_slice(&buf[..len]))
}

/// Encodes a `char` as UTF-8. Never fails.
pub fn encode_char(ch: char) -> EncodedScalar {
    let mut buf = [0u8; MAX_UTF8_LEN];
    let len = ch.encode_utf8(&mut buf).len();
    SmallVec::from_slice(&buf[..len])
}

/// Decodes the scalar value starting at `offset`.
///
/// Returns the value and the number of bytes it occupies. Errors carry
/// absolute offsets into `bytes`; reading past the end of `bytes` is reported
/// as [`Utf8ErrorKind::Truncated`].
pub fn decode(bytes: &[u8], offset: usize) -> Result<(char, usize), Utf8Error> {
    let rest = match bytes.get(offset..) {
        Some(rest) if !rest.is_empty() => rest,
        _ => return Err(Utf8Error::new(Utf8ErrorKind::Truncated, offset, 0)),
    };
    let len = match classify(rest[0]).sequence_len() {
        Some(len) => len,
        None => {
            let kind = if classify(rest[0]) == ByteClass::Continuation {
                Utf8ErrorKind::UnexpectedContinuation(rest[0])
            } else {
                Utf8ErrorKind::InvalidLeadByte(rest[0])
            };
            return Err(Utf8Error::new(kind, offset, 1));
        }
    };

    let mut validator = Utf8Validator::new();
    for &byte in rest.iter().take(len) {
        match validator.push(byte) {
            Ok(Some(ch)) => return Ok((ch, len)),
            Ok(None) => {}
            Err(err) => return Err(rebase(err, offset)),
        }
    }
    match validator.finish() {
        Err(err) => Err(rebase(err, offset)),
        Ok(()) => Err(Utf8Error::new(Utf8ErrorKind::Truncated, offset, 0)),
    }
}

fn rebase(err: Utf8Error, offset: usize) -> Utf8Error {
    Utf8Error {
        offset: err.offset + offset,
        ..err
    }
}

/// A codepoint to byte mapping for a legacy single-byte encoding.
///
/// ASCII always maps to itself; only the upper half needs entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyTable {
    name: &'static str,
    map: HashMap<char, u8>,
}

impl LegacyTable {
    /// Builds a table from `(codepoint, byte)` pairs.
    pub fn from_pairs<I>(name: &'static str, pairs: I) -> Self
    where
        I: IntoIterator<Item = (char, u8)>,
    {
        LegacyTable {
            name,
            map: pairs.into_iter().collect(),
        }
    }

    /// Derives the table of a single-byte `encoding` by decoding every byte
    /// of its upper half. Returns `None` for multi-byte encodings.
    pub fn from_encoding(encoding: &'static encoding_rs::Encoding) -> Option<Self> {
        if !encoding.is_single_byte() {
            return None;
        }
        let mut map = HashMap::with_capacity(128);
        for byte in 0x80..=0xFFu8 {
            let buf = [byte];
            let decoded = encoding.decode_without_bom_handling_and_without_replacement(&buf);
            if let Some(ch) = decoded.and_then(|s| s.chars().next()) {
                map.entry(ch).or_insert(byte);
            }
        }
        Some(LegacyTable {
            name: encoding.name(),
            map,
        })
    }

    /// Name of the encoding this table describes.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Byte for `ch`, if the encoding can represent it.
    pub fn get(&self, ch: char) -> Option<u8> {
        if ch.is_ascii() {
            return Some(ch as u8);
        }
        self.map.get(&ch).copied()
    }

    /// Encodes a whole string, mapping absent codepoints to `unknown`.
    pub fn encode_str(&self, s: &str, unknown: u8) -> Vec<u8> {
        s.chars().map(|ch| encode_legacy(ch, self, unknown)).collect()
    }
}

/// Encodes a scalar value into a single-byte encoding; codepoints the table
/// lacks become `unknown`.
pub fn encode_legacy(ch: char, table: &LegacyTable, unknown: u8) -> u8 {
    table.get(ch).unwrap_or(unknown)
}

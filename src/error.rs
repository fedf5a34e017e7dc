use thiserror::Error;

/// The way a byte sequence fails to be well-formed UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Utf8ErrorKind {
    /// A byte that can never start a sequence (`0xC0`, `0xC1`, `0xF5..=0xFF`).
    InvalidLeadByte(u8),
    /// A continuation byte with no lead byte before it.
    UnexpectedContinuation(u8),
    /// A lead byte followed by something other than a continuation byte.
    InvalidContinuation(u8),
    /// A sequence encoding a value that a shorter sequence could represent.
    Overlong,
    /// A sequence encoding a UTF-16 surrogate (`U+D800..=U+DFFF`).
    Surrogate,
    /// A sequence encoding a value above `U+10FFFF`.
    OutOfRange,
    /// Input ended in the middle of a sequence.
    Truncated,
}

impl std::fmt::Display for Utf8ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Utf8ErrorKind::InvalidLeadByte(b) => write!(f, "invalid lead byte 0x{:02X}", b),
            Utf8ErrorKind::UnexpectedContinuation(b) => {
                write!(f, "unexpected continuation byte 0x{:02X}", b)
            }
            Utf8ErrorKind::InvalidContinuation(b) => {
                write!(f, "expected continuation byte, found 0x{:02X}", b)
            }
            Utf8ErrorKind::Overlong => write!(f, "overlong encoding"),
            Utf8ErrorKind::Surrogate => write!(f, "encoded surrogate"),
            Utf8ErrorKind::OutOfRange => write!(f, "codepoint beyond U+10FFFF"),
            Utf8ErrorKind::Truncated => write!(f, "truncated sequence"),
        }
    }
}

/// A byte sequence is not well-formed UTF-8.
///
/// The offset points at the first byte of the offending sequence, so
/// `&input[..offset]` is always valid UTF-8.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[error("{kind} at byte offset {offset}")]
pub struct Utf8Error {
    pub(crate) kind: Utf8ErrorKind,
    pub(crate) offset: usize,
    pub(crate) error_len: u8,
}

impl Utf8Error {
    pub(crate) fn new(kind: Utf8ErrorKind, offset: usize, error_len: u8) -> Self {
        Utf8Error {
            kind,
            offset,
            error_len,
        }
    }

    /// What went wrong.
    pub fn kind(&self) -> Utf8ErrorKind {
        self.kind
    }

    /// Offset of the first byte of the ill-formed sequence.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the maximal ill-formed subpart starting at `offset`, or
    /// `None` when input ended before the sequence was complete.
    pub fn error_len(&self) -> Option<usize> {
        match self.kind {
            Utf8ErrorKind::Truncated => None,
            _ => Some(usize::from(self.error_len)),
        }
    }
}

/// A `u32` is not a Unicode scalar value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodepointError {
    /// The value lies in the surrogate range `0xD800..=0xDFFF`.
    #[error("U+{0:04X} is a surrogate")]
    Surrogate(u32),
    /// The value is above `0x10FFFF`.
    #[error("0x{0:X} is beyond U+10FFFF")]
    OutOfRange(u32),
}

/// Failure to turn bytes into a `str`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// The bytes are not valid in the encoding they were decoded as.
    #[error("malformed input: {0}")]
    Malformed(#[from] Utf8Error),
    /// Detection could not settle on an encoding.
    #[error("unable to detect the input encoding")]
    UnknownEncoding,
    /// The bytes contain sequences that are not valid in `encoding`.
    #[error("input is not valid {encoding}")]
    Unmappable {
        /// Name of the encoding that was tried.
        encoding: &'static str,
    },
}

/// A substitution table entry was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Keys must contain at least one character.
    #[error("empty substitution key")]
    EmptyKey,
    /// Keys made only of ASCII are never looked up.
    #[error("substitution key {0:?} is pure ASCII")]
    AsciiKey(String),
    /// Keys are limited to the longest match window.
    #[error("substitution key {0:?} is longer than the match window")]
    KeyTooLong(String),
    /// Replacements must be ASCII.
    #[error("replacement {replacement:?} for {key:?} is not ASCII")]
    NonAsciiReplacement {
        /// The rejected key.
        key: String,
        /// The offending replacement.
        replacement: String,
    },
    /// A data file line could not be parsed.
    #[error("malformed data line {line}: {text:?}")]
    MalformedLine {
        /// One-based line number.
        line: usize,
        /// The raw line.
        text: String,
    },
}

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(missing_docs, missing_debug_implementations)]
//! Byte-level Unicode handling and ASCII transliteration.
//!
//! The crate is organized as a pipeline over raw bytes:
//!
//! * [`utf8`] validates and decodes UTF-8 with a small state machine that
//!   reports the offset of the first ill-formed sequence. It never repairs
//!   input; [`clean_utf8`] does that on request.
//! * [`codec`] converts single scalar values to and from UTF-8, and encodes
//!   text into legacy single-byte encodings.
//! * [`detect`] guesses the encoding of unlabeled bytes: byte-order marks
//!   first, then ASCII and UTF-8, then UTF-16/UTF-32 votes for binary-looking
//!   input and finally a legacy round-trip fallback.
//! * [`translit`] folds text to ASCII with longest-match per-language
//!   substitution tables and per-codepoint fallback banks.
//!
//! # Example
//!
//! ```
//! let text = unifold::to_utf8(b"Caf\xE9 in Z\xFCrich").unwrap();
//! assert_eq!("Cafe in Zurich", unifold::transliterate(&text, "en", false));
//! assert_eq!("Cafe in Zuerich", unifold::transliterate(&text, "de", false));
//! ```
//!
//! # Substitution data
//!
//! Tables live in `data/` and are compiled into the binary. Each table is
//! parsed the first time it is needed and shared by every thread afterwards.
//! Lines that cannot be used are reported through `tracing` and skipped.

/// Classification of individual UTF-8 bytes.
pub mod byte_class;

/// UTF-8 validation and decoding.
pub mod utf8;

/// Scalar value and legacy single-byte encoding conversion.
pub mod codec;

/// Byte-order mark detection and stripping.
pub mod bom;

/// Encoding detection for unlabeled bytes.
pub mod detect;

pub(crate) mod convert;

pub mod translit;

pub(crate) mod error;

pub use bom::{strip_bom, Bom, BomEncoding};

pub use convert::{clean_utf8, decode_as, to_utf8};

pub use detect::{detect, looks_binary, Detector, EncodingGuess, Endianness};

pub use error::{CodepointError, ConvertError, TableError, Utf8Error, Utf8ErrorKind};

pub use translit::{to_ascii, transliterate, AsciiOptions, Transliterator, UnknownChar};

pub use utf8::{validate, Utf8Validator};

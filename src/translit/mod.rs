//! ASCII transliteration.
//!
//! Text is folded in stages. An optional strict pass asks a
//! [`UnicodeBackend`] to fold the whole input; if that does not produce pure
//! ASCII the per-language [`SubstitutionTable`] is applied with longest-match
//! semantics, and whatever is still non-ASCII is looked up char by char in
//! the codepoint banks.

mod backend;
mod data;
mod table;

pub use backend::{NoStrictBackend, NormalizingBackend, UnicodeBackend};
pub use data::{bank_table, lookup_codepoint, merged_table, BankTable, Language, TableKey};
pub use table::{SubstitutionTable, MAX_WINDOW};

use std::borrow::Cow;

/// What to emit for a char that no table or bank knows.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UnknownChar {
    /// Emit the given placeholder instead.
    ///
    /// A placeholder that is not ASCII is itself transliterated, and its
    /// untransliterable chars are dropped, so the output stays ASCII.
    Replace(Cow<'static, str>),
    /// Leave the char in the output.
    Keep,
}

impl Default for UnknownChar {
    fn default() -> Self {
        UnknownChar::Replace(Cow::Borrowed("?"))
    }
}

/// Options for [`to_ascii`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AsciiOptions {
    /// Spell out symbols such as currency signs using the extra tables.
    pub replace_extra_symbols: bool,
    /// Drop chars that cannot be transliterated instead of emitting
    /// [`AsciiOptions::unknown`], and strip any non-ASCII left at the end.
    pub remove_unsupported_chars: bool,
    /// Try the strict backend first.
    pub strict: bool,
    /// Skip the multi-char windows and substitute single chars only.
    pub replace_single_chars_only: bool,
    /// Handling of chars without any mapping.
    pub unknown: UnknownChar,
}

/// A transliterator with a pluggable strict backend.
///
/// The substitution tables are process-wide, so transliterators are cheap to
/// create and can be shared freely between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transliterator<B = NormalizingBackend> {
    backend: B,
}

impl Transliterator<NormalizingBackend> {
    /// A transliterator using [`NormalizingBackend`] for strict mode.
    pub const fn new() -> Self {
        Transliterator {
            backend: NormalizingBackend,
        }
    }
}

impl<B: UnicodeBackend> Transliterator<B> {
    /// A transliterator using `backend` for strict mode.
    pub const fn with_backend(backend: B) -> Self {
        Transliterator { backend }
    }

    /// The strict backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Transliterates `input` using the tables of `language`.
    ///
    /// Unknown language codes use the generic tables. ASCII input is
    /// returned unchanged.
    pub fn to_ascii(&self, input: &str, language: &str, options: &AsciiOptions) -> String {
        if input.is_ascii() {
            return input.to_owned();
        }
        let key = TableKey {
            language: Language::resolve(language),
            extra_symbols: options.replace_extra_symbols,
        };
        self.to_ascii_with_table(input, merged_table(key), options)
    }

    /// Transliterates `input` with a caller-supplied table instead of the
    /// built-in language tables. The codepoint banks still apply.
    pub fn to_ascii_with_table(
        &self,
        input: &str,
        table: &SubstitutionTable,
        options: &AsciiOptions,
    ) -> String {
        if input.is_ascii() {
            return input.to_owned();
        }
        if options.strict {
            match self.backend.strict_transliterate(input) {
                Some(folded) if folded.is_ascii() => return folded,
                _ => {}
            }
        }

        let substituted = table.apply(input, options.replace_single_chars_only);
        if substituted.is_ascii() {
            return substituted;
        }

        let mut out = String::with_capacity(substituted.len());
        for ch in substituted.chars() {
            if ch.is_ascii() {
                out.push(ch);
                continue;
            }
            match lookup_codepoint(ch) {
                Some(replacement) => out.push_str(replacement),
                None if options.remove_unsupported_chars => {}
                None => match &options.unknown {
                    UnknownChar::Replace(placeholder) => push_placeholder(&mut out, placeholder),
                    UnknownChar::Keep => out.push(ch),
                },
            }
        }
        if options.remove_unsupported_chars {
            out.retain(|ch| ch.is_ascii());
        }
        out
    }

    /// [`Transliterator::to_ascii`] with default options apart from
    /// `replace_extra_symbols`.
    pub fn transliterate(&self, input: &str, language: &str, replace_extra_symbols: bool) -> String {
        let options = AsciiOptions {
            replace_extra_symbols,
            ..AsciiOptions::default()
        };
        self.to_ascii(input, language, &options)
    }
}

fn push_placeholder(out: &mut String, placeholder: &str) {
    if placeholder.is_ascii() {
        out.push_str(placeholder);
        return;
    }
    for ch in placeholder.chars() {
        if ch.is_ascii() {
            out.push(ch);
        } else if let Some(replacement) = lookup_codepoint(ch) {
            out.push_str(replacement);
        }
    }
}

static DEFAULT_TRANSLITERATOR: Transliterator = Transliterator::new();

/// Transliterates `input` to ASCII using the tables of `language`.
pub fn to_ascii(input: &str, language: &str, options: &AsciiOptions) -> String {
    DEFAULT_TRANSLITERATOR.to_ascii(input, language, options)
}

/// Transliterates `input` to ASCII with default options.
pub fn transliterate(input: &str, language: &str, replace_extra_symbols: bool) -> String {
    DEFAULT_TRANSLITERATOR.transliterate(input, language, replace_extra_symbols)
}

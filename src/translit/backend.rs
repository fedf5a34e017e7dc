use std::fmt;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// A source of strict, normalization-based transliteration.
///
/// Strict transliteration is tried before the substitution tables when
/// [`AsciiOptions::strict`](super::AsciiOptions::strict) is set. Its result
/// is only used if it is entirely ASCII.
pub trait UnicodeBackend: fmt::Debug + Send + Sync {
    /// Transliterates `input`, or returns `None` if this backend cannot.
    fn strict_transliterate(&self, input: &str) -> Option<String>;
}

/// The built-in backend: compatibility decomposition, removal of combining
/// marks, and a few Latin letters that have no decomposition.
///
/// Works one extended grapheme cluster at a time. A cluster that does not
/// fold to ASCII is kept as it was, so the caller can tell which parts of
/// the input failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizingBackend;

/// A backend for builds that have no strict transliteration available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoStrictBackend;

fn latin_letter(ch: char) -> Option<&'static str> {
    Some(match ch {
        '\u{DF}' => "ss",
        '\u{1E9E}' => "SS",
        '\u{E6}' => "ae",
        '\u{C6}' => "AE",
        '\u{F8}' => "o",
        '\u{D8}' => "O",
        '\u{F0}' => "d",
        '\u{D0}' => "D",
        '\u{FE}' => "th",
        '\u{DE}' => "TH",
        '\u{111}' => "d",
        '\u{110}' => "D",
        '\u{127}' => "h",
        '\u{126}' => "H",
        '\u{131}' => "i",
        '\u{138}' => "q",
        '\u{142}' => "l",
        '\u{141}' => "L",
        '\u{14B}' => "ng",
        '\u{14A}' => "NG",
        '\u{153}' => "oe",
        '\u{152}' => "OE",
        '\u{167}' => "t",
        '\u{166}' => "T",
        '\u{17F}' => "s",
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => "'",
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => "\"",
        '\u{2010}'..='\u{2015}' | '\u{2212}' => "-",
        '\u{2044}' => "/",
        '\u{AB}' => "<<",
        '\u{BB}' => ">>",
        '\u{2039}' => "<",
        '\u{203A}' => ">",
        '\u{2022}' => "*",
        _ => return None,
    })
}

fn fold_grapheme(grapheme: &str, out: &mut String) -> bool {
    let start = out.len();
    for ch in grapheme.nfkd().filter(|&ch| !is_combining_mark(ch)) {
        match latin_letter(ch) {
            Some(folded) => out.push_str(folded),
            None if ch.is_ascii() => out.push(ch),
            None => {
                out.truncate(start);
                return false;
            }
        }
    }
    true
}

impl UnicodeBackend for NormalizingBackend {
    fn strict_transliterate(&self, input: &str) -> Option<String> {
        let mut out = String::with_capacity(input.len());
        for grapheme in input.graphemes(true) {
            if grapheme.is_ascii() {
                out.push_str(grapheme);
            } else if !fold_grapheme(grapheme, &mut out) {
                out.extend(grapheme.nfc());
            }
        }
        Some(out)
    }
}

impl UnicodeBackend for NoStrictBackend {
    fn strict_transliterate(&self, _input: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{NoStrictBackend, NormalizingBackend, UnicodeBackend};

    fn strict(s: &str) -> String {
        NormalizingBackend.strict_transliterate(s).unwrap()
    }

    #[test]
    fn test_strips_diacritics() {
        assert_eq!("deja vu", strict("d\u{E9}j\u{E0} vu"));
        assert_eq!("deja", strict("de\u{301}ja\u{300}"));
        assert_eq!("Cesky Krumlov", strict("\u{10C}esk\u{FD} Krumlov"));
    }

    #[test]
    fn test_compatibility_forms() {
        assert_eq!("fi", strict("\u{FB01}"));
        assert_eq!("x2", strict("x\u{B2}"));
        assert_eq!("ABC", strict("\u{FF21}\u{FF22}\u{FF23}"));
        assert_eq!("1/2", strict("\u{BD}"));
    }

    #[test]
    fn test_letters_without_decomposition() {
        assert_eq!("Strasse", strict("Stra\u{DF}e"));
        assert_eq!("Lodz", strict("\u{141}\u{F3}d\u{17A}"));
        assert_eq!("\"quoted\"", strict("\u{201C}quoted\u{201D}"));
    }

    #[test]
    fn test_unfoldable_clusters_are_kept() {
        assert_eq!("\u{4E2D}a", strict("\u{4E2D}a"));
        assert_eq!("e\u{4E2D}", strict("e\u{301}\u{4E2D}"));
    }

    #[test]
    fn test_no_strict_backend() {
        assert_eq!(None, NoStrictBackend.strict_transliterate("d\u{E9}j\u{E0}"));
    }
}

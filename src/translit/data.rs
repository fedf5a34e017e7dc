use super::table::SubstitutionTable;
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, trace, warn};

macro_rules! data_file {
    ($path:literal) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/", $path))
    };
}

static GENERIC: &str = data_file!("lang/generic.txt");
static GENERIC_EXTRA: &str = data_file!("lang/generic_extra.txt");

struct LanguageFiles {
    code: &'static str,
    table: &'static str,
    extra: Option<&'static str>,
}

const fn lang(
    code: &'static str,
    table: &'static str,
    extra: Option<&'static str>,
) -> LanguageFiles {
    LanguageFiles { code, table, extra }
}

const LANGUAGE_COUNT: usize = 12;

// Sorted by code after the generic entry.
static LANGUAGES: [LanguageFiles; LANGUAGE_COUNT] = [
    lang("en", "", None),
    lang("bg", data_file!("lang/bg.txt"), None),
    lang("da", data_file!("lang/da.txt"), None),
    lang(
        "de",
        data_file!("lang/de.txt"),
        Some(data_file!("lang/de_extra.txt")),
    ),
    lang("el", data_file!("lang/el.txt"), None),
    lang(
        "fr",
        data_file!("lang/fr.txt"),
        Some(data_file!("lang/fr_extra.txt")),
    ),
    lang("nb", data_file!("lang/nb.txt"), None),
    lang("pl", data_file!("lang/pl.txt"), None),
    lang(
        "ru",
        data_file!("lang/ru.txt"),
        Some(data_file!("lang/ru_extra.txt")),
    ),
    lang("sv", data_file!("lang/sv.txt"), None),
    lang("tr", data_file!("lang/tr.txt"), None),
    lang("uk", data_file!("lang/uk.txt"), None),
];

static ALIASES: [(&str, &str); 4] = [("gr", "el"), ("nn", "nb"), ("no", "nb"), ("ua", "uk")];

/// A language with its own substitution data, or the generic fallback.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language(usize);

impl Language {
    /// The language-independent tables.
    pub const GENERIC: Language = Language(0);

    fn find(code: &str) -> Option<Language> {
        let code = ALIASES
            .iter()
            .find(|&&(alias, _)| alias == code)
            .map_or(code, |&(_, target)| target);
        LANGUAGES
            .iter()
            .position(|files| files.code == code)
            .map(Language)
    }

    /// Resolves a language code such as `de`, `de-AT` or `pt_BR`.
    ///
    /// Codes are compared case-insensitively with `-` and `_` treated alike.
    /// The full code is tried first, then its primary subtag. Anything
    /// without data resolves to [`Language::GENERIC`].
    pub fn resolve(code: &str) -> Language {
        let normalized = code.trim().to_ascii_lowercase().replace('-', "_");
        if normalized.is_empty() {
            return Language::GENERIC;
        }
        let primary = normalized.split('_').next().unwrap_or_default();
        if let Some(language) = Self::find(&normalized).or_else(|| Self::find(primary)) {
            return language;
        }
        debug!(code, "no transliteration data for language, using generic tables");
        Language::GENERIC
    }

    /// The canonical code.
    pub fn code(self) -> &'static str {
        LANGUAGES[self.0].code
    }

    /// Whether this is [`Language::GENERIC`].
    pub fn is_generic(self) -> bool {
        self.0 == 0
    }

    /// Every language with its own data, generic first.
    pub fn supported() -> impl Iterator<Item = Language> {
        (0..LANGUAGE_COUNT).map(Language)
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Language").field(&self.code()).finish()
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::GENERIC
    }
}

/// Identifies one merged substitution table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableKey {
    /// Language layered over the generic table.
    pub language: Language,
    /// Whether the extra symbol tables are layered in.
    pub extra_symbols: bool,
}

impl TableKey {
    fn slot(self) -> usize {
        self.language.0 * 2 + usize::from(self.extra_symbols)
    }
}

const SLOTS: usize = LANGUAGE_COUNT * 2;

#[allow(clippy::declare_interior_mutable_const)]
const UNLOADED: OnceLock<SubstitutionTable> = OnceLock::new();

static MERGED: [OnceLock<SubstitutionTable>; SLOTS] = [UNLOADED; SLOTS];

fn load(table: &mut SubstitutionTable, name: &str, text: &'static str) {
    let (parsed, errors) = SubstitutionTable::parse(text);
    for err in errors {
        warn!(file = name, %err, "skipping substitution entry");
    }
    table.overlay(&parsed);
}

fn build(key: TableKey) -> SubstitutionTable {
    let files = &LANGUAGES[key.language.0];
    let mut table = SubstitutionTable::new();
    load(&mut table, "generic", GENERIC);
    if key.extra_symbols {
        load(&mut table, "generic_extra", GENERIC_EXTRA);
    }
    if !key.language.is_generic() {
        load(&mut table, files.code, files.table);
        if let (true, Some(extra)) = (key.extra_symbols, files.extra) {
            load(&mut table, files.code, extra);
        }
    }
    debug!(
        language = files.code,
        extra_symbols = key.extra_symbols,
        entries = table.len(),
        "loaded substitution table"
    );
    table
}

/// The merged table for `key`: generic, generic extras, language, language
/// extras, each overriding the previous one. Built once per process.
pub fn merged_table(key: TableKey) -> &'static SubstitutionTable {
    MERGED[key.slot()].get_or_init(|| build(key))
}

const BANK_COUNT: usize = 11;

// Sorted by bank number for binary search.
static BANK_FILES: [(u32, &str); BANK_COUNT] = [
    (0x000, data_file!("banks/x000.txt")),
    (0x001, data_file!("banks/x001.txt")),
    (0x002, data_file!("banks/x002.txt")),
    (0x003, data_file!("banks/x003.txt")),
    (0x004, data_file!("banks/x004.txt")),
    (0x01e, data_file!("banks/x01e.txt")),
    (0x020, data_file!("banks/x020.txt")),
    (0x021, data_file!("banks/x021.txt")),
    (0x022, data_file!("banks/x022.txt")),
    (0x030, data_file!("banks/x030.txt")),
    (0x0ff, data_file!("banks/x0ff.txt")),
];

/// ASCII replacements for the 256 codepoints sharing `cp >> 8`.
pub struct BankTable {
    entries: [Option<&'static str>; 256],
}

impl BankTable {
    fn parse(bank: u32, text: &'static str) -> Self {
        let mut entries = [None; 256];
        for (idx, line) in text.lines().enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let entry = line.split_once('\t').and_then(|(low, replacement)| {
                let low = match low.len() {
                    2 => u8::from_str_radix(low, 16).ok()?,
                    _ => return None,
                };
                replacement.is_ascii().then_some((low, replacement))
            });
            match entry {
                Some((low, replacement)) => entries[usize::from(low)] = Some(replacement),
                None => warn!(bank, line = idx + 1, text = line, "skipping bank entry"),
            }
        }
        BankTable { entries }
    }

    /// The replacement for the codepoint with low byte `low`.
    pub fn get(&self, low: u8) -> Option<&'static str> {
        self.entries[usize::from(low)]
    }

    /// Number of mapped codepoints.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_some()).count()
    }

    /// Whether no codepoint is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }
}

impl fmt::Debug for BankTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BankTable")
            .field("entries", &self.len())
            .finish()
    }
}

#[allow(clippy::declare_interior_mutable_const)]
const UNLOADED_BANK: OnceLock<BankTable> = OnceLock::new();

static BANKS: [OnceLock<BankTable>; BANK_COUNT] = [UNLOADED_BANK; BANK_COUNT];

/// The bank table for `bank`, if there is data for it.
pub fn bank_table(bank: u32) -> Option<&'static BankTable> {
    let idx = BANK_FILES
        .binary_search_by_key(&bank, |&(number, _)| number)
        .ok()?;
    Some(BANKS[idx].get_or_init(|| {
        let table = BankTable::parse(bank, BANK_FILES[idx].1);
        debug!(bank, entries = table.len(), "loaded codepoint bank");
        table
    }))
}

/// Looks `ch` up in its codepoint bank.
///
/// Codepoints the shipped banks do not cover fall back to the Unidecode
/// tables of `deunicode`.
pub fn lookup_codepoint(ch: char) -> Option<&'static str> {
    let cp = u32::from(ch);
    if let Some(replacement) = bank_table(cp >> 8).and_then(|table| table.get((cp & 0xFF) as u8)) {
        return Some(replacement);
    }
    let fallback = deunicode::deunicode_char(ch).filter(|replacement| replacement.is_ascii());
    if fallback.is_none() {
        trace!(codepoint = cp, "no transliteration for codepoint");
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::{
        bank_table, lookup_codepoint, merged_table, BankTable, Language, TableKey, BANK_FILES,
        GENERIC, GENERIC_EXTRA, LANGUAGES,
    };
    use crate::translit::table::SubstitutionTable;
    use rstest::rstest;

    #[rstest]
    #[case("de", "de")]
    #[case("DE", "de")]
    #[case("de-AT", "de")]
    #[case("de_CH", "de")]
    #[case("no", "nb")]
    #[case("nn_NO", "nb")]
    #[case("ua", "uk")]
    #[case("en", "en")]
    #[case("en-GB", "en")]
    #[case("xx", "en")]
    #[case("", "en")]
    fn test_resolve(#[case] code: &str, #[case] expected: &str) {
        assert_eq!(expected, Language::resolve(code).code());
    }

    #[test]
    fn test_registries_are_sorted() {
        assert!(LANGUAGES[1..].windows(2).all(|w| w[0].code < w[1].code));
        assert!(BANK_FILES.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(Language::GENERIC, Language::supported().next().unwrap());
        assert!(Language::supported().skip(1).all(|l| !l.is_generic()));
    }

    #[test]
    fn test_data_files_parse_cleanly() {
        let texts = LANGUAGES
            .iter()
            .flat_map(|files| std::iter::once(files.table).chain(files.extra))
            .chain([GENERIC, GENERIC_EXTRA]);
        for text in texts {
            let (table, errors) = SubstitutionTable::parse(text);
            assert!(errors.is_empty(), "{:?}", errors);
            assert!(table.max_key_chars() <= 2);
        }
        for &(bank, text) in &BANK_FILES {
            let lines = text
                .lines()
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .count();
            assert_eq!(lines, BankTable::parse(bank, text).len(), "bank {:x}", bank);
        }
    }

    #[test]
    fn test_merged_layers_override() {
        let generic = merged_table(TableKey {
            language: Language::GENERIC,
            extra_symbols: false,
        });
        let german = merged_table(TableKey {
            language: Language::resolve("de"),
            extra_symbols: true,
        });
        assert_eq!(Some("A"), generic.get("\u{C4}"));
        assert_eq!(Some("Ae"), german.get("\u{C4}"));
        assert_eq!(Some("e"), german.get("\u{E9}"));
        assert_eq!(None, generic.get("\u{20AC}"));
        assert_eq!(Some(" Euro "), german.get("\u{20AC}"));
    }

    #[test]
    fn test_merged_table_is_cached() {
        let key = TableKey {
            language: Language::resolve("ru"),
            extra_symbols: false,
        };
        assert!(std::ptr::eq(merged_table(key), merged_table(key)));
    }

    #[test]
    fn test_banks() {
        assert_eq!(Some("A"), lookup_codepoint('\u{FF21}'));
        assert_eq!(Some(""), lookup_codepoint('\u{301}'));
        assert_eq!(Some("Zh"), lookup_codepoint('\u{416}'));
        assert!(bank_table(0x000).is_some());
        assert!(bank_table(0x04E).is_none());
    }

    #[rstest]
    #[case('\u{4E2D}', "Zhong ")]
    #[case('\u{5317}', "Bei ")]
    #[case('\u{D55C}', "han")]
    #[case('\u{5E9}', "sh")]
    #[case('\u{645}', "m")]
    #[case('\u{E2A}', "s")]
    fn test_codepoints_outside_banks(#[case] ch: char, #[case] expected: &str) {
        assert!(bank_table(u32::from(ch) >> 8).is_none());
        assert_eq!(Some(expected), lookup_codepoint(ch));
    }

    #[test]
    fn test_untransliterable_codepoints() {
        assert_eq!(None, lookup_codepoint('\u{E000}'));
        assert_eq!(None, lookup_codepoint('\u{10FFFF}'));
    }

    #[test]
    fn test_bad_bank_lines_are_skipped() {
        let table = BankTable::parse(0, "# header\n41\tA\nzz\tbad\n4\tshort\n42\t\u{E9}\n43\t\n");
        assert_eq!(Some("A"), table.get(0x41));
        assert_eq!(None, table.get(0x42));
        assert_eq!(Some(""), table.get(0x43));
        assert_eq!(2, table.len());
    }
}

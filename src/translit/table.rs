use crate::error::TableError;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// Longest key, in chars, that longest-match substitution looks for.
pub const MAX_WINDOW: usize = 5;

/// A mapping from non-ASCII fragments of one or more chars to ASCII
/// replacements.
///
/// Keys are never pure ASCII and replacements are always ASCII, so applying a
/// table can only ever shrink the non-ASCII part of a string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionTable {
    map: HashMap<Cow<'static, str>, Cow<'static, str>>,
    max_key_chars: usize,
}

impl SubstitutionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(key, replacement)` pairs. Later pairs win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Cow<'static, str>>,
        V: Into<Cow<'static, str>>,
    {
        let mut table = Self::new();
        for (key, replacement) in pairs {
            table.insert(key, replacement)?;
        }
        Ok(table)
    }

    /// Parses the data file format: one `key<TAB>replacement` entry per
    /// line, `#` starting a comment line. Rejected lines are returned
    /// alongside the table instead of aborting the parse.
    pub fn parse(text: &'static str) -> (Self, Vec<TableError>) {
        let mut table = Self::new();
        let mut errors = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let result = match line.split_once('\t') {
                Some((key, replacement)) => table.insert(key, replacement).map(|_| ()),
                None => Err(TableError::MalformedLine {
                    line: idx + 1,
                    text: line.to_owned(),
                }),
            };
            if let Err(err) = result {
                errors.push(err);
            }
        }
        (table, errors)
    }

    /// Adds or replaces an entry, returning the previous replacement.
    pub fn insert<K, V>(
        &mut self,
        key: K,
        replacement: V,
    ) -> Result<Option<Cow<'static, str>>, TableError>
    where
        K: Into<Cow<'static, str>>,
        V: Into<Cow<'static, str>>,
    {
        let key = key.into();
        let replacement = replacement.into();
        if key.is_empty() {
            return Err(TableError::EmptyKey);
        }
        if key.is_ascii() {
            return Err(TableError::AsciiKey(key.into_owned()));
        }
        let key_chars = key.chars().count();
        if key_chars > MAX_WINDOW {
            return Err(TableError::KeyTooLong(key.into_owned()));
        }
        if !replacement.is_ascii() {
            return Err(TableError::NonAsciiReplacement {
                key: key.into_owned(),
                replacement: replacement.into_owned(),
            });
        }
        self.max_key_chars = self.max_key_chars.max(key_chars);
        Ok(self.map.insert(key, replacement))
    }

    /// Copies every entry of `other` into `self`, overriding colliding keys.
    pub fn overlay(&mut self, other: &SubstitutionTable) {
        for (key, replacement) in &other.map {
            self.map.insert(key.clone(), replacement.clone());
        }
        self.max_key_chars = self.max_key_chars.max(other.max_key_chars);
    }

    /// The replacement for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|replacement| &**replacement)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Length in chars of the longest key.
    pub fn max_key_chars(&self) -> usize {
        self.max_key_chars
    }

    /// Longest-match substitution.
    ///
    /// Windows of 5, 4, 3 and 2 chars are tried before single chars. Within
    /// one width windows are visited in scan order; the first window found
    /// in the table is replaced everywhere in the string and never looked at
    /// again. With `single_chars_only` only the single-char pass runs.
    pub fn apply(&self, input: &str, single_chars_only: bool) -> String {
        let mut out = input.to_owned();
        if self.map.is_empty() || input.is_ascii() {
            return out;
        }

        let bounds = input
            .char_indices()
            .map(|(idx, _)| idx)
            .chain(std::iter::once(input.len()))
            .collect::<Vec<_>>();
        let char_count = bounds.len() - 1;
        let widest = if single_chars_only {
            1
        } else {
            self.max_key_chars.min(MAX_WINDOW).min(char_count)
        };

        let mut done = HashSet::new();
        for width in (1..=widest).rev() {
            for start in 0..=(char_count - width) {
                let window = &input[bounds[start]..bounds[start + width]];
                if window.is_ascii() || done.contains(window) {
                    continue;
                }
                if let Some(replacement) = self.map.get(window) {
                    if out.contains(window) {
                        done.insert(window);
                        out = out.replace(window, replacement);
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::SubstitutionTable;
    use crate::error::TableError;

    fn table(pairs: &[(&'static str, &'static str)]) -> SubstitutionTable {
        SubstitutionTable::from_pairs(pairs.iter().copied()).unwrap()
    }

    #[test]
    fn test_longest_match_wins() {
        let t = table(&[("\u{E6}", "ae"), ("\u{E6}\u{F8}", "X")]);
        assert_eq!("X", t.apply("\u{E6}\u{F8}", false));
        assert_eq!("ae\u{F8}", t.apply("\u{E6}\u{F8}", true));
        assert_eq!("aeX", t.apply("\u{E6}\u{E6}\u{F8}", false));
    }

    #[test]
    fn test_combining_sequence_as_unit() {
        let t = table(&[("a\u{308}", "ae"), ("\u{308}", "")]);
        assert_eq!("Baer", t.apply("Ba\u{308}r", false));
        assert_eq!("Bar", t.apply("Ba\u{308}r", true));
    }

    #[test]
    fn test_first_in_scan_order_wins() {
        let t = table(&[("\u{3B1}\u{3B2}", "X"), ("\u{3B2}\u{3B3}", "Y")]);
        assert_eq!("X\u{3B3}", t.apply("\u{3B1}\u{3B2}\u{3B3}", false));
    }

    #[test]
    fn test_replaces_every_occurrence() {
        let t = table(&[("\u{E9}", "e")]);
        assert_eq!("ete ete", t.apply("\u{E9}t\u{E9} \u{E9}t\u{E9}", false));
    }

    #[test]
    fn test_unmapped_chars_survive() {
        let t = table(&[("\u{E9}", "e")]);
        assert_eq!("e\u{4E2D}", t.apply("\u{E9}\u{4E2D}", false));
    }

    #[test]
    fn test_insert_validation() {
        let mut t = SubstitutionTable::new();
        assert_eq!(Err(TableError::EmptyKey), t.insert("", "x"));
        assert_eq!(Err(TableError::AsciiKey("ab".into())), t.insert("ab", "x"));
        assert_eq!(
            Err(TableError::KeyTooLong("\u{E9}\u{E9}\u{E9}\u{E9}\u{E9}\u{E9}".into())),
            t.insert("\u{E9}\u{E9}\u{E9}\u{E9}\u{E9}\u{E9}", "x")
        );
        assert!(matches!(
            t.insert("\u{E9}", "\u{E8}"),
            Err(TableError::NonAsciiReplacement { .. })
        ));
        assert_eq!(Ok(None), t.insert("\u{E9}", "e"));
        assert_eq!(Ok(Some("e".into())), t.insert("\u{E9}", "E"));
        assert_eq!(1, t.len());
    }

    #[test]
    fn test_parse() {
        let (t, errors) = SubstitutionTable::parse(
            "# comment\n\u{E4}\tae\r\n\n\u{4E2D}\tZhong \nbroken line\nab\tx\n",
        );
        assert_eq!(Some("ae"), t.get("\u{E4}"));
        assert_eq!(Some("Zhong "), t.get("\u{4E2D}"));
        assert_eq!(2, t.len());
        assert_eq!(
            vec![
                TableError::MalformedLine {
                    line: 5,
                    text: "broken line".into()
                },
                TableError::AsciiKey("ab".into()),
            ],
            errors
        );
    }

    #[test]
    fn test_overlay_overrides() {
        let mut base = table(&[("\u{E4}", "a"), ("\u{F6}", "o")]);
        base.overlay(&table(&[("\u{E4}", "ae"), ("\u{E4}\u{F6}", "X")]));
        assert_eq!(Some("ae"), base.get("\u{E4}"));
        assert_eq!(Some("o"), base.get("\u{F6}"));
        assert_eq!(2, base.max_key_chars());
    }
}

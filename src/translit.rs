use anyhow::Context;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Appended to every Mandarin reading so adjacent syllables stay apart.
pub const PINYIN_SEP: char = '-';

const CCDICT_FILE: &str = "ccdict.txt";

/// Built-in replacements; these win over readings loaded from a ccdict table.
const TRANSLATIONS: &[(char, &str)] = &[
    ('\u{003A}', "_"),  // colon, the HFS path separator
    ('\u{00C4}', "AE"), // umlaut A
    ('\u{00D6}', "OE"), // umlaut O
    ('\u{00DC}', "UE"), // umlaut U
    ('\u{00E1}', "a"),
    ('\u{00E4}', "ae"), // umlaut a
    ('\u{00E7}', "c"),
    ('\u{00E8}', "e"),
    ('\u{00E9}', "e"),
    ('\u{00EF}', "i"),
    ('\u{00F3}', "o"),
    ('\u{00F4}', "o"),
    ('\u{00F6}', "oe"), // umlaut o
    ('\u{00FC}', "ue"), // umlaut u
    ('\u{00B0}', "d"),  // degree
    ('\u{00BF}', ""),   // inverted question mark
    ('\u{00C6}', "AE"),
    ('\u{00D8}', "O"),
    ('\u{00DF}', "ss"), // sharp s
    ('\u{00E6}', "ae"),
    ('\u{00F8}', "o"),
    ('\u{0159}', "r"),
    // combining marks
    ('\u{0300}', ""),
    ('\u{0301}', ""),
    ('\u{0302}', ""),
    ('\u{0303}', ""),
    ('\u{0306}', ""),
    ('\u{0308}', "e"), // combining umlaut
    ('\u{030A}', ""),
    ('\u{030C}', ""),
    ('\u{0327}', ""),
    // cyrillic
    ('\u{0430}', "a"),
    ('\u{0431}', "b"),
    ('\u{0432}', "v"),
    ('\u{0433}', "g"),
    ('\u{0434}', "d"),
    ('\u{0435}', "ie"),
    ('\u{0436}', "zh"),
    ('\u{0437}', "z"),
    ('\u{0438}', "i"),
    ('\u{0439}', "i"),
    ('\u{043A}', "k"),
    ('\u{043B}', "l"),
    ('\u{043C}', "m"),
    ('\u{043D}', "n"),
    ('\u{043E}', "o"),
    ('\u{043F}', "p"),
    ('\u{0440}', "r"),
    ('\u{0441}', "s"),
    ('\u{0442}', "t"),
    ('\u{0443}', "y"),
    ('\u{0444}', "f"),
    ('\u{0445}', "x"),
    ('\u{0446}', "ts"),
    ('\u{0447}', "ch"),
    ('\u{0448}', "sh"),
    ('\u{0449}', ""),
    ('\u{044A}', ""),
    ('\u{044B}', "ui"),
    ('\u{044C}', ""),
    ('\u{044D}', "e"),
    ('\u{044E}', "io"),
    ('\u{044F}', "ya"),
    ('\u{2013}', "-"), // en dash
    ('\u{2014}', "-"), // em dash
    ('\u{3068}', "&"),
    ('\u{4E0B}', "xia"),
    ('\u{FF08}', "("), // fullwidth parens, dash, colon
    ('\u{FF09}', ")"),
    ('\u{FF0D}', "-"),
    ('\u{FF1A}', "_"),
];

/// Maps characters of a name to an ASCII spelling.
pub struct CharacterTranslator {
    translations: HashMap<char, String>,
}

impl CharacterTranslator {
    pub fn new() -> Self {
        let translations = TRANSLATIONS
            .iter()
            .map(|(c, s)| (*c, s.to_string()))
            .collect();
        Self { translations }
    }

    /// Translator that also knows the Mandarin readings in a ccdict table.
    /// A directory path means the `ccdict.txt` inside it.
    pub fn with_ccdict(path: &Path) -> anyhow::Result<Self> {
        let path = if path.is_dir() {
            path.join(CCDICT_FILE)
        } else {
            path.to_path_buf()
        };
        let data = fs::read_to_string(&path)
            .with_context(|| format!("reading Mandarin readings from {}", path.display()))?;

        let mut translator = Self {
            translations: parse_ccdict(&data)?,
        };
        for (c, s) in TRANSLATIONS {
            translator.translations.insert(*c, s.to_string());
        }
        Ok(translator)
    }

    pub fn translate_char(&self, c: char) -> Cow<'_, str> {
        if let Some(s) = self.translations.get(&c) {
            return Cow::Borrowed(s.as_str());
        }
        if u32::from(c) > 0x80 {
            return Cow::Owned(format!("({:X})", u32::from(c)));
        }
        Cow::Owned(c.to_string())
    }

    pub fn translate_str(&self, s: &str) -> String {
        let mut pieces: Vec<Cow<'_, str>> = s.chars().map(|c| self.translate_char(c)).collect();

        // A syllable keeps its separator only when another syllable follows.
        for i in 1..pieces.len() {
            if is_pinyin(&pieces[i - 1]) && !is_pinyin(&pieces[i]) {
                let prev = pieces[i - 1].to_mut();
                prev.pop();
            }
        }

        pieces.concat()
    }

    /// Characters of `s` that have no translation and will be spelled as hex.
    pub fn unknown_chars(&self, s: &str) -> Vec<char> {
        s.chars()
            .filter(|c| !self.translations.contains_key(c) && u32::from(*c) > 0x80)
            .collect()
    }
}

impl Default for CharacterTranslator {
    fn default() -> Self {
        Self::new()
    }
}

fn is_pinyin(s: &str) -> bool {
    s.chars().count() > 1 && s.ends_with(PINYIN_SEP)
}

fn parse_ccdict(data: &str) -> anyhow::Result<HashMap<char, String>> {
    let mandarin_re = Regex::new(r"^U\+([0-9A-F]+)\.0\tfMandarin\t([a-z]*)")?;
    let mut translations = HashMap::new();
    for line in data.lines() {
        let Some(caps) = mandarin_re.captures(line) else {
            continue;
        };
        let Some(c) = u32::from_str_radix(&caps[1], 16).ok().and_then(char::from_u32) else {
            continue;
        };
        translations.insert(c, format!("{}{}", &caps[2], PINYIN_SEP));
    }
    Ok(translations)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CCDICT: &str = "U+4E2D.0\tfMandarin\tzhong\n\
                          U+6587.0\tfMandarin\twen\n\
                          U+4E0B.0\tfMandarin\tshang\n\
                          U+6587.0\tfCantonese\tman\n";

    #[test]
    fn test_translate_latin() {
        let t = CharacterTranslator::new();
        assert_eq!(t.translate_str("Motörhead"), "Motoerhead");
        assert_eq!(t.translate_str("Björk: Début"), "Bjoerk_ Debut");
        assert_eq!(t.translate_str("Straße"), "Strasse");
        assert_eq!(t.translate_str("plain ascii"), "plain ascii");
    }

    #[test]
    fn test_translate_cyrillic_and_combining() {
        let t = CharacterTranslator::new();
        assert_eq!(t.translate_str("кино"), "kino");
        // e followed by a combining acute accent
        assert_eq!(t.translate_str("Cafe\u{0301}"), "Cafe");
    }

    #[test]
    fn test_unknown_spelled_as_hex() {
        let t = CharacterTranslator::new();
        assert_eq!(t.translate_str("a\u{263A}b"), "a(263A)b");
        assert_eq!(t.unknown_chars("a\u{263A}bö"), vec!['\u{263A}']);
    }

    #[test]
    fn test_pinyin_separators() {
        let t = CharacterTranslator {
            translations: parse_ccdict(CCDICT).unwrap(),
        };
        assert_eq!(t.translate_str("中文"), "zhong-wen-");
        assert_eq!(t.translate_str("中文 Live"), "zhong-wen Live");
        assert_eq!(t.translate_str("x中y"), "xzhongy");
    }

    #[test]
    fn test_builtin_table_wins_over_ccdict() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(CCDICT_FILE), CCDICT).unwrap();

        let t = CharacterTranslator::with_ccdict(tmp.path()).unwrap();
        assert_eq!(t.translate_str("下"), "xia");
        assert_eq!(t.translate_str("中 ä"), "zhong ae");
    }

    #[test]
    fn test_missing_ccdict_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(CharacterTranslator::with_ccdict(&tmp.path().join("nope.txt")).is_err());
    }
}

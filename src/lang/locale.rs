use std::fmt;

/// ISO-639-1 code of the language answers are generated in.
pub const PIVOT_LANGUAGE: &str = "en";

/// Language+script identifier understood by the translation model (e.g. `tam_Taml`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocaleTag(&'static str);

impl LocaleTag {
    pub const PIVOT: LocaleTag = LocaleTag("eng_Latn");

    pub const fn new(tag: &'static str) -> Self {
        Self(tag)
    }

    pub fn as_str(self) -> &'static str {
        self.0
    }

    pub fn is_pivot(self) -> bool {
        self == Self::PIVOT
    }
}

impl fmt::Display for LocaleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

const LOCALE_TABLE: &[(&str, LocaleTag)] = &[
    ("ta", LocaleTag::new("tam_Taml")),
    ("hi", LocaleTag::new("hin_Deva")),
    ("te", LocaleTag::new("tel_Telu")),
    ("ml", LocaleTag::new("mal_Mlym")),
    ("kn", LocaleTag::new("kan_Knda")),
    ("bn", LocaleTag::new("ben_Beng")),
    ("mr", LocaleTag::new("mar_Deva")),
    ("fr", LocaleTag::new("fra_Latn")),
    ("de", LocaleTag::new("deu_Latn")),
    ("ko", LocaleTag::new("kor_Hang")),
    ("zh", LocaleTag::new("zho_Hans")),
    ("zh-cn", LocaleTag::new("zho_Hans")),
    ("ja", LocaleTag::new("jpn_Jpan")),
    ("en", LocaleTag::PIVOT),
];

/// Maps a detected language code to a translator locale; unmapped codes fall back to the pivot.
pub fn locale_for(code: &str) -> LocaleTag {
    let code = code.trim();
    LOCALE_TABLE
        .iter()
        .find(|(iso, _)| iso.eq_ignore_ascii_case(code))
        .map(|&(_, tag)| tag)
        .unwrap_or(LocaleTag::PIVOT)
}

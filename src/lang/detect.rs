use tracing::debug;
use whatlang::{Detector, Lang as Wl, Script};

use super::locale::PIVOT_LANGUAGE;

#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("no text to detect a language from")]
    Empty,

    #[error("could not determine the language of the input")]
    Undetermined,
}

/// Maps raw input text to an ISO-639-1 language code.
pub trait LanguageDetector {
    fn detect(&self, text: &str) -> Result<&'static str, DetectError>;
}

/// Script first, trigrams second, via `whatlang`.
///
/// Any non-Latin letter decides by script, so "GUVI是什么？" is Chinese even
/// though Latin letters outnumber the Han ones. Latin-only text is English
/// unless it is long enough for trigram statistics and whatlang marks the
/// result reliable; short chat lines ("Hello", "Thanks") are otherwise
/// misread as Danish, Zulu or French.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangDetector;

/// Latin-only input shorter than this many words is taken as the pivot language.
const MIN_LATIN_WORDS: usize = 5;

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Result<&'static str, DetectError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DetectError::Empty);
        }
        // Emoji, digits, punctuation: nothing a language model can anchor on.
        if !text.chars().any(char::is_alphabetic) {
            return Err(DetectError::Undetermined);
        }

        let non_latin: String = text
            .chars()
            .filter(|&c| c.is_alphabetic() && !is_latin(c))
            .collect();

        let code = if non_latin.is_empty() {
            detect_latin(text)
        } else {
            detect_by_script(text, &non_latin)?
        };
        debug!(lang = code, "language detected");
        Ok(code)
    }
}

fn is_latin(c: char) -> bool {
    matches!(c,
        'a'..='z' | 'A'..='Z' |
        '\u{00C0}'..='\u{024F}' |
        '\u{1E00}'..='\u{1EFF}'
    )
}

fn contains_kana(text: &str) -> bool {
    text.chars()
        .any(|c| matches!(c, '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}'))
}

fn detect_latin(text: &str) -> &'static str {
    let words = text
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphabetic))
        .count();
    if words < MIN_LATIN_WORDS {
        return PIVOT_LANGUAGE;
    }

    match whatlang::detect(text) {
        Some(info) if info.is_reliable() => {
            debug!(
                lang = ?info.lang(),
                confidence = info.confidence(),
                "latin text classified"
            );
            iso_639_1(info.lang())
        }
        _ => PIVOT_LANGUAGE,
    }
}

fn detect_by_script(text: &str, non_latin: &str) -> Result<&'static str, DetectError> {
    let script = whatlang::detect_script(non_latin).ok_or(DetectError::Undetermined)?;
    let code = match script {
        Script::Tamil => "ta",
        Script::Telugu => "te",
        Script::Malayalam => "ml",
        Script::Kannada => "kn",
        Script::Bengali => "bn",
        Script::Hangul => "ko",
        Script::Gujarati => "gu",
        Script::Gurmukhi => "pa",
        Script::Oriya => "or",
        Script::Hiragana | Script::Katakana => "ja",
        Script::Mandarin if contains_kana(text) => "ja",
        Script::Mandarin => "zh",
        Script::Devanagari => Detector::with_allowlist(vec![Wl::Hin, Wl::Mar])
            .detect_lang(non_latin)
            .map_or("hi", iso_639_1),
        _ => whatlang::detect(text)
            .map(|info| iso_639_1(info.lang()))
            .ok_or(DetectError::Undetermined)?,
    };
    Ok(code)
}

/// whatlang reports ISO-639-3; the locale table is keyed by ISO-639-1.
fn iso_639_1(lang: Wl) -> &'static str {
    match lang {
        Wl::Eng => "en",
        Wl::Tam => "ta",
        Wl::Hin => "hi",
        Wl::Tel => "te",
        Wl::Mal => "ml",
        Wl::Kan => "kn",
        Wl::Ben => "bn",
        Wl::Mar => "mr",
        Wl::Fra => "fr",
        Wl::Deu => "de",
        Wl::Kor => "ko",
        Wl::Cmn => "zh",
        Wl::Jpn => "ja",
        Wl::Spa => "es",
        Wl::Por => "pt",
        Wl::Ita => "it",
        Wl::Rus => "ru",
        Wl::Ara => "ar",
        Wl::Urd => "ur",
        Wl::Guj => "gu",
        Wl::Pan => "pa",
        Wl::Ori => "or",
        Wl::Nep => "ne",
        Wl::Nld => "nl",
        other => other.code(),
    }
}

//! Language detection and the ISO code to translator locale table.

mod detect;
mod locale;

pub use detect::{DetectError, LanguageDetector, WhatlangDetector};
pub use locale::{LocaleTag, PIVOT_LANGUAGE, locale_for};

//! 语言表：平台支持的 23 种语言（闭合枚举，只读）。
//!
//! Closed table of the languages the pipeline platform serves.
//!
//! The table is static data: it is built once, never mutated, and shared freely
//! across concurrent requests. Every language can be addressed three ways:
//!
//! | Selector | Example | Notes |
//! |----------|---------|-------|
//! | index | `1` | position in the table, `0..=22` |
//! | code | `"hi"` | ISO-639 style short code sent on the wire |
//! | [`Language`] | `Language::Hindi` | typed variant |
//!
//! ```rust
//! use ulca_pipeline::language::{is_valid_language, Language};
//!
//! assert!(is_valid_language("gom"));
//! assert!(!is_valid_language("xx"));
//! assert_eq!(Language::from_index(1), Some(Language::Hindi));
//! ```

use crate::{Error, ErrorContext, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A language supported by the pipeline platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Language {
    English,
    Hindi,
    Konkani,
    Kannada,
    Dogri,
    Bodo,
    Urdu,
    Tamil,
    Kashmiri,
    Assamese,
    Bengali,
    Marathi,
    Sindhi,
    Maithili,
    Punjabi,
    Malayalam,
    Manipuri,
    Telugu,
    Sanskrit,
    Nepali,
    Santali,
    Gujarati,
    Odia,
}

/// Table order defines the numeric index of each language.
pub const ALL_LANGUAGES: [Language; 23] = [
    Language::English,
    Language::Hindi,
    Language::Konkani,
    Language::Kannada,
    Language::Dogri,
    Language::Bodo,
    Language::Urdu,
    Language::Tamil,
    Language::Kashmiri,
    Language::Assamese,
    Language::Bengali,
    Language::Marathi,
    Language::Sindhi,
    Language::Maithili,
    Language::Punjabi,
    Language::Malayalam,
    Language::Manipuri,
    Language::Telugu,
    Language::Sanskrit,
    Language::Nepali,
    Language::Santali,
    Language::Gujarati,
    Language::Odia,
];

static BY_CODE: Lazy<HashMap<&'static str, Language>> =
    Lazy::new(|| ALL_LANGUAGES.iter().map(|l| (l.code(), *l)).collect());

impl Language {
    /// Short code sent to the platform (e.g. `"gom"`).
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
            Self::Konkani => "gom",
            Self::Kannada => "kn",
            Self::Dogri => "doi",
            Self::Bodo => "brx",
            Self::Urdu => "ur",
            Self::Tamil => "ta",
            Self::Kashmiri => "ks",
            Self::Assamese => "as",
            Self::Bengali => "bn",
            Self::Marathi => "mr",
            Self::Sindhi => "sd",
            Self::Maithili => "mai",
            Self::Punjabi => "pa",
            Self::Malayalam => "ml",
            Self::Manipuri => "mni",
            Self::Telugu => "te",
            Self::Sanskrit => "sa",
            Self::Nepali => "ne",
            Self::Santali => "sat",
            Self::Gujarati => "gu",
            Self::Odia => "or",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Konkani => "Konkani",
            Self::Kannada => "Kannada",
            Self::Dogri => "Dogri",
            Self::Bodo => "Bodo",
            Self::Urdu => "Urdu",
            Self::Tamil => "Tamil",
            Self::Kashmiri => "Kashmiri",
            Self::Assamese => "Assamese",
            Self::Bengali => "Bengali",
            Self::Marathi => "Marathi",
            Self::Sindhi => "Sindhi",
            Self::Maithili => "Maithili",
            Self::Punjabi => "Punjabi",
            Self::Malayalam => "Malayalam",
            Self::Manipuri => "Manipuri",
            Self::Telugu => "Telugu",
            Self::Sanskrit => "Sanskrit",
            Self::Nepali => "Nepali",
            Self::Santali => "Santali",
            Self::Gujarati => "Gujarati",
            Self::Odia => "Odia",
        }
    }

    /// Position in [`ALL_LANGUAGES`].
    pub fn index(&self) -> usize {
        // Variants are declared in table order.
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        ALL_LANGUAGES.get(index).copied()
    }

    /// Exact, case-sensitive code lookup. Codes on the wire are lowercase.
    pub fn from_code(code: &str) -> Option<Self> {
        BY_CODE.get(code).copied()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<Language> for &'static str {
    fn from(lang: Language) -> Self {
        lang.code()
    }
}

impl TryFrom<String> for Language {
    type Error = String;

    fn try_from(code: String) -> std::result::Result<Self, Self::Error> {
        Language::from_code(&code).ok_or_else(|| format!("unsupported language code '{}'", code))
    }
}

impl std::str::FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.into_language()
    }
}

/// True iff `code` is one of the enumerated language codes.
pub fn is_valid_language(code: &str) -> bool {
    Language::from_code(code).is_some()
}

/// Anything a caller may use to name a language: a [`Language`], a code, or a
/// table index. Conversion is the validation step that runs before any network
/// call.
pub trait IntoLanguage {
    fn into_language(self) -> Result<Language>;
}

impl IntoLanguage for Language {
    fn into_language(self) -> Result<Language> {
        Ok(self)
    }
}

impl IntoLanguage for &str {
    fn into_language(self) -> Result<Language> {
        Language::from_code(self).ok_or_else(|| invalid(self))
    }
}

impl IntoLanguage for &String {
    fn into_language(self) -> Result<Language> {
        self.as_str().into_language()
    }
}

impl IntoLanguage for String {
    fn into_language(self) -> Result<Language> {
        self.as_str().into_language()
    }
}

macro_rules! impl_index_selector {
    ($($t:ty),*) => {
        $(
            impl IntoLanguage for $t {
                fn into_language(self) -> Result<Language> {
                    usize::try_from(self)
                        .ok()
                        .and_then(Language::from_index)
                        .ok_or_else(|| invalid(&self.to_string()))
                }
            }
        )*
    };
}

impl_index_selector!(u8, u16, u32, u64, usize, i32, i64);

fn invalid(selector: &str) -> Error {
    Error::InvalidLanguage {
        selector: selector.to_string(),
        context: ErrorContext::new().with_source("language_table"),
    }
}

/// Snapshot of the table as `(index, code, display name)` rows.
pub fn languages() -> Vec<(usize, &'static str, &'static str)> {
    ALL_LANGUAGES
        .iter()
        .map(|l| (l.index(), l.code(), l.display_name()))
        .collect()
}

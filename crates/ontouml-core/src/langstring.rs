use serde::{Deserialize, Serialize};

/// A string paired with an optional language tag (e.g. "Car"@en).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LangString {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl LangString {
    /// Create a localized string with no language tag.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lang: None,
        }
    }

    /// Create a localized string tagged with `lang` (e.g. "en", "pt-BR").
    pub fn with_lang(text: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lang: Some(lang.into()),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lang(&self) -> Option<&str> {
        self.lang.as_deref()
    }
}

impl std::fmt::Display for LangString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.lang {
            Some(lang) => write!(f, "\"{}\"@{}", self.text, lang),
            None => write!(f, "\"{}\"", self.text),
        }
    }
}

impl From<&str> for LangString {
    fn from(text: &str) -> Self {
        LangString::new(text)
    }
}

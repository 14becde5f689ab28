use anyhow::Result;
use html_escape::decode_html_entities;
use regex::{Captures, Regex};
use unicode_normalization::UnicodeNormalization;

use crate::config::TextConfig;

/// Post body after cleaning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedText {
    pub text: String,
    /// The raw body contained at least one non-ASCII character
    pub had_unicode: bool,
}

/// Reduces post bodies to printable ASCII
pub struct TextCleaner {
    config: TextConfig,
    entity_regex: Regex,
}

impl TextCleaner {
    pub fn new(config: TextConfig) -> Result<Self> {
        Ok(Self {
            config,
            entity_regex: Regex::new(r"&(?:#[0-9]+|#[xX][0-9A-Fa-f]+|[A-Za-z][A-Za-z0-9]*);")?,
        })
    }

    /// Unescape named HTML entities, then keep printable ASCII. Non-ASCII
    /// characters are dropped, or reduced to their ASCII base when
    /// `fold_diacritics` is enabled.
    pub fn clean(&self, text: &str) -> CleanedText {
        let had_unicode = !text.is_ascii();
        let unescaped = self.unescape(text);

        let mut cleaned = String::with_capacity(unescaped.len());
        for c in unescaped.chars() {
            if c.is_ascii() {
                if c >= ' ' {
                    cleaned.push(c);
                }
            } else if self.config.fold_diacritics {
                cleaned.extend(std::iter::once(c).nfkd().filter(|d| d.is_ascii() && *d >= ' '));
            }
        }

        CleanedText {
            text: cleaned,
            had_unicode,
        }
    }

    /// Decode semicolon-terminated named and numeric entities; unknown names
    /// stay as written
    pub fn unescape(&self, text: &str) -> String {
        self.entity_regex
            .replace_all(text, |caps: &Captures| decode_html_entities(&caps[0]).into_owned())
            .into_owned()
    }
}

use anyhow::Result;
use regex::Regex;

use crate::config::TextConfig;
use crate::graph::HashtagSet;

/// Pulls normalized hashtags out of cleaned post text
pub struct HashtagExtractor {
    lowercase: bool,
    trailing_punctuation_regex: Regex,
    repeated_hash_regex: Regex,
}

impl HashtagExtractor {
    pub fn new(config: &TextConfig) -> Result<Self> {
        Ok(Self {
            lowercase: config.lowercase_hashtags,
            trailing_punctuation_regex: Regex::new(r"\W+$")?,
            repeated_hash_regex: Regex::new(r"#+")?,
        })
    }

    /// Whitespace-separated tokens that start with `#`, with trailing
    /// non-word characters trimmed and `#` runs collapsed.
    pub fn extract(&self, text: &str) -> HashtagSet {
        text.split_whitespace()
            .filter(|token| token.starts_with('#'))
            .filter_map(|token| self.normalize(token))
            .collect()
    }

    /// Normalize a single `#` token. Returns `None` when nothing but `#` remains.
    pub fn normalize(&self, token: &str) -> Option<String> {
        let trimmed = self.trailing_punctuation_regex.replace(token, "");
        let collapsed = self.repeated_hash_regex.replace_all(&trimmed, "#");

        if collapsed.trim_start_matches('#').is_empty() {
            return None;
        }

        Some(if self.lowercase {
            collapsed.to_lowercase()
        } else {
            collapsed.into_owned()
        })
    }
}

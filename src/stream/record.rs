use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::errors::RecordError;
use crate::config::defaults::{CONTROL_MESSAGE_KEYS, CREATED_AT_FIELD, TEXT_FIELD, TWITTER_TIMESTAMP_FORMAT};
use crate::config::TextConfig;
use crate::graph::HashtagSet;
use crate::text::{HashtagExtractor, TextCleaner};

/// One accepted post: its hashtags and creation time
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub hashtags: HashtagSet,
    pub created_at: DateTime<Utc>,
    pub had_unicode: bool,
}

impl Record {
    pub fn new(hashtags: HashtagSet, created_at: DateTime<Utc>) -> Self {
        Self {
            hashtags,
            created_at,
            had_unicode: false,
        }
    }
}

/// The two fields of a streamed post the pipeline reads, still unparsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPost {
    pub created_at: String,
    pub text: String,
}

impl RawPost {
    pub fn from_line(line: &str) -> Result<Self, RecordError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(RecordError::Blank);
        }

        let value: Value = serde_json::from_str(line).map_err(|e| RecordError::InvalidJson {
            message: e.to_string(),
        })?;
        let object = value.as_object().ok_or(RecordError::NotAnObject)?;

        if !object.contains_key(CREATED_AT_FIELD) {
            if let Some(kind) = CONTROL_MESSAGE_KEYS.iter().find(|key| object.contains_key(**key)) {
                return Err(RecordError::ControlMessage {
                    kind: kind.to_string(),
                });
            }
        }

        Ok(Self {
            created_at: require_string(object, CREATED_AT_FIELD)?,
            text: require_string(object, TEXT_FIELD)?,
        })
    }

    pub fn timestamp(&self) -> Result<DateTime<Utc>, RecordError> {
        parse_timestamp(&self.created_at)
    }
}

fn require_string(object: &Map<String, Value>, field: &str) -> Result<String, RecordError> {
    let value = object.get(field).ok_or_else(|| RecordError::MissingField {
        field: field.to_string(),
    })?;

    value
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| RecordError::InvalidType {
            field: field.to_string(),
            expected: "string".to_string(),
        })
}

/// Parse a creation time in Twitter, RFC 3339 or RFC 2822 form, as UTC
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RecordError> {
    let raw = raw.trim();
    DateTime::parse_from_str(raw, TWITTER_TIMESTAMP_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| RecordError::InvalidTimestamp {
            value: raw.to_string(),
        })
}

/// Turns raw input lines into records: JSON decoding, timestamp parsing,
/// body cleaning and hashtag extraction
pub struct RecordParser {
    cleaner: TextCleaner,
    extractor: HashtagExtractor,
}

impl RecordParser {
    pub fn new(config: &TextConfig) -> Result<Self> {
        Ok(Self {
            cleaner: TextCleaner::new(config.clone())?,
            extractor: HashtagExtractor::new(config)?,
        })
    }

    pub fn parse(&self, line: &str) -> Result<Record, RecordError> {
        let raw = RawPost::from_line(line)?;
        let created_at = raw.timestamp()?;
        let cleaned = self.cleaner.clean(&raw.text);

        Ok(Record {
            hashtags: self.extractor.extract(&cleaned.text),
            created_at,
            had_unicode: cleaned.had_unicode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parser() -> RecordParser {
        RecordParser::new(&TextConfig::default()).unwrap()
    }

    #[test]
    fn test_parse_tweet() {
        let record = parser()
            .parse(r#"{"created_at":"Thu Oct 29 17:51:01 +0000 2015","text":"Spark Summit East this week! #Spark #Apache","id":1}"#)
            .unwrap();

        assert_eq!(record.created_at, Utc.with_ymd_and_hms(2015, 10, 29, 17, 51, 1).unwrap());
        assert_eq!(record.hashtags.len(), 2);
        assert!(record.hashtags.contains("#Spark"));
        assert!(!record.had_unicode);
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2015, 10, 29, 17, 51, 1).unwrap();

        assert_eq!(parse_timestamp("Thu Oct 29 17:51:01 +0000 2015").unwrap(), expected);
        assert_eq!(parse_timestamp("2015-10-29T17:51:01Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2015-10-29T19:51:01+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("Thu, 29 Oct 2015 17:51:01 +0000").unwrap(), expected);
        assert_eq!(
            parse_timestamp("yesterday"),
            Err(RecordError::InvalidTimestamp {
                value: "yesterday".to_string()
            })
        );
    }

    #[test]
    fn test_limit_message_is_control() {
        let err = parser()
            .parse(r#"{"limit":{"track":19,"timestamp_ms":"1446218985758"}}"#)
            .unwrap_err();
        assert_eq!(
            err,
            RecordError::ControlMessage {
                kind: "limit".to_string()
            }
        );
        assert_eq!(err.kind(), "control_message");
    }

    #[test]
    fn test_malformed_lines() {
        let parser = parser();

        assert_eq!(parser.parse("   ").unwrap_err(), RecordError::Blank);
        assert_eq!(parser.parse("[1, 2]").unwrap_err(), RecordError::NotAnObject);
        assert!(matches!(parser.parse("{not json").unwrap_err(), RecordError::InvalidJson { .. }));
        assert_eq!(
            parser.parse(r##"{"text":"#a #b"}"##).unwrap_err(),
            RecordError::MissingField {
                field: "created_at".to_string()
            }
        );
        assert_eq!(
            parser
                .parse(r#"{"created_at":"Thu Oct 29 17:51:01 +0000 2015"}"#)
                .unwrap_err(),
            RecordError::MissingField {
                field: "text".to_string()
            }
        );
        assert_eq!(
            parser
                .parse(r##"{"created_at":12,"text":"#a"}"##)
                .unwrap_err()
                .kind(),
            "invalid_type"
        );
    }

    #[test]
    fn test_hashtags_come_from_cleaned_text() {
        let record = parser()
            .parse(r##"{"created_at":"Thu Oct 29 17:51:01 +0000 2015","text":"#Café &amp; #Bar\n#Baz"}"##)
            .unwrap();

        // Control characters are dropped, not replaced, so the newline joins two tokens
        let tags: Vec<&str> = record.hashtags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["#Bar#Baz", "#Caf"]);
        assert!(record.had_unicode);
    }

    #[test]
    fn test_entities_do_not_leak_into_hashtags() {
        let record = parser()
            .parse(r##"{"created_at":"Thu Oct 29 17:51:01 +0000 2015","text":"I #love&hearts; #Rust&rarr;"}"##)
            .unwrap();

        let tags: Vec<&str> = record.hashtags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["#Rust", "#love"]);
    }
}

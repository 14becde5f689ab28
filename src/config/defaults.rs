/// Default configuration constants for hashtag-graph

// Window defaults
pub const DEFAULT_WINDOW_SECONDS: u64 = 60;
/// Longest window a millisecond-resolution duration can represent
pub const MAX_WINDOW_SECONDS: u64 = (i64::MAX / 1000) as u64;
pub const DEFAULT_PRECISION: u32 = 2;
pub const MAX_PRECISION: u32 = 10;

// Twitter streaming API timestamp, e.g. "Thu Oct 29 17:51:01 +0000 2015"
pub const TWITTER_TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

// Record fields
pub const CREATED_AT_FIELD: &str = "created_at";
pub const TEXT_FIELD: &str = "text";

/// Top-level keys of non-tweet messages in the streaming API
pub const CONTROL_MESSAGE_KEYS: &[&str] = &[
    "limit",
    "delete",
    "scrub_geo",
    "status_withheld",
    "user_withheld",
    "disconnect",
    "warning",
];

// Cleaning output
pub const UNICODE_SUMMARY_SUFFIX: &str = "tweets contained unicode.";

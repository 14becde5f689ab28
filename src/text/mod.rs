pub mod cleaner;
pub mod hashtags;

pub use cleaner::{CleanedText, TextCleaner};
pub use hashtags::HashtagExtractor;

//! Transport message input

mod runner;

pub use runner::{parse_message_line, MessageSource, SourceError};

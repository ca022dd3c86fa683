//! Chat notifications for watch-list matches.

pub mod client;
pub mod error;
pub mod escape;
pub mod message;

pub use client::{Notifier, TelegramClient};
pub use error::NotifyError;
pub use escape::escape_markdown_v2;
pub use message::{format_match_message, MatchAlert};

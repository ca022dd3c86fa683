//! Brand classification through a hosted text-generation model.
//!
//! One batched request per classify pass; the model answers with one
//! `Merk: X, Titel: Y` string per description, in input order.

pub mod client;
pub mod error;
pub mod interpretation;

mod prompt;
mod retry;

pub use client::{ClassifierClient, RetryPolicy};
pub use error::ClassifierError;
pub use interpretation::{parse_interpretation, Interpretation};

//! HTTP handlers for edital-api.

pub mod analysis;
pub mod health;

pub use analysis::{analyze_edital, chat_edital};
pub use health::health;

//! Shared helpers used across foundry crates.
mod time_utils;

pub use time_utils::{current_unix_timestamp, is_expired_unix};

//! Data models
//!
//! Shared between parish-server and its presentation clients (via API).
//! Member IDs are snowflake `i64`.

pub mod member;

// Re-exports
pub use member::*;

//! Shared types for the parish directory
//!
//! Member records, their wire/disk representation, and the API response
//! envelope used by the server and its clients.

pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use response::ApiResponse;
pub use serde::{Deserialize, Serialize};

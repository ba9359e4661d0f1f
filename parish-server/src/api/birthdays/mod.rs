//! Birthday Routes
//!
//! GET /api/birthdays?days=N&today=YYYY-MM-DD (both optional, public)

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/birthdays", get(handler::upcoming))
}

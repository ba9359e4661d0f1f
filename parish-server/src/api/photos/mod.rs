//! Photo Routes
//!
//! - POST /api/photos: admin upload (multipart field `file`)
//! - GET /api/photos/{reference}: public

mod handler;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;
use crate::photos::MAX_FILE_SIZE;

/// Room for multipart framing around a maximum-size file
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn router() -> Router<ServerState> {
    let upload = Router::new()
        .route("/api/photos", post(handler::upload))
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + MULTIPART_OVERHEAD))
        .layer(middleware::from_fn(require_admin));

    Router::new()
        .route("/api/photos/{reference}", get(handler::serve))
        .merge(upload)
}

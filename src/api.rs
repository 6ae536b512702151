//! # API Module
//!
//! HTTP interface for the pairing service:
//!
//! - `GET /pairs` - current pairs, rotated when a week has elapsed
//! - `POST /pairs/reset` - regenerate pairs now
//! - `GET /users` - list users
//! - `POST /users` - add a user (`{"name": "..."}`)
//! - `DELETE /users/{name}` - remove a user
//! - `GET /health`, `GET /metrics`, `GET /` - system endpoints

/// Request handlers and response types
pub mod handlers;
/// Router assembly and server lifecycle
pub mod server;

// Re-export commonly used items
pub use handlers::ApiError;
pub use server::{create_app, serve_with_shutdown, start_server};

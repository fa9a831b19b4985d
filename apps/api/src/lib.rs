//! # Stockwise API
//!
//! HTTP front for checkout, offline sync and stock operations.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           API Server                                    │
//! │                                                                         │
//! │  POS client ──► HTTP (8080) ──► Authenticated(Identity)                 │
//! │                                      │                                  │
//! │                                      ▼                                  │
//! │                      routes ──► stockwise-engine ──► SQLite             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config`]. The only required setting is `STOCKWISE_JWT_SECRET`.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

// Re-exports
pub use auth::{Authenticated, JwtManager};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::AppState;

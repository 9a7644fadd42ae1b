//! Annotator Server - HTTP API for the image annotation tool
//!
//! This crate exposes account handling, image upload and bounding-box
//! storage over a small JSON API, backed by a document store and a local
//! directory of uploaded files.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `POST /signup` - Register an email/password pair
//! - `POST /login` - Check credentials
//! - `POST /upload` - Multipart upload, field `images`, up to 10 files
//! - `GET /images` - List uploaded images with absolute URLs
//! - `POST /bounding-boxes` - Save boxes for one or more images
//! - `GET /bounding-boxes` - List saved entries
//! - `GET /uploads/{file}` - Uploaded file contents
//! - `GET /test` - Connectivity check
//! - `GET /health`, `GET /ready` - Liveness and readiness probes
//!
//! Errors are returned as `{"error": "...", "code": "..."}`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;

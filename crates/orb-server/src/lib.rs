//! OrbFood Media Server Library
//!
//! HTTP server that keeps the media store in step with the catalog database.
//!
//! # Overview
//!
//! - **Cleanup webhook**: receives database change notifications and deletes
//!   assets that a change orphaned (`POST /api/v1/media/cleanup`)
//! - **Upload gateway**: signs and forwards client uploads to the media store
//!   (`POST /api/v1/media/upload`)
//! - **Health**: liveness plus store readiness (`GET /health`)
//!
//! # Architecture
//!
//! Each feature is a vertical slice under [`features`]: a command with a
//! `handle` function holding the logic, and a routes module that adapts it to
//! HTTP. The media store sits behind the [`storage::AssetStore`] trait so the
//! handlers can run against the real Cloudinary client or a test double.
//!
//! URL to asset id resolution lives in `orb_common::asset` and is shared with
//! any other crate that needs to reason about stored media.
//!
//! # Example
//!
//! ```no_run
//! use orb_server::{api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     api::serve(config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod middleware;
pub mod storage;

// Re-export commonly used types
pub use error::AppError;

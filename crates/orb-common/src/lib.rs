//! OrbFood Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the OrbFood media services.
//!
//! # Overview
//!
//! - **Assets**: delivery URL parsing and asset identifier resolution
//! - **Error Handling**: Custom error types and result types
//! - **Logging**: `tracing` subscriber setup driven by environment variables
//!
//! # Example
//!
//! ```
//! use orb_common::asset::resolve_asset_id;
//!
//! let id = resolve_asset_id("https://res.cloudinary.com/demo/image/upload/v1/shops/logo.png");
//! assert_eq!(id.map(|id| id.to_string()).as_deref(), Some("shops/logo"));
//! ```

pub mod asset;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use asset::{AssetId, AssetResolver};
pub use error::{OrbError, Result};

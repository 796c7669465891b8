//! Upload gateway
//!
//! Accepts a multipart file from the client and forwards it to the external
//! store, returning the delivery URL the database record should reference.

pub mod commands;
pub mod routes;

pub use commands::{UploadAssetCommand, UploadAssetError, UploadAssetResponse, UploadContext};
pub use routes::upload_routes;

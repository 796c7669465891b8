pub mod upload;

pub use upload::{UploadAssetCommand, UploadAssetError, UploadAssetResponse, UploadContext};

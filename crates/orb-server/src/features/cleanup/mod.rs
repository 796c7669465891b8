//! Orphaned asset cleanup
//!
//! Database change notifications arrive on a webhook. Each one is reduced to
//! the delivery URLs it left unreferenced, those are resolved to asset
//! identifiers, and the assets are deleted from the external store.

pub mod commands;
pub mod normalize;
pub mod routes;

pub use commands::{
    CleanupContext, CleanupEntry, CleanupStatus, ReconcileCommand, ReconcileError,
    ReconcileOutcome,
};
pub use normalize::{normalize, AssetFieldMap, ChangeNotification, ChangeType};
pub use routes::cleanup_routes;

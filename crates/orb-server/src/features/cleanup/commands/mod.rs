pub mod reconcile;

pub use reconcile::{
    CleanupContext, CleanupEntry, CleanupStatus, ReconcileCommand, ReconcileError,
    ReconcileOutcome,
};

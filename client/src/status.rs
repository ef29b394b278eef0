//! Observable coordinator state and failure events.

use crate::SyncError;
use gather_engine::EntityId;
use std::fmt;

/// Operation classes tracked by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    LoadAll,
    LoadOne,
    Create,
    Update,
    Delete,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::LoadAll => "load_all",
            OperationKind::LoadOne => "load_one",
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Snapshot of the coordinator's flags, published on every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncStatus {
    /// A create, update or delete is in flight
    pub loading: bool,
    /// A bulk load or a load-one miss is in flight
    pub loading_initial: bool,
    /// Bumped on every change to the cache or selection
    pub revision: u64,
}

/// A failed remote call, as seen by observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub operation: OperationKind,
    /// Target entity, absent for bulk loads
    pub id: Option<EntityId>,
    pub error: SyncError,
}

impl fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{} {} failed: {}", self.operation, id, self.error),
            None => write!(f, "{} failed: {}", self.operation, self.error),
        }
    }
}

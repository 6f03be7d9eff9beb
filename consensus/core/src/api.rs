use crate::{milestone::MilestoneIndex, milestone::RootSnapshotIndexes, tx::TransactionId};
use std::sync::Arc;

/// Read/write access to the transaction DAG, as exposed by the storage
/// layer. The engine treats this as a key-value graph keyed by transaction
/// identity; all lookups may miss for pruned or unknown transactions and
/// callers are expected to degrade gracefully on a miss.
///
/// Root-snapshot brackets are written exclusively by the propagator; all
/// other components only read them.
pub trait TangleStore: Send + Sync {
    /// The stored `[oldest, youngest]` bracket of a transaction, if assigned.
    fn root_snapshot_indexes(&self, id: TransactionId) -> Option<RootSnapshotIndexes>;

    fn set_root_snapshot_indexes(&self, id: TransactionId, indexes: RootSnapshotIndexes);

    /// The two parents referenced by a transaction, or `None` if the
    /// transaction itself is unknown.
    fn parents(&self, id: TransactionId) -> Option<(TransactionId, TransactionId)>;

    /// All currently known approvers (children) of a transaction.
    fn approvers(&self, id: TransactionId) -> Vec<TransactionId>;

    fn is_solid(&self, id: TransactionId) -> bool;

    /// The latest solid milestone index (LSMI) the node has fully applied.
    fn latest_solid_milestone_index(&self) -> MilestoneIndex;
}

pub type DynTangleStore = Arc<dyn TangleStore>;

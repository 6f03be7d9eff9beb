//! An in-memory [`TangleStore`] used by unit tests across the workspace.

use crate::{
    api::TangleStore,
    milestone::{MilestoneIndex, RootSnapshotIndexes},
    tx::TransactionId,
};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
struct TxNode {
    parents: Option<(TransactionId, TransactionId)>,
    solid: bool,
    indexes: Option<RootSnapshotIndexes>,
}

/// In-memory Tangle holding transactions, their parent links, the derived
/// approver sets, and the per-transaction root-snapshot brackets.
#[derive(Default)]
pub struct MemoryTangle {
    nodes: RwLock<HashMap<TransactionId, TxNode>>,
    approvers: RwLock<HashMap<TransactionId, Vec<TransactionId>>>,
    lsmi: RwLock<MilestoneIndex>,
}

impl MemoryTangle {
    pub fn new() -> Self {
        Default::default()
    }

    /// Inserts a parentless root transaction (the genesis of a test graph).
    pub fn add_root(&self, id: TransactionId) {
        self.nodes.write().entry(id).or_default().solid = true;
    }

    /// Inserts a solid transaction approving `parent1` and `parent2` and
    /// registers it in both parents' approver sets.
    pub fn add_transaction(&self, id: TransactionId, parent1: TransactionId, parent2: TransactionId) {
        {
            let mut nodes = self.nodes.write();
            let node = nodes.entry(id).or_default();
            node.parents = Some((parent1, parent2));
            node.solid = true;
        }
        let mut approvers = self.approvers.write();
        approvers.entry(parent1).or_default().push(id);
        if parent2 != parent1 {
            approvers.entry(parent2).or_default().push(id);
        }
    }

    pub fn set_solid(&self, id: TransactionId, solid: bool) {
        if let Some(node) = self.nodes.write().get_mut(&id) {
            node.solid = solid;
        }
    }

    /// Drops a transaction entirely, simulating pruned history. Approver
    /// links pointing at the pruned transaction remain, as they do in a real
    /// store whose pruning runs independently.
    pub fn prune(&self, id: TransactionId) {
        self.nodes.write().remove(&id);
    }

    pub fn set_latest_solid_milestone_index(&self, index: MilestoneIndex) {
        *self.lsmi.write() = index;
    }
}

impl TangleStore for MemoryTangle {
    fn root_snapshot_indexes(&self, id: TransactionId) -> Option<RootSnapshotIndexes> {
        self.nodes.read().get(&id).and_then(|node| node.indexes)
    }

    fn set_root_snapshot_indexes(&self, id: TransactionId, indexes: RootSnapshotIndexes) {
        if let Some(node) = self.nodes.write().get_mut(&id) {
            node.indexes = Some(indexes);
        }
    }

    fn parents(&self, id: TransactionId) -> Option<(TransactionId, TransactionId)> {
        self.nodes.read().get(&id).and_then(|node| node.parents)
    }

    fn approvers(&self, id: TransactionId) -> Vec<TransactionId> {
        self.approvers.read().get(&id).cloned().unwrap_or_default()
    }

    fn is_solid(&self, id: TransactionId) -> bool {
        self.nodes.read().get(&id).is_some_and(|node| node.solid)
    }

    fn latest_solid_milestone_index(&self) -> MilestoneIndex {
        *self.lsmi.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_tangle_links() {
        let tangle = MemoryTangle::new();
        let a = TransactionId::from_u64(1);
        let b = TransactionId::from_u64(2);
        tangle.add_root(a);
        tangle.add_transaction(b, a, a);

        assert!(tangle.is_solid(a));
        assert_eq!(tangle.parents(b), Some((a, a)));
        // b approves a through both parent slots but is registered once
        assert_eq!(tangle.approvers(a), vec![b]);
        assert!(tangle.root_snapshot_indexes(b).is_none());

        tangle.set_root_snapshot_indexes(b, RootSnapshotIndexes::for_milestone(3));
        assert_eq!(tangle.root_snapshot_indexes(b), Some(RootSnapshotIndexes::for_milestone(3)));

        tangle.prune(a);
        assert!(!tangle.is_solid(a));
        assert!(tangle.parents(a).is_none());
    }
}

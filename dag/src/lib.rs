//! Root-snapshot-index propagation over the future cone of a confirmed
//! milestone.
//!
//! Whenever a milestone confirms a set of tail transactions, every
//! transaction in their future cone may have to widen its `[oldest,
//! youngest]` milestone bracket. The walk below performs that update with an
//! explicit work queue: the DAG is acyclic but full of shared ancestry
//! (diamonds), so a naive recursive walk would revisit the same nodes over
//! and over. Termination relies on the rewrite-on-change rule: a child whose
//! recomputed bracket equals its stored one is not descended into again.

use std::collections::{HashSet, VecDeque};

use tangle_consensus_core::{MilestoneIndex, RootSnapshotIndexes, TangleStore, TransactionId};
use tangle_core::time::Stopwatch;

/// Rewrites the root-snapshot brackets across the future cone of
/// `tails_referenced`, the set of tails newly confirmed by milestone
/// `milestone_index`.
///
/// Every confirmed tail is seeded with the degenerate bracket
/// `[milestone_index, milestone_index]`. The walk then expands through
/// approvers breadth-first; each visited child gets the union of its solid
/// parents' brackets and is re-expanded only if that union differs from what
/// the store already holds. Parents that are unknown to the store (pruned
/// history) contribute nothing rather than failing the pass.
///
/// Returns the number of transactions whose bracket actually changed.
pub fn update_transaction_root_snapshot_indexes(
    store: &dyn TangleStore,
    tails_referenced: &[TransactionId],
    milestone_index: MilestoneIndex,
) -> usize {
    let _sw = Stopwatch::<100>::with_threshold("update_transaction_root_snapshot_indexes");

    let confirmed: HashSet<TransactionId> = tails_referenced.iter().copied().collect();
    let mut frontier: VecDeque<TransactionId> = VecDeque::with_capacity(tails_referenced.len());
    let mut updated = 0;

    let seed = RootSnapshotIndexes::for_milestone(milestone_index);
    for &tail in tails_referenced {
        if store.root_snapshot_indexes(tail) != Some(seed) {
            store.set_root_snapshot_indexes(tail, seed);
            updated += 1;
        }
        frontier.push_back(tail);
    }

    while let Some(current) = frontier.pop_front() {
        for child in store.approvers(current) {
            // Brackets confirmed in this very pass are authoritative and are
            // never overwritten by a parent union; the child is already a
            // frontier seed, so its own cone still gets expanded.
            if confirmed.contains(&child) {
                continue;
            }
            if !store.is_solid(child) {
                continue;
            }
            let Some(candidate) = bracket_from_parents(store, child) else {
                // None of the child's parents carries a bracket yet. The
                // child is reached again once one of them is rewritten.
                continue;
            };
            if store.root_snapshot_indexes(child) == Some(candidate) {
                continue;
            }
            store.set_root_snapshot_indexes(child, candidate);
            updated += 1;
            frontier.push_back(child);
        }
    }

    updated
}

/// The union of the brackets of all resolvable solid parents of `id`, or
/// `None` when no parent contributes one.
fn bracket_from_parents(store: &dyn TangleStore, id: TransactionId) -> Option<RootSnapshotIndexes> {
    let (parent1, parent2) = store.parents(id)?;
    let mut bracket: Option<RootSnapshotIndexes> = None;
    for parent in [parent1, parent2] {
        if !store.is_solid(parent) {
            continue;
        }
        if let Some(parent_bracket) = store.root_snapshot_indexes(parent) {
            bracket = Some(match bracket {
                Some(current) => current.union(&parent_bracket),
                None => parent_bracket,
            });
        }
    }
    bracket
}

//! Pure admission and scoring policy.
//!
//! Admission evaluates its rejection rules in a fixed, load-bearing order
//! (youngest delta, oldest delta, below-max-depth, retention limit). The
//! numeric score itself is a tunable policy behind this contract: any
//! function monotone in recency and bracket narrowness preserves the
//! selection semantics.

use crate::config::PoolConfig;
use tangle_consensus_core::{MilestoneIndex, RootSnapshotIndexes};

/// Snapshot of a pool's current fill level, consulted by the retention rule.
#[derive(Clone, Copy, Debug)]
pub struct PoolOccupancy {
    pub len: usize,
    pub worst_score: Option<u64>,
}

/// Decides whether a tip with bracket `indexes` may enter a pool under the
/// given LSMI, and computes its score if so.
///
/// `occupancy` carries the pool fill level for the retention rule; pass
/// `None` when re-scoring an existing member, which is exempt from it.
pub fn admit(
    indexes: &RootSnapshotIndexes,
    lsmi: MilestoneIndex,
    config: &PoolConfig,
    occupancy: Option<PoolOccupancy>,
) -> Option<u64> {
    let delta_youngest = lsmi.saturating_sub(indexes.youngest);
    if delta_youngest > config.max_delta_youngest_to_lsmi {
        return None;
    }

    let delta_oldest = lsmi.saturating_sub(indexes.oldest);
    if delta_oldest > config.max_delta_oldest_to_lsmi {
        return None;
    }

    // The oldest bound is the candidate's confirming-milestone anchor; a
    // branch anchored below max depth is lazy beyond recovery.
    if delta_oldest > config.below_max_depth {
        return None;
    }

    let score = score(indexes, lsmi, config);

    if let Some(occupancy) = occupancy {
        if occupancy.len >= config.retention_rules_tips_limit && !occupancy.worst_score.map(|worst| score > worst).unwrap_or(true) {
            return None;
        }
    }

    Some(score)
}

/// Score of an admissible tip: the sum of its remaining headroom under the
/// youngest and oldest delta thresholds plus a narrowness bonus. Tips with
/// narrow brackets anchored at the confirmed frontier score highest and so
/// become the preferred parents.
pub fn score(indexes: &RootSnapshotIndexes, lsmi: MilestoneIndex, config: &PoolConfig) -> u64 {
    let recency = config.max_delta_youngest_to_lsmi.saturating_sub(lsmi.saturating_sub(indexes.youngest));
    let depth_headroom = config.max_delta_oldest_to_lsmi.saturating_sub(lsmi.saturating_sub(indexes.oldest));
    let narrowness = config.max_delta_oldest_to_lsmi.saturating_sub(indexes.width());
    recency as u64 + depth_headroom as u64 + narrowness as u64
}

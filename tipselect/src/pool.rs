use crate::config::PoolConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use tangle_consensus_core::TransactionId;

/// The two admission tiers. Non-lazy tips sit closest to consensus and are
/// the preferred parents; semi-lazy tips are the wider fallback that keeps
/// orphaned-but-valid branches reachable when the non-lazy pool runs dry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolKind {
    NonLazy,
    SemiLazy,
}

impl Display for PoolKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolKind::NonLazy => f.write_str("non-lazy"),
            PoolKind::SemiLazy => f.write_str("semi-lazy"),
        }
    }
}

/// Pool-entry bookkeeping for a single tip.
#[derive(Clone, Debug)]
pub struct TipMetadata {
    tail: TransactionId,
    score: u64,
    inserted_at: u64,
    approver_count: u32,
    first_referenced_at: Option<u64>,
}

impl TipMetadata {
    pub fn new(tail: TransactionId, score: u64, inserted_at: u64) -> Self {
        Self { tail, score, inserted_at, approver_count: 0, first_referenced_at: None }
    }

    pub fn tail(&self) -> TransactionId {
        self.tail
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn approver_count(&self) -> u32 {
        self.approver_count
    }
}

/// One tip pool instance. Not internally synchronized; each instance lives
/// behind its own lock in the selector so the two tiers never block each
/// other.
pub struct TipPool {
    kind: PoolKind,
    tips: HashMap<TransactionId, TipMetadata>,
}

impl TipPool {
    pub fn new(kind: PoolKind) -> Self {
        Self { kind, tips: HashMap::new() }
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.tips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tips.is_empty()
    }

    pub fn contains(&self, id: &TransactionId) -> bool {
        self.tips.contains_key(id)
    }

    pub fn insert(&mut self, metadata: TipMetadata) {
        self.tips.insert(metadata.tail, metadata);
    }

    pub fn remove(&mut self, id: &TransactionId) -> Option<TipMetadata> {
        self.tips.remove(id)
    }

    pub fn update_score(&mut self, id: &TransactionId, score: u64) -> bool {
        match self.tips.get_mut(id) {
            Some(metadata) => {
                metadata.score = score;
                true
            }
            None => false,
        }
    }

    pub fn ids(&self) -> Vec<TransactionId> {
        self.tips.keys().copied().collect()
    }

    /// The preferred tip: highest score, ties broken by earlier insertion
    /// (older tips first, which bounds pool growth and speeds convergence),
    /// then by id for determinism.
    pub fn best_tip(&self) -> Option<TransactionId> {
        self.tips
            .values()
            .max_by(|x, y| {
                x.score.cmp(&y.score).then_with(|| y.inserted_at.cmp(&x.inserted_at)).then_with(|| y.tail.cmp(&x.tail))
            })
            .map(|metadata| metadata.tail)
    }

    pub fn worst_score(&self) -> Option<u64> {
        self.tips.values().map(|metadata| metadata.score).min()
    }

    /// Drops the lowest-scoring member (newest on ties) to make room.
    pub fn evict_worst(&mut self) -> Option<TransactionId> {
        let worst = self
            .tips
            .values()
            .min_by(|x, y| x.score.cmp(&y.score).then_with(|| y.inserted_at.cmp(&x.inserted_at)).then_with(|| y.tail.cmp(&x.tail)))
            .map(|metadata| metadata.tail)?;
        self.tips.remove(&worst);
        Some(worst)
    }

    /// Records that `id` was referenced by a newly arrived transaction and
    /// returns the updated approver count if `id` is a member.
    pub fn on_tip_referenced(&mut self, id: &TransactionId, now_ms: u64) -> Option<u32> {
        let metadata = self.tips.get_mut(id)?;
        metadata.approver_count += 1;
        metadata.first_referenced_at.get_or_insert(now_ms);
        Some(metadata.approver_count)
    }

    /// Evicts every member that stopped being a usable tip: referenced by
    /// more than `max_approvers` transactions, or first referenced longer
    /// than `max_referenced_tip_age` ago. Returns the eviction count.
    pub fn evict_referenced(&mut self, now_ms: u64, config: &PoolConfig) -> usize {
        let max_age_ms = config.max_referenced_tip_age.as_millis() as u64;
        let before = self.tips.len();
        self.tips.retain(|_, metadata| {
            if metadata.approver_count > config.max_approvers {
                return false;
            }
            match metadata.first_referenced_at {
                Some(first) => now_ms.saturating_sub(first) <= max_age_ms,
                None => true,
            }
        });
        before - self.tips.len()
    }
}

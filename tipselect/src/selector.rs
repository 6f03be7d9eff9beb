use crate::{
    config::Config,
    errors::{TipSelectError, TipSelectResult},
    pool::{PoolKind, TipMetadata, TipPool},
    score::{admit, PoolOccupancy},
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use tangle_consensus_core::{bundle::Bundle, DynTangleStore, RootSnapshotIndexes, TransactionId};
use tangle_core::{debug, time::unix_now};

/// Relaxed counters for observability; admission rejections are not logged
/// and are only visible here.
#[derive(Default)]
pub struct TipSelectorCounters {
    pub admitted: AtomicU64,
    pub rejected: AtomicU64,
    pub evicted: AtomicU64,
}

impl TipSelectorCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }
}

/// Orchestrates the two tip pools against the DAG store.
///
/// Constructed once at startup with validated configuration and shared by
/// reference with the confirmation handler, the cleanup service, and tip
/// consumers (issuance, API). Pool membership is mutated only through this
/// type.
pub struct TipSelector {
    config: Config,
    store: DynTangleStore,
    non_lazy: Mutex<TipPool>,
    semi_lazy: Mutex<TipPool>,
    // Tails that already went through intake, whether admitted, rejected, or
    // since evicted. Entries are dropped once the tail leaves the admission
    // window for good.
    processed: Mutex<HashSet<TransactionId>>,
    counters: TipSelectorCounters,
}

impl TipSelector {
    /// `config` must have passed [`Config::validate`]; threshold errors are
    /// fatal at startup, not here.
    pub fn new(config: Config, store: DynTangleStore) -> Self {
        Self {
            config,
            store,
            non_lazy: Mutex::new(TipPool::new(PoolKind::NonLazy)),
            semi_lazy: Mutex::new(TipPool::new(PoolKind::SemiLazy)),
            processed: Mutex::new(HashSet::new()),
            counters: TipSelectorCounters::default(),
        }
    }

    pub fn counters(&self) -> &TipSelectorCounters {
        &self.counters
    }

    pub fn tip_count(&self, kind: PoolKind) -> usize {
        self.pool(kind).lock().len()
    }

    pub fn contains(&self, kind: PoolKind, id: &TransactionId) -> bool {
        self.pool(kind).lock().contains(id)
    }

    fn pool(&self, kind: PoolKind) -> &Mutex<TipPool> {
        match kind {
            PoolKind::NonLazy => &self.non_lazy,
            PoolKind::SemiLazy => &self.semi_lazy,
        }
    }

    /// Offers a freshly solidified bundle as a tip candidate.
    ///
    /// Invalid bundles are dropped silently. The candidate runs admission
    /// against each pool independently and may enter non-lazy, semi-lazy,
    /// both, or neither. The bundle's parents lose one approver slot each,
    /// which may evict them from the pools. Intake is idempotent: a
    /// redelivered tail is a no-op regardless of the first delivery's
    /// outcome.
    pub fn add_tip(&self, bundle: &Bundle) {
        if !bundle.is_valid() || !bundle.valid_strict_semantics() || bundle.is_invalid_past_cone() {
            return;
        }

        let tail = bundle.tail();
        // Events arrive at-least-once; a tail that went through intake once
        // is never accounted again, even after eviction or rejection, so a
        // redelivery neither resurrects the tip nor re-bumps its parents'
        // approver counts.
        if !self.processed.lock().insert(tail) {
            return;
        }
        let now = unix_now();
        self.reference_parents_of(tail, now);

        let Some(indexes) = self.tip_indexes(tail) else {
            // Without a root-snapshot bracket there is nothing to score
            // against; the candidate is simply not admitted.
            TipSelectorCounters::bump(&self.counters.rejected);
            return;
        };
        let lsmi = self.store.latest_solid_milestone_index();

        for kind in [PoolKind::NonLazy, PoolKind::SemiLazy] {
            let pool_config = self.config.pool(kind);
            let mut pool = self.pool(kind).lock();

            if pool.len() > pool_config.spammer_tips_threshold && bundle.is_spam_source() {
                TipSelectorCounters::bump(&self.counters.rejected);
                continue;
            }

            let occupancy = PoolOccupancy { len: pool.len(), worst_score: pool.worst_score() };
            match admit(&indexes, lsmi, pool_config, Some(occupancy)) {
                Some(score) => {
                    if pool.len() >= pool_config.retention_rules_tips_limit {
                        if pool.evict_worst().is_some() {
                            TipSelectorCounters::bump(&self.counters.evicted);
                        }
                    }
                    pool.insert(TipMetadata::new(tail, score, now));
                    TipSelectorCounters::bump(&self.counters.admitted);
                }
                None => TipSelectorCounters::bump(&self.counters.rejected),
            }
        }
    }

    /// Re-scores every pool member against the current LSMI and evicts the
    /// ones that no longer pass admission. Called by the confirmation
    /// handler after root-snapshot propagation for that milestone completed.
    pub fn update_scores(&self) -> usize {
        let lsmi = self.store.latest_solid_milestone_index();
        let mut removed = 0;

        for kind in [PoolKind::NonLazy, PoolKind::SemiLazy] {
            let pool_config = self.config.pool(kind);
            let mut pool = self.pool(kind).lock();
            for id in pool.ids() {
                let admitted = self.tip_indexes(id).and_then(|indexes| admit(&indexes, lsmi, pool_config, None));
                match admitted {
                    Some(score) => {
                        pool.update_score(&id, score);
                    }
                    None => {
                        pool.remove(&id);
                        removed += 1;
                    }
                }
            }
        }

        // A tail whose youngest bound fell out of the loosest admission
        // window can never re-enter a pool (the LSMI only grows), so its
        // intake record is no longer needed. A parent-union bracket only ever
        // has an older youngest bound than its children's, so any parent of a
        // pruned tail was already swept from the pools above.
        let max_delta_youngest =
            self.config.non_lazy.max_delta_youngest_to_lsmi.max(self.config.semi_lazy.max_delta_youngest_to_lsmi);
        self.processed.lock().retain(|&tail| match self.tip_indexes(tail) {
            Some(indexes) => lsmi.saturating_sub(indexes.youngest) <= max_delta_youngest,
            None => true,
        });

        TipSelectorCounters::add(&self.counters.evicted, removed as u64);
        removed
    }

    /// Sweeps both pools for tips that have since been approved past their
    /// limits and are no longer usable parents. Invoked periodically.
    pub fn clean_up_referenced_tips(&self) -> usize {
        let now = unix_now();
        let mut removed = 0;
        for kind in [PoolKind::NonLazy, PoolKind::SemiLazy] {
            removed += self.pool(kind).lock().evict_referenced(now, self.config.pool(kind));
        }
        TipSelectorCounters::add(&self.counters.evicted, removed as u64);
        removed
    }

    /// Picks `count` parent candidates, preferring the non-lazy pool and
    /// falling back to semi-lazy per slot. With a single available tip the
    /// same id may fill several slots.
    pub fn select_tips(&self, count: usize) -> TipSelectResult<Vec<TransactionId>> {
        let mut tips = Vec::with_capacity(count);
        for _ in 0..count {
            let tip = match self.non_lazy.lock().best_tip() {
                Some(tip) => tip,
                None => self.semi_lazy.lock().best_tip().ok_or(TipSelectError::NoTipsAvailable)?,
            };
            tips.push(tip);
        }
        Ok(tips)
    }

    /// The candidate's bracket: the stored one, or, for a transaction the
    /// propagator has not reached yet, the union of its solid parents'
    /// brackets. Pool state is never written back to the store here.
    fn tip_indexes(&self, tail: TransactionId) -> Option<RootSnapshotIndexes> {
        if let Some(indexes) = self.store.root_snapshot_indexes(tail) {
            return Some(indexes);
        }
        let (parent1, parent2) = self.store.parents(tail)?;
        let mut indexes: Option<RootSnapshotIndexes> = None;
        for parent in [parent1, parent2] {
            if !self.store.is_solid(parent) {
                continue;
            }
            if let Some(parent_indexes) = self.store.root_snapshot_indexes(parent) {
                indexes = Some(match indexes {
                    Some(current) => current.union(&parent_indexes),
                    None => parent_indexes,
                });
            }
        }
        indexes
    }

    /// Accounts one approver against each distinct parent of `tail` and
    /// eagerly evicts parents that crossed their approver limit.
    fn reference_parents_of(&self, tail: TransactionId, now: u64) {
        let Some((parent1, parent2)) = self.store.parents(tail) else {
            return;
        };
        let parents = if parent1 == parent2 { vec![parent1] } else { vec![parent1, parent2] };
        for kind in [PoolKind::NonLazy, PoolKind::SemiLazy] {
            let max_approvers = self.config.pool(kind).max_approvers;
            let mut pool = self.pool(kind).lock();
            for parent in &parents {
                if let Some(count) = pool.on_tip_referenced(parent, now) {
                    if count > max_approvers {
                        pool.remove(parent);
                        TipSelectorCounters::bump(&self.counters.evicted);
                        debug!("evicted tip {} from the {} pool after {} approvers", parent, pool.kind(), count);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tangle_consensus_core::testutils::MemoryTangle;
    use tangle_consensus_core::MilestoneIndex;
    use tangle_dag::update_transaction_root_snapshot_indexes;

    fn tx(word: u64) -> TransactionId {
        TransactionId::from_u64(word)
    }

    fn pool_config(max_delta: u32, retention: usize) -> crate::config::PoolConfig {
        crate::config::PoolConfig {
            max_delta_youngest_to_lsmi: max_delta,
            max_delta_oldest_to_lsmi: max_delta,
            below_max_depth: 15.max(max_delta),
            retention_rules_tips_limit: retention,
            max_referenced_tip_age: Duration::from_secs(3),
            max_approvers: 2,
            spammer_tips_threshold: retention,
        }
    }

    fn config(max_delta: u32) -> Config {
        Config { non_lazy: pool_config(max_delta, 100), semi_lazy: pool_config(max_delta, 20) }
    }

    /// A confirmed root plus two tip candidates approving it, with the
    /// root-snapshot brackets already propagated for the given milestone.
    fn seeded_tangle(index: MilestoneIndex) -> (Arc<MemoryTangle>, TransactionId, TransactionId, TransactionId) {
        let tangle = Arc::new(MemoryTangle::new());
        let (a, b, c) = (tx(1), tx(2), tx(3));
        tangle.add_root(a);
        tangle.add_transaction(b, a, a);
        tangle.add_transaction(c, a, a);
        update_transaction_root_snapshot_indexes(tangle.as_ref(), &[a], index);
        tangle.set_latest_solid_milestone_index(index);
        (tangle, a, b, c)
    }

    #[test]
    fn test_add_and_select_prefers_higher_score() {
        let (tangle, a, b, _) = seeded_tangle(100);
        let d = tx(4);
        tangle.add_transaction(d, b, b);
        update_transaction_root_snapshot_indexes(tangle.as_ref(), &[b], 101);
        tangle.set_latest_solid_milestone_index(101);

        let selector = TipSelector::new(config(5), tangle.clone());
        selector.add_tip(&Bundle::new(tx(3), vec![tx(3)]));
        selector.add_tip(&Bundle::new(d, vec![d]));

        // d's bracket [101, 101] beats c's [100, 100] under LSMI 101
        assert_eq!(selector.select_tips(1), Ok(vec![d]));
        assert_eq!(selector.select_tips(2), Ok(vec![d, d]));
    }

    #[test]
    fn test_invalid_bundles_are_ignored() {
        let (tangle, _, b, _) = seeded_tangle(100);
        let selector = TipSelector::new(config(5), tangle);

        let mut invalid = Bundle::new(b, vec![b]);
        invalid.mark_invalid();
        selector.add_tip(&invalid);

        let mut lax = Bundle::new(b, vec![b]);
        lax.mark_lax_semantics();
        selector.add_tip(&lax);

        let mut bad_cone = Bundle::new(b, vec![b]);
        bad_cone.mark_invalid_past_cone();
        selector.add_tip(&bad_cone);

        assert_eq!(selector.tip_count(PoolKind::NonLazy), 0);
        assert_eq!(selector.select_tips(1), Err(TipSelectError::NoTipsAvailable));
    }

    #[test]
    fn test_semi_lazy_fallback() {
        let (tangle, _, b, _) = seeded_tangle(100);
        tangle.set_latest_solid_milestone_index(103);

        // Non-lazy accepts only delta <= 2, semi-lazy up to 15: a tip with
        // youngest delta 3 lands in the semi-lazy pool alone
        let config = Config { non_lazy: pool_config(2, 100), semi_lazy: pool_config(15, 20) };
        let selector = TipSelector::new(config, tangle);
        selector.add_tip(&Bundle::new(b, vec![b]));

        assert!(!selector.contains(PoolKind::NonLazy, &b));
        assert!(selector.contains(PoolKind::SemiLazy, &b));
        assert_eq!(selector.select_tips(1), Ok(vec![b]));
    }

    #[test]
    fn test_membership_is_independent_across_pools() {
        let (tangle, _, b, _) = seeded_tangle(100);
        let selector = TipSelector::new(config(5), tangle);
        selector.add_tip(&Bundle::new(b, vec![b]));
        assert!(selector.contains(PoolKind::NonLazy, &b));
        assert!(selector.contains(PoolKind::SemiLazy, &b));

        // Removing from one pool must not affect the other
        selector.pool(PoolKind::SemiLazy).lock().remove(&b);
        assert!(selector.contains(PoolKind::NonLazy, &b));
        assert!(!selector.contains(PoolKind::SemiLazy, &b));
    }

    #[test]
    fn test_spammer_gating_above_threshold() {
        let (tangle, _, b, c) = seeded_tangle(100);
        let mut config = config(5);
        config.non_lazy.spammer_tips_threshold = 0;
        config.semi_lazy.spammer_tips_threshold = 0;
        let selector = TipSelector::new(config, tangle);

        // While the pools are empty the spam flag is irrelevant
        let mut spam = Bundle::new(b, vec![b]);
        spam.mark_spam_source();
        selector.add_tip(&spam);
        assert!(selector.contains(PoolKind::NonLazy, &b));

        // Above the threshold, flagged bundles are refused outright
        let mut spam = Bundle::new(c, vec![c]);
        spam.mark_spam_source();
        selector.add_tip(&spam);
        assert!(!selector.contains(PoolKind::NonLazy, &c));
        assert!(!selector.contains(PoolKind::SemiLazy, &c));
    }

    #[test]
    fn test_approver_limit_evicts_parent_tips() {
        let (tangle, a, b, _) = seeded_tangle(100);
        let selector = TipSelector::new(config(5), tangle.clone());
        selector.add_tip(&Bundle::new(b, vec![b]));
        assert!(selector.contains(PoolKind::NonLazy, &b));

        // Three children approving b push it past max_approvers (2)
        for word in 10..13 {
            let child = tx(word);
            tangle.add_transaction(child, b, a);
            selector.add_tip(&Bundle::new(child, vec![child]));
        }
        assert!(!selector.contains(PoolKind::NonLazy, &b));
        assert!(!selector.contains(PoolKind::SemiLazy, &b));
    }

    #[test]
    fn test_duplicate_delivery_does_not_resurrect_evicted_tips() {
        let (tangle, a, b, _) = seeded_tangle(100);
        let selector = TipSelector::new(config(5), tangle.clone());
        selector.add_tip(&Bundle::new(b, vec![b]));

        for word in 10..13 {
            let child = tx(word);
            tangle.add_transaction(child, b, a);
            selector.add_tip(&Bundle::new(child, vec![child]));
        }
        assert!(!selector.contains(PoolKind::NonLazy, &b));

        // A redelivered solidification of b must stay a no-op
        selector.add_tip(&Bundle::new(b, vec![b]));
        assert!(!selector.contains(PoolKind::NonLazy, &b));
        assert!(!selector.contains(PoolKind::SemiLazy, &b));
    }

    #[test]
    fn test_duplicate_delivery_spares_parent_approver_slots() {
        let (tangle, a, b, _) = seeded_tangle(100);
        let selector = TipSelector::new(config(5), tangle.clone());
        selector.add_tip(&Bundle::new(b, vec![b]));

        // The candidate misses the admission window, so it never enters a
        // pool; redeliveries must not account further approvers against b
        tangle.set_latest_solid_milestone_index(106);
        let child = tx(10);
        tangle.add_transaction(child, b, a);
        for _ in 0..3 {
            selector.add_tip(&Bundle::new(child, vec![child]));
        }
        assert!(!selector.contains(PoolKind::NonLazy, &child));
        assert!(selector.contains(PoolKind::NonLazy, &b));
        assert!(selector.contains(PoolKind::SemiLazy, &b));
    }

    #[test]
    fn test_retention_limit_keeps_best_members() {
        let (tangle, a, _, _) = seeded_tangle(100);
        let mut config = config(5);
        config.non_lazy.retention_rules_tips_limit = 2;
        config.non_lazy.max_approvers = 1000;
        config.semi_lazy.max_approvers = 1000;
        let selector = TipSelector::new(config, tangle.clone());

        for word in 20..24 {
            let id = tx(word);
            tangle.add_transaction(id, a, a);
            selector.add_tip(&Bundle::new(id, vec![id]));
        }
        // Equal scores: a full pool admits no non-improving candidate
        assert_eq!(selector.tip_count(PoolKind::NonLazy), 2);
    }

    /// The end-to-end confirmation scenario: tips admitted at LSMI 100 are
    /// evicted once the LSMI outruns the configured delta window.
    #[test]
    fn test_milestone_sweep_empties_pools() {
        let (tangle, _, b, c) = seeded_tangle(100);
        let selector = TipSelector::new(config(5), tangle.clone());

        selector.add_tip(&Bundle::new(b, vec![b]));
        selector.add_tip(&Bundle::new(c, vec![c]));
        assert_eq!(selector.tip_count(PoolKind::NonLazy), 2);
        assert!(selector.select_tips(2).is_ok());

        // LSMI advances to 106: delta 6 exceeds the configured 5 for both pools
        tangle.set_latest_solid_milestone_index(106);
        let removed = selector.update_scores();
        assert_eq!(removed, 4);
        assert_eq!(selector.tip_count(PoolKind::NonLazy), 0);
        assert_eq!(selector.tip_count(PoolKind::SemiLazy), 0);
        assert_eq!(selector.select_tips(2), Err(TipSelectError::NoTipsAvailable));
    }

    #[test]
    fn test_update_scores_refreshes_surviving_members() {
        let (tangle, _, b, c) = seeded_tangle(100);
        let selector = TipSelector::new(config(5), tangle.clone());
        selector.add_tip(&Bundle::new(b, vec![b]));
        selector.add_tip(&Bundle::new(c, vec![c]));

        // Milestone 101 confirms b: c keeps [100, 100] and survives, b
        // collapses onto [101, 101] and scores above c afterwards
        update_transaction_root_snapshot_indexes(tangle.as_ref(), &[b], 101);
        tangle.set_latest_solid_milestone_index(101);
        assert_eq!(selector.update_scores(), 0);
        assert_eq!(selector.select_tips(1), Ok(vec![b]));
    }

    #[test]
    fn test_cleanup_evicts_aged_referenced_tips() {
        let (tangle, a, b, _) = seeded_tangle(100);
        let mut config = config(5);
        config.non_lazy.max_referenced_tip_age = Duration::from_millis(1);
        config.semi_lazy.max_referenced_tip_age = Duration::from_millis(1);
        let selector = TipSelector::new(config, tangle.clone());
        selector.add_tip(&Bundle::new(b, vec![b]));

        // One approver marks b as referenced; once past the 1 ms age
        // allowance the next sweep drops it from both pools
        let child = tx(10);
        tangle.add_transaction(child, b, a);
        selector.add_tip(&Bundle::new(child, vec![child]));
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(selector.clean_up_referenced_tips(), 2);
        assert!(!selector.contains(PoolKind::NonLazy, &b));
        assert!(!selector.contains(PoolKind::SemiLazy, &b));
    }
}

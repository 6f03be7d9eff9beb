use crate::{bundle::Bundle, milestone::MilestoneIndex, tx::TransactionId};
use std::sync::Arc;

/// Domain events consumed by the tip selection engine.
///
/// Events are delivered over a typed channel in strict production order;
/// handlers must tolerate duplicate delivery (at-least-once semantics).
#[derive(Debug, Clone)]
pub enum TangleEvent {
    BundleSolid(Arc<Bundle>),
    MilestoneConfirmed(Arc<MilestoneConfirmation>),
}

/// Emitted once a milestone has been validated and applied: the index it
/// carries and the set of tail transactions it newly confirms, which seeds
/// the root-snapshot-index propagation frontier.
#[derive(Debug, Clone)]
pub struct MilestoneConfirmation {
    pub milestone_index: MilestoneIndex,
    pub tails_referenced: Vec<TransactionId>,
}

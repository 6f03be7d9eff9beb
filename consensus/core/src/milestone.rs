use serde::{Deserialize, Serialize};

/// Index of a coordinator milestone. Milestones are strictly ordered by
/// index and define the confirmation checkpoints of the Tangle.
pub type MilestoneIndex = u32;

/// The `[oldest, youngest]` milestone-index bracket summarizing the
/// confirmed-milestone ancestry reachable from a transaction (both bounds
/// inclusive). A transaction confirmed directly by milestone `i` carries the
/// degenerate bracket `[i, i]`; everything else derives its bracket from the
/// union of its parents' brackets.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RootSnapshotIndexes {
    pub oldest: MilestoneIndex,
    pub youngest: MilestoneIndex,
}

impl RootSnapshotIndexes {
    pub fn new(oldest: MilestoneIndex, youngest: MilestoneIndex) -> Self {
        debug_assert!(oldest <= youngest);
        Self { oldest, youngest }
    }

    /// The bracket of a transaction directly referenced by milestone `index`.
    pub fn for_milestone(index: MilestoneIndex) -> Self {
        Self { oldest: index, youngest: index }
    }

    /// Widens this bracket to cover `other` as well: the union keeps the
    /// minimum oldest and the maximum youngest of the two.
    pub fn union(&self, other: &Self) -> Self {
        Self { oldest: self.oldest.min(other.oldest), youngest: self.youngest.max(other.youngest) }
    }

    pub fn is_ordered(&self) -> bool {
        self.oldest <= self.youngest
    }

    /// Number of milestones spanned by the bracket. Narrow brackets indicate
    /// ancestry anchored close to a single confirmation checkpoint.
    pub fn width(&self) -> u32 {
        self.youngest - self.oldest
    }
}

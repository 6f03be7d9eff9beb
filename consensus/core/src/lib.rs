pub mod api;
pub mod bundle;
pub mod events;
pub mod milestone;
pub mod testutils;
pub mod tx;

pub use api::{DynTangleStore, TangleStore};
pub use milestone::{MilestoneIndex, RootSnapshotIndexes};
pub use tx::TransactionId;

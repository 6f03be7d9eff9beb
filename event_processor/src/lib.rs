pub mod cleanup;
pub mod errors;
pub mod processor;

pub(crate) const IDENT: &str = "TangleEventProcessor";

pub use cleanup::TipCleanupService;
pub use processor::EventProcessor;

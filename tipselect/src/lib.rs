pub mod config;
pub mod errors;
pub mod pool;
pub mod score;
pub mod selector;

pub use config::{Config, PoolConfig};
pub use errors::{TipSelectError, TipSelectResult};
pub use pool::PoolKind;
pub use selector::TipSelector;

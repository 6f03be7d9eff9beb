use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TipSelectError {
    /// Both pools are empty. Recoverable: issuers fall back to referencing a
    /// known confirmed transaction instead of failing issuance.
    #[error("no tips available in any pool")]
    NoTipsAvailable,
}

pub type TipSelectResult<T> = Result<T, TipSelectError>;

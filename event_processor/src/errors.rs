use crate::IDENT;
use async_channel::RecvError;
use thiserror::Error;

/// Errors originating from the [`EventProcessor`](crate::EventProcessor).
#[derive(Error, Debug)]
pub enum EventProcessorError {
    #[error("[{IDENT}]: {0}")]
    EventRecvError(#[from] RecvError),
}

/// Results originating from the [`EventProcessor`](crate::EventProcessor).
pub type EventProcessorResult<T> = Result<T, EventProcessorError>;

use futures_util::future::BoxFuture;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum AsyncServiceError {
    #[error("service {0} error: {1}")]
    Service(&'static str, String),
}

pub type AsyncServiceResult<T> = Result<T, AsyncServiceError>;

pub type AsyncServiceFuture = BoxFuture<'static, AsyncServiceResult<()>>;

/// A long-running background task with explicit start/stop lifecycle.
///
/// `signal_exit` requests termination and returns immediately; `stop`
/// resolves once the service has fully wound down.
pub trait AsyncService: Send + Sync {
    fn ident(self: Arc<Self>) -> &'static str;
    fn start(self: Arc<Self>) -> AsyncServiceFuture;
    fn signal_exit(self: Arc<Self>);
    fn stop(self: Arc<Self>) -> AsyncServiceFuture;
}

use std::{sync::Arc, time::Duration};
use tokio::select;
use triggered::{trigger, Listener, Trigger};

use super::service::{AsyncService, AsyncServiceFuture};

const TICK: &str = "tick";

/// Shared sleep primitive for periodic workers which unblocks immediately
/// on shutdown, so a worker with a long period never delays process exit.
pub struct TickService {
    shutdown_trigger: Trigger,
    shutdown_listener: Listener,
}

#[derive(Debug, PartialEq, Eq)]
pub enum TickReason {
    Elapsed,
    Shutdown,
}

impl TickService {
    pub fn new() -> Self {
        let (shutdown_trigger, shutdown_listener) = trigger();
        Self { shutdown_trigger, shutdown_listener }
    }

    /// Waits until `duration` has elapsed or the service was stopped,
    /// whichever comes first, and reports which one it was.
    pub async fn tick(&self, duration: Duration) -> TickReason {
        let shutdown_listener = self.shutdown_listener.clone();
        select! {
            biased;
            _ = shutdown_listener => TickReason::Shutdown,
            _ = tokio::time::sleep(duration) => TickReason::Elapsed,
        }
    }

    pub fn shutdown(&self) {
        self.shutdown_trigger.trigger();
    }
}

impl Default for TickService {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncService for TickService {
    fn ident(self: Arc<Self>) -> &'static str {
        TICK
    }

    fn start(self: Arc<Self>) -> AsyncServiceFuture {
        Box::pin(async move { Ok(()) })
    }

    fn signal_exit(self: Arc<Self>) {
        self.shutdown_trigger.trigger();
    }

    fn stop(self: Arc<Self>) -> AsyncServiceFuture {
        Box::pin(async move { Ok(()) })
    }
}

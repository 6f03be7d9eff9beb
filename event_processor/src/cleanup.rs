use crate::IDENT;
use std::{sync::Arc, time::Duration, time::Instant};
use tangle_core::{
    debug,
    task::{
        service::{AsyncService, AsyncServiceFuture},
        tick::{TickReason, TickService},
    },
};
use tangle_tipselect::TipSelector;

const TIP_CLEANUP: &str = "tip-cleanup";

const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(1);

/// Periodic sweep evicting tips that have since been referenced past their
/// limits. Runs once per second by default, between milestone confirmations.
pub struct TipCleanupService {
    tip_selector: Arc<TipSelector>,
    tick_service: Arc<TickService>,
    interval: Duration,
}

impl TipCleanupService {
    pub fn new(tip_selector: Arc<TipSelector>, tick_service: Arc<TickService>) -> Self {
        Self::with_interval(tip_selector, tick_service, DEFAULT_CLEANUP_INTERVAL)
    }

    pub fn with_interval(tip_selector: Arc<TipSelector>, tick_service: Arc<TickService>, interval: Duration) -> Self {
        Self { tip_selector, tick_service, interval }
    }

    pub async fn worker(&self) {
        while let TickReason::Elapsed = self.tick_service.tick(self.interval).await {
            let ts = Instant::now();
            let removed = self.tip_selector.clean_up_referenced_tips();
            debug!("[{IDENT}]: CleanUpReferencedTips finished, removed: {}, took: {:?}", removed, ts.elapsed());
        }
    }
}

impl AsyncService for TipCleanupService {
    fn ident(self: Arc<Self>) -> &'static str {
        TIP_CLEANUP
    }

    fn start(self: Arc<Self>) -> AsyncServiceFuture {
        Box::pin(async move {
            self.worker().await;
            Ok(())
        })
    }

    fn signal_exit(self: Arc<Self>) {
        self.tick_service.shutdown();
    }

    fn stop(self: Arc<Self>) -> AsyncServiceFuture {
        Box::pin(async move { Ok(()) })
    }
}

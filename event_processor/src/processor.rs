use crate::{errors::EventProcessorResult, IDENT};
use async_channel::Receiver;
use futures::{select, FutureExt};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Instant;
use tangle_consensus_core::{
    bundle::Bundle,
    events::{MilestoneConfirmation, TangleEvent},
    DynTangleStore,
};
use tangle_core::{
    debug,
    task::service::{AsyncService, AsyncServiceError, AsyncServiceFuture},
    trace, warn,
};
use tangle_dag::update_transaction_root_snapshot_indexes;
use tangle_tipselect::TipSelector;
use triggered::{Listener, Trigger};

/// Consumes [`TangleEvent`]s and drives the tip selection engine.
///
/// Solid bundles are offered as tip candidates; milestone confirmations run
/// root-snapshot propagation followed by pool rescoring, strictly in this
/// order and strictly sequentially: the single consuming loop guarantees
/// two confirmations are never propagated concurrently, and an in-flight
/// confirmation handler always completes before shutdown is honored.
#[derive(Clone)]
pub struct EventProcessor {
    store: DynTangleStore,
    tip_selector: Arc<TipSelector>,
    events_recv: Receiver<TangleEvent>,
    synced: Arc<AtomicBool>,

    shutdown_trigger: Trigger,
    shutdown_listener: Listener,

    shutdown_finalized_trigger: Trigger,
    pub shutdown_finalized_listener: Listener,
}

impl EventProcessor {
    pub fn new(store: DynTangleStore, tip_selector: Arc<TipSelector>, events_recv: Receiver<TangleEvent>) -> Self {
        let (shutdown_trigger, shutdown_listener) = triggered::trigger();
        let (shutdown_finalized_trigger, shutdown_finalized_listener) = triggered::trigger();

        Self {
            store,
            tip_selector,
            events_recv,
            synced: Arc::new(AtomicBool::new(true)),

            shutdown_trigger,
            shutdown_listener,
            shutdown_finalized_trigger,
            shutdown_finalized_listener,
        }
    }

    /// Flipped by the node's sync tracker. While unsynced, tip intake and
    /// propagation are skipped entirely since selected tips would be stale
    /// the moment syncing catches up.
    pub fn set_synced(&self, synced: bool) {
        self.synced.store(synced, Ordering::Relaxed);
    }

    fn is_synced(&self) -> bool {
        self.synced.load(Ordering::Relaxed)
    }

    fn process_bundle_solid_event(&self, bundle: &Arc<Bundle>) {
        if !self.is_synced() {
            return;
        }
        trace!("[{IDENT}]: processing solid bundle {} ({} transactions)", bundle.tail(), bundle.transactions().len());
        self.tip_selector.add_tip(bundle);
    }

    fn process_milestone_confirmed_event(&self, confirmation: &Arc<MilestoneConfirmation>) {
        if !self.is_synced() {
            return;
        }

        // Propagate new transaction root snapshot indexes through the future
        // cone before rescoring; scores computed against the new LSMI are
        // only meaningful once the brackets reflect this confirmation.
        let ts = Instant::now();
        let updated = update_transaction_root_snapshot_indexes(
            self.store.as_ref(),
            &confirmation.tails_referenced,
            confirmation.milestone_index,
        );
        debug!("[{IDENT}]: UpdateTransactionRootSnapshotIndexes finished, updated: {}, took: {:?}", updated, ts.elapsed());

        let ts = Instant::now();
        let removed = self.tip_selector.update_scores();
        debug!("[{IDENT}]: UpdateScores finished, removed: {}, took: {:?}", removed, ts.elapsed());
    }

    pub async fn run(&self) -> EventProcessorResult<()> {
        let result = self.process_events().await;
        self.shutdown_finalized_trigger.trigger();
        result
    }

    async fn process_events(&self) -> EventProcessorResult<()> {
        let shutdown_listener = self.shutdown_listener.clone();
        let mut shutdown_fut = shutdown_listener.fuse();
        loop {
            select! {
                _ = shutdown_fut => break,
                event = self.events_recv.recv().fuse() => {
                    match event? {
                        TangleEvent::BundleSolid(bundle) => self.process_bundle_solid_event(&bundle),
                        TangleEvent::MilestoneConfirmed(confirmation) => self.process_milestone_confirmed_event(&confirmation),
                    }
                }
            }
        }
        Ok(())
    }

    pub fn signal_shutdown(&self) {
        self.shutdown_trigger.trigger();
    }

    pub async fn shutdown(&self) {
        self.signal_shutdown();
        self.shutdown_finalized_listener.clone().await;
    }
}

const EVENT_PROCESSOR: &str = "event-processor";

impl AsyncService for EventProcessor {
    fn ident(self: Arc<Self>) -> &'static str {
        EVENT_PROCESSOR
    }

    fn start(self: Arc<Self>) -> AsyncServiceFuture {
        Box::pin(async move {
            match self.run().await {
                Ok(()) => Ok(()),
                Err(err) => {
                    warn!("[{IDENT}]: event loop exited with an error: {}", err);
                    Err(AsyncServiceError::Service(EVENT_PROCESSOR, err.to_string()))
                }
            }
        })
    }

    fn signal_exit(self: Arc<Self>) {
        self.signal_shutdown();
    }

    fn stop(self: Arc<Self>) -> AsyncServiceFuture {
        Box::pin(async move {
            self.shutdown_finalized_listener.clone().await;
            Ok(())
        })
    }
}

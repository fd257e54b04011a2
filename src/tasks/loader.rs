//! The virtual loader: single owner of the load-state table, the window,
//! and all cache policy. Commands arrive on a channel and return without
//! blocking the caller; decode work runs in a bounded pool of blocking
//! tasks whose results flow back into the owner's select loop. Nothing
//! mutates shared state except this task.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{EvictedEntry, LruCache, PrimaryCache, Statistics};
use crate::config::{EngineConfiguration, NavigationMode, TierProfile};
use crate::decode::Decoder;
use crate::error::DecodeErrorKind;
use crate::events::{DecodedImage, EngineCommand, EngineEvent, LoadState, PhotoRef};
use crate::pressure::{CleanupAction, PressureMonitor, PressureSignal};
use crate::queue::{PreloadQueue, TaskClass};
use crate::window::{Window, compute_window};

/// One automatic retry after a failure, then the state is terminal until
/// the caller explicitly retries.
const MAX_LOAD_ATTEMPTS: u8 = 2;

const COMMAND_CHANNEL_CAPACITY: usize = 64;
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Caches and the collection snapshot shared with the handle for
/// non-blocking reads. Policy mutations happen only inside the loader task.
pub struct SharedView {
    collection: RwLock<Arc<Vec<PhotoRef>>>,
    primary: PrimaryCache,
    lru: LruCache,
}

/// Cloneable public face of the engine. All mutating calls enqueue a
/// command and return immediately; reads go straight to the cache tiers.
#[derive(Clone)]
pub struct LoaderHandle {
    commands: Sender<EngineCommand>,
    shared: Arc<SharedView>,
    cancel: CancellationToken,
}

impl LoaderHandle {
    pub async fn set_current_index(&self, index: usize) {
        let _ = self
            .commands
            .send(EngineCommand::SetCurrentIndex(index))
            .await;
    }

    pub async fn request_immediate(&self, index: usize) {
        let _ = self
            .commands
            .send(EngineCommand::RequestImmediate(index))
            .await;
    }

    pub async fn set_collection(&self, photos: Vec<PhotoRef>) {
        let _ = self
            .commands
            .send(EngineCommand::SetCollection(photos))
            .await;
    }

    pub async fn reconfigure(&self, cfg: EngineConfiguration) {
        let _ = self.commands.send(EngineCommand::Reconfigure(cfg)).await;
    }

    pub async fn pressure(&self, signal: PressureSignal) {
        let _ = self.commands.send(EngineCommand::Pressure(signal)).await;
    }

    /// Non-blocking cached read: the payload if it is resident in either
    /// tier, otherwise `None`.
    pub fn current_payload(&self, index: usize) -> Option<Arc<DecodedImage>> {
        let collection = Arc::clone(&self.shared.collection.read().unwrap());
        let photo = collection.get(index)?;
        self.shared
            .primary
            .get(photo.id)
            .or_else(|| self.shared.lru.get(photo.id))
    }

    pub fn statistics(&self) -> Statistics {
        Statistics::from_tiers(self.shared.primary.stats(), self.shared.lru.stats())
    }

    /// Ask the loader task to exit. In-flight decodes are abandoned.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// Spawn the loader over `collection`. Returns the handle, the transition
/// event stream, and the task's join handle.
pub fn spawn(
    collection: Vec<PhotoRef>,
    decoder: Arc<dyn Decoder>,
    cfg: EngineConfiguration,
) -> (
    LoaderHandle,
    Receiver<EngineEvent>,
    JoinHandle<Result<()>>,
) {
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let cancel = CancellationToken::new();
    let shared = Arc::new(SharedView {
        collection: RwLock::new(Arc::new(Vec::new())),
        primary: PrimaryCache::new(cfg.memory_budget_bytes),
        lru: LruCache::new(cfg.lru_budget_bytes),
    });
    let handle = LoaderHandle {
        commands: cmd_tx,
        shared: Arc::clone(&shared),
        cancel: cancel.clone(),
    };
    let join = tokio::spawn(run(
        shared, collection, decoder, cfg, cmd_rx, event_tx, cancel,
    ));
    (handle, event_rx, join)
}

/// The loader task body.
pub async fn run(
    shared: Arc<SharedView>,
    collection: Vec<PhotoRef>,
    decoder: Arc<dyn Decoder>,
    cfg: EngineConfiguration,
    mut commands: Receiver<EngineCommand>,
    events: Sender<EngineEvent>,
    cancel: CancellationToken,
) -> Result<()> {
    cfg.validate()?;
    let cleanup_every = cfg.cleanup_interval;
    let mut loader = Loader {
        cfg,
        shared,
        decoder,
        events,
        cancel: cancel.clone(),
        collection: Arc::new(Vec::new()),
        slots: Vec::new(),
        loading: HashSet::new(),
        window: Window::empty(NavigationMode::Linear),
        tier: TierProfile::select(&EngineConfiguration::default(), 0, 0),
        demotions: 0,
        queue: PreloadQueue::new(),
        active_background: 0,
        active_immediate: 0,
        attempts: 0,
        monitor: PressureMonitor::new(),
        overflow_reported: false,
    };
    loader.set_collection(collection);

    let mut pool: JoinSet<DecodeOutcome> = JoinSet::new();
    let mut cleanup = tokio::time::interval(cleanup_every);
    cleanup.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        loader.fill_decode_slots(&mut pool);
        select! {
            _ = cancel.cancelled() => {
                info!("cancel received; exiting loader task");
                break;
            }

            Some(cmd) = commands.recv() => {
                loader.handle_command(cmd);
            }

            Some(joined) = pool.join_next() => {
                match joined {
                    Ok(outcome) => loader.handle_outcome(outcome),
                    Err(err) => warn!(error = %err, "decode worker task failed"),
                }
            }

            _ = cleanup.tick() => {
                loader.periodic_cleanup();
            }
        }
    }
    Ok(())
}

/// Authoritative per-index lifecycle. Exactly one per collection item,
/// mutated only by the loader.
enum Slot {
    NotLoaded,
    Loading {
        attempt: u64,
        token: CancellationToken,
        in_flight: bool,
        prior_failures: u8,
    },
    Loaded {
        #[allow(dead_code)]
        cost: usize,
    },
    Failed {
        kind: DecodeErrorKind,
        attempts: u8,
    },
}

struct DecodeOutcome {
    index: usize,
    attempt: u64,
    class: TaskClass,
    result: OutcomeKind,
}

enum OutcomeKind {
    Loaded(DecodedImage),
    Cancelled,
    Failed(DecodeErrorKind),
}

enum SyncAction {
    Load,
    Promote,
    Nothing,
}

struct Loader {
    cfg: EngineConfiguration,
    shared: Arc<SharedView>,
    decoder: Arc<dyn Decoder>,
    events: Sender<EngineEvent>,
    cancel: CancellationToken,
    collection: Arc<Vec<PhotoRef>>,
    slots: Vec<Slot>,
    /// Indices currently in `Loading`, so window diffs avoid an O(n) sweep.
    loading: HashSet<usize>,
    window: Window,
    tier: TierProfile,
    demotions: u32,
    queue: PreloadQueue,
    active_background: usize,
    active_immediate: usize,
    attempts: u64,
    monitor: PressureMonitor,
    overflow_reported: bool,
}

impl Loader {
    fn handle_command(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::SetCurrentIndex(index) => self.set_current_index(index),
            EngineCommand::RequestImmediate(index) => self.request_immediate(index),
            EngineCommand::SetCollection(photos) => self.set_collection(photos),
            EngineCommand::Reconfigure(cfg) => self.reconfigure(cfg),
            EngineCommand::Pressure(signal) => self.apply_pressure_signal(signal),
        }
    }

    fn set_current_index(&mut self, index: usize) {
        if self.collection.is_empty() {
            return;
        }
        let index = index.min(self.collection.len() - 1);
        let old = std::mem::replace(
            &mut self.window,
            compute_window(
                index,
                self.collection.len(),
                self.tier.window_radius,
                self.cfg.navigation,
            ),
        );
        debug!(index, window = self.window.len(), "current index changed");
        self.cancel_outside_window();
        self.sync_window(Some(&old));
    }

    fn request_immediate(&mut self, index: usize) {
        if self.collection.is_empty() {
            return;
        }
        let index = index.min(self.collection.len() - 1);
        enum Immediate {
            Hit,
            Requeue { attempt: u64, token: CancellationToken },
            Start,
            InFlight,
        }
        let action = match &self.slots[index] {
            Slot::Loaded { .. } => Immediate::Hit,
            Slot::Loading { token, .. } if token.is_cancelled() => Immediate::Start,
            Slot::Loading {
                attempt,
                token,
                in_flight: false,
                ..
            } => Immediate::Requeue {
                attempt: *attempt,
                token: token.clone(),
            },
            Slot::Loading { .. } => Immediate::InFlight,
            // Explicit requests retry even terminally failed slots.
            Slot::NotLoaded | Slot::Failed { .. } => Immediate::Start,
        };
        match action {
            Immediate::Hit => {
                self.ensure_primary_residency(index);
                if index == self.window.current() {
                    self.emit(EngineEvent::CurrentReady { index });
                }
            }
            Immediate::Requeue { attempt, token } => {
                // Same attempt jumps the queue; the stale preload entry is
                // discarded by the in-flight guard when it surfaces.
                let photo_id = self.collection[index].id;
                let distance = self.window.distance(index);
                let backward = self.is_backward(index);
                self.queue.push(
                    TaskClass::Immediate,
                    index,
                    photo_id,
                    attempt,
                    token,
                    distance,
                    backward,
                );
            }
            Immediate::Start => self.start_load(index, TaskClass::Immediate),
            Immediate::InFlight => {}
        }
    }

    fn set_collection(&mut self, photos: Vec<PhotoRef>) {
        info!(count = photos.len(), "collection attached");
        for idx in self.loading.drain() {
            if let Some(Slot::Loading { token, .. }) = self.slots.get(idx) {
                token.cancel();
            }
        }
        self.queue.clear();
        self.shared.primary.clear();
        self.shared.lru.clear();

        let collection = Arc::new(photos);
        *self.shared.collection.write().unwrap() = Arc::clone(&collection);
        self.collection = collection;
        self.slots = (0..self.collection.len()).map(|_| Slot::NotLoaded).collect();
        self.demotions = 0;
        self.overflow_reported = false;
        self.tier = TierProfile::select(&self.cfg, self.collection.len(), 0);
        self.window = compute_window(
            0,
            self.collection.len(),
            self.tier.window_radius,
            self.cfg.navigation,
        );
        self.sync_window(None);
    }

    fn reconfigure(&mut self, cfg: EngineConfiguration) {
        if let Err(err) = cfg.validate() {
            warn!(error = %err, "rejecting invalid reconfiguration");
            return;
        }
        info!("engine reconfigured");
        self.cfg = cfg;
        self.demotions = 0;
        self.overflow_reported = false;
        let displaced = self
            .shared
            .primary
            .set_budget(self.cfg.memory_budget_bytes, &self.window);
        for entry in displaced {
            self.offer_to_lru(entry);
        }
        let dropped = self.shared.lru.set_budget(self.cfg.lru_budget_bytes);
        for entry in dropped {
            self.mark_unloaded(entry.ordinal);
        }
        self.retier();
    }

    fn apply_pressure_signal(&mut self, signal: PressureSignal) {
        debug!(?signal, "pressure signal");
        let action = self.monitor.on_signal(signal);
        self.apply_cleanup(action);
    }

    fn periodic_cleanup(&mut self) {
        let usage = self.shared.primary.total_cost() + self.shared.lru.total_cost();
        debug!(
            usage,
            budget = self.tier.memory_budget_bytes,
            in_flight = self.active_background + self.active_immediate,
            queued = self.queue.len(),
            "cleanup tick"
        );
        let action = self.monitor.on_tick(usage, self.tier.memory_budget_bytes);
        self.apply_cleanup(action);
    }

    fn apply_cleanup(&mut self, action: CleanupAction) {
        match action {
            CleanupAction::None => {}
            CleanupAction::Trim => self.trim_caches(),
            CleanupAction::Aggressive => self.aggressive_cleanup(),
        }
    }

    /// Soft pass: halve the LRU tier and drop far window-exterior payloads.
    fn trim_caches(&mut self) {
        let target = self.cfg.lru_budget_bytes / 2;
        for entry in self.shared.lru.trim_to(target) {
            self.mark_unloaded(entry.ordinal);
        }
        let margin = self.tier.window_radius;
        for entry in self.shared.primary.trim_exterior(&self.window, margin) {
            self.mark_unloaded(entry.ordinal);
        }
    }

    /// Hard pass: clear the LRU tier, demote the active tier one step, and
    /// evict everything the smaller window no longer covers.
    fn aggressive_cleanup(&mut self) {
        warn!(
            demotions = self.demotions + 1,
            "aggressive cleanup; demoting tier"
        );
        for entry in self.shared.lru.clear() {
            self.mark_unloaded(entry.ordinal);
        }
        self.demotions += 1;
        self.retier();
        for entry in self.shared.primary.evict_outside(&self.window) {
            self.mark_unloaded(entry.ordinal);
        }
        let usage = self.shared.primary.total_cost() + self.shared.lru.total_cost();
        self.monitor
            .cleanup_finished(usage, self.tier.memory_budget_bytes);
    }

    fn retier(&mut self) {
        self.tier = TierProfile::select(&self.cfg, self.collection.len(), self.demotions);
        let current = self.window.current();
        let old = std::mem::replace(
            &mut self.window,
            compute_window(
                current,
                self.collection.len(),
                self.tier.window_radius,
                self.cfg.navigation,
            ),
        );
        debug!(
            level = ?self.tier.level,
            radius = self.tier.window_radius,
            concurrency = self.tier.max_concurrent_decodes,
            "tier recomputed"
        );
        self.cancel_outside_window();
        self.sync_window(Some(&old));
    }

    /// Cancel loads whose index fell out of the window. Queued-only tasks
    /// drop to `NotLoaded` right away; in-flight decodes acknowledge
    /// through their outcome.
    fn cancel_outside_window(&mut self) {
        let outside: Vec<usize> = self
            .loading
            .iter()
            .copied()
            .filter(|&i| !self.window.contains(i))
            .collect();
        for idx in outside {
            let mut drop_now = false;
            if let Some(Slot::Loading {
                token, in_flight, ..
            }) = self.slots.get(idx)
            {
                token.cancel();
                drop_now = !*in_flight;
            }
            if drop_now {
                self.loading.remove(&idx);
                self.slots[idx] = Slot::NotLoaded;
                self.emit_transition(idx, LoadState::NotLoaded);
            }
        }
    }

    /// Walk the window in load order and schedule whatever it is missing.
    /// `old` is the window before the change; failed slots only retry
    /// automatically when they re-enter after having left.
    fn sync_window(&mut self, old: Option<&Window>) {
        for idx in self.window.indices_by_priority() {
            let action = match &self.slots[idx] {
                Slot::NotLoaded => SyncAction::Load,
                // A cancelled load whose index came back before the worker
                // acknowledged; a fresh attempt supersedes it.
                Slot::Loading { token, .. } if token.is_cancelled() => SyncAction::Load,
                Slot::Failed { attempts, .. }
                    if *attempts < MAX_LOAD_ATTEMPTS
                        && old.is_none_or(|w| !w.contains(idx)) =>
                {
                    SyncAction::Load
                }
                Slot::Loaded { .. } => SyncAction::Promote,
                _ => SyncAction::Nothing,
            };
            match action {
                SyncAction::Load => self.start_load(idx, TaskClass::Preload),
                SyncAction::Promote => self.ensure_primary_residency(idx),
                SyncAction::Nothing => {}
            }
        }
    }

    fn start_load(&mut self, index: usize, class: TaskClass) {
        let prior_failures = match &self.slots[index] {
            Slot::Failed { attempts, .. } => *attempts,
            Slot::Loading { prior_failures, .. } => *prior_failures,
            _ => 0,
        };
        self.attempts += 1;
        let attempt = self.attempts;
        let token = self.cancel.child_token();
        let photo_id = self.collection[index].id;
        let distance = self.window.distance(index);
        let backward = self.is_backward(index);
        self.queue.push(
            class,
            index,
            photo_id,
            attempt,
            token.clone(),
            distance,
            backward,
        );
        self.slots[index] = Slot::Loading {
            attempt,
            token,
            in_flight: false,
            prior_failures,
        };
        self.loading.insert(index);
        self.emit_transition(index, LoadState::Loading);
    }

    /// Pull runnable tasks off the queue into the decode pool. Background
    /// preloads respect the tier's concurrency cap; immediate requests are
    /// exempt so the visible photo is never starved by the pool being full.
    fn fill_decode_slots(&mut self, pool: &mut JoinSet<DecodeOutcome>) {
        loop {
            let Some(class) = self.queue.peek_class() else {
                break;
            };
            if class == TaskClass::Preload
                && self.active_background >= self.tier.max_concurrent_decodes
            {
                break;
            }
            let Some(task) = self.queue.pop() else {
                break;
            };
            let runnable = matches!(
                self.slots.get(task.index),
                Some(Slot::Loading {
                    attempt,
                    in_flight: false,
                    ..
                }) if *attempt == task.attempt
            );
            if !runnable {
                // Duplicate or superseded queue entry.
                continue;
            }
            if let Some(Slot::Loading { in_flight, .. }) = self.slots.get_mut(task.index) {
                *in_flight = true;
            }
            match task.class {
                TaskClass::Immediate => self.active_immediate += 1,
                TaskClass::Preload => self.active_background += 1,
            }
            let decoder = Arc::clone(&self.decoder);
            let path = Arc::clone(&self.collection[task.index].path);
            let ceiling = self.cfg.decode_timeout;
            let token = task.token.clone();
            let (index, attempt, class) = (task.index, task.attempt, task.class);
            pool.spawn(decode_one(
                decoder, path, token, ceiling, index, attempt, class,
            ));
        }
    }

    fn handle_outcome(&mut self, outcome: DecodeOutcome) {
        match outcome.class {
            TaskClass::Immediate => {
                self.active_immediate = self.active_immediate.saturating_sub(1)
            }
            TaskClass::Preload => {
                self.active_background = self.active_background.saturating_sub(1)
            }
        }
        let idx = outcome.index;
        let (current_attempt, prior_failures) = match self.slots.get(idx) {
            Some(Slot::Loading {
                attempt,
                prior_failures,
                ..
            }) => (*attempt, *prior_failures),
            _ => (0, 0),
        };
        if current_attempt != outcome.attempt {
            // Late result for a cancelled or superseded attempt. Dropping
            // it keeps cache state unchanged.
            debug!(index = idx, "stale decode result dropped");
            return;
        }
        self.loading.remove(&idx);
        match outcome.result {
            OutcomeKind::Cancelled => {
                self.slots[idx] = Slot::NotLoaded;
                self.emit_transition(idx, LoadState::NotLoaded);
            }
            OutcomeKind::Loaded(img) => {
                let cost = img.cost_bytes();
                let stored = self.insert_into_primary(idx, Arc::new(img), cost);
                if stored {
                    self.slots[idx] = Slot::Loaded { cost };
                    self.emit_transition(idx, LoadState::Loaded);
                    if idx == self.window.current() {
                        self.emit(EngineEvent::CurrentReady { index: idx });
                    }
                } else {
                    self.slots[idx] = Slot::NotLoaded;
                    self.emit_transition(idx, LoadState::NotLoaded);
                }
            }
            OutcomeKind::Failed(kind) => {
                let attempts = prior_failures.saturating_add(1);
                warn!(index = idx, attempts, error = %kind, "decode failed");
                self.slots[idx] = Slot::Failed {
                    kind: kind.clone(),
                    attempts,
                };
                self.emit_transition(idx, LoadState::Failed(kind));
            }
        }
    }

    /// Insert into the primary tier, spilling displaced entries into the
    /// LRU tier. Returns whether the payload was stored anywhere.
    fn insert_into_primary(
        &mut self,
        index: usize,
        payload: Arc<DecodedImage>,
        cost: usize,
    ) -> bool {
        let id = self.collection[index].id;
        let report = self
            .shared
            .primary
            .insert(id, index, payload, cost, &self.window);
        if report.window_eviction && !self.overflow_reported {
            self.overflow_reported = true;
            warn!(
                budget = self.tier.memory_budget_bytes,
                "memory budget cannot hold the active window; evicting within it"
            );
        }
        for entry in report.evicted {
            self.offer_to_lru(entry);
        }
        report.stored
    }

    fn offer_to_lru(&mut self, entry: EvictedEntry) {
        let outcome = self
            .shared
            .lru
            .insert(entry.id, entry.ordinal, entry.payload, entry.cost);
        if !outcome.stored {
            self.mark_unloaded(entry.ordinal);
        }
        for dropped in outcome.evicted {
            self.mark_unloaded(dropped.ordinal);
        }
    }

    /// Payload left both tiers; the slot returns to `NotLoaded` so a later
    /// window pass can reload it.
    fn mark_unloaded(&mut self, ordinal: usize) {
        let Some(slot) = self.slots.get_mut(ordinal) else {
            return;
        };
        if matches!(slot, Slot::Loaded { .. }) {
            *slot = Slot::NotLoaded;
            self.emit_transition(ordinal, LoadState::NotLoaded);
        }
    }

    /// Re-home a `Loaded` window entry into the primary tier if the LRU
    /// tier is currently holding it. Promotion only happens when the
    /// primary tier has spare budget; otherwise the entry keeps being
    /// served from the LRU tier.
    fn ensure_primary_residency(&mut self, index: usize) {
        let id = self.collection[index].id;
        if self.shared.primary.contains(id) {
            return;
        }
        match self.shared.lru.take(id) {
            Some(entry) if self.shared.primary.has_room(entry.cost) => {
                if !self.insert_into_primary(index, entry.payload, entry.cost) {
                    self.mark_unloaded(index);
                }
            }
            Some(entry) => {
                // No room without evicting; leave it where it is.
                self.shared
                    .lru
                    .insert(entry.id, entry.ordinal, entry.payload, entry.cost);
            }
            None => {
                // State said Loaded but no tier holds it; reload.
                self.mark_unloaded(index);
                self.start_load(index, TaskClass::Preload);
            }
        }
    }

    fn is_backward(&self, index: usize) -> bool {
        let size = self.collection.len();
        if size == 0 {
            return false;
        }
        let current = self.window.current();
        match self.cfg.navigation {
            NavigationMode::Linear => index < current,
            NavigationMode::Circular => {
                let forward = (index + size - current) % size;
                let backward = (current + size - index) % size;
                backward < forward
            }
        }
    }

    fn emit_transition(&self, index: usize, state: LoadState) {
        self.emit(EngineEvent::Transition { index, state });
    }

    fn emit(&self, event: EngineEvent) {
        // Lossy on a slow subscriber: transitions are snapshots and the
        // scheduler must not stall on the UI.
        if self.events.try_send(event).is_err() {
            debug!("event subscriber not keeping up; transition dropped");
        }
    }
}

/// One decode attempt. The cancellation token is observed at dequeue time
/// and again after the decode so a cancelled result is never reported as a
/// completion.
async fn decode_one(
    decoder: Arc<dyn Decoder>,
    path: Arc<PathBuf>,
    token: CancellationToken,
    ceiling: Duration,
    index: usize,
    attempt: u64,
    class: TaskClass,
) -> DecodeOutcome {
    if token.is_cancelled() {
        return DecodeOutcome {
            index,
            attempt,
            class,
            result: OutcomeKind::Cancelled,
        };
    }
    let work = tokio::task::spawn_blocking(move || decoder.decode(&path));
    let result = match tokio::time::timeout(ceiling, work).await {
        Err(_) => OutcomeKind::Failed(DecodeErrorKind::Timeout),
        Ok(Err(join_err)) => OutcomeKind::Failed(DecodeErrorKind::Malformed(join_err.to_string())),
        Ok(Ok(Err(kind))) => OutcomeKind::Failed(kind),
        Ok(Ok(Ok(img))) => OutcomeKind::Loaded(img),
    };
    if token.is_cancelled() {
        return DecodeOutcome {
            index,
            attempt,
            class,
            result: OutcomeKind::Cancelled,
        };
    }
    DecodeOutcome {
        index,
        attempt,
        class,
        result,
    }
}

//! The frontier controller
//!
//! Worker tasks call [`Frontier::next`] to receive a URI, fetch it, report the
//! outcome through [`Frontier::finished`] and feed newly discovered URIs to
//! [`Frontier::schedule`]. The controller keeps at most one URI per work queue
//! in flight and snoozes a queue after every successful fetch.
//!
//! # Locking
//!
//! - `directory` guards the queue directory; it is never held across an await
//! - `gate` is read-locked by every mutation and write-locked by
//!   [`Frontier::snapshot`], so a checkpoint never sees half an operation
//! - lock order is always gate, then directory, then counters
//!
//! Fingerprint insertion does not take the directory lock; the storage backend
//! makes it atomic on its own.

use crate::checkpoint::{
    CheckpointId, CheckpointManager, DirectorySnapshot, FrontierSnapshot, PendingItem,
};
use crate::config::{Config, RetryPolicy};
use crate::frontier::directory::QueueDirectory;
use crate::frontier::fingerprint_store::FingerprintStore;
use crate::frontier::politeness::{backoff_delay, politeness_delay};
use crate::frontier::work_queue::{Budget, WorkQueue};
use crate::state::{Disposition, FetchStatus, QueueState};
use crate::storage::{open_storage, Storage};
use crate::uri::CandidateUri;
use crate::{FrontierError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Frontier-wide counters, carried across checkpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontierStats {
    /// URIs accepted into a work queue
    pub scheduled: u64,

    /// URIs dropped because their fingerprint was already known
    pub duplicates: u64,

    pub succeeded: u64,

    /// URIs dropped after a dispositive failure (including exhausted retries)
    pub failed: u64,

    /// Subset of `failed` excluded by policy (robots, scope, operator)
    pub disregarded: u64,

    pub retried: u64,

    /// Pending URIs removed by operator discards
    pub discarded: u64,

    pub total_bytes: u64,
}

impl FrontierStats {
    pub fn completed(&self) -> u64 {
        self.succeeded + self.failed
    }
}

/// Operator view of one work queue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueReport {
    pub key: String,
    pub state: QueueState,
    pub precedence: u8,
    pub pending: u64,
    pub in_flight: Option<String>,
    pub retries: u64,
    pub bytes_charged: u64,
    pub uris_charged: u64,
    pub byte_budget: u64,
    pub uri_budget: u64,
    pub total_bytes: u64,
    pub total_uris: u64,
    pub wake_in_ms: Option<u64>,
    pub retire_on_completion: bool,
}

impl QueueReport {
    fn from_queue(queue: &WorkQueue, now: Instant) -> Self {
        let budget = queue.budget();
        Self {
            key: queue.key().to_string(),
            state: queue.state(),
            precedence: queue.precedence(),
            pending: queue.pending_count(),
            in_flight: queue.in_flight().map(|f| f.curi.as_str().to_string()),
            retries: queue.retries(),
            bytes_charged: budget.bytes_charged,
            uris_charged: budget.uris_charged,
            byte_budget: budget.byte_budget,
            uri_budget: budget.uri_budget,
            total_bytes: queue.total_bytes(),
            total_uris: queue.total_uris(),
            wake_in_ms: queue
                .wake_at()
                .map(|wake| wake.saturating_duration_since(now).as_millis() as u64),
            retire_on_completion: queue.retire_on_completion(),
        }
    }
}

/// Outcome of one dispatch attempt
enum Dispatch {
    Uri(CandidateUri),
    /// Nothing dispatchable; wait for a wake-up or until the deadline
    Wait(Option<Instant>),
    Exhausted,
}

/// Where a queue goes once its in-flight URI is finished
enum Refile {
    Refill,
    Snooze(Instant),
    Retire,
}

/// The URI frontier
///
/// Shared between worker tasks as `Arc<Frontier<S>>`.
pub struct Frontier<S: Storage> {
    config: Config,
    storage: Arc<S>,
    fingerprints: FingerprintStore<S>,
    directory: Mutex<QueueDirectory>,
    counters: Mutex<FrontierStats>,
    gate: RwLock<()>,
    wake: Notify,
    paused: AtomicBool,
    terminated: AtomicBool,
    dispatch_seq: AtomicU64,
}

impl<S: Storage> Frontier<S> {
    /// Creates a frontier for a fresh crawl
    ///
    /// Anything already held by `storage` is cleared; use [`Frontier::recover`]
    /// to continue a previous crawl.
    pub fn new(config: Config, storage: S) -> Result<Self> {
        storage.clear()?;
        let frontier = Self::assemble(config, Arc::new(storage));
        tracing::info!(
            "Frontier started (hold queues: {}, retry policy: {:?})",
            frontier.config.queues.hold_queues,
            frontier.config.retry.policy
        );
        Ok(frontier)
    }

    /// Rebuilds a frontier from one checkpoint directory
    ///
    /// `storage` is cleared and refilled from the checkpoint. Queues that had a
    /// URI in flight come back READY with that URI first in line.
    pub fn recover(config: Config, storage: S, checkpoint_dir: &Path) -> Result<Self> {
        let (manifest, snapshot) = FrontierSnapshot::read_from(checkpoint_dir)?;

        let frontier = Self::assemble(config, Arc::new(storage));
        frontier.storage.clear()?;
        frontier.restore(snapshot)?;

        tracing::info!(
            "Recovered checkpoint {}: {} queues, {} pending URIs, {} fingerprints",
            manifest.id,
            manifest.queue_count,
            manifest.pending_count,
            manifest.fingerprint_count
        );
        Ok(frontier)
    }

    fn assemble(config: Config, storage: Arc<S>) -> Self {
        let fingerprints =
            FingerprintStore::new(Arc::clone(&storage), config.canonicalization.clone());
        let directory = QueueDirectory::with_session_balance(config.queues.session_balance());
        Self {
            config,
            storage,
            fingerprints,
            directory: Mutex::new(directory),
            counters: Mutex::new(FrontierStats::default()),
            gate: RwLock::new(()),
            wake: Notify::new(),
            paused: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
            dispatch_seq: AtomicU64::new(1),
        }
    }

    fn restore(&self, snapshot: FrontierSnapshot) -> Result<()> {
        self.fingerprints.load(&snapshot.fingerprints)?;

        let now = Instant::now();
        let mut dir = self.directory();
        for queue in &snapshot.directory.queues {
            dir.insert(WorkQueue::restore(queue, &*self.storage, now)?);
        }
        dir.reorder_inactive(&snapshot.directory.inactive);
        drop(dir);

        *self.counters() = snapshot.stats;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ===== Scheduling =====

    /// Offers a discovered URI to the frontier
    ///
    /// Returns `Ok(false)` for a duplicate (not an error) and `Ok(true)` once
    /// the URI is queued. A storage failure is returned as an error; if the
    /// fingerprint was already recorded, it is withdrawn again so the URI can
    /// be rescheduled later.
    pub fn schedule(&self, curi: CandidateUri) -> Result<bool> {
        let _gate = self.read_gate();
        let mut curi = curi;
        self.apply_site_key(&mut curi);

        let fp = self.fingerprints.fingerprint_of(&curi);
        let inserted = self.fingerprints.insert_if_absent(fp)?;
        if !inserted && !curi.force_fetch {
            self.counters().duplicates += 1;
            tracing::trace!("Duplicate URI dropped: {}", curi.as_str());
            return Ok(false);
        }

        let result = {
            let mut dir = self.directory();
            self.enqueue_locked(&mut dir, &curi, Instant::now())
        };

        if let Err(e) = result {
            tracing::error!("Failed to enqueue {}: {}", curi.as_str(), e);
            if inserted {
                match self.fingerprints.remove(fp) {
                    Ok(_) => tracing::warn!(
                        "Withdrew fingerprint of {} after failed enqueue",
                        curi.as_str()
                    ),
                    Err(remove_err) => tracing::error!(
                        "Could not withdraw fingerprint of {}: {}",
                        curi.as_str(),
                        remove_err
                    ),
                }
            }
            return Err(e);
        }

        self.counters().scheduled += 1;
        tracing::trace!(
            "Scheduled {} on queue {}",
            curi.as_str(),
            curi.scheduling_key()
        );
        Ok(true)
    }

    /// Applies a `[[site]] queue-key` override unless the key was set explicitly
    fn apply_site_key(&self, curi: &mut CandidateUri) {
        if curi.is_key_pinned() {
            return;
        }
        let key = curi
            .host()
            .and_then(|host| self.config.site_for(&host))
            .and_then(|site| site.queue_key.clone());
        if let Some(key) = key {
            curi.assign_scheduling_key(key);
        }
    }

    fn enqueue_locked(
        &self,
        dir: &mut QueueDirectory,
        curi: &CandidateUri,
        now: Instant,
    ) -> Result<()> {
        let key = curi.scheduling_key().to_string();
        if !dir.contains(&key) {
            dir.insert(self.new_queue(&key, curi));
        }

        let queue = dir
            .get_mut(&key)
            .ok_or_else(|| FrontierError::UnknownQueue(key.clone()))?;
        queue.enqueue(&*self.storage, curi, curi.prerequisite)?;
        let state = queue.state();
        dir.offer_precedence(&key, curi.precedence);

        match state {
            QueueState::Inactive if !self.config.queues.hold_queues => {
                if dir.activate(&key, now)? == QueueState::Ready {
                    self.wake.notify_waiters();
                }
            }
            QueueState::Inactive => self.wake.notify_waiters(),
            QueueState::Empty => {
                dir.transition(&key, QueueState::Ready)?;
                self.wake.notify_waiters();
            }
            _ => {}
        }
        Ok(())
    }

    /// Builds a queue for a new scheduling key, applying any `[[site]]` overrides
    fn new_queue(&self, key: &str, curi: &CandidateUri) -> WorkQueue {
        let site = curi.host().and_then(|host| self.config.site_for(&host));
        let defaults = self.config.budget;

        let budget = Budget::new(
            site.and_then(|s| s.queue_byte_budget)
                .unwrap_or(defaults.queue_byte_budget),
            site.and_then(|s| s.queue_uri_budget)
                .unwrap_or(defaults.queue_uri_budget),
        );

        let mut queue = WorkQueue::new(key, curi.precedence, budget).with_min_delay(
            site.and_then(|s| s.min_delay_ms)
                .map(Duration::from_millis),
        );
        if let Some(precedence) = site.and_then(|s| s.precedence) {
            queue = queue.with_pinned_precedence(precedence);
        }

        tracing::debug!("Created queue {}", key);
        queue
    }

    // ===== Dispatch =====

    /// Waits for the next URI to fetch
    ///
    /// Returns `Ok(None)` once the frontier is exhausted (nothing ready,
    /// snoozed, inactive or in flight) or has been terminated.
    pub async fn next(&self) -> Result<Option<CandidateUri>> {
        loop {
            let notified = self.wake.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.try_dispatch()? {
                Dispatch::Uri(curi) => return Ok(Some(curi)),
                Dispatch::Exhausted => return Ok(None),
                Dispatch::Wait(Some(deadline)) => {
                    let _ = tokio::time::timeout_at(deadline, notified).await;
                }
                Dispatch::Wait(None) => notified.await,
            }
        }
    }

    fn try_dispatch(&self) -> Result<Dispatch> {
        if self.is_terminated() {
            return Ok(Dispatch::Exhausted);
        }

        let _gate = self.read_gate();
        let mut dir = self.directory();
        let now = Instant::now();
        dir.wake_due(now)?;

        if self.is_paused() {
            return Ok(Dispatch::Wait(None));
        }

        loop {
            if let Some(key) = dir.first_ready() {
                if let Some(curi) = self.dispatch_from(&mut dir, &key, now)? {
                    return Ok(Dispatch::Uri(curi));
                }
                continue;
            }

            // Held queues are only brought in once nothing else is ready
            match dir.next_inactive() {
                Some(key) => {
                    dir.activate(&key, now)?;
                }
                None => break,
            }
        }

        if dir.is_exhausted() {
            tracing::debug!("Frontier exhausted");
            return Ok(Dispatch::Exhausted);
        }
        Ok(Dispatch::Wait(dir.next_wake()))
    }

    fn dispatch_from(
        &self,
        dir: &mut QueueDirectory,
        key: &str,
        now: Instant,
    ) -> Result<Option<CandidateUri>> {
        let queue = dir
            .get_mut(key)
            .ok_or_else(|| FrontierError::UnknownQueue(key.to_string()))?;

        let Some(mut curi) = queue.dequeue_head(&*self.storage)? else {
            tracing::warn!("Queue {} was ready with nothing pending", key);
            dir.transition(key, QueueState::Empty)?;
            return Ok(None);
        };

        curi.dispatch_id = Some(self.dispatch_seq.fetch_add(1, Ordering::Relaxed));
        queue.note_in_flight(curi.clone(), now);
        dir.transition(key, QueueState::InProcess)?;

        tracing::debug!("Dispatched {} from queue {}", curi.as_str(), key);
        Ok(Some(curi))
    }

    // ===== Completion =====

    /// Reports the outcome of a dispatched URI
    ///
    /// The fetch outcome is read from `curi.fetch_status`; a missing status is
    /// treated as [`FetchStatus::RuntimeError`]. Returns how the URI was
    /// disposed of, or [`FrontierError::NotInFlight`] if this dispatch was
    /// already finished (for example by the watchdog).
    pub fn finished(&self, curi: CandidateUri) -> Result<Disposition> {
        let _gate = self.read_gate();
        let mut dir = self.directory();
        let key = curi.scheduling_key().to_string();
        let now = Instant::now();

        let queue = dir
            .get_mut(&key)
            .ok_or_else(|| FrontierError::UnknownQueue(key.clone()))?;
        if !queue.is_in_flight(&curi) {
            return Err(FrontierError::NotInFlight {
                queue: key,
                uri: curi.as_str().to_string(),
            });
        }

        let mut curi = curi;
        curi.fetch_attempts += 1;
        let status = curi.fetch_status.unwrap_or(FetchStatus::RuntimeError);

        let mut disposition = status.disposition();
        if disposition == Disposition::Retryable
            && curi.fetch_attempts >= self.config.retry.max_retries
        {
            tracing::info!(
                "Giving up on {} after {} attempts ({})",
                curi.as_str(),
                curi.fetch_attempts,
                status
            );
            disposition = Disposition::Dispositive;
        }

        let mut refile = match disposition {
            Disposition::Retryable => {
                // Requeue before releasing the flight so a storage error leaves it in flight
                let mut retry = curi.clone();
                retry.clear_fetch_outcome();
                queue.enqueue(&*self.storage, &retry, true)?;
                queue.note_flight_complete(&curi);
                queue.note_retry();
                self.counters().retried += 1;

                tracing::info!(
                    "Retrying {} (attempt {}): {}",
                    curi.as_str(),
                    curi.fetch_attempts,
                    status
                );

                match self.config.retry.policy {
                    RetryPolicy::Immediate => Refile::Refill,
                    RetryPolicy::Backoff => Refile::Snooze(
                        now + backoff_delay(&self.config.retry, curi.fetch_attempts),
                    ),
                }
            }
            Disposition::Dispositive => {
                queue.note_flight_complete(&curi);
                {
                    let mut counters = self.counters();
                    counters.failed += 1;
                    if status.is_disregarded() {
                        counters.disregarded += 1;
                    }
                }
                tracing::debug!("Dropped {}: {}", curi.as_str(), status);
                Refile::Refill
            }
            Disposition::Success => {
                queue.note_flight_complete(&curi);
                queue.charge(curi.content_size);
                {
                    let mut counters = self.counters();
                    counters.succeeded += 1;
                    counters.total_bytes += curi.content_size;
                }

                if queue.is_budget_exhausted() {
                    tracing::info!("Queue {} used up its budget, retiring", key);
                    Refile::Retire
                } else {
                    let floor = curi.min_delay_override().max(queue.site_min_delay());
                    let delay =
                        politeness_delay(&self.config.politeness, curi.fetch_duration(), floor);
                    tracing::trace!("Queue {} snoozing for {:?}", key, delay);
                    Refile::Snooze(now + delay)
                }
            }
        };

        queue.spend_session();
        if queue.retire_on_completion() {
            queue.set_retire_on_completion(false);
            tracing::info!("Queue {} retired by operator", key);
            refile = Refile::Retire;
        }

        match refile {
            Refile::Refill => {
                dir.refill(&key)?;
            }
            Refile::Snooze(wake_at)
                if self.should_deactivate(&dir, wake_at.saturating_duration_since(now)) =>
            {
                tracing::debug!(
                    "Queue {} would snooze for {:?}, rotating it out",
                    key,
                    wake_at.saturating_duration_since(now)
                );
                dir.deactivate(&key, Some(wake_at))?;
            }
            Refile::Snooze(wake_at) => dir.snooze(&key, wake_at)?,
            Refile::Retire => dir.transition(&key, QueueState::Retired)?,
        }
        drop(dir);

        self.wake.notify_waiters();
        Ok(disposition)
    }

    /// Long snoozes hand a held queue's slot to a waiting inactive queue
    fn should_deactivate(&self, dir: &QueueDirectory, delay: Duration) -> bool {
        self.config
            .queues
            .snooze_deactivate()
            .is_some_and(|limit| delay > limit && dir.next_inactive().is_some())
    }

    // ===== Operator controls =====

    /// Stops handing out URIs until [`Frontier::resume`]
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
        tracing::info!("Frontier paused");
        self.wake.notify_waiters();
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        tracing::info!("Frontier resumed");
        self.wake.notify_waiters();
    }

    /// Makes every current and future `next()` call return `None`
    pub fn terminate(&self) {
        self.terminated.store(true, Ordering::SeqCst);
        tracing::info!("Frontier terminated");
        self.wake.notify_waiters();
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    /// Retires a queue; an in-process queue retires once its URI is finished
    pub fn retire_queue(&self, key: &str) -> Result<()> {
        let _gate = self.read_gate();
        let mut dir = self.directory();
        let queue = dir
            .get_mut(key)
            .ok_or_else(|| FrontierError::UnknownQueue(key.to_string()))?;

        match queue.state() {
            QueueState::Retired => {}
            QueueState::InProcess => {
                queue.set_retire_on_completion(true);
                tracing::info!("Queue {} will retire once its in-flight URI finishes", key);
            }
            _ => {
                dir.transition(key, QueueState::Retired)?;
                tracing::info!("Queue {} retired", key);
            }
        }
        drop(dir);

        self.wake.notify_waiters();
        Ok(())
    }

    /// Brings a retired queue back, resetting its budget charges
    ///
    /// Returns the state the queue ended up in.
    pub fn reactivate_queue(&self, key: &str) -> Result<QueueState> {
        let _gate = self.read_gate();
        let mut dir = self.directory();
        let now = Instant::now();
        let queue = dir
            .get_mut(key)
            .ok_or_else(|| FrontierError::UnknownQueue(key.to_string()))?;

        let state = queue.state();
        if state == QueueState::InProcess && queue.retire_on_completion() {
            queue.set_retire_on_completion(false);
            return Ok(state);
        }
        if state != QueueState::Retired {
            return Err(FrontierError::InvalidTransition {
                queue: key.to_string(),
                from: state,
                to: QueueState::Inactive,
            });
        }

        queue.reset_budget();
        dir.transition(key, QueueState::Inactive)?;
        let state = if self.config.queues.hold_queues {
            QueueState::Inactive
        } else {
            dir.activate(key, now)?
        };
        drop(dir);

        tracing::info!("Queue {} reactivated ({})", key, state);
        self.wake.notify_waiters();
        Ok(state)
    }

    /// Drops every pending URI of a queue
    ///
    /// A URI already in flight still completes normally. Returns the number of
    /// URIs removed.
    pub fn discard_queue(&self, key: &str) -> Result<u64> {
        let _gate = self.read_gate();
        let mut dir = self.directory();
        let queue = dir
            .get_mut(key)
            .ok_or_else(|| FrontierError::UnknownQueue(key.to_string()))?;

        let removed = queue.clear(&*self.storage)?;
        if matches!(queue.state(), QueueState::Ready | QueueState::Inactive) {
            dir.transition(key, QueueState::Empty)?;
        }
        drop(dir);

        self.counters().discarded += removed;
        tracing::info!("Discarded {} pending URIs from queue {}", removed, key);
        self.wake.notify_waiters();
        Ok(removed)
    }

    /// Removes a URI's fingerprint so it can be scheduled again
    pub fn forget(&self, curi: &CandidateUri) -> Result<bool> {
        let _gate = self.read_gate();
        let fp = self.fingerprints.fingerprint_of(curi);
        let removed = self.fingerprints.remove(fp)?;
        if removed {
            tracing::info!("Forgot {}", curi.as_str());
        }
        Ok(removed)
    }

    // ===== Reporting =====

    /// Returns true if a URI with the same fingerprint was ever scheduled
    pub fn has_seen(&self, curi: &CandidateUri) -> Result<bool> {
        let fp = self.fingerprints.fingerprint_of(curi);
        Ok(self.fingerprints.contains(fp)?)
    }

    pub fn queue_report(&self, key: &str) -> Option<QueueReport> {
        let now = Instant::now();
        self.directory()
            .get(key)
            .map(|queue| QueueReport::from_queue(queue, now))
    }

    /// Reports for every queue, sorted by key
    pub fn queue_reports(&self) -> Vec<QueueReport> {
        let now = Instant::now();
        let mut reports: Vec<QueueReport> = self
            .directory()
            .queues()
            .map(|queue| QueueReport::from_queue(queue, now))
            .collect();
        reports.sort_by(|a, b| a.key.cmp(&b.key));
        reports
    }

    pub fn stats(&self) -> FrontierStats {
        self.counters().clone()
    }

    pub fn queue_counts(&self) -> BTreeMap<QueueState, usize> {
        self.directory().counts()
    }

    /// Pending URIs across all queues, not counting those in flight
    pub fn pending_count(&self) -> u64 {
        self.directory().pending_total()
    }

    pub fn in_flight_count(&self) -> usize {
        self.directory().in_process_count()
    }

    pub fn fingerprint_count(&self) -> Result<u64> {
        Ok(self.fingerprints.count()?)
    }

    pub fn is_exhausted(&self) -> bool {
        self.directory().is_exhausted()
    }

    // ===== Watchdog =====

    /// Force-finishes every URI in flight for at least `grace`
    ///
    /// Each is reported as a [`FetchStatus::Timeout`], so it is retried (or
    /// dropped at the retry ceiling) like any other retryable failure. The
    /// worker that held it later gets `NotInFlight` from `finished()`.
    pub fn reap_stuck(&self, grace: Duration) -> Result<usize> {
        let now = Instant::now();
        let stuck: Vec<(CandidateUri, Duration)> = self
            .directory()
            .queues()
            .filter_map(|queue| queue.in_flight())
            .map(|flight| {
                (
                    flight.curi.clone(),
                    now.saturating_duration_since(flight.dispatched_at),
                )
            })
            .filter(|(_, elapsed)| *elapsed >= grace)
            .collect();

        let mut reaped = 0;
        for (mut curi, elapsed) in stuck {
            tracing::warn!(
                "{} in flight for {:?}, forcing a retry",
                curi.as_str(),
                elapsed
            );
            curi.record_fetch(FetchStatus::Timeout, elapsed, 0);
            match self.finished(curi) {
                Ok(_) => reaped += 1,
                // The worker finished it in the meantime
                Err(FrontierError::NotInFlight { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(reaped)
    }

    /// Runs [`Frontier::reap_stuck`] periodically until the frontier terminates
    pub fn spawn_watchdog(self: &Arc<Self>, grace: Duration) -> JoinHandle<()>
    where
        S: 'static,
    {
        let frontier = Arc::clone(self);
        let period = (grace / 2).max(Duration::from_millis(10));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if frontier.is_terminated() {
                    break;
                }
                if let Err(e) = frontier.reap_stuck(grace) {
                    tracing::error!("Watchdog failed to reap stuck URIs: {}", e);
                }
            }
        })
    }

    /// Starts the background tasks enabled in the configuration
    ///
    /// The stuck-URI watchdog runs when `stuck-grace-ms` is set, periodic
    /// checkpoints when `interval-secs` is. Both stop once the frontier
    /// terminates.
    pub fn spawn_background(self: &Arc<Self>) -> Vec<JoinHandle<()>>
    where
        S: 'static,
    {
        let mut handles = Vec::new();

        if let Some(grace) = self.config.queues.stuck_grace() {
            tracing::info!("Watchdog started (grace {:?})", grace);
            handles.push(self.spawn_watchdog(grace));
        }

        let checkpoints = &self.config.checkpoint;
        if checkpoints.interval_secs > 0 {
            tracing::info!(
                "Checkpointing to {} every {}s",
                checkpoints.directory.display(),
                checkpoints.interval_secs
            );
            let manager = CheckpointManager::new(&checkpoints.directory);
            handles.push(manager.spawn_periodic(
                Arc::clone(self),
                Duration::from_secs(checkpoints.interval_secs),
            ));
        }

        handles
    }

    // ===== Checkpointing =====

    /// Captures a logically consistent image of the frontier
    ///
    /// Blocks scheduling, dispatch and completion while the image is gathered.
    pub fn snapshot(&self) -> Result<FrontierSnapshot> {
        let _gate = self.write_gate();
        let now = Instant::now();

        let directory = {
            let dir = self.directory();
            let mut queues = Vec::with_capacity(dir.len());
            for queue in dir.queues() {
                let pending = self
                    .storage
                    .pending_for(queue.key())?
                    .into_iter()
                    .map(|(seq, uri)| PendingItem { seq, uri })
                    .collect();
                queues.push(queue.snapshot(pending, now));
            }
            queues.sort_by(|a, b| a.key.cmp(&b.key));

            DirectorySnapshot {
                queues,
                inactive: dir.inactive_keys(),
            }
        };

        let fingerprints = self.fingerprints.dump()?;
        let stats = self.stats();

        Ok(FrontierSnapshot {
            stats,
            directory,
            fingerprints,
        })
    }

    /// Writes a checkpoint under `root`, returning its identifier
    pub fn checkpoint(&self, root: &Path) -> Result<CheckpointId> {
        CheckpointManager::new(root).create(self)
    }

    // ===== Lock helpers =====

    fn directory(&self) -> MutexGuard<'_, QueueDirectory> {
        self.directory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn counters(&self) -> MutexGuard<'_, FrontierStats> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_gate(&self) -> RwLockReadGuard<'_, ()> {
        self.gate.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_gate(&self) -> RwLockWriteGuard<'_, ()> {
        self.gate.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Frontier<Arc<dyn Storage>> {
    /// Creates a frontier for a fresh crawl on the configured `[storage]` backend
    pub fn open(config: Config) -> Result<Self> {
        let storage = open_storage(&config.storage)?;
        Self::new(config, storage)
    }
}

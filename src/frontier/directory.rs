use crate::frontier::work_queue::WorkQueue;
use crate::state::QueueState;
use crate::{FrontierError, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use tokio::time::Instant;

/// All work queues, indexed by scheduling key, plus the per-state indices
///
/// Every queue sits in exactly one index matching its state: `ready`
/// (precedence, then key), `snoozed` (wake time, then key), `inactive`
/// (activation order) or `retired`. EMPTY and IN_PROCESS queues are only in
/// the map. All state changes go through [`QueueDirectory::transition`] so the
/// indices never disagree with the queues.
///
/// With a non-zero session balance, every activation lets a queue make that
/// many dispatches before it goes back to the end of the inactive line.
#[derive(Debug, Default)]
pub struct QueueDirectory {
    queues: HashMap<String, WorkQueue>,
    ready: BTreeSet<(u8, String)>,
    snoozed: BTreeSet<(Instant, String)>,
    inactive: VecDeque<String>,
    retired: BTreeSet<String>,
    in_process: usize,
    session_balance: u64,
}

impl QueueDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory whose activations grant `amount` dispatches each (0 = unlimited)
    pub fn with_session_balance(amount: u64) -> Self {
        Self {
            session_balance: amount,
            ..Self::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<&WorkQueue> {
        self.queues.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut WorkQueue> {
        self.queues.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.queues.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    pub fn queues(&self) -> impl Iterator<Item = &WorkQueue> {
        self.queues.values()
    }

    /// Adds a queue, indexing it under whatever state it carries
    ///
    /// Replaces nothing: inserting a key that already exists is ignored and
    /// returns false.
    pub fn insert(&mut self, queue: WorkQueue) -> bool {
        if self.queues.contains_key(queue.key()) {
            return false;
        }
        let key = queue.key().to_string();
        let state = queue.state();
        self.queues.insert(key.clone(), queue);
        self.add_to_index(&key, state);
        true
    }

    /// Moves a queue to a new state, keeping the indices in step
    pub fn transition(&mut self, key: &str, to: QueueState) -> Result<()> {
        let from = self
            .queues
            .get(key)
            .map(WorkQueue::state)
            .ok_or_else(|| FrontierError::UnknownQueue(key.to_string()))?;

        if !from.can_transition_to(to) {
            return Err(FrontierError::InvalidTransition {
                queue: key.to_string(),
                from,
                to,
            });
        }

        self.remove_from_index(key, from);
        if let Some(queue) = self.queues.get_mut(key) {
            queue.state = to;
            if from == QueueState::Snoozed {
                queue.wake_at = None;
            }
        }
        self.add_to_index(key, to);

        tracing::debug!("Queue {}: {} -> {}", key, from, to);
        Ok(())
    }

    /// Lowers a queue's precedence, re-sorting it if it is waiting in the ready index
    pub fn offer_precedence(&mut self, key: &str, precedence: u8) {
        let Some(queue) = self.queues.get_mut(key) else {
            return;
        };
        let before = queue.precedence();
        if queue.offer_precedence(precedence) && queue.state() == QueueState::Ready {
            self.ready.remove(&(before, key.to_string()));
            self.ready.insert((precedence, key.to_string()));
        }
    }

    /// Key of the READY queue that dispatches next
    pub fn first_ready(&self) -> Option<String> {
        self.ready.first().map(|(_, key)| key.clone())
    }

    /// Wakes every snoozed queue whose wake time has passed
    ///
    /// Each is refilled as by [`QueueDirectory::refill`]. Returns the number
    /// of queues that became READY.
    pub fn wake_due(&mut self, now: Instant) -> Result<usize> {
        let mut woken = 0;

        while let Some((wake_at, key)) = self.snoozed.first().cloned() {
            if wake_at > now {
                break;
            }
            if self.refill(&key)? == QueueState::Ready {
                woken += 1;
            }
        }

        Ok(woken)
    }

    /// Returns a finished or woken queue to circulation
    ///
    /// READY if it has pending URIs, EMPTY otherwise; a queue that has used up
    /// its session balance goes INACTIVE instead of READY.
    pub fn refill(&mut self, key: &str) -> Result<QueueState> {
        let target = self.refill_state(key);
        let spent = self
            .queues
            .get(key)
            .is_some_and(WorkQueue::is_session_spent);

        if target == QueueState::Ready && spent {
            self.deactivate(key, None)?;
            return Ok(QueueState::Inactive);
        }
        self.transition(key, target)?;
        Ok(target)
    }

    /// Sends a queue to the back of the inactive line, ending its session
    ///
    /// A `wake_at` is kept so the queue snoozes out the rest of its delay when
    /// it is activated again.
    pub fn deactivate(&mut self, key: &str, wake_at: Option<Instant>) -> Result<()> {
        self.transition(key, QueueState::Inactive)?;
        if let Some(queue) = self.queues.get_mut(key) {
            queue.wake_at = wake_at;
            queue.end_session();
        }
        tracing::debug!("Queue {} deactivated", key);
        Ok(())
    }

    /// Earliest wake time among snoozed queues
    pub fn next_wake(&self) -> Option<Instant> {
        self.snoozed.first().map(|(wake_at, _)| *wake_at)
    }

    /// Snoozes an in-process or inactive queue until `wake_at`
    pub fn snooze(&mut self, key: &str, wake_at: Instant) -> Result<()> {
        let queue = self
            .queues
            .get_mut(key)
            .ok_or_else(|| FrontierError::UnknownQueue(key.to_string()))?;
        let previous = queue.wake_at.replace(wake_at);

        if let Err(e) = self.transition(key, QueueState::Snoozed) {
            if let Some(queue) = self.queues.get_mut(key) {
                queue.wake_at = previous;
            }
            return Err(e);
        }
        Ok(())
    }

    /// Next inactive queue in activation order
    pub fn next_inactive(&self) -> Option<String> {
        self.inactive.front().cloned()
    }

    /// Brings an INACTIVE queue into circulation with a fresh session balance
    ///
    /// Over budget goes to RETIRED, a pending wake time to SNOOZED, otherwise
    /// READY or EMPTY depending on whether anything is queued.
    pub fn activate(&mut self, key: &str, now: Instant) -> Result<QueueState> {
        let queue = self
            .queues
            .get_mut(key)
            .ok_or_else(|| FrontierError::UnknownQueue(key.to_string()))?;
        queue.replenish_session(self.session_balance);

        if queue.is_budget_exhausted() {
            self.transition(key, QueueState::Retired)?;
            return Ok(QueueState::Retired);
        }

        match queue.wake_at() {
            Some(wake_at) if wake_at > now => {
                self.snooze(key, wake_at)?;
                return Ok(QueueState::Snoozed);
            }
            // Stale wake time
            Some(_) => queue.wake_at = None,
            None => {}
        }

        let target = self.refill_state(key);
        self.transition(key, target)?;
        Ok(target)
    }

    /// READY if the queue has pending URIs, EMPTY otherwise
    pub fn refill_state(&self, key: &str) -> QueueState {
        match self.queues.get(key) {
            Some(queue) if !queue.is_empty() => QueueState::Ready,
            _ => QueueState::Empty,
        }
    }

    /// True when nothing can ever be dispatched again without outside input
    ///
    /// Only live states count; RETIRED and EMPTY queues produce no work on
    /// their own.
    pub fn is_exhausted(&self) -> bool {
        QueueState::all_states()
            .into_iter()
            .filter(QueueState::is_live)
            .all(|state| self.count_in(state) == 0)
    }

    /// Number of queues in a state, read from its index
    fn count_in(&self, state: QueueState) -> usize {
        match state {
            QueueState::Ready => self.ready.len(),
            QueueState::Snoozed => self.snoozed.len(),
            QueueState::Inactive => self.inactive.len(),
            QueueState::Retired => self.retired.len(),
            QueueState::InProcess => self.in_process,
            QueueState::Empty => self
                .queues
                .values()
                .filter(|queue| queue.state() == QueueState::Empty)
                .count(),
        }
    }

    pub fn ready_count(&self) -> usize {
        self.ready.len()
    }

    pub fn in_process_count(&self) -> usize {
        self.in_process
    }

    /// Inactive keys in activation order
    pub fn inactive_keys(&self) -> Vec<String> {
        self.inactive.iter().cloned().collect()
    }

    /// Restores the inactive activation order from a checkpoint
    pub fn reorder_inactive(&mut self, order: &[String]) {
        let mut ordered: VecDeque<String> = order
            .iter()
            .filter(|key| self.inactive.contains(key))
            .cloned()
            .collect();
        for key in &self.inactive {
            if !ordered.contains(key) {
                ordered.push_back(key.clone());
            }
        }
        self.inactive = ordered;
    }

    /// Number of queues in each state
    pub fn counts(&self) -> BTreeMap<QueueState, usize> {
        let mut counts: BTreeMap<QueueState, usize> = QueueState::all_states()
            .into_iter()
            .map(|state| (state, 0))
            .collect();
        for queue in self.queues.values() {
            *counts.entry(queue.state()).or_insert(0) += 1;
        }
        counts
    }

    pub fn pending_total(&self) -> u64 {
        self.queues.values().map(WorkQueue::pending_count).sum()
    }

    fn add_to_index(&mut self, key: &str, state: QueueState) {
        let Some(queue) = self.queues.get(key) else {
            return;
        };
        match state {
            QueueState::Ready => {
                self.ready.insert((queue.precedence(), key.to_string()));
            }
            QueueState::Snoozed => {
                // A snoozed queue without a wake time wakes immediately
                let wake_at = queue.wake_at().unwrap_or_else(Instant::now);
                if let Some(queue) = self.queues.get_mut(key) {
                    queue.wake_at = Some(wake_at);
                }
                self.snoozed.insert((wake_at, key.to_string()));
            }
            QueueState::Inactive => self.inactive.push_back(key.to_string()),
            QueueState::Retired => {
                self.retired.insert(key.to_string());
            }
            QueueState::InProcess => self.in_process += 1,
            QueueState::Empty => {}
        }
    }

    fn remove_from_index(&mut self, key: &str, state: QueueState) {
        let Some(queue) = self.queues.get(key) else {
            return;
        };
        match state {
            QueueState::Ready => {
                self.ready.remove(&(queue.precedence(), key.to_string()));
            }
            QueueState::Snoozed => {
                if let Some(wake_at) = queue.wake_at() {
                    self.snoozed.remove(&(wake_at, key.to_string()));
                }
            }
            QueueState::Inactive => self.inactive.retain(|k| k != key),
            QueueState::Retired => {
                self.retired.remove(key);
            }
            QueueState::InProcess => self.in_process = self.in_process.saturating_sub(1),
            QueueState::Empty => {}
        }
    }
}

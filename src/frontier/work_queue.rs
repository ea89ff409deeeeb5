use crate::checkpoint::{PendingItem, QueueSnapshot};
use crate::state::QueueState;
use crate::storage::{Storage, StorageResult};
use crate::uri::CandidateUri;
use std::time::Duration;
use tokio::time::Instant;

/// A URI handed out by `next()` and not yet finished
#[derive(Debug, Clone)]
pub struct InFlight {
    pub curi: CandidateUri,
    pub dispatched_at: Instant,
}

/// Per-queue resource ceilings and charges; a ceiling of 0 is unlimited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Budget {
    pub byte_budget: u64,
    pub uri_budget: u64,
    pub bytes_charged: u64,
    pub uris_charged: u64,
}

impl Budget {
    pub fn new(byte_budget: u64, uri_budget: u64) -> Self {
        Self {
            byte_budget,
            uri_budget,
            ..Self::default()
        }
    }

    pub fn is_exhausted(&self) -> bool {
        (self.byte_budget > 0 && self.bytes_charged >= self.byte_budget)
            || (self.uri_budget > 0 && self.uris_charged >= self.uri_budget)
    }
}

/// The ordered, persisted sequence of pending URIs sharing one scheduling key
///
/// Items live in storage under `(key, seq)`. Tail items take sequence numbers
/// counting up from 0 and head items counting down from -1, so reading in key
/// order yields the head lane newest-first followed by the tail in FIFO order.
///
/// The queue never has more than one URI in flight; `note_in_flight` and
/// `note_flight_complete` must bracket every dispatch.
#[derive(Debug, Clone)]
pub struct WorkQueue {
    key: String,
    pub(crate) state: QueueState,
    precedence: u8,
    precedence_pinned: bool,
    next_head_seq: i64,
    next_tail_seq: i64,
    pending: u64,
    in_flight: Option<InFlight>,
    budget: Budget,
    total_bytes: u64,
    total_uris: u64,
    retries: u64,
    pub(crate) wake_at: Option<Instant>,
    site_min_delay: Option<Duration>,
    retire_on_completion: bool,
    session_balance: u64,
    session_spent: u64,
}

impl WorkQueue {
    /// Creates an empty, inactive queue
    pub fn new(key: impl Into<String>, precedence: u8, budget: Budget) -> Self {
        Self {
            key: key.into(),
            state: QueueState::Inactive,
            precedence,
            precedence_pinned: false,
            next_head_seq: -1,
            next_tail_seq: 0,
            pending: 0,
            in_flight: None,
            budget,
            total_bytes: 0,
            total_uris: 0,
            retries: 0,
            wake_at: None,
            site_min_delay: None,
            retire_on_completion: false,
            session_balance: 0,
            session_spent: 0,
        }
    }

    /// Fixes the queue's precedence regardless of the URIs it receives
    pub fn with_pinned_precedence(mut self, precedence: u8) -> Self {
        self.precedence = precedence;
        self.precedence_pinned = true;
        self
    }

    /// Sets a minimum politeness delay for every fetch from this queue
    pub fn with_min_delay(mut self, delay: Option<Duration>) -> Self {
        self.site_min_delay = delay;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> QueueState {
        self.state
    }

    pub fn precedence(&self) -> u8 {
        self.precedence
    }

    /// Offers the precedence of a newly enqueued URI; returns true if it changed
    pub fn offer_precedence(&mut self, precedence: u8) -> bool {
        if self.precedence_pinned || precedence >= self.precedence {
            return false;
        }
        self.precedence = precedence;
        true
    }

    /// Adds a URI to the tail, or to the front of the head lane
    pub fn enqueue<S: Storage + ?Sized>(
        &mut self,
        storage: &S,
        curi: &CandidateUri,
        at_head: bool,
    ) -> StorageResult<()> {
        let seq = if at_head {
            self.next_head_seq
        } else {
            self.next_tail_seq
        };

        storage.put_pending(&self.key, seq, curi)?;

        if at_head {
            self.next_head_seq -= 1;
        } else {
            self.next_tail_seq += 1;
        }
        self.pending += 1;
        Ok(())
    }

    /// Removes and returns the earliest eligible URI
    ///
    /// Returns `None` if storage holds nothing for this queue.
    ///
    /// # Panics
    ///
    /// Panics if a URI from this queue is already in flight.
    pub fn dequeue_head<S: Storage + ?Sized>(
        &mut self,
        storage: &S,
    ) -> StorageResult<Option<CandidateUri>> {
        assert!(
            self.in_flight.is_none(),
            "dequeue from queue {} while a URI is in flight",
            self.key
        );

        let Some((seq, curi)) = storage.first_pending(&self.key)? else {
            self.pending = 0;
            return Ok(None);
        };

        storage.delete_pending(&self.key, seq)?;
        self.pending = self.pending.saturating_sub(1);
        Ok(Some(curi))
    }

    /// Drops every pending URI, returning how many were removed
    pub fn clear<S: Storage + ?Sized>(&mut self, storage: &S) -> StorageResult<u64> {
        let removed = storage.delete_queue(&self.key)?;
        self.pending = 0;
        Ok(removed)
    }

    pub fn is_empty(&self) -> bool {
        self.pending == 0
    }

    pub fn pending_count(&self) -> u64 {
        self.pending
    }

    /// Records the URI just dispatched from this queue
    ///
    /// # Panics
    ///
    /// Panics if another URI from this queue is already in flight.
    pub fn note_in_flight(&mut self, curi: CandidateUri, now: Instant) {
        assert!(
            self.in_flight.is_none(),
            "queue {} dispatched {} while {} is still in flight",
            self.key,
            curi.as_str(),
            self.in_flight
                .as_ref()
                .map(|f| f.curi.as_str())
                .unwrap_or_default()
        );
        self.in_flight = Some(InFlight {
            curi,
            dispatched_at: now,
        });
    }

    /// Clears the in-flight slot for a finished URI
    ///
    /// # Panics
    ///
    /// Panics if nothing is in flight or a different dispatch is.
    pub fn note_flight_complete(&mut self, curi: &CandidateUri) -> InFlight {
        match self.in_flight.take() {
            Some(flight) if flight.curi.same_dispatch(curi) => flight,
            Some(flight) => panic!(
                "queue {} completed {} but {} is in flight",
                self.key,
                curi.as_str(),
                flight.curi.as_str()
            ),
            None => panic!(
                "queue {} completed {} with nothing in flight",
                self.key,
                curi.as_str()
            ),
        }
    }

    pub fn in_flight(&self) -> Option<&InFlight> {
        self.in_flight.as_ref()
    }

    /// Returns true if `curi` is the dispatch currently in flight
    pub fn is_in_flight(&self, curi: &CandidateUri) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|flight| flight.curi.same_dispatch(curi))
    }

    /// Charges one fetched URI and its bytes against the budget
    pub fn charge(&mut self, bytes: u64) {
        self.budget.bytes_charged = self.budget.bytes_charged.saturating_add(bytes);
        self.budget.uris_charged += 1;
        self.total_bytes = self.total_bytes.saturating_add(bytes);
        self.total_uris += 1;
    }

    pub fn is_budget_exhausted(&self) -> bool {
        self.budget.is_exhausted()
    }

    /// Forgets past charges, keeping lifetime totals
    pub fn reset_budget(&mut self) {
        self.budget.bytes_charged = 0;
        self.budget.uris_charged = 0;
    }

    pub fn budget(&self) -> Budget {
        self.budget
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn total_uris(&self) -> u64 {
        self.total_uris
    }

    /// Grants a fresh session of `amount` dispatches; 0 is unlimited
    pub fn replenish_session(&mut self, amount: u64) {
        self.session_balance = amount;
        self.session_spent = 0;
    }

    /// Charges one finished dispatch against the current session
    pub fn spend_session(&mut self) {
        self.session_spent = self.session_spent.saturating_add(1);
    }

    /// True once a limited session has been used up
    pub fn is_session_spent(&self) -> bool {
        self.session_balance > 0 && self.session_spent >= self.session_balance
    }

    pub(crate) fn end_session(&mut self) {
        self.session_balance = 0;
        self.session_spent = 0;
    }

    pub fn note_retry(&mut self) {
        self.retries += 1;
    }

    pub fn retries(&self) -> u64 {
        self.retries
    }

    pub fn site_min_delay(&self) -> Option<Duration> {
        self.site_min_delay
    }

    pub fn wake_at(&self) -> Option<Instant> {
        self.wake_at
    }

    pub fn retire_on_completion(&self) -> bool {
        self.retire_on_completion
    }

    pub(crate) fn set_retire_on_completion(&mut self, retire: bool) {
        self.retire_on_completion = retire;
    }

    /// Captures the queue for a checkpoint
    pub fn snapshot(&self, pending: Vec<PendingItem>, now: Instant) -> QueueSnapshot {
        // Inactive queues may still carry the wake time they were deactivated with
        let snooze_remaining_ms = match self.state {
            QueueState::Snoozed | QueueState::Inactive => self
                .wake_at
                .map(|wake| wake.saturating_duration_since(now).as_millis() as u64),
            _ => None,
        };

        QueueSnapshot {
            key: self.key.clone(),
            state: self.state,
            precedence: self.precedence,
            precedence_pinned: self.precedence_pinned,
            next_head_seq: self.next_head_seq,
            next_tail_seq: self.next_tail_seq,
            bytes_charged: self.budget.bytes_charged,
            uris_charged: self.budget.uris_charged,
            byte_budget: self.budget.byte_budget,
            uri_budget: self.budget.uri_budget,
            total_bytes: self.total_bytes,
            total_uris: self.total_uris,
            retries: self.retries,
            site_min_delay_ms: self.site_min_delay.map(|d| d.as_millis() as u64),
            snooze_remaining_ms,
            retire_on_completion: self.retire_on_completion,
            session_balance: self.session_balance,
            session_spent: self.session_spent,
            in_flight: self.in_flight.as_ref().map(|f| f.curi.clone()),
            pending,
        }
    }

    /// Rebuilds a queue from a checkpoint, writing its pending URIs to storage
    ///
    /// A URI that was in flight goes back to the front of the head lane, since
    /// its outcome was never recorded. An in-process queue comes back READY
    /// (or RETIRED if it was marked for retirement).
    pub fn restore<S: Storage + ?Sized>(
        snapshot: &QueueSnapshot,
        storage: &S,
        now: Instant,
    ) -> StorageResult<Self> {
        let mut queue = Self {
            key: snapshot.key.clone(),
            state: snapshot.state,
            precedence: snapshot.precedence,
            precedence_pinned: snapshot.precedence_pinned,
            next_head_seq: snapshot.next_head_seq,
            next_tail_seq: snapshot.next_tail_seq,
            pending: 0,
            in_flight: None,
            budget: Budget {
                byte_budget: snapshot.byte_budget,
                uri_budget: snapshot.uri_budget,
                bytes_charged: snapshot.bytes_charged,
                uris_charged: snapshot.uris_charged,
            },
            total_bytes: snapshot.total_bytes,
            total_uris: snapshot.total_uris,
            retries: snapshot.retries,
            wake_at: snapshot
                .snooze_remaining_ms
                .map(|ms| now + Duration::from_millis(ms)),
            site_min_delay: snapshot.site_min_delay_ms.map(Duration::from_millis),
            retire_on_completion: false,
            session_balance: snapshot.session_balance,
            session_spent: snapshot.session_spent,
        };

        for item in &snapshot.pending {
            storage.put_pending(&queue.key, item.seq, &item.uri)?;
            queue.pending += 1;
        }

        if let Some(curi) = &snapshot.in_flight {
            let mut curi = curi.clone();
            curi.clear_fetch_outcome();
            queue.enqueue(storage, &curi, true)?;
        }

        if queue.state == QueueState::InProcess {
            queue.state = if snapshot.retire_on_completion {
                QueueState::Retired
            } else if queue.is_empty() {
                QueueState::Empty
            } else {
                QueueState::Ready
            };
        }

        Ok(queue)
    }
}

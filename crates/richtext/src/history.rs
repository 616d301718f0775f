// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Linear undo/redo history of serialized document snapshots.
//!
//! Bursts of edits are coalesced: [History::record_change] only schedules
//! the snapshot, and it is committed once the coalescing window has passed
//! without another change. The schedule is an explicit [DelayedTask]
//! checked against a [Clock], so nothing runs behind the caller's back.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tracing::trace;
use web_time::Instant;

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// A single pending payload that becomes due `delay` after it was last
/// scheduled. Scheduling again replaces the payload and restarts the
/// delay.
#[derive(Clone, Debug)]
pub struct DelayedTask<T> {
    delay: Duration,
    scheduled: Option<(Instant, T)>,
}

impl<T> DelayedTask<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            scheduled: None,
        }
    }

    /// Schedule `payload`, returning the payload it replaced.
    pub fn schedule(&mut self, now: Instant, payload: T) -> Option<T> {
        self.scheduled
            .replace((now, payload))
            .map(|(_, replaced)| replaced)
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.scheduled.take().map(|(_, payload)| payload)
    }

    pub fn is_pending(&self) -> bool {
        self.scheduled.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.scheduled.as_ref().map(|(at, _)| *at + self.delay)
    }

    /// Take the payload if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<(Instant, T)> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.scheduled.take(),
            _ => None,
        }
    }

    /// Take the payload now, together with when it was scheduled.
    pub fn flush(&mut self) -> Option<(Instant, T)> {
        self.scheduled.take()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub snapshot: String,
    pub timestamp: Instant,
}

pub struct History {
    entries: Vec<HistoryEntry>,
    index: usize,
    limit: usize,
    pending: DelayedTask<String>,
    clock: Box<dyn Clock>,
}

impl History {
    pub fn new(limit: usize, coalesce_window: Duration, clock: Box<dyn Clock>) -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            limit: limit.max(1),
            pending: DelayedTask::new(coalesce_window),
            clock,
        }
    }

    pub fn set_clock(&mut self, clock: Box<dyn Clock>) {
        self.clock = clock;
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Forget everything and start again from `snapshot`.
    pub fn reset(&mut self, snapshot: String) {
        self.pending.cancel();
        self.entries.clear();
        self.index = 0;
        let now = self.clock.now();
        self.push(snapshot, now);
    }

    /// Note a change. It is committed once no further change arrives
    /// within the coalescing window.
    pub fn record_change(&mut self, snapshot: String) {
        self.poll();
        let now = self.clock.now();
        self.pending.schedule(now, snapshot);
    }

    /// Commit any pending change, then record `snapshot` straight away.
    pub fn record_now(&mut self, snapshot: String) {
        self.flush();
        let now = self.clock.now();
        self.push(snapshot, now);
    }

    /// Commit the pending change if its window has passed.
    pub fn poll(&mut self) -> bool {
        let now = self.clock.now();
        match self.pending.take_due(now) {
            Some((at, snapshot)) => {
                self.push(snapshot, at);
                true
            }
            None => false,
        }
    }

    /// Commit the pending change regardless of its deadline.
    pub fn flush(&mut self) -> bool {
        match self.pending.flush() {
            Some((at, snapshot)) => {
                self.push(snapshot, at);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    pub fn undo(&mut self) -> Option<&str> {
        self.flush();
        let index = self.clamped_index()?;
        if index == 0 {
            return None;
        }
        self.index = index - 1;
        trace!(index = self.index, "undo");
        self.entries.get(self.index).map(|e| e.snapshot.as_str())
    }

    pub fn redo(&mut self) -> Option<&str> {
        self.flush();
        let index = self.clamped_index()?;
        if index + 1 >= self.entries.len() {
            return None;
        }
        self.index = index + 1;
        trace!(index = self.index, "redo");
        self.entries.get(self.index).map(|e| e.snapshot.as_str())
    }

    pub fn can_undo(&self) -> bool {
        self.clamped_index().is_some_and(|i| i > 0) || self.is_pending()
    }

    pub fn can_redo(&self) -> bool {
        !self.is_pending()
            && self
                .clamped_index()
                .is_some_and(|i| i + 1 < self.entries.len())
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.clamped_index().unwrap_or(0)
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.clamped_index().and_then(|i| self.entries.get(i))
    }

    fn clamped_index(&self) -> Option<usize> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.index.min(self.entries.len() - 1))
        }
    }

    fn push(&mut self, snapshot: String, timestamp: Instant) {
        if let Some(index) = self.clamped_index() {
            self.entries.truncate(index + 1);
        }
        if self.entries.last().is_some_and(|e| e.snapshot == snapshot) {
            self.index = self.entries.len() - 1;
            return;
        }
        self.entries.push(HistoryEntry {
            snapshot,
            timestamp,
        });
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }
        self.index = self.entries.len() - 1;
        trace!(index = self.index, len = self.entries.len(), "history entry committed");
    }
}

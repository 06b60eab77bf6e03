//! Virtual-time timers and generation tokens
//!
//! The engine runs on the host's event loop but never reads a clock. Every
//! entry point receives `now_ms`, timers are queued with an absolute fire
//! time, and the host drains them by advancing time. Tasks carry a [`Token`]
//! from a [`Generation`] counter; a newer gesture bumps the generation and any
//! callback holding an older token drops itself when it fires.

use std::fmt;

/// Monotonic stamp identifying the gesture a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(u64);

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonically increasing token source.
#[derive(Debug, Default, Clone)]
pub struct Generation {
    current: u64,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, invalidating every previously issued token.
    pub fn bump(&mut self) -> Token {
        self.current += 1;
        Token(self.current)
    }

    pub fn current(&self) -> Token {
        Token(self.current)
    }

    pub fn is_current(&self, token: Token) -> bool {
        token.0 == self.current
    }
}

/// Handle returned by [`TimerQueue::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct TimerEntry<T> {
    id: u64,
    fire_at: u64,
    task: T,
}

/// One-shot timers ordered by fire time, ties broken by scheduling order.
#[derive(Debug)]
pub struct TimerQueue<T> {
    entries: Vec<TimerEntry<T>>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, task: T) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(TimerEntry {
            id,
            fire_at: now_ms.saturating_add(delay_ms),
            task,
        });
        TimerId(id)
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id.0);
        self.entries.len() != before
    }

    /// Cancel every pending task matching `pred`. Returns how many were
    /// removed.
    pub fn cancel_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|e| !pred(&e.task));
        before - self.entries.len()
    }

    /// Fire time of the earliest pending task.
    pub fn next_due(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.fire_at).min()
    }

    /// Remove and return the earliest task due at or before `now_ms`, along
    /// with its scheduled fire time.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(u64, T)> {
        let pos = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.fire_at <= now_ms)
            .min_by_key(|(_, e)| (e.fire_at, e.id))
            .map(|(pos, _)| pos)?;
        let entry = self.entries.remove(pos);
        Some((entry.fire_at, entry.task))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains<F>(&self, mut pred: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.entries.iter().any(|e| pred(&e.task))
    }
}

//! Character-by-character reveal of a source text.
//!
//! The driver never sleeps. Each tick is a plain value carrying the run
//! generation it was scheduled for and the instant it becomes due; the event
//! loop asks for [`AnimationDriver::next_deadline`], waits, then calls
//! [`AnimationDriver::poll`]. A tick is only scheduled after the previous one
//! fired, so reveals form a serial chain with a fresh random delay each time.

use crate::{config::TypingConfig, types::RunState};

use rand::{Rng, SeedableRng, rngs::StdRng};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnimationError {
    #[error("source text is empty")]
    EmptySource,

    #[error("a run is already in progress")]
    AlreadyRunning,
}

/// A pending reveal, valid only for the run that scheduled it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledTick {
    pub generation: u64,
    pub due: Instant,
}

/// What a fired tick did to the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reveal {
    /// One more character is visible; the run continues.
    Advanced(usize),
    /// The last character became visible.
    Completed(usize),
}

pub struct AnimationDriver {
    source: String,
    /// Byte offset just past each character of `source`.
    char_ends: Vec<usize>,
    cursor: usize,
    state: RunState,
    generation: u64,
    pending: Option<ScheduledTick>,
    min_delay_ms: u64,
    max_delay_ms: u64,
    rng: StdRng,
}

impl AnimationDriver {
    pub fn new(typing: &TypingConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            source: String::new(),
            char_ends: Vec::new(),
            cursor: 0,
            state: RunState::Idle,
            generation: 0,
            pending: None,
            min_delay_ms: typing.min_delay_ms,
            max_delay_ms: typing.max_delay_ms.max(typing.min_delay_ms + 1),
            rng,
        }
    }

    pub fn start(&mut self, source: &str, now: Instant) -> Result<ScheduledTick, AnimationError> {
        if source.trim().is_empty() {
            return Err(AnimationError::EmptySource);
        }

        if self.state == RunState::Running {
            return Err(AnimationError::AlreadyRunning);
        }

        self.source = source.to_string();
        self.char_ends = source
            .char_indices()
            .map(|(i, c)| i + c.len_utf8())
            .collect();
        self.cursor = 0;
        self.state = RunState::Running;
        self.generation += 1;

        tracing::info!(
            generation = self.generation,
            chars = self.char_ends.len(),
            "typing run started"
        );

        Ok(self.schedule(now))
    }

    /// Drops the current run. Any tick scheduled for it becomes stale.
    pub fn reset(&mut self) {
        if self.state != RunState::Idle {
            tracing::info!(
                generation = self.generation,
                cursor = self.cursor,
                "typing run reset"
            );
        }

        self.generation += 1;
        self.pending = None;
        self.cursor = 0;
        self.state = RunState::Idle;
        self.source.clear();
        self.char_ends.clear();
    }

    /// Fires the pending tick if it is due. Reveals at most one character
    /// per call no matter how late the call is.
    pub fn poll(&mut self, now: Instant) -> Option<Reveal> {
        let tick = self.pending?;

        if now < tick.due {
            return None;
        }

        self.fire(tick, now)
    }

    /// Applies `tick` to the run. Ticks from a superseded run, or any tick
    /// other than the one currently pending, are ignored.
    pub fn fire(&mut self, tick: ScheduledTick, now: Instant) -> Option<Reveal> {
        if tick.generation != self.generation || self.pending != Some(tick) {
            tracing::trace!(
                stale = tick.generation,
                current = self.generation,
                "ignoring stale tick"
            );

            return None;
        }

        self.pending = None;
        self.cursor += 1;

        if self.cursor >= self.char_ends.len() {
            self.cursor = self.char_ends.len();
            self.state = RunState::Completed;

            tracing::info!(generation = self.generation, "typing run completed");

            return Some(Reveal::Completed(self.cursor));
        }

        self.schedule(now);

        Some(Reveal::Advanced(self.cursor))
    }

    fn schedule(&mut self, now: Instant) -> ScheduledTick {
        let delay = self.rng.random_range(self.min_delay_ms..self.max_delay_ms);
        let tick = ScheduledTick {
            generation: self.generation,
            due: now + Duration::from_millis(delay),
        };

        self.pending = Some(tick);

        tick
    }

    pub fn revealed(&self) -> &str {
        let end = match self.cursor {
            0 => 0,
            n => self.char_ends[n - 1],
        };

        &self.source[..end]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Source length in characters.
    pub fn char_count(&self) -> usize {
        self.char_ends.len()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|tick| tick.due)
    }

    #[cfg(test)]
    pub fn pending(&self) -> Option<ScheduledTick> {
        self.pending
    }
}

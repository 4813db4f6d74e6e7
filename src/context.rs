//! Per-graph identity and time source.
//!
//! The context owns the single monotonically increasing id counter shared by
//! nodes and edges, and the clock that anchors every item's timestamp to the
//! page-navigation start. Both are explicit state threaded through the graph
//! constructor, not ambient globals, so the tracker and item types are
//! testable in isolation with a fake clock.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Source of "time since page-navigation start".
pub trait PageClock {
    /// Duration elapsed since the page started loading.
    fn elapsed(&self) -> Duration;
}

/// Production clock anchored to a real [`Instant`].
#[derive(Debug)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    /// Anchors the clock at the moment of the call.
    pub fn start_now() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl PageClock for MonotonicClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Deterministic clock for tests and offline replay; advances only when told.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    /// Clock starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl PageClock for ManualClock {
    fn elapsed(&self) -> Duration {
        self.now.get()
    }
}

/// Id allocator plus page clock for one graph.
pub struct GraphContext {
    next_id: u64,
    clock: Box<dyn PageClock>,
}

impl GraphContext {
    /// Context with a real clock anchored now.
    pub fn new() -> Self {
        Self::with_clock(Box::new(MonotonicClock::start_now()))
    }

    /// Context with an injected clock.
    pub fn with_clock(clock: Box<dyn PageClock>) -> Self {
        Self { next_id: 0, clock }
    }

    /// Next item id. Strictly increasing, starting at 1, shared by nodes and
    /// edges, never reused for the lifetime of this graph.
    pub fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Duration since page-navigation start.
    pub fn time_since_page_start(&self) -> Duration {
        self.clock.elapsed()
    }
}

impl Default for GraphContext {
    fn default() -> Self {
        Self::new()
    }
}

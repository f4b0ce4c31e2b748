//! Generic discrete-event scheduler: clock, event queue, handler registry,
//! and termination policy.
//!
//! This is a self-contained, independently testable engine. The one real
//! consumer in this crate ([`crate::line::ProductionLine`]) does not
//! register handlers through it — it drives its own closed `match` over
//! `EventKind` and only borrows [`Simulator::pop_ready`] for clock/queue/
//! termination bookkeeping, since `ProductionLine`'s handlers need `&mut`
//! access to sibling stations that a boxed closure registry can't express
//! without extra indirection. The registry below exists so the scheduler
//! primitive itself — clock monotonicity, handler replacement, termination
//! — can be exercised and trusted in isolation.

use std::collections::HashMap;

use tracing::debug;

use crate::event::{Event, EventKind};
use crate::queue::EventQueue;

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimStats {
    pub events_processed: u64,
    pub total_entities: u64,
    pub completed_entities: u64,
}

/// Optional termination bounds for [`Simulator::run`]/[`Simulator::pop_ready`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminationPolicy {
    pub max_time: Option<f64>,
    pub max_events: Option<u64>,
}

type Handler = Box<dyn FnMut(&Event, &mut EventQueue)>;

/// Owns the clock, the event queue, a registry mapping event kinds to
/// handlers, and run counters.
pub struct Simulator {
    clock: f64,
    queue: EventQueue,
    handlers: HashMap<EventKind, Handler>,
    stats: SimStats,
}

impl Simulator {
    pub fn new() -> Self {
        Self {
            clock: 0.0,
            queue: EventQueue::new(),
            handlers: HashMap::new(),
            stats: SimStats::default(),
        }
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn stats(&self) -> SimStats {
        self.stats
    }

    pub fn schedule(&mut self, event: Event) {
        self.queue.schedule(event);
    }

    /// Replace any prior registration for `kind`.
    pub fn register_handler(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&Event, &mut EventQueue) + 'static,
    ) {
        self.handlers.insert(kind, Box::new(handler));
    }

    /// Pop the next event if termination hasn't been reached, advancing the
    /// clock to its timestamp. Checks the bound *before* popping, against
    /// the queued event's own timestamp rather than the current clock, so
    /// the clock can never overshoot `max_time`.
    pub fn pop_ready(&mut self, policy: TerminationPolicy) -> Option<Event> {
        if let Some(max_events) = policy.max_events {
            if self.stats.events_processed >= max_events {
                return None;
            }
        }
        let next_time = self.queue.peek_time()?;
        if let Some(max_time) = policy.max_time {
            if next_time >= max_time {
                return None;
            }
        }
        let event = self.queue.pop_next().expect("peek_time returned Some");
        debug_assert!(event.time >= self.clock, "clock moved backward");
        self.clock = event.time;
        self.stats.events_processed += 1;
        Some(event)
    }

    /// Run the registered handler registry to completion under `policy`.
    /// Unhandled kinds are silently skipped but still consume a dispatch
    /// count.
    pub fn run(&mut self, policy: TerminationPolicy) {
        while let Some(event) = self.pop_ready(policy) {
            if let Some(handler) = self.handlers.get_mut(&event.kind) {
                handler(&event, &mut self.queue);
            }
        }
        debug!(
            clock = self.clock,
            events_processed = self.stats.events_processed,
            "simulator run complete"
        );
    }

    /// Return to zero clock, empty queue, zero stats. Handler registrations
    /// are preserved — they're wiring, not run state.
    pub fn reset(&mut self) {
        self.clock = 0.0;
        self.queue.clear();
        self.stats = SimStats::default();
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

//! Timestamped events ordered by ascending time, with stable FIFO
//! tie-breaking by insertion sequence.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// The closed set of event kinds this engine dispatches.
///
/// Per the design note on replacing dynamic dispatch with a closed tagged
/// union: future kinds (starvation, blocking) extend this enum and the
/// `match` in [`crate::line::ProductionLine::run`], not a string registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A job attempts to enter the line at station 0.
    Arrival,
    /// A station finishes processing its current job.
    ProcessingEnd,
}

/// An immutable scheduled event.
///
/// `seq` is assigned by [`crate::queue::EventQueue::schedule`] and breaks
/// ties between events sharing a timestamp so that two events scheduled for
/// the same instant dispatch in the order they were enqueued.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub time: f64,
    pub kind: EventKind,
    pub station_id: Option<usize>,
    pub job_id: Option<u64>,
    pub seq: u64,
}

impl Event {
    pub fn new(time: f64, kind: EventKind, station_id: Option<usize>, job_id: Option<u64>) -> Self {
        Self {
            time,
            kind,
            station_id,
            job_id,
            seq: 0,
        }
    }
}

impl Eq for Event {}

// total_cmp on f64 time gives a total order even across NaN, which this
// crate never produces but which the heap's invariants require regardless.
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.time.total_cmp(&other.time) {
            Ordering::Equal => self.seq.cmp(&other.seq),
            ord => ord,
        }
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_time_first() {
        let a = Event { seq: 5, ..Event::new(1.0, EventKind::Arrival, None, None) };
        let b = Event { seq: 1, ..Event::new(2.0, EventKind::Arrival, None, None) };
        assert!(a < b);
    }

    #[test]
    fn ties_break_by_seq() {
        let a = Event { seq: 1, ..Event::new(5.0, EventKind::Arrival, None, None) };
        let b = Event { seq: 2, ..Event::new(5.0, EventKind::ProcessingEnd, None, None) };
        assert!(a < b);
    }

    #[test]
    fn equal_time_and_seq_are_equal_order() {
        let a = Event { seq: 1, ..Event::new(5.0, EventKind::Arrival, None, None) };
        let b = Event { seq: 1, ..Event::new(5.0, EventKind::Arrival, None, None) };
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }
}

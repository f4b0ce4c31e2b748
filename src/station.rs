//! Per-station state machine, service-time sampler, FIFO waiting queue, and
//! time-weighted state counters.

use std::collections::VecDeque;

use crate::sampling::Sampler;

/// A station's current processing state.
///
/// `Blocked` and `Starved` are part of the data model but no transition in
/// this crate ever enters them: the line uses infinite inter-station
/// queues (no finite buffer to block against) and does not currently
/// detect starvation at a predecessor's completion. They're kept on the
/// enum so the type is ready for that extension without a breaking change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationState {
    Idle,
    Processing,
    Blocked,
    Starved,
}

/// Per-station aggregate: identity, parameters, current state, waiting
/// queue, and time-weighted counters.
#[derive(Debug, Clone)]
pub struct Station {
    pub station_id: usize,
    pub name: String,
    pub mean_processing_time: f64,
    pub cv_processing: f64,

    state: StationState,
    current_job: Option<u64>,
    queue: VecDeque<u64>,

    total_idle_time: f64,
    total_blocked_time: f64,
    total_starved_time: f64,
    total_processed: u64,
    last_state_change_time: f64,
}

impl Station {
    pub fn new(station_id: usize, name: String, mean_processing_time: f64, cv_processing: f64) -> Self {
        Self {
            station_id,
            name,
            mean_processing_time,
            cv_processing,
            state: StationState::Idle,
            current_job: None,
            queue: VecDeque::new(),
            total_idle_time: 0.0,
            total_blocked_time: 0.0,
            total_starved_time: 0.0,
            total_processed: 0,
            last_state_change_time: 0.0,
        }
    }

    pub fn state(&self) -> StationState {
        self.state
    }

    pub fn current_job(&self) -> Option<u64> {
        self.current_job
    }

    pub fn is_idle(&self) -> bool {
        self.state == StationState::Idle
    }

    pub fn total_processed(&self) -> u64 {
        self.total_processed
    }

    /// Append `job` to the waiting queue unless it's already present — the
    /// membership check guards against a job being routed onto a busy
    /// station that already has it queued, which should never happen in
    /// correct routing but is cheap to defend against.
    pub fn enqueue(&mut self, job: u64) {
        if !self.queue.contains(&job) {
            self.queue.push_back(job);
        }
    }

    pub fn dequeue(&mut self) -> Option<u64> {
        self.queue.pop_front()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Begin processing `job`. Caller must have already confirmed the
    /// station is idle. Attributes elapsed idle time up to `now`, then
    /// samples a duration and returns it so the caller can schedule the
    /// matching `ProcessingEnd`.
    pub fn start_processing(&mut self, now: f64, job: u64, sampler: &mut Sampler) -> f64 {
        debug_assert!(self.is_idle(), "start_processing called on non-idle station");
        self.update_statistics(now);
        self.state = StationState::Processing;
        self.current_job = Some(job);
        sampler
            .sample_service(self.mean_processing_time, self.cv_processing)
            .max(0.001)
    }

    /// Finish processing the current job. Attributes elapsed processing
    /// time up to `now` (implicitly, via `update_statistics`), clears the
    /// current job, returns to `Idle`, and bumps `total_processed`.
    pub fn finish_processing(&mut self, now: f64) {
        debug_assert_eq!(self.state, StationState::Processing, "finish_processing called while not processing");
        self.total_processed += 1;
        self.current_job = None;
        self.update_statistics(now);
        self.state = StationState::Idle;
    }

    /// Attribute `now - last_state_change_time` to the counter for the
    /// state currently being exited, then advance the watermark to `now`.
    /// Must be called immediately before every state transition.
    pub fn update_statistics(&mut self, now: f64) {
        let elapsed = now - self.last_state_change_time;
        match self.state {
            StationState::Idle => self.total_idle_time += elapsed,
            StationState::Blocked => self.total_blocked_time += elapsed,
            StationState::Starved => self.total_starved_time += elapsed,
            // Processing time is tracked implicitly as the residual
            // (now - idle - blocked - starved), never accumulated directly.
            StationState::Processing => {}
        }
        self.last_state_change_time = now;
    }

    /// Utilization: fraction of elapsed time spent processing, current as
    /// of `now` (flushes counters first).
    pub fn utilization(&mut self, now: f64) -> f64 {
        self.update_statistics(now);
        let total = now;
        if total <= 0.0 {
            return 0.0;
        }
        (total - self.total_idle_time - self.total_blocked_time - self.total_starved_time) / total
    }

    /// Mean processing time per completed job, computed as the residual of
    /// elapsed time not spent idle/blocked/starved, current as of `now`.
    pub fn avg_processing_time(&mut self, now: f64) -> f64 {
        self.update_statistics(now);
        if self.total_processed == 0 {
            return 0.0;
        }
        let processing_time = now - self.total_idle_time - self.total_blocked_time - self.total_starved_time;
        processing_time / self.total_processed as f64
    }

    /// Reset all mutable state back to a fresh `Idle` station at time 0.
    pub fn reset(&mut self) {
        self.state = StationState::Idle;
        self.current_job = None;
        self.queue.clear();
        self.total_idle_time = 0.0;
        self.total_blocked_time = 0.0;
        self.total_starved_time = 0.0;
        self.total_processed = 0;
        self.last_state_change_time = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station() -> Station {
        Station::new(0, "s0".into(), 2.0, 0.0)
    }

    #[test]
    fn starts_idle() {
        let s = station();
        assert!(s.is_idle());
        assert_eq!(s.current_job(), None);
    }

    #[test]
    fn start_then_finish_processing_cycles_back_to_idle() {
        let mut s = station();
        let mut sampler = Sampler::from_seed(1);
        let d = s.start_processing(0.0, 7, &mut sampler);
        assert_eq!(s.state(), StationState::Processing);
        assert_eq!(s.current_job(), Some(7));
        assert_eq!(d, 2.0); // deterministic (cv=0)

        s.finish_processing(d);
        assert!(s.is_idle());
        assert_eq!(s.current_job(), None);
        assert_eq!(s.total_processed(), 1);
    }

    #[test]
    fn enqueue_is_idempotent_for_same_job() {
        let mut s = station();
        s.enqueue(1);
        s.enqueue(1);
        assert_eq!(s.queue_len(), 1);
    }

    #[test]
    fn dequeue_is_fifo() {
        let mut s = station();
        s.enqueue(1);
        s.enqueue(2);
        assert_eq!(s.dequeue(), Some(1));
        assert_eq!(s.dequeue(), Some(2));
        assert_eq!(s.dequeue(), None);
    }

    #[test]
    fn utilization_is_zero_before_any_time_elapses() {
        let mut s = station();
        assert_eq!(s.utilization(0.0), 0.0);
    }

    #[test]
    fn utilization_reflects_processing_fraction() {
        let mut s = station();
        let mut sampler = Sampler::from_seed(1);
        // idle 0..1, processing 1..3 (mean=2, cv=0 deterministic)
        s.update_statistics(1.0);
        let d = s.start_processing(1.0, 1, &mut sampler);
        s.finish_processing(1.0 + d);
        let u = s.utilization(3.0);
        assert!((u - (2.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn avg_processing_time_is_zero_with_no_completions() {
        let mut s = station();
        assert_eq!(s.avg_processing_time(10.0), 0.0);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut s = station();
        let mut sampler = Sampler::from_seed(1);
        let d = s.start_processing(0.0, 1, &mut sampler);
        s.finish_processing(d);
        s.reset();
        assert!(s.is_idle());
        assert_eq!(s.total_processed(), 0);
        assert_eq!(s.utilization(10.0), 0.0);
    }
}

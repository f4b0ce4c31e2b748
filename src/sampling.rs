//! Seedable random sampling: exponential inter-arrivals, gamma service
//! times.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp, Gamma};

/// Smallest duration this crate will ever schedule. Prevents zero-duration
/// events from stacking infinitely at the same timestamp.
const MIN_DURATION: f64 = 0.001;

/// Wraps a seedable PRNG so `Sampler` is the single place line/station code
/// draws randomness from — given the same seed and draw sequence, two
/// `Sampler`s produce bit-identical output.
pub struct Sampler {
    rng: StdRng,
}

impl Sampler {
    /// Seed from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seed deterministically for reproducible runs.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Sample an inter-arrival duration for the given `rate` and `cv`.
    ///
    /// `cv <= 0` yields the deterministic inter-arrival `1/rate` (required
    /// for the deterministic-arrival scenario). `cv == 1` yields a plain
    /// `Exponential(rate)` draw (Poisson arrivals). Any other `cv` scales
    /// the exponential rate by `cv`, matching the source implementation's
    /// documented anomaly rather than producing an arrival process whose
    /// CV actually equals `cv` — see the design notes on this.
    pub fn sample_interarrival(&mut self, rate: f64, cv: f64) -> f64 {
        if cv <= 0.0 {
            return 1.0 / rate;
        }
        let effective_rate = if cv == 1.0 { rate } else { rate * cv };
        let dist = Exp::new(effective_rate).expect("rate validated > 0 at construction");
        dist.sample(&mut self.rng)
    }

    /// Sample a service duration with the given `mean` and `cv`.
    ///
    /// `cv = 0` returns `mean` exactly (deterministic). Otherwise samples
    /// from `Gamma(shape = 1/cv^2, scale = mean * cv^2)`, which matches the
    /// requested mean and CV exactly. The result is clamped to
    /// [`MIN_DURATION`].
    pub fn sample_service(&mut self, mean: f64, cv: f64) -> f64 {
        if cv == 0.0 {
            return mean.max(MIN_DURATION);
        }
        let shape = 1.0 / (cv * cv);
        let scale = mean * cv * cv;
        let dist = Gamma::new(shape, scale).expect("mean/cv validated at construction");
        dist.sample(&mut self.rng).max(MIN_DURATION)
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_service_time_equals_mean() {
        let mut s = Sampler::from_seed(1);
        assert_eq!(s.sample_service(2.5, 0.0), 2.5);
    }

    #[test]
    fn deterministic_interarrival_equals_inverse_rate() {
        let mut s = Sampler::from_seed(1);
        assert_eq!(s.sample_interarrival(10.0, 0.0), 0.1);
    }

    #[test]
    fn service_time_never_below_min_duration() {
        let mut s = Sampler::from_seed(1);
        assert!(s.sample_service(1e-9, 0.0) >= MIN_DURATION);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Sampler::from_seed(42);
        let mut b = Sampler::from_seed(42);
        for _ in 0..20 {
            assert_eq!(
                a.sample_service(2.0, 1.0),
                b.sample_service(2.0, 1.0)
            );
        }
    }

    #[test]
    fn gamma_service_time_is_positive() {
        let mut s = Sampler::from_seed(7);
        for _ in 0..100 {
            assert!(s.sample_service(3.0, 0.5) > 0.0);
        }
    }
}

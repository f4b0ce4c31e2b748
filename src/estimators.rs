//! Factory Physics closed-form estimators: pure, referentially transparent
//! functions used both as inputs to analysis and as cross-checks against
//! simulated output.

use crate::station::Station;

/// Utilization `u = λ/μ`, capped at 1. Returns 1 if `mu <= 0` (a station
/// with no processing capacity is treated as saturated, not undefined).
pub fn utilization(lambda: f64, mu: f64) -> f64 {
    if mu <= 0.0 {
        return 1.0;
    }
    (lambda / mu).min(1.0)
}

/// Kingman's G/G/1 approximation for mean cycle time.
///
/// `u >= 1` is an unstable queue: cycle time is unbounded (`+∞`). `u <= 0`
/// is an idle station: cycle time is just the processing time itself,
/// `t_e`.
pub fn cycle_time(t_e: f64, u: f64, ca: f64, ce: f64) -> f64 {
    if u >= 1.0 {
        return f64::INFINITY;
    }
    if u <= 0.0 {
        return t_e;
    }
    ((ca * ca + ce * ce) / 2.0) * (u / (1.0 - u)) * t_e + t_e
}

/// Little's Law: `WIP = TH * CT`.
pub fn wip(throughput: f64, cycle_time: f64) -> f64 {
    throughput * cycle_time
}

/// Inverse of Little's Law: `TH = WIP / CT`, 0 if `cycle_time <= 0`.
pub fn throughput(wip: f64, cycle_time: f64) -> f64 {
    if cycle_time <= 0.0 {
        return 0.0;
    }
    wip / cycle_time
}

/// A station's processing rate/variability inputs, as needed by the
/// system-level estimators below.
#[derive(Debug, Clone, Copy)]
pub struct StationProfile {
    pub mean_processing_time: f64,
    pub cv_processing: f64,
}

impl StationProfile {
    pub fn from_station(station: &Station) -> Self {
        Self {
            mean_processing_time: station.mean_processing_time,
            cv_processing: station.cv_processing,
        }
    }

    fn mu(&self) -> f64 {
        if self.mean_processing_time <= 0.0 {
            return 0.0;
        }
        1.0 / self.mean_processing_time
    }
}

/// Index of the station with maximum utilization at arrival rate `lambda`
/// (first on ties).
pub fn bottleneck(stations: &[StationProfile], lambda: f64) -> Option<usize> {
    stations
        .iter()
        .map(|s| utilization(lambda, s.mu()))
        .enumerate()
        .fold(None, |best, (i, u)| match best {
            None => Some((i, u)),
            Some((_, best_u)) if u > best_u => Some((i, u)),
            Some(b) => Some(b),
        })
        .map(|(i, _)| i)
}

/// System throughput is capped by the bottleneck: `min(λ, μ_bottleneck)`.
pub fn system_throughput(stations: &[StationProfile], lambda: f64) -> f64 {
    let Some(min_mu) = stations
        .iter()
        .map(StationProfile::mu)
        .fold(None, |acc: Option<f64>, mu| {
            Some(acc.map_or(mu, |a| a.min(mu)))
        })
    else {
        return 0.0;
    };
    lambda.min(min_mu)
}

/// Sum of per-station cycle times, with the arrival rate into each station
/// propagated forward as `min(λ_{i-1}, μ_{i-1})` of the previous station.
pub fn system_cycle_time(stations: &[StationProfile], lambda: f64) -> f64 {
    let mut incoming_rate = lambda;
    let mut total = 0.0;
    for s in stations {
        let mu = s.mu();
        let u = utilization(incoming_rate, mu);
        total += cycle_time(s.mean_processing_time, u, 1.0, s.cv_processing);
        incoming_rate = incoming_rate.min(mu);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utilization_caps_at_one() {
        assert_eq!(utilization(10.0, 1.0), 1.0);
    }

    #[test]
    fn utilization_zero_mu_is_saturated() {
        assert_eq!(utilization(1.0, 0.0), 1.0);
    }

    #[test]
    fn cycle_time_at_u_one_is_infinite() {
        assert_eq!(cycle_time(1.0, 1.0, 1.0, 1.0), f64::INFINITY);
    }

    #[test]
    fn cycle_time_at_u_zero_is_mean_processing_time() {
        assert_eq!(cycle_time(3.5, 0.0, 1.0, 1.0), 3.5);
    }

    #[test]
    fn cycle_time_matches_kingman_scenario() {
        // N=1, t_e=2, u=0.8, ca=ce=1 -> ((1+1)/2)*(0.8/0.2)*2 + 2 = 10
        let ct = cycle_time(2.0, 0.8, 1.0, 1.0);
        assert!((ct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn wip_is_throughput_times_cycle_time() {
        assert_eq!(wip(2.0, 5.0), 10.0);
    }

    #[test]
    fn throughput_zero_cycle_time_is_zero() {
        assert_eq!(throughput(10.0, 0.0), 0.0);
    }

    #[test]
    fn throughput_inverts_wip() {
        assert_eq!(throughput(10.0, 5.0), 2.0);
    }

    #[test]
    fn bottleneck_picks_max_utilization_first_on_ties() {
        let stations = vec![
            StationProfile { mean_processing_time: 1.0, cv_processing: 0.0 },
            StationProfile { mean_processing_time: 0.5, cv_processing: 0.0 },
        ];
        // mu0 = 1, mu1 = 2; lambda=10 saturates both to u=1 -> tie -> first
        assert_eq!(bottleneck(&stations, 10.0), Some(0));
    }

    #[test]
    fn system_throughput_capped_by_bottleneck() {
        let stations = vec![
            StationProfile { mean_processing_time: 1.0, cv_processing: 0.0 },
            StationProfile { mean_processing_time: 0.5, cv_processing: 0.0 },
        ];
        assert_eq!(system_throughput(&stations, 10.0), 1.0);
    }

    #[test]
    fn system_cycle_time_sums_per_station() {
        let stations = vec![StationProfile { mean_processing_time: 1.0, cv_processing: 0.0 }];
        let ct = system_cycle_time(&stations, 0.0);
        assert_eq!(ct, 1.0);
    }
}

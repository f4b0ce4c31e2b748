//! Construction-time and call-time error types.
//!
//! Invariant violations (I1–I6 in the data model) are not modeled here —
//! they indicate a bug in this crate itself and are raised via
//! `debug_assert!` at the point of the violated transition, not as a
//! recoverable `Result`. This enum covers only failures a caller can
//! actually act on: bad constructor arguments and an out-of-range
//! station id.

use thiserror::Error;

/// Failure constructing or reconfiguring a [`crate::line::ProductionLine`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LineError {
    /// `num_stations` was zero.
    #[error("num_stations must be >= 1, got {0}")]
    NoStations(usize),

    /// `conwip_level` was zero.
    #[error("conwip_level must be >= 1, got {0}")]
    InvalidConwipLevel(usize),

    /// A mean processing time was non-positive.
    #[error("station {station}: mean_processing_time must be > 0, got {value}")]
    InvalidProcessingTime { station: usize, value: f64 },

    /// A processing-time CV was negative.
    #[error("station {station}: cv_processing must be >= 0, got {value}")]
    InvalidCv { station: usize, value: f64 },

    /// `arrival_rate` was non-positive.
    #[error("arrival_rate must be > 0, got {0}")]
    InvalidArrivalRate(f64),

    /// `cv_arrival` was negative.
    #[error("cv_arrival must be >= 0, got {0}")]
    InvalidArrivalCv(f64),

    /// A per-station parameter array's length didn't match `num_stations`.
    #[error("{field}.len() = {got}, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        got: usize,
        expected: usize,
    },

    /// `update_parameters`/internal lookup given a station id that doesn't exist.
    #[error("station_id {0} out of range")]
    StationOutOfRange(usize),
}

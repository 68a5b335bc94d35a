//! # Cycle Curves
//!
//! Turns the raw time series of one cycle into a fixed-size curve:
//!
//! 1. [`segment`] locates the charge and discharge windows
//! 2. [`resample`] interpolates each channel of a window onto `points`
//!    evenly spaced sample positions
//!
//! The resulting `(8, points)` curve stacks `[Q, V, I, T]` of the charge
//! window followed by `[Q, V, I, T]` of the discharge window.

mod resample;
mod segment;

pub use resample::{resample, resample_window};
pub use segment::{segment, CycleWindows, DISCHARGE_END_THRESHOLD, DISCHARGE_START_THRESHOLD};

use ndarray::{s, Array2};

use crate::archive::RawCycle;

/// Channels per cycle curve.
pub const CURVE_CHANNELS: usize = 8;

/// Channels per charge or discharge half of a curve.
pub const PART_CHANNELS: usize = 4;

/// Default number of resampled points per window.
pub const DEFAULT_POINTS: usize = 500;

/// Errors that can occur while building a cycle curve
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    /// Fewer than two zero-current samples, so the end of charge is unknown
    #[error("no end of charge: found {zeros} zero-current samples, need 2")]
    NoChargeEnd {
        /// Number of zero-current samples found
        zeros: usize,
    },

    /// Discharge capacity never increases by the start threshold
    #[error("no start of discharge: capacity never rises by 1e-3")]
    NoDischargeStart,

    /// Discharge capacity never accelerates by the end threshold
    #[error("no end of discharge: second difference never exceeds 1e-4")]
    NoDischargeEnd,

    /// The detected discharge window is empty
    #[error("empty discharge window [{start}, {end})")]
    EmptyDischarge {
        /// Detected start index
        start: usize,
        /// Detected end index
        end: usize,
    },

    /// Cannot resample an empty series
    #[error("cannot resample an empty series")]
    EmptySeries,

    /// Requested zero output points
    #[error("number of resampled points must be positive")]
    ZeroPoints,

    /// Channels of a cycle disagree in length
    #[error("channel lengths differ: {0:?}")]
    RaggedChannels(Vec<usize>),
}

/// Build the `(8, points)` curve of a raw cycle.
pub fn cycle_curve(cycle: &RawCycle, points: usize) -> Result<Array2<f64>, CurveError> {
    let lengths = vec![
        cycle.charge_capacity.len(),
        cycle.voltage.len(),
        cycle.current.len(),
        cycle.temperature.len(),
        cycle.discharge_capacity.len(),
    ];
    if lengths.iter().any(|&len| len != lengths[0]) {
        return Err(CurveError::RaggedChannels(lengths));
    }

    let windows = segment(&cycle.current, &cycle.discharge_capacity)?;

    let charge = resample_window(
        [
            &cycle.charge_capacity,
            &cycle.voltage,
            &cycle.current,
            &cycle.temperature,
        ],
        windows.charge.clone(),
        points,
    )?;
    let discharge = resample_window(
        [
            &cycle.discharge_capacity,
            &cycle.voltage,
            &cycle.current,
            &cycle.temperature,
        ],
        windows.discharge.clone(),
        points,
    )?;

    let mut curve = Array2::zeros((CURVE_CHANNELS, points));
    curve.slice_mut(s![..PART_CHANNELS, ..]).assign(&charge);
    curve.slice_mut(s![PART_CHANNELS.., ..]).assign(&discharge);
    Ok(curve)
}

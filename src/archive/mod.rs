//! # Raw Cycling Archives
//!
//! Readers for the raw battery-cycling measurement archives. An archive is a
//! set of *batches*; each batch holds a number of cells, and every cell has a
//! per-cycle summary plus the raw time series of each cycle.
//!
//! The concrete storage is hidden behind [`ArchiveSource`]:
//!
//! - [`MatArchive`]: MATLAB v7.3 (HDF5) batch files (feature `mat`)
//! - [`InMemoryArchive`]: vector-backed cells, used by the demo and tests
//!
//! ## Batch layout
//!
//! ```text
//! batch/
//! ├── cycle_life[i, 0]   -> scalar
//! ├── summary[i, 0]      -> { QCharge, QDischarge, chargetime, Tavg, Tmin, Tmax }
//! └── cycles[i, 0]       -> { T, I, V, Qc, Qd }[j, 0] -> samples of cycle j
//! ```

mod batch;
mod error;
mod memory;
pub mod synthetic;

#[cfg(feature = "mat")]
mod mat;

pub use batch::BatchSpec;
pub use error::ArchiveError;
pub use memory::{InMemoryArchive, RawCell};

#[cfg(feature = "mat")]
pub use mat::MatArchive;

/// Number of channels in a cell summary.
pub const SUMMARY_CHANNELS: usize = 6;

/// Per-cycle summary series of one cell.
///
/// Every series has one value per recorded cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummarySeries {
    /// Charge capacity per cycle (Ah)
    pub charge_capacity: Vec<f64>,
    /// Discharge capacity per cycle (Ah)
    pub discharge_capacity: Vec<f64>,
    /// Minimum cell temperature per cycle (°C)
    pub temperature_min: Vec<f64>,
    /// Maximum cell temperature per cycle (°C)
    pub temperature_max: Vec<f64>,
    /// Average cell temperature per cycle (°C)
    pub temperature_avg: Vec<f64>,
    /// Charge time per cycle (minutes)
    pub charge_time: Vec<f64>,
}

impl SummarySeries {
    /// Number of recorded cycles, or an error if the series disagree in length.
    pub fn cycle_count(&self) -> Result<usize, ArchiveError> {
        let n = self.charge_capacity.len();
        for (name, series) in self.channels_named() {
            if series.len() != n {
                return Err(ArchiveError::InconsistentSummary {
                    field: name,
                    expected: n,
                    actual: series.len(),
                });
            }
        }
        Ok(n)
    }

    /// Channels in storage order: QCharge, QDischarge, Tmin, Tmax, Tavg, chargetime.
    pub fn channels(&self) -> [&[f64]; SUMMARY_CHANNELS] {
        [
            &self.charge_capacity,
            &self.discharge_capacity,
            &self.temperature_min,
            &self.temperature_max,
            &self.temperature_avg,
            &self.charge_time,
        ]
    }

    fn channels_named(&self) -> [(&'static str, &[f64]); SUMMARY_CHANNELS] {
        let [qc, qd, tmin, tmax, tavg, ct] = self.channels();
        [
            ("QCharge", qc),
            ("QDischarge", qd),
            ("Tmin", tmin),
            ("Tmax", tmax),
            ("Tavg", tavg),
            ("chargetime", ct),
        ]
    }

    /// Stack the summary into a `(6, n_cycles)` array.
    pub fn to_array(&self) -> Result<ndarray::Array2<f64>, ArchiveError> {
        let n = self.cycle_count()?;
        let mut out = ndarray::Array2::zeros((SUMMARY_CHANNELS, n));
        for (row, series) in self.channels().iter().enumerate() {
            out.row_mut(row)
                .assign(&ndarray::ArrayView1::from(*series));
        }
        Ok(out)
    }
}

/// Raw time series of a single cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCycle {
    /// Cell temperature (°C)
    pub temperature: Vec<f64>,
    /// Current (C-rate, positive while charging)
    pub current: Vec<f64>,
    /// Voltage (V)
    pub voltage: Vec<f64>,
    /// Cumulative charge capacity (Ah)
    pub charge_capacity: Vec<f64>,
    /// Cumulative discharge capacity (Ah)
    pub discharge_capacity: Vec<f64>,
}

impl RawCycle {
    /// Number of samples, or an error if the channels disagree in length.
    pub fn sample_count(&self) -> Result<usize, ArchiveError> {
        let n = self.current.len();
        let fields: [(&'static str, usize); 4] = [
            ("T", self.temperature.len()),
            ("V", self.voltage.len()),
            ("Qc", self.charge_capacity.len()),
            ("Qd", self.discharge_capacity.len()),
        ];
        for (field, len) in fields {
            if len != n {
                return Err(ArchiveError::InconsistentCycle {
                    field,
                    expected: n,
                    actual: len,
                });
            }
        }
        Ok(n)
    }
}

/// Random-access view over the cells of one batch.
///
/// Cycle data is fetched lazily, one cycle at a time, since a batch file
/// holds several gigabytes of raw samples.
pub trait ArchiveSource {
    /// Number of cells in the batch.
    fn cell_count(&self) -> Result<usize, ArchiveError>;

    /// Cycle life recorded by the cycler, if any.
    fn cycle_life(&self, cell: usize) -> Result<Option<f64>, ArchiveError>;

    /// Per-cycle summary of a cell.
    fn summary(&self, cell: usize) -> Result<SummarySeries, ArchiveError>;

    /// Number of cycles with raw time series.
    fn cycle_count(&self, cell: usize) -> Result<usize, ArchiveError>;

    /// Raw time series of cycle `cycle` of cell `cell`.
    fn cycle(&self, cell: usize, cycle: usize) -> Result<RawCycle, ArchiveError>;
}

//! Deterministic synthetic cells.
//!
//! Generates cells shaped like the fast-charging LFP data set: a constant
//! current charge bounded by zero-current rests, followed by a discharge whose
//! capacity curve accelerates until the cut-off. Capacity fades with cycle
//! number so that the end of life spreads across all EoL buckets.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{InMemoryArchive, RawCell, RawCycle, SummarySeries};

/// Samples in the constant-current charge step
const CHARGE_SAMPLES: usize = 120;
/// Samples in the discharge step
const DISCHARGE_SAMPLES: usize = 100;
/// Zero-current samples between steps
const REST_SAMPLES: usize = 10;

/// Parameters of the synthetic archive.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Number of cells
    pub cells: usize,
    /// Number of cycles with raw time series per cell
    pub cycles: usize,
    /// Inclusive range of end-of-life cycle counts
    pub eol_range: (usize, usize),
    /// Nominal capacity (Ah)
    pub nominal_capacity: f64,
    /// RNG seed
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            cells: 12,
            cycles: 101,
            eol_range: (300, 2000),
            nominal_capacity: 1.1,
            seed: 7,
        }
    }
}

/// Generate an in-memory archive.
pub fn generate(config: &SyntheticConfig) -> InMemoryArchive {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let (lo, hi) = config.eol_range;
    let cells = (0..config.cells)
        .map(|_| {
            let eol = rng.gen_range(lo.min(hi)..=hi.max(lo));
            generate_cell(&mut rng, eol, config.cycles, config.nominal_capacity)
        })
        .collect();
    InMemoryArchive::new(cells)
}

fn generate_cell(rng: &mut StdRng, eol: usize, cycles: usize, nominal: f64) -> RawCell {
    let base_temp = rng.gen_range(29.0..33.0);
    let charge_time = rng.gen_range(9.0..14.0);

    let mut summary = SummarySeries::default();
    for k in 0..eol {
        let qd = faded_capacity(nominal, k, eol);
        summary.charge_capacity.push(qd + 0.002);
        summary.discharge_capacity.push(qd);
        summary.temperature_min.push(base_temp - 1.0 + rng.gen_range(-0.1..0.1));
        summary.temperature_max.push(base_temp + 6.0 + rng.gen_range(-0.3..0.3));
        summary.temperature_avg.push(base_temp + 2.0 + rng.gen_range(-0.2..0.2));
        summary.charge_time.push(charge_time + rng.gen_range(-0.05..0.05));
    }

    let cycles = (0..cycles)
        .map(|k| generate_cycle(rng, faded_capacity(nominal, k, eol), base_temp))
        .collect();

    RawCell {
        cycle_life: Some(eol as f64),
        summary,
        cycles,
    }
}

/// Capacity after `k` of `eol` cycles, reaching 80% of nominal at end of life.
fn faded_capacity(nominal: f64, k: usize, eol: usize) -> f64 {
    let progress = k as f64 / eol.max(1) as f64;
    nominal * (0.98 - 0.18 * progress * progress)
}

fn generate_cycle(rng: &mut StdRng, capacity: f64, base_temp: f64) -> RawCycle {
    let mut cycle = RawCycle::default();
    let push = |c: &mut RawCycle, i: f64, v: f64, qc: f64, qd: f64, t: f64| {
        c.current.push(i);
        c.voltage.push(v);
        c.charge_capacity.push(qc);
        c.discharge_capacity.push(qd);
        c.temperature.push(t);
    };

    // Opening rest sample
    push(&mut cycle, 0.0, 2.0, 0.0, 0.0, base_temp);

    let charge_rate = rng.gen_range(3.6..6.0);
    let charged = capacity + 0.002;
    for s in 1..=CHARGE_SAMPLES {
        let frac = s as f64 / CHARGE_SAMPLES as f64;
        let v = 2.0 + 1.6 * frac.sqrt();
        let t = base_temp + 5.0 * frac + rng.gen_range(-0.05..0.05);
        push(&mut cycle, charge_rate, v, charged * frac, 0.0, t);
    }

    // Rest between charge and discharge
    for _ in 0..REST_SAMPLES {
        push(&mut cycle, 0.0, 3.4, charged, 0.0, base_temp + 4.0);
    }

    // Accelerating discharge: Qd = a * m^2 keeps the second difference positive
    let a = capacity / (DISCHARGE_SAMPLES * DISCHARGE_SAMPLES) as f64;
    for m in 0..=DISCHARGE_SAMPLES {
        let frac = m as f64 / DISCHARGE_SAMPLES as f64;
        let qd = a * (m * m) as f64;
        let v = 3.3 - 1.3 * frac.powi(3);
        let t = base_temp + 4.0 + 3.0 * frac + rng.gen_range(-0.05..0.05);
        let i = if m == 0 { 0.0 } else { -4.0 };
        push(&mut cycle, i, v, charged, qd, t);
    }

    for _ in 0..REST_SAMPLES {
        push(&mut cycle, 0.0, 2.2, charged, capacity, base_temp + 2.0);
    }

    cycle
}

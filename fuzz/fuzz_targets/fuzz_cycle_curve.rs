#![no_main]

use libfuzzer_sys::fuzz_target;

use cyclife::archive::RawCycle;
use cyclife::curve::cycle_curve;

fuzz_target!(|data: &[u8]| {
    // First byte picks the resampled length, the rest are (I, Qd) sample pairs
    let Some((&points, rest)) = data.split_first() else {
        return;
    };
    let samples: Vec<(f64, f64)> = rest
        .chunks_exact(16)
        .map(|c| {
            let mut i = [0u8; 8];
            let mut q = [0u8; 8];
            i.copy_from_slice(&c[..8]);
            q.copy_from_slice(&c[8..]);
            (f64::from_le_bytes(i), f64::from_le_bytes(q))
        })
        .collect();

    let current: Vec<f64> = samples.iter().map(|s| s.0).collect();
    let discharge_capacity: Vec<f64> = samples.iter().map(|s| s.1).collect();
    let n = samples.len();
    let cycle = RawCycle {
        temperature: vec![30.0; n],
        current,
        voltage: (0..n).map(|k| 3.0 + k as f64 * 1e-3).collect(),
        charge_capacity: (0..n).map(|k| k as f64 * 1e-2).collect(),
        discharge_capacity,
    };

    // Segmentation may reject the cycle, but must never panic
    if let Ok(curve) = cycle_curve(&cycle, points as usize) {
        assert_eq!(curve.shape(), &[8, points as usize]);
    }
});

use std::ops::Range;

use super::CurveError;

/// Minimum rise of discharge capacity between consecutive samples that marks
/// the start of discharge (Ah).
pub const DISCHARGE_START_THRESHOLD: f64 = 1e-3;

/// Minimum second difference of discharge capacity that still counts as
/// active discharge (Ah).
pub const DISCHARGE_END_THRESHOLD: f64 = 1e-4;

/// Sample ranges of the charge and discharge steps of a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleWindows {
    /// From the first sample up to (excluding) the second zero-current sample
    pub charge: Range<usize>,
    /// From the first rise of discharge capacity up to the end of its acceleration
    pub discharge: Range<usize>,
}

/// Locate the charge and discharge windows of a cycle.
///
/// The charge step ends where the current returns to exactly zero for the
/// second time. Discharge starts at the first sample after which discharge
/// capacity rises by at least [`DISCHARGE_START_THRESHOLD`], and ends one past
/// the last sample whose second difference exceeds [`DISCHARGE_END_THRESHOLD`].
pub fn segment(current: &[f64], discharge_capacity: &[f64]) -> Result<CycleWindows, CurveError> {
    let mut zeros = current
        .iter()
        .enumerate()
        .filter(|(_, &c)| c == 0.0)
        .map(|(i, _)| i);
    let charge_end = match (zeros.next(), zeros.next()) {
        (Some(_), Some(second)) => second,
        (first, _) => {
            return Err(CurveError::NoChargeEnd {
                zeros: usize::from(first.is_some()),
            })
        }
    };

    let discharge_start = discharge_capacity
        .windows(2)
        .position(|w| w[1] - w[0] >= DISCHARGE_START_THRESHOLD)
        .ok_or(CurveError::NoDischargeStart)?;

    let discharge_end = discharge_capacity
        .windows(3)
        .rposition(|w| (w[2] - w[1]) - (w[1] - w[0]) > DISCHARGE_END_THRESHOLD)
        .map(|k| k + 1)
        .ok_or(CurveError::NoDischargeEnd)?;

    if discharge_end <= discharge_start {
        return Err(CurveError::EmptyDischarge {
            start: discharge_start,
            end: discharge_end,
        });
    }

    Ok(CycleWindows {
        charge: 0..charge_end,
        discharge: discharge_start..discharge_end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_ends_at_second_zero() {
        let current = [0.0, 2.0, 2.0, 0.0, 0.0, -1.0];
        let qd = [0.0, 0.0, 0.0, 0.0, 0.01, 0.03, 0.06];
        let windows = segment(&current, &qd).unwrap();
        assert_eq!(windows.charge, 0..3);
    }

    #[test]
    fn test_charge_end_when_first_sample_nonzero() {
        let current = [1.0, 1.0, 0.0, 1.0, 0.0];
        let qd = [0.0, 0.01, 0.03, 0.06, 0.06];
        let windows = segment(&current, &qd).unwrap();
        assert_eq!(windows.charge, 0..4);
    }

    #[test]
    fn test_missing_charge_end() {
        let qd = [0.0, 0.01, 0.03, 0.06];
        assert_eq!(
            segment(&[1.0, 0.0, 1.0, 1.0], &qd),
            Err(CurveError::NoChargeEnd { zeros: 1 })
        );
        assert_eq!(
            segment(&[1.0, 1.0, 1.0, 1.0], &qd),
            Err(CurveError::NoChargeEnd { zeros: 0 })
        );
    }

    #[test]
    fn test_discharge_window() {
        let current = [0.0, 0.0, -1.0, -1.0, -1.0, -1.0, 0.0];
        // diffs: 0, 0.0005, 0.002, 0.004, 0.006, 0
        // second diffs: 0.0005, 0.0015, 0.002, 0.002, -0.006
        let qd = [0.0, 0.0, 0.0005, 0.0025, 0.0065, 0.0125, 0.0125];
        let windows = segment(&current, &qd).unwrap();
        assert_eq!(windows.discharge, 2..4);
    }

    #[test]
    fn test_no_discharge_start() {
        let current = [0.0, 0.0, 0.0];
        let qd = [0.0, 0.0005, 0.0009];
        assert_eq!(segment(&current, &qd), Err(CurveError::NoDischargeStart));
    }

    #[test]
    fn test_no_discharge_end() {
        // Linear discharge: no positive acceleration after the kink
        let current = [0.0, 0.0, -1.0, -1.0];
        let qd = [0.01, 0.02, 0.03, 0.04];
        assert_eq!(segment(&current, &qd), Err(CurveError::NoDischargeEnd));
    }

    #[test]
    fn test_empty_discharge_window() {
        // Acceleration only before the first threshold rise
        let current = [0.0, 0.0, -1.0, -1.0, -1.0];
        let qd = [0.0, 0.0, 0.0002, 0.0102, 0.0202];
        let err = segment(&current, &qd).unwrap_err();
        assert!(matches!(err, CurveError::EmptyDischarge { .. }));
    }
}

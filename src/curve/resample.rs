use std::ops::Range;

use ndarray::Array2;

use super::{CurveError, PART_CHANNELS};

/// Linearly interpolate `seq` onto `points` evenly spaced positions.
///
/// Positions run from the first to the last sample inclusive, so both
/// endpoints are preserved. A single-sample series resamples to a constant.
pub fn resample(seq: &[f64], points: usize) -> Result<Vec<f64>, CurveError> {
    if seq.is_empty() {
        return Err(CurveError::EmptySeries);
    }
    if points == 0 {
        return Err(CurveError::ZeroPoints);
    }

    let last = seq.len() - 1;
    if points == 1 || last == 0 {
        return Ok(vec![seq[0]; points]);
    }

    let span = last as f64;
    let step = span / (points - 1) as f64;
    let out = (0..points)
        .map(|i| {
            if i == points - 1 {
                return seq[last];
            }
            let x = i as f64 * step;
            let lo = (x.floor() as usize).min(last);
            if lo == last {
                return seq[last];
            }
            let frac = x - lo as f64;
            seq[lo] + (seq[lo + 1] - seq[lo]) * frac
        })
        .collect();
    Ok(out)
}

/// Resample the same window of several channels into a `(channels, points)` array.
pub fn resample_window(
    channels: [&[f64]; PART_CHANNELS],
    window: Range<usize>,
    points: usize,
) -> Result<Array2<f64>, CurveError> {
    let mut out = Array2::zeros((PART_CHANNELS, points));
    for (row, channel) in channels.iter().enumerate() {
        let end = window.end.min(channel.len());
        let start = window.start.min(end);
        let values = resample(&channel[start..end], points)?;
        out.row_mut(row).assign(&ndarray::ArrayView1::from(&values));
    }
    Ok(out)
}

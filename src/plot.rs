//! # Diagnostic Plot
//!
//! Draws the discharge capacity of every extracted cell against cycle number,
//! colored by end of life on a coolwarm scale: short-lived cells in red,
//! long-lived cells in blue.

use std::fmt;
use std::path::Path;

use log::info;
use palette::{FromColor, Lab, Mix, Srgb};
use plotters::prelude::*;

use crate::dataset::{CellStore, DatasetError, DISCHARGE_CAPACITY_ROW};

/// Errors that can occur while drawing the plot
#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    /// Error reading the cell store
    #[error("Dataset error: {0}")]
    DatasetError(#[from] DatasetError),

    /// Error from the drawing backend
    #[error("Render error: {0}")]
    Render(String),
}

fn render_err(e: impl fmt::Display) -> PlotError {
    PlotError::Render(e.to_string())
}

/// End-of-life statistics of the plotted cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeStats {
    /// Number of cells
    pub cells: usize,
    /// Shortest end of life
    pub min_eol: usize,
    /// Longest end of life
    pub max_eol: usize,
}

impl fmt::Display for FadeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n cells: {}, EoL range: {}..={}",
            self.cells, self.min_eol, self.max_eol
        )
    }
}

const BLUE: (u8, u8, u8) = (59, 76, 192);
const NEUTRAL: (u8, u8, u8) = (221, 221, 221);
const RED: (u8, u8, u8) = (180, 4, 38);

fn to_lab((r, g, b): (u8, u8, u8)) -> Lab {
    Lab::from_color(Srgb::new(r, g, b).into_format::<f32>())
}

/// Diverging blue-white-red colormap; `t` is clamped to `[0, 1]`.
pub fn coolwarm(t: f64) -> (u8, u8, u8) {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
    let (from, to, local) = if t < 0.5 {
        (BLUE, NEUTRAL, t * 2.0)
    } else {
        (NEUTRAL, RED, (t - 0.5) * 2.0)
    };
    let mixed = to_lab(from).mix(to_lab(to), local as f32);
    let rgb: Srgb<u8> = Srgb::from_color(mixed).into_format();
    (rgb.red, rgb.green, rgb.blue)
}

/// Plot discharge capacity fade of all cells in `store` to an SVG file.
pub fn plot_capacity_fade(store: &CellStore, output: &Path) -> Result<FadeStats, PlotError> {
    let keys = store.keys()?;
    if keys.is_empty() {
        return Err(DatasetError::Empty(store.dir().to_path_buf()).into());
    }

    let mut curves = Vec::with_capacity(keys.len());
    for key in &keys {
        let summary = store.load_summary(key)?;
        let eol = summary.ncols();
        let capacity: Vec<(f64, f64)> = summary
            .row(DISCHARGE_CAPACITY_ROW)
            .iter()
            .skip(1)
            .enumerate()
            .map(|(x, &y)| (x as f64, y))
            .filter(|(_, y)| y.is_finite())
            .collect();
        curves.push((eol, capacity));
    }

    let min_eol = curves.iter().map(|(eol, _)| *eol).min().unwrap_or(0);
    let max_eol = curves.iter().map(|(eol, _)| *eol).max().unwrap_or(0);
    let x_max = max_eol.max(2) as f64;
    let (y_min, y_max) = curves
        .iter()
        .flat_map(|(_, points)| points.iter().map(|(_, y)| *y))
        .fold(None, |acc: Option<(f64, f64)>, y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        })
        .unwrap_or((0.0, 1.0));
    let pad = ((y_max - y_min) * 0.05).max(1e-3);

    let root = SVGBackend::new(output, (1024, 768)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Discharge capacity fade", ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, (y_min - pad)..(y_max + pad))
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .x_desc("Cycle")
        .y_desc("Discharge capacity (Ah)")
        .draw()
        .map_err(render_err)?;

    let span = (max_eol - min_eol) as f64;
    for (eol, points) in curves {
        let normalized = if span > 0.0 {
            (eol - min_eol) as f64 / span
        } else {
            0.5
        };
        let (r, g, b) = coolwarm(1.0 - normalized);
        let color = RGBAColor(r, g, b, 0.7);
        chart
            .draw_series(LineSeries::new(points, &color))
            .map_err(render_err)?;
    }
    root.present().map_err(render_err)?;

    let stats = FadeStats {
        cells: keys.len(),
        min_eol,
        max_eol,
    };
    info!("Plotted {} to {}", stats, output.display());
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};
    use tempfile::tempdir;

    #[test]
    fn test_coolwarm_endpoints() {
        let blue = coolwarm(0.0);
        let red = coolwarm(1.0);
        assert!(blue.2 > blue.0);
        assert!(red.0 > red.2);
        let mid = coolwarm(0.5);
        assert!(mid.0 > 200 && mid.1 > 200 && mid.2 > 200);
        assert_eq!(coolwarm(-3.0), coolwarm(0.0));
        assert_eq!(coolwarm(f64::NAN), coolwarm(0.5));
    }

    #[test]
    fn test_plot_capacity_fade() {
        let dir = tempdir().unwrap();
        let store = CellStore::create(dir.path().join("cells")).unwrap();
        for (i, eol) in [326usize, 900, 1934].into_iter().enumerate() {
            let summary = Array2::from_shape_fn((6, eol), |(_, k)| 1.1 - k as f64 * 1e-4);
            store
                .write_cell(
                    &crate::dataset::CellKey::new("b1c", i),
                    &summary,
                    &Array3::zeros((1, 8, 2)),
                )
                .unwrap();
        }

        let output = dir.path().join("fade.svg");
        let stats = plot_capacity_fade(&store, &output).unwrap();
        assert_eq!(
            stats,
            FadeStats {
                cells: 3,
                min_eol: 326,
                max_eol: 1934
            }
        );
        let svg = std::fs::read_to_string(&output).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_plot_empty_store() {
        let dir = tempdir().unwrap();
        let store = CellStore::create(dir.path()).unwrap();
        let err = plot_capacity_fade(&store, &dir.path().join("x.svg")).unwrap_err();
        assert!(matches!(err, PlotError::DatasetError(DatasetError::Empty(_))));
    }
}

use std::path::Path;

use crate::archive::SUMMARY_CHANNELS;
use crate::curve::CURVE_CHANNELS;
use crate::dataset::CellStore;
use crate::split::EolBucket;

use super::{ValidationCheck, ValidationReport};

/// Per-cell checks of a cell directory.
pub(crate) fn check_cells(path: &Path, report: &mut ValidationReport) {
    let store = match CellStore::open(path) {
        Ok(store) => store,
        Err(e) => {
            report.add_check(ValidationCheck::failed("Open cell directory", e.to_string()));
            return;
        }
    };

    let keys = match store.keys() {
        Ok(keys) if keys.is_empty() => {
            report.add_check(ValidationCheck::failed("Cells present", "no cell files found"));
            return;
        }
        Ok(keys) => keys,
        Err(e) => {
            report.add_check(ValidationCheck::failed("Cell files paired", e.to_string()));
            return;
        }
    };
    report.add_check(ValidationCheck::ok(format!(
        "Cell files paired ({} cells)",
        keys.len()
    )));

    let mut shapes = Vec::new();
    let mut buckets = [0usize; 3];
    let mut unreadable = Vec::new();
    let mut non_finite = Vec::new();
    let mut short = Vec::new();

    for key in &keys {
        let cell = match store.load_cell(key) {
            Ok(cell) => cell,
            Err(e) => {
                unreadable.push(format!("{key}: {e}"));
                continue;
            }
        };
        let cycles = cell.cycles.shape()[0];
        shapes.push((key.to_string(), cycles, cell.cycles.shape()[2]));
        buckets[EolBucket::of(cell.eol()) as usize] += 1;

        if cell.summary.iter().chain(cell.cycles.iter()).any(|v| !v.is_finite()) {
            non_finite.push(key.to_string());
        }
        if cell.eol() < cycles {
            short.push(format!("{key} (EoL {})", cell.eol()));
        }
    }

    if unreadable.is_empty() {
        report.add_check(ValidationCheck::ok(format!(
            "Array shapes (summary {SUMMARY_CHANNELS} rows, curves {CURVE_CHANNELS} channels)"
        )));
    } else {
        report.add_check(ValidationCheck::failed(
            "Array shapes",
            unreadable.join("; "),
        ));
    }

    if let Some((_, cycles, points)) = shapes.first().cloned() {
        let odd: Vec<String> = shapes
            .iter()
            .filter(|(_, c, p)| *c != cycles || *p != points)
            .map(|(key, c, p)| format!("{key} ({c}, {CURVE_CHANNELS}, {p})"))
            .collect();
        if odd.is_empty() {
            report.add_check(ValidationCheck::ok(format!(
                "Consistent curve shape ({cycles}, {CURVE_CHANNELS}, {points})"
            )));
        } else {
            report.add_check(ValidationCheck::failed(
                "Consistent curve shape",
                format!(
                    "expected ({cycles}, {CURVE_CHANNELS}, {points}), found {}",
                    odd.join(", ")
                ),
            ));
        }
    }

    if non_finite.is_empty() {
        report.add_check(ValidationCheck::ok("Finite values"));
    } else {
        report.add_check(ValidationCheck::warning(
            "Finite values",
            format!("NaN or infinite values in {}", non_finite.join(", ")),
        ));
    }

    if short.is_empty() {
        report.add_check(ValidationCheck::ok("Summary covers curve window"));
    } else {
        report.add_check(ValidationCheck::warning(
            "Summary covers curve window",
            format!("fewer summary cycles than curves: {}", short.join(", ")),
        ));
    }

    let [s, m, l] = buckets;
    report.add_check(ValidationCheck::ok(format!(
        "EoL buckets: short {s}, medium {m}, long {l}"
    )));
}

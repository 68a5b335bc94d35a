use std::path::Path;

use ndarray::{s, Array2, Array3, Axis};
use ndarray_npy::read_npy;

use crate::archive::SUMMARY_CHANNELS;
use crate::curve::CURVE_CHANNELS;
use crate::features::AugmentVariant;
use crate::split::{Partition, SplitManifest, MANIFEST_FILE};

use super::{ValidationCheck, ValidationReport};

/// Arrays of one partition that passed the shape checks.
struct PartitionShape {
    cells: usize,
    window: usize,
    points: usize,
    summary: Array3<f64>,
}

/// Checks of a split/augment directory.
pub(crate) fn check_split(path: &Path, report: &mut ValidationReport) {
    let mut shapes = Vec::new();
    for partition in Partition::ALL {
        if let Some(shape) = check_partition(path, partition, report) {
            shapes.push((partition, shape));
        }
    }

    if let [(_, trn), (_, val)] = shapes.as_slice() {
        if trn.points == val.points && (trn.window == val.window || trn.cells == 0 || val.cells == 0)
        {
            report.add_check(ValidationCheck::ok("Partitions agree on window and points"));
        } else {
            report.add_check(ValidationCheck::failed(
                "Partitions agree on window and points",
                format!(
                    "trn (w={}, points={}) vs val (w={}, points={})",
                    trn.window, trn.points, val.window, val.points
                ),
            ));
        }
    }

    check_manifest(path, &shapes, report);

    for variant in [AugmentVariant::Discharge, AugmentVariant::Full] {
        for (partition, shape) in &shapes {
            check_augmented(path, variant, *partition, shape, report);
        }
    }
}

fn check_partition(
    path: &Path,
    partition: Partition,
    report: &mut ValidationReport,
) -> Option<PartitionShape> {
    let prefix = partition.prefix();
    let read = |kind: &str| path.join(partition.file_name(kind));

    let features: Array3<f64> = match read_npy(read("features")) {
        Ok(a) => a,
        Err(e) => {
            report.add_check(ValidationCheck::failed(
                format!("{prefix} features readable"),
                e.to_string(),
            ));
            return None;
        }
    };
    let targets: Array2<f64> = match read_npy(read("targets")) {
        Ok(a) => a,
        Err(e) => {
            report.add_check(ValidationCheck::failed(
                format!("{prefix} targets readable"),
                e.to_string(),
            ));
            return None;
        }
    };
    let summary: Array3<f64> = match read_npy(read("summary")) {
        Ok(a) => a,
        Err(e) => {
            report.add_check(ValidationCheck::failed(
                format!("{prefix} summary readable"),
                e.to_string(),
            ));
            return None;
        }
    };

    let (cells, window) = (summary.shape()[0], summary.shape()[2]);
    let rows = features.shape()[0];
    let points = features.shape()[2];
    let name = format!("{prefix} shapes");

    let mut problems = Vec::new();
    if features.shape()[1] != CURVE_CHANNELS {
        problems.push(format!(
            "features {:?}, expected (N, {CURVE_CHANNELS}, points)",
            features.shape()
        ));
    }
    if summary.shape()[1] != SUMMARY_CHANNELS {
        problems.push(format!(
            "summary {:?}, expected (n, {SUMMARY_CHANNELS}, w)",
            summary.shape()
        ));
    }
    if rows != cells * window {
        problems.push(format!("{rows} feature rows for {cells} cells x {window} cycles"));
    }
    if targets.shape() != [rows, 2] {
        problems.push(format!("targets {:?}, expected ({rows}, 2)", targets.shape()));
    }
    if !problems.is_empty() {
        report.add_check(ValidationCheck::failed(name, problems.join("; ")));
        return None;
    }
    report.add_check(ValidationCheck::ok(format!(
        "{name}: {cells} cells, {window} cycles, {points} points"
    )));

    let ragged: Vec<usize> = (0..cells)
        .filter(|_| window > 0)
        .filter(|&i| {
            let block = targets.slice(s![i * window..(i + 1) * window, ..]);
            let first = block.row(0);
            block
                .axis_iter(Axis(0))
                .any(|row| !same_values(row.iter(), first.iter()))
        })
        .collect();
    if ragged.is_empty() {
        report.add_check(ValidationCheck::ok(format!("{prefix} targets constant per cell")));
    } else {
        report.add_check(ValidationCheck::failed(
            format!("{prefix} targets constant per cell"),
            format!("cells at positions {ragged:?} have varying targets"),
        ));
    }

    if features.iter().chain(summary.iter()).any(|v| !v.is_finite()) {
        report.add_check(ValidationCheck::warning(
            format!("{prefix} finite values"),
            "NaN or infinite values present",
        ));
    }

    Some(PartitionShape {
        cells,
        window,
        points,
        summary,
    })
}

fn check_manifest(
    path: &Path,
    shapes: &[(Partition, PartitionShape)],
    report: &mut ValidationReport,
) {
    let manifest_path = path.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        report.add_check(ValidationCheck::warning(
            "Split manifest",
            format!("{MANIFEST_FILE} not found"),
        ));
        return;
    }
    let manifest = match SplitManifest::read(&manifest_path) {
        Ok(m) => m,
        Err(e) => {
            report.add_check(ValidationCheck::failed("Split manifest", e.to_string()));
            return;
        }
    };

    let mut problems = Vec::new();
    for (partition, shape) in shapes {
        let listed = match partition {
            Partition::Train => manifest.train.len(),
            Partition::Validation => manifest.validation.len(),
        };
        if listed != shape.cells {
            problems.push(format!(
                "{} lists {listed} cells, arrays hold {}",
                partition.prefix(),
                shape.cells
            ));
        }
        if shape.cells > 0 && (shape.window != manifest.window || shape.points != manifest.points) {
            problems.push(format!(
                "{} arrays are (w={}, points={}), manifest says (w={}, points={})",
                partition.prefix(),
                shape.window,
                shape.points,
                manifest.window,
                manifest.points
            ));
        }
    }
    if problems.is_empty() {
        report.add_check(ValidationCheck::ok("Split manifest matches arrays"));
    } else {
        report.add_check(ValidationCheck::failed(
            "Split manifest matches arrays",
            problems.join("; "),
        ));
    }
}

fn check_augmented(
    path: &Path,
    variant: AugmentVariant,
    partition: Partition,
    shape: &PartitionShape,
    report: &mut ValidationReport,
) {
    let file = variant.output_file(partition);
    let output_path = path.join(&file);
    if !output_path.exists() {
        return;
    }
    let output: Array3<f64> = match read_npy(&output_path) {
        Ok(a) => a,
        Err(e) => {
            report.add_check(ValidationCheck::failed(file, e.to_string()));
            return;
        }
    };

    let expected = [shape.cells, variant.channels(), shape.window];
    if output.shape() != expected {
        report.add_check(ValidationCheck::failed(
            file,
            format!("shape {:?}, expected {:?}", output.shape(), expected),
        ));
        return;
    }
    let carried = output.slice(s![.., ..SUMMARY_CHANNELS, ..]);
    if !same_values(carried.iter(), shape.summary.iter()) {
        report.add_check(ValidationCheck::failed(
            file,
            "summary channels differ from the partition summary",
        ));
        return;
    }
    report.add_check(ValidationCheck::ok(format!("{file} {expected:?}")));
}

/// Element-wise equality where NaN matches NaN; non-finite values are
/// reported by the finite-values warning instead.
fn same_values<'a>(
    a: impl Iterator<Item = &'a f64>,
    b: impl Iterator<Item = &'a f64>,
) -> bool {
    a.zip(b).all(|(x, y)| x == y || (x.is_nan() && y.is_nan()))
}

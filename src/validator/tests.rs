use super::*;
use crate::dataset::{CellKey, CellStore};
use crate::split::{plan_split, write_split, CellInfo, SplitConfig};
use ndarray::{Array2, Array3};
use ndarray_npy::write_npy;
use std::fs;
use tempfile::tempdir;

fn fill_store(store: &CellStore, eols: &[usize], cycles: usize, points: usize) {
    for (i, &eol) in eols.iter().enumerate() {
        let summary = Array2::from_shape_fn((6, eol), |(row, col)| row as f64 + col as f64 * 1e-3);
        let curves = Array3::from_elem((cycles, 8, points), i as f64);
        store
            .write_cell(&CellKey::new("b1c", i), &summary, &curves)
            .unwrap();
    }
}

fn failed_names(report: &ValidationReport) -> Vec<String> {
    report
        .checks
        .iter()
        .filter(|c| matches!(c.status, CheckStatus::Failed(_)))
        .map(|c| c.name.clone())
        .collect()
}

fn split_dir(root: &std::path::Path) -> std::path::PathBuf {
    let store = CellStore::create(root.join("cells")).unwrap();
    fill_store(&store, &[400, 500, 700, 900, 1500], 4, 5);
    let records = store.load_all().unwrap();
    let infos: Vec<CellInfo> = records.iter().map(CellInfo::from).collect();
    let config = SplitConfig::default();
    let plan = plan_split(&infos, &config).unwrap();
    let out = root.join("split");
    write_split(&records, &plan, &config, &out, 3).unwrap();
    out
}

// ==================== Cell Directory ====================

#[test]
fn test_valid_cell_store() {
    let dir = tempdir().unwrap();
    let store = CellStore::create(dir.path()).unwrap();
    fill_store(&store, &[300, 800, 1300], 4, 5);

    let report = validate_cell_store(dir.path()).unwrap();
    assert_eq!(report.kind, ReportKind::CellStore);
    assert!(!report.has_failures(), "{report}");
    assert!(!report.has_warnings(), "{report}");
    assert!(report
        .checks
        .iter()
        .any(|c| c.name == "EoL buckets: short 1, medium 1, long 1"));
}

#[test]
fn test_inconsistent_curve_shapes() {
    let dir = tempdir().unwrap();
    let store = CellStore::create(dir.path()).unwrap();
    fill_store(&store, &[300, 800], 4, 5);
    store
        .write_cell(
            &CellKey::new("b2c", 0),
            &Array2::zeros((6, 300)),
            &Array3::zeros((4, 8, 7)),
        )
        .unwrap();

    let report = validate_cell_store(dir.path()).unwrap();
    assert_eq!(failed_names(&report), vec!["Consistent curve shape"]);
}

#[test]
fn test_unpaired_cell_file() {
    let dir = tempdir().unwrap();
    let store = CellStore::create(dir.path()).unwrap();
    fill_store(&store, &[300], 4, 5);
    fs::remove_file(store.summary_path(&CellKey::new("b1c", 0))).unwrap();

    let report = validate_cell_store(dir.path()).unwrap();
    assert_eq!(failed_names(&report), vec!["Cell files paired"]);
}

#[test]
fn test_short_summary_and_nan_are_warnings() {
    let dir = tempdir().unwrap();
    let store = CellStore::create(dir.path()).unwrap();
    let mut summary = Array2::zeros((6, 3));
    summary[[2, 1]] = f64::NAN;
    store
        .write_cell(&CellKey::new("b1c", 0), &summary, &Array3::zeros((4, 8, 5)))
        .unwrap();

    let report = validate_cell_store(dir.path()).unwrap();
    assert!(!report.has_failures(), "{report}");
    assert_eq!(report.warning_count(), 2);
}

#[test]
fn test_missing_directory() {
    let dir = tempdir().unwrap();
    let result = validate_cell_store(&dir.path().join("nope"));
    assert!(matches!(result, Err(ValidationError::StructureError(_))));
}

#[test]
fn test_empty_cell_store() {
    let dir = tempdir().unwrap();
    let report = validate_cell_store(dir.path()).unwrap();
    assert_eq!(failed_names(&report), vec!["Cells present"]);
}

// ==================== Split Directory ====================

#[test]
fn test_valid_split_dir() {
    let dir = tempdir().unwrap();
    let out = split_dir(dir.path());

    let report = validate_split_dir(&out).unwrap();
    assert_eq!(report.kind, ReportKind::SplitDir);
    assert!(!report.has_failures(), "{report}");
    assert!(!report.has_warnings(), "{report}");
}

#[test]
fn test_validate_dir_detects_kind() {
    let dir = tempdir().unwrap();
    let out = split_dir(dir.path());
    assert_eq!(validate_dir(&out).unwrap().kind, ReportKind::SplitDir);
    assert_eq!(
        validate_dir(&dir.path().join("cells")).unwrap().kind,
        ReportKind::CellStore
    );
}

#[test]
fn test_missing_manifest_is_warning() {
    let dir = tempdir().unwrap();
    let out = split_dir(dir.path());
    fs::remove_file(out.join(crate::split::MANIFEST_FILE)).unwrap();

    let report = validate_split_dir(&out).unwrap();
    assert!(!report.has_failures(), "{report}");
    assert!(report.has_warnings());
}

#[test]
fn test_targets_not_constant_per_cell() {
    let dir = tempdir().unwrap();
    let out = split_dir(dir.path());
    let path = out.join("trn_targets.npy");
    let mut targets: Array2<f64> = ndarray_npy::read_npy(&path).unwrap();
    targets[[1, 0]] += 1.0;
    write_npy(&path, &targets).unwrap();

    let report = validate_split_dir(&out).unwrap();
    assert_eq!(failed_names(&report), vec!["trn targets constant per cell"]);
}

#[test]
fn test_row_count_mismatch() {
    let dir = tempdir().unwrap();
    let out = split_dir(dir.path());
    write_npy(out.join("val_features.npy"), &Array3::<f64>::zeros((1, 8, 5))).unwrap();

    let report = validate_split_dir(&out).unwrap();
    assert_eq!(failed_names(&report), vec!["val shapes"]);
}

#[test]
fn test_augmented_output_checked() {
    let dir = tempdir().unwrap();
    let out = split_dir(dir.path());
    let summary: Array3<f64> = ndarray_npy::read_npy(out.join("trn_summary.npy")).unwrap();
    let (n, _, w) = summary.dim();

    // Correct layout: summary followed by two feature channels
    let mut good = Array3::zeros((n, 8, w));
    good.slice_mut(ndarray::s![.., ..6, ..]).assign(&summary);
    write_npy(out.join("predictor1_trn_feature.npy"), &good).unwrap();
    // Wrong channel count for the full variant
    write_npy(out.join("predictor3_trn_feature.npy"), &good).unwrap();

    let report = validate_split_dir(&out).unwrap();
    assert_eq!(failed_names(&report), vec!["predictor3_trn_feature.npy"]);
    assert!(report
        .checks
        .iter()
        .any(|c| c.name.starts_with("predictor1_trn_feature.npy") && c.status == CheckStatus::Ok));
}

#[test]
fn test_nan_values_are_warnings_in_split_dir() {
    let dir = tempdir().unwrap();
    let store = CellStore::create(dir.path().join("cells")).unwrap();
    for (i, eol) in [400usize, 700, 900, 1500].into_iter().enumerate() {
        let mut summary = Array2::from_elem((6, eol), 1.0);
        summary[[0, 0]] = f64::NAN;
        summary[[5, eol - 1]] = f64::NAN;
        store
            .write_cell(&CellKey::new("b1c", i), &summary, &Array3::zeros((4, 8, 5)))
            .unwrap();
    }
    let records = store.load_all().unwrap();
    let infos: Vec<CellInfo> = records.iter().map(CellInfo::from).collect();
    let config = SplitConfig::default();
    let plan = plan_split(&infos, &config).unwrap();
    let out = dir.path().join("split");
    write_split(&records, &plan, &config, &out, 3).unwrap();

    for prefix in ["trn", "val"] {
        let summary: Array3<f64> =
            ndarray_npy::read_npy(out.join(format!("{prefix}_summary.npy"))).unwrap();
        let (n, _, w) = summary.dim();
        let mut augmented = Array3::zeros((n, 8, w));
        augmented.slice_mut(ndarray::s![.., ..6, ..]).assign(&summary);
        write_npy(out.join(format!("predictor1_{prefix}_feature.npy")), &augmented).unwrap();
    }

    let report = validate_split_dir(&out).unwrap();
    assert!(!report.has_failures(), "{report}");
    assert!(report
        .checks
        .iter()
        .any(|c| c.name == "Split manifest matches arrays" && c.status == CheckStatus::Ok));
    assert!(report.checks.iter().any(|c| c.name == "trn finite values"));
}

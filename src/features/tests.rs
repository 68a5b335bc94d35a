use super::*;
use ndarray::{Array2, Axis};
use tempfile::tempdir;

/// Mean of the first channel of each cycle.
struct FirstChannelMean;

impl FeatureExtractor for FirstChannelMean {
    fn name(&self) -> &str {
        "first_channel_mean"
    }

    fn extract(&self, curves: ArrayView3<'_, f32>) -> Result<Vec<f32>, FeatureError> {
        Ok(curves
            .axis_iter(Axis(0))
            .map(|cycle| cycle.row(0).mean().unwrap_or(0.0))
            .collect())
    }
}

/// Always returns a single value.
struct Collapsed;

impl FeatureExtractor for Collapsed {
    fn name(&self) -> &str {
        "collapsed"
    }

    fn extract(&self, _curves: ArrayView3<'_, f32>) -> Result<Vec<f32>, FeatureError> {
        Ok(vec![0.0])
    }
}

/// Two cells, window 3, points 4. Charge Q = 1 + cell, discharge Q = 10 + cell.
fn inputs() -> (Array3<f64>, Array3<f64>) {
    let summary = Array3::from_shape_fn((2, SUMMARY_CHANNELS, 5), |(i, c, k)| {
        (i * 100 + c * 10 + k) as f64
    });
    let curves = Array3::from_shape_fn((6, CURVE_CHANNELS, 4), |(row, ch, _)| {
        let cell = (row / 3) as f64;
        match ch {
            0 => 1.0 + cell,
            4 => 10.0 + cell,
            _ => -1.0,
        }
    });
    (summary, curves)
}

#[test]
fn test_augment_partition_layout() {
    let (summary, curves) = inputs();
    let selectors = vec![
        Selector::new(CurvePart::Discharge, FirstChannelMean),
        Selector::new(CurvePart::Charge, FirstChannelMean),
    ];
    let out = augment_partition(&summary, &curves, &selectors, 3).unwrap();
    assert_eq!(out.shape(), &[2, 8, 3]);

    // Summary window copied
    assert_eq!(out[[1, 2, 1]], 121.0);
    // Discharge selector in channel 6, charge selector in channel 7
    assert_eq!(out[[0, 6, 0]], 10.0);
    assert_eq!(out[[1, 6, 2]], 11.0);
    assert_eq!(out[[0, 7, 1]], 1.0);
    assert_eq!(out[[1, 7, 0]], 2.0);
}

#[test]
fn test_augment_rejects_wrong_output_length() {
    let (summary, curves) = inputs();
    let selectors = vec![Selector::new(CurvePart::Discharge, Collapsed)];
    let err = augment_partition(&summary, &curves, &selectors, 3).unwrap_err();
    assert!(matches!(
        err,
        FeatureError::OutputLength {
            expected: 3,
            actual: 1,
            ..
        }
    ));
}

#[test]
fn test_augment_rejects_curve_rows() {
    let (summary, curves) = inputs();
    let err = augment_partition(&summary, &curves, &[], 2).unwrap_err();
    assert!(matches!(err, FeatureError::ShapeMismatch(_)));
}

#[test]
fn test_variant_selector_specs() {
    let specs = AugmentVariant::Full.selector_specs(Path::new("models"), 41);
    assert_eq!(specs.len(), 4);
    assert_eq!(
        specs[0].path,
        PathBuf::from("models/full/Dim_Reduction_1_seed41.onnx")
    );
    assert_eq!(specs[1].part, CurvePart::Discharge);
    assert_eq!(specs[2].part, CurvePart::Charge);
    assert_eq!(specs[3].part, CurvePart::Charge);

    let specs = AugmentVariant::Discharge.selector_specs(Path::new("m"), 7);
    assert_eq!(specs.len(), 2);
    assert_eq!(
        specs[1].path,
        PathBuf::from("m/discharge/Dim_Reduction_2_seed7.onnx")
    );
    assert_eq!(AugmentVariant::Discharge.channels(), 8);
    assert_eq!(AugmentVariant::Full.channels(), 10);
}

#[test]
fn test_output_file_names() {
    assert_eq!(
        AugmentVariant::Discharge.output_file(Partition::Train),
        "predictor1_trn_feature.npy"
    );
    assert_eq!(
        AugmentVariant::Full.output_file(Partition::Validation),
        "predictor3_val_feature.npy"
    );
}

#[test]
fn test_run_augment_writes_both_partitions() {
    let dir = tempdir().unwrap();
    let (summary, curves) = inputs();
    for partition in Partition::ALL {
        let window_summary = summary.slice(s![.., .., ..3]).to_owned();
        write_npy(dir.path().join(partition.file_name("summary")), &window_summary).unwrap();
        write_npy(dir.path().join(partition.file_name("features")), &curves).unwrap();
        write_npy(
            dir.path().join(partition.file_name("targets")),
            &Array2::<f64>::zeros((6, 2)),
        )
        .unwrap();
    }

    let selectors = vec![
        Selector::new(CurvePart::Discharge, FirstChannelMean),
        Selector::new(CurvePart::Discharge, FirstChannelMean),
    ];
    let stats = run_augment(dir.path(), AugmentVariant::Discharge, &selectors).unwrap();
    assert_eq!(stats.train_cells, 2);
    assert_eq!(stats.validation_cells, 2);
    assert_eq!(stats.channels, 8);

    let out: Array3<f64> = read_npy(dir.path().join("predictor1_val_feature.npy")).unwrap();
    assert_eq!(out.shape(), &[2, 8, 3]);
    assert_eq!(out[[1, 7, 2]], 11.0);
}

#[test]
fn test_run_augment_checks_selector_parts() {
    let dir = tempdir().unwrap();
    let selectors = vec![Selector::new(CurvePart::Charge, FirstChannelMean)];
    let err = run_augment(dir.path(), AugmentVariant::Discharge, &selectors).unwrap_err();
    assert!(matches!(err, FeatureError::ShapeMismatch(_)));
}

#[test]
fn test_run_augment_missing_dir() {
    let dir = tempdir().unwrap();
    let err = run_augment(&dir.path().join("missing"), AugmentVariant::Full, &[]).unwrap_err();
    assert!(matches!(err, FeatureError::DatasetError(_)));
}

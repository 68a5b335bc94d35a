use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Description of one batch file of the archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSpec {
    /// Path of the batch file
    pub path: PathBuf,

    /// Prefix of the cell keys produced from this batch (e.g. `b1c`)
    pub prefix: String,

    /// Cell indices with corrupt discharge data, skipped during extraction
    #[serde(default)]
    pub skip: Vec<usize>,
}

impl BatchSpec {
    /// Create a batch description with no skipped cells.
    pub fn new(path: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            prefix: prefix.into(),
            skip: Vec::new(),
        }
    }

    /// Mark cells as skipped.
    pub fn with_skip(mut self, skip: impl IntoIterator<Item = usize>) -> Self {
        self.skip.extend(skip);
        self.skip.sort_unstable();
        self.skip.dedup();
        self
    }

    /// Whether `cell` is excluded from extraction.
    pub fn is_skipped(&self, cell: usize) -> bool {
        self.skip.contains(&cell)
    }

    /// The three fast-charging LFP batches (124 APR18650M1A cells, 1.1 Ah nominal),
    /// with the cells whose discharge records are known to be corrupt.
    pub fn severson(root: &Path) -> Vec<BatchSpec> {
        vec![
            BatchSpec::new(
                root.join("2017-05-12_batchdata_updated_struct_errorcorrect.mat"),
                "b1c",
            )
            .with_skip([0, 1, 2, 3, 4, 8, 10, 12, 13, 18, 22, 14, 15]),
            BatchSpec::new(
                root.join("2017-06-30_batchdata_updated_struct_errorcorrect.mat"),
                "b2c",
            )
            .with_skip([1, 6, 9, 10, 21, 25, 12, 15, 44]),
            BatchSpec::new(
                root.join("2018-04-12_batchdata_updated_struct_errorcorrect.mat"),
                "b3c",
            )
            .with_skip([23, 32, 37]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severson_batches() {
        let batches = BatchSpec::severson(Path::new("data"));
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].prefix, "b1c");
        assert_eq!(batches[0].skip.len(), 13);
        assert!(batches[0].is_skipped(14));
        assert!(!batches[0].is_skipped(5));
        assert!(batches[1].is_skipped(44));
        assert_eq!(batches[2].skip, vec![23, 32, 37]);
        assert!(batches[2].path.starts_with("data"));
    }

    #[test]
    fn test_with_skip_dedups() {
        let spec = BatchSpec::new("x.mat", "b9c").with_skip([3, 1, 3]);
        assert_eq!(spec.skip, vec![1, 3]);
    }

    #[test]
    fn test_deserialize_without_skip() {
        let spec: BatchSpec = toml::from_str(
            r#"
            path = "batch.mat"
            prefix = "b4c"
        "#,
        )
        .unwrap();
        assert!(spec.skip.is_empty());
        assert_eq!(spec.prefix, "b4c");
    }
}

use std::fmt;
use std::str::FromStr;

use super::DatasetError;

/// Identifier of an extracted cell: batch prefix plus cell index, e.g. `b1c07`.
///
/// Keys order the same way as their file names sort, so directory listings
/// and in-memory orderings agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellKey {
    prefix: String,
    index: usize,
}

impl CellKey {
    /// Create a key from a batch prefix and a cell index.
    pub fn new(prefix: impl Into<String>, index: usize) -> Self {
        Self {
            prefix: prefix.into(),
            index,
        }
    }

    /// Batch prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Cell index within the batch.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02}", self.prefix, self.index)
    }
}

impl FromStr for CellKey {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map(|(i, _)| i)
            .ok_or_else(|| DatasetError::InvalidKey(s.to_string()))?;
        let (prefix, digits) = s.split_at(split);
        if prefix.is_empty() {
            return Err(DatasetError::InvalidKey(s.to_string()));
        }
        let index = digits
            .parse()
            .map_err(|_| DatasetError::InvalidKey(s.to_string()))?;
        let key = Self::new(prefix, index);
        // Only the canonical spelling names files that exist on disk
        if key.to_string() != s {
            return Err(DatasetError::InvalidKey(s.to_string()));
        }
        Ok(key)
    }
}

impl Ord for CellKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_string().cmp(&other.to_string())
    }
}

impl PartialOrd for CellKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

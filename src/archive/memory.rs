use super::{ArchiveError, ArchiveSource, RawCycle, SummarySeries};

/// One fully materialised cell.
#[derive(Debug, Clone, Default)]
pub struct RawCell {
    /// Cycle life reported by the cycler
    pub cycle_life: Option<f64>,
    /// Per-cycle summary
    pub summary: SummarySeries,
    /// Raw time series, indexed by cycle number
    pub cycles: Vec<RawCycle>,
}

/// Archive backed by cells held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryArchive {
    cells: Vec<RawCell>,
}

impl InMemoryArchive {
    /// Create an archive from a list of cells.
    pub fn new(cells: Vec<RawCell>) -> Self {
        Self { cells }
    }

    /// Append a cell.
    pub fn push(&mut self, cell: RawCell) {
        self.cells.push(cell);
    }

    /// All cells in batch order.
    pub fn cells(&self) -> &[RawCell] {
        &self.cells
    }

    fn cell(&self, index: usize) -> Result<&RawCell, ArchiveError> {
        self.cells.get(index).ok_or(ArchiveError::CellOutOfRange {
            index,
            count: self.cells.len(),
        })
    }
}

impl ArchiveSource for InMemoryArchive {
    fn cell_count(&self) -> Result<usize, ArchiveError> {
        Ok(self.cells.len())
    }

    fn cycle_life(&self, cell: usize) -> Result<Option<f64>, ArchiveError> {
        Ok(self.cell(cell)?.cycle_life)
    }

    fn summary(&self, cell: usize) -> Result<SummarySeries, ArchiveError> {
        Ok(self.cell(cell)?.summary.clone())
    }

    fn cycle_count(&self, cell: usize) -> Result<usize, ArchiveError> {
        Ok(self.cell(cell)?.cycles.len())
    }

    fn cycle(&self, cell: usize, cycle: usize) -> Result<RawCycle, ArchiveError> {
        let cell = self.cell(cell)?;
        cell.cycles
            .get(cycle)
            .cloned()
            .ok_or(ArchiveError::CycleOutOfRange {
                index: cycle,
                count: cell.cycles.len(),
            })
    }
}

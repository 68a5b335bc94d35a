//! MATLAB v7.3 batch files.
//!
//! v7.3 `.mat` files are HDF5 files in which struct arrays are stored as
//! datasets of object references. Every cell of the `batch` struct is one row
//! of those reference datasets.

use std::cell::RefCell;
use std::path::Path;

use hdf5::{Dataset, File, Group, ObjectReference, ObjectReference1, ReferencedObject};
use log::debug;
use ndarray::Array2;

use super::{ArchiveError, ArchiveSource, RawCycle, SummarySeries};

type RefTable = Array2<ObjectReference1>;

/// Reference tables of one cell's `cycles` struct.
struct CycleRefs {
    cell: usize,
    temperature: RefTable,
    current: RefTable,
    voltage: RefTable,
    charge_capacity: RefTable,
    discharge_capacity: RefTable,
}

/// Reader for one batch file.
pub struct MatArchive {
    file: File,
    cycle_life: RefTable,
    summary: RefTable,
    cycles: RefTable,
    cached: RefCell<Option<CycleRefs>>,
}

impl MatArchive {
    /// Open a batch file and load its top-level reference tables.
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        if !path.exists() {
            return Err(ArchiveError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("batch file not found: {}", path.display()),
            )));
        }

        let file = File::open(path)?;
        let batch = file
            .group("batch")
            .map_err(|_| ArchiveError::MissingField("batch".to_string()))?;

        let cycle_life = read_refs(&batch, "cycle_life")?;
        let summary = read_refs(&batch, "summary")?;
        let cycles = read_refs(&batch, "cycles")?;
        debug!(
            "Opened {} with {} cells",
            path.display(),
            summary.nrows()
        );

        Ok(Self {
            file,
            cycle_life,
            summary,
            cycles,
            cached: RefCell::new(None),
        })
    }

    fn cell_ref<'a>(&self, table: &'a RefTable, cell: usize) -> Result<&'a ObjectReference1, ArchiveError> {
        table.get((cell, 0)).ok_or(ArchiveError::CellOutOfRange {
            index: cell,
            count: table.nrows(),
        })
    }

    fn group_at(&self, reference: &ObjectReference1, path: &str) -> Result<Group, ArchiveError> {
        match reference.dereference(&self.file)? {
            ReferencedObject::Group(group) => Ok(group),
            _ => Err(ArchiveError::BadReference {
                path: path.to_string(),
                expected: "group",
            }),
        }
    }

    fn dataset_at(&self, reference: &ObjectReference1, path: &str) -> Result<Dataset, ArchiveError> {
        match reference.dereference(&self.file)? {
            ReferencedObject::Dataset(dataset) => Ok(dataset),
            _ => Err(ArchiveError::BadReference {
                path: path.to_string(),
                expected: "dataset",
            }),
        }
    }

    fn cycle_refs(&self, cell: usize) -> Result<(), ArchiveError> {
        if matches!(&*self.cached.borrow(), Some(refs) if refs.cell == cell) {
            return Ok(());
        }

        let group = self.group_at(self.cell_ref(&self.cycles, cell)?, "batch/cycles")?;
        let refs = CycleRefs {
            cell,
            temperature: read_refs(&group, "T")?,
            current: read_refs(&group, "I")?,
            voltage: read_refs(&group, "V")?,
            charge_capacity: read_refs(&group, "Qc")?,
            discharge_capacity: read_refs(&group, "Qd")?,
        };
        *self.cached.borrow_mut() = Some(refs);
        Ok(())
    }

    fn read_cycle_series(&self, table: &RefTable, cycle: usize, field: &str) -> Result<Vec<f64>, ArchiveError> {
        let reference = table.get((cycle, 0)).ok_or(ArchiveError::CycleOutOfRange {
            index: cycle,
            count: table.nrows(),
        })?;
        let dataset = self.dataset_at(reference, &format!("cycles/{field}"))?;
        Ok(dataset.read_raw::<f64>()?)
    }
}

impl ArchiveSource for MatArchive {
    fn cell_count(&self) -> Result<usize, ArchiveError> {
        Ok(self.summary.nrows())
    }

    fn cycle_life(&self, cell: usize) -> Result<Option<f64>, ArchiveError> {
        let dataset = self.dataset_at(self.cell_ref(&self.cycle_life, cell)?, "batch/cycle_life")?;
        Ok(dataset.read_raw::<f64>()?.first().copied())
    }

    fn summary(&self, cell: usize) -> Result<SummarySeries, ArchiveError> {
        let group = self.group_at(self.cell_ref(&self.summary, cell)?, "batch/summary")?;
        Ok(SummarySeries {
            charge_capacity: read_series(&group, "QCharge")?,
            discharge_capacity: read_series(&group, "QDischarge")?,
            temperature_min: read_series(&group, "Tmin")?,
            temperature_max: read_series(&group, "Tmax")?,
            temperature_avg: read_series(&group, "Tavg")?,
            charge_time: read_series(&group, "chargetime")?,
        })
    }

    fn cycle_count(&self, cell: usize) -> Result<usize, ArchiveError> {
        self.cycle_refs(cell)?;
        let cached = self.cached.borrow();
        Ok(cached.as_ref().map_or(0, |refs| refs.current.nrows()))
    }

    fn cycle(&self, cell: usize, cycle: usize) -> Result<RawCycle, ArchiveError> {
        self.cycle_refs(cell)?;
        let cached = self.cached.borrow();
        let refs = cached
            .as_ref()
            .ok_or_else(|| ArchiveError::MissingField("batch/cycles".to_string()))?;

        Ok(RawCycle {
            temperature: self.read_cycle_series(&refs.temperature, cycle, "T")?,
            current: self.read_cycle_series(&refs.current, cycle, "I")?,
            voltage: self.read_cycle_series(&refs.voltage, cycle, "V")?,
            charge_capacity: self.read_cycle_series(&refs.charge_capacity, cycle, "Qc")?,
            discharge_capacity: self.read_cycle_series(&refs.discharge_capacity, cycle, "Qd")?,
        })
    }
}

fn read_refs(group: &Group, name: &str) -> Result<RefTable, ArchiveError> {
    let dataset = group
        .dataset(name)
        .map_err(|_| ArchiveError::MissingField(format!("{}/{}", group.name(), name)))?;
    Ok(dataset.read_2d::<ObjectReference1>()?)
}

fn read_series(group: &Group, name: &str) -> Result<Vec<f64>, ArchiveError> {
    let dataset = group
        .dataset(name)
        .map_err(|_| ArchiveError::MissingField(format!("{}/{}", group.name(), name)))?;
    Ok(dataset.read_raw::<f64>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SUMMARY_FIELDS: [&str; 6] = [
        "QCharge",
        "QDischarge",
        "Tmin",
        "Tmax",
        "Tavg",
        "chargetime",
    ];
    const CYCLE_FIELDS: [&str; 5] = ["T", "I", "V", "Qc", "Qd"];

    /// Store a series as a MATLAB row vector `(1, n)`.
    fn write_series(group: &Group, name: &str, values: &[f64]) {
        let data = Array2::from_shape_vec((1, values.len()), values.to_vec()).unwrap();
        group.new_dataset_builder().with_data(&data).create(name).unwrap();
    }

    /// Store references as a MATLAB struct-array column `(n, 1)`.
    fn write_refs(group: &Group, name: &str, refs: Vec<ObjectReference1>) {
        let table = Array2::from_shape_vec((refs.len(), 1), refs).unwrap();
        group.new_dataset_builder().with_data(&table).create(name).unwrap();
    }

    /// Batch whose cell `c` has `c + 2` cycles. Sample `j` of field `f` in
    /// cycle `k` is `100c + 10k + f` for `j == 0` and `j` otherwise.
    fn write_batch(path: &Path, cells: usize) {
        let file = File::create(path).unwrap();
        let objects = file.create_group("refs").unwrap();
        let (mut life, mut summaries, mut cycles) = (Vec::new(), Vec::new(), Vec::new());

        for c in 0..cells {
            let name = format!("life{c}");
            write_series(&objects, &name, &[500.0 + c as f64]);
            life.push(objects.reference::<ObjectReference1>(&name).unwrap());

            let name = format!("summary{c}");
            let summary = objects.create_group(&name).unwrap();
            for (row, field) in SUMMARY_FIELDS.iter().enumerate() {
                write_series(&summary, field, &[row as f64, c as f64, 3.0]);
            }
            summaries.push(objects.reference::<ObjectReference1>(&name).unwrap());

            let name = format!("cycles{c}");
            let group = objects.create_group(&name).unwrap();
            for (f, field) in CYCLE_FIELDS.iter().enumerate() {
                let table = (0..c + 2)
                    .map(|k| {
                        let sample = format!("{field}_{k}");
                        let first = (100 * c + 10 * k + f) as f64;
                        write_series(&group, &sample, &[first, 1.0, 2.0]);
                        group.reference::<ObjectReference1>(&sample).unwrap()
                    })
                    .collect();
                write_refs(&group, field, table);
            }
            cycles.push(objects.reference::<ObjectReference1>(&name).unwrap());
        }

        let batch = file.create_group("batch").unwrap();
        write_refs(&batch, "cycle_life", life);
        write_refs(&batch, "summary", summaries);
        write_refs(&batch, "cycles", cycles);
    }

    #[test]
    fn test_summary_and_cycle_life() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("batch.mat");
        write_batch(&path, 3);

        let archive = MatArchive::open(&path).unwrap();
        assert_eq!(archive.cell_count().unwrap(), 3);
        assert_eq!(archive.cycle_life(2).unwrap(), Some(502.0));

        let summary = archive.summary(1).unwrap();
        assert_eq!(summary.charge_capacity, vec![0.0, 1.0, 3.0]);
        assert_eq!(summary.charge_time, vec![5.0, 1.0, 3.0]);
        assert_eq!(summary.to_array().unwrap().shape(), &[6, 3]);
    }

    #[test]
    fn test_cycles_follow_requested_cell() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("batch.mat");
        write_batch(&path, 3);
        let archive = MatArchive::open(&path).unwrap();

        assert_eq!(archive.cycle_count(0).unwrap(), 2);
        assert_eq!(archive.cycle_count(2).unwrap(), 4);
        let cycle = archive.cycle(2, 3).unwrap();
        assert_eq!(cycle.temperature, vec![230.0, 1.0, 2.0]);
        assert_eq!(cycle.current, vec![231.0, 1.0, 2.0]);
        assert_eq!(cycle.discharge_capacity, vec![234.0, 1.0, 2.0]);

        // Switching back reloads the first cell's tables
        let cycle = archive.cycle(0, 1).unwrap();
        assert_eq!(cycle.voltage, vec![12.0, 1.0, 2.0]);
        assert_eq!(archive.cycle_count(0).unwrap(), 2);
    }

    #[test]
    fn test_out_of_range() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("batch.mat");
        write_batch(&path, 2);
        let archive = MatArchive::open(&path).unwrap();

        assert!(matches!(
            archive.summary(5),
            Err(ArchiveError::CellOutOfRange { index: 5, count: 2 })
        ));
        assert!(matches!(
            archive.cycle_count(2),
            Err(ArchiveError::CellOutOfRange { index: 2, count: 2 })
        ));
        assert!(matches!(
            archive.cycle(1, 3),
            Err(ArchiveError::CycleOutOfRange { index: 3, count: 3 })
        ));
    }

    #[test]
    fn test_reference_to_wrong_object_kind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("batch.mat");
        {
            let file = File::create(&path).unwrap();
            let objects = file.create_group("refs").unwrap();
            write_series(&objects, "life0", &[800.0]);
            let batch = file.create_group("batch").unwrap();
            for table in ["cycle_life", "summary", "cycles"] {
                let life = objects.reference::<ObjectReference1>("life0").unwrap();
                write_refs(&batch, table, vec![life]);
            }
        }

        let archive = MatArchive::open(&path).unwrap();
        assert_eq!(archive.cycle_life(0).unwrap(), Some(800.0));
        assert!(matches!(
            archive.summary(0),
            Err(ArchiveError::BadReference { expected: "group", .. })
        ));
        assert!(matches!(
            archive.cycle_count(0),
            Err(ArchiveError::BadReference { expected: "group", .. })
        ));
    }

    #[test]
    fn test_open_errors() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            MatArchive::open(&dir.path().join("missing.mat")),
            Err(ArchiveError::IoError(_))
        ));

        let path = dir.path().join("empty.mat");
        File::create(&path).unwrap().create_group("other").unwrap();
        assert!(matches!(
            MatArchive::open(&path),
            Err(ArchiveError::MissingField(ref field)) if field == "batch"
        ));
    }
}

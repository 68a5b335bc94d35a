//! # Extracted Cell Dataset
//!
//! On-disk representation of extracted cells and the directory layout shared
//! by the pipeline stages.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cyclife::dataset::{CellKey, CellStore};
//! use ndarray::{Array2, Array3};
//!
//! let store = CellStore::create("cells")?;
//! let key = CellKey::new("b1c", 5);
//! store.write_cell(&key, &Array2::zeros((6, 800)), &Array3::zeros((100, 8, 500)))?;
//!
//! for key in store.keys()? {
//!     let cell = store.load_cell(&key)?;
//!     println!("{}: EoL {}", cell.key, cell.eol());
//! }
//! # Ok::<(), cyclife::dataset::DatasetError>(())
//! ```

mod error;
mod key;
mod layout;
mod store;


pub use error::DatasetError;
pub use key::CellKey;
pub use layout::DatasetLayout;
pub use store::{CellRecord, CellStore, CHARGE_TIME_ROW, DISCHARGE_CAPACITY_ROW};

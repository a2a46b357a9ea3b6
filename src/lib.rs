//! Loading, unit conversion and export of Hobo data logger CSV files.
//!
//! The desktop viewer (`hobo-viewer`) and the `hobo-export` tool are thin
//! front-ends over [`data`].

pub mod data;
pub mod error;

pub use data::loader::{load_file, read_hobo_file, LoadOptions};
pub use data::model::{Column, ColumnLabel, HoboDataset, Value};
pub use error::HoboError;

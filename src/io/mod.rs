//! Result export.

pub mod export;

pub use export::{export_records_csv, export_sweep_csv, write_records_csv, write_sweep_csv};

pub mod csv;
pub mod json;
pub mod tabular;

pub use crate::error::ExportError;
pub use csv::{export_csv, CsvDirWriter, TabularWriter};
pub use json::export_json;
pub use tabular::Tabular;

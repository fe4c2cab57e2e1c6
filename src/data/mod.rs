//! Data module - CSV loading, cleaning and export

mod exporter;
mod loader;
mod processor;
pub mod schema;

pub use exporter::{export_csv, ExportError};
pub use loader::{load_csv, LoaderError};
pub use processor::{clean, ProcessorError};

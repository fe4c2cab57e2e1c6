//! Data Exporter Module
//! Writes the enriched table back out as CSV.

use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create output file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to write CSV: {0}")]
    CsvError(#[from] PolarsError),
}

/// Serialize the enriched table to `path` with a header row and no index
/// column.
pub fn export_csv(df: &DataFrame, path: &Path) -> Result<(), ExportError> {
    let mut file = File::create(path)?;
    // CsvWriter mutates its frame argument (re-chunking), so write a clone.
    let mut df = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_without_index_column() {
        let df = DataFrame::new(vec![
            Column::new("City".into(), vec!["Dayton", "Akron"]),
            Column::new("Hour".into(), vec![7i32, 17]),
        ])
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        export_csv(&df, &path).expect("export");

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("City,Hour"));
        assert_eq!(lines.next(), Some("Dayton,7"));
    }
}

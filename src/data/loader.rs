//! CSV Data Loader Module
//! Handles CSV file loading and input-column validation using Polars.

use polars::prelude::*;
use std::path::Path;
use thiserror::Error;

use crate::data::schema::INPUT_COLUMNS;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Input file not found: {0}")]
    FileNotFound(String),
    #[error("Input is missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// Load the accident CSV and verify every required column is present.
///
/// Types are inferred by Polars here; the cleaner casts each projected
/// column to its declared dtype, so inference mistakes surface as nulls
/// there rather than as load failures.
pub fn load_csv(path: &Path) -> Result<DataFrame, LoaderError> {
    if !path.exists() {
        return Err(LoaderError::FileNotFound(path.display().to_string()));
    }

    // Use lazy evaluation for memory efficiency, then collect
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(10000))
        .with_ignore_errors(true)
        .finish()?
        .collect()?;

    for col in INPUT_COLUMNS {
        if df.column(col.name()).is_err() {
            return Err(LoaderError::MissingColumn(col.name()));
        }
    }

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("temp file");
        file.write_all(contents.as_bytes()).expect("write csv");
        file
    }

    const FULL_HEADER: &str = "Severity,Start_Time,Start_Lat,Start_Lng,City,\
Weather_Condition,Visibility(mi),Wind_Speed(mph),Precipitation(in),Street,Side";

    #[test]
    fn loads_well_formed_csv() {
        let file = write_csv(&format!(
            "{FULL_HEADER}\n2,2023-01-02 08:15:00,39.1,-84.5,Cincinnati,Clear,10.0,5.0,0.0,Main St,R\n"
        ));
        let df = load_csv(file.path()).expect("load");
        assert_eq!(df.height(), 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_csv(Path::new("/nonexistent/accidents.csv")).unwrap_err();
        assert!(matches!(err, LoaderError::FileNotFound(_)));
    }

    #[test]
    fn missing_column_is_named() {
        let file = write_csv("Severity,Start_Time\n2,2023-01-02 08:15:00\n");
        let err = load_csv(file.path()).unwrap_err();
        match err {
            LoaderError::MissingColumn(name) => assert_eq!(name, "Start_Lat"),
            other => panic!("unexpected error: {other}"),
        }
    }
}

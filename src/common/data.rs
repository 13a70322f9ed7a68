use std::{fs::File, io::BufWriter, path::Path, sync::Arc};

use anyhow::{Context, Result};
use polars::{
    frame::DataFrame,
    io::{SerReader, SerWriter},
    prelude::{CsvReadOptions, CsvReader, CsvWriter, DataType, Field, Schema},
};

/// Reads a CSV file from `path` into a Polars DataFrame.
pub fn read_from_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[common::data] Failed to open CSV file: {}", path.display()))?;
    CsvReader::new(file)
        .finish()
        .with_context(|| format!("[common::data] Failed to read CSV from {}", path.display()))
}

/// Reads a CSV file, forcing the named columns to be read as strings.
///
/// Constituency codes can be all-numeric in some exports; inferring them as
/// integers would strip leading zeros and break joins.
pub fn read_from_csv_with_codes(path: &Path, code_columns: &[&str]) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[common::data] Failed to open CSV file: {}", path.display()))?;

    let schema = Arc::new(Schema::from_iter(
        code_columns.iter().map(|name| Field::new((*name).into(), DataType::String)),
    ));
    let options = CsvReadOptions::default().with_schema_overwrite(Some(schema));

    CsvReader::new(file)
        .with_options(options)
        .finish()
        .with_context(|| format!("[common::data] Failed to read CSV from {}", path.display()))
}

/// Writes a Polars DataFrame to a CSV file at `path`.
pub fn write_to_csv(mut df: DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[common::data] Failed to create file: {}", path.display()))?;
    let writer = BufWriter::new(file);
    CsvWriter::new(writer)
        .finish(&mut df)
        .with_context(|| format!("[common::data] Failed to write CSV to {}", path.display()))?;
    Ok(())
}

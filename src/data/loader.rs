// ============================================================
// Layer 4 — CSV Loader / Writer
// ============================================================
// Every stage boundary in the pipeline is a CSV file, so all
// tabular I/O goes through this one module.
//
// Reading rules (matching how the public SMS spam corpus
// is actually shipped):
//   - bytes that are not valid UTF-8 are decoded as Latin-1
//   - a leading byte-order mark is ignored
//   - empty header cells become "Unnamed: <index>"
//   - rows shorter than the header are padded with ""
//   - rows longer than the header are a ParseError
//
// Writing always creates the parent directory first and
// overwrites any previous file at the same path.

use std::{fs, io, path::{Path, PathBuf}};

use csv::{ReaderBuilder, WriterBuilder};

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::feature_matrix::{FeatureMatrix, LABEL_COLUMN};
use crate::domain::table::Table;
use crate::domain::traits::TableSource;

/// Loads one CSV file into a Table.
/// Implements the TableSource trait from Layer 3.
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableSource for CsvLoader {
    fn load(&self) -> PipelineResult<Table> {
        let bytes = fs::read(&self.path)
            .map_err(|e| PipelineError::io("read", &self.path, e))?;
        let table = parse_csv(&decode_text(bytes), &self.path)?;

        tracing::debug!(
            "Loaded {} rows x {} columns from '{}'",
            table.len(),
            table.columns().len(),
            self.path.display()
        );
        Ok(table)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// UTF-8 when possible, Latin-1 otherwise (every byte maps to one char)
fn decode_text(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!("Input is not UTF-8, decoding as Latin-1");
            e.into_bytes().iter().map(|&b| b as char).collect()
        }
    };
    match text.strip_prefix('\u{FEFF}') {
        Some(rest) => rest.to_string(),
        None       => text,
    }
}

fn parse_csv(text: &str, path: &Path) -> PipelineResult<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::parse(path, e))?
        .clone();
    if headers.is_empty() {
        return Err(PipelineError::parse(path, "no header row"));
    }

    let columns: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if h.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| PipelineError::parse(path, e))?;
        if record.len() > columns.len() {
            return Err(PipelineError::parse(
                path,
                format!(
                    "row {} has {} fields but the header has {}",
                    line + 1,
                    record.len(),
                    columns.len()
                ),
            ));
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table::new(columns, rows))
}

/// Write a table as CSV with a header row
pub fn write_table(table: &Table, path: &Path) -> PipelineResult<()> {
    write_records(path, table.columns(), table.rows().iter().map(|r| r.as_slice()))?;
    tracing::debug!("Wrote {} rows to '{}'", table.len(), path.display());
    Ok(())
}

/// Read a feature matrix: numeric columns followed by an integer `label`
pub fn read_feature_matrix(path: &Path) -> PipelineResult<FeatureMatrix> {
    let table = CsvLoader::new(path).load()?;

    let label_idx = table.columns().len().checked_sub(1)
        .filter(|&i| table.columns()[i] == LABEL_COLUMN)
        .ok_or_else(|| PipelineError::schema(LABEL_COLUMN, path.display().to_string()))?;

    let mut features = Vec::with_capacity(table.len());
    let mut labels   = Vec::with_capacity(table.len());

    for (r, row) in table.rows().iter().enumerate() {
        let values = row[..label_idx]
            .iter()
            .enumerate()
            .map(|(c, cell)| {
                cell.trim().parse::<f64>().map_err(|_| {
                    PipelineError::parse(path, format!("row {}, column {c}: '{cell}' is not a number", r + 1))
                })
            })
            .collect::<PipelineResult<Vec<f64>>>()?;
        features.push(values);
        labels.push(parse_label(&row[label_idx], r, path)?);
    }

    FeatureMatrix::new(table.columns()[..label_idx].to_vec(), features, labels)
}

/// Labels are written as integers but accept "1.0" style floats too
fn parse_label(cell: &str, row: usize, path: &Path) -> PipelineResult<usize> {
    let bad = || PipelineError::parse(path, format!("row {}: label '{cell}' is not a class index", row + 1));
    let value: f64 = cell.trim().parse().map_err(|_| bad())?;
    if value < 0.0 || value.fract() != 0.0 || !value.is_finite() {
        return Err(bad());
    }
    Ok(value as usize)
}

/// Write a feature matrix, feature names as headers and a final `label`
pub fn write_feature_matrix(matrix: &FeatureMatrix, path: &Path) -> PipelineResult<()> {
    let mut header: Vec<String> = matrix.feature_names().to_vec();
    header.push(LABEL_COLUMN.to_string());

    let rows: Vec<Vec<String>> = matrix
        .features()
        .iter()
        .zip(matrix.labels())
        .map(|(row, label)| {
            let mut cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            cells.push(label.to_string());
            cells
        })
        .collect();

    write_records(path, &header, rows.iter().map(|r| r.as_slice()))?;
    tracing::debug!(
        "Wrote {} x {} feature matrix to '{}'",
        matrix.n_rows(),
        matrix.n_features(),
        path.display()
    );
    Ok(())
}

fn write_records<'a, I>(path: &Path, header: &[String], rows: I) -> PipelineResult<()>
where
    I: Iterator<Item = &'a [String]>,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io("create directory", parent, e))?;
    }
    let io_err = |e: csv::Error| PipelineError::io("write", path, io::Error::from(e));

    let mut writer = WriterBuilder::new().from_path(path).map_err(io_err)?;
    writer.write_record(header).map_err(io_err)?;
    for row in rows {
        writer.write_record(row).map_err(io_err)?;
    }
    writer.flush().map_err(|e| PipelineError::io("write", path, e))?;
    Ok(())
}

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::array_value_to_string;
use calamine::{open_workbook_auto, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Dataset, RawRecord};
use crate::config::LoaderConfig;
use crate::engine::columns;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a census table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the column names, one neighborhood per row
/// * `.json`    – `[{ "CD_BAIRRO": ..., "NM_BAIRRO": ..., ... }, ...]`
/// * `.parquet` – flat scalar columns, one neighborhood per row
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first sheet, first row
///   as header
///
/// Column names are kept verbatim and in source order. The result is
/// checked for the identity columns and, if configured, for unique
/// neighborhood names.
pub fn load_file(path: &Path, config: &LoaderConfig) -> Result<Dataset, LoadError> {
    config.validate()?;
    log::info!("loading census table from {}", path.display());

    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LoadError::SourceNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(unreadable(path, e.into())),
    };
    if !meta.is_file() {
        return Err(unreadable(path, anyhow::anyhow!("not a regular file")));
    }
    if meta.len() > config.max_bytes {
        return Err(LoadError::SourceTooLarge {
            path: path.to_path_buf(),
            limit: config.max_bytes,
            unit: "bytes",
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    // Parsers stop one row past the limit so oversized tables are never
    // held in full.
    let row_cap = config.max_rows.saturating_add(1);
    let parsed = match ext.as_str() {
        "csv" => load_csv(path, config.delimiter_byte(), row_cap),
        "json" => load_json(path, row_cap),
        "parquet" | "pq" => load_parquet(path, row_cap),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path, row_cap),
        other => Err(anyhow::anyhow!("unsupported file extension: .{other}")),
    };
    let dataset = parsed.map_err(|e| unreadable(path, e))?;

    if dataset.len() > config.max_rows {
        return Err(LoadError::SourceTooLarge {
            path: path.to_path_buf(),
            limit: config.max_rows as u64,
            unit: "rows",
        });
    }

    validate(&dataset, config)?;
    log::info!(
        "loaded {} neighborhoods with {} columns",
        dataset.len(),
        dataset.columns().len()
    );
    Ok(dataset)
}

/// [`load_file`] with the default [`LoaderConfig`].
pub fn load_file_default(path: &Path) -> Result<Dataset, LoadError> {
    load_file(path, &LoaderConfig::default())
}

fn unreadable(path: &Path, err: anyhow::Error) -> LoadError {
    LoadError::SourceUnreadable {
        path: path.to_path_buf(),
        reason: format!("{err:#}"),
    }
}

/// Identity columns must exist; names must be unique unless disabled.
/// Rows without a name take no part in the uniqueness check.
fn validate(dataset: &Dataset, config: &LoaderConfig) -> Result<(), LoadError> {
    for column in columns::REQUIRED {
        if !dataset.has_column(column) {
            return Err(LoadError::MissingRequiredColumn {
                column: column.to_string(),
            });
        }
    }

    if config.require_unique_names {
        let mut seen: HashMap<String, usize> = HashMap::with_capacity(dataset.len());
        for row in 0..dataset.len() {
            let name = dataset.name_of(row);
            if name.is_empty() {
                continue;
            }
            if let Some(&first_row) = seen.get(&name) {
                return Err(LoadError::DuplicateNeighborhood {
                    name,
                    first_row,
                    second_row: row,
                });
            }
            seen.insert(name, row);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with the census column names, UTF-8.
/// Every cell is type-inferred; nothing else is transformed.
fn load_csv(path: &Path, delimiter: u8, row_cap: usize) -> Result<Dataset> {
    log::debug!("reading CSV with delimiter {:?}", delimiter as char);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        bail!("CSV has no header row");
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        if records.len() >= row_cap {
            break;
        }
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() > headers.len() {
            bail!(
                "CSV row {row_no}: {} fields but the header has {}",
                record.len(),
                headers.len()
            );
        }
        let cells = record.iter().map(CellValue::infer).collect();
        records.push(RawRecord { cells });
    }

    Ok(Dataset::new(headers, records))
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Read the first sheet of a workbook. The first row is the header, taken
/// verbatim; text cells are kept as they are.
fn load_workbook(path: &Path, row_cap: usize) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no sheets")?
        .context("reading first sheet")?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .context("first sheet is empty")?
        .iter()
        .map(|cell| match cell {
            Data::String(s) => s.clone(),
            Data::Empty => String::new(),
            other => other.to_string(),
        })
        .collect();
    log::debug!("workbook sheet has {} columns", headers.len());

    let records = rows
        .take(row_cap)
        .map(|row| RawRecord {
            cells: row.iter().map(workbook_to_cell).collect(),
        })
        .collect();

    Ok(Dataset::new(headers, records))
}

fn workbook_to_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(d) => CellValue::Float(d.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => {
            log::debug!("workbook cell error {e:?} read as null");
            CellValue::Null
        }
        Data::Empty => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "CD_BAIRRO": 1, "NM_BAIRRO": "Centro", "Quantidade de moradores": 1000 },
///   ...
/// ]
/// ```
///
/// Columns are the union of all keys in first-seen order.
fn load_json(path: &Path, row_cap: usize) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut objects = Vec::with_capacity(rows.len().min(row_cap));

    for (i, row) in rows.iter().take(row_cap).enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !index.contains_key(key) {
                index.insert(key.clone(), columns.len());
                columns.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let records = objects
        .into_iter()
        .map(|obj| {
            let mut cells = vec![CellValue::Null; columns.len()];
            for (key, val) in obj {
                cells[index[key]] = json_to_cell(val);
            }
            RawRecord { cells }
        })
        .collect();

    Ok(Dataset::new(columns, records))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one scalar column per census variable.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path, row_cap: usize) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    'batches: for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            if records.len() >= row_cap {
                break 'batches;
            }
            let cells = batch
                .columns()
                .iter()
                .enumerate()
                .map(|(col_idx, col)| {
                    extract_cell(col, row)
                        .with_context(|| format!("Row {row}, column '{}'", columns[col_idx]))
                })
                .collect::<Result<Vec<_>>>()?;
            records.push(RawRecord { cells });
        }
    }

    Ok(Dataset::new(columns, records))
}

// -- Parquet / Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => CellValue::Integer(col.as_primitive::<UInt16Type>().value(row) as i64),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            match i64::try_from(v) {
                Ok(i) => CellValue::Integer(i),
                Err(_) => CellValue::Float(v as f64),
            }
        }
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::List(_) | DataType::LargeList(_) | DataType::Struct(_) | DataType::Map(..) => {
            bail!("nested column type {:?} is not a table cell", col.data_type())
        }
        _ => CellValue::String(
            array_value_to_string(col.as_ref(), row).context("formatting cell")?,
        ),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "CD_BAIRRO,NM_BAIRRO,Quantidade de moradores,Sexo masculino,Sexo feminino";

    fn write_file(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn rejects_unknown_extension() {
        let file = write_file(".txt", "not a table");
        let err = load_file_default(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::SourceUnreadable { .. }), "{err}");
    }

    #[test]
    fn corrupt_workbook_is_unreadable() {
        let file = write_file(".xlsx", "not a zip archive");
        let err = load_file_default(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::SourceUnreadable { .. }), "{err}");
    }

    #[test]
    fn csv_text_cells_are_not_trimmed() {
        let body = format!("{HEADER}\n1,Centro ,1000,480,520\n");
        let file = write_file(".csv", &body);
        let ds = load_file_default(file.path()).unwrap();
        assert_eq!(ds.name_of(0), "Centro ");
        assert_eq!(ds.cell(0, "Quantidade de moradores"), Some(&CellValue::Integer(1000)));
    }

    #[test]
    fn detects_missing_identity_column() {
        let file = write_file(".csv", "NM_BAIRRO,Quantidade de moradores\nCentro,10\n");
        let err = load_file_default(file.path()).unwrap_err();
        match err {
            LoadError::MissingRequiredColumn { column } => assert_eq!(column, "CD_BAIRRO"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_names_fail_unless_allowed() {
        let body = format!("{HEADER}\n1,Centro,10,5,5\n2,Centro,20,10,10\n");
        let file = write_file(".csv", &body);

        let err = load_file_default(file.path()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::DuplicateNeighborhood {
                first_row: 0,
                second_row: 1,
                ..
            }
        ));

        let config = LoaderConfig {
            require_unique_names: false,
            ..LoaderConfig::default()
        };
        assert_eq!(load_file(file.path(), &config).unwrap().len(), 2);
    }

    #[test]
    fn rows_without_a_name_skip_the_uniqueness_check() {
        let body = format!("{HEADER}\n1,,10,5,5\n2,,20,10,10\n3,Centro,30,15,15\n");
        let file = write_file(".csv", &body);
        let ds = load_file_default(file.path()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.neighborhood_names().len(), 1);
    }

    #[test]
    fn enforces_row_limit() {
        let body = format!("{HEADER}\n1,A,10,5,5\n2,B,20,10,10\n3,C,30,15,15\n");
        let file = write_file(".csv", &body);
        let config = LoaderConfig {
            max_rows: 2,
            ..LoaderConfig::default()
        };
        let err = load_file(file.path(), &config).unwrap_err();
        assert!(matches!(err, LoadError::SourceTooLarge { unit: "rows", .. }));
    }

    #[test]
    fn enforces_byte_limit() {
        let body = format!("{HEADER}\n1,A,10,5,5\n");
        let file = write_file(".csv", &body);
        let config = LoaderConfig {
            max_bytes: 8,
            ..LoaderConfig::default()
        };
        let err = load_file(file.path(), &config).unwrap_err();
        assert!(matches!(err, LoadError::SourceTooLarge { unit: "bytes", .. }));
    }

    #[test]
    fn semicolon_delimiter() {
        let body = "CD_BAIRRO;NM_BAIRRO;Quantidade de moradores;Sexo masculino;Sexo feminino\n\
                    1;Centro;1000;480;520\n";
        let file = write_file(".csv", body);
        let config = LoaderConfig {
            delimiter: ';',
            ..LoaderConfig::default()
        };
        let ds = load_file(file.path(), &config).unwrap();
        assert_eq!(ds.cell(0, "Sexo feminino"), Some(&CellValue::Integer(520)));
    }

    #[test]
    fn json_keeps_key_order_and_unions_columns() {
        let body = r#"[
            {"CD_BAIRRO": 1, "NM_BAIRRO": "A", "Quantidade de moradores": 10,
             "Sexo masculino": 4, "Sexo feminino": 6},
            {"CD_BAIRRO": 2, "NM_BAIRRO": "B", "Quantidade de moradores": 20,
             "Sexo masculino": 9, "Sexo feminino": 11, "Extra": null}
        ]"#;
        let file = write_file(".json", body);
        let ds = load_file_default(file.path()).unwrap();
        assert_eq!(
            ds.columns(),
            [
                "CD_BAIRRO",
                "NM_BAIRRO",
                "Quantidade de moradores",
                "Sexo masculino",
                "Sexo feminino",
                "Extra"
            ]
        );
        assert_eq!(ds.cell(0, "Extra"), Some(&CellValue::Null));
    }

    #[test]
    fn malformed_json_is_unreadable() {
        let file = write_file(".json", r#"{"NM_BAIRRO": "A"}"#);
        let err = load_file_default(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::SourceUnreadable { .. }));
    }
}

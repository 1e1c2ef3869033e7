use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type,
    Int8Type, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt16Type, UInt32Type, UInt8Type,
};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, RawTable, StockTable, TableLayout};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a stock table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one observation per row
/// * `.json`    – `[{ "Stock": "A", "Date": "2020-01-01", ... }, ...]`
/// * `.parquet` – flat columns (strings, numbers, bools, dates, timestamps)
///
/// The returned table has already passed date validation; nothing is
/// returned for a file whose date column does not parse.
pub fn load_file(path: &Path) -> Result<StockTable, LoadError> {
    load_file_with_layout(path, &TableLayout::default())
}

pub fn load_file_with_layout(path: &Path, layout: &TableLayout) -> Result<StockTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    }
    .map_err(LoadError::Read)?;

    StockTable::from_raw(raw, layout)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then one row per stock and date.
/// Cell types are guessed per cell; empty cells and NA placeholders are missing values.
fn load_csv(path: &Path) -> Result<RawTable> {
    // Ragged rows are allowed; short rows read as missing trailing cells.
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(RawTable { columns, rows })
}

/// Placeholders Pandas' `read_csv` reads as missing by default.
const NA_VALUES: &[&str] = &[
    "NA", "N/A", "n/a", "#N/A", "#N/A N/A", "#NA", "NaN", "-NaN", "nan", "-nan", "null", "NULL",
    "None", "<NA>", "-1.#IND", "-1.#QNAN", "1.#IND", "1.#QNAN",
];

fn guess_cell_type(s: &str) -> CellValue {
    let t = s.trim();
    if t.is_empty() || NA_VALUES.contains(&t) {
        return CellValue::Null;
    }
    if let Ok(i) = t.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = t.parse::<f64>() {
        return CellValue::Float(f);
    }
    match t {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::Text(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Stock": "ACME", "Date": "2020-01-01", "Price": 10.5, "Classification": "Low" },
///   ...
/// ]
/// ```
///
/// Column order is the key order of the first record; keys first seen in
/// later records are appended.
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows: Vec<Vec<CellValue>> = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect::<Vec<_>>()
        })
        .collect();

    Ok(RawTable { columns, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) if s.is_empty() => CellValue::Null,
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RawTable> {
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

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        if batch.num_columns() != columns.len() {
            bail!(
                "record batch has {} columns, schema has {}",
                batch.num_columns(),
                columns.len()
            );
        }
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Row {row}"))?;
            rows.push(cells);
        }
    }

    Ok(RawTable { columns, rows })
}

// -- Parquet / Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }

    let cell = match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row).into()),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row).into()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row).into()),
        DataType::UInt16 => CellValue::Integer(col.as_primitive::<UInt16Type>().value(row).into()),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row).into()),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row).into()),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 => datetime_cell(col.as_primitive::<Date32Type>().value_as_datetime(row)),
        DataType::Date64 => datetime_cell(col.as_primitive::<Date64Type>().value_as_datetime(row)),
        DataType::Timestamp(unit, _) => datetime_cell(match unit {
            TimeUnit::Second => col.as_primitive::<TimestampSecondType>().value_as_datetime(row),
            TimeUnit::Millisecond => {
                col.as_primitive::<TimestampMillisecondType>().value_as_datetime(row)
            }
            TimeUnit::Microsecond => {
                col.as_primitive::<TimestampMicrosecondType>().value_as_datetime(row)
            }
            TimeUnit::Nanosecond => {
                col.as_primitive::<TimestampNanosecondType>().value_as_datetime(row)
            }
        }),
        _ => CellValue::Text(
            array_value_to_string(col.as_ref(), row).context("formatting parquet value")?,
        ),
    };
    Ok(cell)
}

fn datetime_cell(dt: Option<chrono::NaiveDateTime>) -> CellValue {
    dt.map(CellValue::DateTime).unwrap_or(CellValue::Null)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{Date32Array, Float64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    use super::*;
    use crate::data::filter::{
        classification_options, filtered_entities, ClassificationFilter, ALL_STOCKS,
    };

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    const CSV: &str = "\
Stock,Date, Price ,Volume,Forecast,Low,High,Classification
A,2020-01-01,10,100,10.5,9,11,Low
B,2020-01-01,20,200,20.5,19,21,High
A,2020-01-02,11,110,11.5,10,12,Low
C,2020-01-02,30,300,30.5,29,31,
";

    #[test]
    fn loads_csv_with_positional_columns() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "stocks.csv", CSV);
        let table = load_file(&path).unwrap();

        assert_eq!(table.len(), 4);
        assert_eq!(table.distinct_entities(), vec!["A", "B", "C"]);
        assert_eq!(table.distinct_classifications(), vec!["Low", "High"]);
        assert_eq!(
            table.attribute_names(),
            vec!["Price", "Volume", "Forecast", "Low", "High"]
        );
        assert_eq!(
            filtered_entities(&table, &ClassificationFilter::Only("Low".into())),
            vec!["A"]
        );
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "STOCKS.CSV", CSV);
        assert!(load_file(&path).is_ok());
    }

    #[test]
    fn csv_with_unparseable_dates_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "bad.csv",
            "Stock,When,Price,Classification\nA,soon,1,Low\nB,later,2,High\n",
        );
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::UnparseableDates { column } if column == "When"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let err = load_file(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Read(_)));
        assert!(err.to_string().starts_with("opening CSV"));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "stocks.xlsx", "");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(e) if e == "xlsx"));
    }

    #[test]
    fn short_csv_rows_are_padded_with_missing_values() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "ragged.csv",
            "Stock,Date,Price,Classification\nA,2020-01-01,1,Low\nB,2020-01-02\n",
        );
        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.rows[1].cell(2).is_null());
        assert_eq!(table.distinct_classifications(), vec!["Low"]);
    }

    #[test]
    fn na_placeholders_are_missing_values() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "na.csv",
            "Stock,Date,Price,Classification\n\
A,2020-01-01,1,Low\n\
B,2020-01-01,2,NA\n\
C,2020-01-01,3,NaN\n\
D,2020-01-01,4,N/A\n\
N/A,2020-01-02,5,Low\n",
        );
        let table = load_file(&path).unwrap();
        assert_eq!(classification_options(&table), vec![ALL_STOCKS, "Low"]);
        assert_eq!(table.distinct_entities(), vec!["A", "B", "C", "D"]);
        assert_eq!(
            filtered_entities(&table, &ClassificationFilter::Only("Low".into())),
            vec!["A"]
        );
    }

    #[test]
    fn header_only_csv_has_no_parseable_dates() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "empty.csv", "Stock,Date,Price,Classification\n");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::UnparseableDates { column } if column == "Date"));
    }

    #[test]
    fn guesses_cell_types() {
        assert_eq!(guess_cell_type(""), CellValue::Null);
        assert_eq!(guess_cell_type("42"), CellValue::Integer(42));
        assert_eq!(guess_cell_type(" 42 "), CellValue::Integer(42));
        assert_eq!(guess_cell_type(" 4.5"), CellValue::Float(4.5));
        assert_eq!(guess_cell_type("nan"), CellValue::Null);
        assert_eq!(guess_cell_type("#N/A"), CellValue::Null);
        assert_eq!(guess_cell_type("4.5"), CellValue::Float(4.5));
        assert_eq!(guess_cell_type("True"), CellValue::Bool(true));
        assert_eq!(guess_cell_type("Low"), CellValue::Text("Low".into()));
    }

    #[test]
    fn loads_json_records_in_key_order() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "stocks.json",
            r#"[
                {"Stock": "A", "Date": "2020-01-01", "Price": 10, "Classification": "Low"},
                {"Stock": "B", "Date": "2020-01-01", "Price": 20.5, "Classification": null}
            ]"#,
        );
        let table = load_file(&path).unwrap();
        assert_eq!(table.columns, vec!["Stock", "Date", "Price", "Classification"]);
        assert_eq!(table.distinct_classifications(), vec!["Low"]);
        assert_eq!(table.rows[1].cell(2).as_f64(), Some(20.5));
    }

    #[test]
    fn json_keys_first_seen_later_are_appended() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "late.json",
            r#"[
                {"Stock": "A", "Date": "2020-01-01", "Classification": "Low"},
                {"Stock": "B", "Date": "2020-01-02", "Classification": "High", "Price": 7}
            ]"#,
        );
        let table = load_file(&path).unwrap();
        assert_eq!(table.columns, vec!["Stock", "Date", "Classification", "Price"]);
        assert!(table.rows[0].cell(3).is_null());
        assert_eq!(table.rows[1].cell(3).as_f64(), Some(7.0));
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "bad.json", r#"{"Stock": "A"}"#);
        assert!(matches!(load_file(&path), Err(LoadError::Read(_))));
    }

    #[test]
    fn loads_parquet_with_native_dates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stocks.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("Stock", DataType::Utf8, false),
            Field::new("Date", DataType::Date32, false),
            Field::new("Price", DataType::Float64, true),
            Field::new("Classification", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["A", "B"])),
                // 18262 days after the epoch is 2020-01-01.
                Arc::new(Date32Array::from(vec![18262, 18263])),
                Arc::new(Float64Array::from(vec![Some(10.0), None])),
                Arc::new(StringArray::from(vec![Some("Low"), Some("High")])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows[0].date.map(|d| d.to_string()),
            Some("2020-01-01 00:00:00".to_string())
        );
        assert_eq!(table.rows[0].cell(2).as_f64(), Some(10.0));
        assert!(table.rows[1].cell(2).is_null());
        assert_eq!(table.distinct_classifications(), vec!["Low", "High"]);
    }
}

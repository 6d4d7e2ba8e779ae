use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray, Float32Array, Float64Array, LargeStringArray, StringArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CountryRecord, Dataset, TypeKey};

/// Name of the column holding the country label.
pub const COUNTRY_COLUMN: &str = "Country";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a country table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – `Country` column plus one column per type (the default)
/// * `.json`    – `[{ "Country": "...", "INFJ": 0.01, ... }, ...]`
/// * `.parquet` – same columns, `Country` as a string column
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let source = source_label(path);
    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            load_csv_reader(file, &source)
        }
        "json" => load_json(path, &source),
        "parquet" | "pq" => load_parquet(path, &source),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Load from an in-memory file (drag-and-drop delivers bytes on some platforms).
///
/// Parquet needs a file on disk here; CSV and JSON are parsed from the buffer.
pub fn load_bytes(name: &str, bytes: &[u8]) -> Result<Dataset> {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".json") {
        let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;
        records_from_json(&root, name)
    } else if lower.ends_with(".parquet") || lower.ends_with(".pq") {
        bail!("{name}: Parquet files must be opened from disk (File → Open…)")
    } else {
        load_csv_reader(bytes, name)
    }
}

fn source_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with `Country` and the 16 type labels in any
/// order. Extra columns are ignored.
pub fn load_csv_reader<R: Read>(reader: R, source: &str) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    // Zero-byte input: no header, no rows.
    if headers.is_empty() {
        return Ok(Dataset::new(Vec::new(), source));
    }

    let country_idx = headers
        .iter()
        .position(|h| h == COUNTRY_COLUMN)
        .with_context(|| format!("CSV missing '{COUNTRY_COLUMN}' column"))?;
    let type_idx = type_column_indices(|label| headers.iter().position(|h| h == label))
        .context("CSV header")?;

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let country = record.get(country_idx).unwrap_or("").to_string();

        let mut values = [0.0; TypeKey::COUNT];
        for (key, &col) in TypeKey::ALL.iter().zip(type_idx.iter()) {
            let raw = record.get(col).unwrap_or("");
            values[key.index()] = parse_fraction(raw, row_no, *key)?;
        }

        records.push(checked_record(country, values, row_no));
    }

    Ok(Dataset::new(records, source))
}

/// Resolve the column position of every type, failing on the first absent one.
fn type_column_indices(
    mut lookup: impl FnMut(&str) -> Option<usize>,
) -> Result<[usize; TypeKey::COUNT]> {
    let mut out = [0usize; TypeKey::COUNT];
    for key in TypeKey::ALL {
        out[key.index()] =
            lookup(key.as_str()).with_context(|| format!("missing '{key}' column"))?;
    }
    Ok(out)
}

fn parse_fraction(s: &str, row: usize, key: TypeKey) -> Result<f64> {
    let v: f64 = s
        .parse()
        .with_context(|| format!("Row {row}, {key}: '{s}' is not a number"))?;
    finite(v, row, key)
}

/// NaN and infinities are rejected in every format.
fn finite(v: f64, row: usize, key: TypeKey) -> Result<f64> {
    if !v.is_finite() {
        bail!("Row {row}, {key}: {v} is not a finite number");
    }
    Ok(v)
}

/// Out-of-range fractions are kept but reported; the table is not validated further.
fn checked_record(country: String, values: [f64; TypeKey::COUNT], row: usize) -> CountryRecord {
    for key in TypeKey::ALL {
        let v = values[key.index()];
        if !(0.0..=1.0).contains(&v) {
            log::warn!("Row {row} ({country}): {key} = {v} is outside [0, 1]");
        }
    }
    CountryRecord::new(country, values)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Country": "Norway", "INFJ": 0.021, "ISFJ": 0.043, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path, source: &str) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    records_from_json(&root, source)
}

fn records_from_json(root: &JsonValue, source: &str) -> Result<Dataset> {
    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let country = obj
            .get(COUNTRY_COLUMN)
            .and_then(|v| v.as_str())
            .with_context(|| format!("Row {i}: missing or invalid '{COUNTRY_COLUMN}'"))?
            .to_string();

        let mut values = [0.0; TypeKey::COUNT];
        for key in TypeKey::ALL {
            let v = obj
                .get(key.as_str())
                .and_then(|v| v.as_f64())
                .with_context(|| format!("Row {i}, {key}: missing or not a number"))?;
            values[key.index()] = finite(v, i, key)?;
        }

        records.push(checked_record(country, values, i));
    }

    Ok(Dataset::new(records, source))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with a `Country` string column and one float column
/// per type (Float64 or Float32).
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path, source: &str) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let country_idx = schema
            .index_of(COUNTRY_COLUMN)
            .map_err(|_| anyhow::anyhow!("Parquet file missing '{COUNTRY_COLUMN}' column"))?;
        let type_idx = type_column_indices(|label| schema.index_of(label).ok())
            .context("Parquet schema")?;

        let country_col = batch.column(country_idx);

        for row in 0..batch.num_rows() {
            let row_no = records.len();
            let country = extract_string(country_col, row)
                .with_context(|| format!("Row {row_no}: failed to read '{COUNTRY_COLUMN}'"))?;

            let mut values = [0.0; TypeKey::COUNT];
            for key in TypeKey::ALL {
                let v = extract_f64(batch.column(type_idx[key.index()]), row)
                    .with_context(|| format!("Row {row_no}: failed to read '{key}'"))?;
                values[key.index()] = finite(v, row_no, key)?;
            }

            records.push(checked_record(country, values, row_no));
        }
    }

    Ok(Dataset::new(records, source))
}

// -- Parquet / Arrow helpers --

fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value in string column");
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<LargeStringArray>()
                .context("expected LargeStringArray")?;
            Ok(arr.value(row).to_string())
        }
        DataType::Utf8View => Ok(col.as_string_view().value(row).to_string()),
        other => bail!("Expected string column, got {other:?}"),
    }
}

fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value in numeric column");
    }
    if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
        Ok(arr.value(row))
    } else if let Some(arr) = col.as_any().downcast_ref::<Float32Array>() {
        Ok(arr.value(row) as f64)
    } else {
        bail!("Expected Float64 or Float32 column, got {:?}", col.data_type())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{ArrayRef, Float64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const HEADER: &str =
        "Country,INFJ,ISFJ,INTP,ISFP,ENTP,INFP,ENTJ,ISTP,INTJ,ESFP,ESTJ,ENFP,ESTP,ISTJ,ENFJ,ESFJ";

    fn row(country: &str, first: f64) -> String {
        let mut cells = vec![country.to_string(), first.to_string()];
        cells.extend((1..TypeKey::COUNT).map(|i| format!("{:.3}", i as f64 / 100.0)));
        cells.join(",")
    }

    #[test]
    fn csv_with_standard_header() {
        let text = format!("{HEADER}\n{}\n{}\n", row("Brazil", 0.02), row("Chile", 0.03));
        let ds = load_csv_reader(text.as_bytes(), "inline.csv").unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.source, "inline.csv");
        assert_eq!(ds.records[0].country, "Brazil");
        assert_eq!(ds.records[1].value(TypeKey::Infj), 0.03);
        assert_eq!(ds.records[1].value(TypeKey::Esfj), 0.15);
    }

    #[test]
    fn csv_columns_in_any_order_with_extras() {
        let mut cols: Vec<&str> = TypeKey::ALL.iter().rev().map(|k| k.as_str()).collect();
        cols.insert(3, "Country");
        cols.push("Population");
        let header = cols.join(",");
        let cells: Vec<String> = cols
            .iter()
            .map(|c| match *c {
                "Country" => "Peru".to_string(),
                "Population" => "33000000".to_string(),
                "INTJ" => "0.5".to_string(),
                _ => "0.01".to_string(),
            })
            .collect();
        let text = format!("{header}\n{}\n", cells.join(","));
        let ds = load_csv_reader(text.as_bytes(), "x").unwrap();
        assert_eq!(ds.records[0].country, "Peru");
        assert_eq!(ds.records[0].value(TypeKey::Intj), 0.5);
        assert_eq!(ds.records[0].value(TypeKey::Enfp), 0.01);
    }

    #[test]
    fn csv_missing_type_column_fails() {
        let header = HEADER.replace(",ESFJ", "");
        let err = load_csv_reader(format!("{header}\n").as_bytes(), "x").unwrap_err();
        assert!(format!("{err:#}").contains("ESFJ"), "{err:#}");
    }

    #[test]
    fn csv_missing_country_column_fails() {
        let header = HEADER.replace("Country", "Nation");
        assert!(load_csv_reader(format!("{header}\n").as_bytes(), "x").is_err());
    }

    #[test]
    fn csv_non_numeric_value_fails() {
        let bad = row("Fiji", 0.1).replacen("0.010", "n/a", 1);
        let err = load_csv_reader(format!("{HEADER}\n{bad}\n").as_bytes(), "x").unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Row 0") && msg.contains("n/a"), "{msg}");
    }

    #[test]
    fn csv_rejects_nan() {
        let bad = row("Fiji", f64::NAN);
        assert!(load_csv_reader(format!("{HEADER}\n{bad}\n").as_bytes(), "x").is_err());
    }

    #[test]
    fn csv_header_only_is_empty_dataset() {
        let ds = load_csv_reader(format!("{HEADER}\n").as_bytes(), "x").unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn csv_zero_byte_is_empty_dataset() {
        let ds = load_csv_reader(&b""[..], "empty.csv").unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.source, "empty.csv");
        assert!(load_bytes("empty.csv", b"").unwrap().is_empty());
    }

    #[test]
    fn parquet_bytes_are_rejected_by_name() {
        let err = load_bytes("countries.parquet", b"PAR1").unwrap_err();
        assert!(format!("{err:#}").contains("Parquet"), "{err:#}");
    }

    #[test]
    fn load_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("countries.csv");
        let mut f = std::fs::File::create(&csv_path).unwrap();
        writeln!(f, "{HEADER}\n{}", row("Kenya", 0.04)).unwrap();
        let ds = load_file(&csv_path).unwrap();
        assert_eq!(ds.source, "countries.csv");
        assert_eq!(ds.records[0].country, "Kenya");

        let txt_path = dir.path().join("countries.txt");
        std::fs::write(&txt_path, "").unwrap();
        assert!(load_file(&txt_path).is_err());

        assert!(load_file(&dir.path().join("absent.csv")).is_err());
    }

    #[test]
    fn json_records() {
        let mut obj = serde_json::Map::new();
        obj.insert("Country".into(), "Japan".into());
        for key in TypeKey::ALL {
            obj.insert(key.as_str().into(), 0.0625.into());
        }
        let text = serde_json::to_vec(&JsonValue::Array(vec![JsonValue::Object(obj)])).unwrap();

        let ds = load_bytes("data.json", &text).unwrap();
        assert_eq!(ds.records[0].country, "Japan");
        assert_eq!(ds.records[0].value(TypeKey::Istp), 0.0625);

        assert!(load_bytes("data.json", br#"[{"Country": "Japan"}]"#).is_err());
        assert!(load_bytes("data.json", br#"{"Country": "Japan"}"#).is_err());
    }

    fn write_parquet(path: &Path, countries: Vec<&str>, column: impl Fn(usize) -> Vec<f64>) {
        let mut fields = vec![Field::new(COUNTRY_COLUMN, DataType::Utf8, false)];
        let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(countries))];
        for key in TypeKey::ALL {
            fields.push(Field::new(key.as_str(), DataType::Float64, false));
            columns.push(Arc::new(Float64Array::from(column(key.index()))));
        }
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let file = std::fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn parquet_rejects_nan() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.parquet");
        write_parquet(&path, vec!["Good", "Bad"], |i| {
            if i == TypeKey::Infp.index() {
                vec![0.5, f64::NAN]
            } else {
                vec![0.01, 0.01]
            }
        });

        let err = load_file(&path).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Row 1") && msg.contains("INFP"), "{msg}");
    }

    #[test]
    fn parquet_rejects_infinity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inf.parquet");
        write_parquet(&path, vec!["Only"], |i| {
            vec![if i == 0 { f64::INFINITY } else { 0.0 }]
        });
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn parquet_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("countries.parquet");
        write_parquet(&path, vec!["Ghana", "Iceland"], |i| {
            let v = i as f64 / 100.0;
            vec![v, v * 2.0]
        });

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[1].country, "Iceland");
        assert_eq!(ds.records[1].value(TypeKey::Esfj), 0.30);
    }
}

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::error::DataError;
use super::model::{Passenger, PassengerTable};

/// Columns every input file must carry.
const REQUIRED_COLUMNS: [&str; 4] = ["Pclass", "Sex", "Survived", "Name"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a passenger table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with Kaggle column names (recommended)
/// * `.json`    – `[{ "Pclass": 3, "Sex": "male", ... }, ...]`
/// * `.parquet` – flat columns with the same names
///
/// Any malformed record fails the whole load.
pub fn load_file(path: &Path) -> Result<PassengerTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let passengers = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => return Err(DataError::UnsupportedExtension(other.to_string()).into()),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    Ok(PassengerTable::from_passengers(passengers))
}

// ---------------------------------------------------------------------------
// Raw row shared by the CSV and JSON readers
// ---------------------------------------------------------------------------

/// One input row before validation. Unknown columns are ignored.
#[derive(Debug, Deserialize)]
struct RawPassenger {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Pclass")]
    class: i64,
    #[serde(rename = "Sex")]
    sex: String,
    #[serde(rename = "Age", default)]
    age: Option<f64>,
    #[serde(rename = "SibSp", default)]
    sibsp: Option<u32>,
    #[serde(rename = "Parch", default)]
    parch: Option<u32>,
    #[serde(rename = "Fare", default)]
    fare: Option<f64>,
    #[serde(rename = "Embarked", default)]
    port: Option<String>,
    #[serde(rename = "Survived")]
    survived: i64,
}

impl RawPassenger {
    /// Validate and convert; `record` is 1-based for error messages.
    fn into_passenger(self, record: usize) -> Result<Passenger, DataError> {
        let class = match self.class {
            1..=3 => self.class as u8,
            value => return Err(DataError::InvalidClass { record, value }),
        };
        let survived = match self.survived {
            0 => false,
            1 => true,
            value => return Err(DataError::InvalidOutcome { record, value }),
        };

        let sex = self.sex.trim().to_string();
        if sex.is_empty() {
            return Err(DataError::MissingValue { record, column: "Sex" });
        }

        let age = non_negative(self.age, record, "Age")?;
        let fare = non_negative(self.fare, record, "Fare")?;
        let port = self
            .port
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let sibsp = self.sibsp.unwrap_or(0);
        let parch = self.parch.unwrap_or(0);
        if sibsp.checked_add(parch).is_none() {
            return Err(DataError::CountOutOfRange {
                record,
                column: "SibSp + Parch",
                value: u64::from(sibsp) + u64::from(parch),
            });
        }

        Ok(Passenger::new(
            self.name,
            class,
            sex,
            age,
            sibsp,
            parch,
            fare,
            port,
            survived,
        ))
    }
}

fn non_negative(
    value: Option<f64>,
    record: usize,
    column: &'static str,
) -> Result<Option<f64>, DataError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(DataError::InvalidNumber {
            record,
            column,
            value: v,
        }),
        other => Ok(other),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one passenger per row.
/// Empty cells in optional columns are read as missing.
fn load_csv(path: &Path) -> Result<Vec<Passenger>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;

    let headers = reader.headers().context("reading CSV headers")?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            bail!(DataError::MissingColumn(column));
        }
    }

    let mut passengers = Vec::new();
    for (i, result) in reader.deserialize::<RawPassenger>().enumerate() {
        let record = i + 1;
        let raw = result.with_context(|| format!("CSV record {record}"))?;
        passengers.push(raw.into_passenger(record)?);
    }

    log::debug!("parsed {} CSV records from {}", passengers.len(), path.display());
    Ok(passengers)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Pclass": 3, "Sex": "male", "Age": 22.0, "SibSp": 1, "Parch": 0,
///     "Fare": 7.25, "Embarked": "S", "Survived": 0, "Name": "Braund, Mr. Owen Harris" },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<Passenger>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let rows: Vec<RawPassenger> = serde_json::from_str(&text).context("parsing JSON")?;

    rows.into_iter()
        .enumerate()
        .map(|(i, raw)| raw.into_passenger(i + 1).map_err(anyhow::Error::from))
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`): integer columns may be Int32/Int64,
/// numeric columns Float32/Float64, `Survived` may also be Boolean.
fn load_parquet(path: &Path) -> Result<Vec<Passenger>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    for column in REQUIRED_COLUMNS {
        if builder.schema().column_with_name(column).is_none() {
            bail!(DataError::MissingColumn(column));
        }
    }
    let reader = builder.build().context("building parquet reader")?;

    let mut passengers = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let record = passengers.len() + 1;
            let raw = raw_from_batch(&batch, row, record)?;
            passengers.push(raw.into_passenger(record)?);
        }
    }

    Ok(passengers)
}

// -- Parquet / Arrow helpers --

fn raw_from_batch(batch: &RecordBatch, row: usize, record: usize) -> Result<RawPassenger, DataError> {
    let required_int = |column: &'static str| -> Result<i64, DataError> {
        int_at(batch, column, row, record)?.ok_or(DataError::MissingValue { record, column })
    };
    let required_str = |column: &'static str| -> Result<String, DataError> {
        str_at(batch, column, row, record)?.ok_or(DataError::MissingValue { record, column })
    };
    let count = |column: &'static str| -> Result<Option<u32>, DataError> {
        match int_at(batch, column, row, record)? {
            Some(v) if v < 0 => Err(DataError::InvalidNumber {
                record,
                column,
                value: v as f64,
            }),
            Some(v) => u32::try_from(v).map(Some).map_err(|_| DataError::CountOutOfRange {
                record,
                column,
                value: v as u64,
            }),
            None => Ok(None),
        }
    };

    Ok(RawPassenger {
        name: required_str("Name")?,
        class: required_int("Pclass")?,
        sex: required_str("Sex")?,
        age: float_at(batch, "Age", row, record)?,
        sibsp: count("SibSp")?,
        parch: count("Parch")?,
        fare: float_at(batch, "Fare", row, record)?,
        port: str_at(batch, "Embarked", row, record)?,
        survived: required_int("Survived")?,
    })
}

/// Look up a column; absent columns and null cells both read as `None`.
fn cell(batch: &RecordBatch, column: &str, row: usize) -> Option<Arc<dyn Array>> {
    batch
        .column_by_name(column)
        .filter(|col| !col.is_null(row))
        .cloned()
}

fn unsupported(col: &Arc<dyn Array>, column: &'static str, record: usize) -> DataError {
    DataError::UnsupportedType {
        record,
        column,
        data_type: format!("{:?}", col.data_type()),
    }
}

fn int_at(
    batch: &RecordBatch,
    column: &'static str,
    row: usize,
    record: usize,
) -> Result<Option<i64>, DataError> {
    let Some(col) = cell(batch, column, row) else {
        return Ok(None);
    };
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Int64 => any.downcast_ref::<Int64Array>().map(|a| a.value(row)),
        DataType::Int32 => any.downcast_ref::<Int32Array>().map(|a| a.value(row) as i64),
        DataType::Boolean => any.downcast_ref::<BooleanArray>().map(|a| a.value(row) as i64),
        // Pandas promotes integer columns with nulls to float.
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row))
            .filter(|v| v.fract() == 0.0)
            .map(|v| v as i64),
        _ => None,
    };
    value
        .map(Some)
        .ok_or_else(|| unsupported(&col, column, record))
}

fn float_at(
    batch: &RecordBatch,
    column: &'static str,
    row: usize,
    record: usize,
) -> Result<Option<f64>, DataError> {
    let Some(col) = cell(batch, column, row) else {
        return Ok(None);
    };
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Float64 => any.downcast_ref::<Float64Array>().map(|a| a.value(row)),
        DataType::Float32 => any.downcast_ref::<Float32Array>().map(|a| a.value(row) as f64),
        DataType::Int64 => any.downcast_ref::<Int64Array>().map(|a| a.value(row) as f64),
        DataType::Int32 => any.downcast_ref::<Int32Array>().map(|a| a.value(row) as f64),
        _ => None,
    };
    match value {
        // NaN is how Pandas spells a missing float.
        Some(v) if v.is_nan() => Ok(None),
        Some(v) => Ok(Some(v)),
        None => Err(unsupported(&col, column, record)),
    }
}

fn str_at(
    batch: &RecordBatch,
    column: &'static str,
    row: usize,
    record: usize,
) -> Result<Option<String>, DataError> {
    let Some(col) = cell(batch, column, row) else {
        return Ok(None);
    };
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|s| Some(s.value(row).to_string()))
            .ok_or_else(|| unsupported(&col, column, record)),
        DataType::LargeUtf8 => Ok(Some(col.as_string::<i64>().value(row).to_string())),
        _ => Err(unsupported(&col, column, record)),
    }
}

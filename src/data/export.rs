use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray, TimestampMillisecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use super::model::{Column, ColumnLabel, HoboDataset, Value};

/// Timestamp layout written back into Hobo-style CSV.
pub const HOBO_TIMESTAMP_FORMAT: &str = "%m/%d/%y %I:%M:%S %p";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Write a dataset to a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`             – Hobo layout (title, header, rows), readable by the loader
/// * `.json`            – `[{ "timestamp": "...", "Temp, °F (123)": 71.2, ... }, ...]`
/// * `.parquet` / `.pq` – timestamp column plus one column per label
pub fn export_file(dataset: &HoboDataset, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::create(path).context("creating CSV file")?;
            to_hobo_csv(dataset, file)
        }
        "json" => {
            let file = std::fs::File::create(path).context("creating JSON file")?;
            to_json_records(dataset, std::io::BufWriter::new(file))
        }
        "parquet" | "pq" => write_parquet(dataset, path),
        other => bail!("Unsupported export extension: .{other}"),
    }?;

    log::info!(
        "Exported {} rows × {} columns to {}",
        dataset.len(),
        dataset.columns.len(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Write the Hobo layout: title line, header row, data rows.
///
/// The timestamp goes back to the second column. A dataset without data
/// columns gets a `#` row counter in front so the layout still holds.
pub fn to_hobo_csv<W: Write>(dataset: &HoboDataset, writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);

    wtr.write_record([dataset.title.as_str()])
        .context("writing title line")?;

    let counter = ColumnLabel::new("#", None, None);
    let (first, rest) = match dataset.columns.split_first() {
        Some((first, rest)) => (Some(first), rest),
        None => (None, &[][..]),
    };

    let mut header = vec![first.map_or_else(|| counter.to_header(), |c| c.label.to_header())];
    header.push(dataset.index_label.to_header());
    header.extend(rest.iter().map(|c| c.label.to_header()));
    wtr.write_record(&header).context("writing header row")?;

    for (row, ts) in dataset.index.iter().enumerate() {
        let mut record = Vec::with_capacity(header.len());
        record.push(match first {
            Some(col) => col.values[row].to_string(),
            None => (row + 1).to_string(),
        });
        record.push(ts.format(HOBO_TIMESTAMP_FORMAT).to_string());
        record.extend(rest.iter().map(|c| c.values[row].to_string()));
        wtr.write_record(&record)
            .with_context(|| format!("writing row {row}"))?;
    }

    wtr.flush().context("flushing CSV")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Records-oriented JSON, one object per row with keys in column order.
pub fn to_json_records<W: Write>(dataset: &HoboDataset, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, &Records(dataset)).context("writing JSON")?;
    Ok(())
}

struct Records<'a>(&'a HoboDataset);

struct Record<'a> {
    dataset: &'a HoboDataset,
    row: usize,
}

impl Serialize for Records<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for row in 0..self.0.len() {
            seq.serialize_element(&Record {
                dataset: self.0,
                row,
            })?;
        }
        seq.end()
    }
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ds = self.dataset;
        let mut map = serializer.serialize_map(Some(ds.columns.len() + 1))?;
        map.serialize_entry("timestamp", &ds.index[self.row])?;
        for col in &ds.columns {
            map.serialize_entry(&col.label.to_header(), &col.values[self.row])?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Write a single record batch: `timestamp` (ms, no zone) and one nullable
/// column per label. Numeric columns are `Float64`; a column with any text
/// cell is `Utf8`, numbers included, so no cell is dropped.
/// Each field carries its label levels as metadata and the schema carries the
/// file title.
pub fn write_parquet(dataset: &HoboDataset, path: &Path) -> Result<()> {
    let batch = to_record_batch(dataset)?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

pub fn to_record_batch(dataset: &HoboDataset) -> Result<RecordBatch> {
    let mut fields = vec![Field::new(
        "timestamp",
        DataType::Timestamp(TimeUnit::Millisecond, None),
        false,
    )];
    let millis: Vec<i64> = dataset
        .index
        .iter()
        .map(|ts| ts.and_utc().timestamp_millis())
        .collect();
    let mut arrays: Vec<ArrayRef> = vec![Arc::new(TimestampMillisecondArray::from(millis))];

    for col in &dataset.columns {
        let has_text = col.values.iter().any(|v| matches!(v, Value::Text(_)));
        let (data_type, array): (DataType, ArrayRef) = if has_text {
            let text: Vec<Option<String>> = col
                .values
                .iter()
                .map(|v| match v {
                    Value::Missing => None,
                    other => Some(other.to_string()),
                })
                .collect();
            (DataType::Utf8, Arc::new(StringArray::from(text)))
        } else {
            let numbers: Vec<Option<f64>> = col.values.iter().map(Value::as_f64).collect();
            (DataType::Float64, Arc::new(Float64Array::from(numbers)))
        };
        fields.push(Field::new(col.label.to_header(), data_type, true).with_metadata(label_metadata(col)));
        arrays.push(array);
    }

    let metadata = HashMap::from([("title".to_string(), dataset.title.clone())]);
    let schema = Arc::new(Schema::new_with_metadata(fields, metadata));
    RecordBatch::try_new(schema, arrays).context("building record batch")
}

fn label_metadata(col: &Column) -> HashMap<String, String> {
    let [variable, units, serial] = ColumnLabel::LEVEL_NAMES;
    let mut meta = HashMap::from([(variable.to_string(), col.label.variable.clone())]);
    if let Some(unit) = &col.label.unit {
        meta.insert(units.to_string(), unit.clone());
    }
    if let Some(s) = &col.label.serial {
        meta.insert(serial.to_string(), s.clone());
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use arrow::array::{Array, AsArray};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    use crate::data::loader::{parse_hobo, LoadOptions};

    const SAMPLE: &str = "\
Plot Title: 20001
#,\"Date Time, GMT-04:00\",\"Temp, °F (20001)\",\"RH, % (20001)\",Logged
1,07/15/19 10:00:00 AM,71.5,40.2,
2,07/15/19 10:15:00 AM,72.25,,Logged
";

    fn sample() -> HoboDataset {
        parse_hobo(
            Cursor::new(SAMPLE.as_bytes().to_vec()),
            &LoadOptions {
                convert_to_celsius: true,
            },
        )
        .unwrap()
    }

    #[test]
    fn hobo_csv_reads_back_identically() {
        let ds = sample();
        let mut out = Vec::new();
        to_hobo_csv(&ds, &mut out).unwrap();

        let text = String::from_utf8(out.clone()).unwrap();
        assert!(text.starts_with("Plot Title: 20001\n#,\"Date Time, GMT-04:00\","));

        let back = parse_hobo(Cursor::new(out), &LoadOptions::default()).unwrap();
        assert_eq!(back, ds);
    }

    #[test]
    fn json_records_keep_column_order() {
        let ds = sample();
        let mut out = Vec::new();
        to_json_records(&ds, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["timestamp"], "2019-07-15T10:00:00");
        assert_eq!(rows[0]["Temp, °F (20001)"], 71.5);
        assert_eq!(rows[1]["RH, % (20001)"], serde_json::Value::Null);
        assert_eq!(rows[1]["Logged"], "Logged");

        let text = String::from_utf8(out).unwrap();
        let temp_f = text.find("Temp, °F").unwrap();
        let temp_c = text.find("Temp, °C").unwrap();
        assert!(temp_f < temp_c);
    }

    #[test]
    fn parquet_has_one_field_per_label() {
        let ds = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.parquet");
        export_file(&ds, &path).unwrap();

        let file = std::fs::File::open(&path).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();
        let batches: Vec<RecordBatch> = reader.map(|b| b.unwrap()).collect();
        assert_eq!(batches.len(), 1);

        let batch = &batches[0];
        assert_eq!(batch.num_rows(), 2);
        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(
            names,
            vec![
                "timestamp",
                "#",
                "Temp, °F (20001)",
                "RH, % (20001)",
                "Logged",
                "Temp, °C (20001)"
            ]
        );

        let rh = batch
            .column(3)
            .as_primitive::<arrow::datatypes::Float64Type>();
        assert_eq!(rh.value(0), 40.2);
        assert!(rh.is_null(1));

        let logged = batch.column(4).as_string::<i32>();
        assert!(logged.is_null(0));
        assert_eq!(logged.value(1), "Logged");

        let temp = schema.field(2);
        assert_eq!(temp.metadata()["serial_text"], "20001");
        assert_eq!(temp.metadata()["units"], "°F");
    }

    #[test]
    fn mixed_column_is_written_as_text() {
        let mut ds = sample();
        ds.columns[1].values[1] = Value::Text("Coupler Detached".into());
        let batch = to_record_batch(&ds).unwrap();

        let schema = batch.schema();
        assert_eq!(schema.field(2).data_type(), &DataType::Utf8);
        let temp = batch.column(2).as_string::<i32>();
        assert_eq!(temp.value(0), "71.5");
        assert_eq!(temp.value(1), "Coupler Detached");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_file(&sample(), &dir.path().join("out.xlsx")).unwrap_err();
        assert!(err.to_string().contains("Unsupported export extension"));
    }
}

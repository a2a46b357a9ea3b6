use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;

use crate::error::HoboError;

use super::convert::convert_all_temperatures;
use super::header::{decompose_column_name, time_column};
use super::model::{Column, HoboDataset, Value};

/// Timestamp layouts seen in Hobo exports, tried in order. Two-digit years
/// come before four-digit ones because `%Y` would also accept `19`.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%m/%d/%y %I:%M:%S %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%y %I:%M %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// How a file is turned into a [`HoboDataset`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Mirror every `Temp, °F` column into a `Temp, °C` column after loading.
    pub convert_to_celsius: bool,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a Hobo export.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` – Hobo CSV export
/// * `.txt` – the same layout, as written by older HOBOware versions
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<HoboDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" | "txt" => read_hobo_file(path, options),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Read a Hobo CSV file from disk.
pub fn read_hobo_file(path: &Path, options: &LoadOptions) -> Result<HoboDataset> {
    log::info!("Loading {}", path.display());
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    parse_hobo(file, options).with_context(|| format!("reading {}", path.display()))
}

/// Parse Hobo CSV content from any reader.
///
/// Layout:
/// ```text
/// "Plot Title: 10292925 "                         ← title, kept as-is
/// "#","Date Time, GMT-04:00","Temp, °F (10292925)" ← header
/// 1,07/15/19 10:00:00 AM,71.234                   ← data rows
/// ```
pub fn parse_hobo<R: Read>(reader: R, options: &LoadOptions) -> Result<HoboDataset> {
    // The title is the first raw line whatever it holds; the csv reader
    // would skip a blank one and take the header for the title.
    let mut reader = BufReader::new(reader);
    let mut first_line = Vec::new();
    if reader
        .read_until(b'\n', &mut first_line)
        .context("reading title line")?
        == 0
    {
        bail!("file is empty");
    }
    let title = parse_title(&first_line)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = reader.byte_records();

    let headers: Vec<String> = match records.next() {
        Some(record) => record
            .context("reading header row")?
            .iter()
            .map(decode_field)
            .collect(),
        None => bail!("missing header row"),
    };

    let time_idx = time_column(&headers[..])?;
    let index_label = decompose_column_name(&headers[time_idx]);

    let mut columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != time_idx)
        .map(|(_, h)| Column {
            label: decompose_column_name(h),
            values: Vec::new(),
        })
        .collect();

    let mut index = Vec::new();

    for (row_no, result) in records.enumerate() {
        let record = result.with_context(|| format!("CSV data row {row_no}"))?;
        // csv positions count from the line after the title
        let line = record.position().map_or(0, |p| p.line() + 1);
        if record.len() > headers.len() {
            return Err(HoboError::RaggedRow {
                line,
                expected: headers.len(),
                found: record.len(),
            }
            .into());
        }

        let raw_time = record.get(time_idx).map(decode_field).unwrap_or_default();
        index.push(parse_timestamp(&raw_time, line)?);

        let cells = (0..headers.len()).filter(|i| *i != time_idx);
        for (col, field_idx) in columns.iter_mut().zip(cells) {
            let value = match record.get(field_idx) {
                Some(bytes) => Value::parse(&decode_field(bytes)),
                None => Value::Missing,
            };
            col.values.push(value);
        }
    }

    log::debug!(
        "Parsed {} rows, {} data columns ({title})",
        index.len(),
        columns.len()
    );

    let mut dataset = HoboDataset {
        title,
        index_label,
        index,
        columns,
    };

    if options.convert_to_celsius {
        convert_all_temperatures(&mut dataset)?;
    }

    Ok(dataset)
}

/// Parse one Hobo timestamp cell.
pub fn parse_timestamp(raw: &str, line: u64) -> Result<NaiveDateTime, HoboError> {
    let s = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| HoboError::Timestamp {
            line,
            value: s.to_string(),
        })
}

/// Title text of the first line: unquoted, fields re-joined, BOM dropped.
/// A blank line gives an empty title.
fn parse_title(line: &[u8]) -> Result<String> {
    let line = line.strip_prefix(b"\xef\xbb\xbf").unwrap_or(line);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line);
    let title = match reader.byte_records().next() {
        Some(record) => {
            let record = record.context("reading title line")?;
            let fields: Vec<String> = record.iter().map(decode_field).collect();
            fields.join(",")
        }
        None => String::new(),
    };
    Ok(title)
}

/// UTF-8 when valid, otherwise Latin-1 (HOBOware on Windows writes `°` as 0xB0).
fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

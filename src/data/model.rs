use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

// ---------------------------------------------------------------------------
// ColumnLabel – the (variable, unit, serial) triple of a column
// ---------------------------------------------------------------------------

/// Hierarchical label of a data column, decomposed from a Hobo header such as
/// `Temp, °F (10292925)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ColumnLabel {
    pub variable: String,
    pub unit: Option<String>,
    pub serial: Option<String>,
}

impl ColumnLabel {
    /// Names of the three label levels, outermost first.
    pub const LEVEL_NAMES: [&'static str; 3] = ["variable_name", "units", "serial_text"];

    pub fn new(variable: &str, unit: Option<&str>, serial: Option<&str>) -> Self {
        Self {
            variable: variable.to_string(),
            unit: unit.map(str::to_string),
            serial: serial.map(str::to_string),
        }
    }

    /// Same variable and serial, different unit.
    pub fn with_unit(&self, unit: &str) -> Self {
        Self {
            variable: self.variable.clone(),
            unit: Some(unit.to_string()),
            serial: self.serial.clone(),
        }
    }

    /// Recompose the Hobo header text for this label.
    pub fn to_header(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ColumnLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.variable)?;
        if let Some(unit) = &self.unit {
            write!(f, ", {unit}")?;
        }
        if let Some(serial) = &self.serial {
            write!(f, " ({serial})")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Value – a single cell of a data column
// ---------------------------------------------------------------------------

/// One cell. Sensor readings are numbers; logger event columns ("Logged",
/// "Coupler Attached", …) carry text; blank cells are missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Classify a raw CSV field. Blank cells and non-finite numbers
    /// (`NaN`, `inf`) are missing.
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            return Value::Missing;
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Value::Number(v),
            Ok(_) => Value::Missing,
            Err(_) => Value::Text(s.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Missing => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Column / HoboDataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub label: ColumnLabel,
    pub values: Vec<Value>,
}

impl Column {
    /// Whether at least one cell holds a number.
    pub fn is_numeric(&self) -> bool {
        self.values.iter().any(|v| matches!(v, Value::Number(_)))
    }
}

/// Column positions grouped variable → unit → columns, in label order.
pub type Hierarchy = BTreeMap<String, BTreeMap<Option<String>, Vec<usize>>>;

/// A loaded Hobo file: one timestamp per row plus the labeled data columns.
///
/// Every column holds exactly `index.len()` values.
#[derive(Debug, Clone, PartialEq)]
pub struct HoboDataset {
    /// First line of the file ("Plot Title: …").
    pub title: String,
    /// Label decomposed from the timestamp header, e.g. `(Date Time, GMT-04:00)`.
    pub index_label: ColumnLabel,
    pub index: Vec<NaiveDateTime>,
    pub columns: Vec<Column>,
}

impl HoboDataset {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &ColumnLabel> {
        self.columns.iter().map(|c| &c.label)
    }

    pub fn column_position(&self, label: &ColumnLabel) -> Option<usize> {
        self.columns.iter().position(|c| &c.label == label)
    }

    pub fn column(&self, label: &ColumnLabel) -> Option<&Column> {
        self.columns.iter().find(|c| &c.label == label)
    }

    /// All columns filed under `variable` / `unit`, in file order.
    pub fn select(&self, variable: &str, unit: &str) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| c.label.variable == variable && c.label.unit.as_deref() == Some(unit))
            .collect()
    }

    /// Add a derived column. A column already carrying the same label has its
    /// values replaced in place instead.
    pub fn insert_column(&mut self, column: Column) -> &Column {
        debug_assert_eq!(column.values.len(), self.len());
        match self.column_position(&column.label) {
            Some(pos) => {
                self.columns[pos].values = column.values;
                &self.columns[pos]
            }
            None => {
                self.columns.push(column);
                &self.columns[self.columns.len() - 1]
            }
        }
    }

    pub fn hierarchy(&self) -> Hierarchy {
        let mut tree = Hierarchy::new();
        for (pos, col) in self.columns.iter().enumerate() {
            tree.entry(col.label.variable.clone())
                .or_default()
                .entry(col.label.unit.clone())
                .or_default()
                .push(pos);
        }
        tree
    }

    /// Copy keeping only `rows`, in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> HoboDataset {
        HoboDataset {
            title: self.title.clone(),
            index_label: self.index_label.clone(),
            index: rows.iter().map(|&r| self.index[r]).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    label: c.label.clone(),
                    values: rows.iter().map(|&r| c.values[r].clone()).collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 7, 15)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn dataset() -> HoboDataset {
        HoboDataset {
            title: "Plot Title: test".into(),
            index_label: ColumnLabel::new("Date Time", Some("GMT-04:00"), None),
            index: vec![ts(0), ts(1)],
            columns: vec![
                Column {
                    label: ColumnLabel::new("Temp", Some("°F"), Some("1")),
                    values: vec![Value::Number(68.0), Value::Missing],
                },
                Column {
                    label: ColumnLabel::new("RH", Some("%"), Some("1")),
                    values: vec![Value::Number(40.5), Value::Number(41.0)],
                },
                Column {
                    label: ColumnLabel::new("Temp", Some("°F"), Some("2")),
                    values: vec![Value::Number(70.0), Value::Text("bad".into())],
                },
            ],
        }
    }

    #[test]
    fn label_display_recomposes_header() {
        assert_eq!(
            ColumnLabel::new("Temp", Some("°F"), Some("12345")).to_header(),
            "Temp, °F (12345)"
        );
        assert_eq!(ColumnLabel::new("Temp", Some("°F"), None).to_string(), "Temp, °F");
        assert_eq!(ColumnLabel::new("Temp", None, Some("1")).to_string(), "Temp (1)");
        assert_eq!(ColumnLabel::new("#", None, None).to_string(), "#");
    }

    #[test]
    fn value_classification() {
        assert_eq!(Value::parse(" 71.2 "), Value::Number(71.2));
        assert_eq!(Value::parse(""), Value::Missing);
        assert_eq!(Value::parse("Logged"), Value::Text("Logged".into()));
        assert_eq!(Value::parse("NaN"), Value::Missing);
        assert_eq!(Value::parse("-inf"), Value::Missing);
    }

    #[test]
    fn select_returns_sub_table() {
        let ds = dataset();
        let temps = ds.select("Temp", "°F");
        assert_eq!(temps.len(), 2);
        assert_eq!(temps[1].label.serial.as_deref(), Some("2"));
        assert!(ds.select("Temp", "°C").is_empty());
    }

    #[test]
    fn insert_appends_or_replaces() {
        let mut ds = dataset();
        let label = ColumnLabel::new("Temp", Some("°C"), Some("1"));
        ds.insert_column(Column {
            label: label.clone(),
            values: vec![Value::Number(20.0), Value::Missing],
        });
        assert_eq!(ds.columns.len(), 4);

        ds.insert_column(Column {
            label: label.clone(),
            values: vec![Value::Number(21.0), Value::Missing],
        });
        assert_eq!(ds.columns.len(), 4);
        assert_eq!(ds.column(&label).unwrap().values[0], Value::Number(21.0));
    }

    #[test]
    fn hierarchy_groups_by_variable_and_unit() {
        let tree = dataset().hierarchy();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree["Temp"][&Some("°F".to_string())], vec![0, 2]);
        assert_eq!(tree["RH"][&Some("%".to_string())], vec![1]);
    }

    #[test]
    fn take_rows_keeps_labels() {
        let ds = dataset();
        let one = ds.take_rows(&[1]);
        assert_eq!(one.index, vec![ts(1)]);
        assert_eq!(one.columns.len(), 3);
        assert_eq!(one.columns[1].values, vec![Value::Number(41.0)]);
        assert!(ds.take_rows(&[]).is_empty());
    }

    #[test]
    fn values_serialize_untagged() {
        let json = serde_json::to_string(&vec![
            Value::Number(1.5),
            Value::Text("Logged".into()),
            Value::Missing,
        ])
        .unwrap();
        assert_eq!(json, r#"[1.5,"Logged",null]"#);
    }
}

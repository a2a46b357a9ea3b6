use thiserror::Error;

use crate::data::model::ColumnLabel;

/// Failures the data layer can report about a Hobo file or a dataset.
#[derive(Debug, Error)]
pub enum HoboError {
    /// The header row has no second column to use as the timestamp.
    #[error("header row has {found} column(s); the timestamp is expected in column 2")]
    MissingTimeColumn { found: usize },

    /// `line` is the 1-based line of the file, title line included.
    #[error("line {line}: cannot parse timestamp '{value}'")]
    Timestamp { line: u64, value: String },

    #[error("line {line}: expected at most {expected} fields, found {found}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Conversion was requested on a column whose unit is not Fahrenheit.
    #[error("the units of '{label}' are not fahrenheit")]
    NotFahrenheit { label: ColumnLabel },

    #[error("no column labeled '{label}'")]
    ColumnNotFound { label: ColumnLabel },

    #[error("'{label}' row {row}: value is not numeric")]
    NonNumeric { label: ColumnLabel, row: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_column() {
        let label = ColumnLabel::new("RH", Some("%"), Some("20001"));
        let err = HoboError::NotFahrenheit { label };
        assert_eq!(err.to_string(), "the units of 'RH, % (20001)' are not fahrenheit");
    }

    #[test]
    fn ragged_row_message() {
        let err = HoboError::RaggedRow {
            line: 4,
            expected: 3,
            found: 5,
        };
        assert_eq!(err.to_string(), "line 4: expected at most 3 fields, found 5");
    }
}

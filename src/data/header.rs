use crate::error::HoboError;

use super::model::ColumnLabel;

/// Position of the timestamp column in a Hobo header row.
///
/// Hobo exports put a row counter (`#`) first and the timestamp second, so the
/// time column is always the second one.
pub fn time_column<S: AsRef<str>>(headers: &[S]) -> Result<usize, HoboError> {
    if headers.len() < 2 {
        return Err(HoboError::MissingTimeColumn {
            found: headers.len(),
        });
    }
    Ok(1)
}

/// Split a Hobo column name into its variable, unit and serial parts.
///
/// Headers look like `Variable, Unit (SerialNumber)`. A missing `(` leaves the
/// serial empty and a missing `,` leaves the unit empty; this never fails.
pub fn decompose_column_name(col_name: &str) -> ColumnLabel {
    let (head, serial) = match col_name.split_once('(') {
        Some((head, rest)) => {
            let inner = rest.split(['(', ')']).next().unwrap_or(rest);
            (head, Some(inner.trim().to_string()))
        }
        None => (col_name, None),
    };

    let mut parts = head.split(',');
    let variable = parts.next().unwrap_or("").trim().to_string();
    let unit = parts.next().map(|u| u.trim().to_string());

    ColumnLabel {
        variable,
        unit,
        serial,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_header_has_all_three_parts() {
        let label = decompose_column_name("Temp, °F (12345)");
        assert_eq!(label, ColumnLabel::new("Temp", Some("°F"), Some("12345")));
    }

    #[test]
    fn missing_parenthetical_leaves_serial_absent() {
        let label = decompose_column_name("Temp, °F");
        assert_eq!(label.variable, "Temp");
        assert_eq!(label.unit.as_deref(), Some("°F"));
        assert_eq!(label.serial, None);
    }

    #[test]
    fn missing_comma_leaves_unit_absent() {
        let label = decompose_column_name("Temp (12345)");
        assert_eq!(label.variable, "Temp");
        assert_eq!(label.unit, None);
        assert_eq!(label.serial.as_deref(), Some("12345"));
    }

    #[test]
    fn real_hobo_headers() {
        let label = decompose_column_name("Date Time, GMT-04:00");
        assert_eq!(label, ColumnLabel::new("Date Time", Some("GMT-04:00"), None));

        let label = decompose_column_name("RH, % (LGR S/N: 10292925, SEN S/N: 10292925)");
        assert_eq!(label.variable, "RH");
        assert_eq!(label.unit.as_deref(), Some("%"));
        assert_eq!(
            label.serial.as_deref(),
            Some("LGR S/N: 10292925, SEN S/N: 10292925")
        );

        assert_eq!(decompose_column_name("#"), ColumnLabel::new("#", None, None));
    }

    #[test]
    fn unclosed_parenthesis_takes_the_rest() {
        let label = decompose_column_name("Temp, °F (12345");
        assert_eq!(label.serial.as_deref(), Some("12345"));
    }

    #[test]
    fn nested_parenthesis_stops_at_the_first_bracket() {
        let label = decompose_column_name("Temp, °F (12345 (sensor 2))");
        assert_eq!(label.serial.as_deref(), Some("12345"));
    }

    #[test]
    fn extra_commas_are_ignored() {
        let label = decompose_column_name("Temp, °F, avg (1)");
        assert_eq!(label, ColumnLabel::new("Temp", Some("°F"), Some("1")));
    }

    #[test]
    fn time_column_is_second() {
        assert_eq!(time_column(&["#", "Date Time, GMT-04:00", "Temp"][..]).unwrap(), 1);
        assert!(matches!(
            time_column(&["#"][..]),
            Err(HoboError::MissingTimeColumn { found: 1 })
        ));
    }
}

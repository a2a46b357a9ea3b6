pub mod panels;
pub mod plot;
pub mod table;

use chrono::{DateTime, NaiveDateTime};

/// Plot x coordinate for a timestamp: seconds since the Unix epoch.
pub fn to_plot_x(ts: &NaiveDateTime) -> f64 {
    ts.and_utc().timestamp_millis() as f64 / 1000.0
}

/// Inverse of [`to_plot_x`], for axis labels.
pub fn from_plot_x(x: f64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis((x * 1000.0).round() as i64).map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn plot_x_round_trips() {
        let ts = NaiveDate::from_ymd_opt(2019, 7, 15)
            .unwrap()
            .and_hms_opt(10, 15, 0)
            .unwrap();
        assert_eq!(from_plot_x(to_plot_x(&ts)), Some(ts));
    }
}

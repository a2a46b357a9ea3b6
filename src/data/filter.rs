use chrono::{NaiveDate, NaiveDateTime};

use super::model::HoboDataset;

/// Inclusive calendar-day window. An unset bound does not constrain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl TimeWindow {
    /// Datetime bounds covering whole days: `start 00:00:00` to `end 23:59:59.999`.
    pub fn bounds(&self) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
        let start = self.start.and_then(|d| d.and_hms_opt(0, 0, 0));
        let end = self.end.and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999));
        (start, end)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn rows(&self, dataset: &HoboDataset) -> Vec<usize> {
        let (start, end) = self.bounds();
        rows_in_window(dataset, start, end)
    }
}

/// Return indices of rows whose timestamp lies in `[start, end]`.
///
/// The index is not assumed to be sorted; loggers that were relaunched can
/// write out-of-order blocks.
pub fn rows_in_window(
    dataset: &HoboDataset,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Vec<usize> {
    dataset
        .index
        .iter()
        .enumerate()
        .filter(|(_, ts)| start.map_or(true, |s| **ts >= s) && end.map_or(true, |e| **ts <= e))
        .map(|(i, _)| i)
        .collect()
}

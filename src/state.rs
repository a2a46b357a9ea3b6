use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use hobo_viewer::data::filter::TimeWindow;
use hobo_viewer::data::loader::{load_file, LoadOptions};
use hobo_viewer::data::model::{ColumnLabel, HoboDataset};

use crate::color::ColorMap;

/// Which view the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Plot,
    Table,
}

/// One opened Hobo file and the columns ticked for plotting.
pub struct LoadedFile {
    pub path: PathBuf,
    pub dataset: HoboDataset,
    pub visible: BTreeSet<ColumnLabel>,
}

impl LoadedFile {
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    pub files: Vec<LoadedFile>,

    /// Options every file is loaded with.
    pub options: LoadOptions,

    /// Date range applied to both views.
    pub window: TimeWindow,

    pub view: View,

    /// File shown by the table view.
    pub active: usize,

    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load each path and add it to the open files. Failures are collected
    /// into the status line; the other files still load.
    pub fn open_files(&mut self, paths: &[PathBuf]) {
        let mut errors = Vec::new();
        for path in paths {
            match load_file(path, &self.options) {
                Ok(dataset) => {
                    log::info!(
                        "Loaded {} rows with columns {:?}",
                        dataset.len(),
                        dataset.labels().map(|l| l.to_header()).collect::<Vec<_>>()
                    );
                    let visible = default_visible(&dataset);
                    self.files.push(LoadedFile {
                        path: path.clone(),
                        dataset,
                        visible,
                    });
                }
                Err(e) => {
                    log::error!("Failed to load file: {e:#}");
                    errors.push(format!("Error: {e:#}"));
                }
            }
        }
        self.status_message = (!errors.is_empty()).then(|| errors.join("; "));
        self.rebuild_color_map();
    }

    /// Switch °F → °C conversion and reload the open files with it.
    ///
    /// Ticked columns stay ticked; columns the reload adds are ticked too.
    /// If any file fails to reload, nothing changes: the option and every
    /// dataset stay as they were.
    pub fn set_convert_to_celsius(&mut self, on: bool) {
        if self.options.convert_to_celsius == on {
            return;
        }
        let options = LoadOptions {
            convert_to_celsius: on,
            ..self.options
        };

        let mut reloaded = Vec::with_capacity(self.files.len());
        let mut errors = Vec::new();
        for file in &self.files {
            match load_file(&file.path, &options) {
                Ok(dataset) => reloaded.push(dataset),
                Err(e) => {
                    log::error!("Failed to reload {}: {e:#}", file.path.display());
                    errors.push(format!("Error: {e:#}"));
                }
            }
        }
        if !errors.is_empty() {
            self.status_message = Some(errors.join("; "));
            return;
        }

        for (file, dataset) in self.files.iter_mut().zip(reloaded) {
            let before: BTreeSet<ColumnLabel> = file.dataset.labels().cloned().collect();
            let added = default_visible(&dataset)
                .into_iter()
                .filter(|l| !before.contains(l));
            let kept = file
                .visible
                .iter()
                .filter(|l| dataset.column(l).is_some())
                .cloned();
            file.visible = kept.chain(added).collect();
            file.dataset = dataset;
        }
        self.options = options;
        self.status_message = None;
        self.rebuild_color_map();
    }

    /// Rebuild colours for every column of every open file.
    pub fn rebuild_color_map(&mut self) {
        let keys = self.files.iter().enumerate().flat_map(|(i, f)| {
            f.dataset.labels().cloned().map(move |label| (i, label))
        });
        self.color_map = ColorMap::new(keys);
    }

    pub fn toggle_column(&mut self, file: usize, label: &ColumnLabel) {
        let Some(f) = self.files.get_mut(file) else {
            return;
        };
        if !f.visible.remove(label) {
            f.visible.insert(label.clone());
        }
    }

    /// Tick every numeric column of a file.
    pub fn select_all(&mut self, file: usize) {
        if let Some(f) = self.files.get_mut(file) {
            f.visible = f
                .dataset
                .columns
                .iter()
                .filter(|c| c.is_numeric())
                .map(|c| c.label.clone())
                .collect();
        }
    }

    pub fn select_none(&mut self, file: usize) {
        if let Some(f) = self.files.get_mut(file) {
            f.visible.clear();
        }
    }

    pub fn close_file(&mut self, file: usize) {
        if file < self.files.len() {
            self.files.remove(file);
            if self.active >= self.files.len() {
                self.active = self.files.len().saturating_sub(1);
            }
            self.rebuild_color_map();
        }
    }

    pub fn close_all(&mut self) {
        self.files.clear();
        self.active = 0;
        self.rebuild_color_map();
    }

    /// Rows of `file` inside the current time window.
    pub fn visible_rows(&self, file: usize) -> Vec<usize> {
        self.files
            .get(file)
            .map(|f| self.window.rows(&f.dataset))
            .unwrap_or_default()
    }

    /// First calendar day across open files; the date pickers start here.
    pub fn first_day(&self) -> NaiveDate {
        self.files
            .iter()
            .filter_map(|f| f.dataset.index.iter().min())
            .min()
            .map(|ts| ts.date())
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Last calendar day across open files.
    pub fn last_day(&self) -> NaiveDate {
        self.files
            .iter()
            .filter_map(|f| f.dataset.index.iter().max())
            .max()
            .map(|ts| ts.date())
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    pub fn active_file(&self) -> Option<&LoadedFile> {
        self.files.get(self.active)
    }
}

/// Numeric columns other than the `#` row counter.
fn default_visible(dataset: &HoboDataset) -> BTreeSet<ColumnLabel> {
    dataset
        .columns
        .iter()
        .filter(|c| c.is_numeric() && c.label.variable != "#")
        .map(|c| c.label.clone())
        .collect()
}

/// Suggested export file name: the source stem with the new extension.
pub fn export_name(source: &Path, ext: &str) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "hobo".to_string());
    format!("{stem}.{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
Plot Title: 20001
#,\"Date Time, GMT-04:00\",\"Temp, °F (20001)\",\"RH, % (20001)\",Logged
1,07/15/19 10:00:00 AM,71.5,40.2,
2,07/16/19 10:15:00 AM,72.25,41.0,Logged
";

    fn write_sample(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(SAMPLE.as_bytes())
            .unwrap();
        path
    }

    fn temp_f() -> ColumnLabel {
        ColumnLabel::new("Temp", Some("°F"), Some("20001"))
    }

    fn temp_c() -> ColumnLabel {
        ColumnLabel::new("Temp", Some("°C"), Some("20001"))
    }

    #[test]
    fn open_files_ticks_sensor_columns() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::default();
        state.open_files(&[write_sample(dir.path(), "a.csv")]);

        assert_eq!(state.files.len(), 1);
        assert!(state.status_message.is_none());
        let visible = &state.files[0].visible;
        assert!(visible.contains(&temp_f()));
        assert!(!visible.contains(&ColumnLabel::new("#", None, None)));
        assert!(!visible.contains(&ColumnLabel::new("Logged", None, None)));
        assert_eq!(state.color_map.len(), 4);
    }

    #[test]
    fn failed_load_sets_status_and_keeps_others() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::default();
        state.open_files(&[
            dir.path().join("missing.csv"),
            write_sample(dir.path(), "b.csv"),
        ]);
        assert_eq!(state.files.len(), 1);
        assert!(state.status_message.as_deref().unwrap().starts_with("Error:"));
    }

    #[test]
    fn conversion_toggle_reloads_and_keeps_ticks() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::default();
        state.open_files(&[write_sample(dir.path(), "a.csv")]);
        state.toggle_column(0, &ColumnLabel::new("RH", Some("%"), Some("20001")));

        state.set_convert_to_celsius(true);
        let file = &state.files[0];
        assert!(file.dataset.column(&temp_c()).is_some());
        assert!(file.visible.contains(&temp_c()));
        assert!(file.visible.contains(&temp_f()));
        assert!(!file.visible.contains(&ColumnLabel::new("RH", Some("%"), Some("20001"))));

        state.set_convert_to_celsius(false);
        let file = &state.files[0];
        assert!(file.dataset.column(&temp_c()).is_none());
        assert!(!file.visible.contains(&temp_c()));
    }

    #[test]
    fn failed_reload_leaves_conversion_off() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::default();
        let gone = write_sample(dir.path(), "gone.csv");
        state.open_files(&[write_sample(dir.path(), "a.csv"), gone.clone()]);
        std::fs::remove_file(&gone).unwrap();

        state.set_convert_to_celsius(true);
        assert!(!state.options.convert_to_celsius);
        assert!(state.status_message.as_deref().unwrap().starts_with("Error:"));
        for file in &state.files {
            assert!(file.dataset.column(&temp_c()).is_none());
            assert!(!file.visible.contains(&temp_c()));
        }
    }

    #[test]
    fn select_all_none_and_close() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::default();
        state.open_files(&[
            write_sample(dir.path(), "a.csv"),
            write_sample(dir.path(), "b.csv"),
        ]);
        state.select_none(0);
        assert!(state.files[0].visible.is_empty());
        state.select_all(0);
        assert_eq!(state.files[0].visible.len(), 3);

        state.active = 1;
        state.close_file(1);
        assert_eq!(state.files.len(), 1);
        assert_eq!(state.active, 0);
        state.close_all();
        assert!(state.files.is_empty());
    }

    #[test]
    fn window_restricts_rows_and_day_range() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::default();
        state.open_files(&[write_sample(dir.path(), "a.csv")]);
        assert_eq!(state.first_day(), NaiveDate::from_ymd_opt(2019, 7, 15).unwrap());
        assert_eq!(state.last_day(), NaiveDate::from_ymd_opt(2019, 7, 16).unwrap());

        assert_eq!(state.visible_rows(0), vec![0, 1]);
        state.window.start = NaiveDate::from_ymd_opt(2019, 7, 16);
        assert_eq!(state.visible_rows(0), vec![1]);
        assert!(state.visible_rows(5).is_empty());
    }

    #[test]
    fn export_name_swaps_extension() {
        assert_eq!(export_name(Path::new("/logs/shed.csv"), "parquet"), "shed.parquet");
    }
}

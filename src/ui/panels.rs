use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;
use hobo_viewer::data::export::export_file;
use hobo_viewer::data::model::ColumnLabel;

use crate::state::{export_name, AppState, View};

// ---------------------------------------------------------------------------
// Left side panel – files, column hierarchy, time window
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Time window");
    ui.separator();
    time_window(ui, state);
    ui.add_space(8.0);

    ui.heading("Columns");
    ui.separator();

    if state.files.is_empty() {
        ui.label("No file loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let mut close = None;
            for file_idx in 0..state.files.len() {
                let file = &state.files[file_idx];
                let name = file.name();
                let hierarchy = file.dataset.hierarchy();
                let labels: Vec<ColumnLabel> = file.dataset.labels().cloned().collect();
                let numeric: Vec<bool> = file.dataset.columns.iter().map(|c| c.is_numeric()).collect();

                egui::CollapsingHeader::new(RichText::new(&name).strong())
                    .id_salt(("file", file_idx))
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.label(RichText::new(&state.files[file_idx].dataset.title).weak());
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(file_idx);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(file_idx);
                            }
                            if ui
                                .selectable_label(state.active == file_idx, "Table")
                                .on_hover_text("Show this file in the table view")
                                .clicked()
                            {
                                state.active = file_idx;
                                state.view = View::Table;
                            }
                            if ui.small_button("Close").clicked() {
                                close = Some(file_idx);
                            }
                        });

                        for (variable, units) in &hierarchy {
                            for (unit, positions) in units {
                                let heading = match unit {
                                    Some(u) => format!("{variable} [{u}]"),
                                    None => variable.clone(),
                                };
                                ui.label(RichText::new(heading).strong());
                                ui.indent(("unit", file_idx, variable, unit), |ui: &mut Ui| {
                                    for &pos in positions {
                                        let label = &labels[pos];
                                        let text = label.serial.as_deref().unwrap_or("(no serial)");
                                        let color = state.color_map.color_for(file_idx, label);
                                        let mut checked = state.files[file_idx].visible.contains(label);
                                        let response = ui.add_enabled(
                                            numeric[pos],
                                            egui::Checkbox::new(
                                                &mut checked,
                                                RichText::new(text).color(color),
                                            ),
                                        );
                                        if response.changed() {
                                            state.toggle_column(file_idx, label);
                                        }
                                    }
                                });
                            }
                        }
                    });
            }
            if let Some(idx) = close {
                state.close_file(idx);
            }
        });
}

/// Optional start / end day pickers.
fn time_window(ui: &mut Ui, state: &mut AppState) {
    let first = state.first_day();
    let last = state.last_day();

    ui.horizontal(|ui: &mut Ui| {
        let mut has_start = state.window.start.is_some();
        if ui.checkbox(&mut has_start, "From").changed() {
            state.window.start = has_start.then_some(first);
        }
        if let Some(start) = state.window.start.as_mut() {
            ui.add(DatePickerButton::new(start).id_salt("window_start"));
        }
    });

    ui.horizontal(|ui: &mut Ui| {
        let mut has_end = state.window.end.is_some();
        if ui.checkbox(&mut has_end, "To").changed() {
            state.window.end = has_end.then_some(last);
        }
        if let Some(end) = state.window.end.as_mut() {
            ui.add(DatePickerButton::new(end).id_salt("window_end"));
        }
    });

    if !state.window.is_unbounded() && ui.small_button("Clear").clicked() {
        state.window = Default::default();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.active_file().is_some(), egui::Button::new("Export…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Close all").clicked() {
                state.close_all();
                ui.close_menu();
            }
        });

        ui.separator();

        ui.selectable_value(&mut state.view, View::Plot, "Plot");
        ui.selectable_value(&mut state.view, View::Table, "Table");

        ui.separator();

        if ui
            .selectable_label(state.options.convert_to_celsius, "°F → °C")
            .on_hover_text("Add a °C column next to every Fahrenheit temperature")
            .clicked()
        {
            let on = !state.options.convert_to_celsius;
            state.set_convert_to_celsius(on);
        }

        ui.separator();

        if !state.files.is_empty() {
            let rows: usize = state.files.iter().map(|f| f.dataset.len()).sum();
            ui.label(format!("{} file(s), {rows} rows", state.files.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Open Hobo files")
        .add_filter("Hobo exports", &["csv", "txt"])
        .pick_files();

    if let Some(paths) = files {
        state.open_files(&paths);
    }
}

/// Export the active file, restricted to the current time window.
pub fn export_file_dialog(state: &mut AppState) {
    let Some(file) = state.active_file() else {
        return;
    };

    let target = rfd::FileDialog::new()
        .set_title("Export")
        .set_file_name(export_name(&file.path, "parquet"))
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("Hobo CSV", &["csv"])
        .save_file();

    if let Some(path) = target {
        let rows = state.visible_rows(state.active);
        let dataset = file.dataset.take_rows(&rows);
        match export_file(&dataset, &path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

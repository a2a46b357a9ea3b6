use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};
use hobo_viewer::data::model::Value;

use crate::state::AppState;

/// Render the active file's rows inside the time window.
pub fn data_table(ui: &mut Ui, state: &AppState) {
    let Some(file) = state.active_file() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a Hobo file to view readings  (File → Open…)");
        });
        return;
    };

    let ds = &file.dataset;
    let rows = state.visible_rows(state.active);

    ui.label(format!("{}: {} of {} rows", file.name(), rows.len(), ds.len()));
    ui.separator();

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .column(Column::auto().at_least(150.0))
            .columns(Column::auto().at_least(80.0), ds.columns.len())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong(ds.index_label.to_header());
                });
                for col in &ds.columns {
                    header.col(|ui| {
                        ui.strong(col.label.to_header());
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, rows.len(), |mut row| {
                    let r = rows[row.index()];
                    row.col(|ui| {
                        ui.label(ds.index[r].format("%Y-%m-%d %H:%M:%S").to_string());
                    });
                    for col in &ds.columns {
                        row.col(|ui| {
                            ui.label(format_cell(&col.values[r]));
                        });
                    }
                });
            });
    });
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Number(v) => format!("{v:.3}"),
        Value::Text(s) => s.clone(),
        Value::Missing => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_rounded_for_display() {
        assert_eq!(format_cell(&Value::Number(21.944444)), "21.944");
        assert_eq!(format_cell(&Value::Text("Logged".into())), "Logged");
        assert_eq!(format_cell(&Value::Missing), "");
    }
}

use std::collections::BTreeSet;

use eframe::egui::Ui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::state::AppState;

use super::{from_plot_x, to_plot_x};

// ---------------------------------------------------------------------------
// Time series plot (central panel)
// ---------------------------------------------------------------------------

/// Render every ticked column of every open file against time.
pub fn series_plot(ui: &mut Ui, state: &AppState) {
    if state.files.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a Hobo file to view readings  (File → Open…)");
        });
        return;
    }

    // One unit across all ticked columns → use it for the y axis.
    let units: BTreeSet<Option<&str>> = state
        .files
        .iter()
        .flat_map(|f| f.visible.iter().map(|l| l.unit.as_deref()))
        .collect();
    let y_label = match units.iter().next() {
        Some(Some(unit)) if units.len() == 1 => unit.to_string(),
        _ => "Value".to_string(),
    };
    let x_label = state
        .files
        .first()
        .map(|f| f.dataset.index_label.to_header())
        .unwrap_or_default();

    Plot::new("series_plot")
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .x_axis_formatter(|mark, _range| {
            from_plot_x(mark.value)
                .map(|ts| ts.format("%m/%d %H:%M").to_string())
                .unwrap_or_default()
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (file_idx, file) in state.files.iter().enumerate() {
                let rows = state.visible_rows(file_idx);
                let ds = &file.dataset;

                for col in ds.columns.iter().filter(|c| file.visible.contains(&c.label)) {
                    let points: PlotPoints = rows
                        .iter()
                        .filter_map(|&r| {
                            let y = col.values[r].as_f64()?;
                            Some([to_plot_x(&ds.index[r]), y])
                        })
                        .collect();

                    let name = if state.files.len() > 1 {
                        format!("{} · {}", file.name(), col.label)
                    } else {
                        col.label.to_string()
                    };

                    let line = Line::new(points)
                        .name(&name)
                        .color(state.color_map.color_for(file_idx, &col.label))
                        .width(1.5);

                    plot_ui.line(line);
                }
            }
        });
}

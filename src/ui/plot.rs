use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::color::generate_palette;
use crate::data::dates::{from_plot_x, to_plot_x};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Comparison chart (central panel)
// ---------------------------------------------------------------------------

/// Render the comparison chart in the central panel.
pub fn comparison_plot(ui: &mut Ui, state: &AppState) {
    let Some(chart) = &state.chart else {
        ui.centered_and_justified(|ui: &mut Ui| {
            let hint = if state.table.is_none() {
                "Open a file to compare stocks  (File → Open…)"
            } else {
                "Pick two stocks and press Show Predictions"
            };
            ui.heading(hint);
        });
        return;
    };

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(&chart.title);
    });

    if chart.traces.iter().all(|t| t.points.is_empty()) {
        ui.colored_label(Color32::YELLOW, "No numeric values to plot for this selection.");
    }

    let colors = generate_palette(chart.traces.len());

    Plot::new("comparison_plot")
        .legend(Legend::default())
        .show_grid(true)
        .x_axis_label(chart.x_label.clone())
        .y_axis_label(chart.y_label.clone())
        .x_axis_formatter(|mark, _range| {
            from_plot_x(mark.value)
                .map(|dt| dt.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .label_formatter(|name, value| {
            let date = from_plot_x(value.x)
                .map(|dt| dt.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            if name.is_empty() {
                format!("{date}\n{:.4}", value.y)
            } else {
                format!("{name}\n{date}\n{:.4}", value.y)
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (trace, color) in chart.traces.iter().zip(colors.iter()) {
                let points: PlotPoints = trace
                    .points
                    .iter()
                    .map(|(dt, v)| [to_plot_x(dt), *v])
                    .collect();

                let line = Line::new(points)
                    .name(&trace.label)
                    .color(*color)
                    .width(1.5);

                plot_ui.line(line);
            }
        });
}

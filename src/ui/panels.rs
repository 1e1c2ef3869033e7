use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

const STATUS_OK: Color32 = Color32::from_rgb(34, 160, 80);

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the left selection panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Compare");
    ui.separator();

    if state.table.is_none() {
        ui.label("No dataset loaded.");
        ui.add_space(4.0);
        if ui.button("Load CSV File").clicked() {
            open_file_dialog(state);
        }
        return;
    }

    // Clone what we need so we can mutate state inside the closures.
    let options = state.options.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Classification (drives both stock dropdowns) ----
            ui.strong("Risk classification");
            let current = Some(state.selection.classification.clone());
            if let Some(picked) = dropdown(ui, "classification", &current, &options.classifications)
            {
                state.select_classification(&picked);
            }
            ui.separator();

            // ---- First stock ----
            ui.strong("Stock");
            if let Some(picked) = dropdown(ui, "stock_a", &state.selection.entity_a, &options.entities)
            {
                state.selection.entity_a = Some(picked);
            }
            ui.label("Data column");
            if let Some(picked) =
                dropdown(ui, "attribute_a", &state.selection.attribute_a, &options.attributes)
            {
                state.selection.attribute_a = Some(picked);
            }
            ui.separator();

            // ---- Second stock ----
            ui.strong("Stock");
            if let Some(picked) = dropdown(ui, "stock_b", &state.selection.entity_b, &options.entities)
            {
                state.selection.entity_b = Some(picked);
            }
            ui.label("Data column");
            if let Some(picked) =
                dropdown(ui, "attribute_b", &state.selection.attribute_b, &options.attributes)
            {
                state.selection.attribute_b = Some(picked);
            }
            ui.separator();

            ui.vertical_centered(|ui: &mut Ui| {
                if ui.button("Show Predictions").clicked() {
                    // Rejections are reported through the status line.
                    let _ = state.request_plot();
                }
            });
        });
}

/// A read-only combo box. Returns the newly picked value, if any.
fn dropdown(ui: &mut Ui, id: &str, current: &Option<String>, values: &[String]) -> Option<String> {
    let mut picked = None;
    let selected_text = current.clone().unwrap_or_default();

    egui::ComboBox::from_id_salt(id)
        .selected_text(&selected_text)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for value in values {
                let is_current = current.as_deref() == Some(value.as_str());
                if ui.selectable_label(is_current, value).clicked() && !is_current {
                    picked = Some(value.clone());
                }
            }
        });

    picked
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
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} rows loaded, {} stocks shown",
                table.len(),
                state.options.entities.len()
            ));
            ui.separator();
        }

        let color = if state.status.is_error() {
            Color32::RED
        } else {
            STATUS_OK
        };
        ui.label(RichText::new(state.status.text()).color(color));
    });
}

// ---------------------------------------------------------------------------
// File dialog / drag-and-drop
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open stock data")
        .add_filter("CSV Files", &["csv"])
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

/// Load the first file dropped onto the window, if any.
pub fn handle_dropped_files(ctx: &egui::Context, state: &mut AppState) {
    let dropped: Option<PathBuf> = ctx.input(|i| {
        i.raw
            .dropped_files
            .iter()
            .find_map(|f| f.path.clone())
    });

    if let Some(path) = dropped {
        log::debug!("File dropped: {}", path.display());
        state.load_path(&path);
    }
}

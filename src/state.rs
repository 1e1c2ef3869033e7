use std::path::Path;

use crate::chart::{build_chart, Chart, ChartRequest};
use crate::data::filter::{classification_options, filtered_entities, ClassificationFilter, ALL_STOCKS};
use crate::data::loader::load_file;
use crate::data::model::StockTable;
use crate::error::SelectionError;

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Status {
    /// Nothing loaded yet.
    #[default]
    Idle,
    /// Last load succeeded; holds the file name.
    Loaded(String),
    Error(String),
}

impl Status {
    pub fn text(&self) -> String {
        match self {
            Status::Idle => "Load a CSV file to begin.".to_string(),
            Status::Loaded(name) => format!("Loaded: {name}"),
            Status::Error(msg) => format!("Error: {msg}"),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

// ---------------------------------------------------------------------------
// Dropdown contents and picks
// ---------------------------------------------------------------------------

/// Values each dropdown currently offers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionOptions {
    pub classifications: Vec<String>,
    /// Shared by both stock dropdowns.
    pub entities: Vec<String>,
    /// Shared by both data-column dropdowns.
    pub attributes: Vec<String>,
}

/// Current pick of each dropdown. `None` is an empty (cleared) dropdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub classification: String,
    pub entity_a: Option<String>,
    pub attribute_a: Option<String>,
    pub entity_b: Option<String>,
    pub attribute_b: Option<String>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded table (None until the user loads a file).
    pub table: Option<StockTable>,
    /// File name of the loaded table.
    pub source: Option<String>,

    pub options: SelectionOptions,
    pub selection: Selection,

    /// Chart from the last successful plot request.
    pub chart: Option<Chart>,

    /// Outcome of the last load or plot request.
    pub status: Status,
}

impl AppState {
    /// Load `path` and, on success, replace the current table.
    ///
    /// A failed load only updates the status line; the previous table and
    /// dropdowns stay as they were.
    pub fn load_path(&mut self, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match load_file(path) {
            Ok(table) => {
                log::info!(
                    "Loaded {name}: {} rows, stock column '{}', date column '{}', columns {:?}",
                    table.len(),
                    table.entity_column(),
                    table.date_column(),
                    table.columns
                );
                self.set_table(table);
                self.status = Status::Loaded(name.clone());
                self.source = Some(name);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status = Status::Error(e.to_string());
            }
        }
    }

    /// Ingest a newly loaded table and reset every dropdown.
    pub fn set_table(&mut self, table: StockTable) {
        let attributes = table.attribute_names();
        self.options = SelectionOptions {
            classifications: classification_options(&table),
            entities: Vec::new(),
            attributes: attributes.clone(),
        };
        self.selection = Selection {
            classification: ALL_STOCKS.to_string(),
            attribute_a: attributes.first().cloned(),
            attribute_b: attributes.first().cloned(),
            ..Selection::default()
        };
        self.table = Some(table);
        self.chart = None;
        self.refresh_entities();
    }

    /// Pick a classification and cascade into the stock dropdowns.
    pub fn select_classification(&mut self, label: &str) {
        self.selection.classification = label.to_string();
        self.refresh_entities();
    }

    /// Recompute the stock dropdowns from the current classification.
    fn refresh_entities(&mut self) {
        let entities = match &self.table {
            Some(table) => filtered_entities(
                table,
                &ClassificationFilter::from_label(&self.selection.classification),
            ),
            None => Vec::new(),
        };
        log::debug!(
            "Classification '{}' → {} stocks",
            self.selection.classification,
            entities.len()
        );

        self.selection.entity_a = entities.first().cloned();
        self.selection.entity_b = entities.first().cloned();
        self.options.entities = entities;
    }

    /// Current picks as a chart request; cleared dropdowns become empty strings.
    pub fn chart_request(&self) -> ChartRequest {
        let pick = |v: &Option<String>| v.clone().unwrap_or_default();
        ChartRequest {
            entity_a: pick(&self.selection.entity_a),
            attribute_a: pick(&self.selection.attribute_a),
            entity_b: pick(&self.selection.entity_b),
            attribute_b: pick(&self.selection.attribute_b),
        }
    }

    /// Build the comparison chart from the current picks.
    ///
    /// On rejection the status line shows the reason and the previous chart
    /// is left in place.
    pub fn request_plot(&mut self) -> Result<(), SelectionError> {
        let request = self.chart_request();
        let result = match &self.table {
            Some(table) => build_chart(table, &request),
            None => Err(SelectionError::NoDataset),
        };

        match result {
            Ok(chart) => {
                log::debug!("Plotting {request:?}");
                self.chart = Some(chart);
                if let Some(name) = &self.source {
                    self.status = Status::Loaded(name.clone());
                }
                Ok(())
            }
            Err(e) => {
                log::warn!("Plot request rejected: {e}");
                self.status = Status::Error(e.to_string());
                Err(e)
            }
        }
    }
}

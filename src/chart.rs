use chrono::NaiveDateTime;

use crate::data::model::StockTable;
use crate::error::SelectionError;

// ---------------------------------------------------------------------------
// Chart request / chart model (independent of rendering)
// ---------------------------------------------------------------------------

/// The picks that drive one comparison chart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartRequest {
    pub entity_a: String,
    pub attribute_a: String,
    pub entity_b: String,
    pub attribute_b: String,
}

/// One line on the chart: a stock's attribute over time.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    /// Legend label (the stock name).
    pub label: String,
    /// `(date, value)` in table row order.
    pub points: Vec<(NaiveDateTime, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub traces: Vec<Trace>,
}

/// Validate `request` against `table` and extract both traces.
///
/// Rows with a missing date or a non-numeric value contribute no point.
pub fn build_chart(table: &StockTable, request: &ChartRequest) -> Result<Chart, SelectionError> {
    let entity_a = non_empty(&request.entity_a).ok_or(SelectionError::MissingEntity("first stock"))?;
    let entity_b =
        non_empty(&request.entity_b).ok_or(SelectionError::MissingEntity("second stock"))?;
    let attribute_a = non_empty(&request.attribute_a)
        .ok_or(SelectionError::MissingAttribute("first data column"))?;
    let attribute_b = non_empty(&request.attribute_b)
        .ok_or(SelectionError::MissingAttribute("second data column"))?;

    let col_a = table
        .attribute_index(attribute_a)
        .ok_or_else(|| SelectionError::UnknownAttribute(attribute_a.to_string()))?;
    let col_b = table
        .attribute_index(attribute_b)
        .ok_or_else(|| SelectionError::UnknownAttribute(attribute_b.to_string()))?;

    let trace = |entity: &str, col: usize| Trace {
        label: entity.to_string(),
        points: table
            .rows_for(entity)
            .filter_map(|row| Some((row.date?, row.cell(col).as_f64()?)))
            .collect(),
    };

    let (title, y_label) = if attribute_a == attribute_b {
        (
            format!("{entity_a} and {entity_b}: Predictions for {attribute_a}"),
            attribute_a.to_string(),
        )
    } else {
        (
            format!("{entity_a} ({attribute_a}) and {entity_b} ({attribute_b})"),
            format!("{attribute_a} / {attribute_b}"),
        )
    };

    Ok(Chart {
        title,
        x_label: "Date".to_string(),
        y_label,
        traces: vec![
            trace(entity_a, col_a),
            trace(entity_b, col_b),
        ],
    })
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

use super::model::{distinct_labels, StockTable};

/// Synthetic classification meaning "no filter".
pub const ALL_STOCKS: &str = "All Stocks";

// ---------------------------------------------------------------------------
// Classification filter: which stocks the entity dropdowns may offer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationFilter {
    /// Every stock in the table.
    All,
    /// Only stocks whose classification equals this label.
    Only(String),
    /// Nothing selected → no stocks.
    Unset,
}

impl ClassificationFilter {
    /// Interpret a dropdown label (whitespace-trimmed).
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "" => ClassificationFilter::Unset,
            ALL_STOCKS => ClassificationFilter::All,
            other => ClassificationFilter::Only(other.to_string()),
        }
    }
}

/// Values offered by the classification dropdown: the sentinel followed by
/// the distinct classifications in first-seen order.
pub fn classification_options(table: &StockTable) -> Vec<String> {
    std::iter::once(ALL_STOCKS.to_string())
        .chain(table.distinct_classifications())
        .collect()
}

/// Distinct stocks passing `filter`, each once, in first-seen order.
pub fn filtered_entities(table: &StockTable, filter: &ClassificationFilter) -> Vec<String> {
    match filter {
        ClassificationFilter::All => table.distinct_entities(),
        ClassificationFilter::Unset => Vec::new(),
        ClassificationFilter::Only(wanted) => distinct_labels(
            table
                .rows
                .iter()
                .filter(|row| {
                    table.classification_of(row).as_label().as_deref() == Some(wanted.as_str())
                })
                .map(|row| table.entity_of(row)),
        ),
    }
}

use thiserror::Error;

// ---------------------------------------------------------------------------
// Recoverable errors surfaced in the status line
// ---------------------------------------------------------------------------

/// Why a file could not be turned into a [`crate::data::model::StockTable`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    /// I/O or format error from one of the readers, with its context chain.
    #[error("{0:#}")]
    Read(anyhow::Error),

    #[error("Expected at least 2 columns (stock, date), found {0}")]
    TooFewColumns(usize),

    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    #[error("Column '{column}' could not be parsed as dates")]
    UnparseableDates { column: String },
}

/// Why a plot request was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Invalid stock or column selected: no dataset loaded")]
    NoDataset,

    #[error("Invalid stock or column selected: {0} is empty")]
    MissingEntity(&'static str),

    #[error("Invalid stock or column selected: {0} is empty")]
    MissingAttribute(&'static str),

    #[error("Invalid stock or column selected: no column named '{0}'")]
    UnknownAttribute(String),
}

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

use chrono::NaiveDateTime;

use super::dates::parse_date;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the loaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Native date/time coming from typed sources (Parquet date/timestamp columns).
    DateTime(NaiveDateTime),
    Null,
}

static NULL: CellValue = CellValue::Null;

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::DateTime(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for plotting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_finite() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Text form used for dropdown labels; `None` for missing values.
    pub fn as_label(&self) -> Option<String> {
        if self.is_null() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// RawTable – what the file readers produce
// ---------------------------------------------------------------------------

/// Header names plus positional rows, before any interpretation.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

// ---------------------------------------------------------------------------
// TableLayout – fixed positional assumptions about the file
// ---------------------------------------------------------------------------

/// Where the stock, date, classification and attribute columns live.
#[derive(Debug, Clone)]
pub struct TableLayout {
    pub entity_index: usize,
    pub date_index: usize,
    pub classification_column: String,
    /// Positions of plottable attribute columns, clipped to the file's width.
    pub attribute_positions: Range<usize>,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            entity_index: 0,
            date_index: 1,
            classification_column: "Classification".to_string(),
            attribute_positions: 2..7,
        }
    }
}

// ---------------------------------------------------------------------------
// StockTable – the validated, loaded dataset
// ---------------------------------------------------------------------------

/// One row of the table with its parsed date.
#[derive(Debug, Clone)]
pub struct Row {
    pub values: Vec<CellValue>,
    /// Parsed date column; `None` when the cell could not be parsed.
    pub date: Option<NaiveDateTime>,
}

impl Row {
    /// Cell at `index`; short rows read as missing.
    pub fn cell(&self, index: usize) -> &CellValue {
        self.values.get(index).unwrap_or(&NULL)
    }
}

/// The full parsed table with its resolved column positions.
#[derive(Debug, Clone)]
pub struct StockTable {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    entity_index: usize,
    date_index: usize,
    classification_index: usize,
    attribute_indices: Vec<usize>,
}

impl StockTable {
    /// Resolve `layout` against `raw` and parse the date column.
    ///
    /// Fails unless at least one row has a parseable date, so a table that
    /// comes back from here is always safe to publish.
    pub fn from_raw(raw: RawTable, layout: &TableLayout) -> Result<Self, LoadError> {
        let RawTable { columns, rows } = raw;

        let needed = layout.entity_index.max(layout.date_index) + 1;
        if columns.len() < needed {
            return Err(LoadError::TooFewColumns(columns.len()));
        }

        let classification_index = columns
            .iter()
            .position(|c| c.trim() == layout.classification_column)
            .ok_or_else(|| LoadError::MissingColumn(layout.classification_column.clone()))?;

        let attribute_indices: Vec<usize> = layout
            .attribute_positions
            .clone()
            .take_while(|&i| i < columns.len())
            .collect();

        let rows: Vec<Row> = rows
            .into_iter()
            .map(|values| {
                let date = values.get(layout.date_index).and_then(parse_date);
                Row { values, date }
            })
            .collect();

        if rows.iter().all(|r| r.date.is_none()) {
            return Err(LoadError::UnparseableDates {
                column: columns[layout.date_index].clone(),
            });
        }

        Ok(Self {
            columns,
            rows,
            entity_index: layout.entity_index,
            date_index: layout.date_index,
            classification_index,
            attribute_indices,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn entity_column(&self) -> &str {
        &self.columns[self.entity_index]
    }

    pub fn date_column(&self) -> &str {
        &self.columns[self.date_index]
    }

    pub fn entity_of<'a>(&self, row: &'a Row) -> &'a CellValue {
        row.cell(self.entity_index)
    }

    pub fn classification_of<'a>(&self, row: &'a Row) -> &'a CellValue {
        row.cell(self.classification_index)
    }

    /// Distinct stock identifiers in first-seen order, missing values skipped.
    pub fn distinct_entities(&self) -> Vec<String> {
        distinct_labels(self.rows.iter().map(|r| self.entity_of(r)))
    }

    /// Distinct classification labels in first-seen order, missing values skipped.
    pub fn distinct_classifications(&self) -> Vec<String> {
        distinct_labels(self.rows.iter().map(|r| self.classification_of(r)))
    }

    /// Trimmed names of the plottable attribute columns.
    pub fn attribute_names(&self) -> Vec<String> {
        self.attribute_indices
            .iter()
            .map(|&i| self.columns[i].trim().to_string())
            .collect()
    }

    /// Column index of the attribute whose trimmed name is `name`.
    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.attribute_indices
            .iter()
            .copied()
            .find(|&i| self.columns[i].trim() == name)
    }

    /// All rows belonging to `entity`, in table order.
    pub fn rows_for<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a Row> + 'a {
        self.rows
            .iter()
            .filter(move |r| self.entity_of(r).as_label().as_deref() == Some(entity))
    }
}

/// Distinct non-missing labels of `values`, each once, in first-seen order.
pub fn distinct_labels<'a>(values: impl Iterator<Item = &'a CellValue>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter_map(CellValue::as_label)
        .filter(|label| seen.insert(label.clone()))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    /// Small table used across the data-layer tests.
    pub(crate) fn sample_raw() -> RawTable {
        RawTable {
            columns: vec![
                "Stock".into(),
                "Date".into(),
                " Price ".into(),
                "Volume".into(),
                "Classification".into(),
            ],
            rows: vec![
                vec![text("A"), text("2020-01-01"), CellValue::Float(10.0), CellValue::Integer(100), text("Low")],
                vec![text("B"), text("2020-01-01"), CellValue::Float(20.0), CellValue::Integer(200), text("High")],
                vec![text("C"), text("2020-01-01"), CellValue::Float(30.0), CellValue::Integer(300), CellValue::Null],
                vec![text("A"), text("2020-01-02"), CellValue::Float(11.0), CellValue::Integer(110), text("Low")],
                vec![text("D"), text("2020-01-02"), CellValue::Float(40.0), CellValue::Integer(400), text("Low")],
            ],
        }
    }

    #[test]
    fn resolves_layout_and_attribute_names() {
        let table = StockTable::from_raw(sample_raw(), &TableLayout::default()).unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.entity_column(), "Stock");
        assert_eq!(table.date_column(), "Date");
        assert_eq!(
            table.attribute_names(),
            vec!["Price", "Volume", "Classification"]
        );
        assert_eq!(table.attribute_index("Price"), Some(2));
        assert_eq!(table.attribute_index(" Volume "), Some(3));
        assert_eq!(table.attribute_index("Stock"), None);
    }

    #[test]
    fn distinct_values_keep_first_seen_order() {
        let table = StockTable::from_raw(sample_raw(), &TableLayout::default()).unwrap();
        assert_eq!(table.distinct_entities(), vec!["A", "B", "C", "D"]);
        assert_eq!(table.distinct_classifications(), vec!["Low", "High"]);
    }

    #[test]
    fn attribute_columns_are_capped_at_five() {
        let columns: Vec<String> = (0..10).map(|i| format!("c{i}")).collect();
        let mut row: Vec<CellValue> = (0..10).map(|i| CellValue::Integer(i)).collect();
        row[1] = text("2021-03-04");
        let mut columns = columns;
        columns[9] = "Classification".into();
        let raw = RawTable { columns, rows: vec![row] };
        let table = StockTable::from_raw(raw, &TableLayout::default()).unwrap();
        assert_eq!(table.attribute_names(), vec!["c2", "c3", "c4", "c5", "c6"]);
    }

    #[test]
    fn rejects_missing_classification_column() {
        let mut raw = sample_raw();
        raw.columns[4] = "Risk".into();
        let err = StockTable::from_raw(raw, &TableLayout::default()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(c) if c == "Classification"));
    }

    #[test]
    fn rejects_single_column_file() {
        let raw = RawTable {
            columns: vec!["Classification".into()],
            rows: vec![vec![text("Low")]],
        };
        let err = StockTable::from_raw(raw, &TableLayout::default()).unwrap_err();
        assert!(matches!(err, LoadError::TooFewColumns(1)));
    }

    #[test]
    fn rejects_when_no_date_parses() {
        let mut raw = sample_raw();
        for row in &mut raw.rows {
            row[1] = text("not a date");
        }
        let err = StockTable::from_raw(raw, &TableLayout::default()).unwrap_err();
        assert!(matches!(err, LoadError::UnparseableDates { column } if column == "Date"));
    }

    #[test]
    fn keeps_rows_with_unparseable_dates_when_some_parse() {
        let mut raw = sample_raw();
        raw.rows[2][1] = text("garbage");
        let table = StockTable::from_raw(raw, &TableLayout::default()).unwrap();
        assert_eq!(table.len(), 5);
        assert!(table.rows[2].date.is_none());
        assert!(table.rows[0].date.is_some());
    }

    #[test]
    fn short_rows_read_as_missing() {
        let row = Row { values: vec![text("A")], date: None };
        assert!(row.cell(3).is_null());
    }
}

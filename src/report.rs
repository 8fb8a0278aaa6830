//! Report rows as handed over by the bookkeeping side: a title, column
//! headers and typed cells.

use serde::{Deserialize, Serialize};

use crate::numeric::format_grouped;
use crate::session::ShapingSession;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
}

/// One table cell. JSON form: `{"type": "currency", "value": 100.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Cell {
    Text(String),
    Number(f64),
    /// Already in percent units.
    Percent(f64),
    /// Egyptian pounds.
    Currency(f64),
    Empty,
}

impl Cell {
    /// Renderer-ready string for a PDF cell.
    pub fn render(&self, session: &ShapingSession) -> String {
        match self {
            Cell::Text(s) => session.shape(s),
            Cell::Number(v) => session.fmt_number(*v, 2),
            Cell::Percent(v) => session.fmt_percent(*v, 1),
            Cell::Currency(v) => session.fmt_currency(*v, 2),
            Cell::Empty => String::new(),
        }
    }

    /// Plain logical-order value for CSV; spreadsheets do their own bidi.
    pub fn csv_field(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(v) | Cell::Currency(v) => format!("{v:.2}"),
            Cell::Percent(v) => format!("{}%", format_grouped(*v, 1).replace(',', "")),
            Cell::Empty => String::new(),
        }
    }
}

impl Report {
    /// Widest row, header included.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.columns.len()))
            .max()
            .unwrap_or(0)
    }

    /// Header row followed by data rows, as CSV fields.
    pub fn csv_rows(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(self.rows.len() + 1);
        if !self.columns.is_empty() {
            rows.push(self.columns.clone());
        }
        rows.extend(
            self.rows
                .iter()
                .map(|row| row.iter().map(Cell::csv_field).collect()),
        );
        rows
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::ResolvedFont;

    const SAMPLE: &str = r#"{
        "title": "ميزان المراجعة",
        "columns": ["الحساب", "الرصيد", "النسبة"],
        "rows": [
            [{"type": "text", "value": "النقدية"}, {"type": "currency", "value": 1500}, {"type": "percent", "value": 12.5}],
            [{"type": "text", "value": "Bank"}, {"type": "number", "value": -20.5}, {"type": "empty"}]
        ]
    }"#;

    #[test]
    fn parses_typed_cells() {
        let r = Report::from_json(SAMPLE).unwrap();
        assert_eq!(r.rows.len(), 2);
        assert_eq!(r.rows[0][1], Cell::Currency(1500.0));
        assert_eq!(r.rows[1][2], Cell::Empty);
        assert_eq!(r.column_count(), 3);
    }

    #[test]
    fn render_routes_cells() {
        let session = ShapingSession::new(ResolvedFont::fallback());
        assert_eq!(Cell::Text("Bank".into()).render(&session), "Bank");
        assert_eq!(
            Cell::Number(-20.5).render(&session),
            "\u{2066}-20.50\u{2069}"
        );
        assert!(Cell::Text("النقدية".into()).render(&session).starts_with('\u{2067}'));
        assert_eq!(Cell::Empty.render(&session), "");
    }

    #[test]
    fn csv_rows_are_plain() {
        let r = Report::from_json(SAMPLE).unwrap();
        let rows = r.csv_rows();
        assert_eq!(rows[0], vec!["الحساب", "الرصيد", "النسبة"]);
        assert_eq!(rows[1], vec!["النقدية", "1500.00", "12.5%"]);
        assert_eq!(rows[2], vec!["Bank", "-20.50", ""]);
    }
}

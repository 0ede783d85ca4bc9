//! Sale-event reconstruction from the ordered journal.
//!
//! The source system writes each logical sale as two adjacent raw lines: a
//! value line (marker 950) immediately followed by a type line (marker 980).
//! Adjacency is the only correlating signal, so the recognizer is a sliding
//! two-row window over the journal in original row order. Malformed
//! sequences produce no event and no error; the loss is part of the format.

use crate::{
    data::{Value, display_cell},
    normalize::{FieldKind, FieldSpec},
    table::Table,
};

pub const OPEN_MARKER: &str = "950";
pub const CLOSE_MARKER: &str = "980";

/// Canonical journal fields. `Sale` and `Cat` are optional dimensions used
/// for date backfill and category filtering; the normalizer injects null
/// placeholders when an extract lacks them.
pub const JOURNAL_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("Line", FieldKind::Text),
    FieldSpec::new("Price", FieldKind::Number),
    FieldSpec::new("Descript", FieldKind::Text),
    FieldSpec::new("Date", FieldKind::Date),
    FieldSpec::new("Sale", FieldKind::Text),
    FieldSpec::new("Cat", FieldKind::Text),
];

/// One reconstructed sale. Amount is never partial: a null or unparseable
/// price lands as 0.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleEvent {
    pub date: Option<Value>,
    pub kind: Option<String>,
    pub amount: f64,
    pub count: u64,
    pub sale: Option<String>,
    pub category: Option<String>,
}

/// Typed accessors over a normalized journal table.
struct JournalView<'a> {
    table: &'a Table,
    line: usize,
    price: usize,
    descript: usize,
    date: usize,
    sale: usize,
    cat: usize,
}

impl<'a> JournalView<'a> {
    fn new(table: &'a Table) -> Option<Self> {
        Some(Self {
            table,
            line: table.column_index("Line")?,
            price: table.column_index("Price")?,
            descript: table.column_index("Descript")?,
            date: table.column_index("Date")?,
            sale: table.column_index("Sale")?,
            cat: table.column_index("Cat")?,
        })
    }

    fn marker(&self, row: usize) -> Option<&str> {
        match self.table.cell(row, self.line) {
            Some(Value::Text(s)) => Some(s.trim()),
            _ => None,
        }
    }

    fn amount(&self, row: usize) -> f64 {
        self.table
            .cell(row, self.price)
            .as_ref()
            .map(Value::as_number)
            .unwrap_or(0.0)
    }

    fn date(&self, row: usize) -> Option<Value> {
        self.table.cell(row, self.date).clone()
    }

    fn text(&self, row: usize, column: usize) -> Option<String> {
        let text = display_cell(self.table.cell(row, column));
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Scans every adjacent row pair unconditionally: a row that closed one pair
/// is still examined as a potential opener of the next.
pub fn reconstruct(journal: &Table) -> Vec<SaleEvent> {
    let Some(view) = JournalView::new(journal) else {
        return Vec::new();
    };
    let rows = journal.row_count();
    if rows < 2 {
        return Vec::new();
    }
    let mut events = Vec::new();
    for i in 0..rows - 1 {
        if view.marker(i) == Some(OPEN_MARKER) && view.marker(i + 1) == Some(CLOSE_MARKER) {
            events.push(SaleEvent {
                date: view.date(i),
                kind: view.text(i + 1, view.descript),
                amount: view.amount(i),
                count: 1,
                sale: view.text(i, view.sale),
                category: view.text(i, view.cat),
            });
        }
    }
    events
}

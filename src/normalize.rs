//! Schema normalization: maps logical field names onto the case-variant
//! physical columns of an extract, so downstream stages always see the
//! canonical schema.
//!
//! For each logical field the first case-insensitive match in column order
//! wins and is renamed to the canonical name. Absent fields are injected
//! with a typed default (numbers → 0, text/dates → null) and reported in
//! the fallback set so callers can tell a real dimension from a placeholder.

use std::collections::BTreeSet;

use log::{debug, warn};

use crate::{
    data::{self, Value},
    table::Table,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// Returns a normalized copy of `table` plus the set of logical fields that
/// had no physical column and were injected as defaults.
pub fn normalize(table: &Table, fields: &[FieldSpec]) -> (Table, BTreeSet<String>) {
    let mut out = table.clone();
    let mut fallbacks = BTreeSet::new();
    for spec in fields {
        match out.column_index_ci(spec.name) {
            Some(idx) => {
                warn_shadowed_variants(&out, idx, spec.name);
                out.columns[idx] = spec.name.to_string();
                coerce_column(&mut out, idx, spec.kind);
            }
            None => {
                out.columns.push(spec.name.to_string());
                let default = default_cell(spec.kind);
                for row in &mut out.rows {
                    row.push(default.clone());
                }
                fallbacks.insert(spec.name.to_string());
            }
        }
    }
    (out, fallbacks)
}

fn default_cell(kind: FieldKind) -> Option<Value> {
    match kind {
        FieldKind::Number => Some(Value::Number(0.0)),
        FieldKind::Text | FieldKind::Date => None,
    }
}

// Duplicate case-variants of the same logical field are order-dependent in
// the source data; surface the shadowed column instead of silently picking.
fn warn_shadowed_variants(table: &Table, chosen: usize, logical: &str) {
    for (idx, column) in table.columns.iter().enumerate() {
        if idx != chosen && column.eq_ignore_ascii_case(logical) {
            warn!(
                "Column '{column}' shadowed by '{}' for logical field '{logical}'",
                table.columns[chosen]
            );
        }
    }
}

fn coerce_column(table: &mut Table, idx: usize, kind: FieldKind) {
    match kind {
        FieldKind::Text => {}
        FieldKind::Number => {
            for row in &mut table.rows {
                if let Some(cell) = row.get_mut(idx)
                    && let Some(Value::Text(text)) = cell
                {
                    let number = data::coerce_number(text);
                    *cell = Some(Value::Number(number));
                }
            }
        }
        FieldKind::Date => coerce_date_column(table, idx),
    }
}

// A date column converts as a whole or not at all: if any populated cell
// fails to parse, every cell keeps its original representation.
fn coerce_date_column(table: &mut Table, idx: usize) {
    let mut parsed = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        match row.get(idx).unwrap_or(&None) {
            None => parsed.push(None),
            Some(Value::Date(d)) => parsed.push(Some(*d)),
            Some(Value::Text(s)) => match data::parse_naive_date(s) {
                Ok(date) => parsed.push(Some(date)),
                Err(_) => {
                    debug!(
                        "Column '{}' kept as text: '{s}' is not a recognizable date",
                        table.columns[idx]
                    );
                    return;
                }
            },
            Some(Value::Number(_)) => return,
        }
    }
    for (row, date) in table.rows.iter_mut().zip(parsed) {
        if let Some(cell) = row.get_mut(idx) {
            *cell = date.map(Value::Date);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const FIELDS: &[FieldSpec] = &[
        FieldSpec::new("Line", FieldKind::Text),
        FieldSpec::new("Price", FieldKind::Number),
        FieldSpec::new("Date", FieldKind::Date),
    ];

    fn text(s: &str) -> Option<Value> {
        Some(Value::Text(s.to_string()))
    }

    #[test]
    fn renames_case_variants_to_canonical_names() {
        let table = Table {
            columns: vec!["LINE".into(), "price".into(), "DATE".into()],
            rows: vec![vec![text("950"), text("10"), text("2024-01-05")]],
        };
        let (normalized, fallbacks) = normalize(&table, FIELDS);
        assert_eq!(normalized.columns, vec!["Line", "Price", "Date"]);
        assert!(fallbacks.is_empty());
        assert_eq!(normalized.cell(0, 1), &Some(Value::Number(10.0)));
        assert_eq!(
            normalized.cell(0, 2),
            &Some(Value::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()))
        );
    }

    #[test]
    fn absent_fields_are_injected_with_typed_defaults() {
        let table = Table {
            columns: vec!["Line".into()],
            rows: vec![vec![text("950")], vec![text("980")]],
        };
        let (normalized, fallbacks) = normalize(&table, FIELDS);
        assert_eq!(normalized.columns, vec!["Line", "Price", "Date"]);
        assert_eq!(
            fallbacks.into_iter().collect::<Vec<_>>(),
            vec!["Date".to_string(), "Price".to_string()]
        );
        assert_eq!(normalized.cell(0, 1), &Some(Value::Number(0.0)));
        assert_eq!(normalized.cell(1, 2), &None);
    }

    #[test]
    fn unparseable_numbers_become_zero() {
        let table = Table {
            columns: vec!["Price".into()],
            rows: vec![vec![text("4.5")], vec![text("free")], vec![None]],
        };
        let (normalized, _) = normalize(&table, &[FieldSpec::new("Price", FieldKind::Number)]);
        assert_eq!(normalized.cell(0, 0), &Some(Value::Number(4.5)));
        assert_eq!(normalized.cell(1, 0), &Some(Value::Number(0.0)));
        assert_eq!(normalized.cell(2, 0), &None);
    }

    #[test]
    fn date_column_falls_back_to_text_when_any_cell_fails() {
        let table = Table {
            columns: vec!["Date".into()],
            rows: vec![vec![text("2024-01-05")], vec![text("not a date")]],
        };
        let (normalized, _) = normalize(&table, &[FieldSpec::new("Date", FieldKind::Date)]);
        assert_eq!(normalized.cell(0, 0), &text("2024-01-05"));
        assert_eq!(normalized.cell(1, 0), &text("not a date"));
    }

    #[test]
    fn all_null_date_column_stays_null() {
        let table = Table {
            columns: vec!["Date".into()],
            rows: vec![vec![None], vec![None]],
        };
        let (normalized, _) = normalize(&table, &[FieldSpec::new("Date", FieldKind::Date)]);
        assert_eq!(normalized.cell(0, 0), &None);
        assert_eq!(normalized.cell(1, 0), &None);
    }

    #[test]
    fn first_case_variant_wins_when_duplicates_coexist() {
        let table = Table {
            columns: vec!["DATE".into(), "Date".into()],
            rows: vec![vec![text("2024-01-05"), text("1999-12-31")]],
        };
        let (normalized, _) = normalize(&table, &[FieldSpec::new("Date", FieldKind::Date)]);
        assert_eq!(normalized.columns[0], "Date");
        assert_eq!(
            normalized.cell(0, 0),
            &Some(Value::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()))
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let table = Table {
            columns: vec!["LINE".into(), "Extra".into()],
            rows: vec![vec![text("950"), text("x")], vec![text("980"), None]],
        };
        let (once, _) = normalize(&table, FIELDS);
        let (twice, fallbacks) = normalize(&once, FIELDS);
        assert_eq!(once, twice);
        assert!(fallbacks.is_empty());
    }

    #[test]
    fn caller_table_is_not_mutated() {
        let table = Table {
            columns: vec!["line".into()],
            rows: vec![vec![text("950")]],
        };
        let _ = normalize(&table, FIELDS);
        assert_eq!(table.columns, vec!["line"]);
        assert_eq!(table.rows[0].len(), 1);
    }
}

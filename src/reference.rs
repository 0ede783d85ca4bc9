//! Reference-table enrichment: store display names, header-table date
//! backfill, and the category inclusion filter. Everything here is
//! left-join shaped — a missing table or column degrades the enrichment,
//! never the pipeline.

use std::collections::HashMap;

use log::{debug, warn};

use crate::{
    data::{Value, display_cell},
    normalize::{self, FieldKind, FieldSpec},
    reconstruct::SaleEvent,
    table::Table,
};

pub const STORE_FIELDS: &[FieldSpec] = &[FieldSpec::new("Name", FieldKind::Text)];

pub const HEADER_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("Sale", FieldKind::Text),
    FieldSpec::new("Date", FieldKind::Date),
];

pub const CATEGORY_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("Cat", FieldKind::Text),
    FieldSpec::new("Code", FieldKind::Text),
    FieldSpec::new("Name", FieldKind::Text),
];

/// First-row `Name` of the store table, falling back to the store id. This
/// substitution never fails.
pub fn store_display_name(store_table: &Table, store_id: &str) -> String {
    if store_table.is_empty() {
        return store_id.to_string();
    }
    let (normalized, fallbacks) = normalize::normalize(store_table, STORE_FIELDS);
    if fallbacks.contains("Name") {
        warn!("Store table has no name column; using store id '{store_id}'");
        return store_id.to_string();
    }
    let idx = normalized
        .column_index("Name")
        .expect("normalized store table has a Name column");
    let name = display_cell(normalized.cell(0, idx));
    if name.trim().is_empty() {
        store_id.to_string()
    } else {
        name
    }
}

/// Fills null event dates from the transaction-header table, keyed on the
/// sale identifier. Only applies when the journal itself had no date column;
/// unmatched sale keys stay null (left join).
pub fn backfill_dates(events: &mut [SaleEvent], header_table: &Table, journal_had_dates: bool) {
    if journal_had_dates {
        return;
    }
    if header_table.is_empty() {
        warn!("Journal has no date column and the header table is missing; dates stay null");
        return;
    }
    let (normalized, fallbacks) = normalize::normalize(header_table, HEADER_FIELDS);
    if fallbacks.contains("Sale") || fallbacks.contains("Date") {
        warn!("Header table lacks sale/date columns; skipping date backfill");
        return;
    }
    let sale_idx = normalized
        .column_index("Sale")
        .expect("normalized header table has a Sale column");
    let date_idx = normalized
        .column_index("Date")
        .expect("normalized header table has a Date column");
    let mut dates: HashMap<String, Value> = HashMap::new();
    for row in 0..normalized.row_count() {
        let key = display_cell(normalized.cell(row, sale_idx));
        if key.is_empty() {
            continue;
        }
        if let Some(date) = normalized.cell(row, date_idx) {
            dates.entry(key).or_insert_with(|| date.clone());
        }
    }
    let mut filled = 0usize;
    for event in events.iter_mut() {
        if event.date.is_none()
            && let Some(sale) = &event.sale
            && let Some(date) = dates.get(sale)
        {
            event.date = Some(date.clone());
            filled += 1;
        }
    }
    debug!("Backfilled {filled} event date(s) from the header table");
}

/// Retains events whose category resolves to the inclusion code.
///
/// When the journal has no category dimension or the category table is
/// unusable, the filter is skipped entirely — absence of the capability
/// must not read as "nothing passes". When it does apply, events with an
/// unmatched or null category are dropped, as in the source system.
pub fn apply_category_filter(
    events: Vec<SaleEvent>,
    category_table: &Table,
    journal_has_category: bool,
    include_code: &str,
) -> Vec<SaleEvent> {
    if !journal_has_category {
        warn!("Journal has no category column; skipping the category filter");
        return events;
    }
    if category_table.is_empty() {
        warn!("Category table missing or empty; skipping the category filter");
        return events;
    }
    let (normalized, fallbacks) = normalize::normalize(category_table, CATEGORY_FIELDS);
    if fallbacks.contains("Cat") || fallbacks.contains("Code") {
        warn!("Category table lacks cat/code columns; skipping the category filter");
        return events;
    }
    let cat_idx = normalized
        .column_index("Cat")
        .expect("normalized category table has a Cat column");
    let code_idx = normalized
        .column_index("Code")
        .expect("normalized category table has a Code column");
    let name_idx = normalized
        .column_index("Name")
        .expect("normalized category table has a Name column");
    let mut index: HashMap<String, (String, String)> = HashMap::new();
    for row in 0..normalized.row_count() {
        let key = display_cell(normalized.cell(row, cat_idx));
        if key.is_empty() {
            continue;
        }
        let code = display_cell(normalized.cell(row, code_idx));
        let name = display_cell(normalized.cell(row, name_idx));
        index.entry(key).or_insert((code, name));
    }

    let before = events.len();
    let retained = events
        .into_iter()
        .filter(|event| {
            let Some(category) = &event.category else {
                return false;
            };
            match index.get(category) {
                Some((code, name)) => {
                    let keep = code == include_code;
                    debug!("Category {category} ({name}) code '{code}': keep={keep}");
                    keep
                }
                None => false,
            }
        })
        .collect::<Vec<_>>();
    debug!(
        "Category filter retained {} of {} event(s)",
        retained.len(),
        before
    );
    retained
}

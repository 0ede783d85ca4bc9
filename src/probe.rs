use anyhow::Result;
use itertools::Itertools;
use log::info;

use crate::{
    cli::ProbeArgs,
    extract, io_utils,
    layout::Layout,
    normalize, reconstruct, reference, table,
};

/// Diagnoses a single store extract: which tables resolve, how the journal
/// schema normalizes, and how many sale events reconstruct. Useful when a
/// store's summary comes out empty and the question is "which input
/// degraded".
pub fn execute(args: &ProbeArgs) -> Result<()> {
    let layout = Layout::resolve(args.layout.as_deref())?;
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let store_id = args
        .store
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_string())
        .unwrap_or_else(|| args.store.display().to_string());
    info!("Probing store extract '{store_id}' at '{}'", args.store.display());

    let read = |name: &str| {
        extract::read_table(
            &args.store,
            name,
            &layout.extension,
            args.delimiter,
            encoding,
        )
    };
    let journal_raw = read(&layout.journal_table);
    let header = read(&layout.header_table);
    let store = read(&layout.store_table);
    let category = read(&layout.category_table);

    let headers = vec![
        "table".to_string(),
        "file".to_string(),
        "rows".to_string(),
        "columns".to_string(),
    ];
    let describe = |role: &str, name: &str, table: &table::Table| {
        vec![
            role.to_string(),
            format!("{name}.{}", layout.extension),
            table.row_count().to_string(),
            table.column_count().to_string(),
        ]
    };
    let rows = vec![
        describe("journal", &layout.journal_table, &journal_raw),
        describe("header", &layout.header_table, &header),
        describe("store", &layout.store_table, &store),
        describe("category", &layout.category_table, &category),
    ];
    table::print_table(&headers, &rows);

    let (journal, fallbacks) = normalize::normalize(&journal_raw, reconstruct::JOURNAL_FIELDS);
    if fallbacks.is_empty() {
        info!("Journal schema: all logical fields present");
    } else {
        info!(
            "Journal schema fallback field(s): [{}]",
            fallbacks.iter().join(", ")
        );
    }
    let events = reconstruct::reconstruct(&journal);
    info!(
        "Store name: '{}'",
        reference::store_display_name(&store, &store_id)
    );
    info!(
        "Reconstructed {} sale event(s) from {} journal row(s)",
        events.len(),
        journal.row_count()
    );
    Ok(())
}

use std::{
    fs,
    path::{Path, PathBuf},
    thread,
};

use anyhow::{Result, anyhow};
use crossbeam::channel;
use encoding_rs::Encoding;
use itertools::Itertools;
use log::{debug, info, warn};

use crate::{
    aggregate,
    cli::{FilterOrder, ReportArgs},
    error::StoreError,
    extract, io_utils,
    layout::Layout,
    normalize, reconstruct, reference,
    report::{self, SummaryRow},
    table::Table,
};

#[derive(Clone, Copy)]
pub struct StoreOptions<'a> {
    pub layout: &'a Layout,
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
    pub filter_order: FilterOrder,
}

pub fn execute(args: &ReportArgs) -> Result<()> {
    if args.month.is_some() && args.year.is_none() {
        return Err(anyhow!("--month requires --year"));
    }
    let layout = Layout::resolve(args.layout.as_deref())?;
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    if let Some(delimiter) = args.delimiter {
        debug!(
            "Using extract delimiter '{}'",
            crate::printable_delimiter(delimiter)
        );
    }
    let options = StoreOptions {
        layout: &layout,
        delimiter: args.delimiter,
        encoding,
        filter_order: args.filter_order,
    };

    let stores = find_store_dirs(&args.input);
    info!(
        "Discovered {} store extract(s) under '{}'",
        stores.len(),
        args.input.display()
    );

    let jobs = args.jobs.unwrap_or_else(num_cpus::get).max(1);
    let mut rows = summarize_stores(&stores, options, jobs);

    if args.year.is_some() {
        let before = rows.len();
        rows.retain(|row| report::matches_period(row, args.year, args.month));
        debug!("Period filter dropped {} row(s)", before - rows.len());
    }

    report::write_report(&rows, args.output.as_deref())?;
    info!(
        "Report complete: {} summary row(s) from {} store(s)",
        rows.len(),
        stores.len()
    );
    Ok(())
}

/// Every immediate subdirectory of the base directory is one store extract;
/// the directory name doubles as the store id. A missing base directory is
/// a warning and an empty report, not a failure.
pub fn find_store_dirs(base: &Path) -> Vec<(String, PathBuf)> {
    let entries = match fs::read_dir(base) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("Cannot enumerate store extracts under {base:?}: {err}");
            return Vec::new();
        }
    };
    entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            Some((name, entry.path()))
        })
        .sorted_by(|a, b| a.0.cmp(&b.0))
        .collect()
}

/// Runs the per-store pipelines on a bounded worker pool. Results carry the
/// store's enumeration index so the union is deterministic regardless of
/// completion order; a failed store is skipped with a diagnostic.
fn summarize_stores(
    stores: &[(String, PathBuf)],
    options: StoreOptions<'_>,
    jobs: usize,
) -> Vec<SummaryRow> {
    if stores.is_empty() {
        return Vec::new();
    }
    let workers = jobs.min(stores.len());
    debug!("Processing {} store(s) on {workers} worker(s)", stores.len());

    let (task_tx, task_rx) = channel::unbounded::<(usize, &(String, PathBuf))>();
    for task in stores.iter().enumerate() {
        let _ = task_tx.send(task);
    }
    drop(task_tx);

    let (result_tx, result_rx) = channel::unbounded();
    thread::scope(|scope| {
        for _ in 0..workers {
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                while let Ok((idx, (store_id, dir))) = task_rx.recv() {
                    let outcome = summarize_store(store_id, dir, options);
                    if result_tx.send((idx, store_id.as_str(), outcome)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        let mut collected = Vec::new();
        for (idx, store_id, outcome) in result_rx.iter() {
            match outcome {
                Ok(rows) => collected.push((idx, rows)),
                Err(err) => warn!("Skipping store '{store_id}': {err}"),
            }
        }
        collected.sort_by_key(|(idx, _)| *idx);
        collected.into_iter().flat_map(|(_, rows)| rows).collect()
    })
}

/// One store's full pipeline: read → normalize → reconstruct → join/filter
/// → aggregate → build. Stages run strictly in order; the reconstructor
/// depends on journal row order that later stages must not disturb.
pub fn summarize_store(
    store_id: &str,
    dir: &Path,
    options: StoreOptions<'_>,
) -> Result<Vec<SummaryRow>, StoreError> {
    fs::read_dir(dir).map_err(|source| StoreError::UnreadableDir {
        dir: dir.to_path_buf(),
        source,
    })?;
    let layout = options.layout;
    let read = |name: &str| {
        extract::read_table(dir, name, &layout.extension, options.delimiter, options.encoding)
    };

    let journal_raw = read(&layout.journal_table);
    if journal_raw.is_empty() {
        warn!("No journal data for store '{store_id}'");
        return Ok(Vec::new());
    }

    let (journal, fallbacks) = normalize::normalize(&journal_raw, reconstruct::JOURNAL_FIELDS);
    if !fallbacks.is_empty() {
        warn!(
            "Store '{store_id}': journal missing field(s) [{}]; using defaults",
            fallbacks.iter().join(", ")
        );
    }
    let mut events = reconstruct::reconstruct(&journal);
    debug!(
        "Store '{store_id}': reconstructed {} sale event(s) from {} journal row(s)",
        events.len(),
        journal.row_count()
    );
    if events.is_empty() {
        return Ok(Vec::new());
    }

    let store_name = reference::store_display_name(&read(&layout.store_table), store_id);
    let journal_has_category = !fallbacks.contains("Cat");
    let journal_had_dates = !fallbacks.contains("Date");
    let category_table = if journal_has_category {
        read(&layout.category_table)
    } else {
        Table::default()
    };
    let header_table = if journal_had_dates {
        Table::default()
    } else {
        read(&layout.header_table)
    };

    events = match options.filter_order {
        FilterOrder::BeforeDateJoin => {
            let mut filtered = reference::apply_category_filter(
                events,
                &category_table,
                journal_has_category,
                &layout.include_code,
            );
            reference::backfill_dates(&mut filtered, &header_table, journal_had_dates);
            filtered
        }
        FilterOrder::AfterDateJoin => {
            reference::backfill_dates(&mut events, &header_table, journal_had_dates);
            reference::apply_category_filter(
                events,
                &category_table,
                journal_has_category,
                &layout.include_code,
            )
        }
    };

    let buckets = aggregate::aggregate(&events);
    Ok(report::build_rows(
        store_id,
        &store_name,
        &layout.currency,
        buckets,
    ))
}

//! Declarative extract layout: which file plays which role inside a store
//! directory, plus the deployment constants the report depends on.
//!
//! Defaults match the legacy store-database export convention (`jnl`, `jnh`,
//! `str`, `cat` tables, `.csv` extension, USD, inclusion code `N`); a YAML
//! layout file can override any subset of them.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    /// Line-level transaction journal table.
    pub journal_table: String,
    /// Transaction-header table used to backfill journal dates.
    pub header_table: String,
    /// Store reference table carrying the display name.
    pub store_table: String,
    /// Category reference table carrying codes and names.
    pub category_table: String,
    /// Filename extension of the extract files.
    pub extension: String,
    /// Fixed currency literal attached to every summary row.
    pub currency: String,
    /// Category code retained by the inclusion filter.
    pub include_code: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            journal_table: "jnl".to_string(),
            header_table: "jnh".to_string(),
            store_table: "str".to_string(),
            category_table: "cat".to_string(),
            extension: "csv".to_string(),
            currency: "USD".to_string(),
            include_code: "N".to_string(),
        }
    }
}

impl Layout {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening layout file {path:?}"))?;
        let layout = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing layout file {path:?}"))?;
        Ok(layout)
    }

    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_layout_matches_export_convention() {
        let layout = Layout::default();
        assert_eq!(layout.journal_table, "jnl");
        assert_eq!(layout.store_table, "str");
        assert_eq!(layout.extension, "csv");
        assert_eq!(layout.currency, "USD");
        assert_eq!(layout.include_code, "N");
    }

    #[test]
    fn partial_layout_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("layout.yaml");
        let mut file = File::create(&path).expect("create layout");
        writeln!(file, "currency: EUR\nextension: tsv").expect("write layout");

        let layout = Layout::resolve(Some(&path)).expect("load layout");
        assert_eq!(layout.currency, "EUR");
        assert_eq!(layout.extension, "tsv");
        assert_eq!(layout.journal_table, "jnl");
    }

    #[test]
    fn unknown_layout_keys_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("layout.yaml");
        let mut file = File::create(&path).expect("create layout");
        writeln!(file, "journal: oops").expect("write layout");

        assert!(Layout::resolve(Some(&path)).is_err());
    }
}

use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures that abort one store's pipeline. Everything milder (missing
/// tables, unparseable values, unrecognized columns) degrades in place and
/// never surfaces as an error; a structural failure skips the store while
/// sibling stores keep processing.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store directory {dir:?} is not readable: {source}")]
    UnreadableDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
}

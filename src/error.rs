//! Error types for loading input tables.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn the input file into a [`Table`](crate::data::model::Table).
#[derive(Error, Debug)]
pub enum LoadError {
    /// The path does not resolve to an existing file.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but is not readable as CSV.
    #[error("Could not parse {} as CSV", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Any other I/O failure while reading the file.
    #[error("Could not read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

use std::path::PathBuf;

use thiserror::Error;

pub mod gz;
pub mod table;

pub use table::{Table, load_table, numeric_column, text_column};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("missing column: {0}")]
    MissingColumn(String),
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
    #[error("parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;

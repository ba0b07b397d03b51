use thiserror::Error;

use crate::options::OptionError;

/// Instruction counter errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("option parsing failed: {0}")]
    Options(#[from] OptionError),
    #[error(transparent)]
    Target(#[from] insncounts_disas::DisasError),
    #[error("counter table: {0}")]
    Table(#[from] insncounts_table::TableError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

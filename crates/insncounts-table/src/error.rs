use std::path::PathBuf;

use thiserror::Error;

/// Counter table errors.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("open {path} failed: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("truncate {path} to {size} bytes failed: {source}")]
    Truncate {
        path: PathBuf,
        size: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("mmap {path} failed: {source}")]
    Map {
        path: PathBuf,
        #[source]
        source: nix::Error,
    },

    #[error("{path} is {actual} bytes, expected at least {expected}")]
    TooSmall {
        path: PathBuf,
        actual: u64,
        expected: u64,
    },

    #[error("invalid table layout: {0}")]
    InvalidLayout(&'static str),

    #[error("count region is full ({capacity} bytes)")]
    CountRegionFull { capacity: usize },

    #[error("name region is full: {needed} bytes needed, {remaining} remaining")]
    NameRegionFull { needed: usize, remaining: usize },

    #[error("invalid mnemonic name {0:?}")]
    InvalidName(String),

    #[error("name offset {0:#x} does not reference a terminated string in the name region")]
    CorruptName(u64),

    #[error("table is attached read-only")]
    ReadOnly,

    #[error("table was attached, only its creator may append")]
    NotWriter,
}

pub type Result<T> = std::result::Result<T, TableError>;

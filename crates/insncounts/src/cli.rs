//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::Parser;
use insncounts::DEFAULT_SHM_ROOT;

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "insncountsctl")]
#[command(about = "Print or reset shared instruction counters")]
#[command(version)]
pub struct Cli {
    /// Guest target name the counters were collected for (e.g. riscv64)
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Reset all counts to zero instead of printing them (any value)
    #[arg(value_name = "RESET")]
    pub reset: Option<String>,

    /// Directory holding the shared counter files
    #[arg(long, value_name = "DIR", default_value = DEFAULT_SHM_ROOT)]
    pub shm_dir: PathBuf,

    /// Enable verbose output (sets RUST_LOG=debug)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress output (only show errors)
    #[arg(short, long, conflicts_with = "verbose")]
    pub silent: bool,
}

impl Cli {
    /// Reset mode is selected by the presence of a second argument.
    #[must_use]
    pub const fn is_reset(&self) -> bool {
        self.reset.is_some()
    }
}

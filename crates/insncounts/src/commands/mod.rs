//! Command implementations.
//!
//! The reader never creates the table and never talks to the writer; it only
//! relies on the shared layout.

mod reset;
mod show;

use crate::cli::Cli;

/// Dispatch to report or reset mode.
pub fn run_command(cli: &Cli) -> i32 {
    if cli.is_reset() {
        reset::cmd_reset(&cli.shm_dir, &cli.target)
    } else {
        show::cmd_show(&cli.shm_dir, &cli.target)
    }
}

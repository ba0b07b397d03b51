//! Reset mode: zero every counter in place.

use std::path::Path;

use insncounts::{AttachMode, CounterTable, TableLayout};
use tracing::{error, info};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};

/// Zero all counts of `target`'s table, keeping its mnemonics.
pub fn cmd_reset(shm_dir: &Path, target: &str) -> i32 {
    let table = match CounterTable::attach(
        shm_dir,
        target,
        TableLayout::default(),
        AttachMode::Maintenance,
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, guest = target, "failed to attach counter table");
            return EXIT_FAILURE;
        }
    };

    match table.reset_counts() {
        Ok(slots) => {
            info!(guest = target, slots, "counters reset");
            EXIT_SUCCESS
        }
        Err(e) => {
            error!(error = %e, guest = target, "failed to reset counters");
            EXIT_FAILURE
        }
    }
}

//! Report mode: print every counter.

use std::io::{self, Write};
use std::path::Path;

use insncounts::report::write_entries;
use insncounts::{AttachMode, CounterTable, TableLayout};
use tracing::error;

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};

/// Print `name<TAB>count` for each allocated slot of `target`'s table.
pub fn cmd_show(shm_dir: &Path, target: &str) -> i32 {
    let table = match CounterTable::attach(
        shm_dir,
        target,
        TableLayout::default(),
        AttachMode::ReadOnly,
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, guest = target, "failed to attach counter table");
            return EXIT_FAILURE;
        }
    };

    let entries = match table.entries() {
        Ok(entries) => entries,
        Err(e) => {
            error!(error = %e, path = %table.path().display(), "failed to read counter table");
            return EXIT_FAILURE;
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = write_entries(&mut out, &entries).and_then(|()| out.flush()) {
        error!(error = %e, "failed to write counters");
        return EXIT_FAILURE;
    }

    EXIT_SUCCESS
}

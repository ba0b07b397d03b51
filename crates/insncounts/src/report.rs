//! Text rendering of counter entries.

use std::fmt::Write as _;
use std::io::{self, Write};

use insncounts_table::Entry;

/// Header of the report printed when the instrumented process exits.
pub const EXIT_REPORT_HEADER: &str = "Collected:\n";

/// One report line: indented name padded to 12 columns, a tab, the count.
#[must_use]
pub fn format_entry(name: &str, count: u64) -> String {
    format!("    {name:<12}\t{count}")
}

/// Write one line per entry, in the order given.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_entries<W: Write>(out: &mut W, entries: &[Entry]) -> io::Result<()> {
    for entry in entries {
        writeln!(out, "{}", format_entry(&entry.name, entry.count))?;
    }
    Ok(())
}

/// Exit report: the header followed by every entry.
#[must_use]
pub fn exit_report(entries: &[Entry]) -> String {
    let mut report = String::from(EXIT_REPORT_HEADER);
    for entry in entries {
        let _ = writeln!(report, "{}", format_entry(&entry.name, entry.count));
    }
    report
}

//! Translation-time metrics using metrics-rs.
//!
//! These describe the instrumentation work done at translation time, not the
//! guest execution counts (those live in the shared table). Nothing is
//! recorded unless the host installs a recorder.

use metrics::{Unit, counter, describe_counter};

/// Why an instruction was not instrumented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    OutOfWindow,
    OutOfBounds,
    Malformed,
    TableFull,
}

impl SkipReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OutOfWindow => "out_of_window",
            Self::OutOfBounds => "out_of_bounds",
            Self::Malformed => "malformed",
            Self::TableFull => "table_full",
        }
    }
}

/// Initialize metric descriptions.
///
/// Call this once at startup to register metric descriptions.
pub fn init() {
    describe_counter!(
        "insncounts_blocks_translated_total",
        Unit::Count,
        "Translated blocks inspected"
    );
    describe_counter!(
        "insncounts_insns_registered_total",
        Unit::Count,
        "Instructions given an inline counter increment"
    );
    describe_counter!(
        "insncounts_insns_skipped_total",
        Unit::Count,
        "Instructions left uncounted, by reason"
    );
    describe_counter!(
        "insncounts_slots_allocated_total",
        Unit::Count,
        "Distinct mnemonics allocated in the counter table"
    );
}

pub fn record_block(registered: u64) {
    counter!("insncounts_blocks_translated_total").increment(1);
    counter!("insncounts_insns_registered_total").increment(registered);
}

pub fn record_skip(reason: SkipReason) {
    counter!("insncounts_insns_skipped_total", "reason" => reason.as_str()).increment(1);
}

pub fn record_slot_allocated() {
    counter!("insncounts_slots_allocated_total").increment(1);
}

//! Mnemonic to slot index for the writer.

use std::sync::atomic::Ordering;

use insncounts_table::{CounterTable, SlotId};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::Result;

/// Deduplicating index from mnemonic to counter slot.
///
/// Each distinct mnemonic gets exactly one slot for the lifetime of the
/// writer. Keys are copied from the table's own name region, never from the
/// disassembly buffer the lookup came from.
#[derive(Debug, Default)]
pub struct InternIndex {
    slots: FxHashMap<Box<str>, SlotId>,
}

impl InternIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot for `name`, allocating one in `table` on first sight.
    ///
    /// # Errors
    ///
    /// Returns an error if the table has no room for a new slot or name.
    pub fn resolve(&mut self, table: &mut CounterTable, name: &str) -> Result<SlotId> {
        if let Some(&slot) = self.slots.get(name) {
            return Ok(slot);
        }

        let slot = table.allocate_slot(name)?;
        let offset = table
            .read_slot(slot)
            .map(|counter| counter.name_offset.load(Ordering::Relaxed))
            .unwrap_or_default();
        let key: Box<str> = table.name_at(offset)?.into();
        debug!(name = %key, slot = slot.0, "new mnemonic");
        self.slots.insert(key, slot);
        Ok(slot)
    }

    /// Slot previously resolved for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<SlotId> {
        self.slots.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

//! The counter table: an append-only slot arena plus a name arena, both
//! living in one shared mapping.

use std::path::Path;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use crate::error::{Result, TableError};
use crate::layout::{Counter, SLOT_SIZE, SlotId, TableLayout, UNUSED_SLOT, table_path};
use crate::region::{AttachMode, SharedRegion};

/// Address-stable handle to a slot's `count` word.
///
/// Handed to the execution engine as the target of an inline add. Valid for
/// as long as the table that produced it stays mapped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterTarget(NonNull<AtomicU64>);

impl CounterTarget {
    /// Raw address of the `u64` count, for engines that patch it into
    /// generated code.
    #[must_use]
    pub const fn as_ptr(self) -> *mut u64 {
        self.0.as_ptr().cast::<u64>()
    }

    /// Atomically add `value` to the count.
    ///
    /// # Safety
    ///
    /// The table this target came from must still be mapped.
    pub unsafe fn add(self, value: u64) {
        unsafe { self.0.as_ref() }.fetch_add(value, Ordering::Relaxed);
    }
}

// Points at an atomic in shared memory.
unsafe impl Send for CounterTarget {}
unsafe impl Sync for CounterTarget {}

/// One allocated slot as seen by a reader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub slot: SlotId,
    pub name: String,
    pub count: u64,
}

/// Shared instruction counter table.
///
/// A writer created with [`CounterTable::create`] owns the growth offsets and
/// is the only process that appends. Attached tables never append (they get
/// `NotWriter`); they walk the slots until the first unused one.
pub struct CounterTable {
    region: SharedRegion,
    layout: TableLayout,
    /// Set only by `create`.
    writer: bool,
    /// Next free slot (writer only).
    next_slot: usize,
    /// Next free byte in the name region, absolute offset (writer only).
    next_name: usize,
}

impl CounterTable {
    /// Create a fresh, empty table for `target_name` under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be opened, resized or mapped.
    pub fn create(root: &Path, target_name: &str, layout: TableLayout) -> Result<Self> {
        let path = table_path(root, target_name);
        let region = SharedRegion::create(&path, layout.total_size())?;
        info!(path = %path.display(), size = layout.total_size(), "created counter table");
        Ok(Self::from_region(region, layout, true))
    }

    /// Attach to the existing table for `target_name` under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file does not exist, is too small, or
    /// cannot be mapped.
    pub fn attach(
        root: &Path,
        target_name: &str,
        layout: TableLayout,
        mode: AttachMode,
    ) -> Result<Self> {
        let path = table_path(root, target_name);
        let region = SharedRegion::attach(&path, layout.total_size(), mode)?;
        Ok(Self::from_region(region, layout, false))
    }

    const fn from_region(region: SharedRegion, layout: TableLayout, writer: bool) -> Self {
        let next_name = layout.count_capacity();
        Self {
            region,
            layout,
            writer,
            next_slot: 0,
            next_name,
        }
    }

    #[must_use]
    pub const fn layout(&self) -> TableLayout {
        self.layout
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.region.path()
    }

    /// Number of slots appended by this writer.
    #[must_use]
    pub const fn allocated(&self) -> usize {
        self.next_slot
    }

    /// Bytes of the name region still free.
    #[must_use]
    pub const fn name_bytes_remaining(&self) -> usize {
        self.layout.total_size() - self.next_name
    }

    // ------------------------------------------------------------------
    // Writer
    // ------------------------------------------------------------------

    /// Append `name` plus a terminating NUL to the name region.
    ///
    /// Returns the absolute offset of the first byte.
    ///
    /// # Errors
    ///
    /// Returns `ReadOnly` or `NotWriter` on an attached table, `InvalidName`
    /// if `name` is empty or contains a NUL, and `NameRegionFull` if it does
    /// not fit.
    pub fn append_name(&mut self, name: &[u8]) -> Result<u64> {
        self.ensure_writer()?;
        if name.is_empty() || name.contains(&0) {
            return Err(TableError::InvalidName(
                String::from_utf8_lossy(name).into_owned(),
            ));
        }

        let needed = name.len() + 1;
        let remaining = self.name_bytes_remaining();
        if needed > remaining {
            return Err(TableError::NameRegionFull { needed, remaining });
        }

        let offset = self.next_name;
        unsafe {
            self.region.copy_from(offset, name);
            self.region.copy_from(offset + name.len(), &[0]);
        }
        self.next_name += needed;
        Ok(offset as u64)
    }

    /// Append a slot pointing at `name_offset` with a zero count.
    ///
    /// # Errors
    ///
    /// Returns `ReadOnly` or `NotWriter` on an attached table and
    /// `CountRegionFull` when no slot is left.
    pub fn append_slot(&mut self, name_offset: u64) -> Result<SlotId> {
        self.ensure_writer()?;
        if self.next_slot >= self.layout.max_slots() {
            return Err(TableError::CountRegionFull {
                capacity: self.layout.count_capacity(),
            });
        }

        let slot = SlotId(self.next_slot);
        let counter = self.counter(slot);
        counter.count.store(0, Ordering::Relaxed);
        // Publish last so a concurrent reader never sees a half-built slot.
        counter.name_offset.store(name_offset, Ordering::Release);
        self.next_slot += 1;
        Ok(slot)
    }

    /// Allocate a new slot for `name`.
    ///
    /// The caller guarantees `name` has not been allocated before.
    ///
    /// # Errors
    ///
    /// Returns an error if either region is full or the table was attached.
    pub fn allocate_slot(&mut self, name: &str) -> Result<SlotId> {
        self.ensure_writer()?;
        if self.next_slot >= self.layout.max_slots() {
            return Err(TableError::CountRegionFull {
                capacity: self.layout.count_capacity(),
            });
        }
        let offset = self.append_name(name.as_bytes())?;
        let slot = self.append_slot(offset)?;
        debug!(name, slot = slot.0, offset, "allocated counter slot");
        Ok(slot)
    }

    /// Inline-add target for `slot`, or `None` past the end of the count region.
    #[must_use]
    pub fn counter_target(&self, slot: SlotId) -> Option<CounterTarget> {
        self.read_slot(slot)
            .map(|counter| CounterTarget(NonNull::from(&counter.count)))
    }

    fn ensure_writer(&self) -> Result<()> {
        self.ensure_writable()?;
        if self.writer {
            Ok(())
        } else {
            Err(TableError::NotWriter)
        }
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.region.is_writable() {
            Ok(())
        } else {
            Err(TableError::ReadOnly)
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Slot by index, or `None` past the end of the count region.
    #[must_use]
    pub fn read_slot(&self, slot: SlotId) -> Option<&Counter> {
        (slot.0 < self.layout.max_slots()).then(|| self.counter(slot))
    }

    /// Slot by byte offset into the count region.
    ///
    /// Returns `None` if the offset is not slot aligned or out of range.
    #[must_use]
    pub fn slot_at(&self, offset: usize) -> Option<&Counter> {
        if offset % SLOT_SIZE != 0 {
            return None;
        }
        self.read_slot(SlotId(offset / SLOT_SIZE))
    }

    /// Name stored at absolute `offset`.
    ///
    /// # Errors
    ///
    /// Returns `CorruptName` if the offset lies outside the name region, the
    /// string is not terminated inside it, or it is not valid UTF-8.
    pub fn name_at(&self, offset: u64) -> Result<&str> {
        let region = self.layout.name_region();
        let start = usize::try_from(offset)
            .ok()
            .filter(|start| region.contains(start))
            .ok_or(TableError::CorruptName(offset))?;
        let bytes = self
            .region
            .bytes(start, region.end - start)
            .ok_or(TableError::CorruptName(offset))?;
        let len = bytes
            .iter()
            .position(|&b| b == 0)
            .ok_or(TableError::CorruptName(offset))?;
        std::str::from_utf8(&bytes[..len]).map_err(|_| TableError::CorruptName(offset))
    }

    fn counter(&self, slot: SlotId) -> &Counter {
        debug_assert!(slot.0 < self.layout.max_slots());
        // Slots are 16 bytes from a page-aligned base, so every slot is
        // 8-byte aligned for the atomics.
        unsafe { &*self.region.as_ptr().add(slot.byte_offset()).cast::<Counter>() }
    }

    // ------------------------------------------------------------------
    // Reader
    // ------------------------------------------------------------------

    /// Number of slots before the first unused one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots().next().is_none()
    }

    /// Allocated slots in allocation order, paired with their name offsets.
    fn slots(&self) -> impl Iterator<Item = (SlotId, &Counter, u64)> {
        (0..self.layout.max_slots())
            .map(SlotId)
            .map(|slot| {
                let counter = self.counter(slot);
                (slot, counter, counter.name_offset.load(Ordering::Acquire))
            })
            .take_while(|&(_, _, offset)| offset != UNUSED_SLOT)
    }

    /// Snapshot every allocated slot in allocation order.
    ///
    /// The walk stops at the first unused slot. Counts may keep moving while
    /// the walk runs, so the snapshot is only consistent per slot.
    ///
    /// # Errors
    ///
    /// Returns `CorruptName` if a slot references an invalid name.
    pub fn entries(&self) -> Result<Vec<Entry>> {
        self.slots()
            .map(|(slot, counter, offset)| {
                Ok(Entry {
                    slot,
                    name: self.name_at(offset)?.to_owned(),
                    count: counter.count.load(Ordering::Relaxed),
                })
            })
            .collect()
    }

    /// Zero every allocated count, leaving names and offsets untouched.
    ///
    /// Returns the number of slots reset. An increment racing the reset may
    /// be lost.
    ///
    /// # Errors
    ///
    /// Returns `ReadOnly` unless attached for maintenance (or created).
    pub fn reset_counts(&self) -> Result<usize> {
        self.ensure_writable()?;
        let mut reset = 0;
        for (_, counter, _) in self.slots() {
            counter.count.store(0, Ordering::Relaxed);
            reset += 1;
        }
        info!(path = %self.path().display(), slots = reset, "reset counter table");
        Ok(reset)
    }
}

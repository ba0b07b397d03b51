//! Binary layout of the shared counter table.
//!
//! ```text
//! offset 0 .. count_capacity:        Counter[] { u64 count; u64 name_offset; }
//! offset count_capacity .. total:    NUL-terminated mnemonic names, densely packed
//! ```
//!
//! The first slot with `name_offset == 0` terminates the table. Names always
//! live past the count region, so a real name offset is never zero.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicU64;

use crate::error::{Result, TableError};

/// Size of one counter slot in bytes.
pub const SLOT_SIZE: usize = size_of::<Counter>();

/// Default count region capacity (128 KiB, 8192 slots).
pub const DEFAULT_COUNT_CAPACITY: usize = 128 * 1024;

/// Default name region capacity (128 KiB).
pub const DEFAULT_NAME_CAPACITY: usize = 128 * 1024;

/// Directory holding the backing files.
pub const DEFAULT_SHM_ROOT: &str = "/dev/shm";

/// Backing file name prefix.
pub const FILE_PREFIX: &str = "insncounts.";

/// `name_offset` value of an unallocated slot.
pub const UNUSED_SLOT: u64 = 0;

/// One counter slot.
///
/// Matches C struct:
/// ```c
/// typedef struct {
///     uint64_t count;
///     uint64_t iname_off;
/// } Counter;
/// ```
///
/// Both words are atomics because the table is shared with another process
/// and the inline increment updates `count` from generated code.
#[repr(C)]
#[derive(Debug, Default)]
pub struct Counter {
    /// Execution tally.
    pub count: AtomicU64,
    /// Absolute offset of the NUL-terminated name, or [`UNUSED_SLOT`].
    pub name_offset: AtomicU64,
}

/// Index of a slot in the count region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub usize);

impl SlotId {
    /// Byte offset of this slot from the start of the mapping.
    #[must_use]
    pub const fn byte_offset(self) -> usize {
        self.0 * SLOT_SIZE
    }
}

/// Region capacities of a counter table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableLayout {
    count_capacity: usize,
    name_capacity: usize,
}

impl TableLayout {
    /// Create a layout with the given region capacities.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLayout` if either capacity is zero or the count region
    /// is not a whole number of slots.
    pub const fn new(count_capacity: usize, name_capacity: usize) -> Result<Self> {
        if count_capacity == 0 {
            return Err(TableError::InvalidLayout("count capacity is zero"));
        }
        if name_capacity == 0 {
            return Err(TableError::InvalidLayout("name capacity is zero"));
        }
        if count_capacity % SLOT_SIZE != 0 {
            return Err(TableError::InvalidLayout(
                "count capacity is not a multiple of the slot size",
            ));
        }
        Ok(Self {
            count_capacity,
            name_capacity,
        })
    }

    #[must_use]
    pub const fn count_capacity(&self) -> usize {
        self.count_capacity
    }

    #[must_use]
    pub const fn name_capacity(&self) -> usize {
        self.name_capacity
    }

    /// Size of the backing file and mapping.
    #[must_use]
    pub const fn total_size(&self) -> usize {
        self.count_capacity + self.name_capacity
    }

    /// Number of slots the count region holds.
    #[must_use]
    pub const fn max_slots(&self) -> usize {
        self.count_capacity / SLOT_SIZE
    }

    /// Byte range of the name region within the mapping.
    #[must_use]
    pub const fn name_region(&self) -> Range<usize> {
        self.count_capacity..self.total_size()
    }
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            count_capacity: DEFAULT_COUNT_CAPACITY,
            name_capacity: DEFAULT_NAME_CAPACITY,
        }
    }
}

/// Path of the backing file for `target_name` under `root`.
///
/// Every target gets its own file, and the same target always maps to the
/// same file across runs.
#[must_use]
pub fn table_path(root: &Path, target_name: &str) -> PathBuf {
    root.join(format!("{FILE_PREFIX}{target_name}"))
}

//! Shared-memory instruction counter table.
//!
//! One file-backed mapping holds two fixed regions back to back: a dense
//! array of 16-byte counter slots and a packed arena of NUL-terminated
//! mnemonic names. The instrumented process creates the table and appends
//! slots; `insncountsctl` attaches later to print or reset the counts.
//!
//! ```ignore
//! use insncounts_table::{CounterTable, TableLayout, AttachMode, DEFAULT_SHM_ROOT};
//! use std::path::Path;
//!
//! let root = Path::new(DEFAULT_SHM_ROOT);
//! let mut table = CounterTable::create(root, "riscv64", TableLayout::default())?;
//! let slot = table.allocate_slot("addi")?;
//! let target = table.counter_target(slot).expect("fresh slot is in range");
//!
//! let reader = CounterTable::attach(root, "riscv64", table.layout(), AttachMode::ReadOnly)?;
//! for entry in reader.entries()? {
//!     println!("{} {}", entry.name, entry.count);
//! }
//! ```

mod error;
mod layout;
mod region;
mod table;

pub use error::{Result, TableError};
pub use layout::{
    Counter, DEFAULT_COUNT_CAPACITY, DEFAULT_NAME_CAPACITY, DEFAULT_SHM_ROOT, FILE_PREFIX,
    SLOT_SIZE, SlotId, TableLayout, UNUSED_SLOT, table_path,
};
pub use region::{AttachMode, SharedRegion};
pub use table::{CounterTable, CounterTarget, Entry};

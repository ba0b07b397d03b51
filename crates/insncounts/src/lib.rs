//! Per-mnemonic guest instruction counters.
//!
//! An emulator plugin inspects every translated block, extracts each
//! instruction's mnemonic from its disassembly, and registers an inline
//! increment of that mnemonic's counter in a shared-memory table. The
//! `insncountsctl` binary attaches to the same table from another process to
//! print or reset the counts while the guest keeps running.
//!
//! # Example
//!
//! ```ignore
//! use insncounts::{InsnCounts, TargetInfo};
//!
//! let mut counts = InsnCounts::install(&TargetInfo::new("riscv64"), ["low=10000", "high=1ffff"])?;
//! // from the engine's translation callback:
//! counts.on_block_translated(&mut block);
//! // from the engine's exit callback:
//! counts.exit(&mut std::io::stderr())?;
//! ```

// Re-export from sub-crates
pub use insncounts_disas::{
    AddressWindow, Classification, Classifier, DisasError, MnemonicRule, OUT_OF_BOUNDS_MARKER,
    TargetFamily,
};
pub use insncounts_table::{
    AttachMode, Counter, CounterTable, CounterTarget, DEFAULT_SHM_ROOT, Entry, SLOT_SIZE, SlotId,
    TableError, TableLayout, table_path,
};

pub mod engine;
mod error;
pub mod intern;
pub mod metrics;
pub mod options;
mod plugin;
pub mod report;

pub use engine::{TargetInfo, TranslatedBlock};
pub use error::{Error, Result};
pub use intern::InternIndex;
pub use options::{OptionError, PluginConfig, PluginOptions};
pub use plugin::InsnCounts;

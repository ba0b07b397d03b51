//! Mnemonic extraction from guest disassembly text.
//!
//! Each supported guest architecture prints disassembly in a fixed shape:
//! some prefix of a known width, the mnemonic, then a terminator character.
//! The [`Classifier`] combines that rule with an address window and yields a
//! borrowed mnemonic token per instruction.

mod classifier;
mod error;
mod target;
mod window;

pub use classifier::{Classification, Classifier};
pub use error::{DisasError, Result};
pub use target::{MnemonicRule, OUT_OF_BOUNDS_MARKER, TargetFamily};
pub use window::{AddressWindow, parse_hex_u64};

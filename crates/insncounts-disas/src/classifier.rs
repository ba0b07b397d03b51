//! Mnemonic extraction for translated instructions.

use tracing::trace;

use crate::target::{MnemonicRule, OUT_OF_BOUNDS_MARKER, TargetFamily};
use crate::window::AddressWindow;

/// Result of classifying one instruction's disassembly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification<'a> {
    /// Disassembler reported the address as unreadable.
    OutOfBounds,
    /// Text did not contain a mnemonic at the expected column.
    Malformed,
    /// Mnemonic token, borrowed from the disassembly text.
    Mnemonic(&'a str),
}

impl<'a> Classification<'a> {
    #[must_use]
    pub const fn mnemonic(self) -> Option<&'a str> {
        match self {
            Self::Mnemonic(name) => Some(name),
            _ => None,
        }
    }
}

/// Turns disassembly lines into mnemonic tokens.
#[derive(Clone, Copy, Debug)]
pub struct Classifier {
    rule: MnemonicRule,
    window: AddressWindow,
}

impl Classifier {
    #[must_use]
    pub const fn new(family: TargetFamily, window: AddressWindow) -> Self {
        Self {
            rule: family.rule(),
            window,
        }
    }

    /// Window check, done before asking the engine for disassembly.
    #[inline]
    #[must_use]
    pub const fn in_window(&self, vaddr: u64) -> bool {
        self.window.contains(vaddr)
    }

    /// Classify the disassembly `disas` of the in-window instruction at `vaddr`.
    #[must_use]
    pub fn classify<'a>(&self, vaddr: u64, disas: &'a str) -> Classification<'a> {
        if disas.starts_with(OUT_OF_BOUNDS_MARKER) {
            return Classification::OutOfBounds;
        }
        match self.mnemonic(disas) {
            Some(name) => Classification::Mnemonic(name),
            None => {
                trace!(vaddr = %format!("{vaddr:#x}"), disas, "no mnemonic");
                Classification::Malformed
            }
        }
    }

    /// Slice the mnemonic out of `disas` without modifying it.
    ///
    /// The token runs from the rule's column to the first terminator, or to
    /// the end of the text for instructions without operands.
    #[must_use]
    pub fn mnemonic<'a>(&self, disas: &'a str) -> Option<&'a str> {
        let rest = disas.get(self.rule.column..)?;
        let name = rest
            .find(self.rule.terminator)
            .map_or(rest, |end| &rest[..end]);
        (!name.is_empty()).then_some(name)
    }
}

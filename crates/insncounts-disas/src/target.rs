//! Per-target disassembly slicing rules.

use std::fmt;

use crate::error::{DisasError, Result};

/// First character of the disassembler's "Address 0x... is out of bounds."
/// text, emitted instead of an instruction when the bytes are unreadable.
///
/// Only the leading character is checked, so a disassembler that changes
/// this wording will have such lines classified as malformed instead.
pub const OUT_OF_BOUNDS_MARKER: char = 'A';

/// Where the mnemonic sits in one line of disassembly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MnemonicRule {
    /// Byte column the mnemonic starts at.
    pub column: usize,
    /// Character ending the mnemonic.
    pub terminator: char,
}

/// Guest architectures with a known disassembly format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetFamily {
    /// `%08x` encoding, three spaces, then a tab after the mnemonic.
    LoongArch64,
    /// Mnemonic first, operands after a space.
    AArch64,
    /// Fixed 18-column encoding prefix, operands after a space.
    RiscV64,
}

impl TargetFamily {
    pub const ALL: [Self; 3] = [Self::LoongArch64, Self::AArch64, Self::RiscV64];

    /// Select the family whose name occurs in `target_name`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedTarget` if no family matches.
    pub fn from_target_name(target_name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|family| target_name.contains(family.name()))
            .ok_or_else(|| DisasError::UnsupportedTarget(target_name.to_string()))
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LoongArch64 => "loongarch64",
            Self::AArch64 => "aarch64",
            Self::RiscV64 => "riscv64",
        }
    }

    #[must_use]
    pub const fn rule(self) -> MnemonicRule {
        match self {
            Self::LoongArch64 => MnemonicRule {
                column: 8 + 3,
                terminator: '\t',
            },
            Self::AArch64 => MnemonicRule {
                column: 0,
                terminator: ' ',
            },
            Self::RiscV64 => MnemonicRule {
                column: 18,
                terminator: ' ',
            },
        }
    }
}

impl fmt::Display for TargetFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

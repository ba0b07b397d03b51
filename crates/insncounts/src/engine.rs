//! Interface to the translating CPU emulator.
//!
//! The emulator owns translation, execution and the plugin lifecycle. The
//! counter only needs to look at each freshly translated block and ask for an
//! inline add on the instructions it cares about. Bindings for a concrete
//! emulator implement [`TranslatedBlock`] over its block handle.

use insncounts_table::CounterTarget;

/// Information the emulator hands over at plugin install.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetInfo {
    /// Guest architecture name, e.g. `riscv64` or `aarch64`.
    pub target_name: String,
}

impl TargetInfo {
    #[must_use]
    pub fn new(target_name: impl Into<String>) -> Self {
        Self {
            target_name: target_name.into(),
        }
    }
}

/// A translated block, valid for the duration of the translation callback.
///
/// Blocks are translated once and cached, so this is seen once per unique
/// block rather than once per execution.
pub trait TranslatedBlock {
    /// Number of guest instructions in the block.
    fn n_insns(&self) -> usize;

    /// Guest virtual address of instruction `index`.
    fn insn_vaddr(&self, index: usize) -> u64;

    /// Disassembly of instruction `index`.
    ///
    /// The returned text is transient; nothing may keep a borrow of it past
    /// the current instruction.
    fn insn_disas(&self, index: usize) -> String;

    /// Arrange for `imm` to be atomically added to `target` every time
    /// instruction `index` executes, for as long as this block stays cached.
    fn register_inline_add_u64(&mut self, index: usize, target: CounterTarget, imm: u64);
}

//! In-process stand-in for the emulator's translation and execution hooks.

#![allow(dead_code)]

use std::cell::RefCell;

use insncounts::{CounterTarget, TranslatedBlock};

/// One guest instruction: address and disassembly text.
#[derive(Clone, Debug)]
pub struct SimInsn {
    pub vaddr: u64,
    pub disas: String,
}

impl SimInsn {
    pub fn new(vaddr: u64, disas: &str) -> Self {
        Self {
            vaddr,
            disas: disas.to_string(),
        }
    }
}

/// A translated block that remembers the inline adds registered on it.
#[derive(Debug, Default)]
pub struct SimBlock {
    insns: Vec<SimInsn>,
    inline_adds: Vec<Vec<(CounterTarget, u64)>>,
    /// Indices whose disassembly was requested, in order.
    disassembled: RefCell<Vec<usize>>,
}

impl SimBlock {
    pub fn new(insns: Vec<SimInsn>) -> Self {
        let inline_adds = vec![Vec::new(); insns.len()];
        Self {
            insns,
            inline_adds,
            disassembled: RefCell::default(),
        }
    }

    /// Build a block from `(vaddr, disas)` pairs.
    pub fn from_pairs(pairs: &[(u64, &str)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|&(vaddr, disas)| SimInsn::new(vaddr, disas))
                .collect(),
        )
    }

    /// Number of instructions that got an inline add.
    pub fn instrumented(&self) -> usize {
        self.inline_adds.iter().filter(|adds| !adds.is_empty()).count()
    }

    pub fn disassembled(&self) -> Vec<usize> {
        self.disassembled.borrow().clone()
    }

    pub fn adds_for(&self, index: usize) -> &[(CounterTarget, u64)] {
        &self.inline_adds[index]
    }

    /// Execute the whole block once, firing every registered inline add.
    ///
    /// The counter table must still be mapped.
    pub fn execute(&self) {
        for adds in &self.inline_adds {
            for &(target, imm) in adds {
                unsafe { target.add(imm) };
            }
        }
    }

    pub fn execute_times(&self, times: usize) {
        for _ in 0..times {
            self.execute();
        }
    }
}

impl TranslatedBlock for SimBlock {
    fn n_insns(&self) -> usize {
        self.insns.len()
    }

    fn insn_vaddr(&self, index: usize) -> u64 {
        self.insns[index].vaddr
    }

    fn insn_disas(&self, index: usize) -> String {
        self.disassembled.borrow_mut().push(index);
        self.insns[index].disas.clone()
    }

    fn register_inline_add_u64(&mut self, index: usize, target: CounterTarget, imm: u64) {
        self.inline_adds[index].push((target, imm));
    }
}

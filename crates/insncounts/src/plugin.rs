//! Writer side: the instrumentation context owned by the plugin.

use std::io::Write;

use insncounts_disas::{Classification, Classifier, TargetFamily};
use insncounts_table::{CounterTable, CounterTarget, Entry, TableError};
use tracing::{debug, info, warn};

use crate::engine::{TargetInfo, TranslatedBlock};
use crate::error::{Error, Result};
use crate::intern::InternIndex;
use crate::metrics::{self, SkipReason};
use crate::options::{PluginConfig, PluginOptions};
use crate::report;

/// Per-instruction increment registered with the engine.
const INCREMENT: u64 = 1;

/// Instruction counter state for one instrumented process.
///
/// Created once at install and passed to every translation callback. The
/// callbacks take `&mut self`: the engine must not translate blocks
/// concurrently into the same context.
pub struct InsnCounts {
    classifier: Classifier,
    index: InternIndex,
    table: CounterTable,
    /// Set after the first capacity warning so it is logged once.
    table_full: bool,
}

impl InsnCounts {
    /// Install with the given plugin arguments and the default table location.
    ///
    /// # Errors
    ///
    /// Fails on a malformed argument, an unsupported target, or if the
    /// backing file cannot be set up. Install must be aborted on error.
    pub fn install<I, S>(info: &TargetInfo, args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let options = PluginOptions::parse(args)?;
        Self::install_with(info, &PluginConfig::new(options))
    }

    /// Install with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Fails on an unsupported target or if the backing file cannot be set up.
    pub fn install_with(info: &TargetInfo, config: &PluginConfig) -> Result<Self> {
        let family = TargetFamily::from_target_name(&info.target_name)?;
        let window = config.options.window;
        let table = CounterTable::create(&config.shm_root, &info.target_name, config.layout)?;

        metrics::init();
        info!(
            guest = %info.target_name,
            family = %family,
            low = %format!("{:#x}", window.low),
            high = %format!("{:#x}", window.high),
            "instruction counting enabled"
        );

        Ok(Self {
            classifier: Classifier::new(family, window),
            index: InternIndex::new(),
            table,
            table_full: false,
        })
    }

    #[must_use]
    pub const fn table(&self) -> &CounterTable {
        &self.table
    }

    /// Number of distinct mnemonics seen so far.
    #[must_use]
    pub fn distinct_mnemonics(&self) -> usize {
        self.index.len()
    }

    /// Translation callback: register a counter increment on every
    /// instruction of `tb` that has a countable mnemonic.
    ///
    /// Returns the number of instructions instrumented.
    pub fn on_block_translated<B: TranslatedBlock + ?Sized>(&mut self, tb: &mut B) -> usize {
        let mut registered = 0;

        for index in 0..tb.n_insns() {
            let vaddr = tb.insn_vaddr(index);
            if !self.classifier.in_window(vaddr) {
                metrics::record_skip(SkipReason::OutOfWindow);
                continue;
            }

            let disas = tb.insn_disas(index);
            let name = match self.classifier.classify(vaddr, &disas) {
                Classification::Mnemonic(name) => name,
                Classification::OutOfBounds => {
                    metrics::record_skip(SkipReason::OutOfBounds);
                    continue;
                }
                Classification::Malformed => {
                    metrics::record_skip(SkipReason::Malformed);
                    continue;
                }
            };

            let Some(target) = self.resolve(name) else {
                metrics::record_skip(SkipReason::TableFull);
                continue;
            };

            tb.register_inline_add_u64(index, target, INCREMENT);
            registered += 1;
        }

        metrics::record_block(registered as u64);
        registered
    }

    fn resolve(&mut self, name: &str) -> Option<CounterTarget> {
        let before = self.index.len();
        match self.index.resolve(&mut self.table, name) {
            Ok(slot) => {
                if self.index.len() > before {
                    metrics::record_slot_allocated();
                }
                self.table.counter_target(slot)
            }
            Err(Error::Table(
                err @ (TableError::CountRegionFull { .. } | TableError::NameRegionFull { .. }),
            )) => {
                if !self.table_full {
                    warn!(mnemonic = name, "{err}; further new mnemonics are not counted");
                    self.table_full = true;
                }
                None
            }
            Err(err) => {
                warn!(mnemonic = name, "cannot allocate counter: {err}");
                None
            }
        }
    }

    /// Current counts in allocation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the table holds a corrupt name.
    pub fn entries(&self) -> Result<Vec<Entry>> {
        Ok(self.table.entries()?)
    }

    /// Human-readable summary of all counts.
    ///
    /// # Errors
    ///
    /// Returns an error if the table holds a corrupt name.
    pub fn report(&self) -> Result<String> {
        Ok(report::exit_report(&self.entries()?))
    }

    /// Exit callback: write the report to `out`, then unmap the table.
    ///
    /// The backing file stays in place for `insncountsctl`.
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be built or written.
    pub fn exit<W: Write>(self, out: &mut W) -> Result<()> {
        let report = self.report()?;
        out.write_all(report.as_bytes())?;
        out.flush()?;
        debug!(
            path = %self.table.path().display(),
            mnemonics = self.index.len(),
            "closing counter table"
        );
        Ok(())
    }
}

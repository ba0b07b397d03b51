//! Writer-side tests: translation callbacks against a simulated engine.

mod support;

use std::path::Path;

use insncounts::{
    AddressWindow, AttachMode, CounterTable, Error, InsnCounts, OptionError, PluginConfig,
    PluginOptions, SLOT_SIZE, TableLayout, TargetInfo,
};
use support::SimBlock;

fn install(root: &Path, target: &str, window: AddressWindow) -> InsnCounts {
    let config = PluginConfig::new(PluginOptions { window }).with_shm_root(root);
    InsnCounts::install_with(&TargetInfo::new(target), &config).expect("install should succeed")
}

fn counts(plugin: &InsnCounts) -> Vec<(String, u64)> {
    plugin
        .entries()
        .expect("entries")
        .into_iter()
        .map(|e| (e.name, e.count))
        .collect()
}

#[test]
fn test_single_add_counts_executions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut plugin = install(dir.path(), "aarch64", AddressWindow::FULL);

    let mut tb = SimBlock::from_pairs(&[(0x1000, "add x1, x2, x3")]);
    assert_eq!(plugin.on_block_translated(&mut tb), 1);

    let table = plugin.table();
    let slot = table.slot_at(0).expect("slot 0");
    assert_eq!(
        slot.name_offset.load(std::sync::atomic::Ordering::Relaxed),
        TableLayout::default().count_capacity() as u64
    );
    assert_eq!(counts(&plugin), [("add".to_string(), 0)]);

    tb.execute_times(5);
    assert_eq!(counts(&plugin), [("add".to_string(), 5)]);
}

#[test]
fn test_same_mnemonic_shares_slot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut plugin = install(dir.path(), "aarch64", AddressWindow::FULL);

    let mut tb1 = SimBlock::from_pairs(&[(0x1000, "add x1, x2, x3")]);
    let mut tb2 = SimBlock::from_pairs(&[(0x2000, "add x4, x4, #1")]);
    plugin.on_block_translated(&mut tb1);
    plugin.on_block_translated(&mut tb2);

    tb1.execute();
    tb2.execute();

    assert_eq!(counts(&plugin), [("add".to_string(), 2)]);
    assert_eq!(plugin.distinct_mnemonics(), 1);
    assert_eq!(tb1.adds_for(0)[0].0, tb2.adds_for(0)[0].0);
}

#[test]
fn test_mixed_block() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut plugin = install(dir.path(), "riscv64", AddressWindow::FULL);

    let mut tb = SimBlock::from_pairs(&[
        (0x10000, "00000000ff010113  addi  sp,sp,-16"),
        (0x10004, "0000000000813423  sd  s0,8(sp)"),
        (0x10008, "0000000001010413  addi  s0,sp,16"),
        (0x1000c, "0000000000008082  ret"),
    ]);
    assert_eq!(plugin.on_block_translated(&mut tb), 4);
    tb.execute_times(3);

    assert_eq!(
        counts(&plugin),
        [
            ("addi".to_string(), 6),
            ("sd".to_string(), 3),
            ("ret".to_string(), 3),
        ]
    );
}

#[test]
fn test_window_bounds_inclusive() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut plugin = install(dir.path(), "aarch64", AddressWindow::new(0x1000, 0x2000));

    let mut tb = SimBlock::from_pairs(&[
        (0x0fff, "sub x0, x0, #1"),
        (0x1000, "add x0, x0, #1"),
        (0x2000, "mul x0, x0, x1"),
        (0x2001, "udiv x0, x0, x1"),
    ]);
    assert_eq!(plugin.on_block_translated(&mut tb), 2);
    assert!(tb.adds_for(0).is_empty());
    assert!(tb.adds_for(3).is_empty());
    // Out-of-window instructions are never disassembled.
    assert_eq!(tb.disassembled(), [1, 2]);

    tb.execute();
    assert_eq!(
        counts(&plugin),
        [("add".to_string(), 1), ("mul".to_string(), 1)]
    );
}

#[test]
fn test_out_of_bounds_disassembly_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut plugin = install(dir.path(), "loongarch64", AddressWindow::FULL);

    let mut tb = SimBlock::from_pairs(&[
        (0x1200, "Address 0x1200 is out of bounds."),
        (0x1204, "02ffc063   addi.d\t$sp, $sp, -16(0xff0)"),
    ]);
    assert_eq!(plugin.on_block_translated(&mut tb), 1);
    assert!(tb.adds_for(0).is_empty());
    assert_eq!(tb.instrumented(), 1);
    assert_eq!(plugin.table().len(), 1);
}

#[test]
fn test_malformed_disassembly_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut plugin = install(dir.path(), "riscv64", AddressWindow::FULL);

    let mut tb = SimBlock::from_pairs(&[(0x1000, "illegal"), (0x1004, "")]);
    assert_eq!(plugin.on_block_translated(&mut tb), 0);
    assert!(plugin.table().is_empty());
}

#[test]
fn test_table_full_does_not_panic() {
    let dir = tempfile::tempdir().expect("tempdir");
    let layout = TableLayout::new(2 * SLOT_SIZE, 1024).expect("layout");
    let config = PluginConfig::default()
        .with_shm_root(dir.path())
        .with_layout(layout);
    let mut plugin =
        InsnCounts::install_with(&TargetInfo::new("aarch64"), &config).expect("install");

    let mut tb = SimBlock::from_pairs(&[
        (0, "add x0, x0, x1"),
        (4, "sub x0, x0, x1"),
        (8, "mul x0, x0, x1"),
        (12, "add x1, x1, x1"),
    ]);
    assert_eq!(plugin.on_block_translated(&mut tb), 3);
    assert!(tb.adds_for(2).is_empty());

    tb.execute();
    assert_eq!(
        counts(&plugin),
        [("add".to_string(), 2), ("sub".to_string(), 1)]
    );
}

#[test]
fn test_install_rejects_unknown_option() {
    let result = InsnCounts::install(&TargetInfo::new("aarch64"), ["low=0", "bogus=1"]);
    assert!(matches!(
        result,
        Err(Error::Options(OptionError::UnknownKey(_)))
    ));
}

#[test]
fn test_install_rejects_unsupported_target() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = PluginConfig::default().with_shm_root(dir.path());
    let result = InsnCounts::install_with(&TargetInfo::new("x86_64"), &config);
    assert!(matches!(result, Err(Error::Target(_))));
    assert!(!dir.path().join("insncounts.x86_64").exists());
}

#[test]
fn test_install_fails_without_shm_root() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = PluginConfig::default().with_shm_root(dir.path().join("missing"));
    let result = InsnCounts::install_with(&TargetInfo::new("riscv64"), &config);
    assert!(matches!(result, Err(Error::Table(_))));
}

#[test]
fn test_exit_report_and_file_survives() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut plugin = install(dir.path(), "aarch64", AddressWindow::FULL);

    let mut tb = SimBlock::from_pairs(&[(0, "ldr x0, [x1]"), (4, "ret")]);
    plugin.on_block_translated(&mut tb);
    tb.execute_times(2);

    let mut out = Vec::new();
    plugin.exit(&mut out).expect("exit");
    assert_eq!(
        String::from_utf8(out).expect("utf8"),
        "Collected:\n    ldr         \t2\n    ret         \t2\n"
    );

    let reader = CounterTable::attach(
        dir.path(),
        "aarch64",
        TableLayout::default(),
        AttachMode::ReadOnly,
    )
    .expect("backing file outlives the writer");
    let entries = reader.entries().expect("entries");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].count, 2);
}

#[test]
fn test_reinstall_starts_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    {
        let mut plugin = install(dir.path(), "aarch64", AddressWindow::FULL);
        let mut tb = SimBlock::from_pairs(&[(0, "nop")]);
        plugin.on_block_translated(&mut tb);
        tb.execute();
    }

    let plugin = install(dir.path(), "aarch64", AddressWindow::FULL);
    assert!(plugin.entries().expect("entries").is_empty());
}

#[test]
fn test_reset_while_writer_live() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut plugin = install(dir.path(), "riscv64", AddressWindow::FULL);

    let mut tb = SimBlock::from_pairs(&[(0x1000, "0000000000000013  nop")]);
    plugin.on_block_translated(&mut tb);
    tb.execute_times(4);

    let maint = CounterTable::attach(
        dir.path(),
        "riscv64",
        TableLayout::default(),
        AttachMode::Maintenance,
    )
    .expect("attach");
    maint.reset_counts().expect("reset");
    assert_eq!(counts(&plugin), [("nop".to_string(), 0)]);

    tb.execute();
    assert_eq!(counts(&plugin), [("nop".to_string(), 1)]);
}

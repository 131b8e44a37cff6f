use boot_acpi::rsdp::{AcpiRoots, RsdpCandidate};
use boot_acpi::{HI_RSDP_WINDOW_BASE, HI_RSDP_WINDOW_SIZE, RsdpLocator};
use boot_info::BootHandoff;
use boot_window::{FlatWindow, MemoryWindow, Offset};
use std::cell::Cell;

const LOW_MEM: usize = 0x10_0000;
const RSDT: u32 = 0x07FE_14A0;
const XSDT: u64 = 0x0000_0001_07FE_1500;

fn low_mem(ebda_segment: u16) -> Vec<u8> {
    let mut mem = vec![0u8; LOW_MEM];
    mem[0x40E..0x410].copy_from_slice(&ebda_segment.to_le_bytes());
    mem
}

fn fix_sum(bytes: &[u8]) -> u8 {
    0u8.wrapping_sub(bytes.iter().fold(0u8, |a, &b| a.wrapping_add(b)))
}

/// Write a checksum-correct RSDP of the given revision at `at`.
fn plant(mem: &mut [u8], at: usize, revision: u8) {
    let rec = &mut mem[at..at + 36];
    rec.fill(0);
    rec[..8].copy_from_slice(b"RSD PTR ");
    rec[9..15].copy_from_slice(b"BOCHS ");
    rec[15] = revision;
    rec[16..20].copy_from_slice(&RSDT.to_le_bytes());
    if revision >= 2 {
        rec[20..24].copy_from_slice(&36u32.to_le_bytes());
        rec[24..32].copy_from_slice(&XSDT.to_le_bytes());
    }
    rec[8] = fix_sum(&rec[..20]);
    if revision >= 2 {
        rec[32] = fix_sum(&rec[..36]);
    }
}

fn locate(mem: Vec<u8>) -> Option<u64> {
    RsdpLocator::new(FlatWindow::new(mem)).locate(&BootHandoff::default())
}

#[test]
fn finds_legacy_record_in_ebda() {
    let mut mem = low_mem(0x9FC0);
    plant(&mut mem, 0x9_FC00 + 32, 1);
    assert_eq!(locate(mem), Some(0x9_FC00 + 32));
}

#[test]
fn finds_record_in_upper_bios_area() {
    let mut mem = low_mem(0);
    plant(&mut mem, 0xF_6A20, 2);
    assert_eq!(locate(mem), Some(0xF_6A20));
}

#[test]
fn ebda_wins_over_upper_area() {
    let mut mem = low_mem(0x9FC0);
    plant(&mut mem, 0xE_0000, 2);
    plant(&mut mem, 0x9_FFF0, 0);
    assert_eq!(locate(mem), Some(0x9_FFF0));
}

#[test]
fn lowest_address_wins_regardless_of_revision() {
    let mut mem = low_mem(0);
    plant(&mut mem, 0xE_1000, 0);
    plant(&mut mem, 0xE_2000, 2);
    assert_eq!(locate(mem), Some(0xE_1000));
}

#[test]
fn corrupted_checksum_is_skipped() {
    let mut mem = low_mem(0);
    plant(&mut mem, 0xE_1000, 0);
    plant(&mut mem, 0xF_0000, 0);
    mem[0xE_1000 + 12] ^= 0x01;
    assert_eq!(locate(mem), Some(0xF_0000));
}

#[test]
fn broken_extended_checksum_rejects_revision_2() {
    let mut mem = low_mem(0);
    plant(&mut mem, 0xE_1000, 2);
    mem[0xE_1000 + 33] = 0x5A; // reserved byte, extended domain only

    let w = FlatWindow::new(mem);
    let candidate = RsdpCandidate::new(&w, 0xE_1000);
    assert!(candidate.signature_matches());
    assert!(candidate.checksum_ok());
    assert!(!candidate.extended_checksum_ok());
    assert!(!candidate.is_valid());
    assert_eq!(RsdpLocator::new(w).locate(&BootHandoff::default()), None);
}

#[test]
fn legacy_record_ignores_bytes_past_20() {
    let mut mem = low_mem(0);
    plant(&mut mem, 0xE_1000, 0);
    mem[0xE_1000 + 20..0xE_1000 + 36].fill(0xEE);
    assert_eq!(locate(mem), Some(0xE_1000));
}

#[test]
fn implausible_ebda_base_is_not_scanned() {
    // 0x0040 << 4 == 0x400: right at the cutoff.
    let mut mem = low_mem(0x0040);
    plant(&mut mem, 0x410, 0);
    assert_eq!(locate(mem), None);
}

#[test]
fn only_first_kib_of_ebda_is_scanned() {
    let mut mem = low_mem(0x9000);
    plant(&mut mem, 0x9_0400, 0);
    assert_eq!(locate(mem), None);
}

#[test]
fn unaligned_records_are_not_seen() {
    let mut mem = low_mem(0);
    plant(&mut mem, 0xF_6A28, 0);
    assert_eq!(locate(mem), None);
}

#[test]
fn handoff_hint_is_trusted_and_stable() {
    let mem = low_mem(0);
    let before = mem.clone();
    let locator = RsdpLocator::new(FlatWindow::new(mem));
    let handoff = BootHandoff::new(0x7FF7_8014);

    assert_eq!(locator.locate(&handoff), Some(0x7FF7_8014));
    assert_eq!(locator.locate(&handoff), Some(0x7FF7_8014));
    assert_eq!(locator.into_inner().into_inner(), before);
}

/// Window that remembers which addresses the scan looked at.
struct Probe {
    inner: FlatWindow<Vec<u8>>,
    lowest: Cell<u32>,
    highest: Cell<u32>,
    ebda_touched: Cell<bool>,
}

impl MemoryWindow for Probe {
    fn select(&mut self, segment: u16) {
        self.inner.select(segment);
    }

    fn segment(&self) -> u16 {
        self.inner.segment()
    }

    fn read8(&self, offset: Offset) -> u8 {
        if (0x9_FC00..0xA_0000).contains(&offset) {
            self.ebda_touched.set(true);
        }
        if offset >= HI_RSDP_WINDOW_BASE {
            self.lowest.set(self.lowest.get().min(offset));
            self.highest.set(self.highest.get().max(offset));
        }
        self.inner.read8(offset)
    }

    fn write8(&mut self, offset: Offset, value: u8) {
        self.inner.write8(offset, value);
    }
}

#[test]
fn nothing_found_only_after_both_windows_are_exhausted() {
    let mut mem = low_mem(0x9FC0);

    // Signature-only decoys in both windows.
    for at in [0x9_FC00, 0x9_FD10, 0xE_0000, 0xF_FFF0] {
        mem[at..at + 8].copy_from_slice(b"RSD PTR ");
        mem[at + 8] = 0x42;
    }

    let probe = Probe {
        inner: FlatWindow::new(mem),
        lowest: Cell::new(u32::MAX),
        highest: Cell::new(0),
        ebda_touched: Cell::new(false),
    };

    let locator = RsdpLocator::new(probe);
    assert_eq!(locator.locate(&BootHandoff::default()), None);

    let probe = locator.into_inner();
    assert!(probe.ebda_touched.get());
    assert_eq!(probe.lowest.get(), HI_RSDP_WINDOW_BASE);
    assert!(probe.highest.get() >= HI_RSDP_WINDOW_BASE + HI_RSDP_WINDOW_SIZE - 16);
}

#[test]
fn roots_from_located_record() {
    let mut mem = low_mem(0);
    plant(&mut mem, 0xF_6A20, 2);
    plant(&mut mem, 0xF_6B00, 0);
    let w = FlatWindow::new(mem);

    let v2 = AcpiRoots::parse(&w, 0xF_6A20).unwrap();
    assert_eq!(v2.rsdt_addr, Some(u64::from(RSDT)));
    assert_eq!(v2.xsdt_addr, Some(XSDT));

    let v1 = AcpiRoots::parse(&w, 0xF_6B00).unwrap();
    assert_eq!(v1.xsdt_addr, None);

    assert_eq!(AcpiRoots::parse(&w, 0), None);
    assert_eq!(AcpiRoots::parse(&w, 0xF_6A30), None);
    assert_eq!(AcpiRoots::parse(&w, 0x1_0000_0000), None);
}

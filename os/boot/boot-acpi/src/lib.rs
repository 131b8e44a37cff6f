//! # ACPI Root Pointer Discovery
//!
//! Before the kernel can parse any ACPI table it needs the physical address of
//! the **RSDP** (Root System Description Pointer), the record that points at
//! the RSDT/XSDT:
//!
//! ```text
//! BIOS Firmware
//!     ↓
//! RSDP (somewhere in the EBDA or in E0000h–FFFFFh)
//!     ↓
//! RSDT/XSDT
//!     ↓
//! Individual ACPI Tables (FADT, MADT, DSDT, ...)
//! ```
//!
//! ## Discovery Process
//!
//! 1. **Loader Handoff**: if the boot loader already found the RSDP (e.g. from
//!    the UEFI configuration table) it passes the address along in
//!    [`BootHandoff`]. A non-zero address is returned as-is.
//! 2. **EBDA**: the real-mode segment of the Extended BIOS Data Area is stored
//!    as a 16-bit value at physical `0x40E`. Its first KiB is scanned, unless
//!    the resulting base is at or below `0x400` (implausible: that is the
//!    interrupt vector table).
//! 3. **BIOS ROM area**: `0xE0000..0x100000` is scanned.
//!
//! Both scans step over 16-byte paragraphs in ascending address order and
//! accept the first candidate that passes validation.
//!
//! ## Validation
//!
//! Firmware memory regularly contains stale or partial copies of the
//! signature, so a candidate must satisfy all of:
//! * **Signature**: the first 8 bytes are `"RSD PTR "`.
//! * **Checksum**: bytes `0..20` (the ACPI 1.0 record) sum to zero mod 256.
//! * **Extended Checksum**: if the revision byte is ≥ 2, bytes `0..36`
//!   (the ACPI 2.0+ record) sum to zero mod 256 as well.
//!
//! Exactly the domains a candidate declares are checked: legacy records are
//! not rejected for lacking an extended part, and a revision-2 record with a
//! broken extended part is not accepted on the strength of its legacy sum.
//! A later copy with a higher revision does **not** win over an earlier valid
//! one.
//!
//! ## Memory Access
//!
//! All reads go through a [`MemoryWindow`] selected at segment `0`, so offsets
//! are physical addresses. On hardware this is an
//! [`IdentityWindow`](boot_window::IdentityWindow); in tests a
//! [`FlatWindow`](boot_window::FlatWindow) holding a synthetic low-memory image.
//!
//! ## Failure
//!
//! Not finding the RSDP is a degraded boot, not a fatal one: [`RsdpLocator::locate`]
//! returns `None` and the caller carries on without ACPI.

#![cfg_attr(not(any(test, doctest)), no_std)]

pub mod rsdp;

use boot_info::BootHandoff;
use boot_window::MemoryWindow;
use log::{debug, info, warn};
use rsdp::RsdpCandidate;

/// Physical location of the 16-bit EBDA segment in the BIOS data area.
pub const EBDA_PTR_LOCATION: u32 = 0x0000_040E;

/// Number of EBDA bytes searched (the EBDA is at least 1 KiB long).
pub const EBDA_WINDOW_SIZE: u32 = 1024;

/// EBDA bases at or below this address are not plausible.
pub const EBDA_MIN_BASE: u32 = 0x400;

/// Start of the upper BIOS area searched for the RSDP.
pub const HI_RSDP_WINDOW_BASE: u32 = 0x000E_0000;

/// Size of the upper BIOS area (`E0000h..=FFFFFh`).
pub const HI_RSDP_WINDOW_SIZE: u32 = 0x0002_0000;

/// The RSDP is always 16-byte aligned.
pub const RSDP_SCAN_STEP: u32 = 16;

/// Length of the ACPI 1.0 record covered by the legacy checksum.
pub const RSDP_CHECKSUM_LENGTH: u32 = 20;

/// Length of the ACPI 2.0+ record covered by the extended checksum.
pub const RSDP_XCHECKSUM_LENGTH: u32 = 36;

/// The 8-byte RSDP signature.
pub const RSDP_SIGNATURE: &[u8; 8] = b"RSD PTR ";

/// 8-bit wrapping sum of `len` bytes at `start`.
fn sum(memory: &impl MemoryWindow, start: u32, len: u32) -> u8 {
    (start..start.saturating_add(len)).fold(0, |a, at| a.wrapping_add(memory.read8(at)))
}

/// Finds the RSDP using the handoff hint, the EBDA and the BIOS ROM area.
pub struct RsdpLocator<W> {
    memory: W,
}

impl<W: MemoryWindow> RsdpLocator<W> {
    /// Take `memory` and point it at physical address zero.
    pub fn new(mut memory: W) -> Self {
        memory.select(0);
        Self { memory }
    }

    pub fn into_inner(self) -> W {
        self.memory
    }

    #[must_use]
    pub const fn memory(&self) -> &W {
        &self.memory
    }

    /// Physical address of the RSDP, or `None` if there is none to be found.
    ///
    /// A non-zero [`BootHandoff::acpi_rsdp_addr`] is returned unchecked.
    pub fn locate(&self, handoff: &BootHandoff) -> Option<u64> {
        if let Some(pa) = handoff.rsdp_hint() {
            debug!("using loader-provided RSDP at {pa:#x}");
            return Some(pa);
        }

        if let Some(pa) = self.scan_bios_areas() {
            info!("found RSDP at {pa:#x}");
            return Some(u64::from(pa));
        }

        warn!("no RSDP found, continuing without ACPI");
        None
    }

    /// Search the EBDA, then the upper BIOS area.
    pub fn scan_bios_areas(&self) -> Option<u32> {
        let ebda = u32::from(self.memory.read16(EBDA_PTR_LOCATION)) << 4;

        if ebda > EBDA_MIN_BASE {
            debug!("scanning EBDA at {ebda:#x}");
            if let Some(pa) = self.scan(ebda, EBDA_WINDOW_SIZE) {
                return Some(pa);
            }
        } else {
            debug!("ignoring implausible EBDA base {ebda:#x}");
        }

        debug!("scanning upper BIOS area at {HI_RSDP_WINDOW_BASE:#x}");
        self.scan(HI_RSDP_WINDOW_BASE, HI_RSDP_WINDOW_SIZE)
    }

    /// Scan `length` bytes from `start` on 16-byte boundaries and return the
    /// first address holding a valid RSDP.
    pub fn scan(&self, start: u32, length: u32) -> Option<u32> {
        let end = start.saturating_add(length);
        (start..end)
            .step_by(RSDP_SCAN_STEP as usize)
            .find(|&address| RsdpCandidate::new(&self.memory, address).is_valid())
    }
}

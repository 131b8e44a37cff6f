//! # RSDP/XSDP (Root/Extended System Description Pointer)
//!
//! ```text
//! offset  size  field
//!  0      8     signature "RSD PTR "
//!  8      1     checksum          ┐ ACPI 1.0: bytes 0..20 sum to 0
//!  9      6     OEM id            │
//! 15      1     revision          │ (0 = ACPI 1.0, 2 = ACPI 2.0+)
//! 16      4     RSDT address      ┘
//! 20      4     length            ┐ ACPI 2.0+: bytes 0..36 sum to 0
//! 24      8     XSDT address      │
//! 32      1     extended checksum │
//! 33      3     reserved          ┘
//! ```
//!
//! Records are read field by field through the window and never written.

use crate::{RSDP_CHECKSUM_LENGTH, RSDP_SIGNATURE, RSDP_XCHECKSUM_LENGTH, sum};
use boot_window::MemoryWindow;

const REVISION_OFFSET: u32 = 15;
const RSDT_OFFSET: u32 = 16;
const XSDT_OFFSET: u32 = 24;

/// A possible RSDP at some physical address.
pub struct RsdpCandidate<'w, W> {
    memory: &'w W,
    address: u32,
}

impl<'w, W: MemoryWindow> RsdpCandidate<'w, W> {
    pub const fn new(memory: &'w W, address: u32) -> Self {
        Self { memory, address }
    }

    #[must_use]
    pub const fn address(&self) -> u32 {
        self.address
    }

    #[must_use]
    pub fn signature_matches(&self) -> bool {
        !self.memory.block_differs(RSDP_SIGNATURE, self.address)
    }

    #[must_use]
    pub fn revision(&self) -> u8 {
        self.memory.read8(self.address + REVISION_OFFSET)
    }

    /// Whether the ACPI 1.0 part sums to zero.
    #[must_use]
    pub fn checksum_ok(&self) -> bool {
        sum(self.memory, self.address, RSDP_CHECKSUM_LENGTH) == 0
    }

    /// Whether the ACPI 2.0+ part sums to zero.
    #[must_use]
    pub fn extended_checksum_ok(&self) -> bool {
        sum(self.memory, self.address, RSDP_XCHECKSUM_LENGTH) == 0
    }

    /// Signature and every checksum the revision declares are correct.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        if !self.signature_matches() {
            return false;
        }

        if !self.checksum_ok() {
            return false;
        }

        if self.revision() >= 2 && !self.extended_checksum_ok() {
            return false;
        }

        true
    }
}

/// Root table addresses taken from a valid RSDP.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AcpiRoots {
    pub rsdp_addr: u64,
    pub rsdt_addr: Option<u64>,
    pub xsdt_addr: Option<u64>,
}

impl AcpiRoots {
    /// Read the RSDT/XSDT addresses of the RSDP at `rsdp_addr`.
    ///
    /// Returns `None` for a null address, an address beyond the reach of the
    /// window, or a record that does not validate.
    #[must_use]
    pub fn parse(memory: &impl MemoryWindow, rsdp_addr: u64) -> Option<Self> {
        let address = u32::try_from(rsdp_addr).ok().filter(|&a| a != 0)?;

        let rsdp = RsdpCandidate::new(memory, address);
        if !rsdp.is_valid() {
            return None;
        }

        let rsdt_addr = Some(u64::from(memory.read32(address + RSDT_OFFSET)));

        if rsdp.revision() >= 2 {
            let lo = u64::from(memory.read32(address + XSDT_OFFSET));
            let hi = u64::from(memory.read32(address + XSDT_OFFSET + 4));
            return Some(Self {
                rsdp_addr,
                rsdt_addr,
                xsdt_addr: Some((hi << 32) | lo),
            });
        }

        Some(Self {
            rsdp_addr,
            rsdt_addr,
            xsdt_addr: None,
        })
    }
}

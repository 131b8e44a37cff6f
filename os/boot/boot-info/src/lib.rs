//! # Boot Handoff Information

#![cfg_attr(not(any(test, doctest)), no_std)]

/// Data handed to the setup stage by whatever loaded it.
///
/// Keep this `#[repr(C)]`; it is filled in by code outside of this workspace.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct BootHandoff {
    /// ACPI RSDP physical address as found by the loader, or 0 if not provided.
    ///
    /// A non-zero value is trusted as already validated upstream.
    pub acpi_rsdp_addr: u64,
}

impl BootHandoff {
    #[must_use]
    pub const fn new(acpi_rsdp_addr: u64) -> Self {
        Self { acpi_rsdp_addr }
    }

    /// The loader-supplied RSDP address, if there is one.
    #[inline]
    #[must_use]
    pub const fn rsdp_hint(&self) -> Option<u64> {
        match self.acpi_rsdp_addr {
            0 => None,
            addr => Some(addr),
        }
    }
}

//! # Setup-stage sequencing
//!
//! Ties the early pieces together in the order the decompressor needs them:
//!
//! ```text
//! begin()                   stage 1 IDT (empty table)
//! enable_identity_faults()  stage 2 IDT (#PF → on-demand identity mapping)
//! locate_acpi()             RSDP from the loader, the EBDA or the BIOS ROM
//! prepare_handoff()         null IDT, handoff record for the kernel
//! ```
//!
//! [`locate_acpi`](SetupStage::locate_acpi) only reads memory and may run at
//! any point before the handoff; the IDT transitions are enforced by
//! [`BootIdt`].

#![cfg_attr(not(any(test, doctest)), no_std)]

use boot_acpi::RsdpLocator;
use boot_acpi::rsdp::AcpiRoots;
use boot_idt::{BootIdt, HandlerAddress, IdtLoader, IdtTransitionError};
use boot_info::BootHandoff;
use boot_window::MemoryWindow;
use log::{info, warn};

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Idt(#[from] IdtTransitionError),
}

/// Owns everything the setup stage touches until the kernel takes over.
///
/// Holds the boot IDT inline: keep it in place (e.g. in a `static`) from
/// [`begin`](Self::begin) on.
pub struct SetupStage<W, L> {
    locator: RsdpLocator<W>,
    idt: BootIdt<L>,
    handoff: BootHandoff,
    roots: Option<AcpiRoots>,
}

impl<W: MemoryWindow, L: IdtLoader> SetupStage<W, L> {
    /// `handoff` is what the loader passed in; its RSDP hint is honored by
    /// [`locate_acpi`](Self::locate_acpi).
    #[must_use]
    pub fn new(memory: W, loader: L, handoff: BootHandoff) -> Self {
        Self {
            locator: RsdpLocator::new(memory),
            idt: BootIdt::new(loader),
            handoff,
            roots: None,
        }
    }

    /// Install the stage 1 IDT.
    ///
    /// # Errors
    /// [`SetupError::Idt`] if called more than once.
    pub fn begin(&mut self) -> Result<(), SetupError> {
        self.idt.enter_stage1()?;
        Ok(())
    }

    /// Route page faults to `handler` while the identity map is built.
    ///
    /// # Errors
    /// [`SetupError::Idt`] unless [`begin`](Self::begin) ran and the handoff
    /// was not prepared yet.
    pub fn enable_identity_faults(&mut self, handler: HandlerAddress) -> Result<(), SetupError> {
        self.idt.enter_stage2(handler)?;
        Ok(())
    }

    /// Find the RSDP and record it for the kernel.
    ///
    /// Returns the physical address, or `None` if there is no ACPI.
    pub fn locate_acpi(&mut self) -> Option<u64> {
        let rsdp = self.locator.locate(&self.handoff)?;
        self.handoff.acpi_rsdp_addr = rsdp;

        self.roots = AcpiRoots::parse(self.locator.memory(), rsdp);
        match self.roots {
            Some(roots) => info!(
                "ACPI roots: RSDT {:#x}, XSDT {:#x}",
                roots.rsdt_addr.unwrap_or(0),
                roots.xsdt_addr.unwrap_or(0)
            ),
            None => warn!("RSDP at {rsdp:#x} could not be read back, roots unknown"),
        }

        Some(rsdp)
    }

    /// Tear down the boot IDT and hand back the record for the kernel.
    ///
    /// # Errors
    /// [`SetupError::Idt`] if the IDT was never installed or the handoff was
    /// already prepared.
    pub fn prepare_handoff(&mut self) -> Result<BootHandoff, SetupError> {
        self.idt.disable()?;
        info!("handing off, RSDP at {:#x}", self.handoff.acpi_rsdp_addr);
        Ok(self.handoff)
    }

    /// The whole sequence in order.
    ///
    /// # Errors
    /// [`SetupError::Idt`] if this stage was already (partly) driven.
    pub fn run(&mut self, handler: HandlerAddress) -> Result<BootHandoff, SetupError> {
        self.begin()?;
        self.enable_identity_faults(handler)?;
        self.locate_acpi();
        self.prepare_handoff()
    }

    #[must_use]
    pub const fn handoff(&self) -> &BootHandoff {
        &self.handoff
    }

    #[must_use]
    pub const fn roots(&self) -> Option<AcpiRoots> {
        self.roots
    }

    #[must_use]
    pub const fn idt(&self) -> &BootIdt<L> {
        &self.idt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boot_idt::{DescriptorTablePointer, IdtStage};
    use boot_window::FlatWindow;

    struct Nop;

    impl IdtLoader for Nop {
        fn load(&mut self, _: &DescriptorTablePointer) {}
    }

    #[test]
    fn handoff_before_begin_fails() {
        let mut setup = SetupStage::new(FlatWindow::new(Vec::<u8>::new()), Nop, BootHandoff::default());
        assert_eq!(
            setup.prepare_handoff(),
            Err(SetupError::Idt(IdtTransitionError::OutOfOrder {
                from: IdtStage::Uninstalled,
                to: IdtStage::Disabled,
            }))
        );
    }

    #[test]
    fn error_is_transparent() {
        let err = SetupError::from(IdtTransitionError::OutOfOrder {
            from: IdtStage::Disabled,
            to: IdtStage::Stage1,
        });
        assert_eq!(err.to_string(), "cannot move the boot IDT from Disabled to Stage1");
    }
}

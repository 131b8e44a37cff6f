//! # Boot-stage exception handling
//!
//! While the decompressor builds its identity mapping it may touch memory
//! that is not mapped yet. A page fault at that point must land in a handler
//! that maps the faulting page on demand instead of triple-faulting the
//! machine. The boot IDT goes through three stages:
//!
//! ```text
//!  Uninstalled ──enter_stage1──▶ Stage1 ──enter_stage2──▶ Stage2
//!                                  │                        │
//!                                  └────────disable─────────┴──▶ Disabled
//! ```
//!
//! * **Stage 1**: the (empty) table is loaded right after the switch to long
//!   mode, so that a stray exception at least hits a well-defined table.
//! * **Stage 2**: vector 14 (`#PF`) becomes a trap gate pointing at the
//!   identity-mapping fault handler, running in [`KERNEL_CS`].
//! * **Disabled**: right before jumping to the kernel a zero-limit pointer is
//!   loaded so nothing can dispatch through boot-stage handlers anymore.
//!
//! Transitions are strictly ordered; any other call returns
//! [`IdtTransitionError::OutOfOrder`] and leaves the table, the pointer and
//! the loader untouched.
//!
//! The `lidt` itself goes through an [`IdtLoader`] so the sequencing can be
//! exercised without a CPU.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod pointer;
pub mod selectors;
pub mod table;

pub use pointer::{DescriptorTablePointer, IdtLoader};
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use pointer::Lidt;
pub use selectors::KERNEL_CS;
pub use table::{GateType, Idt, IdtEntry, PAGE_FAULT_VECTOR};

use log::debug;

/// Where the boot IDT is in its lifecycle.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IdtStage {
    Uninstalled,
    Stage1,
    Stage2,
    Disabled,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdtTransitionError {
    #[error("cannot move the boot IDT from {from:?} to {to:?}")]
    OutOfOrder { from: IdtStage, to: IdtStage },
}

/// Linear address of an exception entry point.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct HandlerAddress(u64);

impl HandlerAddress {
    #[must_use]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    #[must_use]
    pub fn from_fn(handler: extern "C" fn()) -> Self {
        Self(handler as usize as u64)
    }

    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// The boot IDT together with the pointer last handed to the CPU.
///
/// The table base is taken from `self` on every load, so a `BootIdt` must not
/// be moved once [`enter_stage1`](Self::enter_stage1) has run: the CPU keeps
/// using the old address.
pub struct BootIdt<L> {
    idt: Idt,
    pointer: DescriptorTablePointer,
    stage: IdtStage,
    loader: L,
}

impl<L: IdtLoader> BootIdt<L> {
    #[must_use]
    pub const fn new(loader: L) -> Self {
        Self {
            idt: Idt::new(),
            pointer: DescriptorTablePointer::DISABLED,
            stage: IdtStage::Uninstalled,
            loader,
        }
    }

    #[must_use]
    pub const fn stage(&self) -> IdtStage {
        self.stage
    }

    #[must_use]
    pub const fn pointer(&self) -> DescriptorTablePointer {
        self.pointer
    }

    #[must_use]
    pub const fn table(&self) -> &Idt {
        &self.idt
    }

    #[must_use]
    pub const fn loader(&self) -> &L {
        &self.loader
    }

    /// Load the empty table.
    ///
    /// # Errors
    /// [`IdtTransitionError::OutOfOrder`] unless the IDT is still uninstalled.
    pub fn enter_stage1(&mut self) -> Result<(), IdtTransitionError> {
        self.check_order(&[IdtStage::Uninstalled], IdtStage::Stage1)?;
        self.reload(IdtStage::Stage1);
        Ok(())
    }

    /// Install `handler` as the `#PF` trap gate and reload.
    ///
    /// # Errors
    /// [`IdtTransitionError::OutOfOrder`] unless stage 1 is active.
    pub fn enter_stage2(&mut self, handler: HandlerAddress) -> Result<(), IdtTransitionError> {
        self.check_order(&[IdtStage::Stage1], IdtStage::Stage2)?;

        self.idt[PAGE_FAULT_VECTOR]
            .set_handler(handler.as_u64())
            .selector(KERNEL_CS)
            .gate_type(GateType::TrapGate)
            .present(true);

        debug!("boot #PF handler at {:#x}", handler.as_u64());
        self.reload(IdtStage::Stage2);
        Ok(())
    }

    /// Load the null IDT. Terminal.
    ///
    /// # Errors
    /// [`IdtTransitionError::OutOfOrder`] if the IDT was never installed or
    /// is already disabled.
    pub fn disable(&mut self) -> Result<(), IdtTransitionError> {
        self.check_order(&[IdtStage::Stage1, IdtStage::Stage2], IdtStage::Disabled)?;
        self.pointer = DescriptorTablePointer::DISABLED;
        self.loader.load(&self.pointer);
        self.stage = IdtStage::Disabled;
        debug!("boot IDT disabled");
        Ok(())
    }

    fn check_order(&self, allowed: &[IdtStage], to: IdtStage) -> Result<(), IdtTransitionError> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            Err(IdtTransitionError::OutOfOrder {
                from: self.stage,
                to,
            })
        }
    }

    fn reload(&mut self, stage: IdtStage) {
        let base = core::ptr::from_ref(&self.idt) as usize as u64;
        self.pointer = DescriptorTablePointer::new(Idt::limit(), base);
        self.loader.load(&self.pointer);
        self.stage = stage;
        debug!("boot IDT {stage:?} loaded at {base:#x}");
    }
}

//! # BIOS Calls
//!
//! Firmware services on a PC-compatible machine are reachable only through
//! software interrupts issued in real mode (`int 0x10` video, `int 0x13`
//! disk, `int 0x15` system services, ...). Each service defines its own
//! register convention; this crate merely *transports* register state:
//!
//! ```text
//!   BiosRegs (input) ──► load registers ──► int N ──► store registers ──► BiosRegs (output)
//! ```
//!
//! * [`BiosRegs`] is the register snapshot with its 32/16/8-bit views.
//! * [`PlatformCall`] is the injected capability that performs the call.
//!   [`RealModeBios`] (feature `bios`, 32-bit x86 only) is the hardware
//!   implementation; any `FnMut(u8, &BiosRegs) -> BiosRegs` closure acts as
//!   mock firmware.
//!
//! ## Failure reporting
//! The bridge has no error type. Outcome is communicated through the
//! service's own convention (often CF set on failure, see
//! [`BiosRegs::carry`]); interpreting it is the caller's job.
//!
//! ## Reentrancy
//! A call is synchronous and blocking and has no timeout. It is not
//! reentrant and must never be issued from an exception handler.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod eflags;
#[cfg(all(target_arch = "x86", feature = "bios"))]
mod realmode;
mod regs;

pub use eflags::Eflags;
#[cfg(all(target_arch = "x86", feature = "bios"))]
pub use realmode::RealModeBios;
pub use regs::{BiosRegs, SegmentState};

/// Interrupt vector of the BIOS video services.
pub const INT_VIDEO: u8 = 0x10;

/// Interrupt vector of the BIOS disk services.
pub const INT_DISK: u8 = 0x13;

/// Interrupt vector of the BIOS system services (memory map, A20, APM, ...).
pub const INT_SYSTEM: u8 = 0x15;

/// Issue a firmware software interrupt with a given register state.
pub trait PlatformCall {
    /// Raise interrupt `int_no` with the registers in `ireg`.
    ///
    /// The resulting register state is stored into `oreg`, if one is given;
    /// otherwise it is discarded. `ireg` is never modified.
    fn intcall(&mut self, int_no: u8, ireg: &BiosRegs, oreg: Option<&mut BiosRegs>);
}

impl<F> PlatformCall for F
where
    F: FnMut(u8, &BiosRegs) -> BiosRegs,
{
    fn intcall(&mut self, int_no: u8, ireg: &BiosRegs, oreg: Option<&mut BiosRegs>) {
        let out = self(int_no, ireg);
        if let Some(oreg) = oreg {
            *oreg = out;
        }
    }
}

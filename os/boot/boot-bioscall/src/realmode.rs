use crate::{BiosRegs, PlatformCall};
use core::ptr;

core::arch::global_asm!(include_str!("intcall.S"), options(att_syntax));

unsafe extern "C" {
    fn boot_intcall(int_no: u8, ireg: *const BiosRegs, oreg: *mut BiosRegs);
}

/// [`PlatformCall`] that executes a genuine `int n` in real mode.
///
/// The trampoline patches its own `int` opcode, loads every register from
/// the input snapshot, raises the interrupt, stores every register into the
/// output snapshot and finally restores the caller's registers and flags.
#[derive(Copy, Clone)]
pub struct RealModeBios {
    _private: (),
}

impl RealModeBios {
    /// # Safety
    /// The CPU must be in real mode with the tiny memory model the setup code
    /// uses (`%cs == %ds == %es == %ss`), and the BIOS interrupt vector table
    /// must be intact.
    #[must_use]
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl PlatformCall for RealModeBios {
    fn intcall(&mut self, int_no: u8, ireg: &BiosRegs, oreg: Option<&mut BiosRegs>) {
        let oreg = oreg.map_or(ptr::null_mut(), ptr::from_mut);
        // SAFETY: real mode was promised by `RealModeBios::new`; both
        // snapshots are live for the duration of the call.
        unsafe { boot_intcall(int_no, ptr::from_ref(ireg), oreg) }
    }
}

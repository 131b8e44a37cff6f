//! # Early Boot Console
//!
//! Character output for the setup stage, before any kernel driver exists.
//! Output is purely diagnostic: nothing in the boot path ever branches on
//! what the console did.
//!
//! ```text
//! log::info!(...)          puts("...")
//!       ↓                       ↓
//! ConsoleLogger ──► Console::putchar ──► BIOS teletype (int 0x10, AH=0Eh)
//!                                   └──► 16550 UART (if an early serial base is set)
//! ```
//!
//! ## Components
//! * [`Console`]: the `putchar`/`puts` collaborator interface.
//! * [`BiosTty`]: the real console, writing through a
//!   [`PlatformCall`](boot_bioscall::PlatformCall) and a [`PortIo`].
//! * [`ConsoleLogger`]: a [`log::Log`] backend over any copyable console.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod logger;
mod ports;
mod tty;

pub use logger::ConsoleLogger;
pub use ports::PortIo;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use ports::IoPorts;
pub use tty::BiosTty;

use core::fmt;

/// Character sink used for boot diagnostics.
pub trait Console {
    fn putchar(&mut self, ch: u8);

    fn puts(&mut self, s: &str) {
        for b in s.bytes() {
            self.putchar(b);
        }
    }
}

/// [`fmt::Write`] adapter for any [`Console`].
pub struct Writer<'a, C: ?Sized>(pub &'a mut C);

impl<C: Console + ?Sized> fmt::Write for Writer<'_, C> {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.puts(s);
        Ok(())
    }
}

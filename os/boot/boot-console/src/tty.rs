use crate::{Console, PortIo};
use boot_bioscall::{BiosRegs, INT_VIDEO, PlatformCall, SegmentState};
use core::fmt;

/// UART transmit holding register (write).
const TXR: u16 = 0;
/// UART line status register.
const LSR: u16 = 5;
/// LSR: transmit holding register empty.
const XMTRDY: u8 = 0x20;

/// Video BIOS teletype output (`int 0x10`, AH=0Eh).
const TELETYPE_OUTPUT: u8 = 0x0E;

/// Screen console through the video BIOS, mirrored to an optional UART.
#[derive(Copy, Clone)]
pub struct BiosTty<P, IO> {
    bios: P,
    ports: IO,
    segments: SegmentState,
    early_serial_base: u16,
}

impl<P, IO> BiosTty<P, IO>
where
    P: PlatformCall,
    IO: PortIo,
{
    /// BIOS-only console. `segments` are the data segments handed to the
    /// video BIOS on each call.
    pub const fn new(bios: P, ports: IO, segments: SegmentState) -> Self {
        Self {
            bios,
            ports,
            segments,
            early_serial_base: 0,
        }
    }

    /// Also mirror output to the 16550 UART at `base`; `0` disables it.
    #[must_use]
    pub fn with_serial(mut self, base: u16) -> Self {
        self.early_serial_base = base;
        self
    }

    #[must_use]
    pub const fn early_serial_base(&self) -> u16 {
        self.early_serial_base
    }

    fn bios_putchar(&mut self, ch: u8) {
        let mut ireg = BiosRegs::initregs(self.segments);
        ireg.set_bx(0x0007); // page 0, light grey
        ireg.set_cx(0x0001);
        ireg.set_ah(TELETYPE_OUTPUT);
        ireg.set_al(ch);
        self.bios.intcall(INT_VIDEO, &ireg, None);
    }

    fn serial_putchar(&mut self, ch: u8) {
        let base = self.early_serial_base;
        let mut timeout: u16 = 0xFFFF;

        while self.ports.inb(base + LSR) & XMTRDY == 0 {
            timeout -= 1;
            if timeout == 0 {
                break;
            }
            core::hint::spin_loop();
        }

        self.ports.outb(base + TXR, ch);
    }
}

impl<P, IO> Console for BiosTty<P, IO>
where
    P: PlatformCall,
    IO: PortIo,
{
    fn putchar(&mut self, ch: u8) {
        if ch == b'\n' {
            self.putchar(b'\r');
        }

        self.bios_putchar(ch);

        if self.early_serial_base != 0 {
            self.serial_putchar(ch);
        }
    }
}

impl<P, IO> fmt::Write for BiosTty<P, IO>
where
    P: PlatformCall,
    IO: PortIo,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.puts(s);
        Ok(())
    }
}

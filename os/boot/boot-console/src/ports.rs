/// Byte-wide x86 I/O port access.
pub trait PortIo {
    fn inb(&mut self, port: u16) -> u8;
    fn outb(&mut self, port: u16, value: u8);
}

/// [`PortIo`] through the `in`/`out` instructions.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[derive(Copy, Clone, Debug)]
pub struct IoPorts {
    _private: (),
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl IoPorts {
    /// # Safety
    /// Port I/O must be permitted (CPL ≤ IOPL, which holds in real mode and
    /// ring 0), and the caller takes responsibility for every port touched.
    #[must_use]
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl PortIo for IoPorts {
    #[inline]
    fn inb(&mut self, port: u16) -> u8 {
        let val: u8;
        unsafe {
            core::arch::asm!(
                "in al, dx",
                in("dx") port,
                out("al") val,
                options(nomem, nostack, preserves_flags)
            );
        }
        val
    }

    #[inline]
    fn outb(&mut self, port: u16, value: u8) {
        unsafe {
            core::arch::asm!(
                "out dx, al",
                in("dx") port,
                in("al") value,
                options(nomem, nostack, preserves_flags)
            );
        }
    }
}

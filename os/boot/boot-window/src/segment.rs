//! Real-mode `%fs`/`%gs` windows.
//!
//! The setup code keeps `%ds`, `%es` and `%ss` equal to its own segment, so
//! `%fs` and `%gs` are free to point elsewhere. Every access below carries a
//! segment-override prefix; nothing else about the addressing assumptions of
//! the surrounding code changes.

use crate::{MemoryWindow, Offset};
use core::arch::asm;
use core::marker::PhantomData;

mod sealed {
    pub trait Sealed {}
}

/// A segment register usable as a window base.
pub trait SegmentRegister: sealed::Sealed {
    /// # Safety
    /// Real mode only: any 16-bit value is a valid paragraph number there,
    /// in protected mode it would have to be a valid selector.
    unsafe fn load(segment: u16);

    fn current() -> u16;

    /// # Safety
    /// Reads `segment:offset` without any validation.
    unsafe fn read8(offset: Offset) -> u8;

    /// # Safety
    /// See [`read8`](Self::read8).
    unsafe fn read16(offset: Offset) -> u16;

    /// # Safety
    /// See [`read8`](Self::read8).
    unsafe fn read32(offset: Offset) -> u32;

    /// # Safety
    /// Writes `segment:offset` without any validation.
    unsafe fn write8(offset: Offset, value: u8);

    /// # Safety
    /// See [`write8`](Self::write8).
    unsafe fn write16(offset: Offset, value: u16);

    /// # Safety
    /// See [`write8`](Self::write8).
    unsafe fn write32(offset: Offset, value: u32);
}

macro_rules! segment_register {
    ($name:ident, $reg:literal) => {
        #[doc = concat!("The `%", $reg, "` segment register.")]
        #[derive(Copy, Clone, Debug)]
        pub enum $name {}

        impl sealed::Sealed for $name {}

        impl SegmentRegister for $name {
            #[inline]
            unsafe fn load(segment: u16) {
                unsafe {
                    asm!(concat!("mov ", $reg, ", {0:x}"), in(reg) segment, options(nostack, preserves_flags));
                }
            }

            #[inline]
            fn current() -> u16 {
                let seg: u16;
                unsafe {
                    asm!(concat!("mov {0:x}, ", $reg), out(reg) seg, options(nomem, nostack, preserves_flags));
                }
                seg
            }

            #[inline]
            unsafe fn read8(offset: Offset) -> u8 {
                let v: u8;
                unsafe {
                    asm!(concat!("mov {v}, byte ptr ", $reg, ":[{a:e}]"), v = out(reg_byte) v, a = in(reg) offset, options(nostack, preserves_flags, readonly));
                }
                v
            }

            #[inline]
            unsafe fn read16(offset: Offset) -> u16 {
                let v: u16;
                unsafe {
                    asm!(concat!("mov {v:x}, word ptr ", $reg, ":[{a:e}]"), v = out(reg) v, a = in(reg) offset, options(nostack, preserves_flags, readonly));
                }
                v
            }

            #[inline]
            unsafe fn read32(offset: Offset) -> u32 {
                let v: u32;
                unsafe {
                    asm!(concat!("mov {v:e}, dword ptr ", $reg, ":[{a:e}]"), v = out(reg) v, a = in(reg) offset, options(nostack, preserves_flags, readonly));
                }
                v
            }

            #[inline]
            unsafe fn write8(offset: Offset, value: u8) {
                unsafe {
                    asm!(concat!("mov byte ptr ", $reg, ":[{a:e}], {v}"), v = in(reg_byte) value, a = in(reg) offset, options(nostack, preserves_flags));
                }
            }

            #[inline]
            unsafe fn write16(offset: Offset, value: u16) {
                unsafe {
                    asm!(concat!("mov word ptr ", $reg, ":[{a:e}], {v:x}"), v = in(reg) value, a = in(reg) offset, options(nostack, preserves_flags));
                }
            }

            #[inline]
            unsafe fn write32(offset: Offset, value: u32) {
                unsafe {
                    asm!(concat!("mov dword ptr ", $reg, ":[{a:e}], {v:e}"), v = in(reg) value, a = in(reg) offset, options(nostack, preserves_flags));
                }
            }
        }
    };
}

segment_register!(Fs, "fs");
segment_register!(Gs, "gs");

/// A [`MemoryWindow`] backed by a real segment register.
pub struct SegmentWindow<R: SegmentRegister> {
    segment: u16,
    _reg: PhantomData<R>,
}

impl<R: SegmentRegister> SegmentWindow<R> {
    /// Take over segment register `R`, starting from its current value.
    ///
    /// # Safety
    /// The CPU must be in real mode, and no other code may rely on the value
    /// of `R` for as long as the window is in use.
    #[must_use]
    pub unsafe fn new() -> Self {
        Self {
            segment: R::current(),
            _reg: PhantomData,
        }
    }
}

impl<R: SegmentRegister> MemoryWindow for SegmentWindow<R> {
    #[inline]
    fn select(&mut self, segment: u16) {
        // SAFETY: real mode was promised by `SegmentWindow::new`.
        unsafe { R::load(segment) };
        self.segment = segment;
    }

    #[inline]
    fn segment(&self) -> u16 {
        self.segment
    }

    #[inline]
    fn read8(&self, offset: Offset) -> u8 {
        unsafe { R::read8(offset) }
    }

    #[inline]
    fn write8(&mut self, offset: Offset, value: u8) {
        unsafe { R::write8(offset, value) }
    }

    #[inline]
    fn read16(&self, offset: Offset) -> u16 {
        unsafe { R::read16(offset) }
    }

    #[inline]
    fn read32(&self, offset: Offset) -> u32 {
        unsafe { R::read32(offset) }
    }

    #[inline]
    fn write16(&mut self, offset: Offset, value: u16) {
        unsafe { R::write16(offset, value) }
    }

    #[inline]
    fn write32(&mut self, offset: Offset, value: u32) {
        unsafe { R::write32(offset, value) }
    }
}

//! # Windowed Memory Access
//!
//! Real-mode boot code runs with `%ds` pinned to its own 64 KiB segment. To
//! touch anything outside of that window (the BIOS data area, the EBDA, the
//! upper BIOS ROM area) the code re-points one of the spare segment registers
//! (`%fs`, `%gs`) and addresses memory *relative to that segment's base*.
//!
//! This crate models that pattern as a [`MemoryWindow`]: a span of memory
//! whose origin is chosen with [`MemoryWindow::select`] and which is then
//! read, written and compared through offsets relative to that origin.
//!
//! ```text
//!   linear address = (segment << 4) + offset
//!
//!   0x00000 ┌──────────────────────┐
//!           │ IVT / BDA            │ ◄── select(0x0000), read16(0x40E)
//!           │ ...                  │
//!   0x9FC00 │ EBDA                 │ ◄── select(0x9FC0), read8(0x20)
//!           │ ...                  │
//!   0xE0000 │ BIOS ROM             │
//!   0xFFFFF └──────────────────────┘
//! ```
//!
//! ## Contract
//! * Offsets are **not** bounds-checked, and nothing verifies that a window
//!   was selected before use. The caller owns the correctness of every offset.
//! * Multi-byte values are little-endian.
//! * [`MemoryWindow::block_differs`] reports *whether* a block differs, not how
//!   it orders; callers needing `memcmp`-style ordering must look elsewhere.
//!
//! ## Implementations
//! * [`FlatWindow`]: a byte buffer standing in for physical memory starting at
//!   address zero. Used on the host and in tests.
//! * [`IdentityWindow`]: volatile pointer arithmetic over identity-mapped
//!   physical memory, for code that already runs in protected or long mode.
//! * `SegmentWindow<Fs>` / `SegmentWindow<Gs>` (32-bit x86 only): the real
//!   thing, using segment-override prefixes.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod flat;
mod identity;
#[cfg(target_arch = "x86")]
mod segment;

pub use flat::FlatWindow;
pub use identity::IdentityWindow;
#[cfg(target_arch = "x86")]
pub use segment::{Fs, Gs, SegmentRegister, SegmentWindow};

/// Offset relative to the currently selected window base.
pub type Offset = u32;

/// Linear base address of a real-mode segment (`segment << 4`).
#[inline]
#[must_use]
pub const fn segment_base(segment: u16) -> u32 {
    (segment as u32) << 4
}

/// Byte/word/dword access relative to a movable segment base.
pub trait MemoryWindow {
    /// Move the window so that offset `0` addresses `segment << 4`.
    fn select(&mut self, segment: u16);

    /// The segment last passed to [`select`](Self::select).
    fn segment(&self) -> u16;

    fn read8(&self, offset: Offset) -> u8;

    fn write8(&mut self, offset: Offset, value: u8);

    #[inline]
    fn read16(&self, offset: Offset) -> u16 {
        u16::from_le_bytes([self.read8(offset), self.read8(offset.wrapping_add(1))])
    }

    #[inline]
    fn read32(&self, offset: Offset) -> u32 {
        u32::from_le_bytes([
            self.read8(offset),
            self.read8(offset.wrapping_add(1)),
            self.read8(offset.wrapping_add(2)),
            self.read8(offset.wrapping_add(3)),
        ])
    }

    #[inline]
    fn write16(&mut self, offset: Offset, value: u16) {
        for (i, b) in (0..).zip(value.to_le_bytes()) {
            self.write8(offset.wrapping_add(i), b);
        }
    }

    #[inline]
    fn write32(&mut self, offset: Offset, value: u32) {
        for (i, b) in (0..).zip(value.to_le_bytes()) {
            self.write8(offset.wrapping_add(i), b);
        }
    }

    /// Compare `local` against `local.len()` bytes of the window at `offset`.
    ///
    /// Returns `true` if any byte differs. Note: this only answers
    /// "equal or not", it does not produce a signed ordering.
    fn block_differs(&self, local: &[u8], offset: Offset) -> bool {
        (0..)
            .zip(local)
            .any(|(i, &b)| self.read8(offset.wrapping_add(i)) != b)
    }
}

impl<W: MemoryWindow + ?Sized> MemoryWindow for &mut W {
    #[inline]
    fn select(&mut self, segment: u16) {
        (**self).select(segment);
    }

    #[inline]
    fn segment(&self) -> u16 {
        (**self).segment()
    }

    #[inline]
    fn read8(&self, offset: Offset) -> u8 {
        (**self).read8(offset)
    }

    #[inline]
    fn write8(&mut self, offset: Offset, value: u8) {
        (**self).write8(offset, value);
    }

    #[inline]
    fn read16(&self, offset: Offset) -> u16 {
        (**self).read16(offset)
    }

    #[inline]
    fn read32(&self, offset: Offset) -> u32 {
        (**self).read32(offset)
    }

    #[inline]
    fn write16(&mut self, offset: Offset, value: u16) {
        (**self).write16(offset, value);
    }

    #[inline]
    fn write32(&mut self, offset: Offset, value: u32) {
        (**self).write32(offset, value);
    }

    #[inline]
    fn block_differs(&self, local: &[u8], offset: Offset) -> bool {
        (**self).block_differs(local, offset)
    }
}

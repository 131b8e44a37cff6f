use crate::{MemoryWindow, Offset, segment_base};

/// A [`MemoryWindow`] over identity-mapped physical memory.
///
/// Once the CPU has left real mode there is no segment arithmetic any more;
/// the decompressor runs on an identity map and simply dereferences physical
/// addresses. "Selecting" a segment merely moves the origin by `segment << 4`
/// so callers written against real-mode windows keep working unchanged.
pub struct IdentityWindow {
    origin: usize,
    segment: u16,
}

impl IdentityWindow {
    /// Create a window whose offset `0` (with segment `0`) is the physical
    /// address `origin` as seen through the current mapping.
    ///
    /// # Safety
    /// Every address the window is later asked to touch must be mapped and
    /// accessible in the current address space. Nothing is checked.
    #[must_use]
    pub const unsafe fn new(origin: usize) -> Self {
        Self { origin, segment: 0 }
    }

    #[inline]
    fn addr(&self, offset: Offset) -> usize {
        self.origin
            .wrapping_add(segment_base(self.segment) as usize)
            .wrapping_add(offset as usize)
    }
}

impl MemoryWindow for IdentityWindow {
    #[inline]
    fn select(&mut self, segment: u16) {
        self.segment = segment;
    }

    #[inline]
    fn segment(&self) -> u16 {
        self.segment
    }

    #[inline]
    fn read8(&self, offset: Offset) -> u8 {
        // SAFETY: mapping validity was promised to `IdentityWindow::new`.
        unsafe { core::ptr::read_volatile(self.addr(offset) as *const u8) }
    }

    #[inline]
    fn write8(&mut self, offset: Offset, value: u8) {
        // SAFETY: mapping validity was promised to `IdentityWindow::new`.
        unsafe { core::ptr::write_volatile(self.addr(offset) as *mut u8, value) }
    }
}

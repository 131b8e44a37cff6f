use crate::{MemoryWindow, Offset, segment_base};

/// Value returned for reads that fall outside of the backing buffer.
const FLOATING_BUS: u8 = 0xFF;

/// A [`MemoryWindow`] over a plain byte buffer that represents physical
/// memory starting at linear address `0`.
///
/// Addresses beyond the end of the buffer read as `0xFF` and swallow writes,
/// much like unpopulated address space on real hardware.
pub struct FlatWindow<B> {
    memory: B,
    segment: u16,
}

impl<B> FlatWindow<B>
where
    B: AsRef<[u8]>,
{
    /// Wrap `memory`; the window initially addresses segment `0`.
    #[must_use]
    pub const fn new(memory: B) -> Self {
        Self { memory, segment: 0 }
    }

    /// The whole backing buffer, independent of the selected window.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.memory.as_ref()
    }

    #[must_use]
    pub fn into_inner(self) -> B {
        self.memory
    }

    #[inline]
    fn linear(&self, offset: Offset) -> usize {
        segment_base(self.segment).wrapping_add(offset) as usize
    }
}

impl<B> MemoryWindow for FlatWindow<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
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
        self.memory
            .as_ref()
            .get(self.linear(offset))
            .copied()
            .unwrap_or(FLOATING_BUS)
    }

    #[inline]
    fn write8(&mut self, offset: Offset, value: u8) {
        let at = self.linear(offset);
        if let Some(byte) = self.memory.as_mut().get_mut(at) {
            *byte = value;
        }
    }
}

//! `lidt` operand and the seam that executes it.

/// Operand format used by `lidt` (limit + base).
///
/// In 32-bit code the CPU only consumes the limit and the low four bytes of
/// the base, which is what this layout puts first.
#[repr(C, packed)]
#[derive(Copy, Clone)]
pub struct DescriptorTablePointer {
    limit: u16,
    base: u64,
}

const _: () = assert!(size_of::<DescriptorTablePointer>() == 10);

impl DescriptorTablePointer {
    /// Zero limit at base zero: every vector is out of bounds.
    pub const DISABLED: Self = Self::new(0, 0);

    #[must_use]
    pub const fn new(limit: u16, base: u64) -> Self {
        Self { limit, base }
    }

    #[must_use]
    pub const fn limit(&self) -> u16 {
        self.limit
    }

    #[must_use]
    pub const fn base(&self) -> u64 {
        self.base
    }

    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.limit() == 0 && self.base() == 0
    }
}

impl PartialEq for DescriptorTablePointer {
    fn eq(&self, other: &Self) -> bool {
        self.limit() == other.limit() && self.base() == other.base()
    }
}

impl Eq for DescriptorTablePointer {}

impl core::fmt::Debug for DescriptorTablePointer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DescriptorTablePointer")
            .field("limit", &self.limit())
            .field("base", &format_args!("{:#x}", self.base()))
            .finish()
    }
}

/// Makes a descriptor table pointer the CPU's current IDT.
pub trait IdtLoader {
    fn load(&mut self, pointer: &DescriptorTablePointer);
}

impl<L: IdtLoader + ?Sized> IdtLoader for &mut L {
    fn load(&mut self, pointer: &DescriptorTablePointer) {
        (**self).load(pointer);
    }
}

/// Executes `lidt`.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[derive(Copy, Clone)]
pub struct Lidt {
    _private: (),
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl Lidt {
    /// # Safety
    /// Loading an IDT replaces the exception handling of the running CPU. The
    /// caller must run at CPL 0 and every pointer passed to [`IdtLoader::load`]
    /// must reference a table that stays in place while it is loaded.
    #[must_use]
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl IdtLoader for Lidt {
    #[inline]
    fn load(&mut self, pointer: &DescriptorTablePointer) {
        unsafe {
            core::arch::asm!(
                "lidt [{}]",
                in(reg) core::ptr::from_ref(pointer),
                options(nostack, preserves_flags, readonly)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_is_all_zero() {
        let p = DescriptorTablePointer::DISABLED;
        assert_eq!(p.limit(), 0);
        assert_eq!(p.base(), 0);
        assert!(p.is_disabled());
        assert!(!DescriptorTablePointer::new(511, 0).is_disabled());
    }
}

//! # Segment selectors
//!
//! ```text
//!  15            3 2  1  0
//! +----------------+--+----+
//! |   Index[12:0]  |TI| RPL|
//! +----------------+--+----+  (TI=0 → GDT, TI=1 → LDT; RPL=0..3)
//! ```
//!
//! Gates only ever need a code selector, so that is the only typed
//! selector kind provided here.

use bitfield_struct::bitfield;
use core::marker::PhantomData;

/// GDT slot of the 64-bit kernel code segment set up by the decompressor.
pub const KERNEL_CS_INDEX: u16 = 2;

/// The kernel code selector (`0x10`) every boot gate runs in.
pub const KERNEL_CS: SegmentSelector<CodeSel> = SegmentSelector::<CodeSel>::new(KERNEL_CS_INDEX, Rpl::Ring0);

/// Requested Privilege Level (low two selector bits).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[repr(u8)]
pub enum Rpl {
    Ring0 = 0,
    Ring1 = 1,
    Ring2 = 2,
    Ring3 = 3,
}

impl Rpl {
    #[inline]
    #[must_use]
    pub const fn into_bits(self) -> u16 {
        self as u16
    }

    #[inline]
    #[must_use]
    pub const fn from_bits(value: u16) -> Self {
        match value & 0b11 {
            0 => Self::Ring0,
            1 => Self::Ring1,
            2 => Self::Ring2,
            _ => Self::Ring3,
        }
    }
}

/// Which descriptor table a selector addresses.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[repr(u8)]
pub enum Table {
    /// Global Descriptor Table
    Gdt = 0,
    /// Local Descriptor Table
    Ldt = 1,
}

impl Table {
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        if bits == 0 { Self::Gdt } else { Self::Ldt }
    }

    #[inline]
    #[must_use]
    pub const fn into_bits(self) -> u8 {
        self as u8
    }
}

/// Raw 16-bit selector encoding (index/TI/RPL).
#[bitfield(u16)]
#[derive(Eq, PartialEq)]
pub struct SegmentSelectorRaw {
    /// Requested Privilege Level (bits 0..1).
    #[bits(2)]
    pub rpl: Rpl,
    /// Table Indicator (bit 2): 0 = GDT, 1 = LDT.
    #[bits(1)]
    pub ti: Table,
    /// Descriptor index (bits 3..15).
    #[bits(13)]
    pub index: u16,
}

/// Marker trait for typed selectors.
pub trait SelectorKind: Copy {}

/// Code segment (CS) selector.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CodeSel {}

impl SelectorKind for CodeSel {}

/// Strongly-typed selector wrapper.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SegmentSelector<K: SelectorKind>(SegmentSelectorRaw, PhantomData<K>);

impl<K: SelectorKind> SegmentSelector<K> {
    #[inline]
    #[must_use]
    pub const fn raw(self) -> SegmentSelectorRaw {
        self.0
    }

    /// Encode as the `u16` stored in a gate.
    #[inline]
    #[must_use]
    pub const fn encode(self) -> u16 {
        self.0.into_bits()
    }
}

impl SegmentSelector<CodeSel> {
    /// Create a **code** selector from a GDT index and RPL.
    #[inline]
    #[must_use]
    pub const fn new(index: u16, rpl: Rpl) -> Self {
        Self(
            SegmentSelectorRaw::new()
                .with_index(index)
                .with_ti(Table::Gdt)
                .with_rpl(rpl),
            PhantomData,
        )
    }
}

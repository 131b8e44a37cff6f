//! # Boot IDT layout
//!
//! Exact 16-byte x86-64 gate layout per the Intel SDM, chapter "Interrupt
//! Descriptor Table". The middle two bytes (IST + type/attributes) are encoded
//! through [`IdtGateAttr`]; everything else stays `repr(C)` to keep offsets
//! obvious.
//!
//! Only the 32 architectural exception vectors exist in the boot table;
//! no IRQ is ever unmasked during setup.

use crate::selectors::{CodeSel, SegmentSelector};
use bitfield_struct::bitfield;
use core::ops::{Index, IndexMut};

/// Number of gates in the boot IDT (the exception vectors).
pub const BOOT_IDT_ENTRIES: usize = 32;

/// `#PF`
pub const PAGE_FAULT_VECTOR: usize = 0x0E;

const _: () = assert!(size_of::<IdtEntry>() == 16);
const _: () = assert!(align_of::<Idt>() == 16);
const _: () = assert!(size_of::<Idt>() == BOOT_IDT_ENTRIES * 16);

/// Two bytes of an IDT entry that pack:
///
/// - **low byte**: `IST` (3 bits) + 5 reserved zero bits
/// - **high byte**: `| P | DPL(2) | S(0) | Type(4) |`
#[bitfield(u16)]
#[derive(Eq, PartialEq)]
pub struct IdtGateAttr {
    /// **IST** – Interrupt Stack Table index (0 disables IST switching).
    #[bits(3)]
    pub ist: u8,

    #[bits(5)]
    __zero0: u8,

    /// **Type** – 0xE = *Interrupt gate*, 0xF = *Trap gate*.
    #[bits(4)]
    pub typ: u8,

    /// **S** – System bit (must be `0` for interrupt/trap gates).
    #[bits(1)]
    pub s: bool,

    /// **DPL** – Descriptor Privilege Level (0..=3).
    #[bits(2)]
    pub dpl: u8,

    /// **P** – Present bit.
    #[bits(1)]
    pub present: bool,
}

/// Gate kinds.
///
/// - [`GateType::InterruptGate`] clears IF on entry.
/// - [`GateType::TrapGate`] leaves IF unchanged.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GateType {
    InterruptGate,
    TrapGate,
}

impl GateType {
    #[inline]
    #[must_use]
    pub const fn into_bits(self) -> u8 {
        match self {
            Self::InterruptGate => 0xE,
            Self::TrapGate => 0xF,
        }
    }

    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0xE => Some(Self::InterruptGate),
            0xF => Some(Self::TrapGate),
            _ => None,
        }
    }
}

/// One **16-byte** x86-64 IDT gate descriptor.
///
/// ```text
/// 127            96 95                 64
/// +----------------+---------------------+
/// |      zero      |    offset[63:32]    |
/// +----------------+---------------------+
/// 63          48 47     32 31      16 15       0
/// +-------------+---------+----------+----------+
/// |offset[31:16]| P/DPL/  | selector |offset    |
/// |             | type/IST|          |[15:0]    |
/// +-------------+---------+----------+----------+
/// ```
#[repr(C)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct IdtEntry {
    offset_lo: u16,
    selector: u16,
    ist_type: u16,
    offset_mid: u16,
    offset_hi: u32,
    zero: u32,
}

impl IdtEntry {
    /// A zeroed, non-present entry.
    pub const MISSING: Self = Self {
        offset_lo: 0,
        selector: 0,
        ist_type: 0,
        offset_mid: 0,
        offset_hi: 0,
        zero: 0,
    };

    /// Reset the entry, store the handler address and return a builder.
    ///
    /// The entry starts out as a **non-present interrupt gate** with a null
    /// selector.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn set_handler(&mut self, addr: u64) -> IdtEntryBuilder<'_> {
        *self = Self::MISSING;
        self.offset_lo = (addr & 0xFFFF) as u16;
        self.offset_mid = ((addr >> 16) & 0xFFFF) as u16;
        self.offset_hi = (addr >> 32) as u32;
        self.ist_type = IdtGateAttr::new()
            .with_typ(GateType::InterruptGate.into_bits())
            .into_bits();
        IdtEntryBuilder { entry: self }
    }

    /// The handler address reassembled from its three pieces.
    #[must_use]
    pub const fn handler_address(&self) -> u64 {
        (self.offset_lo as u64) | ((self.offset_mid as u64) << 16) | ((self.offset_hi as u64) << 32)
    }

    #[must_use]
    pub const fn selector(&self) -> u16 {
        self.selector
    }

    #[must_use]
    pub const fn attributes(&self) -> IdtGateAttr {
        IdtGateAttr::from_bits(self.ist_type)
    }

    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.attributes().present()
    }

    #[must_use]
    pub const fn gate_type(&self) -> Option<GateType> {
        GateType::from_bits(self.attributes().typ())
    }
}

/// Fluent builder for an [`IdtEntry`].
pub struct IdtEntryBuilder<'a> {
    entry: &'a mut IdtEntry,
}

impl IdtEntryBuilder<'_> {
    /// Set the **Present** bit.
    #[inline]
    pub const fn present(self, p: bool) -> Self {
        self.entry.ist_type = IdtGateAttr::from_bits(self.entry.ist_type)
            .with_present(p)
            .into_bits();
        self
    }

    /// Choose interrupt or trap gate.
    #[inline]
    pub const fn gate_type(self, gate_type: GateType) -> Self {
        self.entry.ist_type = IdtGateAttr::from_bits(self.entry.ist_type)
            .with_typ(gate_type.into_bits())
            .with_s(false)
            .into_bits();
        self
    }

    /// Set the code segment the handler runs in.
    #[inline]
    pub const fn selector(self, sel: SegmentSelector<CodeSel>) -> Self {
        self.entry.selector = sel.encode();
        self
    }
}

/// The boot-stage **Interrupt Descriptor Table**: one gate per exception
/// vector, 16-byte aligned.
#[repr(C, align(16))]
#[derive(Clone)]
pub struct Idt {
    entries: [IdtEntry; BOOT_IDT_ENTRIES],
}

impl Default for Idt {
    fn default() -> Self {
        Self::new()
    }
}

impl Idt {
    /// An all-empty table: every gate not present.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: [IdtEntry::MISSING; BOOT_IDT_ENTRIES],
        }
    }

    /// The `lidt` limit covering the whole table.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub const fn limit() -> u16 {
        (size_of::<Self>() - 1) as u16
    }

    pub fn iter(&self) -> impl Iterator<Item = &IdtEntry> {
        self.entries.iter()
    }
}

impl Index<usize> for Idt {
    type Output = IdtEntry;
    fn index(&self, i: usize) -> &Self::Output {
        &self.entries[i]
    }
}

impl IndexMut<usize> for Idt {
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        &mut self.entries[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selectors::KERNEL_CS;

    #[test]
    fn handler_split_roundtrip() {
        let mut e = IdtEntry::MISSING;
        e.set_handler(0xFFFF_8000_1234_5678);
        assert_eq!(e.offset_lo, 0x5678);
        assert_eq!(e.offset_mid, 0x1234);
        assert_eq!(e.offset_hi, 0xFFFF_8000);
        assert_eq!(e.handler_address(), 0xFFFF_8000_1234_5678);
        assert!(!e.is_present());
    }

    #[test]
    fn trap_gate_attribute_byte() {
        let mut e = IdtEntry::MISSING;
        e.set_handler(0x1000)
            .selector(KERNEL_CS)
            .present(true)
            .gate_type(GateType::TrapGate);

        // P=1, DPL=0, S=0, type=0xF, IST=0
        assert_eq!(e.ist_type, 0x8F00);
        assert_eq!(e.selector(), 0x10);
        assert_eq!(e.gate_type(), Some(GateType::TrapGate));
    }

    #[test]
    fn new_table_is_empty() {
        let idt = Idt::new();
        assert!(idt.iter().all(|e| *e == IdtEntry::MISSING));
        assert_eq!(Idt::limit(), 511);
    }
}

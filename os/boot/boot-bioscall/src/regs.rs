//! # Register snapshot
//!
//! The snapshot is stored as eleven 32-bit slots in exactly the order the
//! trampoline pushes and pops them (`pushal`, segment pushes, `pushfl`):
//!
//! ```text
//! +0  edi   +4  esi   +8  ebp   +12 esp   +16 ebx   +20 edx
//! +24 ecx   +28 eax   +32 gs|fs +36 es|ds +40 eflags
//! ```
//!
//! Narrow views (`ax`, `al`, `ah`, `fs`, `ds`, ...) are derived by shift/mask
//! through [`Halves`] and [`Bytes`], never through memory aliasing.

use crate::eflags::Eflags;
use bitfield_struct::bitfield;
use core::mem::size_of;

/// Low and high 16-bit halves of a 32-bit slot.
#[bitfield(u32)]
struct Halves {
    #[bits(16)]
    lo: u16,
    #[bits(16)]
    hi: u16,
}

/// Low and high bytes of a 16-bit register (`al`/`ah`).
#[bitfield(u16)]
struct Bytes {
    #[bits(8)]
    lo: u8,
    #[bits(8)]
    hi: u8,
}

/// Data segment registers handed to the firmware by [`BiosRegs::initregs`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SegmentState {
    pub ds: u16,
    pub es: u16,
    pub fs: u16,
    pub gs: u16,
}

/// Every general-purpose register plus segments and flags, as seen by a
/// firmware service.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct BiosRegs {
    edi: u32,
    esi: u32,
    ebp: u32,
    esp: u32,
    ebx: u32,
    edx: u32,
    ecx: u32,
    eax: u32,
    fsgs: u32,
    dses: u32,
    eflags: u32,
}

const _: () = assert!(size_of::<BiosRegs>() == 44);

macro_rules! dword {
    ($field:ident, $set:ident) => {
        #[inline]
        #[must_use]
        pub const fn $field(&self) -> u32 {
            self.$field
        }

        #[inline]
        pub const fn $set(&mut self, v: u32) {
            self.$field = v;
        }
    };
}

macro_rules! word {
    ($slot:ident, $half:ident, $with:ident, $get:ident, $set:ident) => {
        #[inline]
        #[must_use]
        pub const fn $get(&self) -> u16 {
            Halves::from_bits(self.$slot).$half()
        }

        #[inline]
        pub const fn $set(&mut self, v: u16) {
            self.$slot = Halves::from_bits(self.$slot).$with(v).into_bits();
        }
    };
}

macro_rules! byte {
    ($word:ident, $set_word:ident, $half:ident, $with:ident, $get:ident, $set:ident) => {
        #[inline]
        #[must_use]
        pub const fn $get(&self) -> u8 {
            Bytes::from_bits(self.$word()).$half()
        }

        #[inline]
        pub const fn $set(&mut self, v: u8) {
            self.$set_word(Bytes::from_bits(self.$word()).$with(v).into_bits());
        }
    };
}

impl BiosRegs {
    /// An all-zero snapshot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            edi: 0,
            esi: 0,
            ebp: 0,
            esp: 0,
            ebx: 0,
            edx: 0,
            ecx: 0,
            eax: 0,
            fsgs: 0,
            dses: 0,
            eflags: 0,
        }
    }

    /// A zeroed snapshot prepared for a call from the setup code: data
    /// segments point where the caller's do, and CF is preset so a service
    /// that never touches CF reads as "failed".
    #[must_use]
    pub const fn initregs(segments: SegmentState) -> Self {
        let mut regs = Self::new();
        regs.set_ds(segments.ds);
        regs.set_es(segments.es);
        regs.set_fs(segments.fs);
        regs.set_gs(segments.gs);
        regs.eflags = Eflags::new().with_cf_carry(true).into_bits();
        regs
    }

    dword!(eax, set_eax);
    dword!(ebx, set_ebx);
    dword!(ecx, set_ecx);
    dword!(edx, set_edx);
    dword!(esi, set_esi);
    dword!(edi, set_edi);
    dword!(ebp, set_ebp);
    dword!(esp, set_esp);
    dword!(eflags, set_eflags);

    word!(eax, lo, with_lo, ax, set_ax);
    word!(ebx, lo, with_lo, bx, set_bx);
    word!(ecx, lo, with_lo, cx, set_cx);
    word!(edx, lo, with_lo, dx, set_dx);
    word!(esi, lo, with_lo, si, set_si);
    word!(edi, lo, with_lo, di, set_di);
    word!(ebp, lo, with_lo, bp, set_bp);
    word!(esp, lo, with_lo, sp, set_sp);
    word!(eflags, lo, with_lo, flags, set_flags);

    word!(fsgs, lo, with_lo, gs, set_gs);
    word!(fsgs, hi, with_hi, fs, set_fs);
    word!(dses, lo, with_lo, es, set_es);
    word!(dses, hi, with_hi, ds, set_ds);

    byte!(ax, set_ax, lo, with_lo, al, set_al);
    byte!(ax, set_ax, hi, with_hi, ah, set_ah);
    byte!(bx, set_bx, lo, with_lo, bl, set_bl);
    byte!(bx, set_bx, hi, with_hi, bh, set_bh);
    byte!(cx, set_cx, lo, with_lo, cl, set_cl);
    byte!(cx, set_cx, hi, with_hi, ch, set_ch);
    byte!(dx, set_dx, lo, with_lo, dl, set_dl);
    byte!(dx, set_dx, hi, with_hi, dh, set_dh);
    byte!(di, set_di, lo, with_lo, dil, set_dil);
    byte!(si, set_si, lo, with_lo, sil, set_sil);
    byte!(bp, set_bp, lo, with_lo, bpl, set_bpl);

    /// Typed view of the flags slot.
    #[inline]
    #[must_use]
    pub const fn status(&self) -> Eflags {
        Eflags::from_bits(self.eflags)
    }

    /// The carry flag, the usual "service failed" indicator.
    #[inline]
    #[must_use]
    pub const fn carry(&self) -> bool {
        self.status().cf_carry()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_by_default() {
        assert_eq!(BiosRegs::new(), BiosRegs::default());
        assert_eq!(BiosRegs::new().eflags(), 0);
    }

    #[test]
    fn narrow_views_share_storage() {
        let mut r = BiosRegs::new();
        r.set_eax(0x1234_5678);
        assert_eq!(r.ax(), 0x5678);
        assert_eq!(r.ah(), 0x56);
        assert_eq!(r.al(), 0x78);

        r.set_ah(0x0E);
        assert_eq!(r.eax(), 0x1234_0E78);
        r.set_al(b'A');
        assert_eq!(r.eax(), 0x1234_0E41);
        r.set_ax(0xFFFF);
        assert_eq!(r.eax(), 0x1234_FFFF);
    }

    #[test]
    fn segment_halves() {
        let mut r = BiosRegs::new();
        r.set_gs(0x1111);
        r.set_fs(0x2222);
        r.set_es(0x3333);
        r.set_ds(0x4444);
        assert_eq!(r.fsgs, 0x2222_1111);
        assert_eq!(r.dses, 0x4444_3333);
    }

    #[test]
    fn initregs_presets_carry_and_segments() {
        let seg = SegmentState {
            ds: 0x1000,
            es: 0x1000,
            fs: 0x0000,
            gs: 0xF000,
        };
        let r = BiosRegs::initregs(seg);
        assert!(r.carry());
        assert_eq!(r.eflags(), 1);
        assert_eq!((r.ds(), r.es(), r.fs(), r.gs()), (0x1000, 0x1000, 0, 0xF000));
        assert_eq!(r.eax() | r.ebx() | r.ecx() | r.edx(), 0);
    }

    #[test]
    fn layout_matches_trampoline_frame() {
        let mut r = BiosRegs::new();
        r.set_edi(1);
        r.set_eax(8);
        r.set_eflags(11);
        let words: [u32; 11] = unsafe { core::mem::transmute(r) };
        assert_eq!(words[0], 1);
        assert_eq!(words[7], 8);
        assert_eq!(words[10], 11);
    }
}

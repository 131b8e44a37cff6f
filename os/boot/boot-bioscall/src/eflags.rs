use bitfield_struct::bitfield;

/// Architectural EFLAGS model for 32-bit (and real-mode) x86.
///
/// Firmware services mostly signal their outcome through CF, some through ZF.
/// Reserved bits are kept as padding so a snapshot round-trips unchanged.
#[bitfield(u32, order = Lsb)]
#[derive(Eq, PartialEq)]
pub struct Eflags {
    /// Carry Flag
    pub cf_carry: bool, // 0

    /// Reserved, reads as 1 on hardware.
    #[bits(1)]
    __: u8, // 1

    /// Parity Flag
    pub pf_parity: bool, // 2

    #[bits(1)]
    __: u8, // 3

    /// Adjust Flag
    pub af_adjust: bool, // 4

    #[bits(1)]
    __: u8, // 5

    /// Zero Flag
    pub zf_zero: bool, // 6

    /// Sign Flag
    pub sf_sign: bool, // 7

    /// Trap Flag
    pub tf_trap: bool, // 8

    /// Interrupt Enable Flag
    pub if_interrupt_enable: bool, // 9

    /// Direction Flag
    pub df_direction: bool, // 10

    /// Overflow Flag
    pub of_overflow: bool, // 11

    /// I/O Privilege Level (2 bits)
    #[bits(2)]
    pub iopl: u8, // 12–13

    /// Nested Task
    pub nt_nested: bool, // 14

    #[bits(1)]
    __: u8, // 15

    /// Resume Flag
    pub rf_resume: bool, // 16

    /// Virtual 8086 mode
    pub vm_virtual_8086: bool, // 17

    /// Alignment Check
    pub ac_alignment_check: bool, // 18

    /// Virtual Interrupt Flag
    pub vif_virtual_interrupt: bool, // 19

    /// Virtual Interrupt Pending
    pub vip_virtual_interrupt_pending: bool, // 20

    /// ID Flag: allows toggling CPUID.
    pub id_cpuid: bool, // 21

    #[bits(10)]
    __: u16, // 22–31
}

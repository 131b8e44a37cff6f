use boot_bioscall::{BiosRegs, SegmentState};
use boot_console::{BiosTty, Console, ConsoleLogger, PortIo};
use core::fmt::Write;
use log::{Level, LevelFilter, Log, Record};
use std::sync::Mutex;

#[derive(Default)]
struct FakeUart {
    reads: Vec<u16>,
    writes: Vec<(u16, u8)>,
    busy_polls: usize,
}

impl PortIo for &mut FakeUart {
    fn inb(&mut self, port: u16) -> u8 {
        self.reads.push(port);
        if self.busy_polls > 0 {
            self.busy_polls -= 1;
            0x00
        } else {
            0x20
        }
    }

    fn outb(&mut self, port: u16, value: u8) {
        self.writes.push((port, value));
    }
}

fn bios_recorder(calls: &mut Vec<(u8, BiosRegs)>) -> impl FnMut(u8, &BiosRegs) -> BiosRegs + '_ {
    move |int_no, regs| {
        calls.push((int_no, *regs));
        *regs
    }
}

#[test]
fn teletype_register_convention() {
    let mut calls = Vec::new();
    let mut uart = FakeUart::default();
    let segments = SegmentState {
        ds: 0x1000,
        es: 0x1000,
        fs: 0,
        gs: 0,
    };

    let mut tty = BiosTty::new(bios_recorder(&mut calls), &mut uart, segments);
    tty.putchar(b'A');
    drop(tty);

    assert_eq!(calls.len(), 1);
    let (int_no, regs) = calls[0];
    assert_eq!(int_no, 0x10);
    assert_eq!(regs.ah(), 0x0E);
    assert_eq!(regs.al(), b'A');
    assert_eq!(regs.bx(), 0x0007);
    assert_eq!(regs.cx(), 0x0001);
    assert_eq!(regs.ds(), 0x1000);

    assert!(uart.reads.is_empty(), "no serial base configured");
    assert!(uart.writes.is_empty());
}

#[test]
fn newline_becomes_crlf() {
    let mut calls = Vec::new();
    let mut uart = FakeUart::default();

    let mut tty = BiosTty::new(bios_recorder(&mut calls), &mut uart, SegmentState::default());
    tty.puts("a\nb");
    drop(tty);

    let chars: Vec<u8> = calls.iter().map(|(_, r)| r.al()).collect();
    assert_eq!(chars, b"a\r\nb");
}

#[test]
fn serial_mirror_waits_for_transmitter() {
    let mut calls = Vec::new();
    let mut uart = FakeUart {
        busy_polls: 3,
        ..FakeUart::default()
    };

    let mut tty =
        BiosTty::new(bios_recorder(&mut calls), &mut uart, SegmentState::default()).with_serial(0x3F8);
    assert_eq!(tty.early_serial_base(), 0x3F8);
    write!(tty, "ok").unwrap();
    drop(tty);

    assert_eq!(calls.len(), 2);
    assert_eq!(uart.writes, vec![(0x3F8, b'o'), (0x3F8, b'k')]);
    // three busy polls, then ready, then one ready poll for the second byte
    assert_eq!(uart.reads, vec![0x3FD; 5]);
}

#[test]
fn serial_gives_up_after_timeout() {
    let mut calls = Vec::new();
    let mut uart = FakeUart {
        busy_polls: usize::MAX,
        ..FakeUart::default()
    };

    let mut tty =
        BiosTty::new(bios_recorder(&mut calls), &mut uart, SegmentState::default()).with_serial(0x2F8);
    tty.putchar(b'x');
    drop(tty);

    assert_eq!(uart.reads.len(), 0xFFFF);
    assert_eq!(uart.writes, vec![(0x2F8, b'x')]);
}

#[derive(Copy, Clone)]
struct Capture(&'static Mutex<Vec<u8>>);

impl Console for Capture {
    fn putchar(&mut self, ch: u8) {
        self.0.lock().unwrap().push(ch);
    }
}

#[test]
fn logger_formats_and_filters() {
    static OUT: Mutex<Vec<u8>> = Mutex::new(Vec::new());
    let logger = ConsoleLogger::new(Capture(&OUT), LevelFilter::Info);

    logger.log(
        &Record::builder()
            .args(format_args!("rsdp at {:#x}", 0xF_6A20))
            .level(Level::Info)
            .target("boot_acpi")
            .build(),
    );
    logger.log(
        &Record::builder()
            .args(format_args!("noise"))
            .level(Level::Debug)
            .target("boot_acpi")
            .build(),
    );

    let text = String::from_utf8(OUT.lock().unwrap().clone()).unwrap();
    assert_eq!(text, "[INFO] boot_acpi: rsdp at 0xf6a20\n");
}

//! PS/2 keyboard driver (8042 controller, IRQ 1).
//!
//! The IRQ handler reads one scancode from port 0x60, tracks the shift
//! keys, ignores releases, translates set-1 make codes to ASCII and
//! enqueues the byte. Producer (IRQ 1) and consumer (the blocking
//! reader) share a fixed SPSC ring: the IRQ handler runs to completion
//! before the mainline resumes, so the volatile head/tail protocol needs
//! no lock. When the ring is full the *newest* byte is dropped
//! (first-wins); earlier keystrokes are never displaced.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use bitflags::bitflags;
use x86_64::instructions::port::Port;

use crate::config::KEY_RING_CAP;

/// 8042 controller ports.
const PS2_DATA_PORT: u16 = 0x60;
const PS2_STATUS_PORT: u16 = 0x64;
const PS2_COMMAND_PORT: u16 = 0x64;

bitflags! {
    /// Status register.
    struct Status: u8 {
        const OUTPUT_FULL = 1 << 0;
        const INPUT_FULL = 1 << 1;
    }

    /// Controller configuration byte.
    struct Config: u8 {
        const KEYBOARD_INTERRUPT = 1 << 0;
        const MOUSE_INTERRUPT = 1 << 1;
        const KEYBOARD_DISABLE = 1 << 4;
        const MOUSE_DISABLE = 1 << 5;
        const TRANSLATE = 1 << 6;
    }
}

/// Controller commands.
const CMD_READ_CONFIG: u8 = 0x20;
const CMD_WRITE_CONFIG: u8 = 0x60;
const CMD_DISABLE_MOUSE: u8 = 0xA7;
const CMD_ENABLE_KEYBOARD: u8 = 0xAE;

/// Shift make/break scancodes (set 1).
const SC_LSHIFT_MAKE: u8 = 0x2A;
const SC_RSHIFT_MAKE: u8 = 0x36;
const SC_LSHIFT_BREAK: u8 = 0xAA;
const SC_RSHIFT_BREAK: u8 = 0xB6;

/// SPSC byte ring shared between the IRQ handler and the reader.
struct KeyRing {
    buffer: UnsafeCell<[u8; KEY_RING_CAP]>,
    head: AtomicUsize,
    tail: AtomicUsize,
}

// Single producer (IRQ 1) and single consumer (the shell) by
// construction; the indices are the synchronization.
unsafe impl Sync for KeyRing {}

impl KeyRing {
    const fn new() -> Self {
        Self {
            buffer: UnsafeCell::new([0; KEY_RING_CAP]),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Producer side. Full ring: the new byte is dropped.
    fn push(&self, byte: u8) {
        let head = self.head.load(Ordering::Relaxed);
        let next = (head + 1) % KEY_RING_CAP;
        if next == self.tail.load(Ordering::Acquire) {
            return;
        }
        unsafe {
            (*self.buffer.get())[head] = byte;
        }
        self.head.store(next, Ordering::Release);
    }

    /// Consumer side.
    fn pop(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }
        let byte = unsafe { (*self.buffer.get())[tail] };
        self.tail.store((tail + 1) % KEY_RING_CAP, Ordering::Release);
        Some(byte)
    }
}

static KEY_RING: KeyRing = KeyRing::new();

/// Only ever touched from the IRQ handler.
static SHIFT_HELD: AtomicBool = AtomicBool::new(false);

/// Bring up the 8042: mouse path off, translation to set 1 on, keyboard
/// interrupt enabled. The IRQ line itself is unmasked by the caller.
///
/// # Safety
///
/// Must run once, before IRQ 1 is unmasked.
pub unsafe fn init() {
    outb(PS2_COMMAND_PORT, CMD_DISABLE_MOUSE);

    // Drain anything stale in the output buffer.
    inb(PS2_DATA_PORT);

    outb(PS2_COMMAND_PORT, CMD_READ_CONFIG);
    wait_for_output();
    let mut config = Config::from_bits_retain(inb(PS2_DATA_PORT));

    config.insert(Config::KEYBOARD_INTERRUPT | Config::TRANSLATE);
    config.remove(Config::MOUSE_INTERRUPT | Config::KEYBOARD_DISABLE | Config::MOUSE_DISABLE);

    outb(PS2_COMMAND_PORT, CMD_WRITE_CONFIG);
    wait_for_input();
    outb(PS2_DATA_PORT, config.bits());

    outb(PS2_COMMAND_PORT, CMD_ENABLE_KEYBOARD);
}

/// IRQ 1 handler body. Called from the interrupt dispatcher only.
///
/// # Safety
///
/// Must only run in IRQ 1 context (sole ring producer).
pub unsafe fn handle_irq() {
    let scancode = inb(PS2_DATA_PORT);

    match scancode {
        SC_LSHIFT_MAKE | SC_RSHIFT_MAKE => {
            SHIFT_HELD.store(true, Ordering::Relaxed);
            return;
        }
        SC_LSHIFT_BREAK | SC_RSHIFT_BREAK => {
            SHIFT_HELD.store(false, Ordering::Relaxed);
            return;
        }
        _ => {}
    }

    // Key releases carry the high bit.
    if scancode >= 0x80 {
        return;
    }

    if let Some(byte) = scancode_to_ascii(scancode, SHIFT_HELD.load(Ordering::Relaxed)) {
        KEY_RING.push(byte);
    }
}

/// Block until a key arrives, halting between interrupts.
pub fn read_blocking() -> u8 {
    loop {
        if let Some(byte) = KEY_RING.pop() {
            return byte;
        }
        x86_64::instructions::hlt();
    }
}

/// Set-1 make code to ASCII (US layout). Backspace maps to 0x08 and
/// Enter to `\n`, matching the HAL input contract.
pub fn scancode_to_ascii(scancode: u8, shifted: bool) -> Option<u8> {
    const TABLE: &[(u8, u8, u8)] = &[
        // (scancode, normal, shifted)
        (0x02, b'1', b'!'),
        (0x03, b'2', b'@'),
        (0x04, b'3', b'#'),
        (0x05, b'4', b'$'),
        (0x06, b'5', b'%'),
        (0x07, b'6', b'^'),
        (0x08, b'7', b'&'),
        (0x09, b'8', b'*'),
        (0x0A, b'9', b'('),
        (0x0B, b'0', b')'),
        (0x0C, b'-', b'_'),
        (0x0D, b'=', b'+'),
        (0x0E, 0x08, 0x08), // Backspace
        (0x0F, b'\t', b'\t'),
        (0x10, b'q', b'Q'),
        (0x11, b'w', b'W'),
        (0x12, b'e', b'E'),
        (0x13, b'r', b'R'),
        (0x14, b't', b'T'),
        (0x15, b'y', b'Y'),
        (0x16, b'u', b'U'),
        (0x17, b'i', b'I'),
        (0x18, b'o', b'O'),
        (0x19, b'p', b'P'),
        (0x1A, b'[', b'{'),
        (0x1B, b']', b'}'),
        (0x1C, b'\n', b'\n'), // Enter
        (0x1E, b'a', b'A'),
        (0x1F, b's', b'S'),
        (0x20, b'd', b'D'),
        (0x21, b'f', b'F'),
        (0x22, b'g', b'G'),
        (0x23, b'h', b'H'),
        (0x24, b'j', b'J'),
        (0x25, b'k', b'K'),
        (0x26, b'l', b'L'),
        (0x27, b';', b':'),
        (0x28, b'\'', b'"'),
        (0x29, b'`', b'~'),
        (0x2B, b'\\', b'|'),
        (0x2C, b'z', b'Z'),
        (0x2D, b'x', b'X'),
        (0x2E, b'c', b'C'),
        (0x2F, b'v', b'V'),
        (0x30, b'b', b'B'),
        (0x31, b'n', b'N'),
        (0x32, b'm', b'M'),
        (0x33, b',', b'<'),
        (0x34, b'.', b'>'),
        (0x35, b'/', b'?'),
        (0x39, b' ', b' '),
    ];

    for &(sc, normal, shift) in TABLE {
        if sc == scancode {
            return Some(if shifted { shift } else { normal });
        }
    }
    None
}

fn status() -> Status {
    Status::from_bits_truncate(unsafe { inb(PS2_STATUS_PORT) })
}

fn wait_for_input() {
    for _ in 0..10_000 {
        if !status().contains(Status::INPUT_FULL) {
            return;
        }
    }
}

fn wait_for_output() {
    for _ in 0..10_000 {
        if status().contains(Status::OUTPUT_FULL) {
            return;
        }
    }
}

#[inline]
unsafe fn inb(port: u16) -> u8 {
    Port::<u8>::new(port).read()
}

#[inline]
unsafe fn outb(port: u16, value: u8) {
    Port::<u8>::new(port).write(value)
}

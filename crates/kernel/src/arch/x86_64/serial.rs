//! COM1 16550 serial driver.
//!
//! The serial port is the first device brought up and the sink for all
//! kernel logging, so diagnostics survive even when VGA initialization
//! fails. `uart_16550` programs COM1 for 38400 baud (divisor 3), 8N1
//! with FIFOs enabled, and its `send` polls the LSR transmit-empty bit
//! before every byte.

use lazy_static::lazy_static;
use spin::Mutex;
use uart_16550::SerialPort;

/// COM1 base I/O port.
pub const COM1_PORT: u16 = 0x3F8;

lazy_static! {
    static ref SERIAL1: Mutex<SerialPort> = {
        let mut serial_port = unsafe { SerialPort::new(COM1_PORT) };
        serial_port.init();
        Mutex::new(serial_port)
    };
}

/// Bring up COM1. Must precede every other HAL operation.
pub fn init() {
    lazy_static::initialize(&SERIAL1);
}

/// Write one byte, blocking until the FIFO accepts it.
pub fn write_byte(byte: u8) {
    x86_64::instructions::interrupts::without_interrupts(|| {
        SERIAL1.lock().send(byte);
    });
}

/// Exception path only: reclaim the port if the interrupted context
/// died holding it.
///
/// # Safety
///
/// Caller must never return to the interrupted context.
pub unsafe fn force_unlock() {
    SERIAL1.force_unlock();
}

/// Write a byte slice.
pub fn write(s: &[u8]) {
    x86_64::instructions::interrupts::without_interrupts(|| {
        let mut port = SERIAL1.lock();
        for &byte in s {
            port.send(byte);
        }
    });
}

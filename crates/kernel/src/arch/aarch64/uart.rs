//! PL011 UART driver.
//!
//! The MMIO base is discovered from the device tree at first use; no
//! board address is compiled in. When discovery found no UART the base
//! stays zero, every write is silently dropped and reads never become
//! ready - the kernel still boots, just invisibly.

use core::ptr;

use bitflags::bitflags;
use spin::Mutex;

/// Register offsets from the discovered base.
const UART_DR: usize = 0x000; // data
const UART_RSR_ECR: usize = 0x004; // receive status / error clear
const UART_FR: usize = 0x018; // flags
const UART_IBRD: usize = 0x024; // integer baud divisor
const UART_FBRD: usize = 0x028; // fractional baud divisor
const UART_LCRH: usize = 0x02C; // line control
const UART_CR: usize = 0x030; // control
const UART_IMSC: usize = 0x038; // interrupt mask

bitflags! {
    /// Flag register.
    struct Flags: u32 {
        const TXFF = 1 << 5; // transmit FIFO full
        const RXFE = 1 << 4; // receive FIFO empty
    }

    /// Line control register.
    struct LineControl: u32 {
        const WLEN_8 = 3 << 5;
        const FEN = 1 << 4;
    }

    /// Control register.
    struct Control: u32 {
        const RXE = 1 << 9;
        const TXE = 1 << 8;
        const UARTEN = 1 << 0;
    }
}

/// Data register error bits.
const DR_ERROR_MASK: u32 = 0xF00;
const DR_DATA: u32 = 0xFF;

/// Reference clock assumed for the baud divisors. 48 MHz at 115200 baud
/// gives IBRD=26, FBRD=3.
const UART_CLOCK_HZ: u32 = 48_000_000;
const BAUD: u32 = 115_200;

struct Pl011 {
    base: usize,
}

impl Pl011 {
    #[inline]
    fn reg(&self, offset: usize) -> *mut u32 {
        (self.base + offset) as *mut u32
    }

    unsafe fn init_hw(&self) {
        // Disable while programming.
        ptr::write_volatile(self.reg(UART_CR), 0);

        // Integer + fractional divisors, fraction rounded to nearest.
        let denom = 16 * BAUD;
        let ibrd = UART_CLOCK_HZ / denom;
        let rem = UART_CLOCK_HZ % denom;
        let fbrd = (rem * 64 + denom / 2) / denom;
        ptr::write_volatile(self.reg(UART_IBRD), ibrd.max(1));
        ptr::write_volatile(self.reg(UART_FBRD), fbrd);

        // 8N1 with FIFOs.
        ptr::write_volatile(
            self.reg(UART_LCRH),
            (LineControl::WLEN_8 | LineControl::FEN).bits(),
        );

        // All interrupt sources masked; this driver polls.
        ptr::write_volatile(self.reg(UART_IMSC), 0);

        ptr::write_volatile(
            self.reg(UART_CR),
            (Control::UARTEN | Control::TXE | Control::RXE).bits(),
        );
    }

    unsafe fn flags(&self) -> Flags {
        Flags::from_bits_truncate(ptr::read_volatile(self.reg(UART_FR)))
    }

    unsafe fn write_byte(&self, byte: u8) {
        while self.flags().contains(Flags::TXFF) {
            core::hint::spin_loop();
        }
        ptr::write_volatile(self.reg(UART_DR), byte as u32);
    }

    unsafe fn read_byte(&self) -> Option<u8> {
        if self.flags().contains(Flags::RXFE) {
            return None;
        }
        let data = ptr::read_volatile(self.reg(UART_DR));
        if data & DR_ERROR_MASK != 0 {
            ptr::write_volatile(self.reg(UART_RSR_ECR), 0);
            return None;
        }
        Some((data & DR_DATA) as u8)
    }
}

static UART: Mutex<Pl011> = Mutex::new(Pl011 { base: 0 });

/// Program the UART at the discovered base. Base zero records "no UART";
/// all later operations degrade to no-ops.
pub fn init(base: u64) {
    let mut uart = UART.lock();
    uart.base = base as usize;
    if uart.base != 0 {
        unsafe { uart.init_hw() };
    }
}

pub fn write_byte(byte: u8) {
    let uart = UART.lock();
    if uart.base != 0 {
        unsafe { uart.write_byte(byte) };
    }
}

pub fn write(bytes: &[u8]) {
    let uart = UART.lock();
    if uart.base == 0 {
        return;
    }
    for &byte in bytes {
        unsafe { uart.write_byte(byte) };
    }
}

/// Poll the receive FIFO until a byte arrives. With no UART a byte can
/// never arrive; the shell then sits in a low-power wait instead of
/// spinning hot, still formally running.
pub fn read_byte_blocking() -> u8 {
    loop {
        let present = {
            let uart = UART.lock();
            if uart.base != 0 {
                if let Some(byte) = unsafe { uart.read_byte() } {
                    return byte;
                }
                true
            } else {
                false
            }
        };

        if present {
            core::hint::spin_loop();
        } else {
            unsafe { core::arch::asm!("wfe", options(nomem, nostack)) };
        }
    }
}

/// Exception path only: the interrupted context may have died holding
/// the lock and will never resume.
///
/// # Safety
///
/// Caller must never return to the interrupted context.
pub unsafe fn force_unlock() {
    UART.force_unlock();
}

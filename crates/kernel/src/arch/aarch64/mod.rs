//! # AArch64 back-end
//!
//! Satisfies the HAL contract on ARMv8-A boards. Nothing here hard-codes
//! a board address: every MMIO base comes out of the firmware-provided
//! device tree, so the same `kernel8.img` runs on any SoC carrying the
//! same IP blocks.
//!
//! - `boot`: entry stub at 0x80000 (DTB capture, secondary parking,
//!   vector base, stack, BSS) and the halt primitive
//! - `trap`: exception vector table; any taken exception halts
//! - `uart`: PL011, doubling as the display (there is no framebuffer)
//! - `gic`: GICv2 distributor + CPU interface
//! - `cpu`: MIDR_EL1 identification

pub mod boot;
pub mod cpu;
pub mod gic;
pub mod trap;
pub mod uart;

use crate::hwinfo::{Arch, HwInfo};
use crate::platform;

// --- Serial -----------------------------------------------------------

pub fn serial_init() -> Result<(), &'static str> {
    // First use of the device tree: discover the UART. A zero base is
    // tolerated; output is then dropped and the kernel boots dark.
    let base = platform::info().uart_base;
    uart::init(base);
    if base == 0 {
        return Err("no uart in device tree");
    }
    Ok(())
}

pub fn serial_putchar(c: u8) {
    // Terminals on the other end expect CRLF line endings.
    if c == b'\n' {
        uart::write_byte(b'\r');
    }
    uart::write_byte(c);
}

pub fn serial_print(s: &str) {
    for &c in s.as_bytes() {
        serial_putchar(c);
    }
}

// --- Display ----------------------------------------------------------
//
// The UART is the display on this platform. Geometry characters pass
// straight through to the terminal; `clear` speaks ANSI.

pub fn display_init() -> Result<(), &'static str> {
    // The UART is already up; nothing extra to do.
    Ok(())
}

pub fn display_clear() {
    uart::write(b"\x1b[2J\x1b[H");
}

pub fn display_putchar(c: u8) {
    if c == b'\n' {
        uart::write_byte(b'\r');
    }
    uart::write_byte(c);
}

pub fn display_print(s: &str) {
    for &c in s.as_bytes() {
        display_putchar(c);
    }
}

pub fn display_set_color(_attr: u8) {
    // Color is intentionally dropped on the UART console.
}

// --- Input ------------------------------------------------------------

pub fn input_init() -> Result<(), &'static str> {
    // Polled RX; nothing to arm.
    Ok(())
}

/// Block on the receive FIFO. Carriage return commits a line (mapped to
/// newline) and DEL maps to backspace, per the HAL input contract.
pub fn input_getchar() -> u8 {
    match uart::read_byte_blocking() {
        b'\r' => b'\n',
        0x7F => 0x08,
        c => c,
    }
}

// --- Interrupt controller --------------------------------------------

pub fn intc_init() -> Result<(), &'static str> {
    let info = platform::info();
    if info.gic_dist_base == 0 || info.gic_cpu_base == 0 {
        return Err("no gic in device tree, interrupts stay off");
    }
    unsafe { gic::init(info.gic_dist_base, info.gic_cpu_base) }
    Ok(())
}

pub fn intc_unmask(irq: u32) {
    unsafe { gic::enable_irq(irq) }
}

pub fn intc_send_eoi(irq: u32) {
    unsafe { gic::eoi(irq) }
}

// --- CPU / power ------------------------------------------------------

pub fn cpu_init() -> Result<(), &'static str> {
    // VBAR_EL1 is installed by the boot stub before Rust runs; this
    // re-asserts it so the sequencing contract holds even if an earlier
    // stage changed it.
    trap::install_vectors();
    Ok(())
}

pub fn halt() -> ! {
    boot::halt_forever()
}

/// Terminal paths only; see the HAL counterpart.
///
/// # Safety
///
/// Caller must never return to the context that held the lock.
pub unsafe fn output_force_unlock() {
    uart::force_unlock();
}

// --- Detection --------------------------------------------------------

pub fn hw_detect() -> HwInfo {
    let mut hw = HwInfo::empty(Arch::Arm64);
    let info = platform::info();

    hw.cpu_cores = info.cpu_count;
    hw.ram_bytes = info.ram_size;
    hw.uart_base = info.uart_base;
    hw.intc_base = info.gic_cpu_base;
    hw.intc_dist_base = info.gic_dist_base;
    let _ = hw.compat.push_str(info.uart_compat.as_str());

    cpu::model_string(&mut hw.model);

    hw
}

//! # x86_64 back-end
//!
//! Satisfies the HAL contract on BIOS-booted PC hardware:
//!
//! - `boot`: entry stub (stack + handoff to `kmain`) and halt primitive;
//!   the real-mode MBR and stage-2 loader live in `boot/x86_64/*.s`
//! - `gdt`: flat null/code/data descriptor table
//! - `idt`: 256-entry IDT with register-preserving assembly stubs
//! - `pic`: legacy 8259 pair remapped to vectors 32-47
//! - `serial`: COM1 16550 (the early diagnostics channel)
//! - `vga`: 80x25 text framebuffer, the HAL display
//! - `ps2_keyboard`: IRQ1-driven input with an SPSC ring
//! - `cpu`: CPUID + CMOS hardware detection

pub mod boot;
pub mod cpu;
pub mod gdt;
pub mod idt;
pub mod pic;
pub mod ps2_keyboard;
pub mod serial;
pub mod vga;

use crate::hwinfo::HwInfo;

// --- Serial -----------------------------------------------------------

pub fn serial_init() -> Result<(), &'static str> {
    serial::init();
    Ok(())
}

pub fn serial_putchar(c: u8) {
    serial::write_byte(c);
}

pub fn serial_print(s: &str) {
    serial::write(s.as_bytes());
}

// --- Display ----------------------------------------------------------

pub fn display_init() -> Result<(), &'static str> {
    vga::init();
    Ok(())
}

pub fn display_clear() {
    vga::clear();
}

pub fn display_putchar(c: u8) {
    vga::write_byte(c);
}

pub fn display_print(s: &str) {
    vga::write(s.as_bytes());
}

pub fn display_set_color(attr: u8) {
    vga::set_color(attr);
}

// --- Input ------------------------------------------------------------

pub fn input_init() -> Result<(), &'static str> {
    unsafe {
        ps2_keyboard::init();
        // The keyboard line is the only source this kernel services.
        pic::unmask(pic::Irq::Keyboard);
    }
    Ok(())
}

pub fn input_getchar() -> u8 {
    ps2_keyboard::read_blocking()
}

// --- Interrupt controller --------------------------------------------

pub fn intc_init() -> Result<(), &'static str> {
    unsafe {
        pic::init();
        // The HAL contract starts from all-masked; callers unmask what
        // they handle. Raising IF is safe only once the 8259 has been
        // remapped clear of the exception vector range.
        pic::mask_all();
        x86_64::instructions::interrupts::enable();
    }
    Ok(())
}

pub fn intc_unmask(irq: u32) {
    if let Some(irq) = pic::Irq::from_line(irq as u8) {
        unsafe { pic::unmask(irq) }
    }
}

pub fn intc_send_eoi(irq: u32) {
    unsafe { pic::end_of_interrupt(irq as u8) }
}

// --- CPU / power ------------------------------------------------------

pub fn cpu_init() -> Result<(), &'static str> {
    unsafe {
        x86_64::instructions::interrupts::disable();
        gdt::init();
        idt::init();
    }
    Ok(())
}

pub fn halt() -> ! {
    boot::halt_forever()
}

/// Terminal paths only; see the HAL counterpart.
///
/// # Safety
///
/// Caller must never return to the context that held the locks.
pub unsafe fn output_force_unlock() {
    vga::force_unlock();
    serial::force_unlock();
}

// --- Detection --------------------------------------------------------

pub fn hw_detect() -> HwInfo {
    cpu::detect()
}

//! Hardware abstraction layer.
//!
//! This is the complete surface the portable kernel is allowed to call.
//! It defines *what* each operation must accomplish and nothing about
//! *how*; the back-end is selected at compile time through the
//! `crate::arch` module alias, so exactly one implementation is linked
//! into any given image.
//!
//! Contract highlights:
//!
//! * `serial_init` must be callable before any other HAL operation;
//!   early-boot diagnostics depend on it even when display bring-up
//!   fails. `serial_putchar` blocks until the byte is accepted.
//! * Display back-ends without color silently ignore `display_set_color`
//!   but must honor geometry: newline advances, carriage return resets
//!   the column, backspace erases one column (never past column 0), tab
//!   advances to the next multiple-of-8 column, and a newline on the
//!   last row scrolls.
//! * `input_getchar` blocks until a character is available and yields
//!   line-oriented bytes: printables, newline to commit, backspace to
//!   erase. Shift handling is the back-end's business.
//! * After `intc_init` every source line is masked; the kernel unmasks
//!   only what it handles. `intc_send_eoi` tolerates double signalling
//!   for the same line.
//! * `cpu_init` installs descriptor tables / exception vectors and must
//!   run before interrupts are enabled.
//! * Bring-up steps return `Result<(), &'static str>`; the portable
//!   entry logs a failure and keeps booting, because the contract
//!   requires a degraded boot over no boot (a board without a UART in
//!   its device tree still reaches the shell, invisibly).
//! * Detection never fails: `hw_detect` leaves unknown fields zero and
//!   tier scoring maps that to FALLBACK.
//! * No HAL operation allocates.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::arch;
use crate::hwinfo::HwInfo;

/// VGA-convention color attribute: low nibble foreground, high nibble
/// background.
pub mod color {
    pub const BLACK: u8 = 0x0;
    pub const BLUE: u8 = 0x1;
    pub const GREEN: u8 = 0x2;
    pub const CYAN: u8 = 0x3;
    pub const RED: u8 = 0x4;
    pub const MAGENTA: u8 = 0x5;
    pub const BROWN: u8 = 0x6;
    pub const LIGHT_GRAY: u8 = 0x7;
    pub const LIGHT_RED: u8 = 0xC;
    pub const WHITE: u8 = 0xF;

    pub const fn attr(fg: u8, bg: u8) -> u8 {
        (bg << 4) | (fg & 0x0F)
    }
}

// --- Serial -----------------------------------------------------------

pub fn serial_init() -> Result<(), &'static str> {
    arch::serial_init()
}

pub fn serial_putchar(c: u8) {
    arch::serial_putchar(c);
}

pub fn serial_print(s: &str) {
    arch::serial_print(s);
}

// --- Display ----------------------------------------------------------

static DISPLAY_READY: AtomicBool = AtomicBool::new(false);

pub fn display_init() -> Result<(), &'static str> {
    arch::display_init()?;
    DISPLAY_READY.store(true, Ordering::Release);
    Ok(())
}

/// Whether `display_init` has completed; the panic path checks this
/// before touching the display.
pub fn display_ready() -> bool {
    DISPLAY_READY.load(Ordering::Acquire)
}

pub fn display_clear() {
    arch::display_clear();
}

pub fn display_putchar(c: u8) {
    arch::display_putchar(c);
}

pub fn display_print(s: &str) {
    arch::display_print(s);
}

pub fn display_set_color(attr: u8) {
    arch::display_set_color(attr);
}

// --- Input ------------------------------------------------------------

pub fn input_init() -> Result<(), &'static str> {
    arch::input_init()
}

/// Block until the next line-oriented input byte.
pub fn input_getchar() -> u8 {
    arch::input_getchar()
}

// --- Interrupt controller --------------------------------------------

pub fn intc_init() -> Result<(), &'static str> {
    arch::intc_init()
}

pub fn intc_unmask(irq: u32) {
    arch::intc_unmask(irq);
}

pub fn intc_send_eoi(irq: u32) {
    arch::intc_send_eoi(irq);
}

// --- CPU / power ------------------------------------------------------

/// Install descriptor tables / exception vectors so traps route to the
/// handler table. Must precede interrupt enable.
pub fn cpu_init() -> Result<(), &'static str> {
    arch::cpu_init()
}

/// Mask interrupts and enter an unrecoverable low-power wait.
pub fn halt() -> ! {
    arch::halt()
}

/// Reclaim the output locks on a terminal path: the interrupted or
/// panicking context may have died holding one and will never release
/// it.
///
/// # Safety
///
/// Caller must never return to the context that held the locks.
pub unsafe fn output_force_unlock() {
    arch::output_force_unlock();
}

// --- Detection --------------------------------------------------------

/// Probe the platform and fill a hardware descriptor. Unknown fields are
/// left zero; the caller scores and publishes the result.
pub fn hw_detect() -> HwInfo {
    arch::hw_detect()
}

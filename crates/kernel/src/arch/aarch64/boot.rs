//! Boot entry for the raw `kernel8.img`.
//!
//! Firmware loads the image at 0x80000 and enters at its first byte with
//! the DTB pointer in `x0`. The stub stashes that pointer into the data
//! segment before anything else can clobber it, parks every core except
//! the primary, installs the exception vector base, sets the boot stack,
//! clears .bss and branches to the portable entry point.

use core::arch::global_asm;

const BOOT_STACK_SIZE: usize = 64 * 1024;

#[repr(C, align(16))]
struct BootStack([u8; BOOT_STACK_SIZE]);

#[no_mangle]
static mut BOOT_STACK: BootStack = BootStack([0; BOOT_STACK_SIZE]);

/// DTB pointer as handed over by firmware. Lives in .data, not .bss, so
/// the BSS clear cannot wipe it after the stub's early store.
#[no_mangle]
#[link_section = ".data"]
static mut G_DTB_ADDR: u64 = 0;

global_asm!(
    r#"
.section .text.boot, "ax"
.global _start
_start:
    // x0 carries the DTB pointer; save it before any other code runs.
    adrp    x1, G_DTB_ADDR
    add     x1, x1, :lo12:G_DTB_ADDR
    str     x0, [x1]

    // Only the primary core proceeds; the rest stay quiescent.
    mrs     x1, MPIDR_EL1
    and     x1, x1, #0xFF
    cbz     x1, 2f
1:
    wfe
    b       1b

2:
    // Exception vector base.
    adrp    x1, exception_vector_table
    add     x1, x1, :lo12:exception_vector_table
    msr     VBAR_EL1, x1
    isb

    // Clear .bss (the linker script provides the bounds).
    adrp    x1, __bss_start
    add     x1, x1, :lo12:__bss_start
    adrp    x2, __bss_end
    add     x2, x2, :lo12:__bss_end
3:
    cmp     x1, x2
    b.hs    4f
    str     xzr, [x1], #8
    b       3b

4:
    // Boot stack, then into Rust.
    adrp    x1, BOOT_STACK
    add     x1, x1, :lo12:BOOT_STACK
    add     x1, x1, {stack_size}
    mov     sp, x1
    bl      kmain

    // kmain never returns.
5:
    wfe
    b       5b

.text
"#,
    stack_size = const BOOT_STACK_SIZE,
);

/// The stashed firmware DTB pointer (null when firmware provided none).
///
/// # Safety
///
/// Only meaningful after the boot stub has run; written exactly once
/// there and read-only afterwards.
pub unsafe fn dtb_ptr() -> *const u8 {
    core::ptr::addr_of!(G_DTB_ADDR).read() as *const u8
}

/// Mask interrupts and wait forever.
pub fn halt_forever() -> ! {
    unsafe {
        core::arch::asm!("msr DAIFSET, #0xF", options(nomem, nostack));
        loop {
            core::arch::asm!("wfe", options(nomem, nostack));
        }
    }
}

//! Kernel-side boot path.
//!
//! Stage 2 (see `boot/x86_64/stage2.s`) enters long mode with a 1 GiB
//! identity map and far-jumps to the first byte of the kernel image at
//! 0x100000. The stub below is that first byte: it zeroes .bss, installs
//! the BSS-resident stack, clears the frame pointer so backtraces
//! terminate, and calls the portable entry point. Interrupts are still
//! disabled here.

use core::arch::global_asm;

const BOOT_STACK_SIZE: usize = 64 * 1024;

#[repr(C, align(16))]
struct BootStack([u8; BOOT_STACK_SIZE]);

#[no_mangle]
static mut BOOT_STACK: BootStack = BootStack([0; BOOT_STACK_SIZE]);

global_asm!(
    r#"
.section .text.entry, "ax"
.global _start
_start:
    // Clear .bss; the raw-binary load path does not (the linker script
    // provides the bounds).
    lea rdi, [__bss_start]
    lea rcx, [__bss_end]
    sub rcx, rdi
    xor eax, eax
    cld
    rep stosb

    lea rsp, [{stack} + {stack_size}]
    xor ebp, ebp
    call kmain
    // kmain never returns; trap here if it somehow does.
2:
    cli
    hlt
    jmp 2b

.text
"#,
    stack = sym BOOT_STACK,
    stack_size = const BOOT_STACK_SIZE,
);

/// Mask interrupts and stop. The only way out is a reset.
pub fn halt_forever() -> ! {
    x86_64::instructions::interrupts::disable();
    loop {
        x86_64::instructions::hlt();
    }
}

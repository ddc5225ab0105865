//! Exception vectors and handlers.
//!
//! Sixteen 0x80-aligned entries, one per (level, kind) pair. This kernel
//! has no userland and no runtime interrupt sources, so every taken
//! exception is terminal: the handler reports the syndrome over the
//! serial path and halts, matching the x86_64 exception policy.

use core::arch::{asm, global_asm};

// Each vector records its table index and funnels into one common path.
// No frame is saved: the interrupted context is never resumed.
global_asm!(
    r#"
.section .text, "ax"
.balign 0x800
.global exception_vector_table
exception_vector_table:
.irp idx, 0,1,2,3,4,5,6,7,8,9,10,11,12,13,14,15
.balign 0x80
    mov     x0, #\idx
    b       trap_entry
.endr

trap_entry:
    mrs     x1, ESR_EL1
    mrs     x2, ELR_EL1
    mrs     x3, FAR_EL1
    b       trap_handler
"#
);

/// Exception class field of ESR_EL1.
const ESR_EC_MASK: u64 = 0xFC00_0000;
const ESR_EC_SHIFT: u64 = 26;

fn class_name(ec: u64) -> &'static str {
    match ec {
        0x00 => "Unknown",
        0x0E => "Illegal Execution State",
        0x15 => "SVC",
        0x20 | 0x21 => "Instruction Abort",
        0x22 => "PC Alignment",
        0x24 | 0x25 => "Data Abort",
        0x26 => "SP Alignment",
        0x2C => "FP Exception",
        0x2F => "SError",
        _ => "Unhandled",
    }
}

fn vector_kind(index: u64) -> &'static str {
    match index {
        0 | 4 | 8 | 12 => "Synchronous",
        1 | 5 | 9 | 13 => "IRQ",
        2 | 6 | 10 | 14 => "FIQ",
        _ => "SError",
    }
}

/// Terminal handler entered from every vector.
///
/// # Safety
///
/// Reached only from the vector table with the syndrome registers in
/// x1-x3.
#[no_mangle]
unsafe extern "C" fn trap_handler(index: u64, esr: u64, elr: u64, far: u64) -> ! {
    let ec = (esr & ESR_EC_MASK) >> ESR_EC_SHIFT;

    // The interrupted context is dead; reclaim the UART if it died
    // mid-print.
    super::output_force_unlock();

    crate::error!(
        "EXCEPTION: {} ({}) esr={:#x} elr={:#x} far={:#x}",
        vector_kind(index),
        class_name(ec),
        esr,
        elr,
        far
    );

    super::boot::halt_forever()
}

/// (Re-)install the vector base. The boot stub already did this before
/// Rust ran; `cpu_init` asserts it again so the HAL sequencing holds on
/// its own.
pub fn install_vectors() {
    extern "C" {
        static exception_vector_table: u8;
    }

    unsafe {
        let vbar = core::ptr::addr_of!(exception_vector_table) as u64;
        asm!(
            "msr VBAR_EL1, {0}",
            "isb",
            in(reg) vbar,
            options(nostack)
        );
    }
}

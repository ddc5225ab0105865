//! Interrupt Descriptor Table and low-level dispatch.
//!
//! Every vector routes through a two-stub design: a per-vector stub
//! pushes `(err_code_or_zero, vector)` and jumps to one common stub that
//! saves the full register set, calls [`isr_dispatch`] with a pointer to
//! the saved frame, restores the registers, discards the vector/error
//! pair and returns with `iretq`. The frame layout below is ABI between
//! that assembly and Rust; neither side may reorder fields.
//!
//! Exceptions (vectors 0-31) print their name and stop the machine.
//! Hardware interrupts are remapped by the PIC to vectors 32-47 and
//! dispatch to the owning driver before the EOI.

use core::arch::global_asm;
use core::mem::size_of;
use core::ptr::addr_of;

use x86_64::instructions::tables::lidt;
use x86_64::structures::DescriptorTablePointer;
use x86_64::VirtAddr;

use crate::arch::x86_64::{boot, gdt, pic, ps2_keyboard, vga};
use crate::hal::color;

/// Number of vectors with installed gates: 32 exceptions + 16 IRQs.
const NUM_STUBS: usize = 48;

/// Register snapshot pushed by the common stub, in push order.
///
/// Field order mirrors the stack layout exactly: callee-saved and
/// scratch registers as pushed by `isr_common`, then the vector/error
/// pair pushed by the per-vector stub, then the CPU's hardware frame.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct InterruptFrame {
    pub r15: u64,
    pub r14: u64,
    pub r13: u64,
    pub r12: u64,
    pub r11: u64,
    pub r10: u64,
    pub r9: u64,
    pub r8: u64,
    pub rdi: u64,
    pub rsi: u64,
    pub rbp: u64,
    pub rbx: u64,
    pub rdx: u64,
    pub rcx: u64,
    pub rax: u64,
    /// Vector number pushed by the per-vector stub.
    pub int_no: u64,
    /// CPU error code, or the stub's zero placeholder.
    pub err_code: u64,
    // Hardware frame pushed by the CPU.
    pub rip: u64,
    pub cs: u64,
    pub rflags: u64,
    pub rsp: u64,
    pub ss: u64,
}

// Per-vector stubs. Vectors 8, 10-14, 17 and 30 get a CPU-pushed error
// code; everything else pushes a zero placeholder so the frame layout is
// uniform. The common stub keeps the stack 16-byte aligned at the call.
global_asm!(
    r#"
.section .text, "ax"

.irp n, 0,1,2,3,4,5,6,7,9,15,16,18,19,20,21,22,23,24,25,26,27,28,29,31,32,33,34,35,36,37,38,39,40,41,42,43,44,45,46,47
vector_\n:
    push 0
    push \n
    jmp isr_common
.endr

.irp n, 8,10,11,12,13,14,17,30
vector_\n:
    push \n
    jmp isr_common
.endr

isr_common:
    push rax
    push rcx
    push rdx
    push rbx
    push rbp
    push rsi
    push rdi
    push r8
    push r9
    push r10
    push r11
    push r12
    push r13
    push r14
    push r15
    mov rdi, rsp
    call isr_dispatch
    pop r15
    pop r14
    pop r13
    pop r12
    pop r11
    pop r10
    pop r9
    pop r8
    pop rdi
    pop rsi
    pop rbp
    pop rbx
    pop rdx
    pop rcx
    pop rax
    add rsp, 16
    iretq

// Stub address table consumed when the IDT is built.
.section .rodata
.global ISR_STUB_TABLE
ISR_STUB_TABLE:
.irp n, 0,1,2,3,4,5,6,7,8,9,10,11,12,13,14,15,16,17,18,19,20,21,22,23,24,25,26,27,28,29,30,31,32,33,34,35,36,37,38,39,40,41,42,43,44,45,46,47
    .quad vector_\n
.endr

.text
"#
);

extern "C" {
    static ISR_STUB_TABLE: [u64; NUM_STUBS];
}

/// One 16-byte long-mode interrupt gate.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct IdtEntry {
    offset_low: u16,
    selector: u16,
    /// IST in bits 0-2, gate type 0xE in bits 8-11, present in bit 15.
    options: u16,
    offset_mid: u16,
    offset_high: u32,
    reserved: u32,
}

impl IdtEntry {
    const MISSING: IdtEntry = IdtEntry {
        offset_low: 0,
        selector: 0,
        options: 0,
        offset_mid: 0,
        offset_high: 0,
        reserved: 0,
    };

    fn interrupt_gate(handler: u64, selector: u16) -> Self {
        IdtEntry {
            offset_low: handler as u16,
            selector,
            options: 0x8E00,
            offset_mid: (handler >> 16) as u16,
            offset_high: (handler >> 32) as u32,
            reserved: 0,
        }
    }
}

static mut IDT: [IdtEntry; 256] = [IdtEntry::MISSING; 256];

/// Exception mnemonics for vectors 0-31 (Intel SDM Vol. 3a, chapter 6).
static EXCEPTION_NAMES: [&str; 32] = [
    "Divide Error",
    "Debug",
    "Nonmaskable Interrupt",
    "Breakpoint",
    "Overflow",
    "BOUND Range Exceeded",
    "Invalid Opcode",
    "Device Not Available",
    "Double Fault",
    "Coprocessor Segment Overrun",
    "Invalid TSS",
    "Segment Not Present",
    "Stack-Segment Fault",
    "General Protection",
    "Page Fault",
    "Reserved",
    "x87 FPU Floating-Point",
    "Alignment Check",
    "Machine Check",
    "SIMD Floating-Point",
    "Virtualization",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
];

/// Build and load the IDT.
///
/// # Safety
///
/// Must run once, after the GDT is loaded and before interrupts are
/// enabled. Vectors below 32 must never be raised by external hardware
/// afterwards; the PIC remap guarantees that.
pub unsafe fn init() {
    let selector = gdt::code_selector().0;

    let idt = core::ptr::addr_of_mut!(IDT);
    for (i, &stub) in ISR_STUB_TABLE.iter().enumerate() {
        (*idt)[i] = IdtEntry::interrupt_gate(stub, selector);
    }

    let ptr = DescriptorTablePointer {
        limit: (size_of::<[IdtEntry; 256]>() - 1) as u16,
        base: VirtAddr::new(addr_of!(IDT) as u64),
    };
    lidt(&ptr);
}

/// Central handler entered from the common stub.
///
/// # Safety
///
/// Called only from the assembly stubs with a valid frame pointer.
#[no_mangle]
unsafe extern "C" fn isr_dispatch(frame: *mut InterruptFrame) {
    let frame = &mut *frame;

    match frame.int_no {
        vec @ 0..=31 => exception(vec as usize, frame),
        vec @ 32..=47 => irq((vec - 32) as u8),
        vec => {
            crate::warn!("stray interrupt vector {}", vec);
        }
    }
}

/// Exceptions are terminal: report in red on the display, log the frame
/// over serial, stop the machine. This runs with interrupts disabled and
/// never returns to the interrupted context, so touching the display
/// from here cannot race the mainline.
fn exception(vec: usize, frame: &InterruptFrame) -> ! {
    let name = EXCEPTION_NAMES[vec];

    // The interrupted context is dead; reclaim the output paths if it
    // died mid-print.
    unsafe {
        crate::arch::x86_64::output_force_unlock();
    }
    vga::set_color(color::attr(color::LIGHT_RED, color::BLACK));
    vga::write(b"\nEXCEPTION: ");
    vga::write(name.as_bytes());
    vga::write(b"\n");

    crate::error!(
        "exception {} ({}) err={:#x} rip={:#x} rsp={:#x}",
        vec,
        name,
        frame.err_code,
        frame.rip,
        frame.rsp
    );

    boot::halt_forever()
}

fn irq(irq: u8) {
    unsafe {
        // IRQ 7/15 can be ghosts of the 8259; never EOI a spurious one
        // (a spurious 15 still needs the master's cascade EOI).
        if pic::is_spurious(irq) {
            if irq >= 8 {
                pic::end_of_interrupt(pic::Irq::Cascade as u8);
            }
            return;
        }

        if irq == pic::Irq::Keyboard as u8 {
            ps2_keyboard::handle_irq();
        }

        pic::end_of_interrupt(irq);
    }
}

// The stubs push 15 GPRs + the vector/error pair ahead of the CPU's
// 5-word hardware frame; the struct must match to the byte.
const _: () = assert!(size_of::<InterruptFrame>() == 22 * 8);
const _: () = assert!(core::mem::offset_of!(InterruptFrame, int_no) == 15 * 8);
const _: () = assert!(core::mem::offset_of!(InterruptFrame, rip) == 17 * 8);
const _: () = assert!(size_of::<IdtEntry>() == 16);

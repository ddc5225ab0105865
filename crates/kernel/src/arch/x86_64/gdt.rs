//! Global Descriptor Table.
//!
//! Long mode still requires valid CS/DS entries even though segmentation
//! is flat. This kernel never leaves ring 0, so the table is the minimal
//! three entries: null, kernel code, kernel data. No TSS is loaded -
//! there are no privilege transitions and no IST stacks.

use lazy_static::lazy_static;
use x86_64::instructions::segmentation::{Segment, CS, DS, ES, FS, GS, SS};
use x86_64::structures::gdt::{Descriptor, GlobalDescriptorTable, SegmentSelector};

struct Selectors {
    code: SegmentSelector,
    data: SegmentSelector,
}

lazy_static! {
    static ref GDT: (GlobalDescriptorTable, Selectors) = {
        let mut gdt = GlobalDescriptorTable::new();

        // Entry 0 is the null descriptor the CPU requires.
        let code = gdt.add_entry(Descriptor::kernel_code_segment());
        let data = gdt.add_entry(Descriptor::kernel_data_segment());

        (gdt, Selectors { code, data })
    };
}

/// Kernel code selector, needed by the IDT gates.
pub fn code_selector() -> SegmentSelector {
    GDT.1.code
}

/// Load the GDT and reload every segment register.
///
/// # Safety
///
/// Must be called exactly once during boot, with interrupts disabled and
/// memory identity mapped (the flat segments take effect immediately).
pub unsafe fn init() {
    GDT.0.load();

    CS::set_reg(GDT.1.code);
    DS::set_reg(GDT.1.data);
    ES::set_reg(GDT.1.data);
    SS::set_reg(GDT.1.data);
    FS::set_reg(GDT.1.data);
    GS::set_reg(GDT.1.data);
}

//! ARM GICv2 driver (distributor + memory-mapped CPU interface).
//!
//! Both MMIO bases come from the device tree. Initialization leaves
//! every source disabled, routed to CPU 0 at a uniform priority, with
//! the CPU interface accepting everything the distributor forwards; the
//! kernel then enables exactly the sources it handles (today: none -
//! exception delivery exists, runtime interrupt sources do not).

use core::ptr::{read_volatile, write_volatile};

use spin::Mutex;

/// Distributor register offsets.
const GICD_CTLR: usize = 0x000;
const GICD_TYPER: usize = 0x004;
const GICD_ISENABLER: usize = 0x100;
const GICD_ICENABLER: usize = 0x180;
const GICD_IPRIORITYR: usize = 0x400;
const GICD_ITARGETSR: usize = 0x800;

/// CPU interface register offsets.
const GICC_CTLR: usize = 0x000;
const GICC_PMR: usize = 0x004;
const GICC_IAR: usize = 0x00C;
const GICC_EOIR: usize = 0x010;

/// Interrupt IDs are 10 bits in IAR/EOIR.
const INTID_MASK: u32 = 0x3FF;

/// IAR value meaning "nothing pending".
pub const SPURIOUS_IRQ: u32 = 1023;

/// Uniform priority assigned to every source.
const DEFAULT_PRIORITY: u8 = 0xA0;

/// Accept all priorities at the CPU interface.
const PRIORITY_ACCEPT_ALL: u8 = 0xFF;

struct Gic {
    dist_base: usize,
    cpu_base: usize,
}

impl Gic {
    #[inline]
    fn gicd(&self, offset: usize) -> *mut u32 {
        (self.dist_base + offset) as *mut u32
    }

    #[inline]
    fn gicc(&self, offset: usize) -> *mut u32 {
        (self.cpu_base + offset) as *mut u32
    }

    unsafe fn init_hw(&self) {
        // Lines implemented, in blocks of 32.
        let typer = read_volatile(self.gicd(GICD_TYPER));
        let blocks = (typer & 0x1F) as usize + 1;
        let max_irq = blocks * 32;

        // Disable everything while configuring.
        write_volatile(self.gicd(GICD_CTLR), 0);
        for i in 0..blocks {
            write_volatile(self.gicd(GICD_ICENABLER + i * 4), 0xFFFF_FFFF);
        }

        // Uniform priority, all SPIs targeted at CPU 0. Both register
        // files are byte-indexed by interrupt ID.
        for irq in 0..max_irq {
            write_volatile(
                (self.dist_base + GICD_IPRIORITYR + irq) as *mut u8,
                DEFAULT_PRIORITY,
            );
        }
        for irq in 32..max_irq {
            write_volatile((self.dist_base + GICD_ITARGETSR + irq) as *mut u8, 0x01);
        }

        write_volatile(self.gicd(GICD_CTLR), 1);

        // CPU interface: accept every priority, then enable.
        write_volatile(self.gicc(GICC_PMR), PRIORITY_ACCEPT_ALL as u32);
        write_volatile(self.gicc(GICC_CTLR), 1);
    }

    unsafe fn enable_irq(&self, irq: u32) {
        let reg = self.gicd(GICD_ISENABLER + (irq as usize / 32) * 4);
        write_volatile(reg, 1 << (irq % 32));
    }

    unsafe fn disable_irq(&self, irq: u32) {
        let reg = self.gicd(GICD_ICENABLER + (irq as usize / 32) * 4);
        write_volatile(reg, 1 << (irq % 32));
    }

    unsafe fn ack(&self) -> u32 {
        read_volatile(self.gicc(GICC_IAR)) & INTID_MASK
    }

    unsafe fn eoi(&self, irq: u32) {
        write_volatile(self.gicc(GICC_EOIR), irq & INTID_MASK);
    }
}

static GIC: Mutex<Gic> = Mutex::new(Gic {
    dist_base: 0,
    cpu_base: 0,
});

/// Program the controller at the discovered bases.
///
/// # Safety
///
/// The bases must be the GICv2 distributor and CPU-interface regions
/// reported by the device tree.
pub unsafe fn init(dist_base: u64, cpu_base: u64) {
    let mut gic = GIC.lock();
    gic.dist_base = dist_base as usize;
    gic.cpu_base = cpu_base as usize;
    gic.init_hw();
}

/// Open one source line.
///
/// # Safety
///
/// A handler must be in place before the line opens.
pub unsafe fn enable_irq(irq: u32) {
    let gic = GIC.lock();
    if gic.dist_base != 0 {
        gic.enable_irq(irq);
    }
}

/// Mask one source line.
pub unsafe fn disable_irq(irq: u32) {
    let gic = GIC.lock();
    if gic.dist_base != 0 {
        gic.disable_irq(irq);
    }
}

/// Acknowledge the highest-priority pending interrupt; 1023 means
/// spurious and must be ignored without an EOI.
pub unsafe fn ack() -> u32 {
    let gic = GIC.lock();
    if gic.cpu_base == 0 {
        return SPURIOUS_IRQ;
    }
    gic.ack()
}

/// Signal completion for a previously acknowledged interrupt.
pub unsafe fn eoi(irq: u32) {
    let gic = GIC.lock();
    if gic.cpu_base != 0 {
        gic.eoi(irq);
    }
}

//! Legacy 8259A PIC pair.
//!
//! The two controllers are remapped so hardware IRQs occupy CPU vectors
//! 32-47, clear of the exception range. Initialization runs the ICW1-4
//! sequence (edge-triggered, cascade on IRQ 2, 8086 mode) and puts the
//! previously saved line masks back; the HAL layer then masks every
//! line, and the kernel unmasks only the sources it services.

use spin::Mutex;
use x86_64::instructions::port::Port;

/// Master PIC command/data ports.
const PIC1_COMMAND: u16 = 0x20;
const PIC1_DATA: u16 = 0x21;

/// Slave PIC command/data ports.
const PIC2_COMMAND: u16 = 0xA0;
const PIC2_DATA: u16 = 0xA1;

/// Non-specific End of Interrupt.
const CMD_EOI: u8 = 0x20;

/// Read In-Service Register on the next command-port read.
const CMD_READ_ISR: u8 = 0x0B;

/// ICW1: initialization required, ICW4 follows.
const ICW1_INIT: u8 = 0x10;
const ICW1_ICW4: u8 = 0x01;

/// ICW4: 8086/8088 mode.
const ICW4_8086: u8 = 0x01;

/// Master IRQ 0-7 land on vectors 32-39.
pub const PIC1_OFFSET: u8 = 0x20;

/// Slave IRQ 8-15 land on vectors 40-47.
pub const PIC2_OFFSET: u8 = PIC1_OFFSET + 8;

/// Hardware IRQ lines this kernel knows by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Irq {
    Timer = 0,
    Keyboard = 1,
    Cascade = 2,
    Com2 = 3,
    Com1 = 4,
}

impl Irq {
    /// Map a raw line number to a known IRQ, if any.
    pub fn from_line(line: u8) -> Option<Self> {
        match line {
            0 => Some(Irq::Timer),
            1 => Some(Irq::Keyboard),
            2 => Some(Irq::Cascade),
            3 => Some(Irq::Com2),
            4 => Some(Irq::Com1),
            _ => None,
        }
    }
}

/// The cascaded pair, managed as one unit.
struct ChainedPics {
    master_command: Port<u8>,
    master_data: Port<u8>,
    slave_command: Port<u8>,
    slave_data: Port<u8>,
}

impl ChainedPics {
    const fn new() -> Self {
        Self {
            master_command: Port::new(PIC1_COMMAND),
            master_data: Port::new(PIC1_DATA),
            slave_command: Port::new(PIC2_COMMAND),
            slave_data: Port::new(PIC2_DATA),
        }
    }

    /// Run the ICW1-4 sequence and restore the saved line masks.
    unsafe fn initialize(&mut self) {
        let mask1 = self.master_data.read();
        let mask2 = self.slave_data.read();

        // ICW1: begin initialization
        self.master_command.write(ICW1_INIT | ICW1_ICW4);
        io_wait();
        self.slave_command.write(ICW1_INIT | ICW1_ICW4);
        io_wait();

        // ICW2: vector offsets
        self.master_data.write(PIC1_OFFSET);
        io_wait();
        self.slave_data.write(PIC2_OFFSET);
        io_wait();

        // ICW3: slave on master IRQ 2, slave identity 2
        self.master_data.write(0x04);
        io_wait();
        self.slave_data.write(0x02);
        io_wait();

        // ICW4: 8086 mode
        self.master_data.write(ICW4_8086);
        io_wait();
        self.slave_data.write(ICW4_8086);
        io_wait();

        self.master_data.write(mask1);
        self.slave_data.write(mask2);
    }

    unsafe fn mask_all(&mut self) {
        self.master_data.write(0xFF);
        self.slave_data.write(0xFF);
    }

    unsafe fn unmask(&mut self, irq: u8) {
        if irq < 8 {
            let mask = self.master_data.read();
            self.master_data.write(mask & !(1 << irq));
        } else {
            let line = irq - 8;
            let mask = self.slave_data.read();
            self.slave_data.write(mask & !(1 << line));

            // Slave lines arrive through the cascade input.
            let master_mask = self.master_data.read();
            self.master_data.write(master_mask & !(1 << 2));
        }
    }

    unsafe fn mask(&mut self, irq: u8) {
        if irq < 8 {
            let mask = self.master_data.read();
            self.master_data.write(mask | (1 << irq));
        } else {
            let line = irq - 8;
            let mask = self.slave_data.read();
            self.slave_data.write(mask | (1 << line));
        }
    }

    /// Signal End of Interrupt: slave first for its lines, then always
    /// the master (which also covers the cascade).
    unsafe fn end_of_interrupt(&mut self, irq: u8) {
        if irq >= 8 {
            self.slave_command.write(CMD_EOI);
        }
        self.master_command.write(CMD_EOI);
    }

    /// IRQ 7/15 can fire without a real source. A spurious line shows
    /// clear in the owning controller's In-Service Register.
    unsafe fn is_spurious(&mut self, irq: u8) -> bool {
        if irq == 7 {
            self.master_command.write(CMD_READ_ISR);
            let isr = self.master_command.read();
            (isr & 0x80) == 0
        } else if irq == 15 {
            self.slave_command.write(CMD_READ_ISR);
            let isr = self.slave_command.read();
            (isr & 0x80) == 0
        } else {
            false
        }
    }
}

static PICS: Mutex<ChainedPics> = Mutex::new(ChainedPics::new());

/// Remap the pair to vectors 32-47.
///
/// # Safety
///
/// Must be called with interrupts disabled, before any line is unmasked.
pub unsafe fn init() {
    PICS.lock().initialize();
}

/// Mask every line on both controllers.
pub unsafe fn mask_all() {
    PICS.lock().mask_all();
}

/// Unmask one line.
///
/// # Safety
///
/// A handler must be reachable through the IDT before the line opens.
pub unsafe fn unmask(irq: Irq) {
    // The IRQ path also takes this lock; keep IF clear while we hold it.
    x86_64::instructions::interrupts::without_interrupts(|| {
        PICS.lock().unmask(irq as u8);
    });
}

/// Mask one line.
pub unsafe fn mask(irq: Irq) {
    x86_64::instructions::interrupts::without_interrupts(|| {
        PICS.lock().mask(irq as u8);
    });
}

/// Acknowledge an IRQ. Safe against a duplicate call for the same line:
/// a second non-specific EOI with nothing in service is ignored by the
/// 8259.
pub unsafe fn end_of_interrupt(irq: u8) {
    PICS.lock().end_of_interrupt(irq);
}

/// Check whether the line's interrupt was a ghost (IRQ 7/15 only).
pub unsafe fn is_spurious(irq: u8) -> bool {
    PICS.lock().is_spurious(irq)
}

/// The 8259 needs a moment between programming writes; a write to the
/// unused diagnostic port 0x80 is the traditional delay.
#[inline]
fn io_wait() {
    unsafe {
        Port::<u8>::new(0x80).write(0);
    }
}

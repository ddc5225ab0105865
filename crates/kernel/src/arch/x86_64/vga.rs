//! VGA text-mode display.
//!
//! 80x25 cells at physical 0xB8000, each a (character, attribute) pair.
//! The hardware cursor is moved through the CRT controller ports after
//! every write so it always tracks the logical position.
//!
//! Geometry rules (the HAL display contract): newline advances a row,
//! carriage return resets the column, backspace erases one cell and
//! never retreats past column 0, tab advances to the next multiple-of-8
//! column, and a newline on the last row scrolls everything up one row.

use spin::Mutex;
use x86_64::instructions::port::Port;

use crate::hal::color;

const BUFFER_ADDR: usize = 0xB8000;
const WIDTH: usize = 80;
const HEIGHT: usize = 25;

/// CRT controller index/data ports for the hardware cursor.
const CRTC_INDEX: u16 = 0x3D4;
const CRTC_DATA: u16 = 0x3D5;
const CRTC_CURSOR_HIGH: u8 = 0x0E;
const CRTC_CURSOR_LOW: u8 = 0x0F;

const TAB_STOP: usize = 8;

struct Writer {
    col: usize,
    row: usize,
    attr: u8,
}

impl Writer {
    const fn new() -> Self {
        Writer {
            col: 0,
            row: 0,
            attr: color::attr(color::LIGHT_GRAY, color::BLACK),
        }
    }

    #[inline]
    fn cell(ch: u8, attr: u8) -> u16 {
        (attr as u16) << 8 | ch as u16
    }

    fn put_at(&self, col: usize, row: usize, ch: u8) {
        let ptr = BUFFER_ADDR as *mut u16;
        unsafe {
            ptr.add(row * WIDTH + col)
                .write_volatile(Self::cell(ch, self.attr));
        }
    }

    fn write_byte(&mut self, byte: u8) {
        match byte {
            b'\n' => {
                self.col = 0;
                self.advance_row();
            }
            b'\r' => {
                self.col = 0;
            }
            0x08 => {
                if self.col > 0 {
                    self.col -= 1;
                    self.put_at(self.col, self.row, b' ');
                }
            }
            b'\t' => {
                let next = (self.col / TAB_STOP + 1) * TAB_STOP;
                while self.col < next && self.col < WIDTH {
                    self.put_at(self.col, self.row, b' ');
                    self.col += 1;
                }
                if self.col >= WIDTH {
                    self.col = 0;
                    self.advance_row();
                }
            }
            byte => {
                if self.col >= WIDTH {
                    self.col = 0;
                    self.advance_row();
                }
                self.put_at(self.col, self.row, byte);
                self.col += 1;
            }
        }
        self.update_cursor();
    }

    fn advance_row(&mut self) {
        if self.row + 1 < HEIGHT {
            self.row += 1;
        } else {
            self.scroll();
        }
    }

    /// Copy rows 1..HEIGHT one row up and blank the last row with the
    /// current attribute.
    fn scroll(&mut self) {
        let ptr = BUFFER_ADDR as *mut u16;
        unsafe {
            for row in 1..HEIGHT {
                for col in 0..WIDTH {
                    let cell = ptr.add(row * WIDTH + col).read_volatile();
                    ptr.add((row - 1) * WIDTH + col).write_volatile(cell);
                }
            }
        }
        for col in 0..WIDTH {
            self.put_at(col, HEIGHT - 1, b' ');
        }
        self.row = HEIGHT - 1;
    }

    fn clear(&mut self) {
        for row in 0..HEIGHT {
            for col in 0..WIDTH {
                self.put_at(col, row, b' ');
            }
        }
        self.col = 0;
        self.row = 0;
        self.update_cursor();
    }

    fn update_cursor(&self) {
        let pos = (self.row * WIDTH + self.col) as u16;
        unsafe {
            let mut index: Port<u8> = Port::new(CRTC_INDEX);
            let mut data: Port<u8> = Port::new(CRTC_DATA);
            index.write(CRTC_CURSOR_LOW);
            data.write(pos as u8);
            index.write(CRTC_CURSOR_HIGH);
            data.write((pos >> 8) as u8);
        }
    }
}

static WRITER: Mutex<Writer> = Mutex::new(Writer::new());

pub fn init() {
    clear();
}

pub fn clear() {
    lock().clear();
}

pub fn write_byte(byte: u8) {
    lock().write_byte(byte);
}

pub fn write(s: &[u8]) {
    let mut w = lock();
    for &byte in s {
        w.write_byte(byte);
    }
}

pub fn set_color(attr: u8) {
    lock().attr = attr;
}

/// Exception path only: the interrupted context may have died holding
/// the lock and will never resume to release it.
///
/// # Safety
///
/// Caller must be on a terminal path that never returns to the
/// interrupted context.
pub unsafe fn force_unlock() {
    WRITER.force_unlock();
}

fn lock() -> spin::MutexGuard<'static, Writer> {
    WRITER.lock()
}

// Kernel logging (printk) with a fixed in-memory ring for `dmesg`.
//
// Messages format straight into a stack-resident fixed buffer; there is
// no allocator in this kernel. Output goes to the HAL serial sink so the
// log survives even when display bring-up fails.

use core::fmt::{self, Write};

use spin::Mutex;

use super::ringbuf::RingBuffer;
use crate::config::{LOG_LINE_CAP, LOG_RING_CAP, LOG_THRESHOLD};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

#[derive(Copy, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: [u8; LOG_LINE_CAP],
    pub len: usize,
}

impl LogEntry {
    pub fn text(&self) -> &str {
        core::str::from_utf8(&self.message[..self.len]).unwrap_or("<bad utf8>")
    }
}

static KERNEL_LOG: Mutex<RingBuffer<LogEntry, LOG_RING_CAP>> = Mutex::new(RingBuffer::new());

/// Writer that truncates silently once the fixed entry buffer is full.
struct EntryWriter {
    buf: [u8; LOG_LINE_CAP],
    len: usize,
}

impl Write for EntryWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = LOG_LINE_CAP - self.len;
        let take = s.len().min(room);
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

fn emit(level: LogLevel, text: &str) {
    #[cfg(target_os = "none")]
    {
        crate::hal::serial_print("[");
        crate::hal::serial_print(level.as_str());
        crate::hal::serial_print("] ");
        crate::hal::serial_print(text);
        crate::hal::serial_print("\n");
    }
    #[cfg(not(target_os = "none"))]
    let _ = (level, text);
}

pub fn log(level: LogLevel, args: fmt::Arguments) {
    let mut w = EntryWriter {
        buf: [0; LOG_LINE_CAP],
        len: 0,
    };
    let _ = w.write_fmt(args);

    if level <= LOG_THRESHOLD {
        emit(level, core::str::from_utf8(&w.buf[..w.len]).unwrap_or(""));
    }

    // Exception reports also land here and may interrupt a holder of
    // the ring lock; they must never block, so retention is
    // best-effort.
    if let Some(mut ring) = KERNEL_LOG.try_lock() {
        ring.push(LogEntry {
            level,
            message: w.buf,
            len: w.len,
        });
    }
}

/// Replay the retained boot log oldest-first (shell `dmesg`).
pub fn replay(mut f: impl FnMut(&LogEntry)) {
    KERNEL_LOG.lock().for_each(|e| f(e));
}

#[macro_export]
macro_rules! printk {
    ($level:expr, $($arg:tt)*) => {
        $crate::klib::printk::log($level, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::printk!($crate::klib::printk::LogLevel::Error, $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::printk!($crate::klib::printk::LogLevel::Warn, $($arg)*)
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::printk!($crate::klib::printk::LogLevel::Info, $($arg)*)
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::printk!($crate::klib::printk::LogLevel::Debug, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_messages_truncate_silently() {
        let mut w = EntryWriter {
            buf: [0; LOG_LINE_CAP],
            len: 0,
        };
        for _ in 0..LOG_LINE_CAP {
            let _ = w.write_str("ab");
        }
        assert_eq!(w.len, LOG_LINE_CAP);
    }

    #[test]
    fn log_is_replayable() {
        log(LogLevel::Info, format_args!("hello {}", 42));
        let mut found = false;
        replay(|e| {
            if e.text().contains("hello 42") {
                found = true;
                assert_eq!(e.level, LogLevel::Info);
            }
        });
        assert!(found);
    }
}

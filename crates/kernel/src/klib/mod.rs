//! Core kernel library: logging, fixed ring buffer, panic handling.

pub mod printk;
pub mod ringbuf;

#[cfg(target_os = "none")]
pub mod panic;

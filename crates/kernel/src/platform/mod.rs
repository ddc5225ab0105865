//! Board discovery from the firmware-provided Flattened Device Tree.
//!
//! The AArch64 boot stub stashes the DTB pointer before any Rust runs;
//! everything the kernel knows about the board (UART, GIC, RAM, CPU
//! count) comes from one parse of that blob, cached on first use. A
//! missing or invalid DTB leaves every field zero: the kernel then
//! boots in FALLBACK tier with output silently dropped.

pub mod fdt;

#[cfg(all(target_arch = "aarch64", target_os = "none"))]
mod cache {
    use spin::Once;

    use super::fdt::DtbInfo;

    static DTB_INFO: Once<DtbInfo> = Once::new();

    /// Parse results for this boot, performed on first call.
    pub fn info() -> &'static DtbInfo {
        DTB_INFO.call_once(|| {
            let ptr = unsafe { crate::arch::boot::dtb_ptr() };
            unsafe { super::fdt::parse_ptr(ptr) }.unwrap_or_default()
        })
    }
}

#[cfg(all(target_arch = "aarch64", target_os = "none"))]
pub use cache::info;

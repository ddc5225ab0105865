#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]
// CI lint gate: when built with `--features strict`, fail on any warning
#![cfg_attr(feature = "strict", deny(warnings))]
#![cfg_attr(feature = "strict", deny(unsafe_op_in_unsafe_fn))]

// Core library (logging, ring buffer, panic handling)
pub mod klib;
// Compile-time configuration and build metadata
pub mod config;
// Hardware abstraction layer: the only surface the portable kernel calls
#[cfg(target_os = "none")]
pub mod hal;
// Hardware descriptor and tier scoring
pub mod hwinfo;
// Flattened Device Tree discovery (consulted at runtime on AArch64 only;
// the parser itself is arch-neutral and hosted-testable)
pub mod platform;
// Interactive shell
pub mod shell;

// Architecture back-ends
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod arch {
    pub mod x86_64;
    pub use x86_64::*;
}

#[cfg(all(target_arch = "aarch64", target_os = "none"))]
pub mod arch {
    pub mod aarch64;
    pub use aarch64::*;
}

/// Portable kernel entry point, reached from the per-arch boot stubs with a
/// valid stack and interrupts masked.
///
/// The order is fixed so that diagnostics survive partial failures: serial
/// comes up first, and every later step logs before touching its own
/// hardware. Detection never fails; unknown fields stay zero and tier
/// scoring collapses them to FALLBACK.
#[cfg(target_os = "none")]
#[no_mangle]
pub extern "C" fn kmain() -> ! {
    // A failed step is logged and boot continues: a machine with gaps
    // in its hardware still reaches the shell, if only invisibly. The
    // serial message below lands in the boot log ring even when serial
    // itself is what failed.
    if let Err(err) = hal::serial_init() {
        warn!("serial init failed: {}", err);
    }
    info!("noxiom {} starting", config::VERSION);

    info!("probing hardware");
    let mut hw = hal::hw_detect();
    hw.tier = hwinfo::score(&hw);
    let hw = hwinfo::publish(hw);

    info!("installing CPU tables");
    if let Err(err) = hal::cpu_init() {
        warn!("cpu init failed: {}", err);
    }

    info!("initializing interrupt controller");
    if let Err(err) = hal::intc_init() {
        warn!("interrupt controller init failed: {}", err);
    }

    info!("initializing display");
    if let Err(err) = hal::display_init() {
        warn!("display init failed: {}", err);
    }

    info!("initializing input");
    if let Err(err) = hal::input_init() {
        warn!("input init failed: {}", err);
    }

    banner(hw);

    let mut sh = shell::Shell::new();
    sh.run();

    // The shell only returns when asked to halt.
    hal::halt();
}

#[cfg(target_os = "none")]
fn banner(hw: &hwinfo::HwInfo) {
    use core::fmt::Write;

    let mut line: heapless::String<192> = heapless::String::new();
    let _ = write!(line, "CPU: {}  Tier: {}\n", hw.model.as_str(), hw.tier);

    hal::display_print("\n");
    hal::display_print(&line);
    hal::display_print(concat!(
        "Noxiom ",
        env!("CARGO_PKG_VERSION"),
        " - type 'help' for commands\n\n"
    ));

    info!("boot complete, entering shell (tier {})", hw.tier);
}

#[cfg(target_os = "none")]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    klib::panic::panic_handler(info)
}

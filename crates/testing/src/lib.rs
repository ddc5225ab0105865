// Noxiom host-side test suite.
//
// The kernel's portable algorithms are mirrored here in small,
// self-contained form so they can be exercised (and property-tested)
// on the host without a cross toolchain; the mirrors track the kernel
// sources named in each module header. `qemu_runtime` drives the real
// images end to end when QEMU is available.

pub mod fdt_parse;
pub mod qemu_runtime;
pub mod scancode;
pub mod shell_line;
pub mod tier;

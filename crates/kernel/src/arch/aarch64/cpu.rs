//! CPU identification through MIDR_EL1.
//!
//! The lookup keys on CPU-IP part numbers, not chip or board names, so
//! it works across every SoC carrying the same core. Apple is matched
//! on implementer alone because part numbers differ per chip.

use core::fmt::Write;

/// (implementer, part) pairs from MIDR_EL1.
const IMPL_ARM: u8 = 0x41;
const IMPL_BROADCOM: u8 = 0x42;
const IMPL_QUALCOMM: u8 = 0x51;
const IMPL_APPLE: u8 = 0x61;

const PARTS: &[(u8, u16, &str)] = &[
    (IMPL_ARM, 0xD03, "ARM Cortex-A53"),
    (IMPL_ARM, 0xD04, "ARM Cortex-A35"),
    (IMPL_ARM, 0xD05, "ARM Cortex-A55"),
    (IMPL_ARM, 0xD07, "ARM Cortex-A57"),
    (IMPL_ARM, 0xD08, "ARM Cortex-A72"),
    (IMPL_ARM, 0xD09, "ARM Cortex-A73"),
    (IMPL_ARM, 0xD0A, "ARM Cortex-A75"),
    (IMPL_ARM, 0xD0B, "ARM Cortex-A76"),
    (IMPL_ARM, 0xD0D, "ARM Cortex-A77"),
    (IMPL_ARM, 0xD41, "ARM Cortex-A78"),
    (IMPL_ARM, 0xD49, "ARM Neoverse N2"),
    (IMPL_BROADCOM, 0xD03, "Broadcom Cortex-A53"),
    (IMPL_BROADCOM, 0x100, "Broadcom BCM2711 A7"),
    (IMPL_QUALCOMM, 0x800, "Qualcomm Kryo"),
    (IMPL_QUALCOMM, 0x805, "Qualcomm Kryo Silver"),
];

#[inline]
fn read_midr() -> u64 {
    let midr: u64;
    unsafe {
        core::arch::asm!("mrs {}, MIDR_EL1", out(reg) midr, options(nomem, nostack));
    }
    midr
}

/// Decode a raw MIDR value to a display name, or format the raw fields
/// when the part is not in the table.
pub fn decode(midr: u64, out: &mut heapless::String<128>) {
    let implementer = ((midr >> 24) & 0xFF) as u8;
    let part = ((midr >> 4) & 0xFFF) as u16;

    // Apple parts vary per chip; the implementer is identification
    // enough.
    if implementer == IMPL_APPLE {
        let _ = out.push_str("Apple Silicon");
        return;
    }

    for &(imp, p, name) in PARTS {
        if imp == implementer && p == part {
            let _ = out.push_str(name);
            return;
        }
    }

    let _ = write!(out, "AArch64 CPU (impl={:#04x} part={:#05x})", implementer, part);
}

/// Fill the descriptor's model field from the running CPU.
pub fn model_string(out: &mut heapless::String<128>) {
    decode(read_midr(), out);
}

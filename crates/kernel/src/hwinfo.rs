//! Hardware descriptor and tier scoring.
//!
//! One process-wide descriptor is filled during boot by the arch back-end
//! (`hal::hw_detect`), scored, then published through a [`spin::Once`] and
//! treated as read-only for the rest of the kernel's life. All writes
//! happen before interrupts are enabled, so no locking is needed on the
//! read side.

use core::fmt;

use spin::Once;

/// CPU architecture the descriptor was collected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86_64,
    Arm64,
    Unknown,
}

/// Hardware capability tier, ordered weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Fallback,
    Low,
    Mid,
    High,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Fallback => "FALLBACK",
            Tier::Low => "LOW",
            Tier::Mid => "MID",
            Tier::High => "HIGH",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the kernel knows about the machine it booted on.
///
/// Detection never fails: fields that could not be determined stay zero
/// (or empty) and [`score`] maps that to [`Tier::Fallback`].
#[derive(Debug, Clone)]
pub struct HwInfo {
    pub arch: Arch,
    /// Logical processor count; 0 means unknown.
    pub cpu_cores: u32,
    /// Total detectable RAM in bytes; 0 means unknown.
    pub ram_bytes: u64,
    /// Human-readable CPU identifier.
    pub model: heapless::String<128>,
    /// Matched device-tree compatible string (ARM only; empty on PC).
    pub compat: heapless::String<64>,
    /// Discovered MMIO physical addresses; 0 when not applicable.
    pub uart_base: u64,
    pub intc_base: u64,
    pub intc_dist_base: u64,
    pub tier: Tier,
}

impl HwInfo {
    pub const fn empty(arch: Arch) -> Self {
        Self {
            arch,
            cpu_cores: 0,
            ram_bytes: 0,
            model: heapless::String::new(),
            compat: heapless::String::new(),
            uart_base: 0,
            intc_base: 0,
            intc_dist_base: 0,
            tier: Tier::Fallback,
        }
    }
}

const GIB: u64 = 1024 * 1024 * 1024;
const MIB: u64 = 1024 * 1024;

/// Compute the hardware tier from a filled descriptor.
///
/// Pure function; cases are evaluated top to bottom and the first match
/// wins. A descriptor with unknown core count or RAM always scores
/// FALLBACK, so partial detection can never over-promise.
pub fn score(hw: &HwInfo) -> Tier {
    let cores = hw.cpu_cores as u64;
    let ram = hw.ram_bytes;

    if cores == 0 || ram == 0 {
        Tier::Fallback
    } else if cores >= 4 && ram >= 2 * GIB {
        Tier::High
    } else if cores >= 2 && ram >= 512 * MIB {
        Tier::Mid
    } else if ram >= 128 * MIB {
        Tier::Low
    } else {
        Tier::Fallback
    }
}

static HW_INFO: Once<HwInfo> = Once::new();

/// Publish the boot-time descriptor. Called exactly once, before
/// interrupts are enabled.
pub fn publish(hw: HwInfo) -> &'static HwInfo {
    HW_INFO.call_once(|| hw)
}

/// The published descriptor, if boot has reached that point.
pub fn get() -> Option<&'static HwInfo> {
    HW_INFO.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(cores: u32, ram: u64) -> HwInfo {
        let mut hw = HwInfo::empty(Arch::Unknown);
        hw.cpu_cores = cores;
        hw.ram_bytes = ram;
        hw
    }

    #[test]
    fn zero_fields_are_fallback() {
        assert_eq!(score(&desc(0, 8 * GIB)), Tier::Fallback);
        assert_eq!(score(&desc(4, 0)), Tier::Fallback);
        assert_eq!(score(&desc(0, 0)), Tier::Fallback);
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(score(&desc(4, 2 * GIB)), Tier::High);
        assert_eq!(score(&desc(8, 8 * GIB)), Tier::High);
        assert_eq!(score(&desc(3, 2 * GIB)), Tier::Mid);
        assert_eq!(score(&desc(4, 2 * GIB - 1)), Tier::Mid);
        assert_eq!(score(&desc(2, 512 * MIB)), Tier::Mid);
        assert_eq!(score(&desc(1, 2 * GIB)), Tier::Low);
        assert_eq!(score(&desc(2, 512 * MIB - 1)), Tier::Low);
        assert_eq!(score(&desc(1, 128 * MIB)), Tier::Low);
        assert_eq!(score(&desc(1, 128 * MIB - 1)), Tier::Fallback);
    }

    #[test]
    fn scoring_is_pure() {
        let hw = desc(2, 1 * GIB);
        assert_eq!(score(&hw), score(&hw));
    }

    #[test]
    fn tier_ordering_is_monotone() {
        // Componentwise domination must never lower the tier.
        let samples = [0u64, 1, 127 * MIB, 128 * MIB, 512 * MIB, 2 * GIB, 16 * GIB];
        for &ra in &samples {
            for &rb in &samples {
                for ca in 0u32..6 {
                    for cb in 0u32..6 {
                        if ca >= cb && ra >= rb {
                            assert!(score(&desc(ca, ra)) >= score(&desc(cb, rb)));
                        }
                    }
                }
            }
        }
    }
}

// Host-side mirror of the tier-scoring table in
// crates/kernel/src/hwinfo.rs, kept in lockstep so the laws below pin
// the kernel's behavior.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Fallback,
    Low,
    Mid,
    High,
}

const GIB: u64 = 1024 * 1024 * 1024;
const MIB: u64 = 1024 * 1024;

pub fn score(cores: u32, ram_bytes: u64) -> Tier {
    let cores = cores as u64;

    if cores == 0 || ram_bytes == 0 {
        Tier::Fallback
    } else if cores >= 4 && ram_bytes >= 2 * GIB {
        Tier::High
    } else if cores >= 2 && ram_bytes >= 512 * MIB {
        Tier::Mid
    } else if ram_bytes >= 128 * MIB {
        Tier::Low
    } else {
        Tier::Fallback
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn boundary_table() {
        // The fixed thresholds, exercised exactly at their edges.
        assert_eq!(score(4, 2 * GIB), Tier::High);
        assert_eq!(score(4, 2 * GIB - 1), Tier::Mid);
        assert_eq!(score(3, 64 * GIB), Tier::Mid);
        assert_eq!(score(2, 512 * MIB), Tier::Mid);
        assert_eq!(score(2, 512 * MIB - 1), Tier::Low);
        assert_eq!(score(1, 128 * MIB), Tier::Low);
        assert_eq!(score(1, 128 * MIB - 1), Tier::Fallback);
    }

    #[test]
    fn pc_boot_scenarios() {
        // 8 cores / 8 GiB is a HIGH machine; zero RAM detection is
        // always FALLBACK no matter the core count.
        assert_eq!(score(8, 8 * GIB), Tier::High);
        assert_eq!(score(4, 0), Tier::Fallback);
    }

    proptest! {
        #[test]
        fn purity(cores in 0u32..=256, ram in 0u64..=64 * GIB) {
            prop_assert_eq!(score(cores, ram), score(cores, ram));
        }

        #[test]
        fn zero_means_fallback(cores in 0u32..=256, ram in 0u64..=64 * GIB) {
            prop_assert_eq!(score(0, ram), Tier::Fallback);
            prop_assert_eq!(score(cores, 0), Tier::Fallback);
        }

        #[test]
        fn monotone_in_both_components(
            cores_a in 0u32..=64, cores_b in 0u32..=64,
            ram_a in 0u64..=8 * GIB, ram_b in 0u64..=8 * GIB,
        ) {
            // Componentwise domination never lowers the tier.
            let (hi_c, lo_c) = (cores_a.max(cores_b), cores_a.min(cores_b));
            let (hi_r, lo_r) = (ram_a.max(ram_b), ram_a.min(ram_b));
            prop_assert!(score(hi_c, hi_r) >= score(lo_c, lo_r));
        }
    }
}

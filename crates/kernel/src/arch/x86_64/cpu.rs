//! Hardware detection: CPUID topology/brand plus CMOS memory sizing.
//!
//! Detection never fails. Anything the hardware refuses to report stays
//! zero in the descriptor and tier scoring degrades to FALLBACK.

use raw_cpuid::{CpuId, TopologyType};
use x86_64::instructions::port::Port;

use crate::hwinfo::{Arch, HwInfo};

/// CMOS index/data ports.
const CMOS_INDEX: u16 = 0x70;
const CMOS_DATA: u16 = 0x71;

/// Extended memory between 1 MiB and 16 MiB, in KiB.
const CMOS_EXT_LOW: u8 = 0x30;
const CMOS_EXT_HIGH: u8 = 0x31;

/// Memory above 16 MiB, in 64 KiB units.
const CMOS_EXT2_LOW: u8 = 0x34;
const CMOS_EXT2_HIGH: u8 = 0x35;

/// CMOS sizing undershoots on machines with more RAM than the legacy
/// registers can express; never report less than this.
const RAM_FLOOR: u64 = 128 * 1024 * 1024;

pub fn detect() -> HwInfo {
    let mut hw = HwInfo::empty(Arch::X86_64);

    let cpuid = CpuId::new();

    hw.cpu_cores = logical_cores(&cpuid);

    if let Some(brand) = cpuid.get_processor_brand_string() {
        // Brand strings are right-justified with leading spaces.
        let _ = hw.model.push_str(brand.as_str().trim_start());
    }
    if hw.model.is_empty() {
        let _ = hw.model.push_str("x86_64 CPU");
    }

    hw.ram_bytes = unsafe { cmos_ram_bytes() };

    hw
}

/// Logical processor count: CPUID leaf 0x0B core level when the CPU
/// reports extended topology, otherwise the leaf-1 EBX[23:16] count.
/// Zero means detection came up empty.
fn logical_cores(cpuid: &CpuId) -> u32 {
    if let Some(topo) = cpuid.get_extended_topology_info() {
        for level in topo {
            if level.level_type() == TopologyType::Core {
                let n = level.processors() as u32;
                if n > 0 {
                    return n;
                }
            }
        }
    }

    cpuid
        .get_feature_info()
        .map(|f| f.max_logical_processor_ids() as u32)
        .unwrap_or(0)
}

/// RAM estimate from the legacy CMOS registers: base megabyte +
/// extended KiB (0x30/0x31) + 64 KiB units above 16 MiB (0x34/0x35),
/// floored so modern hardware is never under-tiered.
unsafe fn cmos_ram_bytes() -> u64 {
    let ext_kib = cmos_read(CMOS_EXT_LOW) as u64 | (cmos_read(CMOS_EXT_HIGH) as u64) << 8;
    let ext2_units = cmos_read(CMOS_EXT2_LOW) as u64 | (cmos_read(CMOS_EXT2_HIGH) as u64) << 8;

    let bytes = 1024 * 1024 + ext_kib * 1024 + ext2_units * 64 * 1024;
    bytes.max(RAM_FLOOR)
}

unsafe fn cmos_read(reg: u8) -> u8 {
    Port::<u8>::new(CMOS_INDEX).write(reg);
    Port::<u8>::new(CMOS_DATA).read()
}

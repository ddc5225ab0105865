// Boot the real kernel images under QEMU and watch the serial channel
// for life signs. These tests are gated behind the `qemu-tests` feature
// (and skip themselves when the emulator or image is absent) so the
// default suite stays hermetic.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

/// How long a cold boot may take before we call it hung.
const BOOT_TIMEOUT: Duration = Duration::from_secs(30);

pub fn workspace_root() -> PathBuf {
    // crates/testing -> crates -> workspace root
    let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest.parent().and_then(Path::parent).unwrap().to_path_buf()
}

pub fn have(binary: &str) -> bool {
    Command::new(binary)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run QEMU with the given args until `marker` shows up on serial
/// stdout, or fail on timeout.
pub fn boot_until(binary: &str, args: &[&str], marker: &str) -> Result<()> {
    let mut child = Command::new(binary)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .stdin(Stdio::null())
        .spawn()
        .with_context(|| format!("spawning {binary}"))?;

    let mut stdout = child.stdout.take().context("no stdout pipe")?;
    let start = Instant::now();
    let mut seen = String::new();

    use std::io::Read;
    let mut buf = [0u8; 4096];
    let found = loop {
        if start.elapsed() > BOOT_TIMEOUT {
            break false;
        }
        match stdout.read(&mut buf) {
            Ok(0) => break seen.contains(marker),
            Ok(n) => {
                seen.push_str(&String::from_utf8_lossy(&buf[..n]));
                if seen.contains(marker) {
                    break true;
                }
            }
            Err(_) => break false,
        }
    };

    let _ = child.kill();
    let _ = child.wait();

    anyhow::ensure!(found, "marker {marker:?} not seen; serial output:\n{seen}");
    Ok(())
}

#[cfg(all(test, feature = "qemu-tests"))]
mod tests {
    use super::*;

    #[test]
    fn pc_image_boots_to_banner() {
        let image = workspace_root().join("out/noxiom-bios.img");
        if !have("qemu-system-x86_64") || !image.exists() {
            eprintln!("skipping: qemu-system-x86_64 or image missing");
            return;
        }
        boot_until(
            "qemu-system-x86_64",
            &[
                "-drive",
                &format!("format=raw,file={}", image.display()),
                "-serial",
                "stdio",
                "-display",
                "none",
            ],
            "boot complete",
        )
        .unwrap();
    }

    #[test]
    fn arm_image_boots_to_banner() {
        let image = workspace_root().join("out/kernel8.img");
        if !have("qemu-system-aarch64") || !image.exists() {
            eprintln!("skipping: qemu-system-aarch64 or image missing");
            return;
        }
        boot_until(
            "qemu-system-aarch64",
            &[
                "-M",
                "raspi3b",
                "-kernel",
                &image.display().to_string(),
                "-serial",
                "stdio",
                "-display",
                "none",
            ],
            "boot complete",
        )
        .unwrap();
    }
}

//! Stamps the build time and git revision into the binary
//! (`VULNGUARD_BUILD_TIME`, `VULNGUARD_GIT_HASH`).

use chrono::Utc;
use std::process::Command;

fn git_revision() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}

fn main() {
    let build_time = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let revision = git_revision().unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=VULNGUARD_BUILD_TIME={}", build_time);
    println!("cargo:rustc-env=VULNGUARD_GIT_HASH={}", revision);

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
}

//! Build metadata stamped in by the build script

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const BUILD_TIME: &str = env!("VULNGUARD_BUILD_TIME");
pub const GIT_HASH: &str = env!("VULNGUARD_GIT_HASH");

/// One-line banner logged at startup
pub fn banner() -> String {
    format!("vulnguard {} ({}, built {})", VERSION, GIT_HASH, BUILD_TIME)
}

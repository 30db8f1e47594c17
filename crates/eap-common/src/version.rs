//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the core runtime."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use serde::Serialize;

/// Build metadata reported by the binaries.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct VersionInfo {
    pub semver: &'static str,
    pub profile: &'static str,
    pub target_os: &'static str,
    pub target_arch: &'static str,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            semver: env!("CARGO_PKG_VERSION"),
            profile: if cfg!(debug_assertions) {
                "debug"
            } else {
                "release"
            },
            target_os: std::env::consts::OS,
            target_arch: std::env::consts::ARCH,
        }
    }

    pub fn cli_string(&self) -> String {
        format!("{} ({})", self.semver, self.profile)
    }

    pub fn extended(&self) -> String {
        format!(
            "Energy Analytics Platform {}\nprofile: {}\ntarget: {}-{}",
            self.semver, self.profile, self.target_arch, self.target_os
        )
    }
}

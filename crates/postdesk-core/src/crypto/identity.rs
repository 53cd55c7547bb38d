//! Host identity used as key derivation input.

use sha2::{Digest, Sha256};

/// Placeholder for identity parts the OS would not give us.
const UNKNOWN: &str = "unknown";

/// Stable description of the machine, user, and application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    pub platform: String,
    pub arch: String,
    pub hostname: String,
    pub username: String,
    pub app_name: String,
    pub app_version: String,
}

impl HostIdentity {
    pub fn new(
        platform: impl Into<String>,
        arch: impl Into<String>,
        hostname: impl Into<String>,
        username: impl Into<String>,
        app_name: impl Into<String>,
        app_version: impl Into<String>,
    ) -> Self {
        Self {
            platform: platform.into(),
            arch: arch.into(),
            hostname: hostname.into(),
            username: username.into(),
            app_name: app_name.into(),
            app_version: app_version.into(),
        }
    }

    /// Read the identity of the current host and OS user.
    ///
    /// Parts that cannot be determined are replaced with `"unknown"` rather
    /// than failing, so the derived key stays stable on that host.
    pub fn detect(app_name: &str, app_version: &str) -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let username = ["USER", "USERNAME", "LOGNAME"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|name| !name.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string());

        Self::new(
            std::env::consts::OS,
            std::env::consts::ARCH,
            hostname,
            username,
            app_name,
            app_version,
        )
    }

    /// Hex SHA-256 of the machine and user parts.
    pub fn machine_id(&self) -> String {
        let machine_info = format!(
            "{}-{}-{}-{}",
            self.platform, self.arch, self.hostname, self.username
        );
        hex::encode(Sha256::digest(machine_info.as_bytes()))
    }

    /// The string fed to the key derivation function.
    pub fn key_material(&self) -> String {
        format!("{}-{}-{}", self.machine_id(), self.app_name, self.app_version)
    }
}

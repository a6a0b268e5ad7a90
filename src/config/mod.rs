//! Gateway configuration
//!
//! Loaded from a TOML file such as:
//!
//! ```toml
//! gpg_program = "/usr/bin/gpg"
//! home_dir = "/var/lib/app/gnupg"
//! staging_dir = "/var/lib/app/staging"
//! ```
//!
//! Every key is optional.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable overriding the default keyring directory.
pub const HOME_ENV: &str = "GPG_GATEWAY_HOME";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Settings for [`crate::SignatureGateway`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// Signing tool executable (default: "gpg", resolved through PATH)
    pub gpg_program: String,

    /// Keyring directory passed as `--homedir`
    pub home_dir: PathBuf,

    /// Directory for staged input files (default: OS temp dir)
    pub staging_dir: PathBuf,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            gpg_program: "gpg".to_string(),
            home_dir: default_home_dir(std::env::var_os(HOME_ENV)),
            staging_dir: std::env::temp_dir(),
        }
    }
}

/// Keyring directory used when the config does not name one.
///
/// The fallback lives under the OS temp dir, so it carries the uid on Unix
/// to keep users on one host from sharing it.
fn default_home_dir(env_override: Option<OsString>) -> PathBuf {
    match env_override {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => std::env::temp_dir().join(default_home_name()),
    }
}

#[cfg(unix)]
fn default_home_name() -> String {
    format!("gpg-gateway-home-{}", current_uid())
}

#[cfg(not(unix))]
fn default_home_name() -> String {
    "gpg-gateway-home".to_string()
}

#[cfg(unix)]
fn current_uid() -> u32 {
    // SAFETY: getuid has no preconditions and cannot fail.
    unsafe { libc::getuid() }
}

impl GatewayConfig {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse config from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: GatewayConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.gpg_program.trim().is_empty() {
            return Err(ConfigError::Invalid("gpg_program must not be empty".to_string()));
        }
        if self.home_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("home_dir must not be empty".to_string()));
        }
        if self.staging_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("staging_dir must not be empty".to_string()));
        }
        Ok(())
    }

    /// Create the keyring directory if it does not exist yet, then check
    /// that it is private.
    ///
    /// The keyring decides which signatures verify as valid, so a directory
    /// that someone else created or can write to is refused. On Unix the
    /// directory must be owned by the current user and carry no group or
    /// other permission bits; a new one is created with mode 0700.
    pub fn prepare_home(&self) -> Result<(), ConfigError> {
        if fs::symlink_metadata(&self.home_dir).is_err() {
            if let Some(parent) = self.home_dir.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            let mut builder = fs::DirBuilder::new();
            #[cfg(unix)]
            {
                use std::os::unix::fs::DirBuilderExt;
                builder.mode(0o700);
            }
            match builder.create(&self.home_dir) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e.into()),
            }
        }
        self.check_home_private()
    }

    fn check_home_private(&self) -> Result<(), ConfigError> {
        let metadata = fs::symlink_metadata(&self.home_dir)?;
        if !metadata.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "home_dir {} is not a directory",
                self.home_dir.display()
            )));
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            if metadata.uid() != current_uid() {
                return Err(ConfigError::Invalid(format!(
                    "home_dir {} is owned by uid {}, not the current user",
                    self.home_dir.display(),
                    metadata.uid()
                )));
            }
            let mode = metadata.mode() & 0o777;
            if mode & 0o077 != 0 {
                return Err(ConfigError::Invalid(format!(
                    "home_dir {} has mode {:o}, group and other access must be off",
                    self.home_dir.display(),
                    mode
                )));
            }
        }
        Ok(())
    }
}

//! Signing tool gateway
//!
//! Runs `gpg --import` and `gpg --verify` for callers that only have bytes
//! in hand. Each call stages its inputs as temporary files, invokes the tool
//! once with a fixed, non-interactive argument set, removes the staged files
//! and interprets the status output.
//!
//! Calls are synchronous and share no state. A hung tool hangs the caller;
//! there is no timeout.

pub mod args;

use std::path::PathBuf;
use std::sync::Arc;

use gpg_status::{parse_import, parse_verify, ImportResult, VerifyResult};
use tracing::{debug, warn};

use crate::config::{ConfigError, GatewayConfig};
use crate::process::{Invocation, InvocationError, ProcessOutput, ProcessRunner, SystemRunner};
use crate::staging::{DirStagingArea, StagedFile, StagingArea, StagingError};

/// Gateway errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Invocation failed: {0}")]
    Invocation(#[from] InvocationError),

    #[error("Staging failed: {0}")]
    Staging(#[from] StagingError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("keyring directory is not valid UTF-8: {}", .0.display())]
    NonUtf8Home(PathBuf),
}

/// Import and verify through an external signing tool.
pub struct SignatureGateway {
    program: String,
    home_dir: PathBuf,
    runner: Arc<dyn ProcessRunner>,
    staging: Arc<dyn StagingArea>,
}

impl SignatureGateway {
    /// Create a gateway with explicit collaborators.
    pub fn new(
        config: &GatewayConfig,
        runner: Arc<dyn ProcessRunner>,
        staging: Arc<dyn StagingArea>,
    ) -> Self {
        Self {
            program: config.gpg_program.clone(),
            home_dir: config.home_dir.clone(),
            runner,
            staging,
        }
    }

    /// Create a gateway that spawns the configured program and stages
    /// files in the configured directory. Creates the keyring directory.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        config.prepare_home()?;
        Ok(Self::new(
            config,
            Arc::new(SystemRunner::new()),
            Arc::new(DirStagingArea::new(&config.staging_dir)),
        ))
    }

    /// Import public key material.
    ///
    /// Output without an `IMPORT_OK` line yields an empty [`ImportResult`].
    pub fn import(&self, key_material: &[u8]) -> Result<ImportResult, GatewayError> {
        let staging = self.staging.as_ref();
        let key_file = StagedFile::create(staging, "key", key_material)?;

        let outcome = key_file
            .arg()
            .map_err(GatewayError::from)
            .and_then(|key_path| self.run(args::import(&key_path)));
        let cleanup = [key_file.discard()];

        let output = settle(outcome, cleanup)?;
        let result = parse_import(&output.text());
        debug!(
            imported = result.imported,
            fingerprint = result.fingerprint.as_deref().unwrap_or(""),
            "import finished"
        );
        Ok(result)
    }

    /// Check a detached signature over `message`.
    ///
    /// `Ok(None)` means the tool ran but reported no verdict.
    pub fn verify(
        &self,
        message: &[u8],
        signature: &[u8],
    ) -> Result<Option<VerifyResult>, GatewayError> {
        let staging = self.staging.as_ref();
        let message_file = StagedFile::create(staging, "msg", message)?;
        let signature_file = StagedFile::create(staging, "sig", signature)?;

        let outcome = signature_file
            .arg()
            .and_then(|sig| Ok((sig, message_file.arg()?)))
            .map_err(GatewayError::from)
            .and_then(|(sig, msg)| self.run(args::verify(&sig, &msg)));
        let cleanup = [signature_file.discard(), message_file.discard()];

        let output = settle(outcome, cleanup)?;
        let result = parse_verify(&output.lines);
        match &result {
            Some(verdict) => debug!(
                summary = verdict.summary.code(),
                fingerprint = %verdict.fingerprint,
                "verify finished"
            ),
            None => debug!(lines = output.lines.len(), "verify produced no verdict"),
        }
        Ok(result)
    }

    fn run(&self, operation: Vec<String>) -> Result<ProcessOutput, GatewayError> {
        let home_dir = self
            .home_dir
            .to_str()
            .ok_or_else(|| GatewayError::NonUtf8Home(self.home_dir.clone()))?;

        let invocation = Invocation::new(&self.program)
            .args(args::baseline(home_dir))
            .args(operation);
        debug!(command = %invocation.command_line(), "invoking signing tool");

        let output = self.runner.run(&invocation)?;
        if !output.success() {
            // gpg exits non-zero for bad or uncheckable signatures too
            debug!(exit_code = output.exit_code, "signing tool exited non-zero");
        }
        Ok(output)
    }
}

/// Combine the invocation outcome with cleanup results.
///
/// An invocation error wins; cleanup errors are then only logged. Otherwise
/// the first cleanup error fails the call.
fn settle<const N: usize>(
    outcome: Result<ProcessOutput, GatewayError>,
    cleanup: [Result<(), StagingError>; N],
) -> Result<ProcessOutput, GatewayError> {
    match outcome {
        Err(e) => {
            for removal in cleanup {
                if let Err(cleanup_err) = removal {
                    warn!(error = %cleanup_err, "cleanup failed after invocation error");
                }
            }
            Err(e)
        }
        Ok(output) => {
            for removal in cleanup {
                removal?;
            }
            Ok(output)
        }
    }
}

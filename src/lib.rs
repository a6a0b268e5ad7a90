//! GPG Gateway - OpenPGP import and detached-signature verification
//!
//! Drives an external `gpg` process and reads its machine-readable status
//! output instead of its human-readable messages. Status parsing lives in the
//! `gpg-status` crate; this crate owns invocation, input staging and cleanup.

pub mod config;
pub mod gateway;
pub mod process;
pub mod quote;
pub mod staging;

pub use config::{ConfigError, GatewayConfig};
pub use gateway::{GatewayError, SignatureGateway};
pub use gpg_status::{ImportResult, ImportStats, Summary, VerifyResult};
pub use process::{
    Invocation, InvocationError, ProcessOutput, ProcessRunner, RecordingRunner, SystemRunner,
};
pub use staging::{DirStagingArea, StagedFile, StagingArea, StagingError};

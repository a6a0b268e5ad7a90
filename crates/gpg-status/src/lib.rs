//! Parser for the GnuPG status protocol.
//!
//! GnuPG reports machine-readable outcomes on its status channel as lines of
//! the form `[GNUPG:] KEYWORD field field ...`. This crate turns the lines of
//! one `--import` or `--verify` run into typed results without ever looking
//! at the human-readable diagnostics.

mod import;
mod line;
mod result;
mod verify;

pub use import::parse_import;
pub use line::StatusLine;
pub use result::{ImportResult, ImportStats, Summary, VerifyResult};
pub use verify::parse_verify;

/// Keyword of a good signature with full key details.
pub const VALIDSIG: &str = "VALIDSIG";

/// Keyword of a signature that failed cryptographic verification.
pub const BADSIG: &str = "BADSIG";

/// Keyword of a signature that could not be checked at all.
pub const ERRSIG: &str = "ERRSIG";

/// Keyword emitted once per successfully processed key during import.
pub const IMPORT_OK: &str = "IMPORT_OK";

/// Keyword of the final import statistics line.
pub const IMPORT_RES: &str = "IMPORT_RES";

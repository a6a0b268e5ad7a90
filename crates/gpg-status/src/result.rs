//! Typed outcomes of import and verify runs.

use serde::{Deserialize, Serialize};

/// Verdict category of a verification run.
///
/// Serialized as its numeric code so consumers that expect the classic
/// `summary` integer keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u32")]
pub enum Summary {
    /// Signature is cryptographically valid.
    Valid,
    /// Signature did not verify.
    Bad,
    /// Signature could not be checked (missing key, unsupported algorithm, malformed data).
    Error,
}

impl Summary {
    /// Numeric summary code: 0, 4 or 128.
    pub fn code(self) -> u32 {
        match self {
            Self::Valid => 0,
            Self::Bad => 4,
            Self::Error => 128,
        }
    }

    /// Inverse of [`Summary::code`].
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Valid),
            4 => Some(Self::Bad),
            128 => Some(Self::Error),
            _ => None,
        }
    }
}

impl From<Summary> for u32 {
    fn from(summary: Summary) -> Self {
        summary.code()
    }
}

/// Outcome of one verification run that produced a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyResult {
    /// Fingerprint (VALIDSIG) or key id (BADSIG, ERRSIG) named by the verdict line.
    pub fingerprint: String,

    /// Reserved; always 0.
    pub validity: u32,

    /// Signature creation time in Unix seconds, 0 when unavailable.
    pub timestamp: i64,

    /// Every status line of the run, in emission order.
    pub raw_status_lines: Vec<String>,

    /// Verdict category.
    pub summary: Summary,
}

impl VerifyResult {
    /// True only for a cryptographically valid signature.
    pub fn is_valid(&self) -> bool {
        self.summary == Summary::Valid
    }
}

/// Counters from the `IMPORT_RES` line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    /// Keys processed.
    pub considered: u32,
    /// Keys newly imported.
    pub imported: u32,
    /// Keys already present and unchanged.
    pub unchanged: u32,
    /// Secret keys read.
    pub secret_read: u32,
    /// Secret keys imported.
    pub secret_imported: u32,
    /// Keys rejected.
    pub not_imported: u32,
}

/// Outcome of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    /// Count taken from the first `IMPORT_OK` line; 0 when none was emitted.
    pub imported: u32,

    /// Fingerprint from the first `IMPORT_OK` line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    /// Totals reported by `IMPORT_RES`, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ImportStats>,
}

impl ImportResult {
    /// True when nothing was imported.
    pub fn is_empty(&self) -> bool {
        self.imported == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_codes() {
        assert_eq!(Summary::Valid.code(), 0);
        assert_eq!(Summary::Bad.code(), 4);
        assert_eq!(Summary::Error.code(), 128);
        assert_eq!(Summary::from_code(128), Some(Summary::Error));
        assert_eq!(Summary::from_code(1), None);
    }

    #[test]
    fn test_summary_serializes_as_integer() {
        let result = VerifyResult {
            fingerprint: "AAAA1111".to_string(),
            validity: 0,
            timestamp: 1405769272,
            raw_status_lines: vec![],
            summary: Summary::Bad,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["summary"], 4);
        assert_eq!(json["fingerprint"], "AAAA1111");
    }

    #[test]
    fn test_empty_import_omits_fingerprint() {
        let json = serde_json::to_value(ImportResult::default()).unwrap();
        assert_eq!(json, serde_json::json!({ "imported": 0 }));
    }
}

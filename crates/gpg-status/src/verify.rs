//! Verdict extraction for `--verify` runs.

use crate::line::StatusLine;
use crate::result::{Summary, VerifyResult};
use crate::{BADSIG, ERRSIG, VALIDSIG};

/// Field of `VALIDSIG` holding the signature creation timestamp.
///
/// Layout: `VALIDSIG <fpr> <date> <timestamp> <expire> <version> <reserved>
/// <pubkey-algo> <hash-algo> <sig-class> [<primary-fpr>]`.
const VALIDSIG_TIMESTAMP_FIELD: usize = 4;

/// Field of `ERRSIG` holding the signature creation timestamp.
///
/// Layout: `ERRSIG <keyid> <pkalgo> <hashalgo> <sigclass> <time> <rc>`.
const ERRSIG_TIMESTAMP_FIELD: usize = 6;

/// Field holding the fingerprint or key id on every verdict line.
const KEY_FIELD: usize = 2;

/// Extract the verdict of a verification run.
///
/// Lines are scanned in emission order and the first one whose keyword is
/// `VALIDSIG`, `BADSIG` or `ERRSIG` decides the result; anything after it is
/// ignored for verdict purposes even when it contradicts. Lines with fewer
/// than three fields are skipped. Every input line, skipped or not, is kept
/// in [`VerifyResult::raw_status_lines`].
///
/// Returns `None` when no verdict line is present at all.
pub fn parse_verify<I, S>(lines: I) -> Option<VerifyResult>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let raw_status_lines: Vec<String> = lines
        .into_iter()
        .map(|line| line.as_ref().to_string())
        .collect();

    let (fingerprint, timestamp, summary) = raw_status_lines
        .iter()
        .map(|raw| StatusLine::parse(raw))
        .filter(StatusLine::is_verdict_candidate)
        .find_map(|line| verdict(&line))?;

    Some(VerifyResult {
        fingerprint,
        validity: 0,
        timestamp,
        raw_status_lines,
        summary,
    })
}

fn verdict(line: &StatusLine<'_>) -> Option<(String, i64, Summary)> {
    let key = line.field(KEY_FIELD)?.to_string();
    if line.has_keyword(VALIDSIG) {
        Some((key, line.timestamp_at(VALIDSIG_TIMESTAMP_FIELD), Summary::Valid))
    } else if line.has_keyword(BADSIG) {
        Some((key, 0, Summary::Bad))
    } else if line.has_keyword(ERRSIG) {
        Some((key, line.timestamp_at(ERRSIG_TIMESTAMP_FIELD), Summary::Error))
    } else {
        None
    }
}

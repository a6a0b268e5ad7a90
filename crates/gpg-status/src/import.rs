//! Result extraction for `--import` runs.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::line::StatusLine;
use crate::result::{ImportResult, ImportStats};
use crate::IMPORT_RES;

fn import_ok_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\bIMPORT_OK[ \t]+(\d+)[ \t]+(\S+)").expect("IMPORT_OK pattern is valid")
    })
}

/// Extract the import outcome from the captured output of one run.
///
/// The first `IMPORT_OK <count> <fingerprint>` occurrence anywhere in the
/// output decides `imported` and `fingerprint`. Without one the result is
/// an empty import, not an error.
pub fn parse_import(output: &str) -> ImportResult {
    let (imported, fingerprint) = import_ok_pattern()
        .captures_iter(output)
        .find_map(|caps| {
            let count = caps.get(1)?.as_str().parse::<u32>().ok()?;
            let fingerprint = caps.get(2)?.as_str().to_string();
            Some((count, Some(fingerprint)))
        })
        .unwrap_or((0, None));

    ImportResult {
        imported,
        fingerprint,
        stats: import_stats(output),
    }
}

/// Read the `IMPORT_RES` totals line.
///
/// Layout: `IMPORT_RES <count> <no_user_id> <imported> <imported_rsa>
/// <unchanged> <n_uids> <n_subk> <n_sigs> <n_revoc> <sec_read>
/// <sec_imported> <sec_dups> <skipped_new_keys> <not_imported> ...`.
/// Older GnuPG releases stop before `not_imported`.
fn import_stats(output: &str) -> Option<ImportStats> {
    let line = output
        .lines()
        .map(StatusLine::parse)
        .find(|line| line.has_keyword(IMPORT_RES))?;

    let counter = |index: usize| -> Option<u32> { line.field(index)?.parse().ok() };

    Some(ImportStats {
        considered: counter(2)?,
        imported: counter(4)?,
        unchanged: counter(6)?,
        secret_read: counter(11)?,
        secret_imported: counter(12)?,
        not_imported: counter(15).unwrap_or(0),
    })
}

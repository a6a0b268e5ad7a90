//! Gateway flow tests
//!
//! Drive `SignatureGateway` end to end with a scripted runner and a real
//! staging directory, checking arguments, staged contents, results and
//! cleanup.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gpg_gateway::gateway::args::BASELINE_FLAGS;
use gpg_gateway::{
    DirStagingArea, GatewayConfig, GatewayError, ProcessRunner, RecordingRunner, SignatureGateway,
    StagingArea, StagingError, Summary,
};
use tempfile::TempDir;

const VALID_LINE: &str = "[x] VALIDSIG AAAA1111 2014-07-19 1405769272 0 4 0 1 10 00 AAAA1111";
const BAD_LINE: &str = "[x] BADSIG BBBB2222 Some Name <a@b.c>";
const ERR_LINE: &str = "[x] ERRSIG CCCC3333 1 10 00 1405769272 9";

struct Fixture {
    _tmp: TempDir,
    staging_dir: PathBuf,
    config: GatewayConfig,
}

impl Fixture {
    fn new() -> Self {
        Self::with_staging_name("staging")
    }

    fn with_staging_name(name: &str) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let staging_dir = tmp.path().join(name);
        fs::create_dir(&staging_dir).unwrap();
        let config = GatewayConfig {
            gpg_program: "gpg".to_string(),
            home_dir: tmp.path().join("home"),
            staging_dir: staging_dir.clone(),
        };
        Self {
            _tmp: tmp,
            staging_dir,
            config,
        }
    }

    fn gateway(&self, runner: Arc<dyn ProcessRunner>) -> SignatureGateway {
        self.gateway_with(runner, Arc::new(DirStagingArea::new(&self.staging_dir)))
    }

    fn gateway_with(
        &self,
        runner: Arc<dyn ProcessRunner>,
        staging: Arc<dyn StagingArea>,
    ) -> SignatureGateway {
        SignatureGateway::new(&self.config, runner, staging)
    }

    fn staged_files(&self) -> Vec<PathBuf> {
        fs::read_dir(&self.staging_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }
}

fn home_arg(fixture: &Fixture) -> String {
    fixture.config.home_dir.to_str().unwrap().to_string()
}

// =============================================================================
// Import
// =============================================================================

#[test]
fn test_import_reports_count_and_fingerprint() {
    let fixture = Fixture::new();
    let runner = Arc::new(RecordingRunner::with_status_lines(
        0,
        ["[GNUPG:] IMPORT_OK 3 ABCD1234", "[GNUPG:] IMPORT_RES 1 0 1 0 0 0 0 0 0 0 0 0 0 0 0"],
    ));
    let gateway = fixture.gateway(runner.clone());

    let result = gateway.import(b"-----BEGIN PGP PUBLIC KEY BLOCK-----").unwrap();
    assert_eq!(result.imported, 3);
    assert_eq!(result.fingerprint.as_deref(), Some("ABCD1234"));
    assert_eq!(result.stats.unwrap().considered, 1);
    assert!(fixture.staged_files().is_empty());
}

#[test]
fn test_import_arguments() {
    let fixture = Fixture::new();
    let runner = Arc::new(RecordingRunner::with_status_lines(0, Vec::<String>::new()));
    let gateway = fixture.gateway(runner.clone());
    gateway.import(b"key").unwrap();

    let invocations = runner.invocations();
    assert_eq!(invocations.len(), 1);
    let invocation = &invocations[0];
    assert_eq!(invocation.program, "gpg");

    let args = &invocation.args;
    assert_eq!(args[0], "--homedir");
    assert_eq!(args[1], home_arg(&fixture));
    assert_eq!(&args[2..2 + BASELINE_FLAGS.len()], BASELINE_FLAGS);
    assert_eq!(args.len(), 5 + BASELINE_FLAGS.len());
    assert_eq!(args[args.len() - 3], "--import");
    assert_eq!(args[args.len() - 2], "--");

    let key_path = &args[args.len() - 1];
    assert!(Path::new(key_path).starts_with(&fixture.staging_dir));
    assert_eq!(runner.observed_files().get(key_path).unwrap(), b"key");
    assert!(!Path::new(key_path).exists());
}

#[test]
fn test_import_without_marker_is_empty() {
    let fixture = Fixture::new();
    let runner = Arc::new(RecordingRunner::with_status_lines(2, ["[GNUPG:] NODATA 1"]));
    let result = fixture.gateway(runner).import(b"garbage").unwrap();
    assert_eq!(result.imported, 0);
    assert_eq!(result.fingerprint, None);
}

#[test]
fn test_import_invocation_failure_cleans_up() {
    let fixture = Fixture::new();
    let gateway = fixture.gateway(Arc::new(RecordingRunner::unavailable()));
    let err = gateway.import(b"key").unwrap_err();
    assert!(matches!(err, GatewayError::Invocation(_)));
    assert!(fixture.staged_files().is_empty());
}

// =============================================================================
// Verify
// =============================================================================

#[test]
fn test_verify_valid() {
    let fixture = Fixture::new();
    let runner = Arc::new(RecordingRunner::with_status_lines(0, [VALID_LINE]));
    let result = fixture.gateway(runner).verify(b"msg", b"sig").unwrap().unwrap();
    assert_eq!(result.fingerprint, "AAAA1111");
    assert_eq!(result.validity, 0);
    assert_eq!(result.timestamp, 1405769272);
    assert_eq!(result.summary, Summary::Valid);
    assert_eq!(result.raw_status_lines, vec![VALID_LINE]);
}

#[test]
fn test_verify_bad_with_non_zero_exit() {
    let fixture = Fixture::new();
    let runner = Arc::new(RecordingRunner::with_status_lines(1, [BAD_LINE]));
    let result = fixture.gateway(runner).verify(b"msg", b"sig").unwrap().unwrap();
    assert_eq!(result.fingerprint, "BBBB2222");
    assert_eq!(result.timestamp, 0);
    assert_eq!(result.summary.code(), 4);
}

#[test]
fn test_verify_error() {
    let fixture = Fixture::new();
    let runner = Arc::new(RecordingRunner::with_status_lines(2, [ERR_LINE]));
    let result = fixture.gateway(runner).verify(b"msg", b"sig").unwrap().unwrap();
    assert_eq!(result.fingerprint, "CCCC3333");
    assert_eq!(result.timestamp, 1405769272);
    assert_eq!(result.summary.code(), 128);
}

#[test]
fn test_verify_undetermined() {
    let fixture = Fixture::new();
    let runner = Arc::new(RecordingRunner::with_status_lines(2, ["[x] NEWSIG", "[x] NODATA 1"]));
    let result = fixture.gateway(runner).verify(b"msg", b"sig").unwrap();
    assert!(result.is_none());
    assert!(fixture.staged_files().is_empty());
}

#[test]
fn test_verify_passes_signature_before_message() {
    let fixture = Fixture::new();
    let runner = Arc::new(RecordingRunner::with_status_lines(0, [VALID_LINE]));
    fixture
        .gateway(runner.clone())
        .verify(b"the message", b"the signature")
        .unwrap();

    let invocation = runner.invocations().remove(0);
    let n = invocation.args.len();
    assert_eq!(invocation.args[n - 4], "--verify");
    assert_eq!(invocation.args[n - 3], "--");
    let observed = runner.observed_files();
    assert_eq!(observed.get(&invocation.args[n - 2]).unwrap(), b"the signature");
    assert_eq!(observed.get(&invocation.args[n - 1]).unwrap(), b"the message");
    assert!(fixture.staged_files().is_empty());
}

#[test]
fn test_verify_invocation_failure_cleans_up() {
    let fixture = Fixture::new();
    let gateway = fixture.gateway(Arc::new(RecordingRunner::unavailable()));
    let err = gateway.verify(b"msg", b"sig").unwrap_err();
    assert!(matches!(err, GatewayError::Invocation(_)));
    assert!(fixture.staged_files().is_empty());
}

#[cfg(unix)]
#[test]
fn test_paths_with_shell_metacharacters_stay_single_arguments() {
    let fixture = Fixture::with_staging_name("it's a \"dir\"; $(id)");
    let runner = Arc::new(RecordingRunner::with_status_lines(0, [VALID_LINE]));
    fixture.gateway(runner.clone()).verify(b"msg", b"sig").unwrap();

    let invocation = runner.invocations().remove(0);
    let n = invocation.args.len();
    for path in &invocation.args[n - 2..] {
        assert_eq!(Path::new(path).parent().unwrap(), fixture.staging_dir);
    }
    assert_eq!(runner.observed_files().len(), 2);
    assert!(invocation.command_line().contains("'\\''"));
}

// =============================================================================
// Staging failures
// =============================================================================

/// Staging area that fails the nth write or every removal.
struct FlakyStaging {
    inner: DirStagingArea,
    writes: AtomicUsize,
    fail_write_at: Option<usize>,
    fail_removals: bool,
}

impl FlakyStaging {
    fn new(dir: &Path) -> Self {
        Self {
            inner: DirStagingArea::new(dir),
            writes: AtomicUsize::new(0),
            fail_write_at: None,
            fail_removals: false,
        }
    }
}

impl StagingArea for FlakyStaging {
    fn write_file(&self, name: &str, contents: &[u8]) -> io::Result<PathBuf> {
        let n = self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_write_at == Some(n) {
            return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
        }
        self.inner.write_file(name, contents)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        if self.fail_removals {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "busy"));
        }
        self.inner.remove_file(path)
    }
}

#[test]
fn test_second_staging_failure_removes_first_file() {
    let fixture = Fixture::new();
    let staging = FlakyStaging {
        fail_write_at: Some(1),
        ..FlakyStaging::new(&fixture.staging_dir)
    };
    let runner = Arc::new(RecordingRunner::with_status_lines(0, [VALID_LINE]));
    let gateway = fixture.gateway_with(runner.clone(), Arc::new(staging));

    let err = gateway.verify(b"msg", b"sig").unwrap_err();
    assert!(matches!(err, GatewayError::Staging(StagingError::Write { .. })));
    assert!(runner.invocations().is_empty());
    assert!(fixture.staged_files().is_empty());
}

#[test]
fn test_removal_failure_is_reported() {
    let fixture = Fixture::new();
    let staging = FlakyStaging {
        fail_removals: true,
        ..FlakyStaging::new(&fixture.staging_dir)
    };
    let runner = Arc::new(RecordingRunner::with_status_lines(0, ["[GNUPG:] IMPORT_OK 1 AAAA"]));
    let gateway = fixture.gateway_with(runner, Arc::new(staging));

    let err = gateway.import(b"key").unwrap_err();
    assert!(matches!(err, GatewayError::Staging(StagingError::Remove { .. })));
}

#[test]
fn test_invocation_error_wins_over_removal_failure() {
    let fixture = Fixture::new();
    let staging = FlakyStaging {
        fail_removals: true,
        ..FlakyStaging::new(&fixture.staging_dir)
    };
    let gateway = fixture.gateway_with(Arc::new(RecordingRunner::unavailable()), Arc::new(staging));
    let err = gateway.verify(b"msg", b"sig").unwrap_err();
    assert!(matches!(err, GatewayError::Invocation(_)));
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_calls_use_distinct_files() {
    let fixture = Fixture::new();
    let runner = Arc::new(RecordingRunner::with_status_lines(0, [VALID_LINE]));
    let gateway = Arc::new(fixture.gateway(runner.clone()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let gateway = Arc::clone(&gateway);
            std::thread::spawn(move || {
                let message = format!("message {}", i);
                gateway.verify(message.as_bytes(), b"sig").unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap().is_some());
    }

    assert_eq!(runner.invocations().len(), 8);
    assert_eq!(runner.observed_files().len(), 16);
    assert!(fixture.staged_files().is_empty());
}

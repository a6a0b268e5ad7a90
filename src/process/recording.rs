//! Scripted runner for tests.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use super::{Invocation, InvocationError, ProcessOutput, ProcessRunner};

/// Runner that returns canned output and records what it was asked to run.
///
/// Any argument naming an existing file is read at call time, so tests can
/// check what was staged even though the gateway deletes it afterwards.
pub struct RecordingRunner {
    outcome: Option<ProcessOutput>,
    invocations: Mutex<Vec<Invocation>>,
    observed_files: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl RecordingRunner {
    /// Runner that always returns `output`.
    pub fn new(output: ProcessOutput) -> Self {
        Self {
            outcome: Some(output),
            invocations: Mutex::new(Vec::new()),
            observed_files: Mutex::new(BTreeMap::new()),
        }
    }

    /// Runner that exits with `exit_code` after printing `lines`.
    pub fn with_status_lines<I, S>(exit_code: i32, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ProcessOutput {
            exit_code,
            lines: lines.into_iter().map(Into::into).collect(),
        })
    }

    /// Runner whose program can never be started.
    pub fn unavailable() -> Self {
        Self {
            outcome: None,
            invocations: Mutex::new(Vec::new()),
            observed_files: Mutex::new(BTreeMap::new()),
        }
    }

    /// Invocations received so far.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Contents of the file arguments seen during calls, keyed by path.
    pub fn observed_files(&self) -> BTreeMap<String, Vec<u8>> {
        self.observed_files.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutput, InvocationError> {
        if let Ok(mut invocations) = self.invocations.lock() {
            invocations.push(invocation.clone());
        }
        if let Ok(mut files) = self.observed_files.lock() {
            for arg in &invocation.args {
                if Path::new(arg).is_file() {
                    if let Ok(contents) = std::fs::read(arg) {
                        files.insert(arg.clone(), contents);
                    }
                }
            }
        }

        self.outcome.clone().ok_or_else(|| InvocationError::Spawn {
            program: invocation.program.clone(),
            source: io::Error::new(io::ErrorKind::NotFound, "program not found"),
        })
    }
}

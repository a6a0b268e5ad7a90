//! Runner that spawns real processes.

use std::process::{Command, Stdio};

use tracing::debug;

use super::{Invocation, InvocationError, ProcessOutput, ProcessRunner};

/// Spawns the program directly, without a shell.
///
/// Arguments are handed to the OS one by one, so a path containing spaces,
/// quotes or shell metacharacters still arrives as exactly one argument.
/// Standard input and standard error are bound to the null device; only
/// standard output is captured.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutput, InvocationError> {
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .map_err(|source| InvocationError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        let exit_code = output.status.code().ok_or_else(|| InvocationError::Terminated {
            program: invocation.program.clone(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(exit_code, bytes = output.stdout.len(), "process exited");
        Ok(ProcessOutput::from_stdout(exit_code, &stdout))
    }
}

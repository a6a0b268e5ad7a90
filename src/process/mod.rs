//! Process execution
//!
//! Abstracts running the signing tool so the gateway can be tested without
//! one installed. Provides:
//! - ProcessRunner trait: run one invocation, capture stdout as lines
//! - SystemRunner: spawns the real executable
//! - RecordingRunner: scripted output for tests

mod recording;
mod system;

pub use recording::RecordingRunner;
pub use system::SystemRunner;

use std::io;

use crate::quote;

/// Null device that receives the tool's diagnostics in rendered command lines.
#[cfg(windows)]
pub const NULL_SINK: &str = "NUL";

/// Null device that receives the tool's diagnostics in rendered command lines.
#[cfg(not(windows))]
pub const NULL_SINK: &str = "/dev/null";

/// A fully assembled call of an external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable name or path.
    pub program: String,
    /// Arguments in order, one entry per argument.
    pub args: Vec<String>,
}

impl Invocation {
    /// Create an invocation with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The argument string, every argument shell-quoted.
    pub fn argument_string(&self) -> String {
        quote::join(&self.args)
    }

    /// Render the invocation as one shell command line, diagnostics
    /// redirected to the platform null device.
    pub fn command_line(&self) -> String {
        let program = quote::quote(&self.program);
        if self.args.is_empty() {
            format!("{} 2>{}", program, NULL_SINK)
        } else {
            format!("{} {} 2>{}", program, self.argument_string(), NULL_SINK)
        }
    }
}

/// Captured result of a process that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code reported by the process.
    pub exit_code: i32,
    /// Standard output split into lines, terminators removed.
    pub lines: Vec<String>,
}

impl ProcessOutput {
    /// Build output from raw stdout text.
    pub fn from_stdout(exit_code: i32, stdout: &str) -> Self {
        Self {
            exit_code,
            lines: stdout.lines().map(str::to_string).collect(),
        }
    }

    /// True when the process exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// All lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Invocation errors
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} terminated without an exit code")]
    Terminated { program: String },
}

/// Runs an invocation to completion and captures its standard output.
pub trait ProcessRunner: Send + Sync {
    /// Run `invocation`, blocking until the process exits.
    ///
    /// A non-zero exit code is not an error; it is reported in
    /// [`ProcessOutput::exit_code`].
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutput, InvocationError>;
}

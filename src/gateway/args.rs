//! Command-line arguments for the signing tool.

/// Flags applied to every invocation, after `--homedir <dir>`.
///
/// Status lines go to stdout (fd 1) so they are captured with the rest of
/// the output; the tool never prompts, never touches a terminal and aborts
/// if it cannot write status.
pub const BASELINE_FLAGS: &[&str] = &[
    "--quiet",
    "--status-fd",
    "1",
    "--lock-multiple",
    "--no-permission-warning",
    "--no-greeting",
    "--exit-on-status-write-error",
    "--batch",
    "--no-tty",
];

/// Arguments shared by every invocation.
pub fn baseline(home_dir: &str) -> Vec<String> {
    let mut args = vec!["--homedir".to_string(), home_dir.to_string()];
    args.extend(BASELINE_FLAGS.iter().map(|flag| flag.to_string()));
    args
}

/// Operation arguments for importing the key file at `key_path`.
///
/// `--` ends option parsing so a path starting with `-` stays an operand.
pub fn import(key_path: &str) -> Vec<String> {
    vec!["--import".to_string(), "--".to_string(), key_path.to_string()]
}

/// Operation arguments for checking a detached signature.
///
/// The signature file must come before the signed data file; both follow
/// `--`.
pub fn verify(signature_path: &str, message_path: &str) -> Vec<String> {
    vec![
        "--verify".to_string(),
        "--".to_string(),
        signature_path.to_string(),
        message_path.to_string(),
    ]
}

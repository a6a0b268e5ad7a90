//! Shell quoting for rendered command lines.
//!
//! Invocations never go through a shell, but the rendered command line is
//! logged and must be safe to paste back into one. Every argument that
//! could be read as shell syntax is quoted so it stays a single word.

use std::borrow::Cow;

/// Characters that never need quoting on either platform.
fn is_plain(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '=' | ',' | '+' | '@')
}

/// Quote one argument for a POSIX shell.
///
/// Unsafe arguments are wrapped in single quotes; embedded single quotes
/// become `'\''`.
pub fn quote_posix(arg: &str) -> Cow<'_, str> {
    if !arg.is_empty() && arg.chars().all(is_plain) {
        return Cow::Borrowed(arg);
    }
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('\'');
    for c in arg.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    Cow::Owned(quoted)
}

/// Quote one argument using Windows command-line rules.
///
/// Unsafe arguments are wrapped in double quotes. Backslashes are doubled
/// when they precede a quote or the closing quote, and quotes are escaped.
pub fn quote_windows(arg: &str) -> Cow<'_, str> {
    if !arg.is_empty() && arg.chars().all(|c| is_plain(c) || c == '\\') {
        return Cow::Borrowed(arg);
    }
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    let mut backslashes = 0usize;
    for c in arg.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                quoted.extend(std::iter::repeat('\\').take(backslashes * 2 + 1));
                quoted.push('"');
                backslashes = 0;
            }
            _ => {
                quoted.extend(std::iter::repeat('\\').take(backslashes));
                quoted.push(c);
                backslashes = 0;
            }
        }
    }
    quoted.extend(std::iter::repeat('\\').take(backslashes * 2));
    quoted.push('"');
    Cow::Owned(quoted)
}

/// Quote one argument for the host platform's shell.
pub fn quote(arg: &str) -> Cow<'_, str> {
    if cfg!(windows) {
        quote_windows(arg)
    } else {
        quote_posix(arg)
    }
}

/// Quote and join arguments with single spaces.
pub fn join<I, S>(args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map(|arg| quote(arg.as_ref()).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

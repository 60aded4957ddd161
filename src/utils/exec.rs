//! Blocking external command execution.
//!
//! For one-shot commands whose whole output is wanted at once, such as the
//! renderer metadata query. Streaming, cancellable invocations live in
//! `renderer::process`.
//!
//! ```ignore
//! let output = Cmd::from_slice(&config.command).args(&config.info_args).run()?;
//! ```

use anyhow::{Context, Result};
use regex::Regex;
use std::{
    borrow::Cow,
    ffi::{OsStr, OsString},
    process::{Command, Output, Stdio},
    sync::OnceLock,
};

/// Command builder for external process execution.
#[derive(Debug, Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
}

impl Cmd {
    /// Split a configured command line (`["perl", "chordpro.pl"]`) into
    /// program and leading arguments.
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut words = cmd.iter().map(|s| s.as_ref().to_owned());
        Self {
            program: words.next().unwrap_or_default(),
            args: words.collect(),
        }
    }

    /// Append arguments, skipping empty ones.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|arg| arg.as_ref().to_owned())
                .filter(|arg| !arg.is_empty()),
        );
        self
    }

    /// Run to completion with stdin closed, failing on a nonzero exit status.
    pub fn run(self) -> Result<Output> {
        let name = self.program.to_string_lossy().into_owned();

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("Failed to run `{name}`"))?;

        if !output.status.success() {
            anyhow::bail!(failure_message(&name, &output));
        }
        Ok(output)
    }
}

/// Strip ANSI color codes.
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());
    re.replace_all(s, "")
}

/// `` `name` failed with <status> `` followed by the cleaned stderr.
fn failure_message(name: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = strip_ansi(stderr.trim());

    let mut msg = format!("`{name}` failed with {}", output.status);
    if !stderr.is_empty() {
        msg.push('\n');
        msg.push_str(&stderr);
    }
    msg
}

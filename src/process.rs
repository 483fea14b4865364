//! Thin wrapper around [`std::process::Command`] for running host tools.
//!
//! ```rust,ignore
//! use rawimg2iso::process::Cmd;
//!
//! let result = Cmd::new("mkisofs")
//!     .arg("-o")
//!     .arg_path(output)
//!     .error_msg("mkisofs failed")
//!     .run()?;
//! ```

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::{Command, ExitStatus};

use tracing::debug;

use crate::error::{Error, Result};

/// Captured result of a finished command.
#[derive(Debug)]
pub struct CommandResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Builder for an external command.
#[derive(Debug)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    error_msg: Option<String>,
}

impl Cmd {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            error_msg: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn arg_path(self, path: &Path) -> Self {
        self.arg(path.as_os_str())
    }

    /// Message prefixed to the error when the command fails.
    pub fn error_msg(mut self, msg: impl Into<String>) -> Self {
        self.error_msg = Some(msg.into());
        self
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Run to completion, capturing stdout and stderr.
    ///
    /// A non-zero exit becomes [`Error::ExternalTool`]; failing to spawn
    /// becomes [`Error::Launch`].
    pub fn run(self) -> Result<CommandResult> {
        let program = self.program.to_string_lossy().into_owned();
        let context = self
            .error_msg
            .unwrap_or_else(|| format!("{program} failed"));

        debug!("running {} {:?}", program, self.args);
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|source| Error::Launch {
                context: context.clone(),
                program: program.clone(),
                source,
            })?;

        let result = CommandResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.success() {
            return Err(Error::ExternalTool {
                context,
                program,
                status: result.status,
                stderr: result.stderr,
            });
        }

        Ok(result)
    }
}

//! Error kinds for the conversion pipeline.
//!
//! Every failure the pipeline can hit maps to one variant here. All of them
//! are fatal except [`Error::Cleanup`], which the pipeline records in its
//! report and logs instead of returning.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad command line: wrong argument count, wrong suffix, colliding paths.
    #[error("{0}")]
    Argument(String),

    #[error("failed to decompress '{}'", path.display())]
    Decompression {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "{} not found in PATH. Install one of them and try again ({})",
        candidates.join(" or "),
        packages.join(", ")
    )]
    ToolNotFound {
        candidates: Vec<String>,
        packages: Vec<String>,
    },

    #[error("mastering tool '{tool}' given with --tool was not found or is not executable")]
    ToolOverrideNotFound { tool: String },

    #[error("{context}: {program} exited with {status}{}", stderr_suffix(stderr))]
    ExternalTool {
        context: String,
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{context}: could not start {program}")]
    Launch {
        context: String,
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove temporary file '{}'", path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn argument(msg: impl Into<String>) -> Self {
        Error::Argument(msg.into())
    }

    pub(crate) fn decompression(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Decompression {
            path: path.into(),
            source,
        }
    }

    /// Whether this error aborts the run. Cleanup failures do not.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Cleanup { .. })
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        if self.is_fatal() {
            1
        } else {
            0
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n{trimmed}")
    }
}

//! ISO 9660 image creation.
//!
//! Wraps `mkisofs`-compatible tools (`mkisofs`, `genisoimage`). The raw
//! image is handed to the tool as the only input file.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::Result;
use crate::process::Cmd;

/// Filename charset passed to the tool unless overridden.
pub const DEFAULT_INPUT_CHARSET: &str = "utf-8";

/// Options for building an ISO image.
#[derive(Debug, Clone)]
pub struct IsoOptions<'a> {
    /// Charset for `-input-charset`.
    ///
    /// Default: "utf-8"
    pub input_charset: &'a str,
}

impl Default for IsoOptions<'_> {
    fn default() -> Self {
        Self {
            input_charset: DEFAULT_INPUT_CHARSET,
        }
    }
}

/// Build the tool invocation without running it.
pub fn mastering_command(
    tool: &Path,
    raw_image: &Path,
    output: &Path,
    options: &IsoOptions,
) -> Cmd {
    Cmd::new(tool)
        .arg("-o")
        .arg_path(output)
        .args(["-input-charset", options.input_charset])
        .arg_path(raw_image)
        .error_msg(format!(
            "converting {} to {}",
            raw_image.display(),
            output.display()
        ))
}

/// Build an ISO image from a raw disk image.
///
/// If the tool fails, any output file it left behind is removed before the
/// error is returned.
///
/// # Example
///
/// ```rust,ignore
/// use rawimg2iso::artifact::iso::{build_iso, IsoOptions};
/// use std::path::Path;
///
/// build_iso(
///     Path::new("/usr/bin/mkisofs"),
///     Path::new("disk.raw"),
///     Path::new("disk.iso"),
///     &IsoOptions::default(),
/// )?;
/// ```
pub fn build_iso(tool: &Path, raw_image: &Path, output: &Path, options: &IsoOptions) -> Result<()> {
    match mastering_command(tool, raw_image, output, options).run() {
        Ok(result) => {
            for line in result.stdout.lines().chain(result.stderr.lines()) {
                debug!("{}: {}", tool.display(), line);
            }
            Ok(())
        }
        Err(e) => {
            discard_partial_output(output);
            Err(e)
        }
    }
}

fn discard_partial_output(output: &Path) {
    if !output.exists() {
        return;
    }
    match fs::remove_file(output) {
        Ok(()) => debug!("removed partial output {}", output.display()),
        Err(e) => warn!(
            "could not remove partial output {}: {}",
            output.display(),
            e
        ),
    }
}

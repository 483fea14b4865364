use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Required suffix on the input archive name.
pub const INPUT_SUFFIX: &str = ".raw.xz";

/// Suffix stripped from the input name to get the intermediate name.
pub const COMPRESSION_SUFFIX: &str = ".xz";

/// Validated paths for one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPaths {
    pub input: PathBuf,
    pub intermediate: PathBuf,
    pub output: PathBuf,
}

impl ConversionPaths {
    /// Validate the input name and derive the intermediate raw image path.
    ///
    /// The intermediate lives next to the input: `dir/disk.raw.xz` becomes
    /// `dir/disk.raw`.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Result<Self> {
        let input = input.into();
        let output = output.into();

        if !has_input_suffix(&input) {
            return Err(Error::argument(format!(
                "input file must have a {INPUT_SUFFIX} extension: {}",
                input.display()
            )));
        }
        let intermediate = intermediate_path(&input)?;

        let target = file_identity(&output);
        if target == file_identity(&intermediate) || target == file_identity(&input) {
            return Err(Error::argument(format!(
                "output {} would overwrite the image being converted",
                output.display()
            )));
        }

        Ok(Self {
            input,
            intermediate,
            output,
        })
    }
}

/// Resolve `path` to the file it names, following `..` and symlinks.
///
/// Paths that do not exist yet are resolved through their parent directory.
/// Falls back to the path as written when neither can be resolved.
fn file_identity(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

/// Case-sensitive check for [`INPUT_SUFFIX`] on the file name.
pub fn has_input_suffix(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(INPUT_SUFFIX))
}

/// Strip the trailing [`COMPRESSION_SUFFIX`] from the file name.
///
/// Only the final suffix is removed; `.xz` elsewhere in the path is kept.
pub fn intermediate_path(input: &Path) -> Result<PathBuf> {
    let stripped = input
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_suffix(COMPRESSION_SUFFIX))
        .ok_or_else(|| {
            Error::argument(format!(
                "cannot derive raw image name: {} does not end in {COMPRESSION_SUFFIX}",
                input.display()
            ))
        })?;
    Ok(input.with_file_name(stripped))
}

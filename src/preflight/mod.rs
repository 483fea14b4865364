//! Preflight checks for the mastering tool.
//!
//! Resolves the ISO-mastering executable before anything is written to
//! disk, so a host without the tool fails fast and leaves no files behind.
//!
//! # Example
//!
//! ```rust,no_run
//! use rawimg2iso::preflight::{find_mastering_tool, MASTERING_TOOLS};
//!
//! match find_mastering_tool(MASTERING_TOOLS) {
//!     Ok(tool) => println!("using {}", tool.path.display()),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Error, Result};

/// Known ISO-mastering tools in order of preference.
///
/// Each tuple is (command_name, package_name).
pub const MASTERING_TOOLS: &[(&str, &str)] = &[
    ("mkisofs", "cdrtools"),
    ("genisoimage", "genisoimage"),
];

/// A mastering tool resolved to an executable path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasteringTool {
    pub name: String,
    pub path: PathBuf,
}

/// Find the first available tool from `candidates` on `PATH`.
pub fn find_mastering_tool(candidates: &[(&str, &str)]) -> Result<MasteringTool> {
    find_mastering_tool_in(candidates, env::var_os("PATH"))
}

/// Find the first available tool from `candidates` on an explicit search path.
pub fn find_mastering_tool_in<P: AsRef<OsStr>>(
    candidates: &[(&str, &str)],
    search_path: Option<P>,
) -> Result<MasteringTool> {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let search_path = search_path.map(|p| p.as_ref().to_os_string());

    for (tool, _package) in candidates {
        match which::which_in(tool, search_path.as_ref(), &cwd) {
            Ok(path) => {
                debug!("found {} at {}", tool, path.display());
                return Ok(MasteringTool {
                    name: (*tool).to_string(),
                    path,
                });
            }
            Err(e) => debug!("{} not usable: {}", tool, e),
        }
    }

    Err(Error::ToolNotFound {
        candidates: candidates.iter().map(|(t, _)| (*t).to_string()).collect(),
        packages: candidates.iter().map(|(_, p)| (*p).to_string()).collect(),
    })
}

/// Resolve a user-supplied tool name or path.
///
/// Bare names are searched on `PATH`; anything with a path separator is
/// checked relative to the current directory.
pub fn resolve_tool_override(tool: &OsStr) -> Result<MasteringTool> {
    let name = tool.to_string_lossy().into_owned();
    match which::which(tool) {
        Ok(path) => {
            debug!("using mastering tool override {}", path.display());
            Ok(MasteringTool { name, path })
        }
        Err(_) => Err(Error::ToolOverrideNotFound { tool: name }),
    }
}

/// Resolve the mastering tool for a run: the override if given, otherwise
/// the first of [`MASTERING_TOOLS`] found on `PATH`.
pub fn resolve_mastering_tool(tool_override: Option<&OsString>) -> Result<MasteringTool> {
    match tool_override {
        Some(tool) => resolve_tool_override(tool),
        None => find_mastering_tool(MASTERING_TOOLS),
    }
}

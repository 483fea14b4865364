//! The conversion pipeline.
//!
//! ```text
//! Validate → Preflight → Decompress → Convert → Cleanup → Done
//!     │          │           │           │
//!     └──────────┴───────────┴───────────┴──→ Err (exit 1)
//! ```
//!
//! Cleanup failures do not fail the run; they are logged and returned in
//! [`ConversionReport::cleanup_error`].

pub mod paths;
pub mod scratch;

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, info_span, warn};

use crate::artifact::iso::{build_iso, IsoOptions, DEFAULT_INPUT_CHARSET};
use crate::artifact::raw::decompress_xz;
use crate::error::{Error, Result};
use crate::preflight::{resolve_mastering_tool, MasteringTool};

pub use paths::ConversionPaths;
pub use scratch::ScratchFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    Preflight,
    Decompress,
    Convert,
    Cleanup,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Validate => "validate",
            Stage::Preflight => "preflight",
            Stage::Decompress => "decompress",
            Stage::Convert => "convert",
            Stage::Cleanup => "cleanup",
            Stage::Done => "done",
        })
    }
}

/// Run configuration.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Mastering tool name or path. `None` searches for the known tools.
    pub tool: Option<OsString>,
    pub input_charset: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            tool: None,
            input_charset: DEFAULT_INPUT_CHARSET.to_string(),
        }
    }
}

/// Outcome of a successful conversion.
#[derive(Debug)]
pub struct ConversionReport {
    pub raw_bytes: u64,
    pub tool: MasteringTool,
    pub iso: PathBuf,
    /// Set when the intermediate file could not be removed.
    pub cleanup_error: Option<Error>,
}

/// Validate the command line paths and run the conversion.
pub fn convert(input: &Path, output: &Path, options: &ConvertOptions) -> Result<ConversionReport> {
    let paths = in_stage(Stage::Validate, || ConversionPaths::new(input, output))?;
    run(&paths, options)
}

/// Run the conversion for already validated paths.
pub fn run(paths: &ConversionPaths, options: &ConvertOptions) -> Result<ConversionReport> {
    let tool = in_stage(Stage::Preflight, || {
        resolve_mastering_tool(options.tool.as_ref())
    })?;
    debug!("mastering tool: {} ({})", tool.name, tool.path.display());

    let raw_bytes = in_stage(Stage::Decompress, || {
        decompress_xz(&paths.input, &paths.intermediate)
    })?;
    let scratch = ScratchFile::adopt(&paths.intermediate);
    info!(
        "Decompressed {} to {} ({} bytes)",
        paths.input.display(),
        paths.intermediate.display(),
        raw_bytes
    );

    in_stage(Stage::Convert, || {
        let iso_options = IsoOptions {
            input_charset: &options.input_charset,
        };
        build_iso(&tool.path, scratch.path(), &paths.output, &iso_options)
    })?;
    info!(
        "Converted {} to {}",
        paths.intermediate.display(),
        paths.output.display()
    );

    let cleanup_error = in_stage(Stage::Cleanup, || match scratch.remove() {
        Ok(()) => {
            info!("Cleaned up temporary file: {}", paths.intermediate.display());
            None
        }
        Err(e) => {
            warn!("{}", e);
            Some(e)
        }
    });

    debug!(stage = %Stage::Done, "conversion finished");
    Ok(ConversionReport {
        raw_bytes,
        tool,
        iso: paths.output.clone(),
        cleanup_error,
    })
}

fn in_stage<T>(stage: Stage, f: impl FnOnce() -> T) -> T {
    let _span = info_span!("stage", name = %stage).entered();
    f()
}


#[cfg(all(test, unix))]
mod tool_tests {
    use super::*;
    use liblzma::write::XzEncoder;
    use std::fs;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
        input: PathBuf,
        output: PathBuf,
    }

    impl Fixture {
        fn new(payload: &[u8]) -> Self {
            let temp = TempDir::new().unwrap();
            let input = temp.path().join("disk.raw.xz");
            let output = temp.path().join("out.iso");
            let mut encoder = XzEncoder::new(Vec::new(), 6);
            encoder.write_all(payload).unwrap();
            fs::write(&input, encoder.finish().unwrap()).unwrap();
            Self {
                temp,
                input,
                output,
            }
        }

        fn raw(&self) -> PathBuf {
            self.temp.path().join("disk.raw")
        }

        fn tool(&self, body: &str) -> ConvertOptions {
            let bin = self.temp.path().join("bin");
            fs::create_dir_all(&bin).unwrap();
            let path = bin.join("mkisofs");
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            ConvertOptions {
                tool: Some(path.into_os_string()),
                ..Default::default()
            }
        }
    }

    #[test]
    fn test_end_to_end_conversion() {
        let fx = Fixture::new(&[0u8; 1024]);
        // Records argv and the size of the raw image it was given.
        let options = fx.tool(r#"{ printf '%s\n' "$@"; wc -c < "$5"; } > "$2""#);

        let report = convert(&fx.input, &fx.output, &options).unwrap();

        assert_eq!(report.raw_bytes, 1024);
        assert!(report.cleanup_error.is_none());
        assert_eq!(report.iso, fx.output);
        let recorded = fs::read_to_string(&fx.output).unwrap();
        let lines: Vec<&str> = recorded.lines().collect();
        assert_eq!(lines[0], "-o");
        assert_eq!(lines[1], fx.output.to_str().unwrap());
        assert_eq!(lines[2], "-input-charset");
        assert_eq!(lines[3], "utf-8");
        assert_eq!(lines[4], fx.raw().to_str().unwrap());
        assert_eq!(lines[5].trim(), "1024");
        assert!(!fx.raw().exists());
    }

    #[test]
    fn test_missing_tool_creates_nothing() {
        let fx = Fixture::new(b"raw bytes");
        let options = ConvertOptions {
            tool: Some(fx.temp.path().join("no-such-mkisofs").into_os_string()),
            ..Default::default()
        };

        let err = convert(&fx.input, &fx.output, &options).unwrap_err();

        assert!(matches!(err, Error::ToolOverrideNotFound { .. }));
        assert!(!fx.raw().exists());
        assert!(!fx.output.exists());
    }

    #[test]
    fn test_tool_failure_cleans_up() {
        let fx = Fixture::new(b"raw bytes");
        let options = fx.tool(r#"echo junk > "$2"; echo "mkisofs: broken" >&2; exit 1"#);

        let err = convert(&fx.input, &fx.output, &options).unwrap_err();

        assert!(matches!(err, Error::ExternalTool { .. }));
        assert!(err.to_string().contains("mkisofs: broken"));
        assert!(!fx.raw().exists());
        assert!(!fx.output.exists());
    }

    #[test]
    fn test_corrupt_archive_stops_before_tool() {
        let fx = Fixture::new(b"");
        fs::write(&fx.input, b"not xz at all").unwrap();
        let options = fx.tool(r#"touch "$2""#);

        let err = convert(&fx.input, &fx.output, &options).unwrap_err();

        assert!(matches!(err, Error::Decompression { .. }));
        assert!(!fx.raw().exists());
        assert!(!fx.output.exists());
    }

    #[test]
    fn test_output_aliasing_intermediate_is_rejected() {
        let fx = Fixture::new(b"raw bytes");
        fs::create_dir(fx.temp.path().join("sub")).unwrap();
        let options = fx.tool(r#"echo iso > "$2""#);
        let aliased = fx.temp.path().join("sub/../disk.raw");

        let err = convert(&fx.input, &aliased, &options).unwrap_err();

        assert!(matches!(err, Error::Argument(_)));
        assert!(!fx.raw().exists());
    }

    #[test]
    fn test_cleanup_failure_is_not_fatal() {
        let fx = Fixture::new(b"raw bytes");
        // Replacing the intermediate with a non-empty directory makes
        // remove_file fail after a successful conversion.
        let options = fx.tool(
            r#"touch "$2"; rm -f "$5"; mkdir "$5"; touch "$5/held""#,
        );

        let report = convert(&fx.input, &fx.output, &options).unwrap();

        assert!(matches!(report.cleanup_error, Some(Error::Cleanup { .. })));
        assert!(fx.output.exists());
    }
}

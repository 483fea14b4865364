//! Convert xz-compressed raw disk images into ISO 9660 images.
//!
//! The conversion is a short linear pipeline:
//!
//! - **Validation** - the input must be named `*.raw.xz`
//! - **Preflight** - an ISO-mastering tool (`mkisofs` or `genisoimage`) must be on `PATH`
//! - **Decompression** - the archive is streamed to `*.raw` next to the input
//! - **Conversion** - the mastering tool turns the raw image into the output ISO
//! - **Cleanup** - the intermediate raw image is removed
//!
//! # Architecture
//!
//! ```text
//! bin/rawimg2iso (CLI, logging, exit codes)
//!     │
//!     └── pipeline::convert
//!             ├── pipeline::paths      input validation, intermediate name
//!             ├── preflight            tool resolution via `which`
//!             ├── artifact::raw        xz decoding
//!             ├── artifact::iso        mastering tool invocation (process::Cmd)
//!             └── pipeline::scratch    intermediate file ownership
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use rawimg2iso::{convert, ConvertOptions};
//! use std::path::Path;
//!
//! let report = convert(
//!     Path::new("disk.raw.xz"),
//!     Path::new("disk.iso"),
//!     &ConvertOptions::default(),
//! )?;
//! println!("wrote {}", report.iso.display());
//! # Ok::<(), rawimg2iso::Error>(())
//! ```

pub mod artifact;
pub mod error;
pub mod pipeline;
pub mod preflight;
pub mod process;

pub use error::{Error, Result};
pub use pipeline::{convert, ConversionPaths, ConversionReport, ConvertOptions, Stage};
pub use preflight::{MasteringTool, MASTERING_TOOLS};

//! Artifact builders.
//!
//! - [`raw`] - Raw disk image extraction from xz archives
//! - [`iso`] - ISO 9660 images via `mkisofs`/`genisoimage`

pub mod iso;
pub mod raw;

//! Raw disk image extraction from `.raw.xz` archives.
//!
//! The archive is decoded as a stream into a temporary file next to the
//! destination, which is renamed into place only after the last byte is
//! written. A corrupt or truncated archive never leaves a partial raw image.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use liblzma::read::XzDecoder;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Error, Result};

const IO_BUFFER_SIZE: usize = 4 * 1024 * 1024;

/// Decompress an xz archive to `output`, overwriting it if present.
///
/// Concatenated xz streams are decoded back to back. Returns the number of
/// decompressed bytes written.
///
/// # Example
///
/// ```rust,ignore
/// use rawimg2iso::artifact::raw::decompress_xz;
/// use std::path::Path;
///
/// let bytes = decompress_xz(Path::new("disk.raw.xz"), Path::new("disk.raw"))?;
/// ```
pub fn decompress_xz(input: &Path, output: &Path) -> Result<u64> {
    let file = File::open(input).map_err(|e| Error::decompression(input, e))?;
    let reader = BufReader::with_capacity(IO_BUFFER_SIZE, file);
    let mut decoder = XzDecoder::new_multi_decoder(reader);

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".rawimg2iso-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|e| Error::decompression(input, e))?;

    let written =
        stream_into(&mut decoder, &mut tmp).map_err(|e| Error::decompression(input, e))?;

    debug!(
        "persisting {} -> {}",
        tmp.path().display(),
        output.display()
    );
    tmp.persist(output)
        .map_err(|e| Error::decompression(input, e.error))?;

    Ok(written)
}

fn stream_into<R: io::Read>(reader: &mut R, tmp: &mut NamedTempFile) -> io::Result<u64> {
    let mut writer = BufWriter::with_capacity(IO_BUFFER_SIZE, tmp.as_file_mut());
    let written = io::copy(reader, &mut writer)?;
    writer.flush()?;
    drop(writer);
    tmp.as_file().sync_all()?;
    Ok(written)
}

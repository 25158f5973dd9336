//! Text line sink.
//!
//! Writes converted lines, in order, to exactly one output file. Each line is
//! followed by `\n`; the encoders never add a separator themselves. The output
//! is compressed when the path carries a known compression extension.

pub mod compression;

use anyhow::{Context, Result};
use compression::{OutputWriter, auto_detect_writer};
use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::Path;

/// Write `lines` to `path`, one per line, creating parent directories.
///
/// # Returns
/// The number of lines written.
///
/// # Errors
/// Returns an error if the file/dirs cannot be created or any write fails.
pub fn write_lines<S: AsRef<str>>(path: impl AsRef<Path>, lines: &[S]) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = auto_detect_writer(f, path)
        .with_context(|| format!("setup compression for {}", path.display()))?;
    for (i, line) in lines.iter().enumerate() {
        w.write_all(line.as_ref().as_bytes())
            .and_then(|()| w.write_all(b"\n"))
            .with_context(|| format!("write line #{} to {}", i + 1, path.display()))?;
    }
    w.finish()
        .with_context(|| format!("finish {}", path.display()))?;
    Ok(lines.len())
}

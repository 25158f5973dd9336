//! Output compression chosen by file extension.
//!
//! When enabled via feature flags, the following codecs are available:
//! - **Gzip** (`.gz`) - via `flate2` (feature: `compression-gzip`)
//! - **Zstd** (`.zst`) - via `zstd` (feature: `compression-zstd`)
//! - **Bzip2** (`.bz2`) - via `bzip2` (feature: `compression-bzip2`)
//! - **Xz** (`.xz`) - via `xz2` (feature: `compression-xz`)
//!
//! Paths without a known extension are written as plain buffered text.

use anyhow::{Context, Result};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// A writer whose stream must be finished explicitly.
///
/// Compressed streams end with a trailer that `flush` does not write, and the
/// encoders' `Drop` impls swallow errors. `finish` writes the trailer and
/// flushes every layer, reporting the first failure.
pub trait OutputWriter: Write {
    fn finish(self: Box<Self>) -> io::Result<()>;
}

impl<W: Write> OutputWriter for BufWriter<W> {
    fn finish(mut self: Box<Self>) -> io::Result<()> {
        self.flush()
    }
}

/// A compression algorithm the sink can wrap its output file with.
pub trait CompressionCodec: Send + Sync {
    /// Human-readable codec name (e.g., "gzip", "zstd").
    fn name(&self) -> &str;

    /// Lowercase file extensions, with the leading dot.
    fn extensions(&self) -> &[&str];

    /// Wrap a writer with compression. The stream is complete only after
    /// [`OutputWriter::finish`].
    fn wrap_writer(&self, writer: Box<dyn Write>) -> io::Result<Box<dyn OutputWriter>>;
}

/// Built-in codecs enabled in this build.
pub fn codecs() -> Vec<Box<dyn CompressionCodec>> {
    vec![
        #[cfg(feature = "compression-gzip")]
        Box::new(GzipCodec),
        #[cfg(feature = "compression-zstd")]
        Box::new(ZstdCodec),
        #[cfg(feature = "compression-bzip2")]
        Box::new(Bzip2Codec),
        #[cfg(feature = "compression-xz")]
        Box::new(XzCodec),
    ]
}

/// Codec matching the path's extension, case-insensitively.
pub fn detect_from_extension(path: impl AsRef<Path>) -> Option<Box<dyn CompressionCodec>> {
    let lower = path.as_ref().to_string_lossy().to_lowercase();
    codecs()
        .into_iter()
        .find(|codec| codec.extensions().iter().any(|ext| lower.ends_with(ext)))
}

/// Wrap `writer` with the codec implied by `path_hint`, or just buffer it.
pub fn auto_detect_writer<W: Write + 'static>(
    writer: W,
    path_hint: impl AsRef<Path>,
) -> Result<Box<dyn OutputWriter>> {
    if let Some(codec) = detect_from_extension(&path_hint) {
        return codec
            .wrap_writer(Box::new(BufWriter::new(writer)))
            .with_context(|| format!("wrap writer with {} codec", codec.name()));
    }
    Ok(Box::new(BufWriter::new(writer)))
}

#[cfg(feature = "compression-gzip")]
struct GzipCodec;

#[cfg(feature = "compression-gzip")]
impl CompressionCodec for GzipCodec {
    fn name(&self) -> &str {
        "gzip"
    }

    fn extensions(&self) -> &[&str] {
        &[".gz", ".gzip"]
    }

    fn wrap_writer(&self, writer: Box<dyn Write>) -> io::Result<Box<dyn OutputWriter>> {
        use flate2::Compression;
        use flate2::write::GzEncoder;
        Ok(Box::new(GzEncoder::new(writer, Compression::default())))
    }
}

#[cfg(feature = "compression-gzip")]
impl<W: Write> OutputWriter for flate2::write::GzEncoder<W> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        flate2::write::GzEncoder::finish(*self)?.flush()
    }
}

#[cfg(feature = "compression-zstd")]
struct ZstdCodec;

#[cfg(feature = "compression-zstd")]
impl CompressionCodec for ZstdCodec {
    fn name(&self) -> &str {
        "zstd"
    }

    fn extensions(&self) -> &[&str] {
        &[".zst", ".zstd"]
    }

    fn wrap_writer(&self, writer: Box<dyn Write>) -> io::Result<Box<dyn OutputWriter>> {
        zstd::stream::write::Encoder::new(writer, 3).map(|e| Box::new(e) as Box<dyn OutputWriter>)
    }
}

#[cfg(feature = "compression-zstd")]
impl<W: Write> OutputWriter for zstd::stream::write::Encoder<'static, W> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        zstd::stream::write::Encoder::finish(*self)?.flush()
    }
}

#[cfg(feature = "compression-bzip2")]
struct Bzip2Codec;

#[cfg(feature = "compression-bzip2")]
impl CompressionCodec for Bzip2Codec {
    fn name(&self) -> &str {
        "bzip2"
    }

    fn extensions(&self) -> &[&str] {
        &[".bz2", ".bzip2"]
    }

    fn wrap_writer(&self, writer: Box<dyn Write>) -> io::Result<Box<dyn OutputWriter>> {
        use bzip2::Compression;
        use bzip2::write::BzEncoder;
        Ok(Box::new(BzEncoder::new(writer, Compression::default())))
    }
}

#[cfg(feature = "compression-bzip2")]
impl<W: Write> OutputWriter for bzip2::write::BzEncoder<W> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        bzip2::write::BzEncoder::finish(*self)?.flush()
    }
}

#[cfg(feature = "compression-xz")]
struct XzCodec;

#[cfg(feature = "compression-xz")]
impl CompressionCodec for XzCodec {
    fn name(&self) -> &str {
        "xz"
    }

    fn extensions(&self) -> &[&str] {
        &[".xz"]
    }

    fn wrap_writer(&self, writer: Box<dyn Write>) -> io::Result<Box<dyn OutputWriter>> {
        use xz2::write::XzEncoder;
        Ok(Box::new(XzEncoder::new(writer, 6)))
    }
}

#[cfg(feature = "compression-xz")]
impl<W: Write> OutputWriter for xz2::write::XzEncoder<W> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        xz2::write::XzEncoder::finish(*self)?.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts nothing.
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn finish_reports_write_failures() {
        for codec in codecs() {
            let mut w = codec.wrap_writer(Box::new(FullDisk)).unwrap();
            let failed = w.write_all(b"row\n").is_err() || w.finish().is_err();
            assert!(failed, "{} swallowed a write error", codec.name());
        }
        let mut w: Box<dyn OutputWriter> = Box::new(BufWriter::new(FullDisk));
        w.write_all(b"row\n").unwrap();
        assert!(w.finish().is_err());
    }

    #[test]
    fn plain_paths_have_no_codec() {
        assert!(detect_from_extension("out/rows.csv").is_none());
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn detects_gzip_case_insensitively() {
        let codec = detect_from_extension("out/ROWS.CSV.GZ").unwrap();
        assert_eq!(codec.name(), "gzip");
    }

    #[cfg(feature = "compression-zstd")]
    #[test]
    fn detects_zstd() {
        assert_eq!(detect_from_extension("rows.jsonl.zst").unwrap().name(), "zstd");
    }
}

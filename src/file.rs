//! File-level compression and decompression.
//!
//! `notes.txt` compresses to `<out_dir>/notes.hzip` with `.txt` recorded in the
//! header; decompressing that container writes `<out_dir>/notes.txt`.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::info;

use crate::codec::{self, ContainerHeader};
use crate::config::CodecConfig;
use crate::error::{Error, Result};

/// Sizes, paths and timing of one file operation.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub input_size: u64,
    pub output_size: u64,
    pub elapsed: Duration,
}

impl FileReport {
    /// Output size as a percentage of the input size, 0 for an empty input.
    pub fn ratio(&self) -> f64 {
        if self.input_size == 0 {
            return 0.0;
        }
        self.output_size as f64 / self.input_size as f64 * 100.0
    }
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| Error::InvalidInput(format!("{} has no file name", path.display())))
}

/// Compresses `src` into `out_dir`, naming the container after the source stem.
pub fn compress_file(config: &CodecConfig, src: &Path, out_dir: &Path) -> Result<FileReport> {
    let start = Instant::now();
    let extension = src
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let output = out_dir.join(format!("{}{}", file_stem(src)?, config.suffix()));

    let mut input = BufReader::with_capacity(config.chunk_size(), File::open(src)?);
    let summary = write_atomically(&output, |writer| {
        codec::compress(config, &mut input, &extension, writer)
    })?;

    let report = FileReport {
        input: src.to_path_buf(),
        output,
        input_size: summary.original_size,
        output_size: summary.compressed_size,
        elapsed: start.elapsed(),
    };
    info!(
        "compressed {} -> {} ({} -> {} bytes)",
        report.input.display(),
        report.output.display(),
        report.input_size,
        report.output_size
    );
    Ok(report)
}

/// Restores the file stored in container `src` into `out_dir`.
///
/// Nothing is written unless the whole container decodes successfully.
pub fn decompress_file(config: &CodecConfig, src: &Path, out_dir: &Path) -> Result<FileReport> {
    let start = Instant::now();
    let name = src
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| Error::InvalidInput(format!("{} has no file name", src.display())))?;
    let base = match name.strip_suffix(config.suffix()) {
        Some(base) if !base.is_empty() => base.to_string(),
        _ => file_stem(src)?,
    };

    let container = fs::read(src)?;
    let header = ContainerHeader::read_from(&mut Cursor::new(&container))?;
    let output = out_dir.join(format!("{}{}", base, header.extension));
    let info = write_atomically(&output, |writer| {
        codec::decompress(&mut Cursor::new(&container), writer)
    })?;

    let report = FileReport {
        input: src.to_path_buf(),
        output,
        input_size: container.len() as u64,
        output_size: info.original_size,
        elapsed: start.elapsed(),
    };
    info!(
        "decompressed {} -> {} ({} -> {} bytes)",
        report.input.display(),
        report.output.display(),
        report.input_size,
        report.output_size
    );
    Ok(report)
}

/// Runs `f` against a temporary sibling of `path` and moves it into place only
/// if `f` succeeds.
fn write_atomically<T, F>(path: &Path, f: F) -> Result<T>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<T>,
{
    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    let result = File::create(&part)
        .map_err(Error::from)
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            let value = f(&mut writer)?;
            writer.flush()?;
            Ok(value)
        })
        .and_then(|value| {
            fs::rename(&part, path)?;
            Ok(value)
        });

    if result.is_err() {
        let _ = fs::remove_file(&part);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "hzip-test-{}-{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = scratch_dir();
        let src = dir.join("notes.txt");
        let text = b"file level round trip for the hzip container format\n".repeat(20);
        fs::write(&src, &text).unwrap();

        let out = dir.join("out");
        fs::create_dir_all(&out).unwrap();
        let config = CodecConfig::default();

        let packed = compress_file(&config, &src, &out).unwrap();
        assert_eq!(packed.output, out.join("notes.hzip"));
        assert_eq!(packed.input_size, text.len() as u64);
        assert_eq!(packed.output_size, fs::metadata(&packed.output).unwrap().len());
        assert!(packed.ratio() < 100.0);

        let restored_dir = dir.join("restored");
        fs::create_dir_all(&restored_dir).unwrap();
        let unpacked = decompress_file(&config, &packed.output, &restored_dir).unwrap();
        assert_eq!(unpacked.output, restored_dir.join("notes.txt"));
        assert_eq!(fs::read(&unpacked.output).unwrap(), text);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_without_extension() {
        let dir = scratch_dir();
        let src = dir.join("Makefile");
        fs::write(&src, b"all:\n\ttrue\n").unwrap();

        let config = CodecConfig::default();
        let packed = compress_file(&config, &src, &dir).unwrap();
        assert_eq!(packed.output, dir.join("Makefile.hzip"));

        let restored_dir = dir.join("restored");
        fs::create_dir_all(&restored_dir).unwrap();
        let unpacked = decompress_file(&config, &packed.output, &restored_dir).unwrap();
        assert_eq!(unpacked.output, restored_dir.join("Makefile"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_empty_file() {
        let dir = scratch_dir();
        let src = dir.join("empty.dat");
        fs::write(&src, b"").unwrap();

        let config = CodecConfig::default();
        let packed = compress_file(&config, &src, &dir).unwrap();
        assert_eq!(packed.ratio(), 0.0);

        let restored_dir = dir.join("restored");
        fs::create_dir_all(&restored_dir).unwrap();
        let unpacked = decompress_file(&config, &packed.output, &restored_dir).unwrap();
        assert_eq!(fs::read(&unpacked.output).unwrap(), b"");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_corrupt_container_writes_nothing() {
        let dir = scratch_dir();
        let src = dir.join("broken.hzip");
        fs::write(&src, b"HZIQ\x01").unwrap();

        let err = decompress_file(&CodecConfig::default(), &src, &dir).unwrap_err();
        assert!(matches!(err, Error::MalformedHeader(_)));
        let entries: Vec<_> = fs::read_dir(&dir).unwrap().collect();
        assert_eq!(entries.len(), 1);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_truncated_payload_leaves_no_output() {
        let dir = scratch_dir();
        let container =
            codec::hzip_encode(b"several distinct symbols so the payload spans bytes").unwrap();
        let src = dir.join("cut.hzip");
        fs::write(&src, &container[..container.len() - 3]).unwrap();

        let out = dir.join("out");
        fs::create_dir_all(&out).unwrap();
        let err = decompress_file(&CodecConfig::default(), &src, &out).unwrap_err();
        assert!(matches!(err, Error::TruncatedBitstream { .. }));
        assert!(!out.join("cut").exists());
        assert!(!out.join("cut.part").exists());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_extension_cannot_escape_out_dir() {
        let dir = scratch_dir();
        let valid = codec::hzip_encode(b"pwned").unwrap();
        let mut cursor = Cursor::new(&valid);
        let mut header = ContainerHeader::read_from(&mut cursor).unwrap();
        let payload = &valid[cursor.position() as usize..];
        header.extension = "/../../escaped.txt".to_string();
        let mut crafted = header.to_bytes();
        crafted.extend_from_slice(payload);

        let out = dir.join("out");
        fs::create_dir_all(out.join("data")).unwrap();
        let src = dir.join("data.hzip");
        fs::write(&src, &crafted).unwrap();

        let err = decompress_file(&CodecConfig::default(), &src, &out).unwrap_err();
        assert!(matches!(err, Error::MalformedHeader(_)));
        assert!(!dir.join("escaped.txt").exists());
        assert!(!out.join("data").join("..").join("..").join("escaped.txt").exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_source_is_io_error() {
        let dir = scratch_dir();
        let err = compress_file(&CodecConfig::default(), &dir.join("nope.txt"), &dir).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        fs::remove_dir_all(&dir).unwrap();
    }
}

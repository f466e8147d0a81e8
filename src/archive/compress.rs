use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use log::debug;
use walkdir::WalkDir;
use zip::result::ZipError;
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

use crate::constants::{COMPRESSED_EXTENSIONS, ZIP64_THRESHOLD};
use crate::error::BackupError;

/// Pick zip entry options for a file.
///
/// Files that are already compressed (images, media, nested archives) get the
/// fastest deflate level, everything else the default level.
pub fn get_compression_options(path: &Path, size: u64) -> FileOptions {
    let low_compression = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => COMPRESSED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    };

    FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(if low_compression { 1 } else { 6 }))
        .large_file(size >= ZIP64_THRESHOLD)
        .unix_permissions(0o644)
}

/// Zip the directory `root` into `zip_path`, with `root` itself as the single
/// top-level entry.
///
/// Entry names use `/` separators regardless of platform, and every directory
/// gets an explicit entry so empty ones survive extraction. Returns the size
/// of the finished archive in bytes.
pub fn zip_directory(root: &Path, zip_path: &Path) -> Result<u64, BackupError> {
    let start = Instant::now();
    let base = root.parent().unwrap_or(root);

    let file = fs::File::create(zip_path).map_err(|e| archive_error(zip_path, ZipError::Io(e)))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| archive_error(zip_path, ZipError::Io(io::Error::from(e))))?;
        let name = entry_name(base, entry.path())?;

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{}/", name), FileOptions::default().unix_permissions(0o755))
                .map_err(|e| archive_error(zip_path, e))?;
            continue;
        }

        let mut reader = fs::File::open(entry.path())
            .map_err(|e| archive_error(entry.path(), ZipError::Io(e)))?;
        let size = reader
            .metadata()
            .map_err(|e| archive_error(entry.path(), ZipError::Io(e)))?
            .len();

        zip.start_file(name.as_str(), get_compression_options(entry.path(), size))
            .map_err(|e| archive_error(zip_path, e))?;
        io::copy(&mut reader, &mut zip).map_err(|e| archive_error(zip_path, ZipError::Io(e)))?;
        debug!("Compressed {} ({} bytes)", name, size);
    }

    let mut writer = zip.finish().map_err(|e| archive_error(zip_path, e))?;
    writer.flush().map_err(|e| archive_error(zip_path, ZipError::Io(e)))?;
    drop(writer);

    let size = fs::metadata(zip_path)
        .map_err(|e| archive_error(zip_path, ZipError::Io(e)))?
        .len();
    debug!("Wrote {} in {:?}", zip_path.display(), start.elapsed());
    Ok(size)
}

/// Archive entry name of `path` relative to `base`, `/`-separated.
fn entry_name(base: &Path, path: &Path) -> Result<String, BackupError> {
    let rel_path = path.strip_prefix(base).map_err(|_| {
        archive_error(
            path,
            ZipError::Io(io::Error::new(io::ErrorKind::InvalidInput, "entry outside archive root")),
        )
    })?;

    let parts: Vec<String> = rel_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

fn archive_error(path: &Path, source: ZipError) -> BackupError {
    BackupError::Archive { path: path.to_path_buf(), source }
}

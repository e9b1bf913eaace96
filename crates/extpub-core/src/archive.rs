use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::debug;
use sha2::{Digest, Sha256};
use thiserror::Error;
use zip::write::SimpleFileOptions;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("{context} {}: {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{context} {}: {source}", .path.display())]
    Zip {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

impl ArchiveError {
    fn io(context: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    fn zip(context: &'static str, path: &Path, source: zip::result::ZipError) -> Self {
        Self::Zip {
            context,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Zip `src_dir` into `dest`, with the directory itself as the single
/// top-level entry (`Foo.app/...`). Symlinks are stored as symlinks so app
/// bundles survive the round trip.
///
/// # Errors
/// Returns an error when `src_dir` is not a directory or any entry cannot be
/// read or written.
pub fn zip_dir(src_dir: &Path, dest: &Path) -> Result<u64, ArchiveError> {
    if !src_dir.is_dir() {
        return Err(ArchiveError::NotADirectory(src_dir.to_path_buf()));
    }
    let root_name = src_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ArchiveError::NotADirectory(src_dir.to_path_buf()))?;

    let file = std::fs::File::create(dest)
        .map_err(|error| ArchiveError::io("failed to create", dest, error))?;
    let mut writer = zip::ZipWriter::new(file);
    let mut count = 0;

    add_dir(&mut writer, src_dir, &root_name, &mut count)?;

    writer
        .finish()
        .map_err(|error| ArchiveError::zip("failed to finalize", dest, error))?;
    debug!(
        "Zipped {count} entries from {} into {}",
        src_dir.display(),
        dest.display()
    );
    Ok(count)
}

fn add_dir<W: Write + std::io::Seek>(
    writer: &mut zip::ZipWriter<W>,
    dir: &Path,
    prefix: &str,
    count: &mut u64,
) -> Result<(), ArchiveError> {
    writer
        .add_directory(format!("{prefix}/"), entry_options(dir))
        .map_err(|error| ArchiveError::zip("failed to add directory", dir, error))?;
    *count += 1;

    let mut entries = std::fs::read_dir(dir)
        .map_err(|error| ArchiveError::io("failed to read directory", dir, error))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| ArchiveError::io("failed to read entry in", dir, error))?;
    entries.sort_by_key(std::fs::DirEntry::file_name);

    for entry in entries {
        let path = entry.path();
        let name = format!("{prefix}/{}", entry.file_name().to_string_lossy());
        let metadata = std::fs::symlink_metadata(&path)
            .map_err(|error| ArchiveError::io("failed to stat", &path, error))?;

        if metadata.file_type().is_symlink() {
            let target = std::fs::read_link(&path)
                .map_err(|error| ArchiveError::io("failed to read link", &path, error))?;
            writer
                .add_symlink(
                    name,
                    target.to_string_lossy().into_owned(),
                    SimpleFileOptions::default(),
                )
                .map_err(|error| ArchiveError::zip("failed to add symlink", &path, error))?;
            *count += 1;
        } else if metadata.is_dir() {
            add_dir(writer, &path, &name, count)?;
        } else {
            writer
                .start_file(name, entry_options(&path))
                .map_err(|error| ArchiveError::zip("failed to add file", &path, error))?;
            let mut source = std::fs::File::open(&path)
                .map_err(|error| ArchiveError::io("failed to open", &path, error))?;
            std::io::copy(&mut source, writer)
                .map_err(|error| ArchiveError::io("failed to compress", &path, error))?;
            *count += 1;
        }
    }
    Ok(())
}

fn entry_options(path: &Path) -> SimpleFileOptions {
    let options = SimpleFileOptions::default();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = std::fs::metadata(path) {
            return options.unix_permissions(metadata.permissions().mode());
        }
    }
    #[cfg(not(unix))]
    let _ = path;
    options
}

/// Lower-case hex SHA-256 of a file's contents.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn sha256_file(path: &Path) -> Result<String, ArchiveError> {
    let mut file = std::fs::File::open(path)
        .map_err(|error| ArchiveError::io("failed to open", path, error))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];

    loop {
        let read = file
            .read(&mut buffer)
            .map_err(|error| ArchiveError::io("failed to read", path, error))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

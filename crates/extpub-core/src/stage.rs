use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Deserialize;
use thiserror::Error;

pub const MANIFEST_FILE_NAME: &str = "manifest.json";

#[derive(Debug, Error)]
pub enum StageError {
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
    #[error("Invalid manifest {}: {source}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StageError {
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

/// The extension's own manifest. Only `version` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub version: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct StagedPackage {
    pub unpacked_dir: PathBuf,
    pub manifest: Manifest,
}

/// File name of `path` without its last extension.
#[must_use]
pub fn package_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "package".to_string())
}

/// Unpack `archive` into the workspace, make `resources_dir` an exact copy
/// of the unpacked tree, and read the manifest from it.
///
/// # Errors
/// Returns an error when extraction, the directory replacement, or the
/// manifest read fails.
pub fn stage_package(
    archive: &Path,
    workspace: &Path,
    resources_dir: &Path,
) -> Result<StagedPackage, StageError> {
    let unpacked_dir = unpack_package(archive, workspace)?;

    info!(
        "Replacing {} with {}",
        resources_dir.display(),
        unpacked_dir.display()
    );
    replace_dir_contents(&unpacked_dir, resources_dir)?;

    let manifest = read_manifest(resources_dir)?;
    info!("Staged package version {}", manifest.version);

    Ok(StagedPackage {
        unpacked_dir,
        manifest,
    })
}

/// Extract `archive` into `<workspace>/<archive stem>` and return that
/// directory. An archive without an extension would collide with its own
/// stem, so it is unpacked into `<stem>.unpacked` instead.
///
/// # Errors
/// Returns an error if the directory cannot be created or the archive cannot
/// be read.
pub fn unpack_package(archive: &Path, workspace: &Path) -> Result<PathBuf, StageError> {
    let stem = package_stem(archive);
    let mut dest = workspace.join(&stem);
    if dest.exists() && !dest.is_dir() {
        dest = workspace.join(format!("{stem}.unpacked"));
    }
    std::fs::create_dir_all(&dest)
        .map_err(|error| StageError::io("failed to create", &dest, error))?;
    extract_zip(archive, &dest)?;
    Ok(dest)
}

/// Extract every entry of a zip archive below `dest`. Entries whose path
/// would escape `dest` are skipped.
///
/// # Errors
/// Returns an error when the archive or one of its entries cannot be read or
/// written.
pub fn extract_zip(zip_path: &Path, dest: &Path) -> Result<(), StageError> {
    let file = std::fs::File::open(zip_path)
        .map_err(|error| StageError::io("failed to open zip file", zip_path, error))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|error| StageError::zip("failed to read zip archive", zip_path, error))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|error| StageError::zip("failed to read zip entry in", zip_path, error))?;
        let Some(name) = entry.enclosed_name() else {
            warn!("Skipping zip entry with unsafe path: {}", entry.name());
            continue;
        };
        let out_path = dest.join(name);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)
                .map_err(|error| StageError::io("failed to create", &out_path, error))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|error| StageError::io("failed to create", parent, error))?;
        }
        let mut outfile = std::fs::File::create(&out_path)
            .map_err(|error| StageError::io("failed to create", &out_path, error))?;
        std::io::copy(&mut entry, &mut outfile)
            .map_err(|error| StageError::io("failed to extract", &out_path, error))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                let _ = std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode));
            }
        }
    }

    debug!("Extracted {} to {}", zip_path.display(), dest.display());
    Ok(())
}

/// Make `dest` an exact copy of `src`: anything previously in `dest` is
/// removed first.
///
/// # Errors
/// Returns an error if removing, creating, or copying fails.
pub fn replace_dir_contents(src: &Path, dest: &Path) -> Result<(), StageError> {
    match std::fs::remove_dir_all(dest) {
        Ok(()) => {}
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
        Err(error) => return Err(StageError::io("failed to clear", dest, error)),
    }
    copy_dir_recursive(src, dest)
}

fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<(), StageError> {
    std::fs::create_dir_all(dest)
        .map_err(|error| StageError::io("failed to create", dest, error))?;

    for entry in std::fs::read_dir(src)
        .map_err(|error| StageError::io("failed to read directory", src, error))?
    {
        let entry = entry.map_err(|error| StageError::io("failed to read entry in", src, error))?;
        let src_path = entry.path();
        let dest_path = dest.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dest_path)?;
        } else {
            std::fs::copy(&src_path, &dest_path)
                .map_err(|error| StageError::io("failed to copy", &src_path, error))?;
        }
    }
    Ok(())
}

/// Parse `<resources_dir>/manifest.json`.
///
/// # Errors
/// Returns an error if the file is missing, unreadable, or not a manifest
/// with a string `version`.
pub fn read_manifest(resources_dir: &Path) -> Result<Manifest, StageError> {
    let path = resources_dir.join(MANIFEST_FILE_NAME);
    let text = std::fs::read_to_string(&path)
        .map_err(|error| StageError::io("failed to read", &path, error))?;
    serde_json::from_str(&text).map_err(|source| StageError::Manifest { path, source })
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;
    use std::path::Path;

    use super::{StageError, extract_zip, package_stem, read_manifest, stage_package};

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let zip_file = std::fs::File::create(path).expect("zip file should be created");
        let mut writer = zip::ZipWriter::new(zip_file);
        let options = zip::write::SimpleFileOptions::default().unix_permissions(0o644);
        for (name, content) in entries {
            writer
                .start_file(*name, options)
                .expect("file entry should be started");
            writer
                .write_all(content)
                .expect("file entry should be written");
        }
        writer.finish().expect("zip archive should be finalized");
    }

    #[test]
    fn package_stem_drops_last_extension() {
        assert_eq!(
            package_stem(Path::new("/tmp/uBOLite_2025.1.1.safari.zip")),
            "uBOLite_2025.1.1.safari"
        );
        assert_eq!(package_stem(Path::new("package")), "package");
    }

    #[test]
    fn stage_package_replaces_resources_and_reads_manifest() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let workspace = temp.path().join("workspace");
        let resources = temp.path().join("xcode/Shared (Extension)/Resources");
        std::fs::create_dir_all(&workspace).expect("workspace should be created");
        std::fs::create_dir_all(resources.join("stale")).expect("resources should be created");
        std::fs::write(resources.join("old.txt"), "stale").expect("stale file should be written");
        std::fs::write(resources.join("stale/nested.js"), "stale")
            .expect("stale nested file should be written");

        let archive = workspace.join("package.zip");
        write_zip(
            &archive,
            &[
                ("manifest.json", br#"{"name":"uBO Lite","version":"2.3.4"}"#),
                ("js/background.js", b"console.log(1)"),
            ],
        );

        let staged =
            stage_package(&archive, &workspace, &resources).expect("package should be staged");

        assert_eq!(staged.manifest.version, "2.3.4");
        assert_eq!(staged.manifest.name.as_deref(), Some("uBO Lite"));
        assert_eq!(staged.unpacked_dir, workspace.join("package"));
        assert!(resources.join("js/background.js").is_file());
        assert!(!resources.join("old.txt").exists());
        assert!(!resources.join("stale").exists());
    }

    #[test]
    fn archive_without_extension_is_unpacked_beside_itself() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let archive = temp.path().join("uBOLite_safari");
        let resources = temp.path().join("Resources");
        write_zip(&archive, &[("manifest.json", br#"{"version":"2025.1.1"}"#)]);

        let staged =
            stage_package(&archive, temp.path(), &resources).expect("package should be staged");

        assert_eq!(staged.unpacked_dir, temp.path().join("uBOLite_safari.unpacked"));
        assert_eq!(staged.manifest.version, "2025.1.1");
        assert!(archive.is_file());
        assert!(resources.join("manifest.json").is_file());
    }

    #[test]
    fn stage_package_creates_missing_resources_dir() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let archive = temp.path().join("package.zip");
        let resources = temp.path().join("Resources");
        write_zip(&archive, &[("manifest.json", br#"{"version":"1.0"}"#)]);

        stage_package(&archive, temp.path(), &resources).expect("package should be staged");

        assert!(resources.join("manifest.json").is_file());
    }

    #[test]
    fn missing_manifest_fails_staging() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let archive = temp.path().join("package.zip");
        write_zip(&archive, &[("README.md", b"hello")]);

        let result = stage_package(&archive, temp.path(), &temp.path().join("Resources"));

        assert!(matches!(result, Err(StageError::Io { .. })));
    }

    #[test]
    fn manifest_without_version_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        std::fs::write(temp.path().join("manifest.json"), r#"{"name":"x"}"#)
            .expect("manifest should be written");

        assert!(matches!(
            read_manifest(temp.path()),
            Err(StageError::Manifest { .. })
        ));
    }

    #[test]
    fn corrupt_archive_is_a_zip_error() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let archive = temp.path().join("package.zip");
        std::fs::write(&archive, b"not a zip").expect("file should be written");

        assert!(matches!(
            extract_zip(&archive, temp.path()),
            Err(StageError::Zip { .. })
        ));
    }

    #[test]
    fn extract_zip_skips_unsafe_paths() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let archive = temp.path().join("unsafe.zip");
        let extract_dir = temp.path().join("extract");
        write_zip(
            &archive,
            &[("../outside.txt", b"escape"), ("inside.txt", b"ok")],
        );

        extract_zip(&archive, &extract_dir).expect("zip extraction should not fail");

        assert!(!temp.path().join("outside.txt").exists());
        assert!(extract_dir.join("inside.txt").is_file());
    }
}

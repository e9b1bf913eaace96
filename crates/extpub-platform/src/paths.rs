use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppPathsError {
    #[error("Could not determine home directory")]
    HomeDirUnavailable,
    #[error("Could not determine data directory")]
    DataDirUnavailable,
}

pub struct AppPaths {
    pub home_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    /// Build application paths for the current platform.
    ///
    /// # Errors
    /// Returns an error when the user home directory or the per-user data
    /// directory cannot be determined.
    pub fn new() -> Result<Self, AppPathsError> {
        let home_dir = dirs::home_dir().ok_or(AppPathsError::HomeDirUnavailable)?;

        #[cfg(target_os = "macos")]
        {
            let data_dir = home_dir.join("Library/Application Support/extpub");
            Ok(Self { home_dir, data_dir })
        }

        #[cfg(not(target_os = "macos"))]
        {
            Ok(Self {
                data_dir: dirs::data_dir()
                    .ok_or(AppPathsError::DataDirUnavailable)?
                    .join("extpub"),
                home_dir,
            })
        }
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("publish.log")
    }

    /// Ensure the data directory exists on disk.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::AppPaths;

    fn test_paths() -> AppPaths {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock should be after unix epoch")
            .as_nanos();
        let root = std::env::temp_dir().join(format!(
            "extpub-platform-paths-test-{}-{}",
            std::process::id(),
            nonce
        ));
        AppPaths {
            home_dir: root.join("home"),
            data_dir: root.join("data"),
        }
    }

    #[test]
    fn log_file_lives_in_data_dir() {
        let paths = test_paths();

        assert!(
            paths
                .log_file()
                .ends_with(std::path::Path::new("data").join("publish.log"))
        );
    }

    #[test]
    fn ensure_dirs_creates_data_directory() {
        let paths = test_paths();
        let root = paths
            .data_dir
            .parent()
            .expect("data dir should have a parent")
            .to_path_buf();

        paths
            .ensure_dirs()
            .expect("ensure_dirs should create the data directory");

        assert!(paths.data_dir.is_dir());

        let _ = std::fs::remove_dir_all(root);
    }
}

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::ToolchainError;
use crate::platform::Platform;

const ARCHIVE_EXTENSION: &str = "xcarchive";

/// One `xcodebuild clean archive` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRequest {
    pub platform: Platform,
    pub project: PathBuf,
    pub scheme: String,
    /// Path without the `.xcarchive` suffix; the tool appends it.
    pub archive_path: PathBuf,
}

impl ArchiveRequest {
    /// Where the tool writes the archive.
    #[must_use]
    pub fn archive_bundle(&self) -> PathBuf {
        self.archive_path.with_extension(ARCHIVE_EXTENSION)
    }
}

/// One `xcodebuild -exportArchive` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub platform: Platform,
    pub archive_bundle: PathBuf,
    pub export_path: PathBuf,
    pub options_plist: PathBuf,
}

/// Drives the platform build tool. Implementations must run each step to
/// completion before returning.
#[async_trait]
pub trait BuildToolchain: Send + Sync {
    async fn archive(&self, request: &ArchiveRequest) -> Result<PathBuf, ToolchainError>;

    async fn export(&self, request: &ExportRequest) -> Result<PathBuf, ToolchainError>;
}

fn path_arg(path: &Path) -> OsString {
    path.as_os_str().to_os_string()
}

#[must_use]
pub fn archive_args(request: &ArchiveRequest) -> Vec<OsString> {
    vec![
        "clean".into(),
        "archive".into(),
        "-configuration".into(),
        "release".into(),
        "-destination".into(),
        request.platform.destination().into(),
        "-project".into(),
        path_arg(&request.project),
        "-scheme".into(),
        request.scheme.clone().into(),
        "-archivePath".into(),
        path_arg(&request.archive_path),
    ]
}

#[must_use]
pub fn export_args(request: &ExportRequest) -> Vec<OsString> {
    vec![
        "-exportArchive".into(),
        "-archivePath".into(),
        path_arg(&request.archive_bundle),
        "-exportPath".into(),
        path_arg(&request.export_path),
        "-exportOptionsPlist".into(),
        path_arg(&request.options_plist),
    ]
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::path::PathBuf;

    use super::{ArchiveRequest, ExportRequest, archive_args, export_args};
    use crate::platform::Platform;

    fn archive_request() -> ArchiveRequest {
        ArchiveRequest {
            platform: Platform::Macos,
            project: PathBuf::from("/repo/xcode/uBlock Origin Lite.xcodeproj"),
            scheme: "uBlock Origin Lite (macOS)".to_string(),
            archive_path: PathBuf::from("/tmp/ws/uBOLite.macos"),
        }
    }

    #[test]
    fn archive_args_keep_spaced_values_whole() {
        let args = archive_args(&archive_request());

        let expected: Vec<OsString> = [
            "clean",
            "archive",
            "-configuration",
            "release",
            "-destination",
            "generic/platform=macOS",
            "-project",
            "/repo/xcode/uBlock Origin Lite.xcodeproj",
            "-scheme",
            "uBlock Origin Lite (macOS)",
            "-archivePath",
            "/tmp/ws/uBOLite.macos",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        assert_eq!(args, expected);
    }

    #[test]
    fn archive_bundle_appends_xcarchive() {
        assert_eq!(
            archive_request().archive_bundle(),
            PathBuf::from("/tmp/ws/uBOLite.macos.xcarchive")
        );
    }

    #[test]
    fn export_args_point_at_bundle_and_profile() {
        let request = ExportRequest {
            platform: Platform::Ios,
            archive_bundle: PathBuf::from("/tmp/ws/uBOLite.ios.xcarchive"),
            export_path: PathBuf::from("/tmp/ws/export.ios"),
            options_plist: PathBuf::from("/repo/xcode/exportOptions.ios.plist"),
        };

        let args = export_args(&request);

        assert_eq!(args[0], "-exportArchive");
        assert_eq!(args[2], "/tmp/ws/uBOLite.ios.xcarchive");
        assert_eq!(args[4], "/tmp/ws/export.ios");
        assert_eq!(args[6], "/repo/xcode/exportOptions.ios.plist");
        assert_eq!(args.len(), 7);
    }
}

//! Build driver for the Xcode wrapper project.

mod detection;
mod error;
mod platform;
mod toolchain;
mod xcodebuild;

pub use detection::{XCODEBUILD_ENV, detect_xcodebuild};
pub use error::ToolchainError;
pub use platform::Platform;
pub use toolchain::{ArchiveRequest, BuildToolchain, ExportRequest, archive_args, export_args};
pub use xcodebuild::XcodeBuild;

//! Core building blocks of the publishing workflow that do not talk to the
//! network or the build toolchain:
//! - Secrets discovery and parsing.
//! - The per-run workspace and its cleanup policy.
//! - Package staging into the native project.
//! - Version patching of the native project descriptor.
//! - Zipping exported packages for upload.

mod archive;
mod project;
mod secrets;
mod stage;
mod workspace;

pub use archive::{ArchiveError, sha256_file, zip_dir};
pub use project::{
    BUILD_NUMBER_KEY, MARKETING_VERSION_KEY, PatchError, ProjectEdit, ProjectFile,
    patch_project_file,
};
pub use secrets::{SECRETS_FILE_NAME, Secrets, SecretsError, load_secrets};
pub use stage::{
    MANIFEST_FILE_NAME, Manifest, StageError, StagedPackage, extract_zip, package_stem,
    read_manifest, replace_dir_contents, stage_package, unpack_package,
};
pub use workspace::{CleanupPolicy, Workspace};

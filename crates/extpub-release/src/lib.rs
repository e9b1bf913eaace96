//! Release-hosting access for the publisher.
//!
//! - `ReleaseHost`: the operations the publishing workflow needs from a host.
//! - `GitHubReleases`: the GitHub REST implementation.
//! - Release and asset records as returned by the host.

mod error;
mod github;
mod traits;
mod types;

pub use error::ReleaseError;
pub use reqwest::StatusCode;
pub use github::GitHubReleases;
pub use traits::ReleaseHost;
pub use types::{AssetInfo, ReleaseInfo};

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Parser, builder::BoolishValueParser};

/// Rewrite `name=value` into `--name=value` and a bare `name` into
/// `--name=true`. Arguments that already start with `-` pass through, as
/// does the program name.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut normalized: Vec<OsString> = args.next().into_iter().collect();

    for arg in args {
        let Some(text) = arg.to_str() else {
            normalized.push(arg);
            continue;
        };
        if text.starts_with('-') {
            normalized.push(arg);
        } else if text.contains('=') {
            normalized.push(format!("--{text}").into());
        } else {
            normalized.push(format!("--{text}=true").into());
        }
    }
    normalized
}

/// Fetch a packaged extension from a GitHub release, build it with Xcode and
/// optionally publish the macOS export back to the release.
///
/// Arguments are given as `name=value` or as a bare `name` for flags.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "extpub", version, about, long_about = None)]
pub struct Cli {
    /// Release tag to fetch the package from
    #[arg(long)]
    pub tag: Option<String>,

    /// Part of the asset name identifying the package
    #[arg(long)]
    pub asset: Option<String>,

    /// Owner of the GitHub repository holding the release
    #[arg(long = "githubOwner", env = "GITHUB_OWNER")]
    pub github_owner: Option<String>,

    /// Name of the GitHub repository holding the release
    #[arg(long = "githubRepo", env = "GITHUB_REPO")]
    pub github_repo: Option<String>,

    /// GitHub API root, for GitHub Enterprise servers
    #[arg(long = "githubApiUrl", env = "GITHUB_API_URL")]
    pub github_api_url: Option<String>,

    /// Build the iOS app
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = false,
          default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub ios: bool,

    /// Build the macOS app
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = false,
          default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub macos: bool,

    /// Export the builds for distribution; `github` also uploads the macOS
    /// export to the release
    #[arg(long)]
    pub publish: Option<String>,

    /// Never remove the temporary workspace
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = false,
          default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub keep: bool,

    /// Keep the temporary workspace only when the run fails
    #[arg(long = "keepOnFailure", action = ArgAction::Set, num_args = 0..=1,
          default_value_t = false, default_missing_value = "true",
          value_parser = BoolishValueParser::new())]
    pub keep_on_failure: bool,

    /// Increment the build number
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = false,
          default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub distribute: bool,

    /// Xcode project directory, instead of the one inside the checkout
    #[arg(long = "xcodeDir")]
    pub xcode_dir: Option<PathBuf>,

    /// Log debug output to the terminal
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = false,
          default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub verbose: bool,
}

impl Cli {
    /// Parse already-normalized arguments.
    ///
    /// # Errors
    /// Returns clap's error for unknown names or malformed values.
    pub fn try_parse_normalized<I>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator,
        I::Item: Into<OsString>,
    {
        Self::try_parse_from(normalize_args(args))
    }
}

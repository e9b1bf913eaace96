mod cli;
mod config;
mod error;
mod logging;
mod pipeline;
mod publish;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use extpub_core::{Workspace, load_secrets};
use extpub_platform::{AppPaths, find_repo_root};
use extpub_release::GitHubReleases;
use extpub_xcode::XcodeBuild;
use log::{error, info, warn};

use crate::cli::Cli;
use crate::config::PublishConfig;
use crate::error::PublishError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse_normalized(std::env::args_os()) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return match error.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    logging::init_logging(cli.verbose);

    match publish(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error}");
            if error.is_absence() {
                warn!("Check the release tag, the asset name and the Xcode project directory");
            }
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn publish(cli: &Cli) -> Result<(), PublishError> {
    let paths = AppPaths::new()?;
    let cwd = std::env::current_dir().map_err(PublishError::CurrentDir)?;

    let secrets = load_secrets(&cwd, &paths.home_dir).map_err(|error| {
        warn!("{error}");
        PublishError::MissingSecrets
    })?;
    let token = secrets
        .github_token()
        .ok_or(PublishError::MissingSecrets)?;

    let repo_root = find_repo_root(&cwd, &paths.home_dir);
    let config = PublishConfig::from_cli(cli, &cwd, repo_root.as_deref())?;
    info!("Xcode project: {}", config.layout.xcode_dir.display());

    let mut host = GitHubReleases::new(&config.owner, &config.repo, token)?;
    if let Some(api_url) = &config.api_url {
        host = host.with_api_base(api_url)?;
    }
    let toolchain = if config.platforms.is_empty() {
        XcodeBuild::new(PathBuf::from("xcodebuild"))
    } else {
        XcodeBuild::detect()?
    };

    let workspace = Workspace::create(config.cleanup).map_err(PublishError::Workspace)?;
    let summary = pipeline::run(&config, &host, &toolchain, workspace).await?;

    info!("Published version {}", summary.version);
    if let Some(path) = summary.kept_workspace {
        info!("Workspace kept at {}", path.display());
    }
    Ok(())
}

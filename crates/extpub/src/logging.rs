use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use extpub_platform::AppPaths;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

pub const MAX_LOG_SIZE: u64 = 1024 * 1024;

fn trim_log_file_if_oversized(log_path: &Path, max_log_size: u64) {
    if let Ok(metadata) = std::fs::metadata(log_path)
        && metadata.len() > max_log_size
        && let Ok(contents) = std::fs::read(log_path)
    {
        let half = contents.len() / 2;
        let keep_from = contents[half..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(half, |pos| half + pos + 1);
        let _ = std::fs::write(log_path, &contents[keep_from..]);
    }
}

fn terminal_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Log to stderr and append to the per-user log file. Returns the log file
/// path when the file logger could be set up.
pub fn init_logging(verbose: bool) -> Option<PathBuf> {
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("extpub")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        terminal_level(verbose),
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    let log_path = AppPaths::new().ok().and_then(|paths| {
        paths.ensure_dirs().ok()?;
        let log_path = paths.log_file();
        trim_log_file_if_oversized(&log_path, MAX_LOG_SIZE);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .ok()?;
        loggers.push(WriteLogger::new(LevelFilter::Debug, config, file));
        Some(log_path)
    });

    let _ = CombinedLogger::init(loggers);

    if let Some(path) = &log_path {
        log::debug!("Logging to {}", path.display());
    }
    log_path
}

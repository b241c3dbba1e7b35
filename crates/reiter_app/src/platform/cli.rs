use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use reiter_logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "reiter", version, about = "Run sattel crawlers and watch their progress")]
pub struct Cli {
    /// Crawlers to sync; all crawlers when none are given.
    pub crawlers: Vec<String>,

    /// Keep running after the sync settles and accept `:sync` commands.
    #[arg(short, long)]
    pub interactive: bool,

    /// Sattel executable, overriding the saved settings.
    #[arg(long, env = "REITER_SATTEL")]
    pub sattel: Option<PathBuf>,

    /// Crawler configuration file handed to sattel.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Settings file.
    #[arg(long, default_value = ".reiter_settings.ron")]
    pub settings: PathBuf,

    #[arg(long, value_enum, default_value_t = LogTarget::File)]
    pub log_to: LogTarget,

    #[arg(long, env = "REITER_LOG", default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

//! All the CLI arguments for Plexus

/// The name of the main config file that is created automatically.
pub const DEFAULT_CONFIG_FILE_NAME: &str = "plexus.toml";

/// Drifting particles, linked to each other and to your mouse.
#[derive(clap::Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
#[non_exhaustive]
pub struct CliArgs {
    /// Use a different config directory.
    #[arg(long)]
    pub config_dir: Option<std::path::PathBuf>,

    /// The name of the main config file inside the config directory.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE_NAME)]
    pub main_config: std::path::PathBuf,

    /// Override the log level from the config file.
    #[arg(long, value_enum)]
    pub log_level: Option<crate::config::LogLevel>,

    /// Override the log file path from the config file.
    #[arg(long)]
    pub log_path: Option<std::path::PathBuf>,

    /// Override the target frame rate.
    #[arg(long)]
    pub frame_rate: Option<u32>,

    /// Pick the number of particles again whenever the terminal is resized.
    #[arg(long)]
    pub responsive: bool,
}

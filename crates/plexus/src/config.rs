//! All of the user config for Plexus.

use color_eyre::eyre::{bail, ContextCompat as _, Result};

use crate::cli_args::{CliArgs, DEFAULT_CONFIG_FILE_NAME};

/// A copy of the default config file. It gets copied to the user's config folder the first time
/// they start Plexus.
static DEFAULT_CONFIG: &str = include_str!("../default_config.toml");

/// The valid log levels. Based on our `tracing` crate.
#[derive(serde::Deserialize, clap::ValueEnum, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error
    Error,
    /// Warnings
    Warn,
    /// Info
    Info,
    /// Debug
    Debug,
    /// Trace
    Trace,
    /// No logging
    Off,
}

/// Managing user config.
#[derive(serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    /// The maximum log level
    pub log_level: LogLevel,
    /// The location of the log file.
    pub log_path: std::path::PathBuf,
    /// Target frame rate
    pub frame_rate: u32,
    /// How many surface pixels make up one terminal pixel.
    pub pixel_scale: f32,
    /// The particle field itself
    pub field: plexus_field::config::Config,
}

impl Default for Config {
    fn default() -> Self {
        let log_directory = match dirs::state_dir() {
            Some(directory) => directory,
            None => std::path::PathBuf::new().join("./"),
        };
        let log_path = log_directory.join("plexus").join("plexus.log");

        Self {
            log_level: LogLevel::Off,
            log_path,
            frame_rate: plexus_field::scheduler::DEFAULT_FRAME_RATE,
            pixel_scale: 8.0,
            field: plexus_field::config::Config::default(),
        }
    }
}

impl Config {
    /// Get the stable location of Plexus's config directory on the user's system.
    pub fn default_directory() -> Result<std::path::PathBuf> {
        Ok(dirs::config_dir()
            .context("Couldn't get standard config directory")?
            .join("plexus"))
    }

    /// Figure out where our config is being stored, and create the directory if needed.
    pub fn setup_directory(
        maybe_custom_path: Option<std::path::PathBuf>,
    ) -> Result<std::path::PathBuf> {
        let path = match maybe_custom_path {
            None => Self::default_directory()?,
            Some(custom_path) => custom_path,
        };

        std::fs::create_dir_all(path.clone())?;
        Ok(path)
    }

    /// Load the main config. The default config file is written out first if it doesn't exist
    /// yet. Custom config files are never created automatically.
    pub fn load(directory: &std::path::Path, file_name: &std::path::Path) -> Result<Self> {
        let config_path = directory.join(file_name);
        let is_default_config = file_name == std::path::Path::new(DEFAULT_CONFIG_FILE_NAME);
        if is_default_config && !config_path.exists() {
            tracing::info!("Writing default config to: {config_path:?}");
            std::fs::write(config_path.clone(), DEFAULT_CONFIG)?;
        }

        tracing::info!("Loading the main Plexus config from: {config_path:?}");
        let result = std::fs::read_to_string(config_path.clone());
        match result {
            Ok(data) => {
                tracing::trace!("Using config file:\n{data}");
                let config = toml::from_str::<Self>(&data)?;
                config.validate()?;
                Ok(config)
            }
            Err(err) => {
                tracing::error!("Loading config: {err:?}");
                bail!(
                    "Couldn't load config at {config_path:?}: {}",
                    err.to_string()
                );
            }
        }
    }

    /// CLI arguments always win over the config file.
    pub fn apply_cli_args(&mut self, cli_args: &CliArgs) -> Result<()> {
        if let Some(level) = cli_args.log_level.clone() {
            self.log_level = level;
        }
        if let Some(path) = cli_args.log_path.clone() {
            self.log_path = path;
        }
        if let Some(frame_rate) = cli_args.frame_rate {
            self.frame_rate = frame_rate;
        }
        if cli_args.responsive {
            self.field.density_policy = plexus_field::config::DensityPolicy::Responsive;
        }

        self.validate()
    }

    /// Reject values that Plexus can't run with.
    pub fn validate(&self) -> Result<()> {
        if self.frame_rate == 0 {
            bail!("`frame_rate` must be at least 1");
        }
        if !self.pixel_scale.is_finite() || self.pixel_scale <= 0.0 {
            bail!(
                "`pixel_scale` must be a positive number, got: {}",
                self.pixel_scale
            );
        }
        self.field.validate()
    }
}

#[cfg(test)]
mod test {
    use clap::Parser as _;
    use plexus_field::config::{DensityPolicy, LinkStrategy};

    use super::*;

    #[test]
    fn the_shipped_config_matches_the_defaults() {
        let shipped = toml::from_str::<Config>(DEFAULT_CONFIG).unwrap();
        let defaults = Config::default();

        assert_eq!(shipped.log_level, defaults.log_level);
        assert_eq!(shipped.frame_rate, defaults.frame_rate);
        assert!((shipped.pixel_scale - defaults.pixel_scale).abs() < f32::EPSILON);
        assert_eq!(shipped.field, defaults.field);
    }

    #[test]
    fn default_config_is_written_on_first_run() {
        let directory = tempfile::tempdir().unwrap();
        let file_name = std::path::Path::new(DEFAULT_CONFIG_FILE_NAME);

        let config = Config::load(directory.path(), file_name).unwrap();

        assert!(directory.path().join(file_name).exists());
        assert_eq!(config.frame_rate, 30);
        assert_eq!(config.field.narrow_particle_count, 40);
    }

    #[test]
    fn custom_config_files_must_exist() {
        let directory = tempfile::tempdir().unwrap();
        let result = Config::load(directory.path(), std::path::Path::new("custom.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn partial_config_files_fall_back_to_defaults() {
        let directory = tempfile::tempdir().unwrap();
        let file_name = std::path::Path::new("custom.toml");
        std::fs::write(
            directory.path().join(file_name),
            "frame_rate = 60\n[field]\nlink_strategy = \"grid\"\n",
        )
        .unwrap();

        let config = Config::load(directory.path(), file_name).unwrap();

        assert_eq!(config.frame_rate, 60);
        assert_eq!(config.field.link_strategy, LinkStrategy::Grid);
        assert!((config.field.connection_distance - 150.0).abs() < f32::EPSILON);
    }

    #[test]
    fn bad_values_are_rejected_when_loading() {
        let directory = tempfile::tempdir().unwrap();
        let file_name = std::path::Path::new("bad.toml");
        std::fs::write(directory.path().join(file_name), "pixel_scale = 0.0\n").unwrap();

        assert!(Config::load(directory.path(), file_name).is_err());
    }

    #[test]
    fn cli_args_override_the_config_file() {
        let cli_args = CliArgs::parse_from([
            "plexus",
            "--frame-rate",
            "12",
            "--log-level",
            "debug",
            "--responsive",
        ]);
        let mut config = Config::default();

        config.apply_cli_args(&cli_args).unwrap();

        assert_eq!(config.frame_rate, 12);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.field.density_policy, DensityPolicy::Responsive);
    }

    #[test]
    fn a_zero_frame_rate_is_rejected() {
        let cli_args = CliArgs::parse_from(["plexus", "--frame-rate", "0"]);
        let mut config = Config::default();
        assert!(config.apply_cli_args(&cli_args).is_err());
    }
}

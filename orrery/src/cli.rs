//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, ConfigError};

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `orrery.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Animated sun, planets, rings and moons")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Directory containing the texture images.
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Seed for the initial orbital phases.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Multiplier for every rotation increment.
    #[arg(long)]
    pub time_scale: Option<f32>,

    /// Start with the animation paused.
    #[arg(long)]
    pub paused: bool,

    /// Log filter (error, warn, info, debug, trace or an env_logger spec).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to a RON config file (defaults to ./orrery.ron when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as RON and exit.
    #[arg(long)]
    pub dump_config: bool,
}

impl Config {
    /// Apply CLI overrides to a loaded config and re-check the result.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) -> Result<(), ConfigError> {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(ref dir) = args.assets {
            self.assets = dir.clone();
        }
        if let Some(seed) = args.seed {
            self.animation.seed = Some(seed);
        }
        if let Some(scale) = args.time_scale {
            self.animation.time_scale = scale;
        }
        if args.paused {
            self.animation.paused = true;
        }
        if let Some(ref level) = args.log_level {
            self.log_level = level.clone();
        }
        self.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs::parse_from([
            "orrery",
            "--width",
            "1920",
            "--assets",
            "/srv/img",
            "--seed",
            "42",
            "--time-scale",
            "2.5",
            "--paused",
        ]);
        config.apply_cli_overrides(&args).unwrap();
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.assets, PathBuf::from("/srv/img"));
        assert_eq!(config.animation.seed, Some(42));
        assert_eq!(config.animation.time_scale, 2.5);
        assert!(config.animation.paused);
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 720);
        assert_eq!(config.log_level, Config::default().log_level);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::parse_from(["orrery"])).unwrap();
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_rejects_unusable_time_scale() {
        for value in ["inf", "NaN", "-2", "0"] {
            let mut config = Config::default();
            let args = CliArgs::parse_from(["orrery".to_string(), format!("--time-scale={value}")]);
            assert!(
                matches!(config.apply_cli_overrides(&args), Err(ConfigError::InvalidValue { .. })),
                "--time-scale={value} was accepted"
            );
        }
    }

    #[test]
    fn test_config_and_dump_flags() {
        let args = CliArgs::parse_from(["orrery", "--config", "my.ron", "--dump-config"]);
        assert_eq!(args.config, Some(PathBuf::from("my.ron")));
        assert!(args.dump_config);
    }
}

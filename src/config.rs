use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::math::FunctionChoice;
use crate::math::sampler::{LevelParams, SurfaceParams};

pub const RESOLUTION_DOMAIN: (u32, u32) = (20, 100);
pub const RANGE_DOMAIN: (u32, u32) = (1, 10);
pub const LEVEL_DOMAIN: (u32, u32) = (1, 20);

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
pub enum ModeArg {
    /// z = f(x, y), surface and contour plots
    Two,
    /// w = f(x, y, z), level surfaces
    Three,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
pub enum FunctionArg {
    Paraboloid,
    Ripple,
    Saddle,
}

impl From<FunctionArg> for FunctionChoice {
    fn from(arg: FunctionArg) -> Self {
        match arg {
            FunctionArg::Paraboloid => FunctionChoice::Paraboloid,
            FunctionArg::Ripple => FunctionChoice::Ripple,
            FunctionArg::Saddle => FunctionChoice::SaddleHyperbolic,
        }
    }
}

/// Interactive visualizer for functions of two and three variables
#[derive(Parser, Debug)]
#[command(name = "mvcalc3d", version, about)]
pub struct Args {
    /// Topic shown at start-up
    #[arg(long, value_enum, default_value_t = ModeArg::Two)]
    pub mode: ModeArg,

    /// Example function for the two-variable topic
    #[arg(long, value_enum, default_value_t = FunctionArg::Paraboloid)]
    pub function: FunctionArg,

    /// Grid samples per axis
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u32).range(20..=100))]
    pub resolution: u32,

    /// Axis half extent r, the domain is [-r, r] x [-r, r]
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub range: u32,

    /// Level value k of the surface x² + y² + z² = k
    #[arg(long, default_value_t = 9, value_parser = clap::value_parser!(u32).range(1..=20))]
    pub level: u32,

    /// Start with vsync enabled
    #[arg(long)]
    pub vsync: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("resolution {0} is outside {min}..={max}", min = RESOLUTION_DOMAIN.0, max = RESOLUTION_DOMAIN.1)]
    Resolution(u32),
    #[error("axis range {0} is outside {min}..={max}", min = RANGE_DOMAIN.0, max = RANGE_DOMAIN.1)]
    Range(u32),
    #[error("level value {0} is outside {min}..={max}", min = LEVEL_DOMAIN.0, max = LEVEL_DOMAIN.1)]
    Level(u32),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct VisualizerConfig {
    pub mode: ModeArg,
    pub function: FunctionChoice,
    pub resolution: u32,
    pub range: u32,
    pub level: u32,
    pub vsync: bool,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            mode: ModeArg::Two,
            function: FunctionChoice::Paraboloid,
            resolution: 50,
            range: 5,
            level: 9,
            vsync: false,
        }
    }
}

fn within(value: u32, (min, max): (u32, u32)) -> bool {
    (min..=max).contains(&value)
}

impl VisualizerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !within(self.resolution, RESOLUTION_DOMAIN) {
            return Err(ConfigError::Resolution(self.resolution));
        }
        if !within(self.range, RANGE_DOMAIN) {
            return Err(ConfigError::Range(self.range));
        }
        if !within(self.level, LEVEL_DOMAIN) {
            return Err(ConfigError::Level(self.level));
        }
        Ok(())
    }

    pub fn surface_params(&self) -> SurfaceParams {
        SurfaceParams {
            range: self.range as f64,
            resolution: self.resolution as usize,
            function: self.function,
        }
    }

    pub fn level_params(&self) -> LevelParams {
        LevelParams {
            level: self.level as f64,
        }
    }
}

impl TryFrom<Args> for VisualizerConfig {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let config = Self {
            mode: args.mode,
            function: args.function.into(),
            resolution: args.resolution,
            range: args.range,
            level: args.level,
            vsync: args.vsync,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_sliders() {
        let args = Args::parse_from(["mvcalc3d"]);
        let config = VisualizerConfig::try_from(args).unwrap();
        assert_eq!(config, VisualizerConfig::default());
        assert_eq!(config.surface_params().range, 5.0);
        assert_eq!(config.surface_params().resolution, 50);
        assert_eq!(config.level_params().level, 9.0);
    }

    #[test]
    fn parses_mode_and_function() {
        let args = Args::parse_from(["mvcalc3d", "--mode", "three", "--function", "saddle", "--level", "4"]);
        let config = VisualizerConfig::try_from(args).unwrap();
        assert_eq!(config.mode, ModeArg::Three);
        assert_eq!(config.function, FunctionChoice::SaddleHyperbolic);
        assert_eq!(config.level, 4);
    }

    #[test]
    fn clap_rejects_out_of_domain_values() {
        assert!(Args::try_parse_from(["mvcalc3d", "--resolution", "10"]).is_err());
        assert!(Args::try_parse_from(["mvcalc3d", "--range", "11"]).is_err());
        assert!(Args::try_parse_from(["mvcalc3d", "--level", "0"]).is_err());
    }

    #[test]
    fn validate_reports_the_offending_field() {
        let config = VisualizerConfig {
            resolution: 150,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Resolution(150)));
        assert_eq!(
            ConfigError::Level(25).to_string(),
            "level value 25 is outside 1..=20"
        );
        let config = VisualizerConfig {
            range: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Range(0)));
    }
}

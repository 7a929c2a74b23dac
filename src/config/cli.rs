use crate::config::toml_config::OrientationConfig;
use crate::domain::model::CoordinateSystem;
use crate::utils::error::{OrientationError, Result};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "property-orientation")]
#[command(about = "Assigns each property the compass direction it faces towards its nearest road")]
pub struct CliConfig {
    /// TOML configuration file; flags below override its values
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory holding properties.csv (or transactions.csv + gnaf_prop.csv) and roads.geojson
    #[arg(long)]
    pub input_dir: Option<String>,

    /// Directory for the results table and summary
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Road network file name inside the input directory
    #[arg(long)]
    pub roads_file: Option<String>,

    /// Maximum distance in metres between a property and its road
    #[arg(long)]
    pub search_radius: Option<f64>,

    /// Input coordinates: geographic (WGS84 degrees) or projected (metres)
    #[arg(long)]
    pub coordinates: Option<String>,

    /// Pre-computed results table used when orientations are not computed
    #[arg(long)]
    pub precomputed: Option<String>,

    /// Summarise the pre-computed results instead of computing orientations
    #[arg(long)]
    pub use_precomputed: bool,

    /// Fill up to this share of rows' unknowns with the most common direction
    #[arg(long)]
    pub impute_fraction: Option<f64>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Loads the config file if one was given, then applies command line overrides.
    pub fn resolve(&self) -> Result<OrientationConfig> {
        let mut config = match &self.config {
            Some(path) => OrientationConfig::from_file(path)?,
            None => OrientationConfig::default(),
        };

        if let Some(dir) = &self.input_dir {
            config.input.dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        if let Some(file) = &self.roads_file {
            config.input.roads_file = file.clone();
        }
        if let Some(radius) = self.search_radius {
            config.resolver.search_radius_m = radius;
        }
        if let Some(system) = &self.coordinates {
            config.input.coordinates = system
                .parse::<CoordinateSystem>()
                .map_err(|reason| OrientationError::InvalidConfigValueError {
                    field: "coordinates".to_string(),
                    value: system.clone(),
                    reason,
                })?;
        }
        if let Some(path) = &self.precomputed {
            config.output.precomputed_path = path.clone();
        }
        if self.use_precomputed {
            config.output.use_precomputed = true;
        }
        if let Some(fraction) = self.impute_fraction {
            config.resolver.impute_fraction = Some(fraction);
        }

        Ok(config)
    }
}

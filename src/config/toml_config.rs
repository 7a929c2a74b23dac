use crate::domain::model::CoordinateSystem;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{OrientationError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub dir: String,
    pub properties_file: String,
    pub transactions_file: String,
    pub gnaf_file: String,
    pub roads_file: String,
    pub coordinates: CoordinateSystem,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: "data/raw".to_string(),
            properties_file: "properties.csv".to_string(),
            transactions_file: "transactions.csv".to_string(),
            gnaf_file: "gnaf_prop.csv".to_string(),
            roads_file: "roads.geojson".to_string(),
            coordinates: CoordinateSystem::Geographic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,
    pub results_file: String,
    pub summary_file: String,
    /// Results table reused when orientations are not computed in this run.
    pub precomputed_path: String,
    /// Skip computation even when it is available.
    pub use_precomputed: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "data/processed".to_string(),
            results_file: "property_orientations_final.csv".to_string(),
            summary_file: "orientation_summary.json".to_string(),
            precomputed_path: "data/processed/property_orientations_final.csv".to_string(),
            use_precomputed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub search_radius_m: f64,
    /// Share of all rows whose unknowns may be filled with the modal direction.
    pub impute_fraction: Option<f64>,
    pub progress_interval: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            search_radius_m: 3000.0,
            impute_fraction: None,
            progress_interval: 2000,
        }
    }
}

impl OrientationConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Err(OrientationError::ConfigError {
                message: format!("config file not found: {}", path_ref.display()),
            });
        }
        let content = std::fs::read_to_string(path_ref)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| OrientationError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_ROOT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| OrientationError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for OrientationConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input.dir", &self.input.dir)?;
        validation::validate_path("input.properties_file", &self.input.properties_file)?;
        validation::validate_path("input.transactions_file", &self.input.transactions_file)?;
        validation::validate_path("input.gnaf_file", &self.input.gnaf_file)?;
        validation::validate_path("input.roads_file", &self.input.roads_file)?;
        validation::validate_file_extension("input.roads_file", &self.input.roads_file, &["geojson", "json"])?;
        validation::validate_path("output.dir", &self.output.dir)?;
        validation::validate_path("output.results_file", &self.output.results_file)?;
        validation::validate_path("output.summary_file", &self.output.summary_file)?;
        validation::validate_path("output.precomputed_path", &self.output.precomputed_path)?;
        validation::validate_positive_distance("resolver.search_radius_m", self.resolver.search_radius_m)?;
        validation::validate_positive_number("resolver.progress_interval", self.resolver.progress_interval, 1)?;
        if let Some(fraction) = self.resolver.impute_fraction {
            validation::validate_range("resolver.impute_fraction", fraction, 0.0, 1.0)?;
        }
        Ok(())
    }
}

impl ConfigProvider for OrientationConfig {
    fn input_dir(&self) -> &str {
        &self.input.dir
    }

    fn properties_file(&self) -> &str {
        &self.input.properties_file
    }

    fn transactions_file(&self) -> &str {
        &self.input.transactions_file
    }

    fn gnaf_file(&self) -> &str {
        &self.input.gnaf_file
    }

    fn roads_file(&self) -> &str {
        &self.input.roads_file
    }

    fn output_dir(&self) -> &str {
        &self.output.dir
    }

    fn results_file(&self) -> &str {
        &self.output.results_file
    }

    fn summary_file(&self) -> &str {
        &self.output.summary_file
    }

    fn precomputed_path(&self) -> &str {
        &self.output.precomputed_path
    }

    fn coordinates(&self) -> CoordinateSystem {
        self.input.coordinates
    }

    fn search_radius_m(&self) -> f64 {
        self.resolver.search_radius_m
    }

    fn impute_fraction(&self) -> Option<f64> {
        self.resolver.impute_fraction
    }

    fn progress_interval(&self) -> usize {
        self.resolver.progress_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_the_batch_layout() {
        let config = OrientationConfig::default();
        assert_eq!(config.input_dir(), "data/raw");
        assert_eq!(config.roads_file(), "roads.geojson");
        assert_eq!(config.output_dir(), "data/processed");
        assert_eq!(config.results_file(), "property_orientations_final.csv");
        assert_eq!(config.search_radius_m(), 3000.0);
        assert_eq!(config.progress_interval(), 2000);
        assert_eq!(config.impute_fraction(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml_config() {
        let toml_content = r#"
[input]
dir = "/srv/gnaf"
coordinates = "projected"

[resolver]
search_radius_m = 500.0
impute_fraction = 0.1
"#;

        let config = OrientationConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.input.dir, "/srv/gnaf");
        assert_eq!(config.input.roads_file, "roads.geojson");
        assert_eq!(config.coordinates(), CoordinateSystem::Projected);
        assert_eq!(config.search_radius_m(), 500.0);
        assert_eq!(config.impute_fraction(), Some(0.1));
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ORIENTATION_TEST_DATA_ROOT", "/mnt/data");

        let toml_content = r#"
[input]
dir = "${ORIENTATION_TEST_DATA_ROOT}/raw"

[output]
dir = "${ORIENTATION_TEST_UNSET_VAR}/processed"
"#;

        let config = OrientationConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.input.dir, "/mnt/data/raw");
        assert_eq!(config.output.dir, "${ORIENTATION_TEST_UNSET_VAR}/processed");

        std::env::remove_var("ORIENTATION_TEST_DATA_ROOT");
    }

    #[test]
    fn test_config_validation() {
        let config = OrientationConfig::from_toml_str("[resolver]\nsearch_radius_m = -1.0\n").unwrap();
        assert!(config.validate().is_err());

        let config = OrientationConfig::from_toml_str("[resolver]\nimpute_fraction = 1.5\n").unwrap();
        assert!(config.validate().is_err());

        let config = OrientationConfig::from_toml_str("[input]\nroads_file = \"roads.gpkg\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_a_config_error() {
        let err = OrientationConfig::from_toml_str("[resolver\nsearch_radius_m = ").unwrap_err();
        assert!(matches!(err, OrientationError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\ndir = \"out\"\nuse_precomputed = true\n")
            .unwrap();

        let config = OrientationConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output.dir, "out");
        assert!(config.output.use_precomputed);

        assert!(OrientationConfig::from_file("/definitely/not/here.toml").is_err());
    }
}

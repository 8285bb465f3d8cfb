// Configuration module for reading Autoplay.toml
// This module provides the tunable parameters of the evaluator, the search and the autoplay driver

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub evaluator: EvaluatorConfig,
    pub search: SearchConfig,
    pub spawn: SpawnConfig,
    pub autoplay: AutoplayConfig,
    pub debug: DebugConfig,
}

/// Static evaluation weights
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EvaluatorConfig {
    /// Reward per empty cell
    pub empty_cell_weight: f64,
    /// Multiplier on the summed absolute difference of neighbouring cells
    pub smoothness_weight: f64,
    /// Flat penalty per neighbour pair that decreases left-to-right or top-to-bottom
    pub monotonicity_penalty: f64,
    /// Flat bonus per neighbour pair holding equal values
    pub merge_bonus: f64,
    /// Per-cell multiplier anchoring large tiles toward the top-left corner
    pub position_weights: [[f64; 4]; 4],
}

/// Expectimax search parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SearchConfig {
    /// Depth at which each root move is evaluated as a chance node
    pub depth: u8,
    /// Enables the per-search transposition cache
    pub cache_enabled: bool,
    /// Minimum depth before root moves are searched in parallel
    pub parallel_min_depth: u8,
    /// Minimum worker threads before root moves are searched in parallel
    pub min_cpus_for_parallel: usize,
}

/// Tile spawn distribution
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SpawnConfig {
    pub two_probability: f64,
}

/// Autoplay driver timing
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AutoplayConfig {
    pub polling_interval_ms: u64,
    /// Wall-clock budget for one search before it is cancelled
    pub search_budget_ms: u64,
    #[serde(default)]
    pub max_moves: Option<u64>,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Autoplay.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        let config: Config =
            toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that parse as TOML but cannot drive a game
    pub fn validate(&self) -> Result<(), String> {
        let p = self.spawn.two_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(format!(
                "Invalid config: spawn.two_probability must be within [0, 1], got {}",
                p
            ));
        }
        Ok(())
    }

    /// Loads default configuration from Autoplay.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Autoplay.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the values in Autoplay.toml
    pub fn default_hardcoded() -> Self {
        Config {
            evaluator: EvaluatorConfig {
                empty_cell_weight: 100.0,
                smoothness_weight: 1.0,
                monotonicity_penalty: 5.0,
                merge_bonus: 50.0,
                position_weights: [
                    [10.0, 8.0, 5.0, 3.0],
                    [8.0, 5.0, 3.0, 2.0],
                    [5.0, 3.0, 2.0, 1.0],
                    [3.0, 2.0, 1.0, 0.0],
                ],
            },
            search: SearchConfig {
                depth: 2, // chosen for latency, not optimality
                cache_enabled: false,
                parallel_min_depth: 4,
                min_cpus_for_parallel: 2,
            },
            spawn: SpawnConfig {
                two_probability: 0.9,
            },
            autoplay: AutoplayConfig {
                polling_interval_ms: 100,
                search_budget_ms: 1000,
                max_moves: None,
                seed: None,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "autoplay_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!(
                "Could not load Autoplay.toml ({}), using hardcoded defaults",
                e
            );
            Self::default_hardcoded()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_can_be_created() {
        let config = Config::default_hardcoded();
        assert_eq!(config.search.depth, 2);
        assert_eq!(config.evaluator.empty_cell_weight, 100.0);
        assert_eq!(config.evaluator.position_weights[0][0], 10.0);
        assert_eq!(config.evaluator.position_weights[3][3], 0.0);
    }

    #[test]
    fn test_autoplay_toml_can_be_parsed() {
        let result = Config::from_file("Autoplay.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Autoplay.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_all_config_values_match_hardcoded_defaults() {
        let file_config =
            Config::from_file("Autoplay.toml").expect("Autoplay.toml should be parseable");
        let hardcoded_config = Config::default_hardcoded();

        assert_eq!(file_config.evaluator, hardcoded_config.evaluator);
        assert_eq!(file_config.search, hardcoded_config.search);
        assert_eq!(file_config.spawn, hardcoded_config.spawn);
        assert_eq!(file_config.autoplay, hardcoded_config.autoplay);
        assert_eq!(file_config.debug, hardcoded_config.debug);
    }

    fn config_text(two_probability: &str) -> String {
        format!(
            r#"
            [evaluator]
            empty_cell_weight = 1.0
            smoothness_weight = 1.0
            monotonicity_penalty = 1.0
            merge_bonus = 1.0
            position_weights = [[0.0, 0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 0.0]]

            [search]
            depth = 3
            cache_enabled = true
            parallel_min_depth = 3
            min_cpus_for_parallel = 4

            [spawn]
            two_probability = {}

            [autoplay]
            polling_interval_ms = 10
            search_budget_ms = 50
            max_moves = 25
            seed = 42

            [debug]
            enabled = true
            log_file_path = "out.jsonl"
        "#,
            two_probability
        )
    }

    #[test]
    fn test_optional_autoplay_fields() {
        let config = Config::from_toml_str(&config_text("0.5")).expect("config should parse");
        assert_eq!(config.autoplay.max_moves, Some(25));
        assert_eq!(config.autoplay.seed, Some(42));
        assert!(config.search.cache_enabled);
        assert_eq!(config.spawn.two_probability, 0.5);
    }

    #[test]
    fn test_two_probability_must_be_a_probability() {
        for bad in ["nan", "-0.1", "1.5", "inf"] {
            let result = Config::from_toml_str(&config_text(bad));
            let err = result.expect_err("out-of-range probability should be rejected");
            assert!(err.contains("two_probability"), "unexpected error: {}", err);
        }
        for edge in ["0.0", "1.0"] {
            assert!(Config::from_toml_str(&config_text(edge)).is_ok());
        }
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());
        assert!(Config::from_toml_str("[search]\ndepth = \"deep\"").is_err());
    }
}

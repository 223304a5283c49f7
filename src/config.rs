// Configuration module for reading Snake.toml
// Every tunable of the engine lives here so behavior can be adjusted without a rebuild

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading Snake.toml
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub timing: TimingConfig,
    pub costs: CostConfig,
    pub strategy: StrategyConfig,
    pub rules: RulesConfig,
    pub debug: DebugConfig,
}

/// Response deadline handling
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    pub response_time_budget_ms: u64,
    pub network_overhead_ms: u64,
}

impl TimingConfig {
    /// Computes the effective computation budget
    pub fn effective_budget_ms(&self) -> u64 {
        self.response_time_budget_ms.saturating_sub(self.network_overhead_ms)
    }
}

/// Traversal costs stamped onto the grid by the annotator
#[derive(Debug, Deserialize, Clone)]
pub struct CostConfig {
    pub default_cost: f64,
    /// Below default_cost so food attracts, above zero so shorter routes still win
    pub food_cost: f64,
    pub hazard_cost: f64,
    /// Cost of cells next to the head of a shorter rival
    pub rival_head_cost: f64,
}

/// Target selection constants
#[derive(Debug, Deserialize, Clone)]
pub struct StrategyConfig {
    pub hunger_threshold: i32,
    pub flood_fill_depth: usize,
    /// Turns at or below this are treated as a fresh game by the growth tracker
    pub history_turns: i32,
    /// Upper bound on the open area demanded around a food target
    pub dead_end_area: usize,
    /// Games the growth tracker remembers before evicting the least recently seen
    pub max_tracked_games: usize,
}

/// Ruleset and map names that change topology or hazard behavior
#[derive(Debug, Deserialize, Clone)]
pub struct RulesConfig {
    pub wrapped_ruleset: String,
    pub lethal_hazard_rulesets: Vec<String>,
    pub lethal_hazard_maps: Vec<String>,
    /// Boards wider or taller than this are rejected before any cell is allocated
    pub max_board_dim: i32,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Snake.toml configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Loads default configuration from Snake.toml in the project root
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::from_file("Snake.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Snake.toml
    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig {
                response_time_budget_ms: 400,
                network_overhead_ms: 50,
            },
            costs: CostConfig {
                default_cost: 1.0,
                food_cost: 0.5,
                hazard_cost: 5.0,
                rival_head_cost: 2.0,
            },
            strategy: StrategyConfig {
                hunger_threshold: 85,
                flood_fill_depth: 10,
                history_turns: 3,
                dead_end_area: 8,
                max_tracked_games: 1024,
            },
            rules: RulesConfig {
                wrapped_ruleset: "wrapped".to_string(),
                lethal_hazard_rulesets: vec!["arcade-maze".to_string()],
                lethal_hazard_maps: vec![
                    "hz_rivers_bridges".to_string(),
                    "hz_islands_bridges".to_string(),
                ],
                max_board_dim: 64,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "battlesnake_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Snake.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }
}

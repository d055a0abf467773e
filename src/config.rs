//! Difficulty profiles and engine configuration
//!
//! The difficulty table maps the four named levels to search parameters.
//! It has a built-in default and can be replaced from a TOML file:
//!
//! ```toml
//! [easy]
//! max_depth = 2
//! time_limit_ms = 500
//! random_factor = 0.3
//!
//! [easy.evaluation_options]
//! mandatory_defense = true
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::eval::EvaluationOptions;
use crate::search::alphabeta::DEFAULT_MAX_WIDTH;
use crate::search::SearchLimits;

/// Named difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EngineError::UnknownDifficulty(s.to_string()))
    }
}

fn default_true() -> bool {
    true
}

fn default_max_width() -> usize {
    DEFAULT_MAX_WIDTH
}

/// Search parameters for one difficulty level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyParams {
    pub max_depth: u8,
    pub time_limit_ms: u64,
    /// Probability in [0, 1] of playing a near-best move instead of the best
    pub random_factor: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_nodes: Option<u64>,
    /// Run the forced-win stage (fives, VCF, VCT) before alpha-beta
    #[serde(default = "default_true")]
    pub threat_search: bool,
    #[serde(default = "default_max_width")]
    pub max_width: usize,
    #[serde(default)]
    pub evaluation_options: EvaluationOptions,
}

impl DifficultyParams {
    pub fn time_limit(&self) -> Duration {
        Duration::from_millis(self.time_limit_ms)
    }

    /// Search limits for one move under this profile
    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits::new(self.max_depth, self.time_limit())
            .with_max_nodes(self.max_nodes)
            .with_random_factor(self.random_factor)
            .with_max_width(self.max_width)
    }

    pub fn easy() -> Self {
        Self {
            max_depth: 2,
            time_limit_ms: 500,
            random_factor: 0.3,
            evaluation_options: EvaluationOptions::basic(),
            max_nodes: Some(5_000),
            threat_search: false,
            max_width: 8,
        }
    }

    pub fn normal() -> Self {
        Self {
            max_depth: 4,
            time_limit_ms: 1_000,
            random_factor: 0.1,
            evaluation_options: EvaluationOptions::tactical(),
            max_nodes: Some(40_000),
            threat_search: true,
            max_width: 12,
        }
    }

    pub fn hard() -> Self {
        Self {
            max_depth: 6,
            time_limit_ms: 2_000,
            random_factor: 0.0,
            evaluation_options: EvaluationOptions {
                vct_bonus: false,
                ..EvaluationOptions::full()
            },
            max_nodes: Some(120_000),
            threat_search: true,
            max_width: DEFAULT_MAX_WIDTH,
        }
    }

    pub fn expert() -> Self {
        Self {
            max_depth: 8,
            time_limit_ms: 4_000,
            random_factor: 0.0,
            evaluation_options: EvaluationOptions::full(),
            max_nodes: Some(300_000),
            threat_search: true,
            max_width: 20,
        }
    }
}

/// Difficulty name to parameters; always holds every level.
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyTable {
    levels: BTreeMap<Difficulty, DifficultyParams>,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        let levels = Difficulty::ALL
            .into_iter()
            .map(|d| {
                let params = match d {
                    Difficulty::Easy => DifficultyParams::easy(),
                    Difficulty::Normal => DifficultyParams::normal(),
                    Difficulty::Hard => DifficultyParams::hard(),
                    Difficulty::Expert => DifficultyParams::expert(),
                };
                (d, params)
            })
            .collect();
        Self { levels }
    }
}

impl DifficultyTable {
    /// Parse a table from TOML. Levels missing from the text keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, EngineError> {
        let overrides: BTreeMap<String, DifficultyParams> = toml::from_str(text)?;
        let mut table = Self::default();
        for (name, params) in overrides {
            let level: Difficulty = name.parse()?;
            table.levels.insert(level, params);
        }
        Ok(table)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        let named: BTreeMap<&str, &DifficultyParams> =
            self.levels.iter().map(|(d, p)| (d.name(), p)).collect();
        toml::to_string_pretty(&named)
    }

    pub fn get(&self, difficulty: Difficulty) -> &DifficultyParams {
        // Every level is filled in by `default`
        &self.levels[&difficulty]
    }

    pub fn set(&mut self, difficulty: Difficulty, params: DifficultyParams) {
        self.levels.insert(difficulty, params);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Difficulty, &DifficultyParams)> {
        self.levels.iter().map(|(d, p)| (*d, p))
    }
}

/// Engine-wide settings that do not depend on the difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed seed for Zobrist keys, book choices and randomization
    pub seed: Option<u64>,
    pub tt_size_mb: usize,
    /// Wait before answering from the opening book
    pub simulate_thinking: bool,
    /// Book delay as a percentage of the difficulty's time limit
    pub book_delay_percent: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            tt_size_mb: 16,
            simulate_thinking: true,
            book_delay_percent: 25,
        }
    }
}

impl EngineConfig {
    /// Deterministic, delay-free configuration for tests and self-play
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            tt_size_mb: 4,
            simulate_thinking: false,
            ..Self::default()
        }
    }

    /// Artificial delay for an opening-book answer under `params`
    pub fn book_delay(&self, params: &DifficultyParams) -> Duration {
        if !self.simulate_thinking {
            return Duration::ZERO;
        }
        params.time_limit() * u32::from(self.book_delay_percent.min(100)) / 100
    }
}

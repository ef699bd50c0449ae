use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigManager, FileContentConfigProvider, Validate, YamlConfigSerializer};
use crate::defaults;
use crate::games::snake::{ActiveEffects, Difficulty, Direction, Grid, Point, PowerUpKind, Snake};

/// Base tick interval for each difficulty, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyIntervals {
    pub easy_ms: u64,
    pub normal_ms: u64,
    pub insane_ms: u64,
}

impl DifficultyIntervals {
    pub fn base_ms(&self, difficulty: Difficulty) -> u64 {
        match difficulty {
            Difficulty::Easy => self.easy_ms,
            Difficulty::Normal => self.normal_ms,
            Difficulty::Insane => self.insane_ms,
        }
    }
}

impl Default for DifficultyIntervals {
    fn default() -> Self {
        Self {
            easy_ms: defaults::EASY_TICK_INTERVAL_MS,
            normal_ms: defaults::NORMAL_TICK_INTERVAL_MS,
            insane_ms: defaults::INSANE_TICK_INTERVAL_MS,
        }
    }
}

/// On-disk engine configuration. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub grid_size: usize,
    pub initial_food: Point,
    pub starting_difficulty: Difficulty,
    pub food_score: u32,
    pub multiplied_food_score: u32,
    pub power_up_spawn_probability: f32,
    pub power_up_effect_ticks: u32,
    pub power_up_lifetime_ms: u64,
    pub tick_intervals: DifficultyIntervals,
    pub speed_boost_ms: u64,
    pub min_tick_interval_ms: u64,
    pub high_score_file: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_size: defaults::GRID_SIZE,
            initial_food: Point::from(defaults::INITIAL_FOOD),
            starting_difficulty: Difficulty::Normal,
            food_score: defaults::FOOD_SCORE,
            multiplied_food_score: defaults::MULTIPLIED_FOOD_SCORE,
            power_up_spawn_probability: defaults::POWER_UP_SPAWN_PROBABILITY,
            power_up_effect_ticks: defaults::POWER_UP_EFFECT_TICKS,
            power_up_lifetime_ms: defaults::POWER_UP_LIFETIME_MS,
            tick_intervals: DifficultyIntervals::default(),
            speed_boost_ms: defaults::SPEED_BOOST_MS,
            min_tick_interval_ms: defaults::MIN_TICK_INTERVAL_MS,
            high_score_file: defaults::HIGH_SCORE_FILE.to_string(),
        }
    }
}

impl Validate for EngineConfig {
    fn validate(&self) -> Result<(), String> {
        if !(5..=100).contains(&self.grid_size) {
            return Err("Grid size must be between 5 and 100".to_string());
        }

        let grid = Grid::square(self.grid_size);
        if !grid.contains(&self.initial_food) {
            return Err(format!(
                "Initial food ({}, {}) is outside the {}x{} grid",
                self.initial_food.x, self.initial_food.y, self.grid_size, self.grid_size
            ));
        }
        if Snake::seed(&grid, Direction::Up).contains(&self.initial_food) {
            return Err("Initial food must not overlap the starting snake".to_string());
        }

        if self.food_score == 0 || self.multiplied_food_score == 0 {
            return Err("Food scores must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.power_up_spawn_probability) {
            return Err("Power-up spawn probability must be between 0.0 and 1.0".to_string());
        }
        if self.power_up_effect_ticks == 0 {
            return Err("Power-up effect must last at least one tick".to_string());
        }
        if self.power_up_lifetime_ms > i64::MAX as u64 {
            return Err("Power-up lifetime is too large".to_string());
        }
        if self.min_tick_interval_ms == 0 {
            return Err("Minimum tick interval must be positive".to_string());
        }
        for difficulty in Difficulty::ALL {
            let base = self.tick_intervals.base_ms(difficulty);
            if base < self.min_tick_interval_ms || base > 5000 {
                return Err(format!(
                    "{} tick interval must be between {}ms and 5000ms",
                    difficulty, self.min_tick_interval_ms
                ));
            }
        }
        if self.high_score_file.trim().is_empty() {
            return Err("High score file must not be empty".to_string());
        }

        Ok(())
    }
}

pub fn get_config_manager(
    file_path: &str,
) -> ConfigManager<FileContentConfigProvider, EngineConfig, YamlConfigSerializer> {
    ConfigManager::from_yaml_file(file_path)
}

/// Runtime form of [`EngineConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct SnakeSessionSettings {
    pub grid: Grid,
    pub initial_food: Point,
    pub starting_difficulty: Difficulty,
    pub food_score: u32,
    pub multiplied_food_score: u32,
    pub power_up_spawn_probability: f32,
    pub power_up_effect_ticks: u32,
    pub power_up_lifetime_ms: i64,
    pub tick_intervals: DifficultyIntervals,
    pub speed_boost: Duration,
    pub min_tick_interval: Duration,
}

impl From<&EngineConfig> for SnakeSessionSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            grid: Grid::square(config.grid_size),
            initial_food: config.initial_food,
            starting_difficulty: config.starting_difficulty,
            food_score: config.food_score,
            multiplied_food_score: config.multiplied_food_score,
            power_up_spawn_probability: config.power_up_spawn_probability.clamp(0.0, 1.0),
            power_up_effect_ticks: config.power_up_effect_ticks.max(1),
            power_up_lifetime_ms: i64::try_from(config.power_up_lifetime_ms).unwrap_or(i64::MAX),
            tick_intervals: config.tick_intervals,
            speed_boost: Duration::from_millis(config.speed_boost_ms),
            min_tick_interval: Duration::from_millis(config.min_tick_interval_ms.max(1)),
        }
    }
}

impl Default for SnakeSessionSettings {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl SnakeSessionSettings {
    /// `max(min, base(difficulty) - boost)` where the boost only applies while
    /// the speed effect is running. Score never changes the pace.
    pub fn tick_interval(&self, difficulty: Difficulty, effects: &ActiveEffects) -> Duration {
        let base = Duration::from_millis(self.tick_intervals.base_ms(difficulty));
        let interval = if effects.is_active(PowerUpKind::Speed) {
            base.saturating_sub(self.speed_boost)
        } else {
            base
        };
        interval.max(self.min_tick_interval)
    }
}

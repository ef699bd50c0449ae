pub const GRID_SIZE: usize = 20;
pub const INITIAL_FOOD: (usize, usize) = (5, 5);

pub const FOOD_SCORE: u32 = 10;
pub const MULTIPLIED_FOOD_SCORE: u32 = 20;

pub const POWER_UP_SPAWN_PROBABILITY: f32 = 0.2;
pub const POWER_UP_EFFECT_TICKS: u32 = 50;
pub const POWER_UP_LIFETIME_MS: u64 = 5000;

pub const EASY_TICK_INTERVAL_MS: u64 = 200;
pub const NORMAL_TICK_INTERVAL_MS: u64 = 120;
pub const INSANE_TICK_INTERVAL_MS: u64 = 60;
pub const SPEED_BOOST_MS: u64 = 40;
pub const MIN_TICK_INTERVAL_MS: u64 = 30;

pub const HIGH_SCORE_FILE: &str = "snake_high_scores.yaml";

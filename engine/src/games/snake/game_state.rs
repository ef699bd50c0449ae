use crate::log;
use crate::games::SessionRng;
use crate::settings::SnakeSessionSettings;
use super::grid::Grid;
use super::placement::find_free_cell;
use super::power_up::{ActiveEffects, PowerUp, PowerUpManager};
use super::entity::Snake;
use super::types::{DeathReason, Direction, Point, PowerUpKind};

pub const INITIAL_DIRECTION: Direction = Direction::Up;

/// Result of one step of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Moved,
    AteFood {
        score_delta: u32,
        power_up_spawned: Option<PowerUp>,
    },
    AtePowerUp(PowerUpKind),
    /// The snake did not move.
    Died(DeathReason),
    /// Food was eaten and no free cell is left for the next one.
    BoardFull { score_delta: u32 },
}

impl TickOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TickOutcome::Died(_) | TickOutcome::BoardFull { .. })
    }

    pub fn score_delta(&self) -> u32 {
        match self {
            TickOutcome::AteFood { score_delta, .. } | TickOutcome::BoardFull { score_delta } => {
                *score_delta
            }
            _ => 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SnakeGameState {
    pub grid: Grid,
    pub snake: Snake,
    pub food: Point,
    pub power_ups: PowerUpManager,
    pub effects: ActiveEffects,
    initial_food: Point,
    food_score: u32,
    multiplied_food_score: u32,
}

impl SnakeGameState {
    pub fn new(settings: &SnakeSessionSettings) -> Self {
        Self {
            grid: settings.grid,
            snake: Snake::seed(&settings.grid, INITIAL_DIRECTION),
            food: settings.initial_food,
            power_ups: PowerUpManager::new(
                settings.power_up_spawn_probability,
                settings.power_up_effect_ticks,
                settings.power_up_lifetime_ms,
            ),
            effects: ActiveEffects::default(),
            initial_food: settings.initial_food,
            food_score: settings.food_score,
            multiplied_food_score: settings.multiplied_food_score,
        }
    }

    /// Back to the seed snake, heading up, initial food, no power-up or effects.
    pub fn reset(&mut self) {
        self.snake = Snake::seed(&self.grid, INITIAL_DIRECTION);
        self.food = self.initial_food;
        self.power_ups.clear();
        self.effects.clear();
    }

    pub fn set_snake_direction(&mut self, direction: Direction) -> bool {
        self.snake.request_direction(direction)
    }

    pub fn power_up(&self) -> Option<&PowerUp> {
        self.power_ups.active()
    }

    pub fn update(&mut self, rng: &mut SessionRng, now_ms: i64) -> TickOutcome {
        let direction = self.snake.next_direction();

        let next_head = match self.calculate_next_head_position(direction) {
            Ok(point) => point,
            Err(reason) => return TickOutcome::Died(reason),
        };

        let outcome = if next_head == self.food {
            self.snake.advance(next_head, true);
            let score_delta = if self.effects.is_active(PowerUpKind::Multiplier) {
                self.multiplied_food_score
            } else {
                self.food_score
            };

            match self.place_food(rng) {
                Some(food) => self.food = food,
                None => {
                    self.snake.apply_direction(direction);
                    log!("Board full with {} segments", self.snake.len());
                    return TickOutcome::BoardFull { score_delta };
                }
            }

            let snake = &self.snake;
            let food = self.food;
            let power_up_spawned = self.power_ups.try_spawn(
                &self.grid,
                |p| snake.contains(p) || *p == food,
                rng,
                now_ms,
            );
            if let Some(power_up) = power_up_spawned {
                log!(
                    "{:?} power-up spawned at ({}, {})",
                    power_up.kind,
                    power_up.position.x,
                    power_up.position.y
                );
            }

            TickOutcome::AteFood {
                score_delta,
                power_up_spawned,
            }
        } else if let Some(kind) = self.power_ups.take_if_at(next_head) {
            self.snake.advance(next_head, false);
            self.effects.activate(kind, self.power_ups.effect_ticks());
            TickOutcome::AtePowerUp(kind)
        } else {
            self.snake.advance(next_head, false);
            TickOutcome::Moved
        };

        self.snake.apply_direction(direction);
        self.effects.decrement();

        if let Some(expired) = self.power_ups.expire(now_ms) {
            log!(
                "{:?} power-up at ({}, {}) expired",
                expired.kind,
                expired.position.x,
                expired.position.y
            );
        }

        outcome
    }

    fn calculate_next_head_position(&self, direction: Direction) -> Result<Point, DeathReason> {
        let next_head = self
            .grid
            .offset(self.snake.head(), direction)
            .ok_or(DeathReason::WallCollision)?;

        // The tail has not moved yet, so stepping onto it is a collision too.
        if self.snake.contains(&next_head) {
            return Err(DeathReason::SelfCollision);
        }

        Ok(next_head)
    }

    /// Food avoids the power-up's cell unless that cell is the last one free,
    /// in which case the power-up is removed and the food takes its place.
    /// `None` only once the snake covers the whole board.
    fn place_food(&mut self, rng: &mut SessionRng) -> Option<Point> {
        let power_up = self.power_ups.position();
        let food = match find_free_cell(
            &self.grid,
            |p| self.snake.contains(p) || Some(*p) == power_up,
            rng,
        ) {
            Some(food) => food,
            None => {
                let food = find_free_cell(&self.grid, |p| self.snake.contains(p), rng)?;
                self.power_ups.clear();
                log!("Power-up at ({}, {}) gave way to food", food.x, food.y);
                food
            }
        };
        log!("Food spawned at ({}, {})", food.x, food.y);
        Some(food)
    }
}

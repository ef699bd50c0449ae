use serde::Serialize;

use crate::games::SessionRng;
use super::grid::Grid;
use super::placement::find_free_cell;
use super::types::{Point, PowerUpKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PowerUp {
    pub position: Point,
    pub kind: PowerUpKind,
    pub expires_at_ms: i64,
}

impl PowerUp {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at_ms
    }
}

/// Remaining ticks of each timed effect. The two counters run independently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ActiveEffects {
    pub speed_ticks: u32,
    pub multiplier_ticks: u32,
}

impl ActiveEffects {
    pub fn activate(&mut self, kind: PowerUpKind, ticks: u32) {
        match kind {
            PowerUpKind::Speed => self.speed_ticks = ticks,
            PowerUpKind::Multiplier => self.multiplier_ticks = ticks,
        }
    }

    pub fn decrement(&mut self) {
        self.speed_ticks = self.speed_ticks.saturating_sub(1);
        self.multiplier_ticks = self.multiplier_ticks.saturating_sub(1);
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        match kind {
            PowerUpKind::Speed => self.speed_ticks > 0,
            PowerUpKind::Multiplier => self.multiplier_ticks > 0,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Owns the single optional power-up on the board and the rules for spawning
/// and expiring it.
#[derive(Clone, Debug)]
pub struct PowerUpManager {
    spawn_probability: f32,
    effect_ticks: u32,
    lifetime_ms: i64,
    active: Option<PowerUp>,
}

impl PowerUpManager {
    pub fn new(spawn_probability: f32, effect_ticks: u32, lifetime_ms: i64) -> Self {
        Self {
            spawn_probability,
            effect_ticks,
            lifetime_ms,
            active: None,
        }
    }

    pub fn active(&self) -> Option<&PowerUp> {
        self.active.as_ref()
    }

    pub fn position(&self) -> Option<Point> {
        self.active.map(|power_up| power_up.position)
    }

    pub fn effect_ticks(&self) -> u32 {
        self.effect_ticks
    }

    /// Rolls for a new power-up. Does nothing while one is already on the
    /// board, when the roll fails, or when no free cell is left.
    pub fn try_spawn<F>(
        &mut self,
        grid: &Grid,
        is_occupied: F,
        rng: &mut SessionRng,
        now_ms: i64,
    ) -> Option<PowerUp>
    where
        F: Fn(&Point) -> bool,
    {
        if self.active.is_some() || !rng.chance(self.spawn_probability) {
            return None;
        }

        let kind = if rng.random_bool() {
            PowerUpKind::Speed
        } else {
            PowerUpKind::Multiplier
        };
        let position = find_free_cell(grid, is_occupied, rng)?;

        let power_up = PowerUp {
            position,
            kind,
            expires_at_ms: now_ms.saturating_add(self.lifetime_ms),
        };
        self.active = Some(power_up);
        Some(power_up)
    }

    /// Removes and returns the power-up's kind if it sits on `point`.
    pub fn take_if_at(&mut self, point: Point) -> Option<PowerUpKind> {
        match self.active {
            Some(power_up) if power_up.position == point => {
                self.active = None;
                Some(power_up.kind)
            }
            _ => None,
        }
    }

    /// Removes the power-up once its lifetime has passed.
    pub fn expire(&mut self, now_ms: i64) -> Option<PowerUp> {
        match self.active {
            Some(power_up) if power_up.is_expired(now_ms) => self.active.take(),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, power_up: PowerUp) {
        self.active = Some(power_up);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effects_count_down_to_zero_and_stay() {
        let mut effects = ActiveEffects::default();
        effects.activate(PowerUpKind::Speed, 3);
        effects.activate(PowerUpKind::Multiplier, 1);

        effects.decrement();
        assert_eq!(effects.speed_ticks, 2);
        assert_eq!(effects.multiplier_ticks, 0);
        assert!(!effects.is_active(PowerUpKind::Multiplier));

        effects.decrement();
        effects.decrement();
        effects.decrement();
        assert_eq!(effects, ActiveEffects::default());
    }

    #[test]
    fn test_always_spawns_with_probability_one() {
        let grid = Grid::square(10);
        let mut manager = PowerUpManager::new(1.0, 50, 5000);
        let mut rng = SessionRng::new(42);

        let spawned = manager
            .try_spawn(&grid, |p| p.y == 0, &mut rng, 1_000)
            .unwrap();
        assert_ne!(spawned.position.y, 0);
        assert_eq!(spawned.expires_at_ms, 6_000);
        assert_eq!(manager.active(), Some(&spawned));
    }

    #[test]
    fn test_never_spawns_second_or_with_probability_zero() {
        let grid = Grid::square(10);
        let mut rng = SessionRng::new(42);

        let mut never = PowerUpManager::new(0.0, 50, 5000);
        for _ in 0..100 {
            assert!(never.try_spawn(&grid, |_| false, &mut rng, 0).is_none());
        }

        let mut always = PowerUpManager::new(1.0, 50, 5000);
        let first = always.try_spawn(&grid, |_| false, &mut rng, 0).unwrap();
        assert!(always.try_spawn(&grid, |_| false, &mut rng, 0).is_none());
        assert_eq!(always.active(), Some(&first));
    }

    #[test]
    fn test_spawns_both_kinds() {
        let grid = Grid::square(10);
        let mut rng = SessionRng::new(42);
        let mut seen_speed = false;
        let mut seen_multiplier = false;

        for _ in 0..64 {
            let mut manager = PowerUpManager::new(1.0, 50, 5000);
            match manager.try_spawn(&grid, |_| false, &mut rng, 0).unwrap().kind {
                PowerUpKind::Speed => seen_speed = true,
                PowerUpKind::Multiplier => seen_multiplier = true,
            }
        }
        assert!(seen_speed && seen_multiplier);
    }

    #[test]
    fn test_take_and_expire() {
        let mut manager = PowerUpManager::new(1.0, 50, 5000);
        manager.place(PowerUp {
            position: Point::new(3, 3),
            kind: PowerUpKind::Multiplier,
            expires_at_ms: 100,
        });

        assert_eq!(manager.take_if_at(Point::new(3, 4)), None);
        assert_eq!(manager.expire(100), None);
        assert!(manager.active().is_some());

        assert!(manager.expire(101).is_some());
        assert!(manager.active().is_none());

        manager.place(PowerUp {
            position: Point::new(3, 3),
            kind: PowerUpKind::Multiplier,
            expires_at_ms: 100,
        });
        assert_eq!(manager.take_if_at(Point::new(3, 3)), Some(PowerUpKind::Multiplier));
        assert!(manager.active().is_none());
    }
}

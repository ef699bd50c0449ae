use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl From<(usize, usize)> for Point {
    fn from((x, y): (usize, usize)) -> Self {
        Self::new(x, y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn is_opposite(&self, other: &Direction) -> bool {
        matches!(
            (self, other),
            (Direction::Left, Direction::Right)
                | (Direction::Right, Direction::Left)
                | (Direction::Up, Direction::Down)
                | (Direction::Down, Direction::Up)
        )
    }

    /// Unit vector, y grows downwards.
    pub fn delta(&self) -> (i64, i64) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Arrow keys and WASD, using the key names browsers and terminals report.
    pub fn from_key(key: &str) -> Option<Direction> {
        match key {
            "ArrowUp" | "Up" | "w" | "W" => Some(Direction::Up),
            "ArrowDown" | "Down" | "s" | "S" => Some(Direction::Down),
            "ArrowLeft" | "Left" | "a" | "A" => Some(Direction::Left),
            "ArrowRight" | "Right" | "d" | "D" => Some(Direction::Right),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Insane,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Insane];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Normal => "NORMAL",
            Difficulty::Insane => "INSANE",
        }
    }

    pub fn high_score_key(&self) -> String {
        format!("snake-high-{}", self.as_str())
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PowerUpKind {
    Speed,
    Multiplier,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathReason {
    WallCollision,
    SelfCollision,
}

/// Why a run ended. `BoardFull` is the win: no free cell was left for food.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    Died(DeathReason),
    BoardFull,
}

impl EndReason {
    pub fn is_win(&self) -> bool {
        matches!(self, EndReason::BoardFull)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposites_are_symmetric() {
        for a in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            for b in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
                assert_eq!(a.is_opposite(&b), b.is_opposite(&a));
            }
            assert!(!a.is_opposite(&a));
        }
        assert!(Direction::Up.is_opposite(&Direction::Down));
        assert!(Direction::Left.is_opposite(&Direction::Right));
        assert!(!Direction::Up.is_opposite(&Direction::Left));
    }

    #[test]
    fn test_from_key_maps_arrows_and_wasd() {
        assert_eq!(Direction::from_key("ArrowUp"), Some(Direction::Up));
        assert_eq!(Direction::from_key("w"), Some(Direction::Up));
        assert_eq!(Direction::from_key("a"), Some(Direction::Left));
        assert_eq!(Direction::from_key("ArrowDown"), Some(Direction::Down));
        assert_eq!(Direction::from_key("D"), Some(Direction::Right));
        assert_eq!(Direction::from_key("Enter"), None);
    }

    #[test]
    fn test_high_score_keys() {
        assert_eq!(Difficulty::Easy.high_score_key(), "snake-high-EASY");
        assert_eq!(Difficulty::Normal.high_score_key(), "snake-high-NORMAL");
        assert_eq!(Difficulty::Insane.high_score_key(), "snake-high-INSANE");
    }
}

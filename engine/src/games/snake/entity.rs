use std::collections::{HashSet, VecDeque};

use super::grid::Grid;
use super::types::{Direction, Point};

pub const SEED_LENGTH: usize = 3;

#[derive(Clone, Debug)]
pub struct Snake {
    body: VecDeque<Point>,
    body_set: HashSet<Point>,
    /// Heading applied on the last processed tick.
    direction: Direction,
    /// Heading requested since then, if any.
    pending_direction: Option<Direction>,
}

impl Snake {
    /// Vertical-or-horizontal seed with its head in the middle of the board and
    /// the body trailing away from `direction`.
    pub fn seed(grid: &Grid, direction: Direction) -> Self {
        let head = Point::new(grid.width / 2, grid.height / 2);
        let trailing = match direction {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        };

        let mut body = vec![head];
        let mut segment = head;
        while body.len() < SEED_LENGTH {
            match grid.offset(segment, trailing) {
                Some(next) => {
                    body.push(next);
                    segment = next;
                }
                None => break,
            }
        }

        Self::from_body(body, direction)
    }

    /// Builds a snake from segments listed head first.
    pub fn from_body(segments: impl IntoIterator<Item = Point>, direction: Direction) -> Self {
        let body: VecDeque<Point> = segments.into_iter().collect();
        assert!(!body.is_empty(), "Snake needs at least one segment");
        let body_set = body.iter().copied().collect();

        Self {
            body,
            body_set,
            direction,
            pending_direction: None,
        }
    }

    pub fn head(&self) -> Point {
        *self.body.front().expect("Snake body should never be empty")
    }

    pub fn tail(&self) -> Point {
        *self.body.back().expect("Snake body should never be empty")
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn contains(&self, point: &Point) -> bool {
        self.body_set.contains(point)
    }

    pub fn segments(&self) -> impl Iterator<Item = &Point> {
        self.body.iter()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_direction(&self) -> Option<Direction> {
        self.pending_direction
    }

    /// Heading the next tick will use.
    pub fn next_direction(&self) -> Direction {
        self.pending_direction.unwrap_or(self.direction)
    }

    /// Records a heading request. A request that reverses the last applied
    /// heading is dropped and `false` is returned.
    pub fn request_direction(&mut self, direction: Direction) -> bool {
        if direction.is_opposite(&self.direction) {
            return false;
        }
        self.pending_direction = Some(direction);
        true
    }

    pub fn apply_direction(&mut self, direction: Direction) {
        self.direction = direction;
        self.pending_direction = None;
    }

    /// Prepends `new_head`; the tail stays when `grow` is set.
    pub fn advance(&mut self, new_head: Point, grow: bool) {
        self.body.push_front(new_head);
        self.body_set.insert(new_head);

        if !grow {
            let tail = self
                .body
                .pop_back()
                .expect("Snake body should never be empty");
            self.body_set.remove(&tail);
        }
    }
}

use crate::games::SessionRng;
use super::types::{Direction, Point};

/// Rectangular board bounded by four walls; cells are `0..width` × `0..height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    pub fn capacity(&self) -> usize {
        self.width * self.height
    }

    pub fn is_in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64
    }

    pub fn contains(&self, point: &Point) -> bool {
        point.x < self.width && point.y < self.height
    }

    /// The neighbouring cell in `direction`, or `None` past a wall.
    pub fn offset(&self, point: Point, direction: Direction) -> Option<Point> {
        let (dx, dy) = direction.delta();
        let x = point.x as i64 + dx;
        let y = point.y as i64 + dy;

        if self.is_in_bounds(x, y) {
            Some(Point::new(x as usize, y as usize))
        } else {
            None
        }
    }

    pub fn random_cell(&self, rng: &mut SessionRng) -> Point {
        Point::new(
            rng.random_range(0..self.width),
            rng.random_range(0..self.height),
        )
    }

    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Point::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let grid = Grid::square(20);
        assert!(grid.is_in_bounds(0, 0));
        assert!(grid.is_in_bounds(19, 19));
        assert!(!grid.is_in_bounds(-1, 5));
        assert!(!grid.is_in_bounds(5, -1));
        assert!(!grid.is_in_bounds(20, 0));
        assert!(!grid.is_in_bounds(0, 20));
    }

    #[test]
    fn test_offset_stops_at_walls() {
        let grid = Grid::square(20);
        assert_eq!(grid.offset(Point::new(10, 10), Direction::Up), Some(Point::new(10, 9)));
        assert_eq!(grid.offset(Point::new(10, 10), Direction::Right), Some(Point::new(11, 10)));
        assert_eq!(grid.offset(Point::new(0, 4), Direction::Left), None);
        assert_eq!(grid.offset(Point::new(4, 0), Direction::Up), None);
        assert_eq!(grid.offset(Point::new(19, 4), Direction::Right), None);
        assert_eq!(grid.offset(Point::new(4, 19), Direction::Down), None);
    }

    #[test]
    fn test_random_cell_in_bounds() {
        let grid = Grid::new(7, 3);
        let mut rng = SessionRng::new(42);
        for _ in 0..500 {
            assert!(grid.contains(&grid.random_cell(&mut rng)));
        }
    }

    #[test]
    fn test_cells_cover_board() {
        let grid = Grid::new(4, 3);
        let cells: Vec<Point> = grid.cells().collect();
        assert_eq!(cells.len(), grid.capacity());
        assert_eq!(cells[0], Point::new(0, 0));
        assert_eq!(cells[11], Point::new(3, 2));
    }
}

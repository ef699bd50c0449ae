use crate::games::SessionRng;
use super::grid::Grid;
use super::types::Point;

const SAMPLES_PER_CELL: usize = 4;

/// Picks a uniformly random cell for which `is_occupied` is false.
///
/// Rejection-samples first, which is O(1) expected at the occupancy a snake
/// normally has. After `4 × capacity` misses it chooses among the enumerated
/// free cells instead, so it never spins. Returns `None` when the board has no
/// free cell left.
pub fn find_free_cell<F>(grid: &Grid, is_occupied: F, rng: &mut SessionRng) -> Option<Point>
where
    F: Fn(&Point) -> bool,
{
    let capacity = grid.capacity();
    if capacity == 0 {
        return None;
    }

    for _ in 0..capacity * SAMPLES_PER_CELL {
        let candidate = grid.random_cell(rng);
        if !is_occupied(&candidate) {
            return Some(candidate);
        }
    }

    let free: Vec<Point> = grid.cells().filter(|cell| !is_occupied(cell)).collect();
    rng.pick(&free)
}

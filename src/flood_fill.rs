// Reachable-space estimation
//
// `estimate_open_area` answers "how much room is there around this cell" with a
// breadth-first fill capped at a hop count, so every call stays cheap and its answer
// does not depend on visiting order. `reachable_cells` is the uncapped sweep the target
// selector uses to discard cells the pathfinder could never reach.

use std::collections::VecDeque;

use crate::grid::{Grid, Topology};
use crate::types::Coord;

/// Counts distinct walkable, non-hazard cells within `max_depth` hops of `start`.
///
/// The start cell itself counts as one. An unwalkable or off-board start has no area.
pub fn estimate_open_area(grid: &Grid, start: Coord, max_depth: usize, topology: Topology) -> usize {
    let start_index = match grid.resolve(start, topology).and_then(|c| grid.index_of(c)) {
        Some(index) => index,
        None => return 0,
    };
    if !grid.cell_at(start_index).walkable {
        return 0;
    }

    let mut visited = vec![false; grid.len()];
    let mut queue = VecDeque::new();
    visited[start_index] = true;
    queue.push_back((start_index, 0usize));
    let mut count = 1;

    while let Some((index, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        let coord = grid.cell_at(index).coord();
        for neighbor in grid.neighbors(coord, topology) {
            let next = match grid.index_of(neighbor) {
                Some(i) => i,
                None => continue,
            };
            let cell = grid.cell_at(next);
            if visited[next] || !cell.walkable || cell.hazard {
                continue;
            }
            visited[next] = true;
            count += 1;
            queue.push_back((next, depth + 1));
        }
    }

    count
}

/// Cells connected to a start cell through walkable cells
#[derive(Debug, Clone)]
pub struct ReachableSet {
    width: i32,
    height: i32,
    mask: Vec<bool>,
}

impl ReachableSet {
    pub fn contains(&self, coord: Coord) -> bool {
        if coord.x < 0 || coord.y < 0 || coord.x >= self.width || coord.y >= self.height {
            return false;
        }
        self.mask[(coord.y * self.width + coord.x) as usize]
    }

    /// Number of reachable cells, the start included
    pub fn count(&self) -> usize {
        self.mask.iter().filter(|&&reached| reached).count()
    }
}

/// Uncapped fill from `start` over walkable cells. Hazards are crossable here, matching
/// what the pathfinder allows. The start is included even if it is itself unwalkable.
pub fn reachable_cells(grid: &Grid, start: Coord, topology: Topology) -> ReachableSet {
    let mut mask = vec![false; grid.len()];

    if let Some(start_index) = grid.resolve(start, topology).and_then(|c| grid.index_of(c)) {
        let mut queue = VecDeque::new();
        mask[start_index] = true;
        queue.push_back(start_index);

        while let Some(index) = queue.pop_front() {
            let coord = grid.cell_at(index).coord();
            for neighbor in grid.neighbors(coord, topology) {
                if let Some(next) = grid.index_of(neighbor) {
                    if !mask[next] && grid.cell_at(next).walkable {
                        mask[next] = true;
                        queue.push_back(next);
                    }
                }
            }
        }
    }

    ReachableSet {
        width: grid.width(),
        height: grid.height(),
        mask,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_board_area_is_a_diamond() {
        let grid = Grid::new(21, 21).unwrap();
        // cells within 3 hops of the center: 1 + 4 + 8 + 12
        assert_eq!(estimate_open_area(&grid, Coord::new(10, 10), 3, Topology::Bounded), 25);
        assert_eq!(estimate_open_area(&grid, Coord::new(10, 10), 0, Topology::Bounded), 1);
    }

    #[test]
    fn test_area_is_capped_by_board_size() {
        let grid = Grid::new(11, 11).unwrap();
        assert_eq!(estimate_open_area(&grid, Coord::new(5, 5), 10, Topology::Bounded), 121);
        assert_eq!(estimate_open_area(&grid, Coord::new(0, 0), 10, Topology::Bounded), 66);
        assert_eq!(estimate_open_area(&grid, Coord::new(0, 0), 10, Topology::Wrapped), 121);
    }

    #[test]
    fn test_blocked_or_off_board_start_has_no_area() {
        let mut grid = Grid::new(5, 5).unwrap();
        grid.set_walkable(Coord::new(1, 1), false);
        assert_eq!(estimate_open_area(&grid, Coord::new(1, 1), 10, Topology::Bounded), 0);
        assert_eq!(estimate_open_area(&grid, Coord::new(9, 9), 10, Topology::Bounded), 0);
    }

    #[test]
    fn test_hazards_are_not_counted() {
        let mut grid = Grid::new(5, 1).unwrap();
        grid.mark_hazard(Coord::new(2, 0));
        assert_eq!(estimate_open_area(&grid, Coord::new(0, 0), 10, Topology::Bounded), 2);
    }

    #[test]
    fn test_dead_end_corridor_is_small() {
        // a corridor at y=0 leading to three cells, sealed from the rest of the board
        let mut grid = Grid::new(11, 11).unwrap();
        for x in 0..11 {
            grid.set_walkable(Coord::new(x, 1), false);
        }
        for x in 5..11 {
            grid.set_walkable(Coord::new(x, 0), false);
        }
        assert_eq!(estimate_open_area(&grid, Coord::new(1, 0), 10, Topology::Bounded), 5);
        assert_eq!(estimate_open_area(&grid, Coord::new(5, 5), 10, Topology::Bounded), 99);
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let mut grid = Grid::new(11, 11).unwrap();
        for (x, y) in [(3, 3), (3, 4), (4, 3), (7, 8), (8, 7), (0, 5)] {
            grid.set_walkable(Coord::new(x, y), false);
        }
        let first = estimate_open_area(&grid, Coord::new(5, 5), 4, Topology::Wrapped);
        for _ in 0..50 {
            assert_eq!(estimate_open_area(&grid, Coord::new(5, 5), 4, Topology::Wrapped), first);
        }
    }

    #[test]
    fn test_reachable_cells_respects_walls_and_wrap() {
        let mut grid = Grid::new(5, 5).unwrap();
        for y in 0..5 {
            grid.set_walkable(Coord::new(2, y), false);
        }
        grid.mark_hazard(Coord::new(0, 4));

        let bounded = reachable_cells(&grid, Coord::new(0, 0), Topology::Bounded);
        assert_eq!(bounded.count(), 10);
        assert!(bounded.contains(Coord::new(0, 4)));
        assert!(!bounded.contains(Coord::new(4, 4)));
        assert!(!bounded.contains(Coord::new(-1, 0)));

        let wrapped = reachable_cells(&grid, Coord::new(0, 0), Topology::Wrapped);
        assert_eq!(wrapped.count(), 20);
    }
}

// Weighted shortest-path search (A*) over the annotated grid
//
// Stepping into a cell costs that cell's traversal cost. The heuristic is the
// topology-aware Manhattan distance scaled by the cheapest walkable cost on the board,
// which keeps it admissible when food makes some steps cheaper than 1.0.
// A missing route is an ordinary outcome and comes back as an empty path.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::grid::{Cell, Grid, Topology};
use crate::types::Coord;

/// Cells from source to destination inclusive
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    cells: Vec<Cell>,
}

impl Path {
    /// The "no route" path
    pub fn empty() -> Self {
        Path { cells: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Where the path starts (our head)
    pub fn current(&self) -> Option<&Cell> {
        self.cells.first()
    }

    /// The first step to take
    pub fn next_step(&self) -> Option<&Cell> {
        self.cells.get(1)
    }

    pub fn destination(&self) -> Option<&Cell> {
        self.cells.last()
    }

    /// Empty and single-cell paths carry no move
    pub fn has_next_step(&self) -> bool {
        self.cells.len() >= 2
    }

    /// Sum of the costs of every cell entered
    pub fn cost(&self) -> f64 {
        self.cells.iter().skip(1).map(|c| c.cost).sum()
    }
}

/// Open-set entry; ordered so the max-heap pops the lowest f, then lowest h, then oldest
#[derive(Debug)]
struct OpenNode {
    f: f64,
    h: f64,
    order: u64,
    index: usize,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

/// Finds the cheapest path from `start` to `goal` over walkable cells.
///
/// Returns an empty path when either end is off the board or unwalkable, or when no
/// route exists. `start == goal` yields a single-cell path.
pub fn find_path(grid: &Grid, start: Coord, goal: Coord, topology: Topology) -> Path {
    let start_index = grid.resolve(start, topology).and_then(|c| grid.index_of(c));
    let goal_index = grid.resolve(goal, topology).and_then(|c| grid.index_of(c));
    let (start_index, goal_index) = match (start_index, goal_index) {
        (Some(s), Some(g)) => (s, g),
        _ => return Path::empty(),
    };

    if !grid.cell_at(start_index).walkable || !grid.cell_at(goal_index).walkable {
        return Path::empty();
    }
    if start_index == goal_index {
        return Path {
            cells: vec![*grid.cell_at(start_index)],
        };
    }

    let goal_coord = grid.cell_at(goal_index).coord();
    let scale = match grid.min_walkable_cost() {
        cost if cost.is_finite() => cost,
        _ => 0.0,
    };
    let heuristic = |coord: Coord| grid.distance(coord, goal_coord, topology) as f64 * scale;

    let n = grid.len();
    let mut best_cost = vec![f64::INFINITY; n];
    let mut came_from: Vec<Option<usize>> = vec![None; n];
    let mut closed = vec![false; n];
    let mut open = BinaryHeap::new();
    let mut order = 0u64;

    best_cost[start_index] = 0.0;
    let h = heuristic(grid.cell_at(start_index).coord());
    open.push(OpenNode {
        f: h,
        h,
        order,
        index: start_index,
    });

    while let Some(node) = open.pop() {
        if closed[node.index] {
            continue;
        }
        closed[node.index] = true;

        if node.index == goal_index {
            return reconstruct(grid, &came_from, goal_index);
        }

        let current = grid.cell_at(node.index).coord();
        for neighbor in grid.neighbors(current, topology) {
            let index = match grid.index_of(neighbor) {
                Some(i) => i,
                None => continue,
            };
            let cell = grid.cell_at(index);
            if closed[index] || !cell.walkable {
                continue;
            }

            let tentative = best_cost[node.index] + cell.cost;
            if tentative < best_cost[index] {
                best_cost[index] = tentative;
                came_from[index] = Some(node.index);
                order += 1;
                let h = heuristic(neighbor);
                open.push(OpenNode {
                    f: tentative + h,
                    h,
                    order,
                    index,
                });
            }
        }
    }

    Path::empty()
}

fn reconstruct(grid: &Grid, came_from: &[Option<usize>], goal_index: usize) -> Path {
    let mut cells = vec![*grid.cell_at(goal_index)];
    let mut cursor = goal_index;
    while let Some(previous) = came_from[cursor] {
        cells.push(*grid.cell_at(previous));
        cursor = previous;
    }
    cells.reverse();
    Path { cells }
}

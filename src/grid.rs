// Grid/Cell model
//
// A W×H lattice of cells carrying a walkable flag, a traversal cost and a hazard marker.
// Topology is passed per query: bounded boards reject off-board coordinates, wrapped
// boards reduce them modulo the board size. All wrap handling lives in `resolve`, so
// corners are just the composition of an x-wrap and a y-wrap.

use std::fmt;
use thiserror::Error;

use crate::types::{Coord, Direction};

/// Traversal cost of an untouched cell
pub const DEFAULT_COST: f64 = 1.0;

/// Board edge behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Walls kill: off-board coordinates do not exist
    Bounded,
    /// Toroidal: leaving one edge re-enters from the opposite edge
    Wrapped,
}

impl Topology {
    pub fn is_wrapped(&self) -> bool {
        matches!(self, Topology::Wrapped)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("invalid board dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
    #[error("board {width}x{height} exceeds the {max}x{max} limit")]
    TooLarge { width: i32, height: i32, max: i32 },
    #[error("coordinate ({x}, {y}) is outside the {width}x{height} board")]
    OutOfRange {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
}

/// A single board square
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    pub walkable: bool,
    pub cost: f64,
    pub hazard: bool,
}

impl Cell {
    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

/// Sole owner of every cell on the board, stored row-major from (0, 0)
#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid where every cell is walkable at `DEFAULT_COST`
    pub fn new(width: i32, height: i32) -> Result<Self, GridError> {
        Self::with_cost(width, height, DEFAULT_COST)
    }

    /// Like `with_cost`, but refuses boards wider or taller than `max_dim`
    pub fn with_limit(width: i32, height: i32, cost: f64, max_dim: i32) -> Result<Self, GridError> {
        if width > max_dim || height > max_dim {
            return Err(GridError::TooLarge {
                width,
                height,
                max: max_dim,
            });
        }
        Self::with_cost(width, height, cost)
    }

    pub fn with_cost(width: i32, height: i32, cost: f64) -> Result<Self, GridError> {
        if width <= 0 || height <= 0 {
            return Err(GridError::InvalidDimensions { width, height });
        }

        let cost = cost.max(0.0);
        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| Cell {
                x,
                y,
                walkable: true,
                cost,
                hazard: false,
            })
            .collect();

        Ok(Grid {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of cells on the board
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn in_range(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x < self.width && coord.y < self.height
    }

    /// Maps a coordinate onto the board under the given topology
    pub fn resolve(&self, coord: Coord, topology: Topology) -> Option<Coord> {
        match topology {
            Topology::Bounded if self.in_range(coord) => Some(coord),
            Topology::Bounded => None,
            Topology::Wrapped => Some(Coord::new(
                coord.x.rem_euclid(self.width),
                coord.y.rem_euclid(self.height),
            )),
        }
    }

    pub(crate) fn index_of(&self, coord: Coord) -> Option<usize> {
        if self.in_range(coord) {
            Some((coord.y * self.width + coord.x) as usize)
        } else {
            None
        }
    }

    pub(crate) fn cell_at(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    /// Looks up the cell at (x, y)
    pub fn get(&self, x: i32, y: i32, topology: Topology) -> Result<&Cell, GridError> {
        self.resolve(Coord::new(x, y), topology)
            .and_then(|c| self.index_of(c))
            .map(|i| &self.cells[i])
            .ok_or(GridError::OutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            })
    }

    /// Bounded lookup, `None` off the board
    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.index_of(coord).map(|i| &self.cells[i])
    }

    fn cell_mut(&mut self, coord: Coord) -> Option<&mut Cell> {
        match self.index_of(coord) {
            Some(i) => Some(&mut self.cells[i]),
            None => None,
        }
    }

    pub fn is_walkable(&self, coord: Coord) -> bool {
        self.cell(coord).map_or(false, |c| c.walkable)
    }

    /// The coordinate one step away in `direction`, if it exists under `topology`
    pub fn neighbor(&self, coord: Coord, direction: Direction, topology: Topology) -> Option<Coord> {
        self.resolve(direction.apply(&coord), topology)
    }

    /// Up to four neighbors, always in the order up, down, left, right
    pub fn neighbors(&self, coord: Coord, topology: Topology) -> impl Iterator<Item = Coord> + '_ {
        Direction::all()
            .into_iter()
            .filter_map(move |dir| self.neighbor(coord, dir, topology))
    }

    /// Manhattan distance; under wrap each axis takes the shorter way around
    pub fn distance(&self, a: Coord, b: Coord, topology: Topology) -> i32 {
        let dx = a.x.abs_diff(b.x);
        let dy = a.y.abs_diff(b.y);
        match topology {
            Topology::Bounded => i32::try_from(dx.saturating_add(dy)).unwrap_or(i32::MAX),
            Topology::Wrapped => {
                let dx = (dx % self.width as u32) as i32;
                let dy = (dy % self.height as u32) as i32;
                dx.min(self.width - dx) + dy.min(self.height - dy)
            }
        }
    }

    /// Sets the walkable flag; returns false (and does nothing) off the board
    pub fn set_walkable(&mut self, coord: Coord, walkable: bool) -> bool {
        match self.cell_mut(coord) {
            Some(cell) => {
                cell.walkable = walkable;
                true
            }
            None => false,
        }
    }

    /// Sets the traversal cost, clamped to be non-negative
    pub fn set_cost(&mut self, coord: Coord, cost: f64) -> bool {
        match self.cell_mut(coord) {
            Some(cell) => {
                cell.cost = cost.max(0.0);
                true
            }
            None => false,
        }
    }

    pub fn mark_hazard(&mut self, coord: Coord) -> bool {
        match self.cell_mut(coord) {
            Some(cell) => {
                cell.hazard = true;
                true
            }
            None => false,
        }
    }

    /// All cells in scan order: row by row from y = 0, x fastest
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn walkable_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| c.walkable)
    }

    /// Cheapest cost any step can have; scales the A* heuristic
    pub fn min_walkable_cost(&self) -> f64 {
        self.walkable_cells()
            .map(|c| c.cost)
            .fold(f64::INFINITY, f64::min)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let cell = &self.cells[(y * self.width + x) as usize];
                let symbol = if !cell.walkable {
                    '#'
                } else if cell.hazard {
                    'h'
                } else if cell.cost < DEFAULT_COST {
                    'f'
                } else if cell.cost > DEFAULT_COST {
                    '!'
                } else {
                    '.'
                };
                write!(f, "{}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

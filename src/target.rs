// Target selection
//
// Picks the cell the pathfinder should route to this turn. When hungry we chase the
// nearest food that is safe to eat; otherwise we head for the cell with the most room
// around it. Candidates come back in priority order so the engine can fall through to
// the next one when a route turns out not to exist.

use log::debug;
use rayon::prelude::*;
use std::collections::HashSet;

use crate::config::Config;
use crate::flood_fill::{estimate_open_area, reachable_cells, ReachableSet};
use crate::grid::{Grid, Topology};
use crate::types::{Coord, Snapshot};

/// Why a target was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetReason {
    Food,
    OpenSpace,
}

/// Outcome of target selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Found { cell: Coord, reason: TargetReason },
    None,
}

impl Target {
    pub fn cell(&self) -> Option<Coord> {
        match self {
            Target::Found { cell, .. } => Some(*cell),
            Target::None => None,
        }
    }
}

pub struct TargetSelector<'a> {
    grid: &'a Grid,
    snapshot: Snapshot<'a>,
    config: &'a Config,
    topology: Topology,
    head: Coord,
    reachable: ReachableSet,
    /// Copy of the grid with our head blocked, so areas never leak through ourselves
    space_grid: Grid,
}

impl<'a> TargetSelector<'a> {
    pub fn new(grid: &'a Grid, snapshot: Snapshot<'a>, config: &'a Config, topology: Topology) -> Self {
        let head = snapshot.you.body.first().copied().unwrap_or(snapshot.you.head);
        let reachable = reachable_cells(grid, head, topology);
        let mut space_grid = grid.clone();
        space_grid.set_walkable(head, false);

        TargetSelector {
            grid,
            snapshot,
            config,
            topology,
            head,
            reachable,
            space_grid,
        }
    }

    /// Highest-priority target, or `Target::None` when nothing is reachable
    pub fn select(&self) -> Target {
        self.candidates().into_iter().next().unwrap_or(Target::None)
    }

    /// Every applicable target in priority order
    pub fn candidates(&self) -> Vec<Target> {
        let mut targets = Vec::with_capacity(2);

        if self.is_hungry() {
            let food = self.food_target();
            if food != Target::None {
                targets.push(food);
            }
        }

        let space = self.open_space_target();
        if space != Target::None {
            targets.push(space);
        }

        targets
    }

    fn is_hungry(&self) -> bool {
        self.snapshot.you.health < self.config.strategy.hunger_threshold
            && !self.snapshot.board.food.is_empty()
    }

    fn is_candidate(&self, coord: Coord) -> bool {
        coord != self.head && self.grid.is_walkable(coord) && self.reachable.contains(coord)
    }

    /// Closest safe food; ties go to the earlier entry in the food list
    pub fn food_target(&self) -> Target {
        let occupied: HashSet<Coord> = self
            .snapshot
            .board
            .snakes
            .iter()
            .flat_map(|s| s.body.iter().copied())
            .collect();
        let required_area = (self.snapshot.you.effective_length().max(1) as usize)
            .min(self.config.strategy.dead_end_area);

        let mut best: Option<(Coord, i32)> = None;
        for &food in &self.snapshot.board.food {
            if !self.is_candidate(food) {
                continue;
            }
            if self.next_to_dangerous_head(food) {
                debug!("Skipping food {}: next to a larger snake's head", food);
                continue;
            }
            if self.surrounded(food, &occupied) {
                debug!("Skipping food {}: surrounded by bodies", food);
                continue;
            }
            let area = estimate_open_area(
                &self.space_grid,
                food,
                self.config.strategy.flood_fill_depth,
                self.topology,
            );
            if area < required_area {
                debug!("Skipping food {}: dead end ({} cells)", food, area);
                continue;
            }

            let distance = self.grid.distance(self.head, food, self.topology);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((food, distance));
            }
        }

        match best {
            Some((cell, _)) => Target::Found {
                cell,
                reason: TargetReason::Food,
            },
            None => Target::None,
        }
    }

    /// Reachable cell with the largest open area; ties go to the first in scan order
    pub fn open_space_target(&self) -> Target {
        let candidates: Vec<Coord> = self
            .grid
            .walkable_cells()
            .map(|c| c.coord())
            .filter(|&c| self.is_candidate(c))
            .collect();

        let depth = self.config.strategy.flood_fill_depth;
        let areas: Vec<usize> = candidates
            .par_iter()
            .map(|&c| estimate_open_area(&self.space_grid, c, depth, self.topology))
            .collect();

        let mut best: Option<(Coord, usize)> = None;
        for (&coord, area) in candidates.iter().zip(areas) {
            if best.map_or(true, |(_, a)| area > a) {
                best = Some((coord, area));
            }
        }

        match best {
            Some((cell, area)) => {
                debug!("Open space target {} with area {}", cell, area);
                Target::Found {
                    cell,
                    reason: TargetReason::OpenSpace,
                }
            }
            None => Target::None,
        }
    }

    /// Adjacent to the head of a rival at least as long as us
    fn next_to_dangerous_head(&self, coord: Coord) -> bool {
        let our_length = self.snapshot.you.effective_length();
        self.snapshot
            .rivals()
            .filter(|rival| rival.effective_length() >= our_length)
            .filter_map(|rival| rival.body.first().copied())
            .any(|head| self.grid.neighbors(coord, self.topology).any(|n| n == head))
    }

    /// Every on-board neighbor is a snake segment
    fn surrounded(&self, coord: Coord, occupied: &HashSet<Coord>) -> bool {
        self.grid
            .neighbors(coord, self.topology)
            .all(|n| occupied.contains(&n))
    }
}

// Occupancy & cost annotation
//
// Stamps a fresh grid from the turn's snapshot. Steps run in a fixed order because later
// steps deliberately override earlier ones (food pricing beats rival-head pricing, hazards
// beat food, and our own head is always walkable so the search has a start node).
// Coordinates from a malformed snapshot that fall off the board are skipped.

use log::debug;

use crate::config::Config;
use crate::grid::{Grid, Topology};
use crate::growth::GrowthReport;
use crate::types::Snapshot;

pub struct Annotator<'a> {
    config: &'a Config,
    topology: Topology,
    hazards_lethal: bool,
}

impl<'a> Annotator<'a> {
    pub fn new(config: &'a Config, snapshot: &Snapshot) -> Self {
        Annotator {
            config,
            topology: snapshot.game.topology(&config.rules),
            hazards_lethal: snapshot.game.hazards_lethal(&config.rules),
        }
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Runs every annotation step against `grid`
    pub fn annotate(&self, grid: &mut Grid, snapshot: &Snapshot, growth: &GrowthReport) {
        self.mark_bodies(grid, snapshot);
        self.release_tails(grid, snapshot, growth);
        self.mark_rival_heads(grid, snapshot);
        self.price_food(grid, snapshot);
        self.price_hazards(grid, snapshot);
        self.free_own_head(grid, snapshot);

        debug!("Turn {}: annotated grid\n{}", snapshot.turn, grid);
    }

    /// Every body segment of every snake is solid
    fn mark_bodies(&self, grid: &mut Grid, snapshot: &Snapshot) {
        for snake in &snapshot.board.snakes {
            for segment in &snake.body {
                grid.set_walkable(*segment, false);
            }
        }
    }

    /// Rival tails that will move away this turn become walkable again
    fn release_tails(&self, grid: &mut Grid, snapshot: &Snapshot, growth: &GrowthReport) {
        if snapshot.turn <= self.config.strategy.history_turns {
            return;
        }

        for rival in snapshot.rivals() {
            if growth.did_grow(&rival.id) || rival.tail_is_stacked() {
                continue;
            }
            if let Some(tail) = rival.tail() {
                grid.set_walkable(tail, true);
            }
        }
    }

    /// Squares a rival head can reach next turn: lethal next to an equal or longer rival,
    /// merely expensive next to a shorter one
    fn mark_rival_heads(&self, grid: &mut Grid, snapshot: &Snapshot) {
        let our_length = snapshot.you.effective_length();

        for rival in snapshot.rivals() {
            let head = match rival.body.first() {
                Some(head) if snapshot.board.contains(*head) => *head,
                _ => continue,
            };
            let rival_is_dangerous = rival.effective_length() >= our_length;
            let reachable: Vec<_> = grid.neighbors(head, self.topology).collect();

            for cell in reachable {
                if rival_is_dangerous {
                    grid.set_walkable(cell, false);
                } else {
                    grid.set_cost(cell, self.config.costs.rival_head_cost);
                }
            }
        }
    }

    fn price_food(&self, grid: &mut Grid, snapshot: &Snapshot) {
        for food in &snapshot.board.food {
            grid.set_cost(*food, self.config.costs.food_cost);
        }
    }

    fn price_hazards(&self, grid: &mut Grid, snapshot: &Snapshot) {
        for hazard in &snapshot.board.hazards {
            grid.mark_hazard(*hazard);
            if self.hazards_lethal {
                grid.set_walkable(*hazard, false);
            } else {
                grid.set_cost(*hazard, self.config.costs.hazard_cost);
            }
        }
    }

    fn free_own_head(&self, grid: &mut Grid, snapshot: &Snapshot) {
        if let Some(head) = snapshot.you.body.first() {
            grid.set_walkable(*head, true);
        }
    }
}

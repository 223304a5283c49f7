// Turn engine
//
// One synchronous pass per /move request:
// snapshot -> grid -> annotate -> select target -> path -> decode.
// Targets are tried in priority order; one with no route falls through to the next.
// When nothing routes, a fallback move is picked at random from the safest tier available.

use log::{debug, warn};
use rand::seq::IndexedRandom;

use crate::annotator::Annotator;
use crate::config::Config;
use crate::decoder::direction_for_path;
use crate::grid::{Grid, Topology};
use crate::growth::{GrowthReport, GrowthTracker};
use crate::pathfinder::find_path;
use crate::target::{Target, TargetReason, TargetSelector};
use crate::types::{Board, Coord, Direction, Snapshot};

/// What drove the chosen move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    Food,
    OpenSpace,
    Fallback,
}

impl DecisionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionReason::Food => "food",
            DecisionReason::OpenSpace => "open_space",
            DecisionReason::Fallback => "fallback",
        }
    }
}

impl From<TargetReason> for DecisionReason {
    fn from(reason: TargetReason) -> Self {
        match reason {
            TargetReason::Food => DecisionReason::Food,
            TargetReason::OpenSpace => DecisionReason::OpenSpace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveDecision {
    pub direction: Direction,
    pub target: Option<Coord>,
    pub reason: DecisionReason,
    /// Cells in the followed path, head included; 0 for fallback moves
    pub path_len: usize,
}

impl MoveDecision {
    fn fallback(direction: Direction) -> Self {
        MoveDecision {
            direction,
            target: None,
            reason: DecisionReason::Fallback,
            path_len: 0,
        }
    }
}

/// Full per-turn pipeline. Records this turn's health readings in `growth`.
pub fn compute_move(snapshot: Snapshot, growth: &GrowthTracker, config: &Config) -> MoveDecision {
    let report = growth.observe(&snapshot.game.id, &snapshot.board.snakes, snapshot.turn);

    let grid = match build_grid(snapshot, &report, config) {
        Some(grid) => grid,
        None => return MoveDecision::fallback(Direction::Up),
    };
    let topology = snapshot.game.topology(&config.rules);
    let head = head_of(snapshot);

    let selector = TargetSelector::new(&grid, snapshot, config, topology);
    for target in selector.candidates() {
        let (cell, reason) = match target {
            Target::Found { cell, reason } => (cell, reason),
            Target::None => continue,
        };

        let path = find_path(&grid, head, cell, topology);
        if !path.has_next_step() {
            debug!("Turn {}: no route to {:?} target {}", snapshot.turn, reason, cell);
            continue;
        }

        let direction = direction_for_path(&path, grid.width(), grid.height(), topology);
        debug!(
            "Turn {}: {:?} target {} via {} cells (cost {:.1})",
            snapshot.turn,
            reason,
            cell,
            path.len(),
            path.cost()
        );
        return MoveDecision {
            direction,
            target: Some(cell),
            reason: reason.into(),
            path_len: path.len(),
        };
    }

    warn!("Turn {}: no target reachable, using fallback move", snapshot.turn);
    MoveDecision::fallback(choose_fallback(&grid, snapshot, topology))
}

/// Fallback move computed straight from the snapshot, without growth history.
/// Used when the full pipeline cannot finish in time.
pub fn fallback_direction(snapshot: Snapshot, config: &Config) -> Direction {
    match build_grid(snapshot, &GrowthReport::default(), config) {
        Some(grid) => choose_fallback(&grid, snapshot, snapshot.game.topology(&config.rules)),
        None => Direction::Up,
    }
}

fn build_grid(snapshot: Snapshot, report: &GrowthReport, config: &Config) -> Option<Grid> {
    let board = snapshot.board;
    let mut grid = match Grid::with_limit(
        board.width,
        board.height,
        config.costs.default_cost,
        config.rules.max_board_dim,
    ) {
        Ok(grid) => grid,
        Err(e) => {
            warn!("Turn {}: {}", snapshot.turn, e);
            return None;
        }
    };
    Annotator::new(config, &snapshot).annotate(&mut grid, &snapshot, report);
    Some(grid)
}

fn head_of(snapshot: Snapshot) -> Coord {
    snapshot
        .you
        .body
        .first()
        .copied()
        .unwrap_or(snapshot.you.head)
}

/// Checks if a coordinate collides with any snake body, ignoring the last
/// `body_tail_offset` segments of each snake
fn is_collision(coord: &Coord, board: &Board, body_tail_offset: usize) -> bool {
    board.snakes.iter().any(|snake| {
        let body_check_len = snake.body.len().saturating_sub(body_tail_offset);
        snake.body[..body_check_len].contains(coord)
    })
}

/// Random pick from the first non-empty tier:
/// walkable on the annotated grid, then clear of bodies (tails excepted), then on the board
fn choose_fallback(grid: &Grid, snapshot: Snapshot, topology: Topology) -> Direction {
    let head = head_of(snapshot);
    let moves: Vec<(Direction, Coord)> = Direction::all()
        .into_iter()
        .filter_map(|dir| grid.neighbor(head, dir, topology).map(|next| (dir, next)))
        .collect();

    let tiers: [Vec<Direction>; 3] = [
        moves
            .iter()
            .filter(|(_, next)| grid.is_walkable(*next))
            .map(|(dir, _)| *dir)
            .collect(),
        moves
            .iter()
            .filter(|(_, next)| !is_collision(next, snapshot.board, 1))
            .map(|(dir, _)| *dir)
            .collect(),
        moves.iter().map(|(dir, _)| *dir).collect(),
    ];

    let mut rng = rand::rng();
    for (tier, candidates) in tiers.iter().enumerate() {
        if let Some(direction) = candidates.choose(&mut rng) {
            debug!("Fallback tier {} picked {} from {:?}", tier + 1, direction, candidates);
            return *direction;
        }
    }

    Direction::Up
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Battlesnake, Game};

    fn snake(id: &str, body: &[(i32, i32)], health: i32) -> Battlesnake {
        let body: Vec<Coord> = body.iter().map(|&(x, y)| Coord::new(x, y)).collect();
        Battlesnake {
            id: id.to_string(),
            name: id.to_string(),
            health,
            head: body[0],
            length: body.len() as i32,
            body,
            latency: String::new(),
            shout: None,
        }
    }

    fn board(width: i32, height: i32, snakes: Vec<Battlesnake>) -> Board {
        Board {
            width,
            height,
            food: vec![],
            snakes,
            hazards: vec![],
        }
    }

    fn decide(game: &Game, board: &Board, turn: i32) -> MoveDecision {
        let config = Config::default_hardcoded();
        let tracker = GrowthTracker::new(config.strategy.history_turns);
        compute_move(Snapshot::new(game, turn, board, &board.snakes[0]), &tracker, &config)
    }

    #[test]
    fn test_hungry_snake_heads_for_food() {
        let mut board = board(11, 11, vec![snake("me", &[(5, 5), (5, 4), (5, 3)], 20)]);
        board.food = vec![Coord::new(5, 7), Coord::new(0, 5)];

        let decision = decide(&Game::default(), &board, 10);
        assert_eq!(decision.direction, Direction::Up);
        assert_eq!(decision.reason, DecisionReason::Food);
        assert_eq!(decision.target, Some(Coord::new(5, 7)));
        assert_eq!(decision.path_len, 3);
    }

    #[test]
    fn test_well_fed_snake_seeks_open_space() {
        let board = board(11, 11, vec![snake("me", &[(5, 5), (5, 4), (5, 3)], 100)]);
        let decision = decide(&Game::default(), &board, 10);
        assert_eq!(decision.reason, DecisionReason::OpenSpace);
        assert_ne!(decision.direction, Direction::Down);
    }

    #[test]
    fn test_invalid_dimensions_answer_up() {
        let board = board(0, 11, vec![snake("me", &[(0, 0)], 100)]);
        let decision = decide(&Game::default(), &board, 1);
        assert_eq!(decision, MoveDecision::fallback(Direction::Up));
    }

    #[test]
    fn test_oversized_board_answers_up_without_allocating() {
        let board = board(200_000, 200_000, vec![snake("me", &[(5, 5), (5, 4)], 100)]);
        let decision = decide(&Game::default(), &board, 1);
        assert_eq!(decision, MoveDecision::fallback(Direction::Up));

        let config = Config::default_hardcoded();
        let game = Game::default();
        let snapshot = Snapshot::new(&game, 1, &board, &board.snakes[0]);
        assert_eq!(fallback_direction(snapshot, &config), Direction::Up);
    }

    #[test]
    fn test_rival_head_at_i32_limit_does_not_panic() {
        let board = board(
            11,
            11,
            vec![
                snake("me", &[(5, 5), (5, 4), (5, 3)], 100),
                snake("ghost", &[(i32::MAX, 0), (i32::MAX, 1)], 100),
            ],
        );
        for ruleset in ["standard", "wrapped"] {
            let mut game = Game::default();
            game.ruleset.name = ruleset.to_string();
            let decision = decide(&game, &board, 10);
            assert_ne!(decision.reason, DecisionReason::Fallback);
            assert_ne!(decision.direction, Direction::Down);
        }
    }

    #[test]
    fn test_trapped_snake_falls_back() {
        // only way out is into the equal-length rival's head zone
        let board = board(
            3,
            1,
            vec![snake("me", &[(0, 0)], 100), snake("rival", &[(2, 0)], 100)],
        );
        let decision = decide(&Game::default(), &board, 5);
        assert_eq!(decision.reason, DecisionReason::Fallback);
        // tier 2: (1, 0) holds no body segment
        assert_eq!(decision.direction, Direction::Right);
    }

    #[test]
    fn test_fallback_prefers_tail_over_body() {
        // boxed in by our own body; only the tail cell frees up
        let board = board(
            3,
            3,
            vec![snake(
                "me",
                &[(1, 1), (1, 2), (0, 2), (0, 1), (0, 0), (1, 0), (2, 0), (2, 1)],
                100,
            )],
        );
        let config = Config::default_hardcoded();
        let game = Game::default();
        let snapshot = Snapshot::new(&game, 0, &board, &board.snakes[0]);
        for _ in 0..20 {
            assert_eq!(fallback_direction(snapshot, &config), Direction::Right);
        }
    }

    #[test]
    fn test_fallback_picks_only_from_best_tier() {
        let board = board(11, 11, vec![snake("me", &[(0, 0), (0, 1), (0, 2)], 100)]);
        let config = Config::default_hardcoded();
        let game = Game::default();
        let snapshot = Snapshot::new(&game, 0, &board, &board.snakes[0]);
        for _ in 0..20 {
            assert_eq!(fallback_direction(snapshot, &config), Direction::Right);
        }
    }

    #[test]
    fn test_fallback_on_wrapped_board_uses_the_edge() {
        let mut game = Game::default();
        game.ruleset.name = "wrapped".to_string();
        let board = board(
            11,
            11,
            vec![snake("me", &[(0, 5), (0, 6), (1, 6), (1, 5), (1, 4), (0, 4)], 100)],
        );
        let config = Config::default_hardcoded();
        let snapshot = Snapshot::new(&game, 0, &board, &board.snakes[0]);
        assert_eq!(fallback_direction(snapshot, &config), Direction::Left);
    }

    #[test]
    fn test_is_collision_respects_tail_offset() {
        let board = board(5, 5, vec![snake("me", &[(2, 2), (2, 1), (2, 0)], 100)]);
        assert!(is_collision(&Coord::new(2, 0), &board, 0));
        assert!(!is_collision(&Coord::new(2, 0), &board, 1));
        assert!(is_collision(&Coord::new(2, 1), &board, 1));
    }

    #[test]
    fn test_compute_move_records_growth() {
        let config = Config::default_hardcoded();
        let tracker = GrowthTracker::new(config.strategy.history_turns);
        let mut game = Game::default();
        game.id = "g1".to_string();
        let board = board(11, 11, vec![snake("me", &[(5, 5), (5, 4), (5, 3)], 90)]);

        compute_move(Snapshot::new(&game, 1, &board, &board.snakes[0]), &tracker, &config);
        assert_eq!(tracker.tracked_games(), 1);
    }
}

// Welcome to
// __________         __    __  .__                               __
// \______   \_____ _/  |__/  |_|  |   ____   ______ ____ _____  |  | __ ____
//  |    |  _/\__  \\   __\   __\  | _/ __ \ /  ___//    \\__  \ |  |/ // __ \
//  |    |   \ / __ \|  |  |  | |  |_\  ___/ \___ \|   |  \/ __ \|    <\  ___/
//  |________/(______/__|  |__| |____/\_____>______>___|__(______/__|__\\_____>
//
// Endpoint-facing side of the snake. Each /move runs the turn engine on a blocking
// worker under the configured time budget and answers with a fallback move if the
// worker does not finish in time.
// For more info see docs.battlesnake.com

use log::{info, warn};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::debug_logger::DebugLogger;
use crate::engine::{compute_move, fallback_direction, DecisionReason, MoveDecision};
use crate::growth::GrowthTracker;
use crate::types::{Battlesnake, Board, Game, GameState, Snapshot};

/// Battlesnake Bot with OOP-style API
/// Takes static configuration dependencies and exposes methods corresponding to API endpoints
pub struct Bot {
    config: Arc<Config>,
    growth: Arc<GrowthTracker>,
    debug_logger: DebugLogger,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration and no debug log
    pub fn new(config: Config) -> Self {
        Self::with_debug_logger(config, DebugLogger::disabled())
    }

    pub fn with_debug_logger(config: Config, debug_logger: DebugLogger) -> Self {
        let growth = Arc::new(GrowthTracker::with_max_games(
            config.strategy.history_turns,
            config.strategy.max_tracked_games,
        ));
        Bot {
            config: Arc::new(config),
            growth,
            debug_logger,
        }
    }

    /// Returns bot metadata and appearance
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        json!({
            "apiversion": "1",
            "author": "pathy-snake",
            "color": "#4287f5",
            "head": "default",
            "tail": "default",
        })
    }

    /// Called when a game starts
    /// Corresponds to POST /start endpoint
    pub fn start(&self, game: &Game, _turn: &i32, board: &Board, _you: &Battlesnake) {
        info!(
            "GAME START {} ({} on {}x{}, {} snakes)",
            game.id,
            game.ruleset.name,
            board.width,
            board.height,
            board.snakes.len()
        );
    }

    /// Called when a game ends; drops the game's growth history
    /// Corresponds to POST /end endpoint
    pub fn end(&self, game: &Game, turn: &i32, _board: &Board, _you: &Battlesnake) {
        self.growth.forget_game(&game.id);
        info!("GAME OVER {} after {} turns", game.id, turn);
    }

    /// Synchronous decision for one turn, sharing this bot's growth history
    pub fn decide(&self, game: &Game, turn: i32, board: &Board, you: &Battlesnake) -> MoveDecision {
        compute_move(Snapshot::new(game, turn, board, you), &self.growth, &self.config)
    }

    /// Computes and returns the next move
    /// Corresponds to POST /move endpoint
    ///
    /// The engine runs on tokio's blocking pool. If it misses the budget, or the
    /// worker panics, a fallback move is computed from the snapshot instead.
    pub async fn get_move(&self, game: &Game, turn: &i32, board: &Board, you: &Battlesnake) -> Value {
        let start_time = Instant::now();
        let turn = *turn;

        let state = GameState {
            game: game.clone(),
            turn,
            board: board.clone(),
            you: you.clone(),
        };
        let worker_state = state.clone();
        let growth = self.growth.clone();
        let config = self.config.clone();

        let worker = tokio::task::spawn_blocking(move || {
            let snapshot = Snapshot::new(
                &worker_state.game,
                worker_state.turn,
                &worker_state.board,
                &worker_state.you,
            );
            compute_move(snapshot, &growth, &config)
        });

        let budget = Duration::from_millis(self.config.timing.effective_budget_ms());
        let decision = match tokio::time::timeout(budget, worker).await {
            Ok(Ok(decision)) => decision,
            Ok(Err(e)) => {
                warn!("Turn {}: move worker failed ({}), using fallback", turn, e);
                self.fallback(&state)
            }
            Err(_) => {
                warn!("Turn {}: move worker exceeded {}ms, using fallback", turn, budget.as_millis());
                self.fallback(&state)
            }
        };

        info!(
            "Turn {}: Chose {} ({}, target: {:?}, path: {}, time: {}ms)",
            turn,
            decision.direction,
            decision.reason.as_str(),
            decision.target,
            decision.path_len,
            start_time.elapsed().as_millis()
        );

        self.debug_logger.log_move(state, &decision);

        json!({ "move": decision.direction.as_str() })
    }

    fn fallback(&self, state: &GameState) -> MoveDecision {
        let snapshot = Snapshot::new(&state.game, state.turn, &state.board, &state.you);
        MoveDecision {
            direction: fallback_direction(snapshot, &self.config),
            target: None,
            reason: DecisionReason::Fallback,
            path_len: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coord, Direction};

    fn snake(body: &[(i32, i32)], health: i32) -> Battlesnake {
        let body: Vec<Coord> = body.iter().map(|&(x, y)| Coord::new(x, y)).collect();
        Battlesnake {
            id: "me".to_string(),
            name: "me".to_string(),
            health,
            head: body[0],
            length: body.len() as i32,
            body,
            latency: String::new(),
            shout: None,
        }
    }

    fn game(id: &str) -> Game {
        Game {
            id: id.to_string(),
            ..Game::default()
        }
    }

    #[test]
    fn test_info_reports_api_version() {
        let bot = Bot::new(Config::default_hardcoded());
        let info = bot.info();
        assert_eq!(info["apiversion"], "1");
        assert!(info["color"].as_str().unwrap().starts_with('#'));
    }

    #[tokio::test]
    async fn test_get_move_returns_move_json() {
        let bot = Bot::new(Config::default_hardcoded());
        let you = snake(&[(2, 0), (1, 0), (0, 0)], 90);
        let board = Board {
            width: 11,
            height: 11,
            food: vec![],
            snakes: vec![you.clone()],
            hazards: vec![],
        };

        let response = bot.get_move(&game("g"), &5, &board, &you).await;
        let chosen: Direction = response["move"].as_str().unwrap().parse().unwrap();
        assert_ne!(chosen, Direction::Left);
    }

    #[tokio::test]
    async fn test_zero_budget_still_answers_a_safe_move() {
        let mut config = Config::default_hardcoded();
        config.timing.response_time_budget_ms = config.timing.network_overhead_ms;
        assert_eq!(config.timing.effective_budget_ms(), 0);
        let bot = Bot::new(config);

        // cornered: up is the only move that neither leaves the board nor hits the neck
        let you = snake(&[(0, 0), (1, 0), (2, 0)], 90);
        let board = Board {
            width: 11,
            height: 11,
            food: vec![],
            snakes: vec![you.clone()],
            hazards: vec![],
        };

        for turn in 0..10 {
            let response = bot.get_move(&game("slow"), &turn, &board, &you).await;
            assert_eq!(response, json!({ "move": "up" }));
        }
    }

    #[test]
    fn test_end_forgets_game_history() {
        let bot = Bot::new(Config::default_hardcoded());
        let you = snake(&[(5, 5), (5, 4), (5, 3)], 90);
        let board = Board {
            width: 11,
            height: 11,
            food: vec![],
            snakes: vec![you.clone()],
            hazards: vec![],
        };

        bot.decide(&game("a"), 1, &board, &you);
        bot.decide(&game("b"), 1, &board, &you);
        assert_eq!(bot.growth.tracked_games(), 2);

        bot.end(&game("a"), &1, &board, &you);
        assert_eq!(bot.growth.tracked_games(), 1);
    }
}

// Cross-turn growth tracking
//
// Health jumps back to 100 when a snake eats, and otherwise decays by at least one per
// turn. Comparing each snake's health against the previous turn's reading therefore tells
// us whether it ate last turn, and so whether its tail is about to move out of the way.
//
// This is the only state that outlives a single turn. Records are scoped per game id so
// concurrent games never clobber each other, and the whole map sits behind one mutex.
// Games normally leave on /end; when one never arrives the least recently touched game
// is evicted once `max_games` are tracked.

use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::types::Battlesnake;

/// Games tracked at once unless configured otherwise
pub const DEFAULT_MAX_GAMES: usize = 1024;

#[derive(Debug, Default)]
struct GameRecord {
    /// Early turn on which the records were last reset
    seeded_turn: Option<i32>,
    health: HashMap<String, i32>,
    /// Tracker tick of the last observation
    last_touched: u64,
}

impl GameRecord {
    fn record(&mut self, snake: &Battlesnake, turn: i32, history_turns: i32) -> bool {
        let grew = if turn <= history_turns {
            if self.seeded_turn != Some(turn) {
                self.health.clear();
                self.seeded_turn = Some(turn);
            }
            false
        } else {
            self.seeded_turn = None;
            match self.health.get(&snake.id) {
                Some(&previous) => snake.health >= previous,
                // Never seen: keep its tail solid
                None => true,
            }
        };

        self.health.insert(snake.id.clone(), snake.health);
        grew
    }
}

/// Growth judgement for every snake observed on one turn
#[derive(Debug, Default, Clone)]
pub struct GrowthReport {
    grew: HashMap<String, bool>,
}

impl GrowthReport {
    /// Snakes missing from the report are assumed to have grown
    pub fn did_grow(&self, snake_id: &str) -> bool {
        self.grew.get(snake_id).copied().unwrap_or(true)
    }
}

#[derive(Debug, Default)]
struct Games {
    records: HashMap<String, GameRecord>,
    tick: u64,
}

impl Games {
    /// The game's record, evicting the stalest game first if a new one would exceed `max_games`
    fn touch(&mut self, game_id: &str, max_games: usize) -> &mut GameRecord {
        self.tick += 1;
        if !self.records.contains_key(game_id) && self.records.len() >= max_games {
            let stalest = self
                .records
                .iter()
                .min_by_key(|(_, record)| record.last_touched)
                .map(|(id, _)| id.clone());
            if let Some(id) = stalest {
                debug!("Evicting growth records of stale game {}", id);
                self.records.remove(&id);
            }
        }

        let record = self.records.entry(game_id.to_string()).or_default();
        record.last_touched = self.tick;
        record
    }
}

/// Remembers the last observed health of every snake, per game
#[derive(Debug)]
pub struct GrowthTracker {
    games: Mutex<Games>,
    history_turns: i32,
    max_games: usize,
}

impl GrowthTracker {
    /// # Arguments
    /// * `history_turns` - turns at or below this reset the game's records
    pub fn new(history_turns: i32) -> Self {
        Self::with_max_games(history_turns, DEFAULT_MAX_GAMES)
    }

    /// Tracker that keeps at most `max_games` games (at least one)
    pub fn with_max_games(history_turns: i32, max_games: usize) -> Self {
        GrowthTracker {
            games: Mutex::new(Games::default()),
            history_turns,
            max_games: max_games.max(1),
        }
    }

    /// Records `snake`'s health for this turn and reports whether it grew since the last one.
    ///
    /// On early turns the game's records are reset and seeded, and the answer is always
    /// false. Later, a snake grew iff its health did not drop.
    pub fn record_and_did_grow(&self, game_id: &str, snake: &Battlesnake, turn: i32) -> bool {
        let mut games = self.games.lock();
        games
            .touch(game_id, self.max_games)
            .record(snake, turn, self.history_turns)
    }

    /// Records every snake on the board under a single lock
    pub fn observe(&self, game_id: &str, snakes: &[Battlesnake], turn: i32) -> GrowthReport {
        let mut games = self.games.lock();
        let record = games.touch(game_id, self.max_games);

        let grew: HashMap<String, bool> = snakes
            .iter()
            .map(|snake| {
                let grew = record.record(snake, turn, self.history_turns);
                (snake.id.clone(), grew)
            })
            .collect();

        debug!("Turn {}: growth {:?}", turn, grew);
        GrowthReport { grew }
    }

    /// Drops everything remembered about a finished game
    pub fn forget_game(&self, game_id: &str) {
        self.games.lock().records.remove(game_id);
    }

    pub fn tracked_games(&self) -> usize {
        self.games.lock().records.len()
    }
}

// Debug logging module for asynchronous game state logging
//
// Fire-and-forget JSONL writer: every /move snapshot is appended together with the move
// we answered, so a game can be replayed offline with the `replay` binary.

use log::error;
use serde::Serialize;
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::engine::MoveDecision;
use crate::types::{Coord, GameState};

/// One line of the debug log
#[derive(Debug, Serialize)]
struct DebugLogEntry {
    #[serde(flatten)]
    state: GameState,
    chosen_move: String,
    reason: String,
    target: Option<Coord>,
    timestamp: String,
}

/// Shared debug logger state
/// Uses Arc<Mutex<File>> to allow concurrent async writes from multiple tasks
#[derive(Clone)]
pub struct DebugLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Debug logging enabled: {}", log_file_path);
                DebugLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs a move decision without waiting for the write
    pub fn log_move(&self, state: GameState, decision: &MoveDecision) {
        if !self.enabled {
            return;
        }

        let file_handle = self.file.clone();
        let entry = DebugLogEntry {
            state,
            chosen_move: decision.direction.as_str().to_string(),
            reason: decision.reason.as_str().to_string(),
            target: decision.target,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        tokio::spawn(async move {
            Self::write_entry(file_handle, entry).await;
        });
    }

    async fn write_entry(file_handle: Arc<Mutex<Option<File>>>, entry: DebugLogEntry) {
        let mut file_guard = file_handle.lock().await;
        let file = match file_guard.as_mut() {
            Some(file) => file,
            None => return,
        };

        let json_line = match serde_json::to_string(&entry) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to serialize debug log entry: {}", e);
                return;
            }
        };

        let line_with_newline = format!("{}\n", json_line);
        if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
            error!("Failed to write debug log entry: {}", e);
        } else if let Err(e) = file.flush().await {
            error!("Failed to flush debug log: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DecisionReason;
    use crate::replay::LogEntry;
    use crate::types::{Battlesnake, Board, Direction, Game};
    use std::time::Duration;

    fn state() -> GameState {
        let you = Battlesnake {
            id: "me".to_string(),
            name: "me".to_string(),
            health: 90,
            body: vec![Coord::new(1, 1), Coord::new(1, 0)],
            head: Coord::new(1, 1),
            length: 2,
            latency: String::new(),
            shout: None,
        };
        GameState {
            game: Game {
                id: "game-1".to_string(),
                ..Game::default()
            },
            turn: 7,
            board: Board {
                width: 11,
                height: 11,
                food: vec![Coord::new(4, 4)],
                snakes: vec![you.clone()],
                hazards: vec![],
            },
            you,
        }
    }

    #[tokio::test]
    async fn test_disabled_logger_writes_nothing() {
        let logger = DebugLogger::new(false, "unused.jsonl").await;
        assert!(!logger.is_enabled());
        logger.log_move(
            state(),
            &MoveDecision {
                direction: Direction::Up,
                target: None,
                reason: DecisionReason::Fallback,
                path_len: 0,
            },
        );
    }

    #[tokio::test]
    async fn test_logged_line_parses_as_replay_entry() {
        let path = std::env::temp_dir().join(format!("pathy_debug_{}.jsonl", std::process::id()));
        let path_str = path.to_string_lossy().to_string();
        let logger = DebugLogger::new(true, &path_str).await;
        assert!(logger.is_enabled());

        logger.log_move(
            state(),
            &MoveDecision {
                direction: Direction::Right,
                target: Some(Coord::new(4, 4)),
                reason: DecisionReason::Food,
                path_len: 7,
            },
        );

        let mut contents = String::new();
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            contents = tokio::fs::read_to_string(&path).await.unwrap_or_default();
            if contents.ends_with('\n') {
                break;
            }
        }
        let _ = tokio::fs::remove_file(&path).await;

        let entry: LogEntry = serde_json::from_str(contents.trim()).unwrap();
        assert_eq!(entry.turn, 7);
        assert_eq!(entry.game.id, "game-1");
        assert_eq!(entry.chosen_move, "right");
        assert_eq!(entry.reason, "food");
        assert_eq!(entry.target, Some(Coord::new(4, 4)));
        assert_eq!(entry.you.id, "me");
    }
}

// Battlesnake API Types
// See https://docs.battlesnake.com/api

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::config::RulesConfig;
use crate::grid::Topology;

/// Ruleset block of the game object
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Ruleset {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub settings: Value,
}

/// Game metadata including ID, ruleset, map and timeout
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Game {
    pub id: String,
    #[serde(default)]
    pub ruleset: Ruleset,
    #[serde(default)]
    pub map: String,
    #[serde(default)]
    pub timeout: u32,
    #[serde(default)]
    pub source: String,
}

impl Game {
    /// Board topology implied by the ruleset name
    pub fn topology(&self, rules: &RulesConfig) -> Topology {
        if self.ruleset.name == rules.wrapped_ruleset {
            Topology::Wrapped
        } else {
            Topology::Bounded
        }
    }

    /// Whether stepping into a hazard is fatal under the active ruleset or map
    pub fn hazards_lethal(&self, rules: &RulesConfig) -> bool {
        rules
            .lethal_hazard_rulesets
            .iter()
            .any(|name| *name == self.ruleset.name)
            || rules.lethal_hazard_maps.iter().any(|map| *map == self.map)
    }
}

/// Board state including dimensions, food, snakes, and hazards
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Board {
    pub height: i32,
    pub width: i32,
    #[serde(default)]
    pub food: Vec<Coord>,
    pub snakes: Vec<Battlesnake>,
    #[serde(default)]
    pub hazards: Vec<Coord>,
}

impl Board {
    /// True when the coordinate lies on the board (ignoring wrap)
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x < self.width && coord.y < self.height
    }
}

/// Snake representation with all state information
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Battlesnake {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub health: i32,
    pub body: Vec<Coord>,
    pub head: Coord,
    #[serde(default)]
    pub length: i32,
    #[serde(default)]
    pub latency: String,
    #[serde(default)]
    pub shout: Option<String>,
}

impl Battlesnake {
    /// Reported length, falling back to the body size when the field is missing
    pub fn effective_length(&self) -> i32 {
        if self.length > 0 {
            self.length
        } else {
            self.body.len() as i32
        }
    }

    pub fn tail(&self) -> Option<Coord> {
        self.body.last().copied()
    }

    /// A snake that ate on the previous turn has its tail segment duplicated
    pub fn tail_is_stacked(&self) -> bool {
        let n = self.body.len();
        n >= 2 && self.body[n - 1] == self.body[n - 2]
    }
}

/// 2D coordinate on the board
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// Plain Manhattan distance, ignoring wrap
    pub fn manhattan_distance(&self, other: &Coord) -> i32 {
        let distance = self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y));
        i32::try_from(distance).unwrap_or(i32::MAX)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Represents the four possible movement directions for a Battlesnake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns all possible directions
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
    }

    /// Converts direction to string representation for API response
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Calculates the next coordinate when moving in this direction.
    /// The result may be off the board; wrap is resolved by the grid.
    /// Arithmetic wraps at the i32 limits so malformed input cannot overflow.
    pub fn apply(&self, coord: &Coord) -> Coord {
        match self {
            Direction::Up => Coord { x: coord.x, y: coord.y.wrapping_add(1) },
            Direction::Down => Coord { x: coord.x, y: coord.y.wrapping_sub(1) },
            Direction::Left => Coord { x: coord.x.wrapping_sub(1), y: coord.y },
            Direction::Right => Coord { x: coord.x.wrapping_add(1), y: coord.y },
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(format!("Invalid direction: {}", s)),
        }
    }
}

/// Complete game state received from the API
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GameState {
    pub game: Game,
    pub turn: i32,
    pub board: Board,
    pub you: Battlesnake,
}

/// Borrowed view over one turn's snapshot, handed to the engine
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub game: &'a Game,
    pub turn: i32,
    pub board: &'a Board,
    pub you: &'a Battlesnake,
}

impl<'a> Snapshot<'a> {
    pub fn new(game: &'a Game, turn: i32, board: &'a Board, you: &'a Battlesnake) -> Self {
        Snapshot {
            game,
            turn,
            board,
            you,
        }
    }

    /// Snakes other than ours
    pub fn rivals(&self) -> impl Iterator<Item = &'a Battlesnake> + '_ {
        let you_id = self.you.id.as_str();
        self.board.snakes.iter().filter(move |s| s.id != you_id)
    }
}

// Library exports for the pathfinding Battlesnake
// The server binary and the replay tool both drive the engine through these modules

pub mod annotator;
pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod decoder;
pub mod engine;
pub mod flood_fill;
pub mod grid;
pub mod growth;
pub mod pathfinder;
pub mod replay;
pub mod target;
pub mod types;

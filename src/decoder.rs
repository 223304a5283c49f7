// Direction decoding
//
// Turns the first step of a path into a move. On wrapped boards a step from x = 0 to
// x = width - 1 is a single move left through the edge, not a long jump right.

use log::warn;
use thiserror::Error;

use crate::grid::Topology;
use crate::pathfinder::Path;
use crate::types::{Coord, Direction};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("path has no next step")]
    NoStep,
    #[error("step from {from} to {to} does not move")]
    Stationary { from: Coord, to: Coord },
    #[error("step from {from} to {to} changes both axes")]
    Diagonal { from: Coord, to: Coord },
    #[error("step from {from} to {to} is not a single move on a {width}x{height} board")]
    NotAdjacent {
        from: Coord,
        to: Coord,
        width: i32,
        height: i32,
    },
}

/// Single-axis decode: ordinary ±1 first, then the wrap across the edge
fn axis_step(
    from: i32,
    to: i32,
    size: i32,
    topology: Topology,
    forward: Direction,
    backward: Direction,
) -> Option<Direction> {
    if to == from + 1 {
        Some(forward)
    } else if to == from - 1 {
        Some(backward)
    } else if topology.is_wrapped() && from == size - 1 && to == 0 {
        Some(forward)
    } else if topology.is_wrapped() && from == 0 && to == size - 1 {
        Some(backward)
    } else {
        None
    }
}

/// Decodes one step between adjacent cells into a move
pub fn decode_step(
    from: Coord,
    to: Coord,
    width: i32,
    height: i32,
    topology: Topology,
) -> Result<Direction, DecodeError> {
    let not_adjacent = || DecodeError::NotAdjacent {
        from,
        to,
        width,
        height,
    };

    match (from.x != to.x, from.y != to.y) {
        (false, false) => Err(DecodeError::Stationary { from, to }),
        (true, true) => Err(DecodeError::Diagonal { from, to }),
        (true, false) => axis_step(
            from.x,
            to.x,
            width,
            topology,
            Direction::Right,
            Direction::Left,
        )
        .ok_or_else(not_adjacent),
        (false, true) => axis_step(
            from.y,
            to.y,
            height,
            topology,
            Direction::Up,
            Direction::Down,
        )
        .ok_or_else(not_adjacent),
    }
}

/// Decodes the first step of `path`
pub fn decode_path(
    path: &Path,
    width: i32,
    height: i32,
    topology: Topology,
) -> Result<Direction, DecodeError> {
    match (path.current(), path.next_step()) {
        (Some(from), Some(to)) => decode_step(from.coord(), to.coord(), width, height, topology),
        _ => Err(DecodeError::NoStep),
    }
}

/// Production wrapper: a malformed path still yields a move
pub fn direction_for_path(path: &Path, width: i32, height: i32, topology: Topology) -> Direction {
    decode_path(path, width, height, topology).unwrap_or_else(|e| {
        warn!("Could not decode path step ({}), defaulting to up", e);
        Direction::Up
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::pathfinder::find_path;

    fn step(from: (i32, i32), to: (i32, i32), topology: Topology) -> Result<Direction, DecodeError> {
        decode_step(
            Coord::new(from.0, from.1),
            Coord::new(to.0, to.1),
            11,
            11,
            topology,
        )
    }

    #[test]
    fn test_ordinary_steps() {
        for topology in [Topology::Bounded, Topology::Wrapped] {
            assert_eq!(step((5, 5), (5, 6), topology), Ok(Direction::Up));
            assert_eq!(step((5, 5), (5, 4), topology), Ok(Direction::Down));
            assert_eq!(step((5, 5), (4, 5), topology), Ok(Direction::Left));
            assert_eq!(step((5, 5), (6, 5), topology), Ok(Direction::Right));
        }
    }

    #[test]
    fn test_wrap_steps_decode_through_the_edge() {
        let w = Topology::Wrapped;
        assert_eq!(step((0, 3), (10, 3), w), Ok(Direction::Left));
        assert_eq!(step((10, 3), (0, 3), w), Ok(Direction::Right));
        assert_eq!(step((3, 0), (3, 10), w), Ok(Direction::Down));
        assert_eq!(step((3, 10), (3, 0), w), Ok(Direction::Up));
    }

    #[test]
    fn test_wrap_steps_rejected_on_bounded_board() {
        assert!(matches!(
            step((0, 3), (10, 3), Topology::Bounded),
            Err(DecodeError::NotAdjacent { .. })
        ));
    }

    #[test]
    fn test_two_wide_wrapped_board_prefers_ordinary_move() {
        let from = Coord::new(0, 0);
        let to = Coord::new(1, 0);
        assert_eq!(
            decode_step(from, to, 2, 2, Topology::Wrapped),
            Ok(Direction::Right)
        );
    }

    #[test]
    fn test_contract_violations_are_errors() {
        assert_eq!(
            step((4, 4), (4, 4), Topology::Bounded),
            Err(DecodeError::Stationary {
                from: Coord::new(4, 4),
                to: Coord::new(4, 4)
            })
        );
        assert!(matches!(
            step((4, 4), (5, 5), Topology::Wrapped),
            Err(DecodeError::Diagonal { .. })
        ));
        assert!(matches!(
            step((4, 4), (7, 4), Topology::Wrapped),
            Err(DecodeError::NotAdjacent { .. })
        ));
    }

    #[test]
    fn test_trivial_path_has_no_step() {
        let grid = Grid::new(11, 11).unwrap();
        let path = find_path(&grid, Coord::new(1, 1), Coord::new(1, 1), Topology::Bounded);
        assert_eq!(decode_path(&path, 11, 11, Topology::Bounded), Err(DecodeError::NoStep));
        assert_eq!(
            direction_for_path(&path, 11, 11, Topology::Bounded),
            Direction::Up
        );
    }

    #[test]
    fn test_every_wrapped_path_step_decodes() {
        let grid = Grid::new(11, 11).unwrap();
        for cell in grid.cells() {
            for dir in Direction::all() {
                let next = grid.neighbor(cell.coord(), dir, Topology::Wrapped).unwrap();
                assert_eq!(
                    decode_step(cell.coord(), next, 11, 11, Topology::Wrapped),
                    Ok(dir)
                );
            }
        }
    }
}

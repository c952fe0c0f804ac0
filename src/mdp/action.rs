//! The four cardinal moves and their bijection onto action-vector slots.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::mdp::grid::Position;

/// Number of actions available in every cell.
pub const NUM_ACTIONS: usize = 4;

/// A cardinal direction. Variants are listed clockwise, which is also the
/// canonical slot order inside an action-value vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    North,
    East,
    South,
    West,
}

impl Action {
    /// All actions in canonical order.
    pub const ALL: [Action; NUM_ACTIONS] = [Action::North, Action::East, Action::South, Action::West];

    /// Slot of this action inside a `[f64; NUM_ACTIONS]` vector.
    pub fn index(self) -> usize {
        match self {
            Action::North => 0,
            Action::East => 1,
            Action::South => 2,
            Action::West => 3,
        }
    }

    /// Inverse of [`Action::index`].
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidAction` for any index outside `0..NUM_ACTIONS`.
    pub fn from_index(index: usize) -> Result<Self> {
        match index {
            0 => Ok(Action::North),
            1 => Ok(Action::East),
            2 => Ok(Action::South),
            3 => Ok(Action::West),
            _ => Err(Error::InvalidAction(format!("no action at index {}", index))),
        }
    }

    /// Neighbouring action one quarter turn clockwise.
    pub fn rotate_cw(self) -> Self {
        match self {
            Action::North => Action::East,
            Action::East => Action::South,
            Action::South => Action::West,
            Action::West => Action::North,
        }
    }

    /// Neighbouring action one quarter turn counter-clockwise.
    pub fn rotate_ccw(self) -> Self {
        match self {
            Action::North => Action::West,
            Action::East => Action::North,
            Action::South => Action::East,
            Action::West => Action::South,
        }
    }

    /// Row and column offset of a single move.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Action::North => (-1, 0),
            Action::East => (0, 1),
            Action::South => (1, 0),
            Action::West => (0, -1),
        }
    }

    /// Moves `position` one cell in this direction. No bounds or wall checks.
    pub fn apply(self, position: Position) -> Position {
        let (dr, dc) = self.delta();
        Position::new(position.row + dr, position.col + dc)
    }

    /// Single-character arrow, handy for printing a policy.
    pub fn arrow(self) -> char {
        match self {
            Action::North => '^',
            Action::East => '>',
            Action::South => 'v',
            Action::West => '<',
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::North => "North",
            Action::East => "East",
            Action::South => "South",
            Action::West => "West",
        };
        f.write_str(name)
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "north" | "n" => Ok(Action::North),
            "east" | "e" => Ok(Action::East),
            "south" | "s" => Ok(Action::South),
            "west" | "w" => Ok(Action::West),
            _ => Err(Error::InvalidAction(s.to_string())),
        }
    }
}

impl TryFrom<usize> for Action {
    type Error = Error;

    fn try_from(index: usize) -> Result<Self> {
        Action::from_index(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_bijection() {
        for (i, action) in Action::ALL.iter().enumerate() {
            assert_eq!(action.index(), i);
            assert_eq!(Action::from_index(i).unwrap(), *action);
        }
    }

    #[test]
    fn test_invalid_index_is_rejected() {
        assert_eq!(
            Action::from_index(4),
            Err(Error::InvalidAction("no action at index 4".to_string()))
        );
        assert!(Action::try_from(17usize).is_err());
    }

    #[test]
    fn test_rotations() {
        assert_eq!(Action::North.rotate_cw(), Action::East);
        assert_eq!(Action::North.rotate_ccw(), Action::West);
        assert_eq!(Action::West.rotate_cw(), Action::North);
        assert_eq!(Action::South.rotate_ccw(), Action::East);

        for action in Action::ALL {
            assert_eq!(action.rotate_cw().rotate_ccw(), action);
            let full_turn = action.rotate_cw().rotate_cw().rotate_cw().rotate_cw();
            assert_eq!(full_turn, action);
        }
    }

    #[test]
    fn test_apply_moves_one_cell() {
        let origin = Position::new(1, 1);
        assert_eq!(Action::North.apply(origin), Position::new(0, 1));
        assert_eq!(Action::South.apply(origin), Position::new(2, 1));
        assert_eq!(Action::East.apply(origin), Position::new(1, 2));
        assert_eq!(Action::West.apply(origin), Position::new(1, 0));
        // Leaving the grid is allowed here; legality is checked elsewhere.
        assert_eq!(Action::North.apply(Position::new(0, 0)), Position::new(-1, 0));
    }

    #[test]
    fn test_parse() {
        assert_eq!("North".parse::<Action>().unwrap(), Action::North);
        assert_eq!("west".parse::<Action>().unwrap(), Action::West);
        assert_eq!(" E ".parse::<Action>().unwrap(), Action::East);
        assert_eq!(
            "Up".parse::<Action>(),
            Err(Error::InvalidAction("Up".to_string()))
        );
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for action in Action::ALL {
            assert_eq!(action.to_string().parse::<Action>().unwrap(), action);
        }
    }
}

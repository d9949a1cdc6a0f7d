//! Common types: board errors and shot results.

use crate::bitboard::BitBoardError;

/// Result of a shot against a fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub enum GuessResult {
    /// Shot landed on an afloat ship segment.
    Hit,
    /// Shot landed on open water.
    Miss,
    /// Shot hit the last intact segment of a ship, carrying its name.
    Sink(&'static str),
}

impl GuessResult {
    pub fn is_hit(&self) -> bool {
        !matches!(self, GuessResult::Miss)
    }
}

/// Errors returned by fleet and board operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Underlying bitboard error (index outside the grid).
    BitBoardError(BitBoardError),
    /// No ship with this id in the fleet.
    InvalidShip(u8),
    /// Some ship cell would fall outside the 10×10 grid.
    OutOfBounds,
    /// Placement overlaps another placed ship.
    Overlaps,
    /// Operation requires the whole fleet to be placed.
    ShipsUnplaced,
    /// No legal spot exists for the ship.
    UnableToPlaceShip,
    /// A received layout does not describe a full fleet.
    IncompleteLayout { expected: usize, got: usize },
    /// A received layout has a ship of this length that the standard fleet
    /// does not (or has too many of).
    UnexpectedShipLength(u8),
}

impl From<BitBoardError> for BoardError {
    fn from(err: BitBoardError) -> Self {
        BoardError::BitBoardError(err)
    }
}

impl core::fmt::Display for BoardError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BoardError::BitBoardError(e) => write!(f, "BitBoard error: {}", e),
            BoardError::InvalidShip(id) => write!(f, "No ship with id {}", id),
            BoardError::OutOfBounds => write!(f, "Ship placement is out of bounds"),
            BoardError::Overlaps => write!(f, "Ship placement overlaps with another ship"),
            BoardError::ShipsUnplaced => write!(f, "Please place all ships before starting"),
            BoardError::UnableToPlaceShip => write!(f, "Unable to place ship"),
            BoardError::IncompleteLayout { expected, got } => {
                write!(f, "Layout has {} ships, expected {}", got, expected)
            }
            BoardError::UnexpectedShipLength(len) => {
                write!(f, "Layout has an unexpected ship of length {}", len)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BoardError {}

/// Category of an observer notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum LogKind {
    Info,
    /// A decoded message heard from another peer.
    Inbound,
    /// A message this peer transmitted.
    Outbound,
    /// A session state transition.
    State,
    Error,
}

/// A shot coordinate as carried on the wire: `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub x: u8,
    pub y: u8,
}

impl Coord {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    pub fn row(&self) -> usize {
        self.y as usize
    }

    pub fn col(&self) -> usize {
        self.x as usize
    }
}

impl core::fmt::Display for Coord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

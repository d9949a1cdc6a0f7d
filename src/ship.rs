//! Ship definitions and footprint geometry.

use core::fmt;

use crate::bitboard::{BitBoardError, CellMask};
use crate::config::BOARD_SIZE;

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn from_vertical(vertical: bool) -> Self {
        if vertical {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }

    pub fn is_vertical(self) -> bool {
        self == Orientation::Vertical
    }

    /// Wire character: `V` or `H`.
    pub fn as_char(self) -> char {
        match self {
            Orientation::Horizontal => 'H',
            Orientation::Vertical => 'V',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'H' => Some(Orientation::Horizontal),
            'V' => Some(Orientation::Vertical),
            _ => None,
        }
    }
}

/// Type of ship: name and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipType {
    name: &'static str,
    length: usize,
}

impl ShipType {
    pub const fn new(name: &'static str, length: usize) -> Self {
        Self { name, length }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

/// Fleet-local ship identifier, 1-based.
pub type ShipId = u8;

/// Top-left anchor of a placed ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Whether a ship of `length` anchored at (`row`, `col`) stays on the grid.
pub fn fits(length: usize, row: usize, col: usize, orientation: Orientation) -> bool {
    let n = BOARD_SIZE as usize;
    match orientation {
        Orientation::Vertical => col < n && row.checked_add(length).is_some_and(|end| end <= n),
        Orientation::Horizontal => row < n && col.checked_add(length).is_some_and(|end| end <= n),
    }
}

/// Cells covered by a ship of `length` anchored at (`row`, `col`).
pub fn footprint(
    length: usize,
    row: usize,
    col: usize,
    orientation: Orientation,
) -> impl Iterator<Item = (usize, usize)> {
    (0..length).map(move |i| match orientation {
        Orientation::Horizontal => (row, col + i),
        Orientation::Vertical => (row + i, col),
    })
}

/// Occupancy mask of a ship footprint; errors if any cell is off the grid.
pub fn footprint_mask(
    length: usize,
    row: usize,
    col: usize,
    orientation: Orientation,
) -> Result<CellMask, BitBoardError> {
    CellMask::from_cells(footprint(length, row, col, orientation))
}

/// One ship of a fleet. Position is unset until placed.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ship {
    id: ShipId,
    ship_type: ShipType,
    position: Option<Position>,
    orientation: Orientation,
}

impl Ship {
    /// Unplaced ship; ships start out vertical.
    pub const fn new(id: ShipId, ship_type: ShipType) -> Self {
        Self {
            id,
            ship_type,
            position: None,
            orientation: Orientation::Vertical,
        }
    }

    pub fn id(&self) -> ShipId {
        self.id
    }

    pub fn ship_type(&self) -> ShipType {
        self.ship_type
    }

    pub fn length(&self) -> usize {
        self.ship_type.length()
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn is_placed(&self) -> bool {
        self.position.is_some()
    }

    pub(crate) fn set_placement(&mut self, position: Position, orientation: Orientation) {
        self.position = Some(position);
        self.orientation = orientation;
    }

    /// Occupancy mask, or `None` while unplaced.
    pub fn mask(&self) -> Option<CellMask> {
        let pos = self.position?;
        footprint_mask(self.length(), pos.row, pos.col, self.orientation).ok()
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.mask()
            .map(|m| m.get(row, col).unwrap_or(false))
            .unwrap_or(false)
    }
}

impl fmt::Debug for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(p) => write!(
                f,
                "Ship {{ id: {}, name: \"{}\", origin: ({}, {}), orientation: {:?} }}",
                self.id,
                self.ship_type.name(),
                p.row,
                p.col,
                self.orientation,
            ),
            None => write!(
                f,
                "Ship {{ id: {}, name: \"{}\", unplaced }}",
                self.id,
                self.ship_type.name()
            ),
        }
    }
}

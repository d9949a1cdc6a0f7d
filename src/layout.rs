//! Wire-visible projection of a fleet: ship geometry only, no cell grid.

use alloc::vec::Vec;

use crate::ship::{self, Orientation};

/// Geometry of one ship as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct ShipTuple {
    pub orientation: Orientation,
    pub length: u8,
    pub col: u8,
    pub row: u8,
}

impl ShipTuple {
    pub fn new(orientation: Orientation, length: u8, col: u8, row: u8) -> Self {
        Self {
            orientation,
            length,
            col,
            row,
        }
    }

    /// Whether the tuple lies entirely on the grid.
    pub fn in_bounds(&self) -> bool {
        ship::fits(
            self.length as usize,
            self.row as usize,
            self.col as usize,
            self.orientation,
        )
    }

    /// Cells covered by this ship as `(row, col)`.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        ship::footprint(
            self.length as usize,
            self.row as usize,
            self.col as usize,
            self.orientation,
        )
    }
}

/// Ordered ship tuples describing a fleet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardLayout {
    ships: Vec<ShipTuple>,
}

impl BoardLayout {
    pub fn new(ships: Vec<ShipTuple>) -> Self {
        Self { ships }
    }

    pub fn ships(&self) -> &[ShipTuple] {
        &self.ships
    }

    pub fn len(&self) -> usize {
        self.ships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }
}

impl FromIterator<ShipTuple> for BoardLayout {
    fn from_iter<I: IntoIterator<Item = ShipTuple>>(iter: I) -> Self {
        Self {
            ships: iter.into_iter().collect(),
        }
    }
}

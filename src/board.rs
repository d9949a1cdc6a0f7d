//! Fleet placement rules and the opponent's materialized board.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::bitboard::CellMask;
use crate::common::{BoardError, GuessResult};
use crate::config::{BOARD_SIZE, NUM_SHIPS, SHIPS};
use crate::layout::{BoardLayout, ShipTuple};
use crate::ship::{self, Orientation, Position, Ship, ShipId};

const N: usize = BOARD_SIZE as usize;

/// A legal anchor and orientation for one ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub position: Position,
    pub orientation: Orientation,
}

/// The local player's five ships plus the cells the opponent has fired at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fleet {
    ships: [Ship; NUM_SHIPS],
    shots_taken: CellMask,
}

impl Default for Fleet {
    fn default() -> Self {
        Self::new()
    }
}

impl Fleet {
    /// Standard fleet, all ships unplaced. Ids run 1..=5 in `SHIPS` order.
    pub fn new() -> Self {
        let ships = core::array::from_fn(|i| Ship::new(i as ShipId + 1, SHIPS[i]));
        Fleet {
            ships,
            shots_taken: CellMask::new(),
        }
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.iter().find(|s| s.id() == id)
    }

    fn index_of(&self, id: ShipId) -> Result<usize, BoardError> {
        self.ships
            .iter()
            .position(|s| s.id() == id)
            .ok_or(BoardError::InvalidShip(id))
    }

    pub fn all_placed(&self) -> bool {
        self.ships.iter().all(Ship::is_placed)
    }

    /// Union of all placed ship cells.
    pub fn occupied(&self) -> CellMask {
        self.ships
            .iter()
            .filter_map(Ship::mask)
            .fold(CellMask::new(), |acc, m| acc | m)
    }

    /// Cells the opponent has fired at so far, hit or miss.
    pub fn shots_taken(&self) -> CellMask {
        self.shots_taken
    }

    /// Bounds check plus overlap check against every other placed ship.
    ///
    /// `exclude` skips one ship by id so it can move through its own cells.
    pub fn is_valid_placement(
        &self,
        ship: &Ship,
        row: usize,
        col: usize,
        orientation: Orientation,
        exclude: Option<ShipId>,
    ) -> bool {
        self.check_placement(ship.length(), row, col, orientation, exclude)
            .is_ok()
    }

    fn check_placement(
        &self,
        length: usize,
        row: usize,
        col: usize,
        orientation: Orientation,
        exclude: Option<ShipId>,
    ) -> Result<(), BoardError> {
        if !ship::fits(length, row, col, orientation) {
            return Err(BoardError::OutOfBounds);
        }
        let candidate = ship::footprint_mask(length, row, col, orientation)?;
        let overlaps = self
            .ships
            .iter()
            .filter(|other| Some(other.id()) != exclude)
            .filter_map(Ship::mask)
            .any(|other| other.intersects(&candidate));
        if overlaps {
            return Err(BoardError::Overlaps);
        }
        Ok(())
    }

    /// Move (or first place) a ship. Leaves the fleet untouched on error.
    pub fn place(
        &mut self,
        id: ShipId,
        row: usize,
        col: usize,
        orientation: Orientation,
    ) -> Result<(), BoardError> {
        let idx = self.index_of(id)?;
        let length = self.ships[idx].length();
        self.check_placement(length, row, col, orientation, Some(id))?;
        self.ships[idx].set_placement(Position::new(row, col), orientation);
        Ok(())
    }

    /// Find a legal spot for ship `id` against the other placed ships.
    ///
    /// Draws up to `attempts` uniform candidates first. When all of them
    /// collide, every legal anchor is enumerated and one is picked uniformly.
    /// Fails only if the ship cannot be placed at all.
    pub fn random_placement<R: Rng>(
        &self,
        rng: &mut R,
        id: ShipId,
        attempts: usize,
    ) -> Result<Placement, BoardError> {
        let idx = self.index_of(id)?;
        let length = self.ships[idx].length();
        for _ in 0..attempts {
            let orientation = Orientation::from_vertical(rng.random());
            let (max_r, max_c) = match orientation {
                Orientation::Vertical => (N - length, N - 1),
                Orientation::Horizontal => (N - 1, N - length),
            };
            let row = rng.random_range(0..=max_r);
            let col = rng.random_range(0..=max_c);
            if self
                .check_placement(length, row, col, orientation, Some(id))
                .is_ok()
            {
                return Ok(Placement {
                    position: Position::new(row, col),
                    orientation,
                });
            }
        }
        log::debug!(
            "rejection sampling exhausted for ship {} after {} draws, scanning",
            id,
            attempts
        );
        let count = self.legal_anchors(length, id).count();
        if count == 0 {
            return Err(BoardError::UnableToPlaceShip);
        }
        let pick = rng.random_range(0..count);
        let (row, col, orientation) = self
            .legal_anchors(length, id)
            .nth(pick)
            .ok_or(BoardError::UnableToPlaceShip)?;
        Ok(Placement {
            position: Position::new(row, col),
            orientation,
        })
    }

    fn legal_anchors(
        &self,
        length: usize,
        id: ShipId,
    ) -> impl Iterator<Item = (usize, usize, Orientation)> + '_ {
        [Orientation::Horizontal, Orientation::Vertical]
            .into_iter()
            .flat_map(|o| (0..N).flat_map(move |r| (0..N).map(move |c| (r, c, o))))
            .filter(move |&(r, c, o)| self.check_placement(length, r, c, o, Some(id)).is_ok())
    }

    /// Re-place the whole fleet at random, visiting ships in shuffled order.
    /// All-or-nothing: on error the previous placement is kept.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R, attempts: usize) -> Result<(), BoardError> {
        let mut next = Fleet::new();
        let mut order: [usize; NUM_SHIPS] = core::array::from_fn(|i| i);
        order.shuffle(rng);
        for idx in order {
            let id = next.ships[idx].id();
            let p = next.random_placement(rng, id, attempts)?;
            next.ships[idx].set_placement(p.position, p.orientation);
        }
        next.shots_taken = self.shots_taken;
        *self = next;
        Ok(())
    }

    /// Wire projection of the fleet, in ship id order.
    pub fn layout(&self) -> Result<BoardLayout, BoardError> {
        self.ships
            .iter()
            .map(|s| {
                let pos = s.position().ok_or(BoardError::ShipsUnplaced)?;
                Ok(ShipTuple::new(
                    s.orientation(),
                    s.length() as u8,
                    pos.col as u8,
                    pos.row as u8,
                ))
            })
            .collect()
    }

    /// Apply an incoming shot at (`row`, `col`) and report what it struck.
    pub fn receive_shot(&mut self, row: usize, col: usize) -> Result<GuessResult, BoardError> {
        self.shots_taken.set(row, col)?;
        let taken = self.shots_taken;
        let struck = self.ships.iter().find(|s| s.contains(row, col));
        Ok(match struck {
            None => GuessResult::Miss,
            Some(s) => match s.mask() {
                Some(mask) if mask.is_subset(&taken) => GuessResult::Sink(s.ship_type().name()),
                _ => GuessResult::Hit,
            },
        })
    }

    /// Every ship cell has been hit.
    pub fn all_sunk(&self) -> bool {
        self.all_placed() && self.occupied().is_subset(&self.shots_taken)
    }
}

/// Content of one materialized cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Cell {
    Empty,
    Ship,
}

/// Row-major 10×10 cell matrix.
pub type Grid = [[Cell; N]; N];

/// Replay each tuple of a layout onto an empty grid.
pub fn materialize(layout: &BoardLayout) -> Result<Grid, BoardError> {
    let mut grid = [[Cell::Empty; N]; N];
    for tuple in layout.ships() {
        if !tuple.in_bounds() {
            return Err(BoardError::OutOfBounds);
        }
        for (r, c) in tuple.cells() {
            grid[r][c] = Cell::Ship;
        }
    }
    Ok(grid)
}

/// The opponent's fleet as learned from its board message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpponentBoard {
    layout: BoardLayout,
    /// Ship name for each tuple of `layout`, matched by length.
    names: [&'static str; NUM_SHIPS],
    grid: Grid,
    occupied: CellMask,
}

impl OpponentBoard {
    /// Accepts only the standard fleet, in any order, with every ship in
    /// bounds and no two ships overlapping.
    pub fn from_layout(layout: BoardLayout) -> Result<Self, BoardError> {
        if layout.len() != NUM_SHIPS {
            return Err(BoardError::IncompleteLayout {
                expected: NUM_SHIPS,
                got: layout.len(),
            });
        }
        let grid = materialize(&layout)?;
        let mut occupied = CellMask::new();
        for tuple in layout.ships() {
            let mask = CellMask::from_cells(tuple.cells())?;
            if mask.intersects(&occupied) {
                return Err(BoardError::Overlaps);
            }
            occupied |= mask;
        }
        let names = fleet_names(&layout)?;
        Ok(Self {
            layout,
            names,
            grid,
            occupied,
        })
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.occupied.get(row, col).unwrap_or(false)
    }

    pub fn occupied(&self) -> CellMask {
        self.occupied
    }

    /// What a shot at (`row`, `col`) struck, given every shot fired so far
    /// including this one.
    pub fn evaluate(&self, row: usize, col: usize, fired: &CellMask) -> GuessResult {
        let struck = self
            .layout
            .ships()
            .iter()
            .enumerate()
            .find(|(_, t)| t.cells().any(|cell| cell == (row, col)));
        match struck {
            None => GuessResult::Miss,
            Some((i, tuple)) => {
                let sunk = tuple
                    .cells()
                    .all(|(r, c)| fired.get(r, c).unwrap_or(false));
                if sunk {
                    GuessResult::Sink(self.names[i])
                } else {
                    GuessResult::Hit
                }
            }
        }
    }

    /// Every opponent ship cell is covered by `fired`.
    pub fn all_sunk(&self, fired: &CellMask) -> bool {
        self.occupied.is_subset(fired)
    }
}

/// Pair each tuple with the first unclaimed `SHIPS` entry of the same length.
/// Equal-length ships are named in order of appearance.
fn fleet_names(layout: &BoardLayout) -> Result<[&'static str; NUM_SHIPS], BoardError> {
    let mut claimed = [false; NUM_SHIPS];
    let mut names = [""; NUM_SHIPS];
    for (name, tuple) in names.iter_mut().zip(layout.ships()) {
        let slot = SHIPS
            .iter()
            .enumerate()
            .position(|(i, def)| !claimed[i] && def.length() == tuple.length as usize)
            .ok_or(BoardError::UnexpectedShipLength(tuple.length))?;
        claimed[slot] = true;
        *name = SHIPS[slot].name();
    }
    Ok(names)
}

//! Fixed-size cell masks packed into an unsigned integer.
//!
//! A `BitBoard<T, N>` is an `N×N` grid where each cell is one bit of `T`,
//! row-major. The fleet uses it for overlap and sink tests, the session for
//! the set of fired cells. No heap allocations.

use core::fmt;
use core::ops::{BitAnd, BitOr, BitOrAssign};
use num_traits::{PrimInt, Unsigned, Zero};

use crate::config::BOARD_SIZE;

/// Mask over the game grid. 100 cells fit in a `u128`.
pub type CellMask = BitBoard<u128, { BOARD_SIZE as usize }>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitBoardError {
    /// Row or column is outside `0..N`.
    IndexOutOfBounds { row: usize, col: usize },
}

impl fmt::Display for BitBoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitBoardError::IndexOutOfBounds { row, col } => {
                write!(f, "cell ({}, {}) is off the grid", row, col)
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BitBoard<T, const N: usize>
where
    T: PrimInt + Unsigned + Zero,
{
    bits: T,
}

impl<T, const N: usize> BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    #[inline]
    pub fn new() -> Self {
        Self { bits: T::zero() }
    }

    /// Single-cell mask for (`row`, `col`).
    fn bit(row: usize, col: usize) -> Result<T, BitBoardError> {
        if row < N && col < N {
            Ok(T::one() << (row * N + col))
        } else {
            Err(BitBoardError::IndexOutOfBounds { row, col })
        }
    }

    pub fn count_ones(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_zero()
    }

    /// At least one cell is set in both.
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.bits & other.bits).is_zero()
    }

    /// Every cell set here is also set in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        (self.bits & !other.bits).is_zero()
    }

    pub fn get(&self, row: usize, col: usize) -> Result<bool, BitBoardError> {
        Ok(!(self.bits & Self::bit(row, col)?).is_zero())
    }

    pub fn set(&mut self, row: usize, col: usize) -> Result<(), BitBoardError> {
        self.bits = self.bits | Self::bit(row, col)?;
        Ok(())
    }

    /// Mask with exactly the given `(row, col)` cells set.
    pub fn from_cells<I>(cells: I) -> Result<Self, BitBoardError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        cells.into_iter().try_fold(Self::new(), |mut mask, (r, c)| {
            mask.set(r, c)?;
            Ok(mask)
        })
    }

    /// Set cells as `(row, col)`, row-major.
    pub fn iter_set_bits(&self) -> SetBits<T, N> {
        SetBits {
            bits: self.bits,
            next: 0,
        }
    }
}

impl<T, const N: usize> Default for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> fmt::Debug for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter_set_bits()).finish()
    }
}

/// `■` for set cells, `□` otherwise, one grid row per line.
impl<T, const N: usize> fmt::Display for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..N {
            if r > 0 {
                writeln!(f)?;
            }
            for c in 0..N {
                let glyph = if self.get(r, c).unwrap_or(false) { '■' } else { '□' };
                write!(f, "{} ", glyph)?;
            }
        }
        Ok(())
    }
}

/// Owning iterator over the set cells of a bitboard.
#[derive(Clone, Copy)]
pub struct SetBits<T, const N: usize> {
    bits: T,
    next: usize,
}

impl<T, const N: usize> Iterator for SetBits<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < N * N {
            let idx = self.next;
            self.next += 1;
            if !((self.bits >> idx) & T::one()).is_zero() {
                return Some((idx / N, idx % N));
            }
        }
        None
    }
}

macro_rules! bit_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<T, const N: usize> $trait for BitBoard<T, N>
        where
            T: PrimInt + Unsigned + Zero,
        {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self {
                Self { bits: self.bits $op rhs.bits }
            }
        }
    };
}

bit_op!(BitAnd, bitand, &);
bit_op!(BitOr, bitor, |);

impl<T, const N: usize> BitOrAssign for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    fn bitor_assign(&mut self, rhs: Self) {
        self.bits = self.bits | rhs.bits;
    }
}

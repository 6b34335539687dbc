use ndarray::IxDyn;
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::{BoardCell, GameError, Result, Symbol};

/// Single coordinate component, also used for the length of a dimension.
pub type Coord = usize;

/// Count type used for mine counts, neighbor counts and total-cell counts.
pub type CellCount = usize;

/// N-dimensional coordinates, inline up to four dimensions.
pub type Coords = SmallVec<[Coord; 4]>;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for &[Coord] {
    type Output = IxDyn;

    fn to_nd_index(self) -> Self::Output {
        IxDyn(self)
    }
}

// widest element stored once per cell (board and rendered view)
const MAX_CELL_BYTES: usize = {
    let board = size_of::<BoardCell>();
    let symbol = size_of::<Symbol>();
    if board > symbol { board } else { symbol }
};

/// Dimensions of a board, validated to be non-empty with no zero-length axis.
///
/// The cell count is computed once and is guaranteed to fit an ndarray buffer
/// of the widest per-cell element.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Coords", into = "Coords")]
pub struct Shape {
    dims: Coords,
    total_cells: CellCount,
}

impl Shape {
    pub fn new(dims: &[Coord]) -> Result<Self> {
        if dims.is_empty() || dims.contains(&0) {
            return Err(GameError::InvalidShape);
        }

        let total_cells = dims
            .iter()
            .try_fold(1 as CellCount, |acc, &dim| acc.checked_mul(dim))
            .filter(|&total| {
                total
                    .checked_mul(MAX_CELL_BYTES)
                    .is_some_and(|bytes| bytes <= isize::MAX as usize)
            })
            .ok_or(GameError::Capacity)?;

        Ok(Self {
            dims: Coords::from_slice(dims),
            total_cells,
        })
    }

    pub fn dims(&self) -> &[Coord] {
        &self.dims
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    pub const fn total_cells(&self) -> CellCount {
        self.total_cells
    }

    pub fn is_in_bounds(&self, coords: &[Coord]) -> bool {
        coords.len() == self.dims.len()
            && coords.iter().zip(&self.dims).all(|(&coord, &dim)| coord < dim)
    }

    pub fn validate<'a>(&self, coords: &'a [Coord]) -> Result<&'a [Coord]> {
        if self.is_in_bounds(coords) {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    /// Row-major flat offset of `coords`, the last dimension varying fastest.
    pub fn to_index(&self, coords: &[Coord]) -> Result<usize> {
        let coords = self.validate(coords)?;
        Ok(coords
            .iter()
            .zip(&self.dims)
            .fold(0, |acc, (&coord, &dim)| acc * dim + coord))
    }

    /// Inverse of [`Shape::to_index`].
    pub fn from_index(&self, index: usize) -> Result<Coords> {
        if index < self.total_cells {
            Ok(self.coords_at(index))
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    /// Chebyshev neighbors of `coords` clipped to the board.
    ///
    /// Yields nothing when `coords` itself is not on the board.
    pub fn neighbors(&self, coords: &[Coord]) -> NeighborIter {
        NeighborIter::new(coords, &self.dims, self.is_in_bounds(coords))
    }

    /// Every coordinate of the board in row-major order.
    pub fn iter_coords(&self) -> impl Iterator<Item = Coords> + use<'_> {
        (0..self.total_cells).map(move |index| self.coords_at(index))
    }

    pub fn to_nd_index(&self) -> IxDyn {
        IxDyn(&self.dims)
    }

    fn coords_at(&self, mut index: usize) -> Coords {
        let mut coords: Coords = smallvec![0; self.dims.len()];
        for (coord, &dim) in coords.iter_mut().zip(&self.dims).rev() {
            *coord = index % dim;
            index /= dim;
        }
        coords
    }
}

impl TryFrom<Coords> for Shape {
    type Error = GameError;

    fn try_from(dims: Coords) -> Result<Self> {
        Self::new(&dims)
    }
}

impl From<Shape> for Coords {
    fn from(shape: Shape) -> Self {
        shape.dims
    }
}

/// Odometer over the deltas `{-1, 0, +1}^D`, skipping the zero delta and
/// anything that falls off the board.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: Coords,
    bounds: Coords,
    // per-axis delta shifted by one: 0 is -1, 1 is 0, 2 is +1
    offsets: SmallVec<[u8; 4]>,
    done: bool,
}

impl NeighborIter {
    fn new(center: &[Coord], bounds: &[Coord], in_bounds: bool) -> Self {
        Self {
            center: Coords::from_slice(center),
            bounds: Coords::from_slice(bounds),
            offsets: smallvec![0; center.len()],
            done: !in_bounds,
        }
    }

    fn current(&self) -> Option<Coords> {
        if self.offsets.iter().all(|&offset| offset == 1) {
            return None;
        }

        let mut next = Coords::with_capacity(self.center.len());
        for ((&coord, &bound), &offset) in self.center.iter().zip(&self.bounds).zip(&self.offsets) {
            let moved = coord.checked_add_signed(offset as isize - 1)?;
            if moved >= bound {
                return None;
            }
            next.push(moved);
        }
        Some(next)
    }

    fn advance(&mut self) {
        for offset in self.offsets.iter_mut().rev() {
            if *offset < 2 {
                *offset += 1;
                return;
            }
            *offset = 0;
        }
        self.done = true;
    }
}

impl Iterator for NeighborIter {
    type Item = Coords;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }

            let next_item = self.current();
            self.advance();

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}

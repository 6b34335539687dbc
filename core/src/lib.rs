#![no_std]

extern crate alloc;

use core::ops::Index;
use ndarray::{ArrayD, Dimension};
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use snapshot::*;
pub use types::*;

mod cell;
mod engine;
mod error;
mod generator;
mod snapshot;
mod types;

/// Parameters for generating a random game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub shape: Shape,
    pub mines: CellCount,
}

impl GameConfig {
    pub fn new_unchecked(shape: Shape, mines: CellCount) -> Self {
        Self { shape, mines }
    }

    /// Clamps every dimension to at least one cell and the mine count to the board size.
    pub fn new(dims: &[Coord], mines: CellCount) -> Result<Self> {
        let dims: Coords = dims.iter().map(|&dim| dim.max(1)).collect();
        let shape = Shape::new(&dims)?;
        let mines = mines.min(shape.total_cells());
        Ok(Self::new_unchecked(shape, mines))
    }

    pub const fn total_cells(&self) -> CellCount {
        self.shape.total_cells()
    }
}

/// Immutable board: where the mines are and how many mines touch every other cell.
#[derive(Clone, Debug, PartialEq)]
pub struct MineLayout {
    shape: Shape,
    cells: ArrayD<BoardCell>,
    mine_count: CellCount,
}

impl MineLayout {
    pub fn new<I>(dims: &[Coord], mines: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<[Coord]>,
    {
        Self::from_mine_coords(Shape::new(dims)?, mines)
    }

    /// Fails with [`GameError::InvalidMine`] on any out-of-bounds, wrong arity or repeated mine.
    pub fn from_mine_coords<I>(shape: Shape, mines: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<[Coord]>,
    {
        let mut mine_mask = ArrayD::from_elem(shape.to_nd_index(), false);

        for coords in mines {
            let coords = coords.as_ref();
            if !shape.is_in_bounds(coords) {
                log::debug!("Mine {coords:?} is outside of {:?}", shape.dims());
                return Err(GameError::InvalidMine);
            }

            let is_mine = &mut mine_mask[coords.to_nd_index()];
            if *is_mine {
                log::debug!("Mine {coords:?} was given more than once");
                return Err(GameError::InvalidMine);
            }
            *is_mine = true;
        }

        Ok(Self::from_mine_mask(shape, &mine_mask))
    }

    /// `mine_mask` must have the dimensions of `shape`.
    pub(crate) fn from_mine_mask(shape: Shape, mine_mask: &ArrayD<bool>) -> Self {
        let cells = ArrayD::from_shape_fn(shape.to_nd_index(), |index| {
            let coords = index.slice();
            if mine_mask[coords.to_nd_index()] {
                BoardCell::Mine
            } else {
                BoardCell::Clear(
                    shape
                        .neighbors(coords)
                        .filter(|pos| mine_mask[pos.as_slice().to_nd_index()])
                        .count(),
                )
            }
        });
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count();

        Self {
            shape,
            cells,
            mine_count,
        }
    }

    /// Rebuilds a layout from a stored board, checking every count against the mines.
    pub fn from_cells(cells: ArrayD<BoardCell>) -> Result<Self> {
        let shape = Shape::new(cells.shape())?;
        let mine_mask = cells.mapv(BoardCell::is_mine);
        let layout = Self::from_mine_mask(shape, &mine_mask);

        if layout.cells != cells {
            log::debug!("Stored board counts do not match its mines");
            return Err(GameError::InvalidSnapshot);
        }

        Ok(layout)
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.shape.clone(), self.mine_count)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn cells(&self) -> &ArrayD<BoardCell> {
        &self.cells
    }

    pub fn total_cells(&self) -> CellCount {
        self.shape.total_cells()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn cell_at(&self, coords: &[Coord]) -> Result<BoardCell> {
        let coords = self.shape.validate(coords)?;
        Ok(self[coords])
    }

    pub fn contains_mine(&self, coords: &[Coord]) -> Result<bool> {
        self.cell_at(coords).map(BoardCell::is_mine)
    }

    /// Mines among the neighbors, also defined for cells that are mines themselves.
    pub fn adjacent_mine_count(&self, coords: &[Coord]) -> Result<CellCount> {
        let coords = self.shape.validate(coords)?;
        Ok(self
            .iter_neighbors(coords)
            .filter(|pos| self[pos.as_slice()].is_mine())
            .count())
    }

    pub fn iter_neighbors(&self, coords: &[Coord]) -> NeighborIter {
        self.shape.neighbors(coords)
    }

    pub fn iter_mines(&self) -> impl Iterator<Item = Coords> + use<'_> {
        self.cells
            .indexed_iter()
            .filter(|(_, cell)| cell.is_mine())
            .map(|(index, _)| Coords::from_slice(index.slice()))
    }
}

/// Panics if `coords` is not on the board.
impl Index<&[Coord]> for MineLayout {
    type Output = BoardCell;

    fn index(&self, coords: &[Coord]) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

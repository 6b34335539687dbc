use core::fmt;
use serde::{Deserialize, Serialize};

use crate::CellCount;

/// Hidden truth of a single board cell, fixed when the layout is built.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoardCell {
    Mine,
    Clear(CellCount),
}

impl BoardCell {
    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }

    pub const fn is_blank(self) -> bool {
        matches!(self, Self::Clear(0))
    }
}

impl Default for BoardCell {
    fn default() -> Self {
        Self::Clear(0)
    }
}

/// Player-facing rendering of a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Symbol {
    Hidden,
    Mine,
    Blank,
    Count(CellCount),
}

impl Symbol {
    pub const fn shown(cell: BoardCell) -> Self {
        match cell {
            BoardCell::Mine => Self::Mine,
            BoardCell::Clear(0) => Self::Blank,
            BoardCell::Clear(count) => Self::Count(count),
        }
    }

    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Self::Hidden
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hidden => f.write_str("_"),
            Self::Mine => f.write_str("."),
            Self::Blank => f.write_str(" "),
            Self::Count(count) => write!(f, "{count}"),
        }
    }
}

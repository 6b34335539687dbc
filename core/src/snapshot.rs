use alloc::string::String;
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

use crate::*;

/// Complete, verbatim state of a [`HyperMinesGame`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub dimensions: Coords,
    pub board: ArrayD<BoardCell>,
    pub mask: ArrayD<bool>,
    pub state: GameState,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|err| {
            log::warn!("Failed to encode snapshot: {err}");
            GameError::InvalidSnapshot
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| {
            log::warn!("Failed to decode snapshot: {err}");
            GameError::InvalidSnapshot
        })
    }
}

impl HyperMinesGame {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            dimensions: Coords::from_slice(self.shape().dims()),
            board: self.mine_layout().cells().clone(),
            mask: self.mask().clone(),
            state: self.state(),
        }
    }

    /// Fails if the parts of `snapshot` disagree on the shape or the board counts are wrong.
    pub fn restore(snapshot: Snapshot) -> Result<Self> {
        let Snapshot {
            dimensions,
            board,
            mask,
            state,
        } = snapshot;

        let shape = Shape::new(&dimensions)?;
        if board.shape() != shape.dims() {
            log::debug!(
                "Snapshot board has shape {:?}, expected {:?}",
                board.shape(),
                shape.dims()
            );
            return Err(GameError::InvalidSnapshot);
        }

        let mine_layout = MineLayout::from_cells(board)?;
        Self::from_parts(mine_layout, mask, state)
    }
}

use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board shape must have at least one dimension and no empty dimension")]
    InvalidShape,
    #[error("Mine coordinates are out of bounds or duplicated")]
    InvalidMine,
    #[error("Coordinates are out of bounds")]
    OutOfBounds,
    #[error("Board has more cells than can be stored")]
    Capacity,
    #[error("Snapshot does not describe a consistent game")]
    InvalidSnapshot,
}

pub type Result<T> = core::result::Result<T, GameError>;

use alloc::vec;
use core::fmt;
use ndarray::{ArrayD, Zip};
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    Ongoing,
    Defeat,
    Victory,
}

impl GameState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Defeat | Self::Victory)
    }

    /// State implied by a board and its reveal mask.
    ///
    /// Any visible mine is a defeat, otherwise all safe cells visible is a victory.
    /// Fails with [`GameError::InvalidSnapshot`] when the mask does not have the board's shape.
    pub fn evaluate(layout: &MineLayout, mask: &ArrayD<bool>) -> Result<Self> {
        if mask.shape() != layout.shape().dims() {
            return Err(GameError::InvalidSnapshot);
        }
        let (revealed_safe, revealed_mines) = count_revealed(layout, mask);
        Ok(Self::from_counts(layout, revealed_safe, revealed_mines))
    }

    fn from_counts(
        layout: &MineLayout,
        revealed_safe: CellCount,
        revealed_mines: CellCount,
    ) -> Self {
        if revealed_mines > 0 {
            Self::Defeat
        } else if revealed_safe == layout.safe_cell_count() {
            Self::Victory
        } else {
            Self::Ongoing
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::Ongoing
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ongoing => "ongoing",
            Self::Defeat => "defeat",
            Self::Victory => "victory",
        })
    }
}

/// Result of a single [`HyperMinesGame::dig`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DigOutcome {
    pub revealed: CellCount,
    pub state: GameState,
}

impl DigOutcome {
    const fn no_change(state: GameState) -> Self {
        Self { revealed: 0, state }
    }

    pub const fn has_update(self) -> bool {
        self.revealed > 0
    }
}

/// A game of minesweeper on a board with any number of dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct HyperMinesGame {
    mine_layout: MineLayout,
    mask: ArrayD<bool>,
    revealed_safe: CellCount,
    revealed_mines: CellCount,
    state: GameState,
}

impl HyperMinesGame {
    pub fn new<I>(dims: &[Coord], mines: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<[Coord]>,
    {
        Ok(Self::from_layout(MineLayout::new(dims, mines)?))
    }

    pub fn from_layout(mine_layout: MineLayout) -> Self {
        let mask = ArrayD::from_elem(mine_layout.shape().to_nd_index(), false);
        Self {
            mine_layout,
            mask,
            revealed_safe: 0,
            revealed_mines: 0,
            state: GameState::default(),
        }
    }

    /// Rebuilds a game from its parts, keeping `state` as given.
    pub(crate) fn from_parts(
        mine_layout: MineLayout,
        mask: ArrayD<bool>,
        state: GameState,
    ) -> Result<Self> {
        if mask.shape() != mine_layout.shape().dims() {
            return Err(GameError::InvalidSnapshot);
        }

        let (revealed_safe, revealed_mines) = count_revealed(&mine_layout, &mask);
        let implied = GameState::from_counts(&mine_layout, revealed_safe, revealed_mines);
        if implied != state {
            log::warn!("Restored state {state} disagrees with the mask, which implies {implied}");
        }

        Ok(Self {
            mine_layout,
            mask,
            revealed_safe,
            revealed_mines,
            state,
        })
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn is_victory(&self) -> bool {
        matches!(self.state, GameState::Victory)
    }

    pub fn is_defeat(&self) -> bool {
        matches!(self.state, GameState::Defeat)
    }

    pub fn shape(&self) -> &Shape {
        self.mine_layout.shape()
    }

    pub fn mine_layout(&self) -> &MineLayout {
        &self.mine_layout
    }

    pub fn mask(&self) -> &ArrayD<bool> {
        &self.mask
    }

    pub fn total_mines(&self) -> CellCount {
        self.mine_layout.mine_count()
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_safe + self.revealed_mines
    }

    pub fn is_revealed(&self, coords: &[Coord]) -> Result<bool> {
        let coords = self.shape().validate(coords)?;
        Ok(self.mask[coords.to_nd_index()])
    }

    /// Reveals `coords` and, through blank cells, everything connected to it.
    ///
    /// Digging a revealed cell or a finished game reveals nothing and is not an error.
    pub fn dig(&mut self, coords: &[Coord]) -> Result<DigOutcome> {
        let coords = self.shape().validate(coords)?;

        if self.state.is_finished() || self.mask[coords.to_nd_index()] {
            return Ok(DigOutcome::no_change(self.state));
        }

        let revealed = self.flood_reveal(coords);
        self.state = GameState::from_counts(
            &self.mine_layout,
            self.revealed_safe,
            self.revealed_mines,
        );
        log::debug!(
            "Dug {coords:?}: revealed {revealed} cells, game is {}",
            self.state
        );

        Ok(DigOutcome {
            revealed,
            state: self.state,
        })
    }

    /// Work-list flood fill, the mask doubles as the visited set.
    fn flood_reveal(&mut self, start: &[Coord]) -> CellCount {
        let mut revealed = 0;
        let mut to_visit = vec![Coords::from_slice(start)];

        while let Some(visit_coords) = to_visit.pop() {
            let is_revealed = &mut self.mask[visit_coords.as_slice().to_nd_index()];
            if *is_revealed {
                continue;
            }
            *is_revealed = true;
            revealed += 1;

            match self.mine_layout[visit_coords.as_slice()] {
                BoardCell::Mine => {
                    log::trace!("Mine revealed at {visit_coords:?}");
                    self.revealed_mines += 1;
                }
                BoardCell::Clear(count) => {
                    self.revealed_safe += 1;
                    if count == 0 {
                        let mask = &self.mask;
                        to_visit.extend(
                            self.mine_layout
                                .iter_neighbors(&visit_coords)
                                .filter(|pos| !mask[pos.as_slice().to_nd_index()]),
                        );
                    }
                }
            }
        }

        revealed
    }

    /// Player view of the board, `xray` shows every cell regardless of the mask.
    pub fn render(&self, xray: bool) -> ArrayD<Symbol> {
        Zip::from(self.mine_layout.cells())
            .and(&self.mask)
            .map_collect(|&cell, &is_revealed| {
                if xray || is_revealed {
                    Symbol::shown(cell)
                } else {
                    Symbol::Hidden
                }
            })
    }
}

/// Human readable dump of the full game, the board is shown with x-ray.
impl fmt::Display for HyperMinesGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "dimensions: {:?}", self.shape().dims())?;
        writeln!(f, "board: {}", self.render(true).mapv(SymbolCell))?;
        writeln!(f, "mask:  {}", self.mask)?;
        write!(f, "state: {}", self.state)
    }
}

// quotes symbols so blanks stay visible in the dump
#[derive(Copy, Clone)]
struct SymbolCell(Symbol);

impl fmt::Display for SymbolCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.0)
    }
}

fn count_revealed(layout: &MineLayout, mask: &ArrayD<bool>) -> (CellCount, CellCount) {
    let mut revealed_safe = 0;
    let mut revealed_mines = 0;
    Zip::from(layout.cells())
        .and(mask)
        .for_each(|cell, &is_revealed| match (cell, is_revealed) {
            (BoardCell::Mine, true) => revealed_mines += 1,
            (BoardCell::Clear(_), true) => revealed_safe += 1,
            (_, false) => {}
        });
    (revealed_safe, revealed_mines)
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use ndarray::IxDyn;

    use super::*;

    fn game(dims: &[Coord], mines: &[&[Coord]]) -> HyperMinesGame {
        HyperMinesGame::new(dims, mines).unwrap()
    }

    fn revealed_cells(game: &HyperMinesGame) -> Vec<Coords> {
        game.shape()
            .iter_coords()
            .filter(|coords| game.is_revealed(coords).unwrap())
            .collect()
    }

    #[test]
    fn line_board_floods_to_victory() {
        let mut game = game(&[5], &[&[4]]);

        let outcome = game.dig(&[0]).unwrap();

        assert_eq!(outcome.revealed, 4);
        assert_eq!(outcome.state, GameState::Victory);
        assert_eq!(game.state(), GameState::Victory);
        assert_eq!(game.is_revealed(&[4]), Ok(false));
    }

    #[test]
    fn digging_a_mine_is_a_defeat() {
        let mut game = game(&[5], &[&[4]]);

        let outcome = game.dig(&[4]).unwrap();

        assert_eq!(
            outcome,
            DigOutcome {
                revealed: 1,
                state: GameState::Defeat
            }
        );
        assert!(game.is_finished());
        assert!(game.is_defeat());
        assert!(!game.is_victory());
    }

    #[test]
    fn digging_next_to_a_mine_reveals_one_cell() {
        let mut game = game(&[3, 3], &[&[1, 1]]);

        let outcome = game.dig(&[0, 0]).unwrap();

        assert_eq!(outcome.revealed, 1);
        assert_eq!(outcome.state, GameState::Ongoing);
        assert_eq!(revealed_cells(&game).len(), 1);
    }

    #[test]
    fn second_dig_of_same_cell_is_a_no_op() {
        let mut game = game(&[4, 4], &[&[3, 3]]);

        let first = game.dig(&[2, 2]).unwrap();
        let second = game.dig(&[2, 2]).unwrap();

        assert_eq!(first.revealed, 1);
        assert_eq!(second, DigOutcome::no_change(first.state));
        assert!(!second.has_update());
    }

    #[test]
    fn finished_games_ignore_digs() {
        let mut game = game(&[3, 3], &[&[1, 1], &[2, 2]]);
        game.dig(&[1, 1]).unwrap();
        let mask = game.mask().clone();

        let outcome = game.dig(&[0, 0]).unwrap();

        assert_eq!(outcome, DigOutcome::no_change(GameState::Defeat));
        assert_eq!(game.mask(), &mask);
    }

    #[test]
    fn won_games_ignore_digs() {
        let mut game = game(&[2], &[&[1]]);
        assert_eq!(game.dig(&[0]).unwrap().state, GameState::Victory);

        let outcome = game.dig(&[1]).unwrap();

        assert_eq!(outcome, DigOutcome::no_change(GameState::Victory));
        assert_eq!(game.is_revealed(&[1]), Ok(false));
    }

    #[test]
    fn dig_rejects_bad_coordinates_even_when_finished() {
        let mut game = game(&[3, 3], &[&[1, 1]]);

        assert_eq!(game.dig(&[3, 0]), Err(GameError::OutOfBounds));
        assert_eq!(game.dig(&[0]), Err(GameError::OutOfBounds));

        game.dig(&[1, 1]).unwrap();
        assert_eq!(game.dig(&[0, 0, 0]), Err(GameError::OutOfBounds));
    }

    #[test]
    fn flood_stops_at_numbered_border() {
        // mines wall off the right column
        let mut game = game(&[4, 4], &[&[0, 2], &[1, 2], &[2, 2], &[3, 2]]);

        let outcome = game.dig(&[0, 0]).unwrap();

        assert_eq!(outcome.revealed, 8);
        assert_eq!(outcome.state, GameState::Ongoing);
        for coords in revealed_cells(&game) {
            assert!(coords[1] < 2);
        }
    }

    #[test]
    fn flood_fills_three_dimensional_board() {
        let mut game = game(&[3, 3, 3], &[&[2, 2, 2]]);

        let outcome = game.dig(&[0, 0, 0]).unwrap();

        assert_eq!(outcome.revealed, 26);
        assert_eq!(outcome.state, GameState::Victory);
    }

    #[test]
    fn board_without_mines_is_won_by_one_dig() {
        let no_mines: [&[Coord]; 0] = [];
        let mut game = HyperMinesGame::new(&[2, 3, 2, 2], no_mines).unwrap();

        let outcome = game.dig(&[1, 2, 1, 1]).unwrap();

        assert_eq!(outcome.revealed, 24);
        assert_eq!(outcome.state, GameState::Victory);
    }

    #[test]
    fn several_digs_reach_victory() {
        let mut game = game(&[2, 2], &[&[0, 0]]);

        assert_eq!(game.dig(&[0, 1]).unwrap().state, GameState::Ongoing);
        assert_eq!(game.dig(&[1, 0]).unwrap().state, GameState::Ongoing);
        let outcome = game.dig(&[1, 1]).unwrap();

        assert_eq!(outcome.revealed, 1);
        assert_eq!(outcome.state, GameState::Victory);
        assert_eq!(game.revealed_count(), 3);
    }

    #[test]
    fn evaluate_matches_tracked_state() {
        let mut game = game(&[3, 4], &[&[0, 0], &[2, 3]]);
        for coords in [[1usize, 1], [2, 0], [0, 3]] {
            game.dig(&coords).unwrap();
            assert_eq!(
                GameState::evaluate(game.mine_layout(), game.mask()),
                Ok(game.state())
            );
        }
    }

    #[test]
    fn evaluate_rejects_mask_of_another_shape() {
        let game = game(&[3, 4], &[&[0, 0]]);
        let mask = ArrayD::from_elem(IxDyn(&[4, 3]), false);

        assert_eq!(
            GameState::evaluate(game.mine_layout(), &mask),
            Err(GameError::InvalidSnapshot)
        );
    }

    #[test]
    fn render_hides_unrevealed_cells() {
        let mut game = game(&[3, 3], &[&[1, 1]]);
        game.dig(&[0, 0]).unwrap();

        let view = game.render(false);

        assert_eq!(view.shape(), &[3, 3]);
        assert_eq!(view[IxDyn(&[0, 0])], Symbol::Count(1));
        assert_eq!(view[IxDyn(&[1, 1])], Symbol::Hidden);
        assert_eq!(view.iter().filter(|symbol| symbol.is_hidden()).count(), 8);
    }

    #[test]
    fn render_xray_ignores_mask() {
        let game = game(&[1, 4], &[&[0, 0]]);

        let view = game.render(true);

        let symbols: Vec<Symbol> = view.iter().copied().collect();
        assert_eq!(
            symbols,
            [Symbol::Mine, Symbol::Count(1), Symbol::Blank, Symbol::Blank]
        );
    }

    #[test]
    fn state_names_are_lowercase() {
        assert_eq!(GameState::Ongoing.to_string(), "ongoing");
        assert_eq!(GameState::Defeat.to_string(), "defeat");
        assert_eq!(GameState::Victory.to_string(), "victory");
        assert_eq!(
            serde_json::to_string(&GameState::Victory).unwrap(),
            "\"victory\""
        );
    }

    #[test]
    fn dump_lists_every_part() {
        let mut game = game(&[2, 2], &[&[0, 0]]);
        game.dig(&[1, 1]).unwrap();

        let dump = game.to_string();

        assert!(dump.starts_with("dimensions: [2, 2]\n"));
        assert!(dump.contains("board: "));
        assert!(dump.contains("'.'"));
        assert!(dump.contains("mask:  "));
        assert!(dump.ends_with("state: ongoing"));
    }
}

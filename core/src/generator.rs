use alloc::vec::Vec;
use ndarray::ArrayD;

use crate::*;

pub trait MineGenerator {
    fn generate(self, config: &GameConfig) -> MineLayout;
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StartCell {
    Random,
    SimpleSafe,
    AlwaysBlank,
}

/// Generation strategy that can optionally try to make the starting cell blank or at least safe, but other than that is
/// purely random.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMineGenerator {
    seed: u64,
    start: Coords,
    start_cell: StartCell,
}

impl RandomMineGenerator {
    pub fn new(seed: u64, start: &[Coord], start_cell: StartCell) -> Self {
        Self {
            seed,
            start: Coords::from_slice(start),
            start_cell,
        }
    }

    /// Purely random placement, no start cell is protected.
    pub fn random(seed: u64) -> Self {
        Self::new(seed, &[], StartCell::Random)
    }
}

impl MineGenerator for RandomMineGenerator {
    fn generate(self, config: &GameConfig) -> MineLayout {
        use StartCell::*;
        use rand::prelude::*;

        let shape = &config.shape;
        let total_cells = shape.total_cells();

        // optimize for full boards
        if config.mines >= total_cells {
            if config.mines > total_cells {
                log::warn!(
                    "Board already full, generated anyway, requested {} but only fits {}",
                    config.mines,
                    total_cells
                );
            }
            let mine_mask = ArrayD::from_elem(shape.to_nd_index(), true);
            return MineLayout::from_mine_mask(shape.clone(), &mine_mask);
        }

        let actual_start_cell = match self.start_cell {
            Random => Random,
            SimpleSafe | AlwaysBlank if !shape.is_in_bounds(&self.start) => {
                log::warn!("Start cell {:?} is off the board, fallback to random", self.start);
                Random
            }
            SimpleSafe | AlwaysBlank if config.mines + 1 > total_cells => {
                log::warn!("Cannot make start cell safe, fallback to random");
                Random
            }
            SimpleSafe => SimpleSafe,
            AlwaysBlank
                if config.mines + 1 + shape.neighbors(&self.start).count() > total_cells =>
            {
                log::warn!("Cannot make start cell blank, fallback to simple safe");
                SimpleSafe
            }
            AlwaysBlank => AlwaysBlank,
        };

        let mut excluded = ArrayD::from_elem(shape.to_nd_index(), false);
        match actual_start_cell {
            Random => {}
            SimpleSafe => {
                excluded[self.start.as_slice().to_nd_index()] = true;
            }
            AlwaysBlank => {
                excluded[self.start.as_slice().to_nd_index()] = true;
                for coords in shape.neighbors(&self.start) {
                    excluded[coords.as_slice().to_nd_index()] = true;
                }
            }
        }

        // candidate flat indices in row-major order, matching the standard layout of `excluded`
        let mut candidates: Vec<usize> = excluded
            .iter()
            .enumerate()
            .filter(|&(_, &is_excluded)| !is_excluded)
            .map(|(index, _)| index)
            .collect();

        // partial Fisher-Yates, the first `mines` candidates become mines
        let mut rng = SmallRng::seed_from_u64(self.seed);
        for i in 0..config.mines {
            let j = rng.random_range(i..candidates.len());
            candidates.swap(i, j);
        }

        let mut mine_mask = ArrayD::from_elem(shape.to_nd_index(), false);
        for &index in &candidates[..config.mines] {
            // candidates only hold indices below the cell count
            if let Ok(coords) = shape.from_index(index) {
                mine_mask[coords.as_slice().to_nd_index()] = true;
            }
        }

        let layout = MineLayout::from_mine_mask(shape.clone(), &mine_mask);

        // double check mine count
        if layout.mine_count() != config.mines {
            log::warn!(
                "Generated board count mismatch, actual: {}, requested: {}",
                layout.mine_count(),
                config.mines
            );
        }
        layout
    }
}

impl HyperMinesGame {
    pub fn generate<G: MineGenerator>(config: &GameConfig, generator: G) -> Self {
        Self::from_layout(generator.generate(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dims: &[Coord], mines: CellCount) -> GameConfig {
        GameConfig::new(dims, mines).unwrap()
    }

    #[test]
    fn places_requested_number_of_mines() {
        let config = config(&[6, 5, 4], 30);

        let layout = RandomMineGenerator::random(7).generate(&config);

        assert_eq!(layout.mine_count(), 30);
        assert_eq!(layout.shape(), &config.shape);
    }

    #[test]
    fn same_seed_same_layout() {
        let config = config(&[8, 8], 10);

        let first = RandomMineGenerator::random(42).generate(&config);
        let second = RandomMineGenerator::random(42).generate(&config);

        assert_eq!(first, second);
    }

    #[test]
    fn always_blank_start_reveals_a_region() {
        let config = config(&[5, 5, 5], 20);

        for seed in 0..16 {
            let generator = RandomMineGenerator::new(seed, &[2, 2, 2], StartCell::AlwaysBlank);
            let layout = generator.generate(&config);

            assert_eq!(layout.mine_count(), 20);
            assert_eq!(layout.cell_at(&[2, 2, 2]), Ok(BoardCell::Clear(0)));
        }
    }

    #[test]
    fn simple_safe_start_is_not_a_mine() {
        let config = config(&[3, 3], 8);

        let layout = RandomMineGenerator::new(3, &[1, 1], StartCell::SimpleSafe).generate(&config);

        assert_eq!(layout.contains_mine(&[1, 1]), Ok(false));
        assert_eq!(layout.cell_at(&[1, 1]), Ok(BoardCell::Clear(8)));
    }

    #[test]
    fn blank_start_falls_back_to_safe_when_crowded() {
        let config = config(&[3, 3], 6);

        let layout =
            RandomMineGenerator::new(9, &[0, 0], StartCell::AlwaysBlank).generate(&config);

        assert_eq!(layout.mine_count(), 6);
        assert_eq!(layout.contains_mine(&[0, 0]), Ok(false));
    }

    #[test]
    fn random_start_ignores_start_coordinates() {
        let config = config(&[4, 4], 5);

        let with_start = RandomMineGenerator::new(11, &[9, 9, 9], StartCell::Random).generate(&config);
        let without_start = RandomMineGenerator::random(11).generate(&config);

        assert_eq!(with_start, without_start);
        assert_eq!(with_start.mine_count(), 5);
    }

    #[test]
    fn full_board_is_all_mines() {
        let config = config(&[2, 2], 4);

        let layout = RandomMineGenerator::new(1, &[0, 0], StartCell::SimpleSafe).generate(&config);

        assert_eq!(layout.safe_cell_count(), 0);
    }

    #[test]
    fn generated_game_starts_ongoing() {
        let config = config(&[4, 4], 3);
        let generator = RandomMineGenerator::new(5, &[0, 0], StartCell::AlwaysBlank);

        let mut game = HyperMinesGame::generate(&config, generator);

        assert_eq!(game.state(), GameState::Ongoing);
        assert!(game.dig(&[0, 0]).unwrap().revealed >= 4);
    }
}

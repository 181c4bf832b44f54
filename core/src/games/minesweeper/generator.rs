use rand::prelude::*;
use rand::rngs::SmallRng;

use super::*;

pub trait MinefieldGenerator {
    fn generate(self, difficulty: Difficulty) -> Minefield;
}

/// Uniformly random placement: draws cells until enough distinct ones are mined.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, difficulty: Difficulty) -> Minefield {
        let total_cells = difficulty.total_cells();
        let (rows, cols) = difficulty.size;

        // optimize for full boards
        if difficulty.mines >= total_cells {
            if difficulty.mines > total_cells {
                log::warn!(
                    "Minefield already full, generated anyway, requested {} but only fits {}",
                    difficulty.mines,
                    total_cells
                );
            }
            return Minefield::from_mine_mask(Array2::from_elem(
                difficulty.size.to_nd_index(),
                true,
            ));
        }

        let mut mines: Array2<bool> = Array2::default(difficulty.size.to_nd_index());
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut placed = 0;
        while placed < difficulty.mines {
            let coords: Coord2 = (rng.gen_range(0..rows), rng.gen_range(0..cols));
            let cell = &mut mines[coords.to_nd_index()];
            if !*cell {
                *cell = true;
                placed += 1;
            }
        }

        Minefield::from_mine_mask(mines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn places_exact_mine_count() {
        for difficulty in [Difficulty::easy(), Difficulty::medium(), Difficulty::hard()] {
            let field = RandomMinefieldGenerator::new(7).generate(difficulty);
            assert_eq!(field.mine_count(), difficulty.mines);
            assert_eq!(field.size(), difficulty.size);
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let a = RandomMinefieldGenerator::new(99).generate(Difficulty::easy());
        let b = RandomMinefieldGenerator::new(99).generate(Difficulty::easy());
        assert_eq!(a, b);
    }

    #[test]
    fn overfull_request_fills_board() {
        let field = RandomMinefieldGenerator::new(1).generate(Difficulty::new_unchecked((2, 2), 9));
        assert_eq!(field.mine_count(), 4);
    }
}

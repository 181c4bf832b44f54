use rand::prelude::*;

use super::*;

/// Whether `value` can go on `coords` without repeating in its row, column or box.
pub fn can_place(grid: &Grid, (row, col): Coord2, value: u8) -> bool {
    let (row, col) = (usize::from(row), usize::from(col));
    if grid.row(row).iter().any(|&cell| cell == value) {
        return false;
    }
    if grid.column(col).iter().any(|&cell| cell == value) {
        return false;
    }
    let (box_row, box_col) = (row / BOX * BOX, col / BOX * BOX);
    !grid
        .slice(s![box_row..box_row + BOX, box_col..box_col + BOX])
        .iter()
        .any(|&cell| cell == value)
}

fn first_empty(grid: &Grid) -> Option<Coord2> {
    grid.indexed_iter()
        .find(|&(_, &cell)| cell == 0)
        .map(|((row, col), _)| (row as Coord, col as Coord))
}

/// Fills every empty cell, trying digits in ascending order.
pub fn solve(grid: &mut Grid) -> bool {
    let Some(coords) = first_empty(grid) else {
        return true;
    };
    for value in 1..=9 {
        if can_place(grid, coords, value) {
            grid[coords.to_nd_index()] = value;
            if solve(grid) {
                return true;
            }
        }
    }
    grid[coords.to_nd_index()] = 0;
    false
}

/// Number of completions of `grid`, counting no further than `limit`.
pub fn count_solutions(grid: &mut Grid, limit: usize) -> usize {
    let Some(coords) = first_empty(grid) else {
        return 1;
    };
    let mut found = 0;
    for value in 1..=9 {
        if can_place(grid, coords, value) {
            grid[coords.to_nd_index()] = value;
            found += count_solutions(grid, limit - found);
            if found >= limit {
                break;
            }
        }
    }
    grid[coords.to_nd_index()] = 0;
    found
}

/// Random complete grid: the three diagonal boxes are shuffled independently, the rest is solved.
pub fn generate_solved<R: Rng>(rng: &mut R) -> Grid {
    let mut grid = Grid::zeros((SIZE, SIZE));
    for start in (0..SIZE).step_by(BOX) {
        let mut digits: Vec<u8> = (1..=9).collect();
        digits.shuffle(rng);
        grid.slice_mut(s![start..start + BOX, start..start + BOX])
            .iter_mut()
            .zip(digits)
            .for_each(|(cell, digit)| *cell = digit);
    }
    let solved = solve(&mut grid);
    debug_assert!(solved, "diagonal boxes never conflict");
    grid
}

/// Blanks up to `config.removals` distinct cells of `solution`.
pub fn carve<R: Rng>(solution: &Grid, config: SudokuConfig, rng: &mut R) -> Grid {
    let mut cells: Vec<Coord2> = (0..SIZE as Coord)
        .flat_map(|row| (0..SIZE as Coord).map(move |col| (row, col)))
        .collect();
    cells.shuffle(rng);

    let mut puzzle = solution.clone();
    let mut removed = 0;
    for coords in cells {
        if removed == config.removals {
            break;
        }
        let value = puzzle[coords.to_nd_index()];
        puzzle[coords.to_nd_index()] = 0;
        if config.unique && count_solutions(&mut puzzle.clone(), 2) != 1 {
            puzzle[coords.to_nd_index()] = value;
            continue;
        }
        removed += 1;
    }

    if removed < config.removals {
        log::warn!(
            "Only {} of {} cells could be removed while keeping a unique solution",
            removed,
            config.removals
        );
    }
    puzzle
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;

    fn is_valid_solution(grid: &Grid) -> bool {
        let mut check = grid.clone();
        grid.indexed_iter().all(|((row, col), &value)| {
            let coords = (row as Coord, col as Coord);
            check[coords.to_nd_index()] = 0;
            let ok = (1..=9).contains(&value) && can_place(&check, coords, value);
            check[coords.to_nd_index()] = value;
            ok
        })
    }

    #[test]
    fn generated_grid_is_valid() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..5 {
            assert!(is_valid_solution(&generate_solved(&mut rng)));
        }
    }

    #[test]
    fn carving_removes_exact_count() {
        let mut rng = SmallRng::seed_from_u64(9);
        let solution = generate_solved(&mut rng);
        let config = SudokuConfig {
            removals: 40,
            unique: false,
        };
        let puzzle = carve(&solution, config, &mut rng);
        assert_eq!(puzzle.iter().filter(|&&cell| cell == 0).count(), 40);
    }

    #[test]
    fn unique_carving_has_one_solution() {
        let mut rng = SmallRng::seed_from_u64(21);
        let solution = generate_solved(&mut rng);
        let mut puzzle = carve(&solution, SudokuConfig::default(), &mut rng);

        assert_eq!(puzzle.iter().filter(|&&cell| cell == 0).count(), 40);
        assert_eq!(count_solutions(&mut puzzle.clone(), 2), 1);
        assert!(solve(&mut puzzle));
        assert_eq!(puzzle, solution);
    }

    #[test]
    fn empty_grid_has_many_solutions() {
        let mut grid = Grid::zeros((SIZE, SIZE));
        assert_eq!(count_solutions(&mut grid, 2), 2);
    }
}

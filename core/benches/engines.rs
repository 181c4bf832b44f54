use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use gamehub_core::games::minesweeper::Minefield;
use gamehub_core::*;

fn sudoku_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("sudoku");
    for (name, unique) in [("unique", true), ("loose", false)] {
        let config = SudokuConfig {
            removals: 40,
            unique,
        };
        let mut seed = 0;
        group.bench_function(name, |b| {
            b.iter(|| {
                seed += 1;
                Sudoku::new(config, black_box(seed))
            })
        });
    }
    group.finish();
}

fn minesweeper_flood_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("minesweeper");
    for (name, size) in [("easy", (9, 9)), ("hard", (16, 30)), ("max", (255, 255))] {
        let corner = (size.0 - 1, size.1 - 1);
        let minefield = Minefield::from_mine_coords(size, &[corner]).unwrap();
        group.bench_function(name, |b| {
            b.iter_batched(
                || Minesweeper::new(minefield.clone()),
                |mut game| game.reveal(black_box((0, 0))),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, sudoku_generation, minesweeper_flood_fill);
criterion_main!(benches);

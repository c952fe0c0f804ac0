use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use grid_mdp::mdp::{
    policy_iteration, value_iteration, CellType, Grid, GridWorldConfig, TransitionModel,
};

/// Square maze with a goal in one corner, a penalty in the other and a
/// broken wall across the middle row.
fn maze(size: usize) -> Grid {
    let mut cells = vec![
        (0, size - 1, CellType::Goal),
        (size - 1, 0, CellType::Penalty),
    ];
    let middle = size / 2;
    for col in 1..size - 1 {
        if col % 3 != 0 {
            cells.push((middle, col, CellType::Wall));
        }
    }
    Grid::with_cells(size, size, &cells).unwrap()
}

fn bench_solvers(c: &mut Criterion) {
    let config = GridWorldConfig::default();
    let mut group = c.benchmark_group("grid_world");

    for size in [6, 12, 24] {
        let grid = maze(size);
        let model = TransitionModel::new(&grid, &config).unwrap();

        group.bench_with_input(BenchmarkId::new("value_iteration", size), &model, |b, model| {
            b.iter(|| value_iteration(black_box(model), 1000, 1e-3).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("policy_iteration", size), &model, |b, model| {
            b.iter(|| policy_iteration(black_box(model), 1000, 1e-3).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_solvers);
criterion_main!(benches);

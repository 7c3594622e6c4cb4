use criterion::{black_box, criterion_group, criterion_main, Criterion};
use uniqdice::{
    dice::{DiceState, InitStrategy},
    driver::seeded_rng,
    game::GameRunner,
};

fn state(counts: [u8; 4]) -> DiceState {
    DiceState::new(counts).unwrap()
}

fn bench_sum(c: &mut Criterion) {
    let dice = state([1, 2, 0, 1]);
    c.bench_function("sum", |b| b.iter(|| black_box(&dice).sum()));
}

fn bench_init(c: &mut Criterion) {
    let mut group = c.benchmark_group("init");

    let mut rng = seeded_rng(0xd15c0);
    group.bench_function("independent", |b| b.iter(|| DiceState::random(&mut rng)));

    let mut rng = seeded_rng(0xd15c0);
    group.bench_function("stars_and_bars", |b| {
        b.iter(|| DiceState::random_stars_and_bars(&mut rng))
    });

    group.finish();
}

fn bench_roll(c: &mut Criterion) {
    let mut rng = seeded_rng(0xd15c0);
    let dice = state([1, 2, 0, 1]);
    c.bench_function("roll", |b| b.iter(|| black_box(dice).roll(&mut rng)));
}

fn bench_game_result(c: &mut Criterion) {
    let mut group = c.benchmark_group("game_result");

    let cases = [
        ("won", state([1, 1, 1, 1])),
        ("lost_easy", state([4, 0, 0, 0])),
        ("lost_hard", state([0, 0, 0, 4])),
        ("not_over", state([2, 1, 0, 1])),
    ];
    for (name, dice) in cases {
        group.bench_function(name, |b| b.iter(|| black_box(&dice).game_result()));
    }

    group.finish();
}

fn bench_play(c: &mut Criterion) {
    let mut group = c.benchmark_group("play");

    for init in InitStrategy::all() {
        let mut runner = GameRunner::new(seeded_rng(0xd15c0), init);
        group.bench_function(init.as_str(), |b| b.iter(|| runner.play()));
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sum,
    bench_init,
    bench_roll,
    bench_game_result,
    bench_play
);
criterion_main!(benches);

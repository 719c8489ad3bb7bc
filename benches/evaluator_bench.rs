use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;

use hoshi::board::{Game, Move, Position};
use hoshi::nn::{Evaluator, EvaluatorConfig};
use hoshi::recommend::{BestRawScoreRecommender, FuzzyBestLocalInvariantRecommender, Recommender};
use hoshi::symmetry::{CanonicalHash, ConverterRegistry};

fn middle_game() -> Game {
    let moves = [
        Move::play(3, 3),
        Move::play(7, 7),
        Move::play(3, 7),
        Move::play(7, 3),
        Move::play(5, 5),
        Move::play(4, 6),
        Move::play(6, 4),
    ];
    let mut game = Game::new(9).unwrap();
    for mv in moves {
        game = game.play(mv).unwrap();
    }
    game
}

fn evaluator(hidden_layers: usize, channels: usize) -> Evaluator {
    Evaluator::new(EvaluatorConfig {
        board_size: 9,
        hidden_layers,
        channels,
        seed: Some(42),
        threads: 0,
    })
    .unwrap()
}

fn bench_evaluate(c: &mut Criterion) {
    let game = middle_game();
    let evaluator = evaluator(7, 32);
    c.bench_function("evaluate_9x9_7x32_parallel", |b| {
        b.iter(|| evaluator.evaluate(black_box(&game), true).unwrap())
    });
    c.bench_function("evaluate_9x9_7x32_sequential", |b| {
        b.iter(|| evaluator.evaluate(black_box(&game), false).unwrap())
    });
}

fn bench_hash(c: &mut Criterion) {
    let game = middle_game();
    c.bench_function("canonical_hash_9x9", |b| {
        b.iter(|| CanonicalHash::of(black_box(&game)))
    });

    let hash = CanonicalHash::of(&game);
    let registry = ConverterRegistry::global();
    c.bench_function("converter_lookup", |b| {
        b.iter(|| registry.between(black_box(&hash), black_box(&hash)).unwrap())
    });
}

fn bench_recommend(c: &mut Criterion) {
    let game = middle_game();
    let evaluation = evaluator(2, 8).evaluate(&game, true).unwrap();
    c.bench_function("recommend_best_raw", |b| {
        b.iter(|| BestRawScoreRecommender.recommend_game_play(black_box(&evaluation)).unwrap())
    });
    c.bench_function("recommend_fuzzy_local", |b| {
        b.iter(|| {
            FuzzyBestLocalInvariantRecommender
                .recommend_game_play(black_box(&evaluation))
                .unwrap()
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(5));
    targets = bench_evaluate, bench_hash, bench_recommend
}
criterion_main!(benches);

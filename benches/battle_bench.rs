//! Full-battle throughput on seeded random rosters

use course_battle::battle::{BattleEngine, TeamRoster, DEFAULT_MAX_STEPS, DEFAULT_STEP_SECONDS};
use course_battle::core::BattleConfig;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn rosters(seed: u64) -> (TeamRoster, TeamRoster) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let player = TeamRoster::random(&mut rng, 7);
    let opponent = TeamRoster::random(&mut rng, 7);
    (player, opponent)
}

fn bench_full_battle(c: &mut Criterion) {
    let (player, opponent) = rosters(42);

    c.bench_function("full_battle_default_speed", |b| {
        b.iter(|| {
            let mut engine = BattleEngine::new(BattleConfig::default()).expect("valid config");
            engine.start(&player, &opponent);
            black_box(engine.run_to_completion(DEFAULT_STEP_SECONDS, DEFAULT_MAX_STEPS).cloned())
        })
    });

    c.bench_function("full_battle_4x_speed", |b| {
        b.iter(|| {
            let mut engine = BattleEngine::new(BattleConfig::default().with_speed(4.0)).expect("valid config");
            engine.start(&player, &opponent);
            black_box(engine.run_to_completion(DEFAULT_STEP_SECONDS, DEFAULT_MAX_STEPS).cloned())
        })
    });
}

fn bench_battle_batch(c: &mut Criterion) {
    let batch: Vec<_> = (0..32).map(rosters).collect();

    c.bench_function("battle_batch_32", |b| {
        b.iter(|| {
            for (player, opponent) in &batch {
                let mut engine = BattleEngine::new(BattleConfig::default()).expect("valid config");
                engine.start(player, opponent);
                black_box(engine.run_to_completion(DEFAULT_STEP_SECONDS, DEFAULT_MAX_STEPS));
            }
        })
    });
}

criterion_group!(benches, bench_full_battle, bench_battle_batch);
criterion_main!(benches);

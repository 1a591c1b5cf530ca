use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use set_table::{Card, Deck, SetOracle, StandardRules};
use std::hint::black_box;

/// Benchmark a single validity check
fn bench_is_valid_set(c: &mut Criterion) {
    let rules = StandardRules::default();
    let triple = [Card(0), Card(40), Card(80)];

    c.bench_function("is_valid_set", |b| {
        b.iter(|| rules.is_valid_set(black_box(&triple)));
    });
}

/// Benchmark the end-of-game check, which only needs the first set
fn bench_first_set(c: &mut Criterion) {
    let rules = StandardRules::default();
    let mut group = c.benchmark_group("find_first_set");

    for size in [12usize, 21, 81] {
        let deck = Deck::new(81, Some(7));
        let cards = &deck.cards()[..size];
        group.bench_with_input(BenchmarkId::from_parameter(size), &cards, |b, cards| {
            b.iter(|| rules.find_sets(black_box(cards), 1));
        });
    }

    group.finish();
}

/// Benchmark listing every set, as done for hints
fn bench_all_sets(c: &mut Criterion) {
    let rules = StandardRules::default();
    let mut group = c.benchmark_group("find_all_sets");

    for size in [12usize, 21, 81] {
        let deck = Deck::new(81, Some(7));
        let cards: Vec<Card> = deck.cards()[..size].to_vec();
        group.bench_with_input(BenchmarkId::from_parameter(size), &cards, |b, cards| {
            b.iter(|| rules.find_sets(black_box(cards), usize::MAX));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_is_valid_set, bench_first_set, bench_all_sets);
criterion_main!(benches);

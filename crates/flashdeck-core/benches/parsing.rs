use criterion::{black_box, criterion_group, criterion_main, Criterion};

use flashdeck_core::model::DeckLimits;
use flashdeck_core::parser::{parse_deck_str, validate_deck_edit};

fn bench_toml_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("toml_parsing");

    let small_toml = generate_deck_toml(5);
    let medium_toml = generate_deck_toml(100);
    let large_toml = generate_deck_toml(1_000);

    group.bench_function("5_cards", |b| {
        b.iter(|| parse_deck_str(black_box(&small_toml), black_box("bench.toml".as_ref())))
    });

    group.bench_function("100_cards", |b| {
        b.iter(|| parse_deck_str(black_box(&medium_toml), black_box("bench.toml".as_ref())))
    });

    group.bench_function("1000_cards", |b| {
        b.iter(|| parse_deck_str(black_box(&large_toml), black_box("bench.toml".as_ref())))
    });

    group.finish();
}

fn bench_validation(c: &mut Criterion) {
    let deck = parse_deck_str(&generate_deck_toml(1_000), "bench.toml".as_ref()).unwrap();
    let limits = DeckLimits::default();

    c.bench_function("validate_1000_cards", |b| {
        b.iter(|| validate_deck_edit(black_box(&deck), black_box(&limits)))
    });
}

fn generate_deck_toml(n: usize) -> String {
    let mut s = String::new();
    s.push_str(
        r##"[deck]
name = "bench"
color = "#336699"
description = "Benchmark deck"
public = true
"##,
    );
    for i in 0..n {
        s.push_str(&format!(
            r#"
[[cards]]
question = "What is {i} squared?"
answer = "{}"
"#,
            i * i
        ));
    }
    s
}

criterion_group!(benches, bench_toml_parsing, bench_validation);
criterion_main!(benches);

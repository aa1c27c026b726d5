use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use popscout::{filter, index_of, map_with_concurrency, PatternMatcher};
use std::convert::Infallible;
use std::num::NonZeroUsize;
use std::time::Duration;

/// Quadratic reference scan over lowercased chars
fn naive_index_of(text: &str, pattern: &str) -> Option<usize> {
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    if pattern.len() > text.len() {
        return None;
    }
    (0..=text.len() - pattern.len()).find(|&i| text[i..i + pattern.len()] == pattern[..])
}

fn bench_adversarial_input(c: &mut Criterion) {
    let mut group = c.benchmark_group("Adversarial Input");

    for len in [1_000, 10_000, 100_000] {
        // "aaa...a" searched for "aaa...ab" forces the naive scan to re-read
        let text = "a".repeat(len);
        let pattern = format!("{}b", "a".repeat(len / 100));

        group.bench_with_input(BenchmarkId::new("kmp", len), &len, |b, _| {
            b.iter(|| index_of(black_box(&text), black_box(&pattern)))
        });
        group.bench_with_input(BenchmarkId::new("naive", len), &len, |b, _| {
            b.iter(|| naive_index_of(black_box(&text), black_box(&pattern)))
        });
    }
    group.finish();
}

fn bench_label_filter(c: &mut Criterion) {
    let labels: Vec<String> = (0..10_000)
        .map(|i| format!("Country number {} of the Kroner Union", i))
        .collect();

    let mut group = c.benchmark_group("Label Filter");
    group.bench_function("filter_10k", |b| {
        b.iter(|| filter(black_box(&labels), black_box("9 of the kron")))
    });
    group.bench_function("reused_matcher_10k", |b| {
        let matcher = PatternMatcher::new("9 of the kron");
        b.iter(|| labels.iter().filter(|l| matcher.is_match(l)).count())
    });
    group.finish();
}

fn bench_concurrency_limit(c: &mut Criterion) {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(_) => return,
    };
    let items: Vec<usize> = (0..64).collect();

    let mut group = c.benchmark_group("Concurrency Limit");
    group.sample_size(10);
    for limit in [1, 8, 64] {
        let limit = NonZeroUsize::new(limit).unwrap_or(NonZeroUsize::MIN);
        group.bench_with_input(BenchmarkId::from_parameter(limit), &limit, |b, &limit| {
            b.to_async(&runtime).iter(|| {
                map_with_concurrency(
                    &items,
                    |item, _| async move {
                        tokio::time::sleep(Duration::from_millis(1)).await;
                        Ok::<_, Infallible>(item * 2)
                    },
                    limit,
                )
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_adversarial_input,
    bench_label_filter,
    bench_concurrency_limit
);
criterion_main!(benches);

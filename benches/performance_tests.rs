use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jrnl::vault::codec::{decode, encode, FileTimes};
use jrnl::{Entry, SearchEngine};

fn sample_entries(count: usize) -> Vec<Entry> {
    (0..count)
        .map(|i| {
            Entry::new(
                format!("Entry {} about the garden", i),
                "Watered the tomatoes. The garden needs weeding again.\n\n".repeat(20),
            )
        })
        .collect()
}

fn bench_search(c: &mut Criterion) {
    let entries = sample_entries(1_000);
    let engine = SearchEngine::new();

    c.bench_function("search_1000_entries", |b| {
        b.iter(|| engine.search(black_box(&entries), black_box("garden")))
    });
}

fn bench_codec(c: &mut Criterion) {
    let entry = sample_entries(1).remove(0);
    let encoded = encode(&entry, true);
    let times = FileTimes {
        created: None,
        modified: Utc::now(),
    };

    c.bench_function("encode_entry", |b| b.iter(|| encode(black_box(&entry), true)));
    c.bench_function("decode_entry", |b| {
        b.iter(|| decode(black_box(&encoded), "bench", times))
    });
}

criterion_group!(benches, bench_search, bench_codec);
criterion_main!(benches);

use criterion::{criterion_group, criterion_main, Criterion};
use storyline_core::tokenizer::normalize;
use storyline_core::{CorpusIndex, MovieRecord, Weighting};

const STORYLINE: &str = "A young wizard begins his journey at a magical school where he makes \
friends and enemies, facing dark forces along the way. When an ancient dragon wakes beneath \
the castle, the students must decide whom to trust before the winter solstice.";

fn synthetic_corpus(n: usize) -> Vec<MovieRecord> {
    let words = ["wizard", "detective", "dragon", "murder", "heist", "ocean", "space", "school",
        "village", "secret", "robot", "war", "love", "storm", "train", "island"];
    (0..n)
        .map(|i| {
            let plot: Vec<&str> = (0..12).map(|j| words[(i * 7 + j * 3) % words.len()]).collect();
            MovieRecord::new(format!("Movie {i}"), plot.join(" "))
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_storyline", |b| b.iter(|| normalize(STORYLINE)));
}

fn bench_recommend(c: &mut Criterion) {
    let index = CorpusIndex::build(synthetic_corpus(2_000), Weighting::default()).expect("non-empty corpus");
    c.bench_function("search_top5_2k_docs", |b| b.iter(|| index.search(STORYLINE, 5)));
}

criterion_group!(benches, bench_normalize, bench_recommend);
criterion_main!(benches);

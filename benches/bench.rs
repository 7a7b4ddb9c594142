// Criterion benchmarks for PG Recommender

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pg_recommender::core::{features::build_corpus_features, Recommender, TfidfModel};
use pg_recommender::models::{Corpus, GenderPolicy, Listing, RecommendOptions};

const TAGS: &[&str] = &["wifi", "quiet", "ac", "food", "gym", "laundry", "parking", "cctv"];
const REVIEWS: &[&str] = &[
    "clean rooms and friendly owner",
    "food could be better but wifi is fast",
    "close to college, noisy street at night",
    "spacious rooms, strict curfew",
];

fn create_listing(id: usize) -> Listing {
    let tags: Vec<&str> = TAGS.iter().copied().skip(id % 4).take(1 + id % 5).collect();
    let policy = if id % 2 == 0 { GenderPolicy::Female } else { GenderPolicy::Male };

    Listing::new(id.to_string(), format!("PG {}", id))
        .with_group((id % 10).to_string())
        .with_gender_policy(policy)
        .with_tags(&tags)
        .with_rating(3.0 + (id % 20) as f64 * 0.1)
        .with_review_text(REVIEWS[id % REVIEWS.len()])
}

fn create_corpus(size: usize) -> Corpus {
    Corpus::new((0..size).map(create_listing).collect())
}

fn bench_vectorizer_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("tfidf_fit");

    for size in [100, 1000].iter() {
        let corpus = create_corpus(*size);
        let features = build_corpus_features(&corpus);
        let documents: Vec<&str> = features.iter().map(|f| f.document.as_str()).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| TfidfModel::fit(black_box(&documents)));
        });
    }

    group.finish();
}

fn bench_recommend(c: &mut Criterion) {
    let recommender = Recommender::default();
    let mut group = c.benchmark_group("recommend");

    for size in [100, 1000].iter() {
        let corpus = create_corpus(*size);

        group.bench_with_input(BenchmarkId::new("similarity", size), size, |b, _| {
            let options = RecommendOptions::similarity(3, 0.45);
            b.iter(|| recommender.recommend(black_box(&corpus), black_box("PG 42"), &options));
        });

        group.bench_with_input(BenchmarkId::new("tag_overlap", size), size, |b, _| {
            let options = RecommendOptions::tag_overlap(6);
            b.iter(|| recommender.recommend(black_box(&corpus), black_box("PG 42"), &options));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_vectorizer_fit, bench_recommend);
criterion_main!(benches);

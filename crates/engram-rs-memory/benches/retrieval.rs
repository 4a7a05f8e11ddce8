use criterion::{Criterion, criterion_group, criterion_main};
use engram_rs_memory::{
    RuleSegmenter, Segmenter, chunk_content, chunk_document, cosine_similarity_scores,
};
use std::hint::black_box;

const PARAGRAPH: &str = "The scheduler assigns jobs to workers. Workers report progress every \
second. Failed jobs are retried with backoff. Operators inspect the queue from the dashboard. \
The dashboard shows throughput and latency for every worker. ";

fn document() -> String {
    PARAGRAPH.repeat(40)
}

fn bench_chunking(criterion: &mut Criterion) {
    let segmenter = RuleSegmenter::load();
    let text = document();
    let segmentation = match segmenter.segment(&text) {
        Ok(segmentation) => segmentation,
        Err(error) => {
            eprintln!("Skipping chunking benchmark: {error}");
            return;
        }
    };

    criterion.bench_function("chunk_content", |bencher| {
        bencher.iter(|| chunk_content(&segmenter, black_box(&text), 128).expect("chunk"));
    });
    criterion.bench_function("chunk_document", |bencher| {
        bencher.iter(|| chunk_document(black_box(&segmentation), 128));
    });
}

fn bench_similarity(criterion: &mut Criterion) {
    let dimensions = 384;
    let query: Vec<f32> = (0..dimensions).map(|i| (i as f32 * 0.37).sin()).collect();
    let candidates: Vec<Vec<f32>> = (0..1_000)
        .map(|row| {
            (0..dimensions)
                .map(|i| ((row * dimensions + i) as f32 * 0.11).cos())
                .collect()
        })
        .collect();

    criterion.bench_function("cosine_similarity_1000x384", |bencher| {
        bencher.iter(|| {
            cosine_similarity_scores(black_box(&query), black_box(&candidates)).expect("scores")
        });
    });
}

criterion_group!(benches, bench_chunking, bench_similarity);
criterion_main!(benches);

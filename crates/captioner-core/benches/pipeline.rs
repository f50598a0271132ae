//! Benchmarks for the captioning pipeline.
//!
//! Run with: cargo bench -p captioner-core

use std::io::Cursor;

use captioner_core::config::{LimitsConfig, SequencePadding};
use captioner_core::decoder::{GreedyDecoder, NextTokenModel};
use captioner_core::embedding::preprocess::preprocess;
use captioner_core::vocabulary::{normalize_caption, Normalization};
use captioner_core::{extract_action, PipelineError, Vocabulary};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, ImageFormat};

const CAPTIONS: &[&str] = &[
    "A child in a pink dress is climbing up a set of stairs in an entry way .",
    "A black dog and a spotted dog are fighting",
    "A little girl covered in paint sits in front of a painted rainbow with her hands in a bowl .",
    "A man lays on a bench while his dog sits by him .",
    "Two dogs of different breeds looking at each other on the road .",
];

fn corpus() -> Vec<String> {
    CAPTIONS
        .iter()
        .cycle()
        .take(5_000)
        .map(|c| normalize_caption(c, Normalization::Literal))
        .collect()
}

/// Always predicts the word after the last one in the sequence.
struct Walker(usize);

impl NextTokenModel for Walker {
    fn predict(&self, _: &[f32], sequence: &[i64]) -> Result<Vec<f32>, PipelineError> {
        let last = sequence.iter().rev().find(|&&t| t != 0).copied().unwrap_or(0) as usize;
        let mut probs = vec![0.0; self.0];
        probs[(last % (self.0 - 1)) + 1] = 1.0;
        Ok(probs)
    }
}

fn benchmark_vocabulary_fit(c: &mut Criterion) {
    let captions = corpus();

    c.bench_function("vocabulary_fit_5k", |b| {
        b.iter(|| Vocabulary::fit(black_box(captions.iter().map(String::as_str))))
    });
}

fn benchmark_preprocess(c: &mut Criterion) {
    let img = DynamicImage::new_rgb8(1920, 1080);

    c.bench_function("preprocess_224_bgr", |b| {
        b.iter(|| preprocess(black_box(&img), 224))
    });
}

fn benchmark_decode(c: &mut Criterion) {
    let mut bytes = Vec::new();
    DynamicImage::new_rgb8(640, 480)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .unwrap();

    let decoder = captioner_core::pipeline::ImageDecoder::new(LimitsConfig::default());
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("decode_jpeg_640x480", |b| {
        b.iter(|| {
            let _ = rt.block_on(decoder.decode_bytes(black_box(bytes.clone()), "bench.jpg"));
        })
    });
}

fn benchmark_greedy_decode(c: &mut Criterion) {
    let captions = corpus();
    let vocab = Vocabulary::fit(captions.iter().map(String::as_str)).unwrap();
    let model = Walker(vocab.cardinality());
    let decoder = GreedyDecoder::new(35, SequencePadding::Post);
    let features = vec![0.0f32; 4096];

    c.bench_function("greedy_decode_35", |b| {
        b.iter(|| decoder.decode(&model, &vocab, black_box(&features)))
    });
}

fn benchmark_action(c: &mut Criterion) {
    c.bench_function("extract_action", |b| {
        b.iter(|| extract_action(black_box("two dogs of different breeds looking at each other")))
    });
}

criterion_group!(
    benches,
    benchmark_vocabulary_fit,
    benchmark_preprocess,
    benchmark_decode,
    benchmark_greedy_decode,
    benchmark_action,
);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array2;
use sentiment_analyzer::{
    normalize, ClassifierInput, Label, NormalizedText, Predict, SentimentAnalyzer, Transform,
};

struct BareEstimator;

impl Predict for BareEstimator {
    fn accepts_raw_text(&self) -> bool {
        false
    }

    fn predict(&self, input: ClassifierInput<'_>) -> anyhow::Result<Vec<Label>> {
        Ok(vec![Label::POSITIVE; input.len()])
    }
}

struct HashingVectorizer;

impl Transform for HashingVectorizer {
    fn transform(&self, texts: &[String]) -> anyhow::Result<Array2<f32>> {
        let mut features = Array2::zeros((texts.len(), 64));
        for (row, text) in texts.iter().enumerate() {
            for word in text.split(' ') {
                let bucket = word.bytes().fold(0usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize)) % 64;
                features[[row, bucket]] += 1.0;
            }
        }
        Ok(features)
    }
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("Normalize");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    group.bench_function("short_text", |b| b.iter(|| normalize(black_box("Great movie!!"))));

    group.bench_function("with_urls", |b| b.iter(|| {
        normalize(black_box(
            "Check https://example.com/review?id=42 and www.example.org, 10/10 would watch again!",
        ))
    }));

    group.bench_function("long_text", |b| b.iter(|| {
        normalize(black_box(
            "This is a much longer review that contains multiple sentences and should \
             take more time to process. It includes various words, punctuation marks, \
             digits like 2024 and 5/5, plus a link to http://reviews.example.com/long.\n\n\
             The second paragraph keeps going so the whitespace collapsing has plenty \
             of\ttabs   and   runs of spaces to deal with.",
        ))
    }));

    group.finish();
}

fn bench_predict(c: &mut Criterion) {
    let analyzer = SentimentAnalyzer::builder()
        .with_classifier(BareEstimator)
        .with_transformer(HashingVectorizer)
        .build()
        .unwrap();
    let text = NormalizedText::new("an absolutely wonderful film with a great cast");

    c.bench_function("predict_dispatch", |b| b.iter(|| analyzer.predict(black_box(&text)).unwrap()));
    c.bench_function("analyze_end_to_end", |b| b.iter(|| {
        analyzer.analyze(black_box("An absolutely WONDERFUL film!!! https://t.co/x")).unwrap()
    }));
}

criterion_group!(benches, bench_normalize, bench_predict);
criterion_main!(benches);

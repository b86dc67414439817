use criterion::{Criterion, criterion_group, criterion_main};
use formatted_text_engine::FormattedText;

fn tagged_text(pairs: usize) -> String {
    (0..pairs)
        .map(|i| format!("before {{[tag#label:{i}]}}inside{{[/tag]}} after"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn bench_tag_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("tags");
    group.sample_size(20);

    let content = tagged_text(100);

    group.bench_function("parse_100_tag_pairs", |b| {
        b.iter(|| {
            let mut text = FormattedText::new();
            text.append_text(std::hint::black_box(&content));
            std::hint::black_box(text.tags().len());
        });
    });

    group.bench_function("formatted_projection", |b| {
        let text = FormattedText::from_text(&content);
        b.iter(|| {
            std::hint::black_box(text.formatted_text());
        });
    });

    group.bench_function("edit_inside_tagged_line", |b| {
        b.iter(|| {
            let mut text = FormattedText::from_text(std::hint::black_box(&content));
            text.remove_text(50, 10, 4).unwrap();
            text.insert_text("abcd", 50, 10).unwrap();
            std::hint::black_box(text.tags().len());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_tag_engine);
criterion_main!(benches);

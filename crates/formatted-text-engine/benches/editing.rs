use criterion::{Criterion, criterion_group, criterion_main};
use formatted_text_engine::FormattedText;

fn sample_text(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("line {i} with some filler content"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn bench_edit_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("editing");
    group.sample_size(20);

    let content = sample_text(200);

    group.bench_function("append_200_lines", |b| {
        b.iter(|| {
            let mut text = FormattedText::new();
            text.append_text(std::hint::black_box(&content));
            std::hint::black_box(text.line_count());
        });
    });

    group.bench_function("insert_mid_buffer", |b| {
        let base = FormattedText::from_text(&content);
        b.iter(|| {
            let mut text = FormattedText::from_text(&base.unformatted_text());
            text.insert_text(std::hint::black_box("inserted\ntext"), 100, 5)
                .unwrap();
            std::hint::black_box(text.char_count());
        });
    });

    group.bench_function("move_text_between_lines", |b| {
        b.iter(|| {
            let mut text = FormattedText::from_text(std::hint::black_box(&content));
            text.move_text(10, 0, 8, 150, 0).unwrap();
            std::hint::black_box(text.unformatted_text());
        });
    });

    group.bench_function("anchor_heavy_removal", |b| {
        b.iter(|| {
            let mut text = FormattedText::from_text(std::hint::black_box(&content));
            let anchors: Vec<_> = (0..200)
                .filter_map(|i| text.create_anchor(i, 3, false))
                .collect();
            text.remove_text_at(50, 2000).unwrap();
            std::hint::black_box(anchors.iter().filter(|a| a.is_valid()).count());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_edit_operations);
criterion_main!(benches);

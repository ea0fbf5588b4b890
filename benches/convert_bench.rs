//! Benchmarks for comment-document conversion at varying document sizes.
//!
//! Run with: `cargo bench --bench convert_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use danmaku_loader::display::DisplayBounds;
use danmaku_loader::loader::{resolve_layout, LayoutOverrides};
use danmaku_loader::overlay::{AssWriter, Converter, XmlCommentConverter};

/// Generate a comment document with `count` comments spread over ten minutes.
///
/// Mixes scroll, top, bottom and reverse comments with ASCII and CJK text so
/// both lane placement and width estimation get exercised.
fn generate_document(count: usize) -> String {
    let texts = [
        "hello world",
        "前方高能",
        "2333333",
        "this part is amazing lol",
        "弹幕护体",
        "{escaped} text",
    ];
    let modes = [1, 1, 1, 5, 4, 6];
    let colors = [16_777_215, 16_711_680, 65_280, 255];

    let mut doc = String::with_capacity(count * 80 + 64);
    doc.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<i>\n");
    for i in 0..count {
        let time = (i as f64 * 600.0) / count as f64;
        doc.push_str(&format!(
            "<d p=\"{time:.3},{},25,{},1422201084,0,eff68b3b,{i}\">{}</d>\n",
            modes[i % modes.len()],
            colors[i % colors.len()],
            texts[i % texts.len()],
        ));
    }
    doc.push_str("</i>\n");
    doc
}

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("xml_convert");
    let layout = resolve_layout(
        1280,
        720,
        DisplayBounds::new(1920, 1080),
        &LayoutOverrides::default().with_still_duration(5),
        "sans-serif",
    );
    let converter = XmlCommentConverter::new();

    let sizes: &[(usize, &str)] = &[
        (100, "100"),
        (1_000, "1k"),
        (10_000, "10k"),
        (50_000, "50k"),
    ];

    for &(count, label) in sizes {
        let doc = generate_document(count);

        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(BenchmarkId::new("convert", label), &doc, |b, doc| {
            b.iter(|| black_box(converter.convert(black_box(doc.as_bytes()), &layout).unwrap()));
        });
    }

    group.finish();
}

fn bench_ass_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("ass_render");
    let layout = resolve_layout(
        1920,
        1080,
        DisplayBounds::new(1920, 1080),
        &LayoutOverrides::default().with_still_duration(5),
        "sans-serif",
    );
    let writer = AssWriter::new();

    for &(count, label) in &[(1_000, "1k"), (10_000, "10k")] {
        let track = XmlCommentConverter::new()
            .convert(generate_document(count).as_bytes(), &layout)
            .unwrap();

        group.throughput(Throughput::Elements(track.len() as u64));
        group.bench_with_input(BenchmarkId::new("render", label), &track, |b, track| {
            b.iter(|| black_box(writer.render(black_box(track))));
        });
    }

    group.finish();
}

fn bench_resolve_layout(c: &mut Criterion) {
    let overrides = LayoutOverrides::default();
    let bounds = DisplayBounds::new(1920, 1080);

    c.bench_function("resolve_layout", |b| {
        b.iter(|| {
            black_box(resolve_layout(
                black_box(3840),
                black_box(2160),
                bounds,
                &overrides,
                "sans-serif",
            ))
        });
    });
}

criterion_group!(benches, bench_convert, bench_ass_render, bench_resolve_layout);
criterion_main!(benches);

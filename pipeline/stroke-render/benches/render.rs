use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sketchraster_helpers::PenMove;
use stroke_render::render_drawing;

/// Synthetic drawing: a handful of zig-zag strokes spanning the coordinate
/// range a real sketch dump uses.
fn zigzag_drawing(strokes: usize, points_per_stroke: usize) -> Vec<PenMove> {
    let mut drawing = Vec::with_capacity(strokes * points_per_stroke);
    for s in 0..strokes {
        for p in 0..points_per_stroke {
            let dx = if p % 2 == 0 { 9 } else { -4 };
            let dy = 1 + (s % 3) as i32;
            let lift = if p + 1 == points_per_stroke { 1 } else { 0 };
            drawing.push(PenMove::new(dx, dy, lift));
        }
    }
    drawing
}

fn bench_render_drawing(c: &mut Criterion) {
    let drawing = zigzag_drawing(8, 40);

    c.bench_function("render_drawing_8x40_256x256", |b| {
        b.iter(|| {
            let canvas = render_drawing(black_box(&drawing), (256, 256)).expect("non-empty");
            black_box(canvas);
        });
    });

    c.bench_function("render_drawing_8x40_64x64", |b| {
        b.iter(|| {
            let canvas = render_drawing(black_box(&drawing), (64, 64)).expect("non-empty");
            black_box(canvas);
        });
    });
}

criterion_group!(benches, bench_render_drawing);
criterion_main!(benches);

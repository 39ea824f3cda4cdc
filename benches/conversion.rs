use color_probe::capture::{fill_test_pattern, RawFrame};
use color_probe::conversion::{center_sample, decode_nv21};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_decode(c: &mut Criterion) {
    let (width, height) = (640, 480);
    let mut buffer = vec![0u8; RawFrame::expected_len(width, height)];
    fill_test_pattern(&mut buffer, width, height, 7);

    c.bench_function("decode_nv21 640x480", |b| {
        b.iter(|| {
            let frame = RawFrame::new(black_box(&buffer), width, height).unwrap();
            decode_nv21(&frame)
        })
    });

    c.bench_function("decode + center sample 640x480", |b| {
        b.iter(|| {
            let frame = RawFrame::new(black_box(&buffer), width, height).unwrap();
            center_sample(&decode_nv21(&frame)).unwrap()
        })
    });
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);

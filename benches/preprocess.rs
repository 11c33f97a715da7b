use circle_detector::detector::edges::{Gradients, canny};
use circle_detector::utils::blur::median_blur;
use circle_detector::utils::grayscale::{rgb_to_grayscale, rgb_to_grayscale_parallel, to_luma};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{GrayImage, Luma, Rgb, RgbImage};

fn bench_rgb_to_grayscale_medium(c: &mut Criterion) {
    let image = vec![128u8; 640 * 480 * 3];
    c.bench_function("rgb_to_grayscale_640x480", |b| {
        b.iter(|| rgb_to_grayscale(black_box(&image), black_box(640), black_box(480)))
    });
}

fn bench_rgb_to_grayscale_parallel_medium(c: &mut Criterion) {
    let image = vec![128u8; 640 * 480 * 3];
    c.bench_function("rgb_to_grayscale_parallel_640x480", |b| {
        b.iter(|| rgb_to_grayscale_parallel(black_box(&image), black_box(640), black_box(480)))
    });
}

fn bench_to_luma_large(c: &mut Criterion) {
    let image = RgbImage::from_pixel(1920, 1080, Rgb([128, 64, 32]));
    c.bench_function("to_luma_1920x1080", |b| b.iter(|| to_luma(black_box(&image))));
}

fn bench_median_blur_medium(c: &mut Criterion) {
    let gray = GrayImage::from_fn(640, 480, |x, y| Luma([((x ^ y) & 0xff) as u8]));
    c.bench_function("median_blur_640x480", |b| b.iter(|| median_blur(black_box(&gray))));
}

fn bench_sobel_canny_medium(c: &mut Criterion) {
    let gray = GrayImage::from_fn(640, 480, |x, y| Luma([((x ^ y) & 0xff) as u8]));
    c.bench_function("sobel_canny_640x480", |b| {
        b.iter(|| {
            let grad = Gradients::sobel(black_box(&gray));
            canny(&grad, 30.0, 60.0)
        })
    });
}

criterion_group!(
    benches,
    bench_rgb_to_grayscale_medium,
    bench_rgb_to_grayscale_parallel_medium,
    bench_to_luma_large,
    bench_median_blur_medium,
    bench_sobel_canny_medium
);
criterion_main!(benches);

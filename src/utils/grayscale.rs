/// Convert RGB image to grayscale
/// Y = 0.299*R + 0.587*G + 0.114*B
/// Uses fast integer arithmetic: Y = (4899*R + 9617*G + 1868*B + 2^13) >> 14
use image::{GrayImage, RgbImage};
use rayon::prelude::*;

/// Coefficients for grayscale conversion, scaled by 2^14
const COEF_R: u32 = 4899;
const COEF_G: u32 = 9617;
const COEF_B: u32 = 1868;
const SHIFT: u32 = 14;
const ROUND: u32 = 1 << (SHIFT - 1);

/// Images with at least this many pixels are converted row-parallel
const PARALLEL_MIN_PIXELS: usize = 256 * 256;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32 + ROUND) >> SHIFT;
    lum.min(255) as u8
}

/// Convert raw RGB bytes to grayscale
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    let pixel_count = width * height;
    let mut gray = vec![0u8; pixel_count];
    for (out, px) in gray.iter_mut().zip(rgb.chunks_exact(3)) {
        *out = luma(px[0], px[1], px[2]);
    }
    gray
}

/// Convert RGB to grayscale using parallel processing
/// Processes rows in parallel for multi-core speedup
pub fn rgb_to_grayscale_parallel(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    let pixel_count = width * height;
    let mut gray = vec![0u8; pixel_count];
    if width == 0 {
        return gray;
    }

    gray.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let row_start = y * width * 3;
        let src = &rgb[row_start..row_start + width * 3];
        for (out, px) in row.iter_mut().zip(src.chunks_exact(3)) {
            *out = luma(px[0], px[1], px[2]);
        }
    });

    gray
}

/// Convert an RGB image to a single-channel intensity image, picking the
/// parallel path for larger inputs. Output is identical either way.
pub fn to_luma(image: &RgbImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);
    let gray = if w * h >= PARALLEL_MIN_PIXELS {
        rgb_to_grayscale_parallel(image.as_raw(), w, h)
    } else {
        rgb_to_grayscale(image.as_raw(), w, h)
    };
    // Length is width * height by construction
    GrayImage::from_raw(width, height, gray).unwrap_or_else(|| GrayImage::new(width, height))
}

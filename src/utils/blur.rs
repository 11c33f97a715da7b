/// Median smoothing for suppressing speckle before edge detection
use image::GrayImage;
use imageproc::filter::median_filter;

/// Side length of the square median neighborhood
pub const MEDIAN_KERNEL_SIZE: u32 = 15;

/// Apply a `MEDIAN_KERNEL_SIZE` x `MEDIAN_KERNEL_SIZE` median filter.
///
/// Pixels outside the image take the value of the nearest edge pixel.
pub fn median_blur(gray: &GrayImage) -> GrayImage {
    let radius = MEDIAN_KERNEL_SIZE / 2;
    median_filter(gray, radius, radius)
}

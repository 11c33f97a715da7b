/// Region extraction on color images
use image::RgbImage;
use image::imageops::crop_imm;

use crate::config::CropRegion;

/// Copy out the pixels of `region`, or the whole image when absent.
///
/// The region must already have been checked to lie inside the image.
pub fn crop_region(image: &RgbImage, region: Option<&CropRegion>) -> RgbImage {
    match region {
        Some(r) => crop_imm(image, r.x, r.y, r.width, r.height).to_image(),
        None => image.clone(),
    }
}

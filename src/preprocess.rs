//! Image preprocessing: crop, intensity conversion and optional smoothing

use image::{GrayImage, RgbImage};

use crate::config::DetectionParameters;
use crate::error::{Error, Result};
use crate::utils::blur::median_blur;
use crate::utils::crop::crop_region;
use crate::utils::grayscale::to_luma;

/// Buffers produced by the preprocessing stage, all in crop coordinates.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    /// Cropped color buffer (annotation target for diagnostics)
    pub color: RgbImage,
    /// Intensity buffer handed to the circle search
    pub gray: GrayImage,
    /// Whether `gray` was median-smoothed
    pub blurred: bool,
}

/// Reject images that are not a usable 2-D pixel grid
pub fn check_image(image: &RgbImage) -> Result<()> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::ImageFormat(format!(
            "image has zero dimension ({}x{})",
            width, height
        )));
    }
    Ok(())
}

/// Crop, convert to intensity and, unless `skip_blur` is set, smooth.
///
/// The crop region is assumed to lie within the image.
pub fn preprocess(image: &RgbImage, params: &DetectionParameters) -> Result<Preprocessed> {
    check_image(image)?;

    let color = crop_region(image, params.crop.as_ref());
    let gray = to_luma(&color);
    let (gray, blurred) = if params.skip_blur {
        (gray, false)
    } else {
        (median_blur(&gray), true)
    };

    tracing::debug!(
        "preprocessed {}x{} buffer (blurred: {})",
        gray.width(),
        gray.height(),
        blurred
    );

    Ok(Preprocessed {
        color,
        gray,
        blurred,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CropRegion;
    use image::Rgb;

    #[test]
    fn test_crop_sets_buffer_space() {
        let img = RgbImage::from_pixel(100, 80, Rgb([200, 200, 200]));
        let params = DetectionParameters::default()
            .with_crop(CropRegion::new(10, 5, 40, 30))
            .with_skip_blur(true);
        let pre = preprocess(&img, &params).unwrap();
        assert_eq!(pre.gray.dimensions(), (40, 30));
        assert_eq!(pre.color.dimensions(), (40, 30));
        assert!(!pre.blurred);
    }

    #[test]
    fn test_blur_applied_by_default() {
        let img = RgbImage::from_pixel(30, 30, Rgb([0, 0, 0]));
        let pre = preprocess(&img, &DetectionParameters::default()).unwrap();
        assert!(pre.blurred);
        assert_eq!(pre.gray.dimensions(), (30, 30));
    }

    #[test]
    fn test_zero_sized_image_rejected() {
        let img = RgbImage::new(0, 10);
        let err = preprocess(&img, &DetectionParameters::default()).unwrap_err();
        assert!(matches!(err, Error::ImageFormat(_)));
    }

    #[test]
    fn test_caller_image_untouched() {
        let img = RgbImage::from_fn(20, 20, |x, y| Rgb([x as u8, y as u8, 7]));
        let before = img.clone();
        let _ = preprocess(&img, &DetectionParameters::default()).unwrap();
        assert_eq!(img, before);
    }
}

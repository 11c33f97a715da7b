use std::path::Path;

use image::RgbImage;

use crate::config::{CropRegion, DetectionParameters};
use crate::detector::edges::{Gradients, canny, canny_thresholds};
use crate::error::{Error, Result};
use crate::pipeline::check_inputs;
use crate::preprocess::preprocess;

/// Load an image from disk as 8-bit RGB.
pub fn load_rgb<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|e| {
        Error::ImageUnavailable(format!("failed to load {}: {}", path.display(), e))
    })?;
    Ok(img.to_rgb8())
}

/// Parse a crop given as `x,y,width,height`.
pub fn parse_crop(text: &str) -> Result<CropRegion> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    let values: Vec<u32> = parts
        .iter()
        .map(|p| p.parse::<u32>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| Error::InvalidConfig(format!("bad crop {:?}: {}", text, e)))?;
    match values.as_slice() {
        [x, y, w, h] => Ok(CropRegion::new(*x, *y, *w, *h)),
        _ => Err(Error::InvalidConfig(format!(
            "crop {:?} must be x,y,width,height",
            text
        ))),
    }
}

/// Parameters used by the reference fixture scenario: crop (115,0)-(600,440),
/// no blur, min_dist equal to min_radius.
pub fn fixture_params() -> DetectionParameters {
    let defaults = DetectionParameters::default();
    DetectionParameters {
        min_dist: defaults.min_radius as f64,
        skip_blur: true,
        crop: Some(CropRegion::new(115, 0, 485, 440)),
        ..defaults
    }
}

/// What the circle search sees for one image: the crop it works on and how
/// much edge evidence that crop carries.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    /// Crop origin in the original image, `(0, 0)` without a crop
    pub origin: (u32, u32),
    /// Search buffer size
    pub dimensions: (u32, u32),
    /// Whether the buffer was median-smoothed
    pub blurred: bool,
    /// Darkest intensity in the buffer
    pub min: u8,
    /// Brightest intensity in the buffer
    pub max: u8,
    pub mean: f64,
    /// Pixels kept by the Canny stage at `param1`
    pub edge_pixels: usize,
}

impl SearchReport {
    /// Fraction of buffer pixels that are edges
    pub fn edge_density(&self) -> f64 {
        let area = self.dimensions.0 as f64 * self.dimensions.1 as f64;
        if area == 0.0 {
            0.0
        } else {
            self.edge_pixels as f64 / area
        }
    }
}

/// Preprocess `image` under `params` and summarize the resulting search buffer.
pub fn search_report(image: &RgbImage, params: &DetectionParameters) -> Result<SearchReport> {
    check_inputs(image, params)?;
    let pre = preprocess(image, params)?;
    let gray = &pre.gray;

    let (min, max, sum) = gray
        .as_raw()
        .iter()
        .fold((u8::MAX, u8::MIN, 0u64), |(lo, hi, sum), &v| {
            (lo.min(v), hi.max(v), sum + v as u64)
        });
    let (low, high) = canny_thresholds(params.param1);
    let edges = canny(&Gradients::sobel(gray), low, high);

    Ok(SearchReport {
        origin: params.crop.map_or((0, 0), |c| (c.x, c.y)),
        dimensions: gray.dimensions(),
        blurred: pre.blurred,
        min,
        max,
        mean: sum as f64 / gray.as_raw().len() as f64,
        edge_pixels: edges.count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_parse_crop() {
        assert_eq!(parse_crop("115, 0, 485, 440").unwrap(), CropRegion::new(115, 0, 485, 440));
        assert!(parse_crop("1,2,3").is_err());
        assert!(parse_crop("a,b,c,d").is_err());
    }

    #[test]
    fn test_fixture_params_valid() {
        let params = fixture_params();
        assert!(params.validate().is_ok());
        assert_eq!(params.min_dist, 35.0);
    }

    #[test]
    fn test_search_report_covers_crop_only() {
        // Bright square on the left half, outside the crop
        let image = RgbImage::from_fn(40, 20, |x, y| {
            if (4..14).contains(&x) && (4..14).contains(&y) {
                Rgb([200, 200, 200])
            } else {
                Rgb([20, 20, 20])
            }
        });
        let params = DetectionParameters {
            crop: Some(CropRegion::new(20, 0, 20, 20)),
            skip_blur: true,
            ..Default::default()
        };
        let report = search_report(&image, &params).unwrap();
        assert_eq!(report.origin, (20, 0));
        assert_eq!(report.dimensions, (20, 20));
        assert!(!report.blurred);
        assert_eq!((report.min, report.max), (20, 20));
        assert_eq!(report.mean, 20.0);
        assert_eq!(report.edge_pixels, 0);

        let full = DetectionParameters { crop: None, ..params };
        let report = search_report(&image, &full).unwrap();
        assert_eq!(report.origin, (0, 0));
        assert_eq!(report.max, 200);
        assert!(report.edge_pixels > 0);
        assert!(report.edge_density() > 0.0 && report.edge_density() < 1.0);
    }

    #[test]
    fn test_search_report_rejects_bad_crop() {
        let image = RgbImage::new(10, 10);
        let params = DetectionParameters {
            crop: Some(CropRegion::new(5, 5, 10, 10)),
            ..Default::default()
        };
        assert!(matches!(
            search_report(&image, &params),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load_rgb("does/not/exist.png"),
            Err(Error::ImageUnavailable(_))
        ));
    }
}

//! Canonical detection pipeline
//!
//! raw image -> preprocess -> Hough search -> radius gate -> remap -> rank
//! -> detections. The pipeline itself does no I/O; artifacts leave only
//! through a caller-supplied [`DiagnosticSink`].

use image::RgbImage;

use crate::config::DetectionParameters;
use crate::detector::filter::{filter_candidates, remap_to_original};
use crate::detector::format::format_detections;
use crate::detector::hough::hough_circles;
use crate::detector::rank::rank_by_radius;
use crate::diagnostics::{DiagnosticPolicy, DiagnosticSink, FileSink, annotate, settle};
use crate::error::{Error, Result};
use crate::models::{Circle, Detection};
use crate::preprocess::{check_image, preprocess};

/// Per-call options, independent of the detection parameters
pub struct DetectionRequest<'a> {
    /// Express returned centers in original-image coordinates
    pub apply_offset: bool,
    /// Optional receiver of intermediate artifacts
    pub sink: Option<&'a mut dyn DiagnosticSink>,
    /// How sink failures are handled
    pub policy: DiagnosticPolicy,
}

impl<'a> DetectionRequest<'a> {
    /// Request without diagnostics
    pub fn new(apply_offset: bool) -> Self {
        Self {
            apply_offset,
            sink: None,
            policy: DiagnosticPolicy::Lenient,
        }
    }

    /// Attach a diagnostic sink
    pub fn with_sink(mut self, sink: &'a mut dyn DiagnosticSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Set the failure policy for the sink
    pub fn with_policy(mut self, policy: DiagnosticPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Validate `params` against `image`: parameter ranges, a usable pixel grid,
/// and a crop inside the image bounds
pub fn check_inputs(image: &RgbImage, params: &DetectionParameters) -> Result<()> {
    params.validate()?;
    check_image(image)?;
    if let Some(crop) = &params.crop {
        if !crop.fits_within(image.width(), image.height()) {
            return Err(Error::InvalidConfig(format!(
                "crop {:?} lies outside the {}x{} image",
                crop,
                image.width(),
                image.height()
            )));
        }
    }
    Ok(())
}

/// Ranked circles, before conversion to detections
pub fn find_circles(
    image: &RgbImage,
    params: &DetectionParameters,
    request: DetectionRequest<'_>,
) -> Result<Vec<Circle>> {
    check_inputs(image, params)?;

    let DetectionRequest {
        apply_offset,
        mut sink,
        policy,
    } = request;

    let pre = preprocess(image, params)?;
    if pre.blurred {
        if let Some(sink) = sink.as_deref_mut().filter(|s| s.wants_blurred()) {
            settle(sink.blurred(&pre.gray), policy)?;
        }
    }

    let candidates = hough_circles(&pre.gray, params)?;
    let circles = filter_candidates(&candidates);
    tracing::debug!(
        "{} candidates, {} at or above the radius floor",
        candidates.len(),
        circles.len()
    );

    if let Some(sink) = sink.as_deref_mut().filter(|s| s.wants_annotated()) {
        let annotated = annotate(&pre.color, &circles);
        settle(sink.annotated(&annotated), policy)?;
    }

    let mut circles = if apply_offset {
        remap_to_original(circles, params.crop.as_ref())
    } else {
        circles
    };
    rank_by_radius(&mut circles);
    Ok(circles)
}

/// Detect circles and return them as ranked bounding-box detections.
///
/// With `apply_offset` and a crop region, centers are in original-image
/// coordinates; otherwise they are relative to the searched buffer.
pub fn detect(
    image: &RgbImage,
    params: &DetectionParameters,
    apply_offset: bool,
) -> Result<Vec<Detection>> {
    detect_with_request(image, params, DetectionRequest::new(apply_offset))
}

/// [`detect`] with an explicit request carrying diagnostics options
pub fn detect_with_request(
    image: &RgbImage,
    params: &DetectionParameters,
    request: DetectionRequest<'_>,
) -> Result<Vec<Detection>> {
    let circles = find_circles(image, params, request)?;
    Ok(format_detections(&circles))
}

/// Path-based invocation form.
///
/// `output_path` receives the annotated crop (empty string disables it);
/// `output_blur` additionally writes the smoothed buffer as `blurred.jpg`
/// next to it. Write failures are logged, not returned.
pub fn detect_with_diagnostics(
    image: &RgbImage,
    params: &DetectionParameters,
    apply_offset: bool,
    output_path: &str,
    output_blur: bool,
) -> Result<Vec<Detection>> {
    let mut sink = FileSink::from_output(output_path, output_blur);
    let request = DetectionRequest::new(apply_offset).with_sink(&mut sink);
    detect_with_request(image, params, request)
}

/// Detect on raw RGB bytes (3 bytes per pixel, row-major)
pub fn detect_rgb(
    rgb: &[u8],
    width: usize,
    height: usize,
    params: &DetectionParameters,
    apply_offset: bool,
) -> Result<Vec<Detection>> {
    let expected = width.checked_mul(height).and_then(|n| n.checked_mul(3));
    if expected != Some(rgb.len()) {
        return Err(Error::ImageFormat(format!(
            "expected {}x{} RGB bytes, got {}",
            width,
            height,
            rgb.len()
        )));
    }
    let (w, h) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(Error::ImageFormat(format!(
                "dimensions {}x{} out of range",
                width, height
            )));
        }
    };
    let image = RgbImage::from_raw(w, h, rgb.to_vec())
        .ok_or_else(|| Error::ImageFormat("buffer does not match dimensions".into()))?;
    detect(&image, params, apply_offset)
}

/// Detect on any decoded image, converting it to 8-bit RGB first
pub fn detect_dynamic(
    image: &image::DynamicImage,
    params: &DetectionParameters,
    apply_offset: bool,
) -> Result<Vec<Detection>> {
    detect(&image.to_rgb8(), params, apply_offset)
}

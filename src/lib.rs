//! circle_detector - Circle Hough transform detector
//!
//! Locates circular objects such as cup and bottle openings in a color image
//! and reports them as image-space bounding boxes, largest circle first.
//! Every call is a pure, synchronous function of the image and the
//! [`DetectionParameters`]; distinct calls may run concurrently.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Detection parameters, crop regions and service configuration
pub mod config;
/// Circle detection stages (edges, Hough search, filter, rank, format)
pub mod detector;
/// Diagnostic sinks and annotation
pub mod diagnostics;
/// Error type
pub mod error;
/// Core data structures (Point, Circle, Detection, etc.)
pub mod models;
/// End-to-end pipeline and invocation forms
pub mod pipeline;
/// Crop, intensity conversion and smoothing
pub mod preprocess;
/// Service façade over an external image source
pub mod service;
/// Helpers for the command line tool and benches
pub mod tools;
/// Utility functions (grayscale, blur, crop)
pub mod utils;

pub use config::{CropRegion, DetectionParameters, ServiceConfig};
pub use diagnostics::{CaptureSink, DiagnosticPolicy, DiagnosticSink, FileSink};
pub use error::{Error, Result};
pub use models::{BoundingBox, Candidate, Circle, Detection, Point, PointI};
pub use pipeline::{
    DetectionRequest, detect, detect_dynamic, detect_rgb, detect_with_diagnostics,
    detect_with_request, find_circles,
};

use image::RgbImage;

/// Detector holding a validated parameter set for repeated use
#[derive(Debug, Clone)]
pub struct Detector {
    params: DetectionParameters,
}

impl Detector {
    /// Validate `params` and build a detector
    pub fn new(params: DetectionParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Parameters in use
    pub fn params(&self) -> &DetectionParameters {
        &self.params
    }

    /// Detect circles in an image
    pub fn detect(&self, image: &RgbImage, apply_offset: bool) -> Result<Vec<Detection>> {
        detect(image, &self.params, apply_offset)
    }

    /// Detect circles, routing intermediate artifacts to `sink`
    pub fn detect_with_sink(
        &self,
        image: &RgbImage,
        apply_offset: bool,
        sink: &mut dyn DiagnosticSink,
        policy: DiagnosticPolicy,
    ) -> Result<Vec<Detection>> {
        let request = DetectionRequest::new(apply_offset)
            .with_sink(sink)
            .with_policy(policy);
        detect_with_request(image, &self.params, request)
    }

    /// Detect the largest circle only
    pub fn detect_largest(&self, image: &RgbImage, apply_offset: bool) -> Result<Option<Detection>> {
        Ok(self.detect(image, apply_offset)?.into_iter().next())
    }
}

//! Diagnostic artifacts tapped from the pipeline
//!
//! A [`DiagnosticSink`] receives the smoothed intensity buffer and the
//! cropped color buffer annotated with the accepted circles. Sinks sit off
//! the detection path: under [`DiagnosticPolicy::Lenient`] their failures are
//! logged and the detections are still returned.

use std::path::{Path, PathBuf};

use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_circle_mut;

use crate::error::{Error, Result};
use crate::models::Circle;

/// Outline color for annotated circles
const ANNOTATION_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// File name of the blurred artifact written by [`FileSink`]
pub const BLURRED_FILE_NAME: &str = "blurred.jpg";

/// What to do when a sink fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagnosticPolicy {
    /// Log the failure and keep the detections
    #[default]
    Lenient,
    /// Fail the whole call
    Strict,
}

/// Receiver for intermediate pipeline artifacts
pub trait DiagnosticSink {
    /// Whether the blurred buffer should be produced for this sink
    fn wants_blurred(&self) -> bool {
        true
    }

    /// Whether the annotated image should be produced for this sink
    fn wants_annotated(&self) -> bool {
        true
    }

    /// Median-smoothed intensity buffer, crop coordinates
    fn blurred(&mut self, image: &GrayImage) -> Result<()>;

    /// Cropped color buffer with accepted circles outlined
    fn annotated(&mut self, image: &RgbImage) -> Result<()>;
}

/// Draw each circle as a two-pixel red outline on a copy of `color`
pub fn annotate(color: &RgbImage, circles: &[Circle]) -> RgbImage {
    let mut out = color.clone();
    for c in circles {
        let center = (c.center.x, c.center.y);
        draw_hollow_circle_mut(&mut out, center, c.radius, ANNOTATION_COLOR);
        if c.radius > 1 {
            draw_hollow_circle_mut(&mut out, center, c.radius - 1, ANNOTATION_COLOR);
        }
    }
    out
}

/// Writes artifacts to files with `image::save`
#[derive(Debug, Clone, Default)]
pub struct FileSink {
    blurred_path: Option<PathBuf>,
    annotated_path: Option<PathBuf>,
}

impl FileSink {
    /// Sink writing nothing until paths are set
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the blurred buffer to `path`
    pub fn with_blurred_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.blurred_path = Some(path.into());
        self
    }

    /// Write the annotated image to `path`
    pub fn with_annotated_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.annotated_path = Some(path.into());
        self
    }

    /// Sink for the path-based invocation form.
    ///
    /// An empty `output_path` disables the annotated artifact. With
    /// `output_blur`, the blurred buffer goes to `blurred.jpg` next to
    /// `output_path`, or in the working directory when the path is empty.
    pub fn from_output(output_path: &str, output_blur: bool) -> Self {
        let mut sink = Self::new();
        if !output_path.is_empty() {
            sink = sink.with_annotated_path(output_path);
        }
        if output_blur {
            let dir = Path::new(output_path).parent().unwrap_or(Path::new(""));
            sink = sink.with_blurred_path(dir.join(BLURRED_FILE_NAME));
        }
        sink
    }

    /// Target of the blurred artifact, if any
    pub fn blurred_path(&self) -> Option<&Path> {
        self.blurred_path.as_deref()
    }

    /// Target of the annotated artifact, if any
    pub fn annotated_path(&self) -> Option<&Path> {
        self.annotated_path.as_deref()
    }
}

fn write_error(path: &Path, source: image::ImageError) -> Error {
    Error::DiagnosticWrite {
        path: path.to_path_buf(),
        source,
    }
}

impl DiagnosticSink for FileSink {
    fn wants_blurred(&self) -> bool {
        self.blurred_path.is_some()
    }

    fn wants_annotated(&self) -> bool {
        self.annotated_path.is_some()
    }

    fn blurred(&mut self, image: &GrayImage) -> Result<()> {
        match &self.blurred_path {
            Some(path) => image.save(path).map_err(|e| write_error(path, e)),
            None => Ok(()),
        }
    }

    fn annotated(&mut self, image: &RgbImage) -> Result<()> {
        match &self.annotated_path {
            Some(path) => image.save(path).map_err(|e| write_error(path, e)),
            None => Ok(()),
        }
    }
}

/// Keeps the latest artifacts in memory
#[derive(Debug, Clone, Default)]
pub struct CaptureSink {
    /// Last blurred buffer received
    pub blurred: Option<GrayImage>,
    /// Last annotated image received
    pub annotated: Option<RgbImage>,
}

impl CaptureSink {
    /// Empty capture
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticSink for CaptureSink {
    fn blurred(&mut self, image: &GrayImage) -> Result<()> {
        self.blurred = Some(image.clone());
        Ok(())
    }

    fn annotated(&mut self, image: &RgbImage) -> Result<()> {
        self.annotated = Some(image.clone());
        Ok(())
    }
}

/// Apply `policy` to the outcome of a sink call
pub(crate) fn settle(result: Result<()>, policy: DiagnosticPolicy) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(err) if policy == DiagnosticPolicy::Strict => Err(err),
        Err(err) => {
            tracing::warn!("diagnostic artifact dropped: {}", err);
            Ok(())
        }
    }
}

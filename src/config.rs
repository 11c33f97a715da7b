//! Detection parameters and service configuration
//!
//! Parameters are plain data: they are validated once, never mutated by the
//! pipeline, and threaded explicitly through every stage.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::PointI;

/// Axis-aligned rectangle in original-image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    /// Left edge of the region
    pub x: u32,
    /// Top edge of the region
    pub y: u32,
    /// Region width in pixels
    pub width: u32,
    /// Region height in pixels
    pub height: u32,
}

impl CropRegion {
    /// Create a region from its origin and extent
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a region from two opposite corners (`max` is exclusive).
    ///
    /// Returns `InvalidConfig` when the corners do not span a positive area.
    pub fn from_corners(min: (u32, u32), max: (u32, u32)) -> Result<Self> {
        if max.0 <= min.0 || max.1 <= min.1 {
            return Err(Error::InvalidConfig(format!(
                "crop corners {:?} and {:?} do not span a positive area",
                min, max
            )));
        }
        Ok(Self::new(min.0, min.1, max.0 - min.0, max.1 - min.1))
    }

    /// Origin offset to add to cropped coordinates
    pub fn origin(&self) -> PointI {
        PointI::new(self.x as i32, self.y as i32)
    }

    /// Check whether the region lies entirely inside a `width` x `height` image
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x < width
            && self.y < height
            && u64::from(self.x) + u64::from(self.width) <= u64::from(width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(height)
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "crop extent must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Parameter set for the circle Hough search.
///
/// Missing numeric fields deserialize to zero and are rejected by
/// [`DetectionParameters::validate`]. `Default` gives the recommended values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionParameters {
    /// Inverse ratio of accumulator resolution to image resolution
    #[serde(default)]
    pub dp: f64,
    /// Minimum distance between accepted circle centers, in pixels
    #[serde(default)]
    pub min_dist: f64,
    /// Upper Canny threshold; the lower one is half of it
    #[serde(default)]
    pub param1: f64,
    /// Accumulator vote threshold
    #[serde(default)]
    pub param2: f64,
    /// Smallest radius searched
    #[serde(default)]
    pub min_radius: i32,
    /// Largest radius searched
    #[serde(default)]
    pub max_radius: i32,
    /// Disable the median smoothing stage
    #[serde(default)]
    pub skip_blur: bool,
    /// Restrict the search to this region of the input image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropRegion>,
}

impl Default for DetectionParameters {
    fn default() -> Self {
        Self {
            dp: 1.0,
            min_dist: 8.0,
            param1: 60.0,
            param2: 25.0,
            min_radius: 35,
            max_radius: 50,
            skip_blur: false,
            crop: None,
        }
    }
}

impl DetectionParameters {
    /// Set the crop region
    pub fn with_crop(mut self, crop: CropRegion) -> Self {
        self.crop = Some(crop);
        self
    }

    /// Set the skip-blur flag
    pub fn with_skip_blur(mut self, skip_blur: bool) -> Self {
        self.skip_blur = skip_blur;
        self
    }

    /// Reject missing, non-positive or inconsistent values.
    pub fn validate(&self) -> Result<()> {
        // `!(x > 0)` also rejects NaN
        if !(self.dp > 0.0) {
            return Err(Error::InvalidConfig("dp needs to be set (def 1)".into()));
        }
        if !(self.min_dist > 0.0) {
            return Err(Error::InvalidConfig(
                "min_dist needs to be set (def 8)".into(),
            ));
        }
        if !(self.param1 > 0.0) {
            return Err(Error::InvalidConfig("param1 needs to be set (def 60)".into()));
        }
        if !(self.param2 > 0.0) {
            return Err(Error::InvalidConfig("param2 needs to be set (def 25)".into()));
        }
        if self.min_radius <= 0 {
            return Err(Error::InvalidConfig(
                "min_radius needs to be set (def 35)".into(),
            ));
        }
        if self.max_radius <= 0 {
            return Err(Error::InvalidConfig(
                "max_radius needs to be set (def 50)".into(),
            ));
        }
        if self.min_radius > self.max_radius {
            return Err(Error::InvalidConfig(format!(
                "min_radius ({}) must not exceed max_radius ({})",
                self.min_radius, self.max_radius
            )));
        }
        if let Some(crop) = &self.crop {
            crop.validate()?;
        }
        Ok(())
    }
}

/// Configuration of the circle-detection service: the camera it reads from
/// plus the detection parameters, flattened into one JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Name of the image source dependency
    #[serde(default)]
    pub camera_name: String,
    /// Detection parameters
    #[serde(flatten)]
    pub params: DetectionParameters,
}

impl ServiceConfig {
    /// Parse a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfig(format!("malformed config: {}", e)))
    }

    /// Read and parse a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfig(format!("cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }

    /// Validate the configuration and return the names of its implicit
    /// dependencies.
    pub fn validate(&self) -> Result<Vec<String>> {
        if self.camera_name.is_empty() {
            return Err(Error::InvalidConfig(
                "expected \"camera_name\" attribute for circle detector".into(),
            ));
        }
        self.params.validate()?;
        Ok(vec![self.camera_name.clone()])
    }
}

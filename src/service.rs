//! Detection service over an external image source
//!
//! The host framework supplies camera frames through [`ImageSource`] and
//! resolves the configured camera name through [`Dependencies`]. The service
//! picks the color frame and runs the pipeline with its configured
//! parameters.

use std::collections::HashMap;
use std::sync::Arc;

use image::RgbImage;

use crate::config::{DetectionParameters, ServiceConfig};
use crate::diagnostics::{CaptureSink, DiagnosticPolicy};
use crate::error::{Error, Result};
use crate::models::Detection;
use crate::pipeline::{DetectionRequest, detect, detect_with_request};

/// Source name of the color frame in an image set
pub const COLOR_SOURCE_NAME: &str = "color";

/// One image of a frame set, tagged with the sensor that produced it
#[derive(Debug, Clone)]
pub struct NamedImage {
    /// Sensor name, e.g. `color` or `depth`
    pub source_name: String,
    /// Pixel data
    pub image: RgbImage,
}

/// Supplier of camera frames
pub trait ImageSource: Send + Sync {
    /// Latest images, one per sensor
    fn images(&self) -> Result<Vec<NamedImage>>;
}

/// Named image sources available to the service
#[derive(Clone, Default)]
pub struct Dependencies {
    sources: HashMap<String, Arc<dyn ImageSource>>,
}

impl Dependencies {
    /// Empty dependency set
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `source` under `name`
    pub fn insert<S: Into<String>>(&mut self, name: S, source: Arc<dyn ImageSource>) {
        self.sources.insert(name.into(), source);
    }

    /// Look up a source by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn ImageSource>> {
        self.sources.get(name).cloned()
    }
}

/// Capabilities reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Properties {
    /// Bounding-box detections are produced
    pub detection_supported: bool,
    /// Classification is not produced
    pub classification_supported: bool,
    /// 3-D object point clouds are not produced
    pub object_pcds_supported: bool,
}

/// Annotated frame together with its detections
#[derive(Debug, Clone)]
pub struct Capture {
    /// Cropped color frame with circles outlined
    pub image: Option<RgbImage>,
    /// Detections in the coordinates of `image`, relative to the crop origin
    pub detections: Vec<Detection>,
}

/// Circle detector bound to one camera
pub struct CircleService {
    params: DetectionParameters,
    camera_name: String,
    source: Arc<dyn ImageSource>,
}

impl CircleService {
    /// Validate `config` and resolve its camera from `deps`
    pub fn new(config: &ServiceConfig, deps: &Dependencies) -> Result<Self> {
        config.validate()?;
        let source = deps.get(&config.camera_name).ok_or_else(|| {
            Error::InvalidConfig(format!("unknown camera {:?}", config.camera_name))
        })?;
        tracing::info!("circle detector bound to camera {:?}", config.camera_name);
        Ok(Self {
            params: config.params.clone(),
            camera_name: config.camera_name.clone(),
            source,
        })
    }

    /// Detection parameters in use
    pub fn params(&self) -> &DetectionParameters {
        &self.params
    }

    fn color_image(&self) -> Result<RgbImage> {
        let images = self.source.images().map_err(|e| match e {
            Error::ImageUnavailable(msg) => Error::ImageUnavailable(msg),
            other => Error::ImageUnavailable(format!(
                "camera {:?} failed: {}",
                self.camera_name, other
            )),
        })?;
        images
            .into_iter()
            .find(|img| img.source_name == COLOR_SOURCE_NAME)
            .map(|img| img.image)
            .ok_or_else(|| {
                Error::ImageUnavailable(format!(
                    "camera {:?} returned no {} image",
                    self.camera_name, COLOR_SOURCE_NAME
                ))
            })
    }

    /// Detect on the current camera frame, in original-frame coordinates
    pub fn detections_from_camera(&self) -> Result<Vec<Detection>> {
        let image = self.color_image()?;
        detect(&image, &self.params, true)
    }

    /// Detect on a caller-provided image
    pub fn detections(&self, image: &RgbImage, apply_offset: bool) -> Result<Vec<Detection>> {
        detect(image, &self.params, apply_offset)
    }

    /// Detect on the current frame and return the annotated crop with the
    /// detections, both in crop coordinates.
    pub fn capture_all(&self) -> Result<Capture> {
        let image = self.color_image()?;
        let mut sink = CaptureSink::new();
        let request = DetectionRequest::new(false)
            .with_sink(&mut sink)
            .with_policy(DiagnosticPolicy::Strict);
        let detections = detect_with_request(&image, &self.params, request)?;
        Ok(Capture {
            image: sink.annotated,
            detections,
        })
    }

    /// Supported outputs
    pub fn properties(&self) -> Properties {
        Properties {
            detection_supported: true,
            classification_supported: false,
            object_pcds_supported: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    struct StaticSource(Vec<NamedImage>);

    impl ImageSource for StaticSource {
        fn images(&self) -> Result<Vec<NamedImage>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenSource;

    impl ImageSource for BrokenSource {
        fn images(&self) -> Result<Vec<NamedImage>> {
            Err(Error::DetectionEngine("stream closed".into()))
        }
    }

    fn config() -> ServiceConfig {
        ServiceConfig {
            camera_name: "cam".into(),
            params: DetectionParameters::default(),
        }
    }

    fn deps_with(source: impl ImageSource + 'static) -> Dependencies {
        let mut deps = Dependencies::new();
        deps.insert("cam", Arc::new(source));
        deps
    }

    fn named(name: &str) -> NamedImage {
        NamedImage {
            source_name: name.into(),
            image: RgbImage::from_pixel(64, 48, Rgb([30, 30, 30])),
        }
    }

    #[test]
    fn test_unknown_camera_is_invalid_config() {
        let err = CircleService::new(&config(), &Dependencies::new()).err().unwrap();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_missing_color_image() {
        let service = CircleService::new(&config(), &deps_with(StaticSource(vec![named("depth")]))).unwrap();
        let err = service.detections_from_camera().unwrap_err();
        assert!(matches!(err, Error::ImageUnavailable(_)));
    }

    #[test]
    fn test_source_failure_is_image_unavailable() {
        let service = CircleService::new(&config(), &deps_with(BrokenSource)).unwrap();
        assert!(matches!(
            service.detections_from_camera(),
            Err(Error::ImageUnavailable(_))
        ));
    }

    #[test]
    fn test_capture_all_returns_annotated_frame() {
        let source = StaticSource(vec![named("depth"), named("color")]);
        let service = CircleService::new(&config(), &deps_with(source)).unwrap();
        let capture = service.capture_all().unwrap();
        assert!(capture.detections.is_empty());
        assert_eq!(capture.image.unwrap().dimensions(), (64, 48));
    }

    #[test]
    fn test_properties() {
        let service = CircleService::new(&config(), &deps_with(StaticSource(Vec::new()))).unwrap();
        let props = service.properties();
        assert!(props.detection_supported);
        assert!(!props.classification_supported);
        assert!(!props.object_pcds_supported);
    }
}

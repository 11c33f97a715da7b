/// Hough candidates and pixel-grid circles
pub mod circle;
/// Bounding boxes and detections
pub mod detection;
/// Float and integer points
pub mod point;

pub use circle::{Candidate, Circle};
pub use detection::{BoundingBox, Detection};
pub use point::{Point, PointI};

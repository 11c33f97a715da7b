/// Conversion of ranked circles into bounding-box detections
use crate::models::{BoundingBox, Circle, Detection, PointI};

/// Confidence attached to every detection; the search yields no graded score
pub const DETECTION_CONFIDENCE: f64 = 1.0;

/// Label for the circle at `rank` in the ranked sequence
pub fn detection_label(rank: usize) -> String {
    format!("circle-{}", rank)
}

/// Square bounding box of side `2 * radius` centered on the circle
pub fn bounding_box(circle: &Circle) -> BoundingBox {
    let c = circle.center;
    let r = circle.radius;
    BoundingBox::new(PointI::new(c.x - r, c.y - r), PointI::new(c.x + r, c.y + r))
}

/// One detection per circle, in the same order
pub fn format_detections(circles: &[Circle]) -> Vec<Detection> {
    circles
        .iter()
        .enumerate()
        .map(|(rank, circle)| Detection {
            bounding_box: bounding_box(circle),
            confidence: DETECTION_CONFIDENCE,
            label: detection_label(rank),
        })
        .collect()
}

use super::point::PointI;

/// Axis-aligned bounding box in image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    /// Top-left corner
    pub min: PointI,
    /// Bottom-right corner
    pub max: PointI,
}

impl BoundingBox {
    /// Create a new bounding box
    pub fn new(min: PointI, max: PointI) -> Self {
        Self { min, max }
    }

    /// Box width
    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    /// Box height
    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }
}

/// A located circular object
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Bounding box of the circle
    pub bounding_box: BoundingBox,
    /// Detection confidence
    pub confidence: f64,
    /// Label, `circle-<rank>`
    pub label: String,
}

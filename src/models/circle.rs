use super::point::{Point, PointI};

/// Raw output of the circle Hough search, in the coordinates of the buffer
/// that was searched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Sub-pixel center
    pub center: Point,
    /// Estimated radius
    pub radius: f32,
    /// Accumulator votes at the center cell
    pub votes: u32,
}

impl Candidate {
    /// Create a new candidate
    pub fn new(x: f32, y: f32, radius: f32, votes: u32) -> Self {
        Self {
            center: Point::new(x, y),
            radius,
            votes,
        }
    }
}

/// A circle on the pixel grid.
///
/// Whether `center` is in cropped or original-image coordinates is decided by
/// the stage that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Circle {
    /// Center pixel
    pub center: PointI,
    /// Radius in pixels
    pub radius: i32,
}

impl Circle {
    /// Create a new circle
    pub fn new(x: i32, y: i32, radius: i32) -> Self {
        Self {
            center: PointI::new(x, y),
            radius,
        }
    }
}

impl From<&Candidate> for Circle {
    fn from(c: &Candidate) -> Self {
        Self {
            center: c.center.to_pixel(),
            radius: c.radius as i32,
        }
    }
}

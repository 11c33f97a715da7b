/// Minimum-radius gate and crop-to-image coordinate remapping
use crate::config::CropRegion;
use crate::models::{Candidate, Circle};

/// Circles with a radius below this are dropped, whatever the search bounds
pub const MIN_CIRCLE_RADIUS: i32 = 18;

/// Snap candidates to the pixel grid and drop those under `MIN_CIRCLE_RADIUS`.
///
/// Input order is preserved; centers stay in the searched buffer's space.
pub fn filter_candidates(candidates: &[Candidate]) -> Vec<Circle> {
    candidates
        .iter()
        .map(Circle::from)
        .filter(|c| {
            let keep = c.radius >= MIN_CIRCLE_RADIUS;
            if !keep {
                tracing::trace!(
                    "dropping circle at ({}, {}) with radius {}",
                    c.center.x,
                    c.center.y,
                    c.radius
                );
            }
            keep
        })
        .collect()
}

/// Express cropped-buffer circles in original-image coordinates.
///
/// Without a crop region the circles are returned unchanged.
pub fn remap_to_original(circles: Vec<Circle>, crop: Option<&CropRegion>) -> Vec<Circle> {
    match crop {
        Some(region) => {
            let origin = region.origin();
            circles
                .into_iter()
                .map(|c| Circle {
                    center: c.center.offset(origin),
                    radius: c.radius,
                })
                .collect()
        }
        None => circles,
    }
}

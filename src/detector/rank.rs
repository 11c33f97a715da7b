/// Ordering of accepted circles
use std::cmp::Ordering;

use crate::models::Circle;

/// Sort by descending radius; equal radii fall back to ascending center x,
/// then ascending center y, so the order is fully deterministic.
pub fn rank_by_radius(circles: &mut [Circle]) {
    circles.sort_by(compare);
}

fn compare(a: &Circle, b: &Circle) -> Ordering {
    b.radius
        .cmp(&a.radius)
        .then(a.center.x.cmp(&b.center.x))
        .then(a.center.y.cmp(&b.center.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descending_radius() {
        let mut circles = vec![
            Circle::new(0, 0, 20),
            Circle::new(0, 0, 45),
            Circle::new(0, 0, 33),
        ];
        rank_by_radius(&mut circles);
        let radii: Vec<i32> = circles.iter().map(|c| c.radius).collect();
        assert_eq!(radii, vec![45, 33, 20]);
    }

    #[test]
    fn test_ties_break_on_position() {
        let mut circles = vec![
            Circle::new(50, 9, 30),
            Circle::new(10, 80, 30),
            Circle::new(50, 2, 30),
        ];
        rank_by_radius(&mut circles);
        assert_eq!(
            circles,
            vec![
                Circle::new(10, 80, 30),
                Circle::new(50, 2, 30),
                Circle::new(50, 9, 30),
            ]
        );
    }

    #[test]
    fn test_empty() {
        let mut circles: Vec<Circle> = Vec::new();
        rank_by_radius(&mut circles);
        assert!(circles.is_empty());
    }
}

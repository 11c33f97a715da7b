/// Circle Hough transform (gradient method)
///
/// Edge pixels vote along their gradient direction into a 2-D center
/// accumulator for every radius in `[min_radius, max_radius]`. Accumulator
/// peaks above `param2` become center hypotheses and each one gets a radius
/// from the distribution of edge distances around it. Hypotheses are then
/// ordered by how many edge points support that radius, and `min_dist` keeps
/// only the best supported of any centers closer than that distance.
use image::GrayImage;
use rayon::prelude::*;

use super::edges::{Gradients, canny, canny_thresholds};
use crate::config::DetectionParameters;
use crate::error::{Error, Result};
use crate::models::{Candidate, Point};

/// Fixed-point shift used when stepping along gradient directions
const SHIFT: u32 = 10;
const ONE: f64 = (1 << SHIFT) as f64;

/// Upper bound on accumulator cells, guards against degenerate `dp`
const MAX_ACCUMULATOR_CELLS: usize = 1 << 28;

/// Center-vote accumulator with a one-cell zero border on every side
struct Accumulator {
    cols: usize,
    rows: usize,
    stride: usize,
    data: Vec<u32>,
}

impl Accumulator {
    fn new(cols: usize, rows: usize) -> Result<Self> {
        let stride = cols + 2;
        let cells = stride
            .checked_mul(rows + 2)
            .filter(|&n| n <= MAX_ACCUMULATOR_CELLS)
            .ok_or_else(|| {
                Error::DetectionEngine(format!(
                    "accumulator of {}x{} cells is too large",
                    cols, rows
                ))
            })?;
        Ok(Self {
            cols,
            rows,
            stride,
            data: vec![0; cells],
        })
    }

    #[inline]
    fn vote(&mut self, x: usize, y: usize) {
        self.data[(y + 1) * self.stride + x + 1] += 1;
    }

    /// Local maxima above `threshold` in scan order.
    ///
    /// Returned values are `(cell_x, cell_y, votes)`. Plateaus yield their
    /// top-left cell.
    fn peaks(&self, threshold: f64) -> Vec<(usize, usize, u32)> {
        let mut peaks = Vec::new();
        let s = self.stride;
        for y in 1..=self.rows {
            for x in 1..=self.cols {
                let i = y * s + x;
                let v = self.data[i];
                if (v as f64) > threshold
                    && v > self.data[i - 1]
                    && v >= self.data[i + 1]
                    && v > self.data[i - s]
                    && v >= self.data[i + s]
                {
                    peaks.push((x - 1, y - 1, v));
                }
            }
        }
        peaks
    }
}

/// Edge pixel with a usable gradient direction
#[derive(Clone, Copy)]
struct EdgePoint {
    x: f32,
    y: f32,
}

/// Run the circle search over an intensity buffer.
///
/// Output is in the buffer's own coordinate space, strongest center first.
/// No minimum-radius gate is applied here.
pub fn hough_circles(gray: &GrayImage, params: &DetectionParameters) -> Result<Vec<Candidate>> {
    let (width, height) = (gray.width() as usize, gray.height() as usize);
    if width == 0 || height == 0 || gray.as_raw().len() != width * height {
        return Err(Error::DetectionEngine(format!(
            "malformed buffer {}x{} ({} bytes)",
            width,
            height,
            gray.as_raw().len()
        )));
    }
    if !(params.dp > 0.0) || params.min_radius <= 0 || params.min_radius > params.max_radius {
        return Err(Error::DetectionEngine(format!(
            "unsupported parameters dp={} radius=[{}, {}]",
            params.dp, params.min_radius, params.max_radius
        )));
    }

    let dp = params.dp;
    let idp = 1.0 / dp;
    let grad = Gradients::sobel(gray);
    let (low, high) = canny_thresholds(params.param1);
    let edges = canny(&grad, low, high);

    let cols = (width as f64 * idp).ceil() as usize;
    let rows = (height as f64 * idp).ceil() as usize;
    let mut acc = Accumulator::new(cols, rows)?;

    let min_r = params.min_radius as i64;
    let max_r = params.max_radius as i64;
    let mut points = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if !edges.is_edge(x, y) {
                continue;
            }
            let (vx, vy) = grad.at(x, y);
            if vx == 0 && vy == 0 {
                continue;
            }
            let mag = ((vx * vx + vy * vy) as f64).sqrt();
            if mag < 1.0 {
                continue;
            }

            let mut sx = ((vx as f64 * idp) * ONE / mag).round() as i64;
            let mut sy = ((vy as f64 * idp) * ONE / mag).round() as i64;
            let x0 = ((x as f64 * idp) * ONE).round() as i64;
            let y0 = ((y as f64 * idp) * ONE).round() as i64;

            // Both directions along the gradient line
            for _ in 0..2 {
                let mut x1 = x0 + min_r * sx;
                let mut y1 = y0 + min_r * sy;
                for _ in min_r..=max_r {
                    let x2 = x1 >> SHIFT;
                    let y2 = y1 >> SHIFT;
                    if x2 < 0 || y2 < 0 || x2 as usize >= cols || y2 as usize >= rows {
                        break;
                    }
                    acc.vote(x2 as usize, y2 as usize);
                    x1 += sx;
                    y1 += sy;
                }
                sx = -sx;
                sy = -sy;
            }

            points.push(EdgePoint {
                x: x as f32,
                y: y as f32,
            });
        }
    }

    if points.is_empty() {
        tracing::debug!("no edge points, skipping center search");
        return Ok(Vec::new());
    }

    let peaks = acc.peaks(params.param2);
    tracing::debug!(
        "{} edge points voted, {} center peaks above {}",
        points.len(),
        peaks.len(),
        params.param2
    );

    // Radius estimates are independent per center
    let mut estimates: Vec<(Candidate, usize)> = peaks
        .par_iter()
        .filter_map(|&(cx, cy, votes)| {
            let center = Point::new(
                ((cx as f64 + 0.5) * dp) as f32,
                ((cy as f64 + 0.5) * dp) as f32,
            );
            estimate_radius(center, &points, params).map(|(radius, support)| {
                let candidate = Candidate {
                    center,
                    radius,
                    votes,
                };
                (candidate, support)
            })
        })
        .collect();

    // Best supported first; radius and position make the order total
    estimates.sort_by(|(a, a_support), (b, b_support)| {
        b_support
            .cmp(a_support)
            .then(b.radius.total_cmp(&a.radius))
            .then(a.center.x.total_cmp(&b.center.x))
            .then(a.center.y.total_cmp(&b.center.y))
    });

    let min_dist = params.min_dist.max(dp) as f32;
    let min_dist2 = min_dist * min_dist;
    let mut accepted: Vec<Candidate> = Vec::new();
    for (candidate, _) in estimates {
        if accepted
            .iter()
            .any(|c| c.center.distance_squared(&candidate.center) < min_dist2)
        {
            tracing::trace!(
                "center ({:.1}, {:.1}) suppressed by min_dist {}",
                candidate.center.x,
                candidate.center.y,
                min_dist
            );
            continue;
        }
        accepted.push(candidate);
    }

    Ok(accepted)
}

/// Pick the radius best supported by edge points around `center`.
///
/// Distances in range are sorted and split into runs no wider than one
/// accumulator cell; the run with the most points per unit radius wins.
/// Returns the radius and the number of points in its run, or `None` unless
/// that run has more than `param2` points.
fn estimate_radius(
    center: Point,
    points: &[EdgePoint],
    params: &DetectionParameters,
) -> Option<(f32, usize)> {
    let min_r = params.min_radius as f32;
    let max_r = params.max_radius as f32;
    let (min_r2, max_r2) = (min_r * min_r, max_r * max_r);
    let dr = params.dp as f32;

    let mut dists: Vec<f32> = points
        .iter()
        .filter_map(|p| {
            let dx = p.x - center.x;
            let dy = p.y - center.y;
            if dx.abs() > max_r || dy.abs() > max_r {
                return None;
            }
            let r2 = dx * dx + dy * dy;
            (min_r2..=max_r2).contains(&r2).then(|| r2.sqrt())
        })
        .collect();
    if dists.is_empty() {
        return None;
    }
    dists.sort_by(|a, b| a.total_cmp(b));

    let mut best_r = 0.0f32;
    let mut best_count = 0usize;
    let mut start = 0usize;
    for j in 1..=dists.len() {
        if j < dists.len() && dists[j] - dists[start] <= dr {
            continue;
        }
        let count = j - start;
        let r_cur = dists[(start + j) / 2];
        // Compare support density count / r without dividing
        if count as f32 * best_r >= best_count as f32 * r_cur
            || (best_r < f32::EPSILON && count >= best_count)
        {
            best_r = r_cur;
            best_count = count;
        }
        start = j;
    }

    ((best_count as f64) > params.param2).then_some((best_r, best_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn disk(width: u32, height: u32, cx: f32, cy: f32, r: f32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            if dx * dx + dy * dy <= r * r {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    fn params() -> DetectionParameters {
        DetectionParameters {
            dp: 1.0,
            min_dist: 100.0,
            param1: 60.0,
            param2: 10.0,
            min_radius: 30,
            max_radius: 50,
            skip_blur: true,
            crop: None,
        }
    }

    #[test]
    fn test_single_disk() {
        let gray = disk(200, 200, 100.0, 100.0, 40.0);
        let found = hough_circles(&gray, &params()).unwrap();
        assert_eq!(found.len(), 1, "got {:?}", found);
        let c = &found[0];
        assert!((c.center.x - 100.0).abs() <= 3.0, "center x {}", c.center.x);
        assert!((c.center.y - 100.0).abs() <= 3.0, "center y {}", c.center.y);
        assert!((c.radius - 40.0).abs() <= 3.0, "radius {}", c.radius);
    }

    #[test]
    fn test_flat_image_has_no_candidates() {
        let gray = GrayImage::from_pixel(120, 90, Luma([128]));
        assert!(hough_circles(&gray, &params()).unwrap().is_empty());
    }

    #[test]
    fn test_empty_buffer_is_engine_error() {
        let gray = GrayImage::new(0, 0);
        assert!(matches!(
            hough_circles(&gray, &params()),
            Err(Error::DetectionEngine(_))
        ));
    }

    #[test]
    fn test_degenerate_dp_is_engine_error() {
        let gray = GrayImage::from_pixel(64, 64, Luma([0]));
        let p = DetectionParameters { dp: 1e-6, ..params() };
        assert!(matches!(
            hough_circles(&gray, &p),
            Err(Error::DetectionEngine(_))
        ));
    }

    #[test]
    fn test_min_dist_keeps_strongest() {
        let gray = disk(200, 200, 100.0, 100.0, 40.0);
        let loose = DetectionParameters { min_dist: 1.0, ..params() };
        let strict = params();
        let many = hough_circles(&gray, &loose).unwrap();
        let one = hough_circles(&gray, &strict).unwrap();
        assert!(many.len() >= one.len());
        assert_eq!(many[0], one[0]);
    }

    #[test]
    fn test_estimate_radius_prefers_dense_run() {
        let center = Point::new(0.0, 0.0);
        let mut points = Vec::new();
        for i in 0..40 {
            let a = i as f32 * std::f32::consts::TAU / 40.0;
            points.push(EdgePoint { x: 40.0 * a.cos(), y: 40.0 * a.sin() });
        }
        points.push(EdgePoint { x: 45.0, y: 0.0 });
        let (r, support) = estimate_radius(center, &points, &params()).unwrap();
        assert!((r - 40.0).abs() < 1.0);
        assert_eq!(support, 40);
    }

    #[test]
    fn test_estimate_radius_requires_support() {
        let center = Point::new(0.0, 0.0);
        let points = vec![EdgePoint { x: 40.0, y: 0.0 }, EdgePoint { x: 0.0, y: 40.0 }];
        assert!(estimate_radius(center, &points, &params()).is_none());
    }
}

/// Sobel gradients and Canny edge extraction
///
/// Gradients come from `imageproc`'s 3x3 Sobel kernels. The edge map
/// follows the classic Canny steps: L1 magnitude, non-maximum suppression
/// along the quantized gradient direction, and hysteresis between a low and a
/// high threshold with 8-connectivity.
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use rayon::prelude::*;

/// tan(22.5 degrees), used to quantize gradient directions
const TAN_22_5: f32 = 0.414_213_57;

type Derivative = ImageBuffer<Luma<i16>, Vec<i16>>;

/// Horizontal and vertical derivatives of an intensity buffer
pub struct Gradients {
    width: usize,
    height: usize,
    dx: Derivative,
    dy: Derivative,
}

impl Gradients {
    /// 3x3 Sobel derivatives; borders replicate the edge pixels
    pub fn sobel(gray: &GrayImage) -> Self {
        Self {
            width: gray.width() as usize,
            height: gray.height() as usize,
            dx: horizontal_sobel(gray),
            dy: vertical_sobel(gray),
        }
    }

    /// Derivatives at (x, y)
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> (i32, i32) {
        let idx = y * self.width + x;
        (self.dx.as_raw()[idx] as i32, self.dy.as_raw()[idx] as i32)
    }

    #[inline]
    fn magnitude(&self, idx: usize) -> i32 {
        (self.dx.as_raw()[idx] as i32).abs() + (self.dy.as_raw()[idx] as i32).abs()
    }
}

/// Binary edge map, one flag per pixel
pub struct EdgeMap {
    width: usize,
    data: Vec<bool>,
}

impl EdgeMap {
    /// Whether (x, y) is an edge pixel
    #[inline]
    pub fn is_edge(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x]
    }

    /// Number of edge pixels
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&e| e).count()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    None,
    Weak,
    Strong,
}

/// Canny `(low, high)` thresholds for the circle search's `param1`
pub fn canny_thresholds(param1: f64) -> (f64, f64) {
    ((param1 / 2.0).max(1.0), param1)
}

/// Canny edge map from precomputed gradients.
///
/// Thresholds compare against the L1 magnitude `|dx| + |dy|`. A pixel above
/// `high` seeds an edge; pixels above `low` join it through 8-connectivity.
pub fn canny(grad: &Gradients, low: f64, high: f64) -> EdgeMap {
    let (width, height) = (grad.width, grad.height);
    let low = low.floor() as i32;
    let high = high.floor() as i32;

    let mag_at = |x: isize, y: isize| -> i32 {
        if x < 0 || y < 0 || x >= width as isize || y >= height as isize {
            0
        } else {
            grad.magnitude(y as usize * width + x as usize)
        }
    };

    let mut marks: Vec<Mark> = vec![Mark::None; width * height];
    if width > 0 {
        marks.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
            let yi = y as isize;
            for (x, mark) in row.iter_mut().enumerate() {
                let xi = x as isize;
                let m = mag_at(xi, yi);
                if m <= low {
                    continue;
                }
                let (gx, gy) = grad.at(x, y);
                let xs = gx.abs() as f32;
                let ys = gy.abs() as f32;
                let tg22x = xs * TAN_22_5;

                let is_max = if ys < tg22x {
                    m > mag_at(xi - 1, yi) && m >= mag_at(xi + 1, yi)
                } else if ys > tg22x + 2.0 * xs {
                    m > mag_at(xi, yi - 1) && m >= mag_at(xi, yi + 1)
                } else {
                    let s: isize = if (gx ^ gy) < 0 { -1 } else { 1 };
                    m > mag_at(xi - s, yi - 1) && m > mag_at(xi + s, yi + 1)
                };

                if is_max {
                    *mark = if m > high { Mark::Strong } else { Mark::Weak };
                }
            }
        });
    }

    // Hysteresis: grow strong edges into connected weak pixels
    let mut data = vec![false; width * height];
    let mut stack: Vec<usize> = Vec::new();
    for (idx, mark) in marks.iter().enumerate() {
        if *mark == Mark::Strong && !data[idx] {
            data[idx] = true;
            stack.push(idx);
            while let Some(cur) = stack.pop() {
                let cx = (cur % width) as isize;
                let cy = (cur / width) as isize;
                for ny in cy - 1..=cy + 1 {
                    for nx in cx - 1..=cx + 1 {
                        if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                            continue;
                        }
                        let n = ny as usize * width + nx as usize;
                        if !data[n] && marks[n] != Mark::None {
                            data[n] = true;
                            stack.push(n);
                        }
                    }
                }
            }
        }
    }

    EdgeMap { width, data }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn vertical_step(width: u32, height: u32, at: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            if x < at { Luma([0]) } else { Luma([255]) }
        })
    }

    #[test]
    fn test_sobel_flat_image_is_zero() {
        let gray = GrayImage::from_pixel(8, 8, Luma([90]));
        let grad = Gradients::sobel(&gray);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(grad.at(x, y), (0, 0));
            }
        }
    }

    #[test]
    fn test_sobel_vertical_step() {
        let grad = Gradients::sobel(&vertical_step(10, 6, 5));
        assert_eq!(grad.at(4, 3), (1020, 0));
        assert_eq!(grad.at(5, 3), (1020, 0));
        assert_eq!(grad.at(2, 3), (0, 0));
    }

    #[test]
    fn test_sobel_replicates_border() {
        let ramp = GrayImage::from_fn(10, 4, |x, _| Luma([(x * 10) as u8]));
        let grad = Gradients::sobel(&ramp);
        // Left of column 0 reads column 0 again
        assert_eq!(grad.at(0, 0), (40, 0));
        assert_eq!(grad.at(5, 2), (80, 0));
        assert_eq!(grad.at(9, 3), (40, 0));
    }

    #[test]
    fn test_canny_thin_vertical_edge() {
        let grad = Gradients::sobel(&vertical_step(20, 12, 10));
        let edges = canny(&grad, 30.0, 60.0);
        for y in 0..12 {
            assert!(edges.is_edge(9, y), "expected edge at (9, {})", y);
            assert!(!edges.is_edge(10, y));
            assert!(!edges.is_edge(3, y));
        }
        assert_eq!(edges.count(), 12);
    }

    #[test]
    fn test_canny_thresholds_floor_low() {
        assert_eq!(canny_thresholds(60.0), (30.0, 60.0));
        assert_eq!(canny_thresholds(1.5), (1.0, 1.5));
    }

    #[test]
    fn test_canny_below_threshold() {
        // Step of 5 gray levels gives magnitude 20, under the low threshold
        let gray = GrayImage::from_fn(20, 12, |x, _| if x < 10 { Luma([100]) } else { Luma([105]) });
        let edges = canny(&Gradients::sobel(&gray), 30.0, 60.0);
        assert_eq!(edges.count(), 0);
    }
}

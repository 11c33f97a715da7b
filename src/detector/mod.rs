//! Circle detection stages
//!
//! This module contains every stage after preprocessing:
//! - Edge extraction (Sobel gradients, Canny)
//! - Circle Hough search over the intensity buffer
//! - Minimum-radius filtering and coordinate remapping
//! - Ranking by radius
//! - Conversion to bounding-box detections

/// Sobel gradients and Canny edge map
pub mod edges;
/// Minimum-radius gate and crop offset remapping
pub mod filter;
/// Circles to labelled bounding boxes
pub mod format;
/// Accumulator voting, center peaks, radius estimation
pub mod hough;
/// Deterministic radius ordering
pub mod rank;

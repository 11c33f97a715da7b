//! Utility functions for image processing
//!
//! This module provides the low-level image operations used by the
//! preprocessing stage:
//! - Grayscale conversion (RGB to luminance)
//! - Median smoothing
//! - Region cropping

/// Median smoothing
pub mod blur;
/// Region cropping
pub mod crop;
/// RGB to luminance conversion
pub mod grayscale;

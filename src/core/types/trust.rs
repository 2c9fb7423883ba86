//! Measurement trust weighting.

use serde::{Deserialize, Serialize};

/// Per-axis confidence used to weight a correction.
///
/// Each component is a standard deviation: non-negative, and smaller means
/// more trusted. A source's trust is fixed at configuration time but can be
/// overridden per measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustVector {
    /// Translation trust along x, meters
    pub sigma_x: f32,
    /// Translation trust along y, meters
    pub sigma_y: f32,
    /// Heading trust, radians
    pub sigma_heading: f32,
}

impl TrustVector {
    /// Create a trust vector. All components must be non-negative.
    pub fn new(sigma_x: f32, sigma_y: f32, sigma_heading: f32) -> Self {
        assert!(
            sigma_x >= 0.0 && sigma_y >= 0.0 && sigma_heading >= 0.0,
            "trust components must be non-negative"
        );
        Self {
            sigma_x,
            sigma_y,
            sigma_heading,
        }
    }

    /// Same trust on every axis.
    pub fn uniform(sigma: f32) -> Self {
        Self::new(sigma, sigma, sigma)
    }

    /// One trust for both translation axes, another for heading.
    pub fn planar(sigma_translation: f32, sigma_heading: f32) -> Self {
        Self::new(sigma_translation, sigma_translation, sigma_heading)
    }
}

//! Radial travelling-wave "velocity magnitude" field.
//!
//! ```text
//! f(x, y, z, t) = sin(π · sqrt(x² + y² + z²) + t)
//! ```
//!
//! Concentric shells around the origin that drift outward as `t` grows.
//! Range `[-1, 1]`.

use std::f64::consts::PI;

use crate::synthesizer::Synthesizer;

/// The default synthesized field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VelocityMagnitude;

impl Synthesizer for VelocityMagnitude {
    fn name(&self) -> &str {
        "velocity_magnitude"
    }

    fn sample(&self, coord: [f64; 3], time: f64) -> f64 {
        let [x, y, z] = coord;
        (PI * (x * x + y * y + z * z).sqrt() + time).sin()
    }
}

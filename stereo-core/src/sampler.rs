/// Discretization of segments, infinite lines and great circles into
/// projected sample sequences
use nalgebra::Vector3;
use std::f64::consts::FRAC_PI_2;

use crate::projection::{ProjectedPoint, Projector};

/// Angular parameter bound for infinite lines, keeps `tan` finite
pub const RAY_ALPHA_LIMIT: f64 = 1.5;

/// World distance reached by `tan(alpha) = 1` along an infinite line
pub const RAY_REACH: f64 = 200.0;

/// Sample the straight segment `p0 -> p1` at `steps + 1` evenly spaced points
pub fn sample_segment(
    projector: &Projector,
    p0: &Vector3<f64>,
    p1: &Vector3<f64>,
    steps: usize,
) -> Vec<ProjectedPoint> {
    if steps == 0 {
        return vec![projector.project(p0)];
    }

    let delta = p1 - p0;
    (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            projector.project(&(p0 + delta * t))
        })
        .collect()
}

/// Sample the unbounded line through `origin` along `direction`.
///
/// The line is walked in an angular parameter so both ends approach their
/// vanishing points; those two points are added at the ends, giving
/// `steps + 3` points in total.
pub fn sample_infinite_ray(
    projector: &Projector,
    origin: &Vector3<f64>,
    direction: &Vector3<f64>,
    steps: usize,
) -> Vec<ProjectedPoint> {
    let mut points = Vec::with_capacity(steps + 3);
    points.push(projector.vanishing_point(&-direction));

    for i in 0..=steps {
        let alpha = if steps == 0 {
            0.0
        } else {
            (i as f64 / steps as f64) * std::f64::consts::PI - FRAC_PI_2
        };
        let alpha = alpha.clamp(-RAY_ALPHA_LIMIT, RAY_ALPHA_LIMIT);
        let t = alpha.tan() * RAY_REACH;
        points.push(projector.project(&(origin + direction * t)));
    }

    points.push(projector.vanishing_point(direction));
    points
}

/// Sample the circle `a·cos(α) + b·sin(α)` for α from 0° to 360° inclusive.
///
/// With orthonormal `a` and `b` this is a great circle of the unit sphere.
pub fn sample_great_circle(
    projector: &Projector,
    a: &Vector3<f64>,
    b: &Vector3<f64>,
    step_degrees: f64,
) -> Vec<ProjectedPoint> {
    let count = if step_degrees > 0.0 && step_degrees.is_finite() {
        (360.0 / step_degrees + 1e-9).floor() as usize
    } else {
        0
    };

    (0..=count)
        .map(|i| {
            let alpha = (i as f64 * step_degrees).to_radians();
            projector.project(&(a * alpha.cos() + b * alpha.sin()))
        })
        .collect()
}

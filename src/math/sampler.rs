use std::f64::consts::PI;

use crate::math::functions::FunctionChoice;
use crate::math::grid::{Grid2, linspace, meshgrid};

pub const ANGULAR_SAMPLES: usize = 30;

/// Inputs of the two-variable pipeline. Callers keep the values inside the
/// slider domains; nothing here re-checks them.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SurfaceParams {
    pub range: f64,
    pub resolution: usize,
    pub function: FunctionChoice,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct LevelParams {
    pub level: f64,
}

pub struct SurfaceSample {
    pub x: Grid2,
    pub y: Grid2,
    pub z: Grid2,
    pub params: SurfaceParams,
}

pub struct LevelSurfaceSample {
    pub phi: Grid2,
    pub theta: Grid2,
    pub x: Grid2,
    pub y: Grid2,
    pub z: Grid2,
    pub radius: f64,
    pub params: LevelParams,
}

pub fn sample_surface(params: &SurfaceParams) -> SurfaceSample {
    let xs = linspace(-params.range, params.range, params.resolution);
    let ys = linspace(-params.range, params.range, params.resolution);
    let (x, y) = meshgrid(&xs, &ys);

    let function = params.function;
    let z = Grid2::zip_map(&x, &y, |x, y| function.eval(x, y));

    SurfaceSample {
        x,
        y,
        z,
        params: *params,
    }
}

/// Samples the sphere `x² + y² + z² = k` on a 30 x 30 (phi, theta) grid.
///
/// A negative `k` gives NaN coordinates.
pub fn sample_level_surface(params: &LevelParams) -> LevelSurfaceSample {
    let phis = linspace(0.0, PI, ANGULAR_SAMPLES);
    let thetas = linspace(0.0, 2.0 * PI, ANGULAR_SAMPLES);
    let (phi, theta) = meshgrid(&phis, &thetas);

    let radius = params.level.sqrt();
    let x = Grid2::zip_map(&phi, &theta, |p, t| radius * p.sin() * t.cos());
    let y = Grid2::zip_map(&phi, &theta, |p, t| radius * p.sin() * t.sin());
    let z = Grid2::zip_map(&phi, &theta, |p, _| radius * p.cos());

    LevelSurfaceSample {
        phi,
        theta,
        x,
        y,
        z,
        radius,
        params: *params,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::functions::{LEVEL_FUNCTION, SURFACE_FUNCTIONS};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn surface(range: f64, resolution: usize, function: FunctionChoice) -> SurfaceSample {
        sample_surface(&SurfaceParams {
            range,
            resolution,
            function,
        })
    }

    #[test]
    fn mesh_spans_the_axis_range() {
        for (r, n) in [(1.0, 20), (5.0, 50), (7.0, 33), (10.0, 100)] {
            let s = surface(r, n, FunctionChoice::Paraboloid);
            assert_eq!(s.x.shape(), (n, n));
            assert_eq!(s.y.shape(), (n, n));
            assert_eq!(s.z.shape(), s.x.shape());
            for i in 0..n {
                assert_abs_diff_eq!(s.x.get(i, 0), -r, epsilon = 1e-12);
                assert_abs_diff_eq!(s.x.get(i, n - 1), r, epsilon = 1e-12);
                assert_abs_diff_eq!(s.y.get(0, i), -r, epsilon = 1e-12);
                assert_abs_diff_eq!(s.y.get(n - 1, i), r, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn paraboloid_is_sum_of_squares() {
        let s = surface(3.0, 25, FunctionChoice::Paraboloid);
        for i in 0..25 {
            for j in 0..25 {
                let (x, y) = (s.x.get(i, j), s.y.get(i, j));
                assert_eq!(s.z.get(i, j), x * x + y * y);
                assert!(s.z.get(i, j) >= 0.0);
            }
        }
    }

    #[test]
    fn paraboloid_center_and_corner() {
        let s = surface(5.0, 50, FunctionChoice::Paraboloid);
        // n is even, so [25, 25] sits half a step off the origin.
        let step = 10.0 / 49.0;
        assert_abs_diff_eq!(s.z.get(25, 25), step * step / 2.0, epsilon = 1e-12);
        assert!(s.z.get(25, 25) < 0.03);
        assert_eq!(s.z.get(0, 0), 50.0);
    }

    #[test]
    fn saddle_axes() {
        // odd resolution puts a sample exactly on each axis
        let n = 21;
        let s = surface(4.0, n, FunctionChoice::SaddleHyperbolic);
        let mid = n / 2;
        for k in 0..n {
            let x = s.x.get(mid, k);
            let y = s.y.get(k, mid);
            assert_abs_diff_eq!(s.z.get(mid, k), x * x, epsilon = 1e-12);
            assert_abs_diff_eq!(s.z.get(k, mid), -y * y, epsilon = 1e-12);
        }
    }

    #[test]
    fn ripple_is_bounded() {
        for r in 1..=10 {
            let s = surface(r as f64, 60, FunctionChoice::Ripple);
            assert!(s.z.values().iter().all(|v| (-1.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn surface_sampling_is_deterministic() {
        for function in SURFACE_FUNCTIONS {
            let a = surface(6.0, 77, function.choice);
            let b = surface(6.0, 77, function.choice);
            assert_eq!(a.x, b.x);
            assert_eq!(a.y, b.y);
            assert_eq!(a.z, b.z);
        }
    }

    #[test]
    fn shell_points_lie_on_sphere() {
        for k in [0.0, 0.5, 1.0, 9.0, 13.0, 20.0] {
            let s = sample_level_surface(&LevelParams { level: k });
            assert_eq!(s.x.shape(), (ANGULAR_SAMPLES, ANGULAR_SAMPLES));
            for idx in 0..s.x.len() {
                let (x, y, z) = (s.x.values()[idx], s.y.values()[idx], s.z.values()[idx]);
                assert_abs_diff_eq!(LEVEL_FUNCTION.eval(x, y, z), k, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn level_nine_has_radius_three() {
        let s = sample_level_surface(&LevelParams { level: 9.0 });
        assert_eq!(s.radius, 3.0);
        for idx in 0..s.x.len() {
            let (x, y, z) = (s.x.values()[idx], s.y.values()[idx], s.z.values()[idx]);
            assert_relative_eq!((x * x + y * y + z * z).sqrt(), 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn level_one_is_unit_sphere() {
        let s = sample_level_surface(&LevelParams { level: 1.0 });
        assert_eq!(s.radius, 1.0);
        assert_abs_diff_eq!(s.z.get(0, 0), 1.0);
        assert_abs_diff_eq!(s.z.get(0, ANGULAR_SAMPLES - 1), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_level_collapses_to_origin() {
        let s = sample_level_surface(&LevelParams { level: 0.0 });
        let all_zero = |g: &Grid2| g.values().iter().all(|v| *v == 0.0);
        assert!(all_zero(&s.x) && all_zero(&s.y) && all_zero(&s.z));
    }

    #[test]
    fn angular_mesh_spans_half_and_full_turn() {
        let s = sample_level_surface(&LevelParams { level: 4.0 });
        assert_eq!(s.phi.get(0, 0), 0.0);
        assert_eq!(s.phi.get(0, ANGULAR_SAMPLES - 1), PI);
        assert_eq!(s.theta.get(ANGULAR_SAMPLES - 1, 0), 2.0 * PI);
        let again = sample_level_surface(&LevelParams { level: 4.0 });
        assert_eq!(s.x, again.x);
        assert_eq!(s.z, again.z);
    }
}

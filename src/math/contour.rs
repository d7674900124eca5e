//! Level curves of a sampled height field via marching squares.

use crate::math::sampler::SurfaceSample;

pub const DEFAULT_LEVEL_COUNT: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: [f64; 2],
    pub end: [f64; 2],
}

/// All segments of the curve `f(x, y) = level`, in domain coordinates.
#[derive(Clone, Debug)]
pub struct LevelCurve {
    pub level: f64,
    pub segments: Vec<Segment>,
}

/// `count` evenly spaced levels strictly between `z_min` and `z_max`.
pub fn contour_levels(z_min: f64, z_max: f64, count: usize) -> Vec<f64> {
    if count == 0 || !(z_max > z_min) || !z_min.is_finite() || !z_max.is_finite() {
        return Vec::new();
    }
    let step = (z_max - z_min) / (count + 1) as f64;
    (1..=count).map(|i| z_min + i as f64 * step).collect()
}

pub fn level_curves(sample: &SurfaceSample, levels: &[f64]) -> Vec<LevelCurve> {
    levels
        .iter()
        .map(|&level| LevelCurve {
            level,
            segments: march_squares(sample, level),
        })
        .collect()
}

fn march_squares(sample: &SurfaceSample, level: f64) -> Vec<Segment> {
    let (rows, cols) = sample.z.shape();
    if rows < 2 || cols < 2 {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let point = |i: usize, j: usize| [sample.x.get(i, j), sample.y.get(i, j)];

    for i in 0..rows - 1 {
        for j in 0..cols - 1 {
            let corners = [(i, j), (i, j + 1), (i + 1, j + 1), (i + 1, j)];
            let values = corners.map(|(a, b)| sample.z.get(a, b));
            if values.iter().any(|v| !v.is_finite()) {
                continue;
            }

            let mut case = 0u8;
            for (bit, v) in values.iter().enumerate() {
                if *v >= level {
                    case |= 1 << bit;
                }
            }
            if case == 0 || case == 15 {
                continue;
            }

            // Edges: 0 = (c0, c1), 1 = (c1, c2), 2 = (c2, c3), 3 = (c3, c0)
            let edge = |e: usize| {
                let (a, b) = (e, (e + 1) % 4);
                let (ia, ja) = corners[a];
                let (ib, jb) = corners[b];
                interpolate(point(ia, ja), point(ib, jb), values[a], values[b], level)
            };

            let mut push = |e0: usize, e1: usize| {
                segments.push(Segment {
                    start: edge(e0),
                    end: edge(e1),
                })
            };

            match case {
                1 | 14 => push(3, 0),
                2 | 13 => push(0, 1),
                3 | 12 => push(3, 1),
                4 | 11 => push(1, 2),
                6 | 9 => push(0, 2),
                7 | 8 => push(2, 3),
                5 => {
                    push(3, 0);
                    push(1, 2);
                }
                10 => {
                    push(0, 1);
                    push(2, 3);
                }
                _ => {}
            }
        }
    }

    segments
}

fn interpolate(p1: [f64; 2], p2: [f64; 2], v1: f64, v2: f64, level: f64) -> [f64; 2] {
    if (v2 - v1).abs() < 1e-12 {
        return [(p1[0] + p2[0]) / 2.0, (p1[1] + p2[1]) / 2.0];
    }
    let t = ((level - v1) / (v2 - v1)).clamp(0.0, 1.0);
    [p1[0] + t * (p2[0] - p1[0]), p1[1] + t * (p2[1] - p1[1])]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::functions::FunctionChoice;
    use crate::math::sampler::{SurfaceParams, sample_surface};

    fn sample(function: FunctionChoice) -> SurfaceSample {
        sample_surface(&SurfaceParams {
            range: 5.0,
            resolution: 80,
            function,
        })
    }

    #[test]
    fn levels_stay_inside_range() {
        let levels = contour_levels(0.0, 50.0, DEFAULT_LEVEL_COUNT);
        assert_eq!(levels.len(), DEFAULT_LEVEL_COUNT);
        assert!(levels.iter().all(|l| *l > 0.0 && *l < 50.0));
        assert!(levels.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn flat_field_has_no_levels() {
        assert!(contour_levels(3.0, 3.0, 20).is_empty());
        assert!(contour_levels(f64::NAN, 1.0, 20).is_empty());
    }

    #[test]
    fn paraboloid_curves_are_circles() {
        let s = sample(FunctionChoice::Paraboloid);
        let curves = level_curves(&s, &[4.0, 9.0]);
        for curve in &curves {
            assert!(!curve.segments.is_empty());
            let radius = curve.level.sqrt();
            for seg in &curve.segments {
                for p in [seg.start, seg.end] {
                    let r = (p[0] * p[0] + p[1] * p[1]).sqrt();
                    // linear interpolation cuts chords; error bounded by the cell size
                    assert!((r - radius).abs() < 0.1, "r = {r}, expected {radius}");
                }
            }
        }
    }

    #[test]
    fn level_outside_field_yields_nothing() {
        let s = sample(FunctionChoice::Ripple);
        let curves = level_curves(&s, &[2.0]);
        assert!(curves[0].segments.is_empty());
    }

    #[test]
    fn saddle_positive_level_opens_along_x() {
        let s = sample(FunctionChoice::SaddleHyperbolic);
        let curves = level_curves(&s, &[0.5]);
        assert!(!curves[0].segments.is_empty());
        for seg in &curves[0].segments {
            let [x, y] = seg.start;
            // x² - y² = 0.5 keeps |x| > |y|
            assert!(x.abs() > y.abs());
        }
    }

    #[test]
    fn saddle_zero_level_follows_diagonals() {
        let s = sample(FunctionChoice::SaddleHyperbolic);
        let step = 10.0 / 79.0;
        let curves = level_curves(&s, &[0.0]);
        assert_eq!(curves[0].level, 0.0);
        assert!(!curves[0].segments.is_empty());
        for seg in &curves[0].segments {
            for [x, y] in [seg.start, seg.end] {
                assert!((x.abs() - y.abs()).abs() <= step + 1e-9, "({x}, {y}) is off |x| = |y|");
            }
        }
    }
}

use std::time::Instant;

use crate::math::contour::{DEFAULT_LEVEL_COUNT, LevelCurve, contour_levels, level_curves};
use crate::math::functions::LEVEL_FUNCTION;
use crate::math::mesh::{
    ParametricSurfaceMesh, SurfaceMesh, contour_vertices, heatmap_vertices, level_surface_mesh,
    sample_points, surface_mesh,
};
use crate::math::sampler::{
    LevelParams, LevelSurfaceSample, SurfaceParams, sample_level_surface, sample_surface,
};

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PlotRequest {
    Surface(SurfaceParams),
    LevelSurface(LevelParams),
}

pub struct SurfacePlot {
    pub mesh: SurfaceMesh,
    pub heatmap: Vec<f32>,
    pub contours: Vec<f32>,
    pub curves: Vec<LevelCurve>,
}

pub struct LevelSurfacePlot {
    pub mesh: ParametricSurfaceMesh,
    pub points: Vec<f32>,
    pub radius: f64,
    /// Largest `|f(x, y, z) - k|` over the samples.
    pub residual: f64,
}

pub enum PlotKind {
    Surface(SurfacePlot),
    LevelSurface(LevelSurfacePlot),
}

pub struct PlotResult {
    pub formula: String,
    pub sample_count: usize,
    pub elapsed_ms: f32,
    pub kind: PlotKind,
}

fn level_residual(sample: &LevelSurfaceSample) -> f64 {
    let k = sample.params.level;
    (0..sample.x.len())
        .map(|idx| {
            let w = LEVEL_FUNCTION.eval(sample.x.values()[idx], sample.y.values()[idx], sample.z.values()[idx]);
            (w - k).abs()
        })
        .fold(0.0, f64::max)
}

/// Runs one sampler per request on the calling thread and keeps the last
/// request so unchanged parameters are not re-sampled every frame.
#[derive(Default)]
pub struct PlotEngine {
    last_request: Option<PlotRequest>,
}

impl PlotEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_current(&self, request: &PlotRequest) -> bool {
        self.last_request.as_ref() == Some(request)
    }

    pub fn invalidate(&mut self) {
        self.last_request = None;
    }

    pub fn plot(&mut self, request: PlotRequest) -> PlotResult {
        let start = Instant::now();

        let (formula, sample_count, kind) = match request {
            PlotRequest::Surface(params) => {
                let sample = sample_surface(&params);
                let mesh = surface_mesh(&sample);

                let levels = match (sample.z.min(), sample.z.max()) {
                    (Some(lo), Some(hi)) => contour_levels(lo, hi, DEFAULT_LEVEL_COUNT),
                    _ => Vec::new(),
                };
                let curves = level_curves(&sample, &levels);

                let plot = SurfacePlot {
                    heatmap: heatmap_vertices(&sample),
                    contours: contour_vertices(&curves, params.range),
                    mesh,
                    curves,
                };
                (
                    params.function.function().formula.to_string(),
                    sample.z.len(),
                    PlotKind::Surface(plot),
                )
            }
            PlotRequest::LevelSurface(params) => {
                let sample = sample_level_surface(&params);
                let plot = LevelSurfacePlot {
                    mesh: level_surface_mesh(&sample),
                    points: sample_points(&sample),
                    radius: sample.radius,
                    residual: level_residual(&sample),
                };
                (
                    LEVEL_FUNCTION.formula_at(sample.params.level),
                    sample.x.len(),
                    PlotKind::LevelSurface(plot),
                )
            }
        };

        let elapsed_ms = start.elapsed().as_secs_f32() * 1000.0;
        log::debug!("sampled {formula} ({sample_count} points) in {elapsed_ms:.2} ms");

        self.last_request = Some(request);

        PlotResult {
            formula,
            sample_count,
            elapsed_ms,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::functions::FunctionChoice;

    #[test]
    fn surface_request_builds_all_layers() {
        let mut engine = PlotEngine::new();
        let request = PlotRequest::Surface(SurfaceParams {
            range: 5.0,
            resolution: 50,
            function: FunctionChoice::Ripple,
        });
        let result = engine.plot(request);

        assert_eq!(result.formula, "z = sin(√(x² + y²))");
        assert_eq!(result.sample_count, 2500);
        match result.kind {
            PlotKind::Surface(plot) => {
                assert_eq!(plot.heatmap.len(), 2500 * 3);
                assert_eq!(plot.curves.len(), DEFAULT_LEVEL_COUNT);
                assert!(!plot.contours.is_empty());
            }
            PlotKind::LevelSurface(_) => panic!("expected a surface plot"),
        }
        assert!(engine.is_current(&request));
    }

    #[test]
    fn level_request_reports_formula_and_radius() {
        let mut engine = PlotEngine::new();
        let result = engine.plot(PlotRequest::LevelSurface(LevelParams { level: 9.0 }));
        assert_eq!(result.formula, "w = x² + y² + z² = 9");
        assert_eq!(result.sample_count, 900);
        match result.kind {
            PlotKind::LevelSurface(plot) => {
                assert_eq!(plot.radius, 3.0);
                assert!(plot.residual < 1e-9);
                assert_eq!(plot.points.len(), 900 * 3);
            }
            PlotKind::Surface(_) => panic!("expected a level surface"),
        }
    }

    #[test]
    fn contour_levels_come_from_the_f64_field() {
        let params = SurfaceParams {
            range: 7.0,
            resolution: 63,
            function: FunctionChoice::Ripple,
        };
        let sample = sample_surface(&params);
        let (lo, hi) = (sample.z.min().unwrap(), sample.z.max().unwrap());
        let expected = contour_levels(lo, hi, DEFAULT_LEVEL_COUNT);

        let result = PlotEngine::new().plot(PlotRequest::Surface(params));
        let PlotKind::Surface(plot) = result.kind else {
            panic!("expected a surface plot");
        };
        let levels: Vec<f64> = plot.curves.iter().map(|c| c.level).collect();
        assert_eq!(levels, expected);
    }

    #[test]
    fn changed_parameters_are_not_current() {
        let mut engine = PlotEngine::new();
        engine.plot(PlotRequest::LevelSurface(LevelParams { level: 4.0 }));
        assert!(!engine.is_current(&PlotRequest::LevelSurface(LevelParams { level: 5.0 })));
        engine.invalidate();
        assert!(!engine.is_current(&PlotRequest::LevelSurface(LevelParams { level: 4.0 })));
    }
}

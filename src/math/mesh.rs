use crate::math::contour::LevelCurve;
use crate::math::sampler::{LevelSurfaceSample, SurfaceSample};

/// Half extent of the x/y footprint of a surface plot in scene units.
pub const SCENE_HALF_EXTENT: f64 = 100.0;
/// Scene units per unit of radius for level surfaces.
pub const LEVEL_SCENE_SCALE: f64 = 40.0;
/// Fraction of the 2D viewport covered by the domain map.
const MAP_FILL: f64 = 0.9;

pub struct TriangleMesh {
    pub vertices: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
}

pub struct SurfaceMesh {
    pub mesh: TriangleMesh,
    pub z_min: f32,
    pub z_max: f32,
    /// Height of the lowest and highest vertex after scene scaling.
    pub scene_height: (f32, f32),
}

pub struct ParametricSurfaceMesh {
    pub mesh: TriangleMesh,
    pub scene_height: (f32, f32),
}

/// Two triangles per cell of a `rows` x `cols` vertex grid.
fn grid_indices(rows: usize, cols: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(rows.saturating_sub(1) * cols.saturating_sub(1) * 6);
    for i in 0..rows.saturating_sub(1) {
        for j in 0..cols.saturating_sub(1) {
            let tl = (i * cols + j) as u32;
            let tr = (i * cols + j + 1) as u32;
            let bl = ((i + 1) * cols + j) as u32;
            let br = ((i + 1) * cols + j + 1) as u32;

            indices.extend_from_slice(&[tl, bl, tr, tr, bl, br]);
        }
    }
    indices
}

/// Domain `(x, y, z)` to the y-up scene frame. Keeps the frame right-handed.
#[inline]
fn to_scene(x: f64, y: f64, z: f64) -> [f64; 3] {
    [x, z, -y]
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Per-vertex normals from the grid tangents, one-sided at the borders.
fn grid_normals(positions: &[[f64; 3]], rows: usize, cols: usize) -> Vec<f32> {
    let at = |i: usize, j: usize| positions[i * cols + j];
    let mut normals = Vec::with_capacity(rows * cols * 3);

    for i in 0..rows {
        for j in 0..cols {
            let (i0, i1) = (i.saturating_sub(1), (i + 1).min(rows - 1));
            let (j0, j1) = (j.saturating_sub(1), (j + 1).min(cols - 1));

            let along_cols = sub(at(i, j1), at(i, j0));
            let along_rows = sub(at(i1, j), at(i0, j));
            let n = cross(along_cols, along_rows);
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();

            if len > 1e-12 {
                normals.extend_from_slice(&[(n[0] / len) as f32, (n[1] / len) as f32, (n[2] / len) as f32]);
            } else {
                normals.extend_from_slice(&[0.0, 1.0, 0.0]);
            }
        }
    }
    normals
}

/// Scene positions are y-up: the height field drives the y axis and the
/// domain's y axis maps onto scene -z.
pub fn surface_mesh(sample: &SurfaceSample) -> SurfaceMesh {
    let (rows, cols) = sample.z.shape();
    let range = sample.params.range.abs().max(1e-3);

    let z_min = sample.z.min().unwrap_or(0.0);
    let z_max = sample.z.max().unwrap_or(0.0);
    let z_span = (z_max - z_min).max(1e-3);
    let z_mid = (z_min + z_max) / 2.0;
    let height_scale = 2.0 * SCENE_HALF_EXTENT / z_span;

    let mut positions = Vec::with_capacity(rows * cols);
    for i in 0..rows {
        for j in 0..cols {
            let z = sample.z.get(i, j);
            let height = if z.is_finite() { (z - z_mid) * height_scale } else { 0.0 };
            positions.push(to_scene(
                sample.x.get(i, j) / range * SCENE_HALF_EXTENT,
                sample.y.get(i, j) / range * SCENE_HALF_EXTENT,
                height,
            ));
        }
    }

    let normals = grid_normals(&positions, rows, cols);
    let vertices = positions
        .iter()
        .flat_map(|p| p.map(|c| c as f32))
        .collect();

    let half_height = (z_max - z_min) / 2.0 * height_scale;

    SurfaceMesh {
        mesh: TriangleMesh {
            vertices,
            normals,
            indices: grid_indices(rows, cols),
        },
        z_min: z_min as f32,
        z_max: z_max as f32,
        scene_height: (-half_height as f32, half_height as f32),
    }
}

pub fn level_surface_mesh(sample: &LevelSurfaceSample) -> ParametricSurfaceMesh {
    let (rows, cols) = sample.x.shape();

    let positions: Vec<[f64; 3]> = (0..rows * cols)
        .map(|idx| {
            let (x, y, z) = (sample.x.values()[idx], sample.y.values()[idx], sample.z.values()[idx]);
            to_scene(x * LEVEL_SCENE_SCALE, y * LEVEL_SCENE_SCALE, z * LEVEL_SCENE_SCALE)
        })
        .collect();

    // Outward unit normal of the sphere at (phi, theta), defined at the poles
    // and for k = 0 as well.
    let normals = sample
        .phi
        .values()
        .iter()
        .zip(sample.theta.values())
        .flat_map(|(&p, &t)| to_scene(p.sin() * t.cos(), p.sin() * t.sin(), p.cos()).map(|c| c as f32))
        .collect();

    let vertices = positions
        .iter()
        .flat_map(|p| p.map(|c| c as f32))
        .collect();
    let extent = (sample.radius * LEVEL_SCENE_SCALE) as f32;

    ParametricSurfaceMesh {
        mesh: TriangleMesh {
            vertices,
            normals,
            indices: grid_indices(rows, cols),
        },
        scene_height: (-extent, extent),
    }
}

/// Raw sample points of the level surface in scene coordinates.
pub fn sample_points(sample: &LevelSurfaceSample) -> Vec<f32> {
    (0..sample.x.len())
        .flat_map(|idx| {
            to_scene(
                sample.x.values()[idx] * LEVEL_SCENE_SCALE,
                sample.y.values()[idx] * LEVEL_SCENE_SCALE,
                sample.z.values()[idx] * LEVEL_SCENE_SCALE,
            )
            .map(|c| c as f32)
        })
        .collect()
}

/// `(u, v, t)` per grid vertex for the filled domain map: `u, v` in
/// normalised device coordinates and `t` the height rescaled to `[0, 1]`.
/// Vertex order matches `surface_mesh`, so its indices can be reused.
pub fn heatmap_vertices(sample: &SurfaceSample) -> Vec<f32> {
    let range = sample.params.range.abs().max(1e-3);
    let z_min = sample.z.min().unwrap_or(0.0);
    let z_span = (sample.z.max().unwrap_or(0.0) - z_min).max(1e-12);

    (0..sample.z.len())
        .flat_map(|idx| {
            let z = sample.z.values()[idx];
            let t = if z.is_finite() { ((z - z_min) / z_span).clamp(0.0, 1.0) } else { 0.0 };
            [
                (sample.x.values()[idx] / range * MAP_FILL) as f32,
                (sample.y.values()[idx] / range * MAP_FILL) as f32,
                t as f32,
            ]
        })
        .collect()
}

/// Line-list vertices `(u, v)` for the level curves, same mapping as
/// `heatmap_vertices`.
pub fn contour_vertices(curves: &[LevelCurve], range: f64) -> Vec<f32> {
    let scale = MAP_FILL / range.abs().max(1e-3);
    curves
        .iter()
        .flat_map(|curve| curve.segments.iter())
        .flat_map(|seg| {
            [
                (seg.start[0] * scale) as f32,
                (seg.start[1] * scale) as f32,
                (seg.end[0] * scale) as f32,
                (seg.end[1] * scale) as f32,
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::contour::{contour_levels, level_curves};
    use crate::math::functions::FunctionChoice;
    use crate::math::sampler::{LevelParams, SurfaceParams, sample_level_surface, sample_surface};
    use approx::assert_abs_diff_eq;

    fn paraboloid(n: usize) -> SurfaceSample {
        sample_surface(&SurfaceParams {
            range: 5.0,
            resolution: n,
            function: FunctionChoice::Paraboloid,
        })
    }

    #[test]
    fn surface_mesh_topology() {
        let n = 30;
        let mesh = surface_mesh(&paraboloid(n));
        assert_eq!(mesh.mesh.vertices.len(), n * n * 3);
        assert_eq!(mesh.mesh.normals.len(), n * n * 3);
        assert_eq!(mesh.mesh.indices.len(), 6 * (n - 1) * (n - 1));
        assert!(mesh.mesh.indices.iter().all(|&i| (i as usize) < n * n));
    }

    #[test]
    fn surface_mesh_fits_scene_box() {
        let mesh = surface_mesh(&paraboloid(40));
        assert_abs_diff_eq!(mesh.z_min, 0.0, epsilon = 0.05);
        assert_eq!(mesh.z_max, 50.0);
        for p in mesh.mesh.vertices.chunks(3) {
            for c in p {
                assert!(c.abs() <= SCENE_HALF_EXTENT as f32 + 1e-3);
            }
        }
        assert_abs_diff_eq!(mesh.scene_height.1, 100.0, epsilon = 1e-3);
    }

    #[test]
    fn surface_normals_are_unit_and_upward_at_bottom() {
        let n = 41;
        let mesh = surface_mesh(&paraboloid(n));
        for v in mesh.mesh.normals.chunks(3) {
            let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert_abs_diff_eq!(len, 1.0, epsilon = 1e-4);
        }
        let mid = (n / 2) * n + n / 2;
        let up = mesh.mesh.normals[mid * 3 + 1];
        assert!(up > 0.99);
    }

    #[test]
    fn scene_frame_stays_right_handed() {
        let [ex, ey, ez] = [
            to_scene(1.0, 0.0, 0.0),
            to_scene(0.0, 1.0, 0.0),
            to_scene(0.0, 0.0, 1.0),
        ];
        assert_eq!(cross(ex, ey), ez);

        // first vertex is the domain corner (-r, -r)
        let mesh = surface_mesh(&paraboloid(20));
        assert_abs_diff_eq!(mesh.mesh.vertices[0], -100.0, epsilon = 1e-3);
        assert_abs_diff_eq!(mesh.mesh.vertices[2], 100.0, epsilon = 1e-3);

        let sample = sample_level_surface(&LevelParams { level: 4.0 });
        let points = sample_points(&sample);
        for (idx, p) in points.chunks(3).enumerate() {
            let y = sample.y.values()[idx];
            assert_abs_diff_eq!(p[2], -(y * LEVEL_SCENE_SCALE) as f32, epsilon = 1e-3);
        }
    }

    #[test]
    fn level_surface_mesh_normals_point_outwards() {
        let sample = sample_level_surface(&LevelParams { level: 9.0 });
        let mesh = level_surface_mesh(&sample);
        assert_eq!(mesh.scene_height, (-120.0, 120.0));
        for (p, n) in mesh.mesh.vertices.chunks(3).zip(mesh.mesh.normals.chunks(3)) {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert_abs_diff_eq!(len, 1.0, epsilon = 1e-5);
            let dot = p[0] * n[0] + p[1] * n[1] + p[2] * n[2];
            assert_abs_diff_eq!(dot, 120.0, epsilon = 1e-2);
        }
    }

    #[test]
    fn collapsed_level_surface_keeps_unit_normals() {
        let mesh = level_surface_mesh(&sample_level_surface(&LevelParams { level: 0.0 }));
        assert_eq!(&mesh.mesh.normals[..3], &[0.0, 1.0, 0.0]);
        assert!(mesh.mesh.vertices.iter().all(|c| *c == 0.0));
    }

    #[test]
    fn sample_points_keep_radius() {
        let sample = sample_level_surface(&LevelParams { level: 4.0 });
        let points = sample_points(&sample);
        assert_eq!(points.len(), sample.x.len() * 3);
        for p in points.chunks(3) {
            let r = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert_abs_diff_eq!(r, 80.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn heatmap_spans_unit_interval() {
        let data = heatmap_vertices(&paraboloid(25));
        let ts: Vec<f32> = data.chunks(3).map(|c| c[2]).collect();
        assert_eq!(ts.iter().cloned().fold(f32::MAX, f32::min), 0.0);
        assert_eq!(ts.iter().cloned().fold(f32::MIN, f32::max), 1.0);
        assert_abs_diff_eq!(data[0], -0.9, epsilon = 1e-6);
    }

    #[test]
    fn contour_vertices_are_pairs_inside_viewport() {
        let sample = paraboloid(50);
        let levels = contour_levels(sample.z.min().unwrap(), sample.z.max().unwrap(), 20);
        let curves = level_curves(&sample, &levels);
        let verts = contour_vertices(&curves, 5.0);
        assert!(!verts.is_empty());
        assert_eq!(verts.len() % 4, 0);
        assert!(verts.iter().all(|c| c.abs() <= 0.9 + 1e-6));
    }
}

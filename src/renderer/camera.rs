use glam::{Mat4, Vec2, Vec3};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CameraMode {
    Free,
    Orbital,
}

const HOME_DISTANCE: f32 = 420.0;
const HOME_YAW_DEG: f32 = 45.0;
const HOME_PITCH_DEG: f32 = 30.0;

pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,

    pub target: Vec3,
    pub orbital_distance: f32,

    pub mode: CameraMode,

    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    pub move_speed: f32,
    pub mouse_sensitivity: f32,
    pub zoom_speed: f32,
}

impl Default for Camera {
    fn default() -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            yaw: HOME_YAW_DEG.to_radians(),
            pitch: HOME_PITCH_DEG.to_radians(),

            target: Vec3::ZERO,
            orbital_distance: HOME_DISTANCE,

            mode: CameraMode::Orbital,

            fov: 50.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.5,
            far: 10000.0,

            move_speed: 200.0,
            mouse_sensitivity: 0.004,
            zoom_speed: 25.0,
        };
        camera.update_orbital_position();
        camera
    }
}

impl Camera {
    pub fn front(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.front().cross(Vec3::Y).normalize()
    }

    pub fn view_matrix(&self) -> Mat4 {
        match self.mode {
            CameraMode::Free => {
                Mat4::look_at_rh(self.position, self.position + self.front(), Vec3::Y)
            }
            CameraMode::Orbital => Mat4::look_at_rh(self.position, self.target, Vec3::Y),
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Back to the three-quarter view of the origin, keeping the aspect.
    pub fn reset(&mut self) {
        let aspect = self.aspect;
        *self = Self {
            aspect,
            ..Self::default()
        };
    }

    pub fn process_keyboard(&mut self, forward: f32, right: f32, up: f32, dt: f32) {
        if self.mode != CameraMode::Free {
            return;
        }

        let speed = self.move_speed * dt;
        let front = self.front();
        let right_vec = self.right();

        self.position += front * forward * speed;
        self.position += right_vec * right * speed;
        self.position.y += up * speed;
    }

    pub fn process_mouse_movement(&mut self, delta: Vec2) {
        let dx = delta.x * self.mouse_sensitivity;
        let dy = delta.y * self.mouse_sensitivity;

        self.yaw += dx;
        match self.mode {
            CameraMode::Free => self.pitch -= dy,
            // dragging down lifts the eye above the plot
            CameraMode::Orbital => self.pitch += dy,
        }

        let max_pitch = 89.0_f32.to_radians();
        self.pitch = self.pitch.clamp(-max_pitch, max_pitch);

        if self.mode == CameraMode::Orbital {
            self.update_orbital_position();
        }
    }

    pub fn process_scroll(&mut self, delta: f32) {
        match self.mode {
            CameraMode::Free => {
                self.move_speed = (self.move_speed + delta * self.zoom_speed).clamp(10.0, 2000.0);
            }
            CameraMode::Orbital => {
                self.orbital_distance =
                    (self.orbital_distance - delta * self.zoom_speed).clamp(50.0, 3000.0);
                self.update_orbital_position();
            }
        }
    }

    pub fn set_mode(&mut self, mode: CameraMode) {
        if self.mode == mode {
            return;
        }

        match mode {
            CameraMode::Free => {
                let dir = (self.target - self.position).normalize();
                self.yaw = dir.z.atan2(dir.x);
                self.pitch = dir.y.asin();
                self.mode = CameraMode::Free;
            }
            CameraMode::Orbital => {
                self.mode = CameraMode::Orbital;
                self.orbital_distance = self.position.distance(self.target).max(50.0);

                let dir = (self.position - self.target).normalize();
                self.yaw = dir.z.atan2(dir.x);
                self.pitch = dir.y.asin();

                self.update_orbital_position();
            }
        }
    }

    fn update_orbital_position(&mut self) {
        self.position = self.target
            + Vec3::new(
                self.orbital_distance * self.yaw.cos() * self.pitch.cos(),
                self.orbital_distance * self.pitch.sin(),
                self.orbital_distance * self.yaw.sin() * self.pitch.cos(),
            );
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect = width / height;
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub _padding: f32,
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: camera.position.to_array(),
            _padding: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn default_camera_orbits_origin_from_above() {
        let camera = Camera::default();
        assert_abs_diff_eq!(camera.position.length(), HOME_DISTANCE, epsilon = 1e-3);
        assert!(camera.position.y > 0.0);
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let camera = Camera::default();
        let clip = camera.view_projection_matrix() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_abs_diff_eq!(clip.x / clip.w, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(clip.y / clip.w, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn orbit_keeps_distance_and_zoom_is_clamped() {
        let mut camera = Camera::default();
        camera.process_mouse_movement(Vec2::new(120.0, -40.0));
        assert_abs_diff_eq!(camera.position.length(), HOME_DISTANCE, epsilon = 1e-2);

        for _ in 0..200 {
            camera.process_scroll(5.0);
        }
        assert_eq!(camera.orbital_distance, 50.0);
    }

    #[test]
    fn reset_restores_home_view() {
        let mut camera = Camera::default();
        camera.set_aspect(800.0, 600.0);
        camera.process_scroll(-3.0);
        camera.set_mode(CameraMode::Free);
        camera.reset();
        assert_eq!(camera.mode, CameraMode::Orbital);
        assert_eq!(camera.orbital_distance, HOME_DISTANCE);
        assert_abs_diff_eq!(camera.aspect, 800.0 / 600.0);
    }
}

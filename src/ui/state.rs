use crate::config::{ModeArg, VisualizerConfig};
use crate::math::FunctionChoice;
use crate::math::PlotRequest;
use crate::math::sampler::{LevelParams, SurfaceParams};
use crate::renderer::CameraMode;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppMode {
    TwoVariable,
    ThreeVariable,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SurfaceViewMode {
    Surface3D,
    Contour2D,
}

pub struct UiState {
    pub app_mode: AppMode,

    pub function_choice: FunctionChoice,
    pub resolution: u32,
    pub range_val: u32,
    pub iso_val: u32,

    pub surface_view: SurfaceViewMode,
    pub camera_mode: CameraMode,
    pub show_grid: bool,
    pub show_samples: bool,
    pub vsync_enabled: bool,
    pub show_stats: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self::from(&VisualizerConfig::default())
    }
}

impl From<&VisualizerConfig> for UiState {
    fn from(config: &VisualizerConfig) -> Self {
        Self {
            app_mode: match config.mode {
                ModeArg::Two => AppMode::TwoVariable,
                ModeArg::Three => AppMode::ThreeVariable,
            },

            function_choice: config.function,
            resolution: config.resolution,
            range_val: config.range,
            iso_val: config.level,

            surface_view: SurfaceViewMode::Surface3D,
            camera_mode: CameraMode::Orbital,
            show_grid: true,
            show_samples: false,
            vsync_enabled: config.vsync,
            show_stats: true,
        }
    }
}

impl UiState {
    /// Snapshot of the widget values for the active topic.
    pub fn plot_request(&self) -> PlotRequest {
        match self.app_mode {
            AppMode::TwoVariable => PlotRequest::Surface(SurfaceParams {
                range: self.range_val as f64,
                resolution: self.resolution as usize,
                function: self.function_choice,
            }),
            AppMode::ThreeVariable => PlotRequest::LevelSurface(LevelParams {
                level: self.iso_val as f64,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_follows_active_mode() {
        let mut state = UiState::default();
        assert_eq!(
            state.plot_request(),
            PlotRequest::Surface(SurfaceParams {
                range: 5.0,
                resolution: 50,
                function: FunctionChoice::Paraboloid,
            })
        );

        state.app_mode = AppMode::ThreeVariable;
        state.iso_val = 16;
        assert_eq!(
            state.plot_request(),
            PlotRequest::LevelSurface(LevelParams { level: 16.0 })
        );
    }

    #[test]
    fn config_seeds_widgets() {
        let config = VisualizerConfig {
            mode: ModeArg::Three,
            level: 3,
            vsync: true,
            ..Default::default()
        };
        let state = UiState::from(&config);
        assert_eq!(state.app_mode, AppMode::ThreeVariable);
        assert_eq!(state.iso_val, 3);
        assert!(state.vsync_enabled);
    }
}

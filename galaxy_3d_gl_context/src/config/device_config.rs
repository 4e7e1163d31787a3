/// Graphics device configuration

use crate::config::DesiredSurfaceFormat;

/// Graphics device configuration
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Application name (used in logs)
    pub app_name: String,
    /// Request debug contexts / extra driver logging from the backend
    pub enable_debug_output: bool,
    /// Requested pixel format
    pub desired_format: DesiredSurfaceFormat,
    /// Present from the Rendering context (render thread) instead of SingleThreaded
    pub multithreaded_rendering: bool,
    /// Block device creation until a native window is published
    pub wait_for_window: bool,
    /// Swap interval applied to the window surface (1 = vsync)
    pub swap_interval: i32,
    /// Consecutive present failures tolerated before `Error::PresentFailed`
    /// (`None` logs failures indefinitely)
    pub present_failure_threshold: Option<u32>,
    /// Size of the offscreen surface used when no window is available
    pub auxiliary_surface_size: (u32, u32),
}

impl DeviceConfig {
    pub fn with_format(mut self, format: DesiredSurfaceFormat) -> Self {
        self.desired_format = format;
        self
    }

    pub fn with_multithreaded_rendering(mut self, enabled: bool) -> Self {
        self.multithreaded_rendering = enabled;
        self
    }

    pub fn with_wait_for_window(mut self, wait: bool) -> Self {
        self.wait_for_window = wait;
        self
    }

    pub fn with_swap_interval(mut self, interval: i32) -> Self {
        self.swap_interval = interval;
        self
    }

    pub fn with_present_failure_threshold(mut self, threshold: Option<u32>) -> Self {
        self.present_failure_threshold = threshold;
        self
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            app_name: "Galaxy3D Application".to_string(),
            enable_debug_output: cfg!(debug_assertions),
            desired_format: DesiredSurfaceFormat::default(),
            multithreaded_rendering: true,
            wait_for_window: true,
            swap_interval: 1,
            present_failure_threshold: Some(60),
            auxiliary_surface_size: (1, 1),
        }
    }
}

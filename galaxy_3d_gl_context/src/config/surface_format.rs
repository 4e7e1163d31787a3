/// Pixel format requested by the engine and configs offered by the driver

use std::fmt;
use crate::native::ConfigId;

/// Requested surface pixel format
///
/// Set once at startup from platform defaults or overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DesiredSurfaceFormat {
    pub red_bits: u32,
    pub green_bits: u32,
    pub blue_bits: u32,
    pub alpha_bits: u32,
    pub depth_bits: u32,
    pub stencil_bits: u32,
    /// EGL_SAMPLE_BUFFERS (0 or 1)
    pub sample_buffers: u32,
    /// EGL_SAMPLES
    pub samples: u32,
    /// Prefer a config with non-linear depth (EGL_DEPTH_ENCODING_NONLINEAR_NV)
    pub non_linear_depth: bool,
}

impl DesiredSurfaceFormat {
    /// RGB565, 16-bit depth: the low-bandwidth format for older mobile GPUs
    pub fn rgb565() -> Self {
        Self {
            red_bits: 5,
            green_bits: 6,
            blue_bits: 5,
            alpha_bits: 0,
            depth_bits: 16,
            stencil_bits: 0,
            sample_buffers: 0,
            samples: 0,
            non_linear_depth: false,
        }
    }

    pub fn with_depth_stencil(mut self, depth_bits: u32, stencil_bits: u32) -> Self {
        self.depth_bits = depth_bits;
        self.stencil_bits = stencil_bits;
        self
    }

    pub fn with_alpha(mut self, alpha_bits: u32) -> Self {
        self.alpha_bits = alpha_bits;
        self
    }

    /// Request `samples` MSAA samples (0 disables multisampling)
    pub fn with_msaa(mut self, samples: u32) -> Self {
        self.sample_buffers = u32::from(samples > 0);
        self.samples = samples;
        self
    }
}

impl Default for DesiredSurfaceFormat {
    /// RGB888, 24-bit depth, no stencil, no MSAA
    fn default() -> Self {
        Self {
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            alpha_bits: 0,
            depth_bits: 24,
            stencil_bits: 0,
            sample_buffers: 0,
            samples: 0,
            non_linear_depth: false,
        }
    }
}

impl fmt::Display for DesiredSurfaceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "R{}G{}B{}A{} D{}S{} samples={}x{}{}",
            self.red_bits, self.green_bits, self.blue_bits, self.alpha_bits,
            self.depth_bits, self.stencil_bits,
            self.sample_buffers, self.samples,
            if self.non_linear_depth { " nonlinear-depth" } else { "" }
        )
    }
}

/// A configuration offered by the driver
///
/// Enumerated from the driver; this layer only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ConfigCandidate {
    pub id: ConfigId,
    pub red_bits: u32,
    pub green_bits: u32,
    pub blue_bits: u32,
    pub alpha_bits: u32,
    pub depth_bits: u32,
    pub stencil_bits: u32,
    pub sample_buffers: u32,
    pub samples: u32,
    pub non_linear_depth: bool,
    /// EGL_NATIVE_VISUAL_ID (the window format on Android)
    pub native_visual_id: i32,
}

impl ConfigCandidate {
    /// Candidate with the same bit depths as `format` (test and fallback helper)
    pub fn matching(id: ConfigId, format: &DesiredSurfaceFormat) -> Self {
        Self {
            id,
            red_bits: format.red_bits,
            green_bits: format.green_bits,
            blue_bits: format.blue_bits,
            alpha_bits: format.alpha_bits,
            depth_bits: format.depth_bits,
            stencil_bits: format.stencil_bits,
            sample_buffers: format.sample_buffers,
            samples: format.samples,
            non_linear_depth: format.non_linear_depth,
            native_visual_id: 0,
        }
    }
}

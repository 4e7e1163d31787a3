/*!
# Galaxy 3D GL Context - EGL Backend

EGL + OpenGL ES implementation of the `galaxy_3d_gl_context` native traits.

libEGL is loaded at runtime through khronos-egl, GL entry points through
glow. Window handles from any `raw-window-handle` provider (winit, SDL,
Android activity glue) convert into the core `NativeWindow`.
*/

mod egl_config;
mod egl_display;
mod gl_enums;
mod glow_gl;
mod window_handle;
#[cfg(feature = "gl-debug")]
mod debug;

use std::sync::Arc;
use galaxy_3d_gl_context::galaxy3d::{GraphicsDevice, Result};
use galaxy_3d_gl_context::galaxy3d::config::DeviceConfig;
use galaxy_3d_gl_context::galaxy3d::context::WindowWatch;

pub mod galaxy3d {
    pub use crate::egl_display::EglDisplay;
    pub use crate::glow_gl::GlowGl;
    pub use crate::window_handle::{native_window_from, native_window_of};
    pub use crate::create_graphics_device;
}

/// Create a `GraphicsDevice` on the default EGL display
///
/// Debug contexts are requested when `config.enable_debug_output` is set or
/// the crate is built with `gl-debug`.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use galaxy_3d_gl_context::galaxy3d::config::DeviceConfig;
/// use galaxy_3d_gl_context::galaxy3d::context::WindowWatch;
/// use galaxy_3d_gl_context_egl::galaxy3d::create_graphics_device;
///
/// let window = Arc::new(WindowWatch::new());
/// let config = DeviceConfig::default().with_wait_for_window(false);
/// let device = create_graphics_device(config, window)?;
/// # Ok::<(), galaxy_3d_gl_context::galaxy3d::Error>(())
/// ```
pub fn create_graphics_device(config: DeviceConfig, window: Arc<WindowWatch>) -> Result<GraphicsDevice> {
    let debug_context = config.enable_debug_output || cfg!(feature = "gl-debug");
    let display = Arc::new(egl_display::EglDisplay::load(debug_context)?);
    let gl = Arc::new(display.load_gl()?);
    GraphicsDevice::new(display, gl, config, window)
}

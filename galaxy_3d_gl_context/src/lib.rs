/*!
# Galaxy 3D GL Context

GPU context and framebuffer object management for the Galaxy 3D OpenGL ES
backend.

This crate is platform-agnostic: every driver call goes through the
`NativeDisplay` (EGL level) and `NativeGl` (GL level) traits, implemented by
a backend crate such as `galaxy_3d_gl_context_egl`.

## Architecture

- **ConfigSelector**: picks the driver surface config closest to the desired format
- **ContextSlotManager**: owns the Shared, Rendering and SingleThreaded contexts
  and their surfaces, provides scoped `with_context` activation
- **FramebufferObjectCache**: one framebuffer object per set of render targets
  and context, purged when a referenced texture is destroyed
- **BoundFramebufferTracker**: skips redundant framebuffer binds per context
- **GraphicsDevice**: owns all of the above for one GPU
*/

// Internal modules
mod error;
mod engine;
mod graphics_device;
pub mod log;
pub mod config;
pub mod native;
pub mod context;
pub mod framebuffer;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging hub
    pub use crate::engine::Engine;

    // Device owning contexts and framebuffer state
    pub use crate::graphics_device::GraphicsDevice;

    // Logging sub-module (types only, macros are exported at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    pub mod config {
        pub use crate::config::*;
    }

    pub mod native {
        pub use crate::native::*;
    }

    pub mod context {
        pub use crate::context::*;
    }

    pub mod framebuffer {
        pub use crate::framebuffer::*;
    }
}

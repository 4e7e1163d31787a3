/// Logical GPU contexts and the native objects each one owns

use std::fmt;
use crate::native::{
    ContextHandle, SurfaceHandle, FramebufferHandle, VertexArrayHandle, CurrentBinding,
};

/// The three logical contexts of a device
///
/// Shared and Rendering share one object namespace (textures, buffers) but
/// not bound state. SingleThreaded replaces Rendering when the renderer runs
/// without a dedicated render thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContextKind {
    /// Resource creation off the render thread
    Shared,
    /// Render thread when multithreaded rendering is active
    Rendering,
    /// Used instead of Rendering when multithreading is disabled
    SingleThreaded,
}

impl ContextKind {
    pub const ALL: [ContextKind; 3] = [
        ContextKind::Shared,
        ContextKind::Rendering,
        ContextKind::SingleThreaded,
    ];

    /// Dense index for per-context arrays
    pub fn index(self) -> usize {
        match self {
            ContextKind::Shared => 0,
            ContextKind::Rendering => 1,
            ContextKind::SingleThreaded => 2,
        }
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContextKind::Shared => "Shared",
            ContextKind::Rendering => "Rendering",
            ContextKind::SingleThreaded => "SingleThreaded",
        };
        f.write_str(name)
    }
}

/// Native objects of one logical context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContextSlot {
    pub context: Option<ContextHandle>,
    /// Window-backed surface (presenting slot only, while a window exists)
    pub primary_surface: Option<SurfaceHandle>,
    /// 1x1 pbuffer keeping the context current when there is no window
    pub auxiliary_surface: Option<SurfaceHandle>,
    /// Framebuffer the renderer draws the viewport into (renderer-owned name)
    pub viewport_framebuffer: Option<FramebufferHandle>,
    /// Default vertex array object, created in this context
    pub vertex_array: Option<VertexArrayHandle>,
}

impl ContextSlot {
    pub const EMPTY: ContextSlot = ContextSlot {
        context: None,
        primary_surface: None,
        auxiliary_surface: None,
        viewport_framebuffer: None,
        vertex_array: None,
    };

    /// Surface used when this context is made current
    pub fn active_surface(&self) -> Option<SurfaceHandle> {
        self.primary_surface.or(self.auxiliary_surface)
    }

    /// (context, surface) pair for make-current, if the slot is usable
    pub fn binding(&self) -> Option<CurrentBinding> {
        Some(CurrentBinding {
            context: self.context?,
            surface: self.active_surface()?,
        })
    }

    /// Whether `handle` is one of this slot's surfaces
    pub fn owns_surface(&self, handle: SurfaceHandle) -> bool {
        self.primary_surface == Some(handle) || self.auxiliary_surface == Some(handle)
    }
}

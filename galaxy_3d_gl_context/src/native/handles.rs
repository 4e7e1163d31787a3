/// Typed native handles
///
/// All handles are plain integers handed out by the driver. They carry no
/// ownership; the owning component destroys them explicitly.

use std::fmt;

/// Native context (EGLContext)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle(pub u64);

/// Native surface (EGLSurface)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// Native config (EGLConfig)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ConfigId(pub u64);

/// Framebuffer object name
///
/// Name 0 is the window-system-provided default framebuffer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferHandle(pub u32);

impl FramebufferHandle {
    /// The on-screen back buffer
    pub const DEFAULT: FramebufferHandle = FramebufferHandle(0);

    pub fn is_default(self) -> bool {
        self == Self::DEFAULT
    }
}

impl fmt::Debug for FramebufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            write!(f, "FramebufferHandle(default)")
        } else {
            write!(f, "FramebufferHandle({})", self.0)
        }
    }
}

/// Vertex array object name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayHandle(pub u32);

/// Texture or renderbuffer name as seen by GL
///
/// Name 0 is reserved: a color target whose resource is 0 stands for the
/// swapchain back buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NativeResource(pub u32);

impl NativeResource {
    pub const BACK_BUFFER: NativeResource = NativeResource(0);

    pub fn is_back_buffer(self) -> bool {
        self == Self::BACK_BUFFER
    }
}

/// Native API seam - the EGL-level and GL-level calls this layer issues
///
/// Everything that talks to the driver goes through `NativeDisplay` (config
/// enumeration, contexts, surfaces, make-current, swap) or `NativeGl`
/// (framebuffer objects and vertex arrays of the calling thread's current
/// context). Backends implement both; tests use `mock_native`.

mod handles;

pub use handles::*;

use bitflags::bitflags;
use crate::error::Result;
use crate::config::ConfigCandidate;

bitflags! {
    /// Optional driver features that change how attachments are made
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DriverCapabilities: u32 {
        /// GL_DEPTH_STENCIL_ATTACHMENT is usable as a single attachment point
        const COMBINED_DEPTH_STENCIL = 1 << 0;
        /// Multisampled render-to-texture with implicit resolve (tile memory)
        const MULTISAMPLED_RENDER_TO_TEXTURE = 1 << 1;
        /// glFramebufferTexture (whole layered texture attach)
        const LAYERED_ATTACHMENT = 1 << 2;
    }
}

/// Framebuffer attachment point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentPoint {
    /// GL_COLOR_ATTACHMENT0 + index
    Color(u32),
    /// GL_DEPTH_ATTACHMENT
    Depth,
    /// GL_STENCIL_ATTACHMENT
    Stencil,
    /// GL_DEPTH_STENCIL_ATTACHMENT
    DepthStencil,
}

/// Texture target passed to the 2D attach call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    /// GL_TEXTURE_2D
    Tex2D,
    /// GL_TEXTURE_2D_MULTISAMPLE
    Tex2DMultisample,
    /// GL_TEXTURE_EXTERNAL_OES
    External,
    /// GL_TEXTURE_CUBE_MAP_POSITIVE_X + face
    CubeFace(u32),
}

/// Result of glCheckFramebufferStatus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferStatus {
    Complete,
    IncompleteAttachment,
    MissingAttachment,
    IncompleteDimensions,
    IncompleteMultisample,
    Unsupported,
    /// Any other driver-reported status code
    Other(u32),
}

impl FramebufferStatus {
    pub fn is_complete(self) -> bool {
        self == FramebufferStatus::Complete
    }
}

/// Context + draw surface pair current on a thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurrentBinding {
    pub context: ContextHandle,
    pub surface: SurfaceHandle,
}

/// Platform window a surface can be created for
///
/// `raw` is the platform's native window pointer or id (ANativeWindow*,
/// X11 Window, HWND) as an integer; the window system owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeWindow {
    pub raw: usize,
    pub width: u32,
    pub height: u32,
}

/// Display-level native calls (EGL on Android/Linux)
pub trait NativeDisplay: Send + Sync {
    /// Enumerate the configurations the driver offers
    fn configs(&self) -> Result<Vec<ConfigCandidate>>;

    /// Create a context, optionally sharing the object namespace of `share_with`
    fn create_context(&self, config: ConfigId, share_with: Option<ContextHandle>) -> Result<ContextHandle>;

    fn destroy_context(&self, context: ContextHandle);

    /// Create a window-backed surface sized to the window
    fn create_window_surface(&self, config: ConfigId, window: &NativeWindow) -> Result<SurfaceHandle>;

    /// Create an offscreen pbuffer surface
    fn create_pbuffer_surface(&self, config: ConfigId, width: u32, height: u32) -> Result<SurfaceHandle>;

    fn destroy_surface(&self, surface: SurfaceHandle);

    /// Make `binding` current on the calling thread (`None` detaches)
    fn make_current(&self, binding: Option<CurrentBinding>) -> Result<()>;

    /// The calling thread's current context and draw surface
    fn current(&self) -> Option<CurrentBinding>;

    /// Present the back buffer of a window surface
    fn swap_buffers(&self, surface: SurfaceHandle) -> Result<()>;

    /// Set the swap interval for the surface current on the calling thread
    fn set_swap_interval(&self, interval: i32) -> Result<()>;

    /// Terminate and re-initialize the display connection
    ///
    /// Every context and surface created before the reset is invalid afterwards.
    fn reset(&self) -> Result<()>;
}

/// GL-level calls; all of them act on the calling thread's current context
pub trait NativeGl: Send + Sync {
    fn capabilities(&self) -> DriverCapabilities;

    fn create_framebuffer(&self) -> Result<FramebufferHandle>;

    fn delete_framebuffer(&self, framebuffer: FramebufferHandle);

    /// Bind to GL_FRAMEBUFFER (`FramebufferHandle::DEFAULT` binds the window)
    fn bind_framebuffer(&self, framebuffer: FramebufferHandle);

    /// Attach a whole (possibly layered) texture
    fn framebuffer_texture(&self, attachment: AttachmentPoint, texture: NativeResource, mip_level: u32);

    fn framebuffer_texture_2d(
        &self,
        attachment: AttachmentPoint,
        target: TextureTarget,
        texture: NativeResource,
        mip_level: u32,
    );

    /// Attach a single-sample texture rendered through tile-memory MSAA
    fn framebuffer_texture_2d_multisample(
        &self,
        attachment: AttachmentPoint,
        texture: NativeResource,
        mip_level: u32,
        samples: u32,
    );

    /// Attach one layer / depth slice of a 3D or array texture
    fn framebuffer_texture_layer(
        &self,
        attachment: AttachmentPoint,
        texture: NativeResource,
        mip_level: u32,
        layer: u32,
    );

    fn framebuffer_renderbuffer(&self, attachment: AttachmentPoint, renderbuffer: NativeResource);

    /// glDrawBuffers; `None` entries map to GL_NONE
    fn set_draw_buffers(&self, color_indices: &[Option<u32>]);

    /// glReadBuffer; `None` maps to GL_NONE
    fn set_read_buffer(&self, color_index: Option<u32>);

    fn check_framebuffer_status(&self) -> FramebufferStatus;

    fn create_vertex_array(&self) -> Result<VertexArrayHandle>;

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayHandle>);

    fn delete_vertex_array(&self, vertex_array: VertexArrayHandle);
}

// Recording mock of both traits for tests (no GPU required)
#[cfg(test)]
pub mod mock_native;

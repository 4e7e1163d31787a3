/// GlowGl - `NativeGl` on OpenGL ES through glow
///
/// GL entry points are process-wide on EGL, so one `GlowGl` serves every
/// context; each call acts on the calling thread's current context.

use std::ffi::c_void;
use std::num::NonZeroU32;
use glow::HasContext;
use galaxy_3d_gl_context::galaxy3d::Result;
use galaxy_3d_gl_context::galaxy3d::native::{
    NativeGl, DriverCapabilities, AttachmentPoint, TextureTarget, FramebufferStatus,
    FramebufferHandle, VertexArrayHandle, NativeResource,
};
use galaxy_3d_gl_context::{engine_err, engine_info, engine_warn};
use crate::gl_enums::{
    attachment_to_gl, texture_target_to_gl, draw_buffer_to_gl, framebuffer_status_from_gl,
};

const SOURCE: &str = "galaxy3d::egl::Gl";

const MULTISAMPLED_RENDER_TO_TEXTURE: &str = "GL_EXT_multisampled_render_to_texture";
const LAYERED_ATTACHMENT_EXTENSIONS: [&str; 2] = ["GL_EXT_geometry_shader", "GL_OES_geometry_shader"];

/// glFramebufferTexture2DMultisampleEXT
type FramebufferTexture2DMultisampleFn = unsafe extern "system" fn(u32, u32, u32, u32, i32, i32);

pub struct GlowGl {
    gl: glow::Context,
    capabilities: DriverCapabilities,
    framebuffer_texture_2d_multisample: Option<FramebufferTexture2DMultisampleFn>,
}

// SAFETY: glow::Context holds function pointers plus data read once at load
// time; no debug callback is installed, and every call goes to the context
// current on the calling thread.
unsafe impl Send for GlowGl {}
unsafe impl Sync for GlowGl {}

impl GlowGl {
    /// Load GL entry points through `loader` (e.g. `EglDisplay::proc_address`)
    ///
    /// # Safety
    ///
    /// A GL context must be current on the calling thread, and `loader` must
    /// return valid function pointers (or null) for GL function names.
    pub unsafe fn load(mut loader: impl FnMut(&str) -> *const c_void) -> Self {
        let gl = unsafe { glow::Context::from_loader_function(|name| loader(name)) };

        let extensions = gl.supported_extensions();
        let multisample = if extensions.contains(MULTISAMPLED_RENDER_TO_TEXTURE) {
            let pointer = loader("glFramebufferTexture2DMultisampleEXT");
            if pointer.is_null() {
                None
            } else {
                // SAFETY: non-null address of the entry point with this signature
                Some(unsafe { std::mem::transmute::<*const c_void, FramebufferTexture2DMultisampleFn>(pointer) })
            }
        } else {
            None
        };

        let version = gl.version();
        let layered_extension = LAYERED_ATTACHMENT_EXTENSIONS
            .iter()
            .any(|name| extensions.contains(*name));
        let capabilities = capabilities_for(version.major, version.minor, layered_extension, multisample.is_some());

        engine_info!(
            SOURCE,
            "OpenGL{} {}.{} loaded, capabilities {:?}",
            if version.is_embedded { " ES" } else { "" },
            version.major,
            version.minor,
            capabilities
        );
        #[cfg(feature = "gl-debug")]
        crate::debug::log_gl_driver_info(&gl);

        Self {
            gl,
            capabilities,
            framebuffer_texture_2d_multisample: multisample,
        }
    }

    /// The underlying glow context
    pub fn glow(&self) -> &glow::Context {
        &self.gl
    }
}

/// Capabilities of a GL(ES) `major.minor` driver
///
/// The combined depth-stencil point is core in 3.0, layered attachment in
/// 3.2 (or through a geometry shader extension).
pub(crate) fn capabilities_for(
    major: u32,
    minor: u32,
    layered_extension: bool,
    multisampled_render_to_texture: bool,
) -> DriverCapabilities {
    let mut capabilities = DriverCapabilities::empty();
    if major >= 3 {
        capabilities |= DriverCapabilities::COMBINED_DEPTH_STENCIL;
    }
    if (major, minor) >= (3, 2) || layered_extension {
        capabilities |= DriverCapabilities::LAYERED_ATTACHMENT;
    }
    if multisampled_render_to_texture {
        capabilities |= DriverCapabilities::MULTISAMPLED_RENDER_TO_TEXTURE;
    }
    capabilities
}

fn native_framebuffer(framebuffer: FramebufferHandle) -> Option<glow::NativeFramebuffer> {
    NonZeroU32::new(framebuffer.0).map(glow::NativeFramebuffer)
}

fn native_texture(texture: NativeResource) -> Option<glow::NativeTexture> {
    NonZeroU32::new(texture.0).map(glow::NativeTexture)
}

fn native_vertex_array(vertex_array: VertexArrayHandle) -> Option<glow::NativeVertexArray> {
    NonZeroU32::new(vertex_array.0).map(glow::NativeVertexArray)
}

impl NativeGl for GlowGl {
    fn capabilities(&self) -> DriverCapabilities {
        self.capabilities
    }

    fn create_framebuffer(&self) -> Result<FramebufferHandle> {
        let framebuffer = unsafe { self.gl.create_framebuffer() }
            .map_err(|e| engine_err!(SOURCE, "glGenFramebuffers failed: {}", e))?;
        Ok(FramebufferHandle(framebuffer.0.get()))
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferHandle) {
        if let Some(framebuffer) = native_framebuffer(framebuffer) {
            unsafe { self.gl.delete_framebuffer(framebuffer) };
        }
    }

    fn bind_framebuffer(&self, framebuffer: FramebufferHandle) {
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, native_framebuffer(framebuffer)) };
    }

    fn framebuffer_texture(&self, attachment: AttachmentPoint, texture: NativeResource, mip_level: u32) {
        unsafe {
            self.gl.framebuffer_texture(
                glow::FRAMEBUFFER,
                attachment_to_gl(attachment),
                native_texture(texture),
                mip_level as i32,
            );
        }
    }

    fn framebuffer_texture_2d(
        &self,
        attachment: AttachmentPoint,
        target: TextureTarget,
        texture: NativeResource,
        mip_level: u32,
    ) {
        unsafe {
            self.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                attachment_to_gl(attachment),
                texture_target_to_gl(target),
                native_texture(texture),
                mip_level as i32,
            );
        }
    }

    fn framebuffer_texture_2d_multisample(
        &self,
        attachment: AttachmentPoint,
        texture: NativeResource,
        mip_level: u32,
        samples: u32,
    ) {
        match self.framebuffer_texture_2d_multisample {
            // SAFETY: loaded for the extension reported by this driver
            Some(attach) => unsafe {
                attach(
                    glow::FRAMEBUFFER,
                    attachment_to_gl(attachment),
                    glow::TEXTURE_2D,
                    texture.0,
                    mip_level as i32,
                    samples as i32,
                );
            },
            None => {
                engine_warn!(SOURCE, "{} not loaded, attaching {:?} without MSAA", MULTISAMPLED_RENDER_TO_TEXTURE, texture);
                self.framebuffer_texture_2d(attachment, TextureTarget::Tex2D, texture, mip_level);
            }
        }
    }

    fn framebuffer_texture_layer(
        &self,
        attachment: AttachmentPoint,
        texture: NativeResource,
        mip_level: u32,
        layer: u32,
    ) {
        unsafe {
            self.gl.framebuffer_texture_layer(
                glow::FRAMEBUFFER,
                attachment_to_gl(attachment),
                native_texture(texture),
                mip_level as i32,
                layer as i32,
            );
        }
    }

    fn framebuffer_renderbuffer(&self, attachment: AttachmentPoint, renderbuffer: NativeResource) {
        unsafe {
            self.gl.framebuffer_renderbuffer(
                glow::FRAMEBUFFER,
                attachment_to_gl(attachment),
                glow::RENDERBUFFER,
                NonZeroU32::new(renderbuffer.0).map(glow::NativeRenderbuffer),
            );
        }
    }

    fn set_draw_buffers(&self, color_indices: &[Option<u32>]) {
        let buffers: Vec<u32> = color_indices.iter().copied().map(draw_buffer_to_gl).collect();
        unsafe { self.gl.draw_buffers(&buffers) };
    }

    fn set_read_buffer(&self, color_index: Option<u32>) {
        unsafe { self.gl.read_buffer(draw_buffer_to_gl(color_index)) };
    }

    fn check_framebuffer_status(&self) -> FramebufferStatus {
        framebuffer_status_from_gl(unsafe { self.gl.check_framebuffer_status(glow::FRAMEBUFFER) })
    }

    fn create_vertex_array(&self) -> Result<VertexArrayHandle> {
        let vertex_array = unsafe { self.gl.create_vertex_array() }
            .map_err(|e| engine_err!(SOURCE, "glGenVertexArrays failed: {}", e))?;
        Ok(VertexArrayHandle(vertex_array.0.get()))
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayHandle>) {
        unsafe { self.gl.bind_vertex_array(vertex_array.and_then(native_vertex_array)) };
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayHandle) {
        if let Some(vertex_array) = native_vertex_array(vertex_array) {
            unsafe { self.gl.delete_vertex_array(vertex_array) };
        }
    }
}

#[cfg(test)]
#[path = "glow_gl_tests.rs"]
mod tests;

/// GL enum conversions for attachment points, texture targets and statuses
///
/// Pure functions, so they are tested without a driver.

use galaxy_3d_gl_context::galaxy3d::native::{AttachmentPoint, TextureTarget, FramebufferStatus};

/// GL_TEXTURE_EXTERNAL_OES (OES_EGL_image_external)
pub(crate) const TEXTURE_EXTERNAL_OES: u32 = 0x8D65;

/// GL_FRAMEBUFFER_INCOMPLETE_DIMENSIONS (OpenGL ES only)
pub(crate) const FRAMEBUFFER_INCOMPLETE_DIMENSIONS: u32 = 0x8CD9;

pub(crate) fn attachment_to_gl(point: AttachmentPoint) -> u32 {
    match point {
        AttachmentPoint::Color(index) => glow::COLOR_ATTACHMENT0 + index,
        AttachmentPoint::Depth => glow::DEPTH_ATTACHMENT,
        AttachmentPoint::Stencil => glow::STENCIL_ATTACHMENT,
        AttachmentPoint::DepthStencil => glow::DEPTH_STENCIL_ATTACHMENT,
    }
}

pub(crate) fn texture_target_to_gl(target: TextureTarget) -> u32 {
    match target {
        TextureTarget::Tex2D => glow::TEXTURE_2D,
        TextureTarget::Tex2DMultisample => glow::TEXTURE_2D_MULTISAMPLE,
        TextureTarget::External => TEXTURE_EXTERNAL_OES,
        TextureTarget::CubeFace(face) => glow::TEXTURE_CUBE_MAP_POSITIVE_X + face,
    }
}

/// Draw/read buffer entry (`None` = GL_NONE)
pub(crate) fn draw_buffer_to_gl(color_index: Option<u32>) -> u32 {
    color_index.map_or(glow::NONE, |index| glow::COLOR_ATTACHMENT0 + index)
}

pub(crate) fn framebuffer_status_from_gl(status: u32) -> FramebufferStatus {
    match status {
        glow::FRAMEBUFFER_COMPLETE => FramebufferStatus::Complete,
        glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => FramebufferStatus::IncompleteAttachment,
        glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => FramebufferStatus::MissingAttachment,
        FRAMEBUFFER_INCOMPLETE_DIMENSIONS => FramebufferStatus::IncompleteDimensions,
        glow::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => FramebufferStatus::IncompleteMultisample,
        glow::FRAMEBUFFER_UNSUPPORTED => FramebufferStatus::Unsupported,
        other => FramebufferStatus::Other(other),
    }
}

#[cfg(test)]
#[path = "gl_enums_tests.rs"]
mod tests;

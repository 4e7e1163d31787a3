/// Framebuffer cache key
///
/// Value type with derived structural equality and hash: every color slot,
/// the depth-stencil target and the owning context. Framebuffer objects are
/// not shared between contexts, so the same attachments in two contexts are
/// two different keys.

use crate::context::ContextKind;
use crate::error::{Error, Result};
use crate::framebuffer::{RenderTargetBinding, DepthStencilTarget, TextureId};

/// Number of color attachment slots in a key
pub const MAX_COLOR_TARGETS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferKey {
    pub colors: [Option<RenderTargetBinding>; MAX_COLOR_TARGETS],
    pub depth_stencil: Option<DepthStencilTarget>,
    pub context: ContextKind,
}

impl FramebufferKey {
    /// Build a key; unused color slots stay `None`
    ///
    /// # Errors
    ///
    /// `InvalidResource` if more than `MAX_COLOR_TARGETS` colors are given.
    pub fn new(
        colors: &[Option<RenderTargetBinding>],
        depth_stencil: Option<DepthStencilTarget>,
        context: ContextKind,
    ) -> Result<Self> {
        if colors.len() > MAX_COLOR_TARGETS {
            return Err(Error::InvalidResource(format!(
                "{} color targets requested, at most {} are supported",
                colors.len(),
                MAX_COLOR_TARGETS
            )));
        }

        let mut slots = [None; MAX_COLOR_TARGETS];
        slots[..colors.len()].copy_from_slice(colors);
        Ok(Self { colors: slots, depth_stencil, context })
    }

    /// No color and no depth-stencil target
    pub fn is_empty(&self) -> bool {
        self.depth_stencil.is_none() && self.colors.iter().all(Option::is_none)
    }

    /// Slot 0 is the swapchain back buffer
    pub fn targets_back_buffer(&self) -> bool {
        matches!(self.colors[0], Some(binding) if binding.resource.is_back_buffer())
    }

    /// Lowest populated color slot
    pub fn first_color_index(&self) -> Option<usize> {
        self.colors.iter().position(Option::is_some)
    }

    /// Whether any attachment is a view of `texture`
    pub fn references(&self, texture: TextureId) -> bool {
        self.colors.iter().flatten().any(|binding| binding.texture == texture)
            || matches!(self.depth_stencil, Some(ds) if ds.binding.texture == texture)
    }
}

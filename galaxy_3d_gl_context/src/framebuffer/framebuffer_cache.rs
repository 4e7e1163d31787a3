/// Framebuffer object cache
///
/// Maps a `FramebufferKey` to the framebuffer object created for it, so a
/// draw into the same set of render targets reuses one object instead of
/// creating and attaching a new one every frame.
///
/// Entry life cycle: absent -> live on the first `resolve` with valid
/// attachments -> absent when `purge` removes it because a referenced
/// texture is destroyed. Live entries are always reusable.
///
/// The cache issues GL calls only from `resolve`, on the calling thread's
/// current context, which must be the key's context. Purged objects are
/// handed back to the caller for deletion in their owning context.

use rustc_hash::FxHashMap;

use crate::context::ContextKind;
use crate::error::{Error, Result};
use crate::framebuffer::{
    FramebufferKey, RenderTargetBinding, DepthStencilTarget, DepthStencilAspects,
    AttachmentKind, ArrayLayer, TextureId, BoundFramebufferTracker,
};
use crate::native::{
    NativeGl, DriverCapabilities, AttachmentPoint, TextureTarget, FramebufferHandle,
};

const SOURCE: &str = "galaxy3d::gl::FramebufferCache";

/// Number of cube map faces
const CUBE_FACES: u32 = 6;

/// A framebuffer removed from the cache, still alive in its context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgedFramebuffer {
    pub context: ContextKind,
    pub framebuffer: FramebufferHandle,
}

#[derive(Debug, Default)]
pub struct FramebufferObjectCache {
    entries: FxHashMap<FramebufferKey, FramebufferHandle>,
}

impl FramebufferObjectCache {
    pub fn new() -> Self {
        Self { entries: FxHashMap::default() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &FramebufferKey) -> Option<FramebufferHandle> {
        self.entries.get(key).copied()
    }

    /// Return the framebuffer for these targets, creating it on first use
    ///
    /// - Cached key: the stored object, no GL call.
    /// - Slot 0 is the back buffer: `FramebufferHandle::DEFAULT`, not cached.
    /// - Nothing to attach: `FramebufferHandle::DEFAULT`, no object created.
    ///
    /// A new object is bound through `tracker` (the tracker of `context`,
    /// which must be current on the calling thread) and left bound.
    ///
    /// # Errors
    ///
    /// - `InvalidResource` for too many colors or a cube face above 5
    /// - `BackendError` for a layered attach the driver cannot do
    /// - `FramebufferIncomplete` if the driver rejects the attachments
    pub fn resolve(
        &mut self,
        gl: &dyn NativeGl,
        tracker: &mut BoundFramebufferTracker,
        colors: &[Option<RenderTargetBinding>],
        depth_stencil: Option<DepthStencilTarget>,
        context: ContextKind,
    ) -> Result<FramebufferHandle> {
        let key = FramebufferKey::new(colors, depth_stencil, context)?;

        if let Some(framebuffer) = self.entries.get(&key) {
            return Ok(*framebuffer);
        }

        if key.targets_back_buffer() || key.is_empty() {
            return Ok(FramebufferHandle::DEFAULT);
        }

        let framebuffer = gl.create_framebuffer()?;
        tracker.bind(gl, framebuffer);

        let attached = match Self::attach_all(gl, &key) {
            Ok(attached) => attached,
            Err(e) => {
                Self::discard(gl, tracker, framebuffer);
                return Err(e);
            }
        };

        if attached == 0 {
            crate::engine_debug!(SOURCE, "No attachment made for {:?}, using default framebuffer", key);
            Self::discard(gl, tracker, framebuffer);
            return Ok(FramebufferHandle::DEFAULT);
        }

        let status = gl.check_framebuffer_status();
        if !status.is_complete() {
            Self::discard(gl, tracker, framebuffer);
            let message = format!("{:?} for {:?}", status, key);
            crate::engine_error!(SOURCE, "Framebuffer incomplete: {}", message);
            debug_assert!(status.is_complete(), "incomplete framebuffer: {}", message);
            return Err(Error::FramebufferIncomplete(message));
        }

        self.entries.insert(key, framebuffer);
        crate::engine_trace!(SOURCE,
            "Created {:?} in {} context ({} attachments, {} cached)",
            framebuffer, context, attached, self.entries.len());
        Ok(framebuffer)
    }

    /// Remove every entry that attaches `texture`
    ///
    /// The removed objects are returned for deletion in their own context.
    pub fn purge(&mut self, texture: TextureId) -> Vec<PurgedFramebuffer> {
        let mut purged = Vec::new();
        self.entries.retain(|key, framebuffer| {
            if key.references(texture) {
                purged.push(PurgedFramebuffer { context: key.context, framebuffer: *framebuffer });
                false
            } else {
                true
            }
        });

        if !purged.is_empty() {
            crate::engine_debug!(SOURCE, "Purged {} framebuffer(s) referencing {:?}", purged.len(), texture);
        }
        purged
    }

    /// Remove every entry owned by `context`
    pub fn drain_context(&mut self, context: ContextKind) -> Vec<FramebufferHandle> {
        let mut drained = Vec::new();
        self.entries.retain(|key, framebuffer| {
            if key.context == context {
                drained.push(*framebuffer);
                false
            } else {
                true
            }
        });
        drained
    }

    /// Forget every entry without GL calls (their contexts are gone)
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn discard(gl: &dyn NativeGl, tracker: &mut BoundFramebufferTracker, framebuffer: FramebufferHandle) {
        gl.delete_framebuffer(framebuffer);
        tracker.invalidate();
    }

    /// Attach colors (last slot first), depth-stencil, then set draw/read buffers
    fn attach_all(gl: &dyn NativeGl, key: &FramebufferKey) -> Result<usize> {
        let capabilities = gl.capabilities();
        let mut attached = 0;

        for (index, binding) in key.colors.iter().enumerate().rev() {
            if let Some(binding) = binding {
                Self::attach(gl, capabilities, AttachmentPoint::Color(index as u32), binding)?;
                attached += 1;
            }
        }

        if let Some(depth_stencil) = key.depth_stencil {
            attached += Self::attach_depth_stencil(gl, capabilities, &depth_stencil)?;
        }

        match key.first_color_index() {
            Some(first) => {
                let last = key.colors.iter().rposition(Option::is_some).unwrap_or(first);
                let draw_buffers: Vec<Option<u32>> = key.colors[..=last]
                    .iter()
                    .enumerate()
                    .map(|(index, binding)| binding.map(|_| index as u32))
                    .collect();
                gl.set_draw_buffers(&draw_buffers);
                gl.set_read_buffer(Some(first as u32));
            }
            None => {
                gl.set_draw_buffers(&[None]);
                gl.set_read_buffer(None);
            }
        }

        Ok(attached)
    }

    fn attach_depth_stencil(
        gl: &dyn NativeGl,
        capabilities: DriverCapabilities,
        target: &DepthStencilTarget,
    ) -> Result<usize> {
        let both = DepthStencilAspects::DEPTH | DepthStencilAspects::STENCIL;

        if target.aspects.contains(both) {
            if capabilities.contains(DriverCapabilities::COMBINED_DEPTH_STENCIL) {
                Self::attach(gl, capabilities, AttachmentPoint::DepthStencil, &target.binding)?;
            } else {
                Self::attach(gl, capabilities, AttachmentPoint::Depth, &target.binding)?;
                Self::attach(gl, capabilities, AttachmentPoint::Stencil, &target.binding)?;
            }
            Ok(1)
        } else if target.aspects.contains(DepthStencilAspects::DEPTH) {
            Self::attach(gl, capabilities, AttachmentPoint::Depth, &target.binding)?;
            Ok(1)
        } else if target.aspects.contains(DepthStencilAspects::STENCIL) {
            Self::attach(gl, capabilities, AttachmentPoint::Stencil, &target.binding)?;
            Ok(1)
        } else {
            Ok(0)
        }
    }

    /// Issue the attach call matching the binding's kind and layer
    fn attach(
        gl: &dyn NativeGl,
        capabilities: DriverCapabilities,
        point: AttachmentPoint,
        binding: &RenderTargetBinding,
    ) -> Result<()> {
        let resource = binding.resource;
        let mip = binding.mip_level;

        match (binding.kind, binding.array_layer) {
            (AttachmentKind::Tex2D, _) => {
                if binding.implicit_resolve_samples > 0 {
                    if capabilities.contains(DriverCapabilities::MULTISAMPLED_RENDER_TO_TEXTURE) {
                        gl.framebuffer_texture_2d_multisample(point, resource, mip, binding.implicit_resolve_samples);
                        return Ok(());
                    }
                    crate::engine_warn!(SOURCE,
                        "Implicit resolve ({}x) unsupported, attaching {:?} single-sampled",
                        binding.implicit_resolve_samples, binding.texture);
                }
                gl.framebuffer_texture_2d(point, TextureTarget::Tex2D, resource, mip);
            }
            (AttachmentKind::Tex2DMultisample, _) => {
                gl.framebuffer_texture_2d(point, TextureTarget::Tex2DMultisample, resource, mip);
            }
            (AttachmentKind::External, _) => {
                gl.framebuffer_texture_2d(point, TextureTarget::External, resource, mip);
            }
            (AttachmentKind::Renderbuffer, _) => {
                gl.framebuffer_renderbuffer(point, resource);
            }
            (kind, ArrayLayer::All) => {
                if !capabilities.contains(DriverCapabilities::LAYERED_ATTACHMENT) {
                    crate::engine_bail!(SOURCE,
                        "Layered attach of {:?} ({:?}) needs glFramebufferTexture", binding.texture, kind);
                }
                gl.framebuffer_texture(point, resource, mip);
            }
            (AttachmentKind::Cube, ArrayLayer::Layer(face)) => {
                if face >= CUBE_FACES {
                    return Err(Error::InvalidResource(format!(
                        "cube face {} of {:?} out of range 0..{}", face, binding.texture, CUBE_FACES
                    )));
                }
                gl.framebuffer_texture_2d(point, TextureTarget::CubeFace(face), resource, mip);
            }
            (AttachmentKind::Tex3D | AttachmentKind::Tex2DArray | AttachmentKind::CubeArray, ArrayLayer::Layer(layer)) => {
                gl.framebuffer_texture_layer(point, resource, mip, layer);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "framebuffer_cache_tests.rs"]
mod tests;

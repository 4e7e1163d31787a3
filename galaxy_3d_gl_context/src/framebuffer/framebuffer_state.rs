/// Framebuffer state of a device
///
/// The cache, one bound-framebuffer tracker per context, the pending
/// (next-to-bind) framebuffer and the deletions waiting for their context.
/// `GraphicsDevice` keeps one of these behind a mutex; every method expects
/// the context it is given to be current on the calling thread.

use crate::context::ContextKind;
use crate::error::Result;
use crate::framebuffer::{
    FramebufferObjectCache, BoundFramebufferTracker, RenderTargetBinding,
    DepthStencilTarget, TextureId,
};
use crate::native::{NativeGl, FramebufferHandle};

const SOURCE: &str = "galaxy3d::gl::FramebufferState";

#[derive(Debug, Default)]
pub struct FramebufferState {
    cache: FramebufferObjectCache,
    trackers: [BoundFramebufferTracker; 3],
    pending: Option<FramebufferHandle>,
    /// Purged objects not yet deleted, per owning context
    deferred_deletes: [Vec<FramebufferHandle>; 3],
    /// Context generation the cached objects belong to
    generation: u64,
}

impl FramebufferState {
    pub fn new(generation: u64) -> Self {
        Self { generation, ..Default::default() }
    }

    pub fn cache(&self) -> &FramebufferObjectCache {
        &self.cache
    }

    pub fn tracker(&self, context: ContextKind) -> &BoundFramebufferTracker {
        &self.trackers[context.index()]
    }

    pub fn pending(&self) -> Option<FramebufferHandle> {
        self.pending
    }

    pub fn deferred_deletes(&self, context: ContextKind) -> &[FramebufferHandle] {
        &self.deferred_deletes[context.index()]
    }

    /// Drop everything if the contexts were recreated since the last call
    pub fn sync_generation(&mut self, generation: u64) {
        if self.generation != generation {
            if !self.cache.is_empty() {
                crate::engine_info!(SOURCE,
                    "Contexts recreated, forgetting {} cached framebuffer(s)", self.cache.len());
            }
            self.forget_all();
            self.generation = generation;
        }
    }

    /// Resolve in `context`; deferred deletions of that context run first
    pub fn resolve(
        &mut self,
        gl: &dyn NativeGl,
        colors: &[Option<RenderTargetBinding>],
        depth_stencil: Option<DepthStencilTarget>,
        context: ContextKind,
    ) -> Result<FramebufferHandle> {
        self.flush_deferred(gl, context);
        let tracker = &mut self.trackers[context.index()];
        self.cache.resolve(gl, tracker, colors, depth_stencil, context)
    }

    /// Bind through `context`'s tracker; returns whether a native bind was issued
    pub fn bind(&mut self, gl: &dyn NativeGl, framebuffer: FramebufferHandle, context: ContextKind) -> bool {
        self.flush_deferred(gl, context);
        self.trackers[context.index()].bind(gl, framebuffer)
    }

    pub fn set_pending(&mut self, framebuffer: Option<FramebufferHandle>) {
        self.pending = framebuffer;
    }

    /// Bind the pending framebuffer, if any
    pub fn bind_pending(&mut self, gl: &dyn NativeGl, context: ContextKind) -> bool {
        match self.pending {
            Some(framebuffer) => self.bind(gl, framebuffer, context),
            None => false,
        }
    }

    /// Remove every framebuffer attaching `texture`
    ///
    /// Objects owned by `current` are deleted now; the others are deleted the
    /// next time their context resolves or binds. Trackers and the pending
    /// slot naming a removed object are reset. Returns the number removed.
    pub fn purge(&mut self, gl: &dyn NativeGl, texture: TextureId, current: Option<ContextKind>) -> usize {
        let purged = self.cache.purge(texture);

        for entry in &purged {
            if Some(entry.context) == current {
                gl.delete_framebuffer(entry.framebuffer);
            } else {
                self.deferred_deletes[entry.context.index()].push(entry.framebuffer);
            }

            for tracker in self.trackers.iter_mut() {
                tracker.reset_if(entry.framebuffer);
            }
            if self.pending == Some(entry.framebuffer) {
                self.pending = None;
            }
        }
        purged.len()
    }

    /// Force the next bind in `context` to reach the driver
    pub fn invalidate(&mut self, context: ContextKind) {
        self.trackers[context.index()].invalidate();
    }

    /// Delete every object owned by `context` (current on this thread)
    pub fn release_context(&mut self, gl: &dyn NativeGl, context: ContextKind) {
        self.flush_deferred(gl, context);
        let drained = self.cache.drain_context(context);
        for framebuffer in &drained {
            gl.delete_framebuffer(*framebuffer);
            if self.pending == Some(*framebuffer) {
                self.pending = None;
            }
        }
        self.trackers[context.index()].invalidate();
        if !drained.is_empty() {
            crate::engine_debug!(SOURCE, "Deleted {} framebuffer(s) of {} context", drained.len(), context);
        }
    }

    /// Forget everything without GL calls
    pub fn forget_all(&mut self) {
        self.cache.clear();
        self.trackers = Default::default();
        self.pending = None;
        self.deferred_deletes = Default::default();
    }

    fn flush_deferred(&mut self, gl: &dyn NativeGl, context: ContextKind) {
        let deferred = &mut self.deferred_deletes[context.index()];
        if deferred.is_empty() {
            return;
        }
        crate::engine_trace!(SOURCE, "Deleting {} deferred framebuffer(s) in {} context", deferred.len(), context);
        let tracker = &mut self.trackers[context.index()];
        for framebuffer in deferred.drain(..) {
            gl.delete_framebuffer(framebuffer);
            tracker.reset_if(framebuffer);
        }
    }
}

#[cfg(test)]
#[path = "framebuffer_state_tests.rs"]
mod tests;

/// GraphicsDevice - owner of the contexts and framebuffer state of one GPU
///
/// Created once at device init and passed to renderer components; there is
/// no global device. Framebuffer state (cache, bound trackers, pending
/// framebuffer, deferred deletions) sits behind one mutex, so resolve, bind
/// and purge may be called from the render thread and the resource thread.
///
/// Every framebuffer operation acts on the context current on the calling
/// thread; use `with_context` or `acquire_thread_ownership` first.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::DeviceConfig;
use crate::context::{
    ContextKind, ContextSlotManager, PresentOutcome, SurfaceRecovery, WindowWatch,
};
use crate::error::{Error, Result};
use crate::framebuffer::{
    FramebufferState, RenderTargetBinding, DepthStencilTarget, TextureId,
};
use crate::native::{NativeDisplay, NativeGl, NativeWindow, FramebufferHandle};

const SOURCE: &str = "galaxy3d::gl::GraphicsDevice";

pub struct GraphicsDevice {
    contexts: ContextSlotManager,
    gl: Arc<dyn NativeGl>,
    framebuffers: Mutex<FramebufferState>,
}

impl GraphicsDevice {
    /// Create the device and its three contexts
    ///
    /// With `config.wait_for_window` set this blocks until a window is
    /// published in `window` (or the wait is cancelled), so the platform
    /// layer must hold a clone of it on another thread.
    ///
    /// # Errors
    ///
    /// `ConfigurationError`, `ContextCreationFailed` or `Cancelled`.
    pub fn new(
        display: Arc<dyn NativeDisplay>,
        gl: Arc<dyn NativeGl>,
        config: DeviceConfig,
        window: Arc<WindowWatch>,
    ) -> Result<Self> {
        let device = Self::new_uninitialized(display, gl, config, window);
        device.contexts.create_contexts()?;
        device.lock_framebuffers().sync_generation(device.contexts.generation());
        Ok(device)
    }

    /// Device whose contexts are created later by `reinitialize_surface`
    pub fn new_uninitialized(
        display: Arc<dyn NativeDisplay>,
        gl: Arc<dyn NativeGl>,
        config: DeviceConfig,
        window: Arc<WindowWatch>,
    ) -> Self {
        crate::engine_info!(SOURCE, "Creating graphics device for '{}'", config.app_name);
        Self {
            contexts: ContextSlotManager::with_window_watch(display, Arc::clone(&gl), config, window),
            gl,
            framebuffers: Mutex::new(FramebufferState::new(0)),
        }
    }

    fn lock_framebuffers(&self) -> MutexGuard<'_, FramebufferState> {
        let mut state = self.framebuffers.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        state.sync_generation(self.contexts.generation());
        state
    }

    fn require_current(&self) -> Result<ContextKind> {
        self.contexts.current_kind().ok_or_else(|| {
            Error::InvalidResource("no device context is current on this thread".to_string())
        })
    }

    // ===== ACCESSORS =====

    pub fn contexts(&self) -> &ContextSlotManager {
        &self.contexts
    }

    pub fn config(&self) -> &DeviceConfig {
        self.contexts.device_config()
    }

    /// Window readiness cell for the platform layer
    pub fn window(&self) -> &WindowWatch {
        self.contexts.window()
    }

    /// Logical context current on the calling thread
    pub fn current_context(&self) -> Option<ContextKind> {
        self.contexts.current_kind()
    }

    /// Number of framebuffer objects currently cached
    pub fn cached_framebuffer_count(&self) -> usize {
        self.lock_framebuffers().cache().len()
    }

    // ===== CONTEXTS =====

    /// Run `body` with `kind` current; see `ContextSlotManager::with_context`
    ///
    /// When this switches contexts, the bound-framebuffer tracker of `kind`
    /// is invalidated so the first bind inside `body` reaches the driver.
    pub fn with_context<R>(&self, kind: ContextKind, body: impl FnOnce() -> R) -> Result<R> {
        if !self.contexts.is_current(kind) {
            self.lock_framebuffers().invalidate(kind);
        }
        self.contexts.with_context(kind, body)
    }

    /// Make the presenting context current on the calling (render) thread
    pub fn acquire_thread_ownership(&self) -> Result<()> {
        let kind = self.contexts.presenting_kind();
        if self.contexts.is_current(kind) {
            return Ok(());
        }
        self.contexts.make_current(kind)?;
        self.lock_framebuffers().invalidate(kind);
        crate::engine_debug!(SOURCE, "{} context acquired by {:?}", kind, std::thread::current().id());
        Ok(())
    }

    /// Detach the calling thread's context so another thread can acquire it
    pub fn release_thread_ownership(&self) -> Result<()> {
        self.contexts.detach()
    }

    /// Recreate surfaces for a new native window (`None` when it went away)
    pub fn reinitialize_surface(&self, window: Option<NativeWindow>) -> Result<SurfaceRecovery> {
        let recovery = self.contexts.reinitialize_surface(window)?;
        // Cached objects of reset contexts are dropped by the generation check
        let state = self.lock_framebuffers();
        crate::engine_debug!(SOURCE, "{:?}, {} framebuffer(s) cached", recovery, state.cache().len());
        Ok(recovery)
    }

    /// Present the presenting context's window surface
    pub fn present(&self) -> Result<PresentOutcome> {
        self.contexts.present()
    }

    /// Register the renderer's viewport framebuffer for `kind`
    pub fn set_viewport_framebuffer(&self, kind: ContextKind, framebuffer: Option<FramebufferHandle>) {
        self.contexts.set_viewport_framebuffer(kind, framebuffer);
    }

    // ===== FRAMEBUFFERS =====

    /// Framebuffer for these render targets in `context`, created on first use
    ///
    /// # Errors
    ///
    /// `InvalidResource` if `context` is not current on the calling thread,
    /// otherwise see `FramebufferObjectCache::resolve`.
    pub fn resolve_framebuffer(
        &self,
        colors: &[Option<RenderTargetBinding>],
        depth_stencil: Option<DepthStencilTarget>,
        context: ContextKind,
    ) -> Result<FramebufferHandle> {
        let current = self.require_current()?;
        if current != context {
            return Err(Error::InvalidResource(format!(
                "cannot resolve a {} framebuffer while the {} context is current", context, current
            )));
        }
        self.lock_framebuffers().resolve(&*self.gl, colors, depth_stencil, context)
    }

    /// Drop every cached framebuffer attaching `texture`
    ///
    /// Must run before the texture's GL name is deleted. Returns the number
    /// of framebuffers removed.
    pub fn purge_framebuffers_referencing(&self, texture: TextureId) -> usize {
        let current = self.contexts.current_kind();
        self.lock_framebuffers().purge(&*self.gl, texture, current)
    }

    /// Bind in the calling thread's context, skipping redundant binds
    ///
    /// Returns whether a native bind call was issued.
    pub fn bind_framebuffer(&self, framebuffer: FramebufferHandle) -> Result<bool> {
        let current = self.require_current()?;
        Ok(self.lock_framebuffers().bind(&*self.gl, framebuffer, current))
    }

    /// Record the framebuffer the next draw should bind
    pub fn set_pending_framebuffer(&self, framebuffer: Option<FramebufferHandle>) {
        self.lock_framebuffers().set_pending(framebuffer);
    }

    pub fn pending_framebuffer(&self) -> Option<FramebufferHandle> {
        self.lock_framebuffers().pending()
    }

    /// Bind the pending framebuffer in the calling thread's context
    pub fn bind_pending_framebuffer(&self) -> Result<bool> {
        let current = self.require_current()?;
        Ok(self.lock_framebuffers().bind_pending(&*self.gl, current))
    }

    /// Tracked bound framebuffer of `kind` (`None` = unknown)
    pub fn bound_framebuffer(&self, kind: ContextKind) -> Option<FramebufferHandle> {
        self.lock_framebuffers().tracker(kind).bound()
    }

    // ===== TEARDOWN =====

    /// Delete cached framebuffers in their own contexts, then destroy contexts
    ///
    /// Safe to call more than once; also run on drop.
    pub fn destroy(&self) {
        if !self.contexts.is_initialized() {
            return;
        }

        for kind in ContextKind::ALL {
            let result = self.with_context(kind, || {
                self.lock_framebuffers().release_context(&*self.gl, kind);
            });
            if let Err(e) = result {
                crate::engine_warn!(SOURCE, "Could not release {} framebuffers: {}", kind, e);
            }
        }

        self.contexts.destroy_contexts();
        self.lock_framebuffers().forget_all();
        crate::engine_info!(SOURCE, "Graphics device destroyed");
    }
}

impl Drop for GraphicsDevice {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
#[path = "graphics_device_tests.rs"]
mod tests;

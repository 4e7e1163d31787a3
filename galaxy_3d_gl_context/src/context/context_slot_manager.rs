/// Context slot manager - owns the Shared, Rendering and SingleThreaded contexts
///
/// Creates the three native contexts with their surfaces, provides the scoped
/// `with_context` activation, recreates surfaces when the native window
/// changes, and presents the window surface.
///
/// Surface creation failures tear the whole display connection down and reset
/// it rather than leaving a half-initialized slot behind; the next
/// `reinitialize_surface` recreates everything from scratch.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::{ConfigCandidate, ConfigSelector, DeviceConfig};
use crate::context::{ContextKind, ContextSlot, WindowWatch};
use crate::error::{Error, Result};
use crate::native::{
    NativeDisplay, NativeGl, NativeWindow, CurrentBinding, ContextHandle,
    SurfaceHandle, FramebufferHandle,
};

const SOURCE: &str = "galaxy3d::gl::ContextSlots";

/// What `reinitialize_surface` had to rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceRecovery {
    /// Contexts survived; only surfaces were recreated
    SurfacesRecreated,
    /// The display had been reset; contexts were created again
    ContextsRecreated,
}

/// Outcome of a present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    Presented,
    /// No window surface (app in background); nothing to present
    Skipped,
    /// The swap failed (under the failure threshold, or surface lost and recreated)
    Dropped,
}

struct SlotState {
    config: Option<ConfigCandidate>,
    slots: [ContextSlot; 3],
    /// Incremented each time the contexts are (re)created
    generation: u64,
    consecutive_present_failures: u32,
}

impl SlotState {
    fn slot(&self, kind: ContextKind) -> &ContextSlot {
        &self.slots[kind.index()]
    }

    fn slot_mut(&mut self, kind: ContextKind) -> &mut ContextSlot {
        &mut self.slots[kind.index()]
    }
}

/// Restores the previous current binding when a `with_context` scope ends
struct RestoreCurrent<'a> {
    display: &'a dyn NativeDisplay,
    previous: Option<CurrentBinding>,
}

impl Drop for RestoreCurrent<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.display.make_current(self.previous) {
            crate::engine_error!(SOURCE, "Failed to restore previous context {:?}: {}", self.previous, e);
        }
    }
}

/// Owner of the three logical contexts
pub struct ContextSlotManager {
    display: Arc<dyn NativeDisplay>,
    gl: Arc<dyn NativeGl>,
    config: DeviceConfig,
    window: Arc<WindowWatch>,
    state: RwLock<SlotState>,
}

impl ContextSlotManager {
    /// Create an empty manager (no native calls until `create_contexts`)
    pub fn new(display: Arc<dyn NativeDisplay>, gl: Arc<dyn NativeGl>, config: DeviceConfig) -> Self {
        Self::with_window_watch(display, gl, config, Arc::new(WindowWatch::new()))
    }

    /// Manager waiting on a window cell the platform layer already holds
    pub fn with_window_watch(
        display: Arc<dyn NativeDisplay>,
        gl: Arc<dyn NativeGl>,
        config: DeviceConfig,
        window: Arc<WindowWatch>,
    ) -> Self {
        Self {
            display,
            gl,
            config,
            window,
            state: RwLock::new(SlotState {
                config: None,
                slots: [ContextSlot::EMPTY; 3],
                generation: 0,
                consecutive_present_failures: 0,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SlotState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SlotState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ===== QUERIES =====

    /// Window readiness cell the platform layer publishes into
    pub fn window(&self) -> &WindowWatch {
        &self.window
    }

    pub fn device_config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn slot(&self, kind: ContextKind) -> ContextSlot {
        *self.read().slot(kind)
    }

    pub fn selected_config(&self) -> Option<ConfigCandidate> {
        self.read().config
    }

    pub fn is_initialized(&self) -> bool {
        self.read().config.is_some()
    }

    /// Number of times the contexts have been created (0 before the first)
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    /// The context that owns the window surface and presents
    pub fn presenting_kind(&self) -> ContextKind {
        if self.config.multithreaded_rendering {
            ContextKind::Rendering
        } else {
            ContextKind::SingleThreaded
        }
    }

    /// Which logical context is current on the calling thread
    pub fn current_kind(&self) -> Option<ContextKind> {
        let current = self.display.current()?;
        let state = self.read();
        ContextKind::ALL
            .into_iter()
            .find(|kind| state.slot(*kind).context == Some(current.context))
    }

    /// Whether `kind` is current on the calling thread with its active surface
    pub fn is_current(&self, kind: ContextKind) -> bool {
        let target = self.slot(kind).binding();
        target.is_some() && self.display.current() == target
    }

    pub fn consecutive_present_failures(&self) -> u32 {
        self.read().consecutive_present_failures
    }

    // ===== CREATION =====

    /// Select a config and create the three contexts with their surfaces
    ///
    /// Shared has no parent, Rendering shares Shared's object namespace,
    /// SingleThreaded is created on its own. Every slot gets a pbuffer; the
    /// presenting slot also gets a window surface, waiting for the window if
    /// `DeviceConfig::wait_for_window` is set.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError` if the driver offers no config
    /// - `ContextCreationFailed` if a context or surface cannot be created
    /// - `Cancelled` if the window wait was cancelled
    pub fn create_contexts(&self) -> Result<()> {
        let want_window = self.config.wait_for_window || self.window.current_window().is_some();
        self.create_contexts_with(want_window)
    }

    /// `create_contexts` with the window-surface choice made by the caller
    fn create_contexts_with(&self, want_window: bool) -> Result<()> {
        if self.is_initialized() {
            return Err(Error::InitializationFailed("contexts already created".to_string()));
        }

        let candidates = self.display.configs()?;
        let config = ConfigSelector::select(&candidates, &self.config.desired_format)?;

        let shared = self.create_native_context(config, ContextKind::Shared, None)?;
        let rendering = match self.create_native_context(config, ContextKind::Rendering, Some(shared)) {
            Ok(context) => context,
            Err(e) => {
                self.display.destroy_context(shared);
                return Err(e);
            }
        };
        let single = match self.create_native_context(config, ContextKind::SingleThreaded, None) {
            Ok(context) => context,
            Err(e) => {
                self.display.destroy_context(rendering);
                self.display.destroy_context(shared);
                return Err(e);
            }
        };

        {
            let mut state = self.write();
            state.config = Some(config);
            state.slot_mut(ContextKind::Shared).context = Some(shared);
            state.slot_mut(ContextKind::Rendering).context = Some(rendering);
            state.slot_mut(ContextKind::SingleThreaded).context = Some(single);
        }

        let setup = self.create_slot_surfaces(want_window).and_then(|()| {
            ContextKind::ALL
                .into_iter()
                .try_for_each(|kind| self.init_context_objects(kind))
        });
        if let Err(e) = setup {
            // A surface failure already reset the display
            if self.is_initialized() {
                self.destroy_contexts();
            }
            return Err(e);
        }

        let generation = {
            let mut state = self.write();
            state.generation += 1;
            state.consecutive_present_failures = 0;
            state.generation
        };

        crate::engine_info!(SOURCE,
            "Created Shared/Rendering/SingleThreaded contexts for '{}' (config {:?}, generation {})",
            self.config.app_name, config.id, generation);
        Ok(())
    }

    fn create_native_context(
        &self,
        config: ConfigCandidate,
        kind: ContextKind,
        share_with: Option<ContextHandle>,
    ) -> Result<ContextHandle> {
        self.display.create_context(config.id, share_with).map_err(|e| {
            let message = format!("{} context: {}", kind, e);
            crate::engine_error!(SOURCE, "Context creation failed: {}", message);
            Error::ContextCreationFailed(message)
        })
    }

    /// Create a surface for the selected config
    ///
    /// With `want_real_surface` this waits for the platform window (see
    /// `WindowWatch`) and creates a window surface sized to it; otherwise it
    /// creates the auxiliary pbuffer. A native failure resets the display.
    pub fn create_surface(&self, want_real_surface: bool) -> Result<SurfaceHandle> {
        let config = self
            .selected_config()
            .ok_or_else(|| Error::InitializationFailed("no config selected".to_string()))?;

        if want_real_surface {
            let window = self.window.wait_ready_blocking()?;
            self.create_window_surface(config, &window)
        } else {
            let (width, height) = self.config.auxiliary_surface_size;
            self.display
                .create_pbuffer_surface(config.id, width, height)
                .map_err(|e| self.surface_failure("pbuffer surface", e))
        }
    }

    fn create_window_surface(&self, config: ConfigCandidate, window: &NativeWindow) -> Result<SurfaceHandle> {
        let surface = self
            .display
            .create_window_surface(config.id, window)
            .map_err(|e| self.surface_failure("window surface", e))?;
        crate::engine_info!(SOURCE,
            "Created {}x{} window surface {:?}", window.width, window.height, surface);
        Ok(surface)
    }

    fn create_slot_surfaces(&self, want_window: bool) -> Result<()> {
        for kind in ContextKind::ALL {
            let auxiliary = self.create_surface(false)?;
            self.write().slot_mut(kind).auxiliary_surface = Some(auxiliary);
        }

        if want_window {
            let primary = self.create_surface(true)?;
            let presenting = self.presenting_kind();
            self.write().slot_mut(presenting).primary_surface = Some(primary);
        }
        Ok(())
    }

    /// Per-context objects: default vertex array, swap interval for the presenter
    fn init_context_objects(&self, kind: ContextKind) -> Result<()> {
        let gl = Arc::clone(&self.gl);
        let has_window = self.slot(kind).primary_surface.is_some();
        let swap_interval = self.config.swap_interval;
        let display = Arc::clone(&self.display);

        let vertex_array = self.with_context(kind, move || -> Result<_> {
            let vertex_array = gl.create_vertex_array()?;
            gl.bind_vertex_array(Some(vertex_array));
            if has_window {
                display.set_swap_interval(swap_interval)?;
            }
            Ok(vertex_array)
        })??;

        self.write().slot_mut(kind).vertex_array = Some(vertex_array);
        Ok(())
    }

    /// Record the renderer's viewport framebuffer for a slot
    pub fn set_viewport_framebuffer(&self, kind: ContextKind, framebuffer: Option<FramebufferHandle>) {
        self.write().slot_mut(kind).viewport_framebuffer = framebuffer;
    }

    // ===== SCOPED ACTIVATION =====

    /// Run `body` with `kind` current on the calling thread
    ///
    /// If the thread already has exactly that (context, surface) pair current
    /// no native call is made. Otherwise the context is made current for the
    /// duration of `body` and the previous pair (or none) is restored on every
    /// exit path, including unwinding.
    ///
    /// # Errors
    ///
    /// `InvalidResource` if the slot has no context or surface yet, or the
    /// native make-current error.
    pub fn with_context<R>(&self, kind: ContextKind, body: impl FnOnce() -> R) -> Result<R> {
        let target = self.slot(kind).binding().ok_or_else(|| {
            Error::InvalidResource(format!("{} context has no context/surface", kind))
        })?;

        let previous = self.display.current();
        if previous == Some(target) {
            return Ok(body());
        }

        crate::engine_trace!(SOURCE, "Switching to {} context", kind);
        self.display.make_current(Some(target))?;
        let _restore = RestoreCurrent {
            display: &*self.display,
            previous,
        };
        Ok(body())
    }

    /// Make `kind` current on the calling thread until changed (no restore)
    pub fn make_current(&self, kind: ContextKind) -> Result<()> {
        let target = self.slot(kind).binding().ok_or_else(|| {
            Error::InvalidResource(format!("{} context has no context/surface", kind))
        })?;
        if self.display.current() == Some(target) {
            return Ok(());
        }
        self.display.make_current(Some(target))
    }

    /// Detach whatever context is current on the calling thread
    pub fn detach(&self) -> Result<()> {
        if self.display.current().is_none() {
            return Ok(());
        }
        self.display.make_current(None)
    }

    // ===== SURFACE LOSS =====

    /// Recreate surfaces for a new (or vanished) native window
    ///
    /// Contexts stay intact; primary and auxiliary surfaces are destroyed and
    /// created again. If the calling thread had one of our contexts current
    /// it is re-attached with the new surface. If a previous surface failure
    /// reset the display, the contexts are created again first. Other threads
    /// must not hold our contexts current during this call.
    pub fn reinitialize_surface(&self, window: Option<NativeWindow>) -> Result<SurfaceRecovery> {
        self.window.set_window(window);

        if !self.is_initialized() {
            crate::engine_info!(SOURCE, "Display was reset, recreating contexts");
            self.create_contexts_with(window.is_some())?;
            return Ok(SurfaceRecovery::ContextsRecreated);
        }

        let reattach = self.current_kind();
        if reattach.is_some() {
            self.display.make_current(None)?;
        }

        self.destroy_surfaces();
        self.create_slot_surfaces(window.is_some())?;

        if window.is_some() {
            let display = Arc::clone(&self.display);
            let interval = self.config.swap_interval;
            self.with_context(self.presenting_kind(), move || display.set_swap_interval(interval))??;
        }

        if let Some(kind) = reattach {
            self.make_current(kind)?;
        }

        self.write().consecutive_present_failures = 0;
        crate::engine_info!(SOURCE, "Surfaces recreated (window: {})",
            if window.is_some() { "present" } else { "none" });
        Ok(SurfaceRecovery::SurfacesRecreated)
    }

    fn destroy_surfaces(&self) {
        let mut state = self.write();
        for slot in state.slots.iter_mut() {
            if let Some(surface) = slot.primary_surface.take() {
                self.display.destroy_surface(surface);
            }
            if let Some(surface) = slot.auxiliary_surface.take() {
                self.display.destroy_surface(surface);
            }
        }
    }

    /// Surface creation failed: tear the display down and forget everything
    fn surface_failure(&self, what: &str, cause: Error) -> Error {
        crate::engine_error!(SOURCE, "Failed to create {}: {}. Resetting display.", what, cause);

        if let Err(e) = self.display.make_current(None) {
            crate::engine_warn!(SOURCE, "Detach before display reset failed: {}", e);
        }
        if let Err(e) = self.display.reset() {
            crate::engine_error!(SOURCE, "Display reset failed: {}", e);
        }

        let mut state = self.write();
        state.config = None;
        state.slots = [ContextSlot::EMPTY; 3];

        Error::ContextCreationFailed(format!("{}: {}", what, cause))
    }

    // ===== PRESENT =====

    /// Swap the presenting slot's window surface
    ///
    /// With no window surface the frame is skipped, unless a window has been
    /// published since, in which case surfaces are recreated first. A swap
    /// reporting surface loss recreates the surfaces and drops the frame
    /// without counting as a failure.
    ///
    /// # Errors
    ///
    /// `PresentFailed` once `present_failure_threshold` consecutive swaps failed.
    pub fn present(&self) -> Result<PresentOutcome> {
        let kind = self.presenting_kind();

        if self.slot(kind).primary_surface.is_none() {
            match self.window.current_window() {
                Some(window) => {
                    crate::engine_info!(SOURCE, "Window available again, recovering surfaces");
                    self.reinitialize_surface(Some(window))?;
                }
                None => {
                    crate::engine_debug!(SOURCE, "No window surface, skipping present");
                    return Ok(PresentOutcome::Skipped);
                }
            }
        }

        let surface = match self.slot(kind).primary_surface {
            Some(surface) => surface,
            None => return Ok(PresentOutcome::Skipped),
        };

        let display = Arc::clone(&self.display);
        match self.with_context(kind, move || display.swap_buffers(surface))? {
            Ok(()) => {
                self.write().consecutive_present_failures = 0;
                Ok(PresentOutcome::Presented)
            }
            Err(Error::SurfaceLost(reason)) => {
                crate::engine_warn!(SOURCE, "Window surface lost on present ({}), recreating", reason);
                self.reinitialize_surface(self.window.current_window())?;
                Ok(PresentOutcome::Dropped)
            }
            Err(e) => {
                let failures = {
                    let mut state = self.write();
                    state.consecutive_present_failures += 1;
                    state.consecutive_present_failures
                };

                match self.config.present_failure_threshold {
                    Some(threshold) if failures >= threshold => {
                        crate::engine_error!(SOURCE, "Present failed {} times in a row: {}", failures, e);
                        Err(Error::PresentFailed {
                            consecutive_failures: failures,
                            message: e.to_string(),
                        })
                    }
                    _ => {
                        crate::engine_warn!(SOURCE, "Present failed ({} in a row): {}", failures, e);
                        Ok(PresentOutcome::Dropped)
                    }
                }
            }
        }
    }

    // ===== TEARDOWN =====

    /// Delete per-context objects, destroy surfaces and contexts
    ///
    /// Framebuffers cached for these contexts must already be deleted.
    pub fn destroy_contexts(&self) {
        if !self.is_initialized() {
            return;
        }

        for kind in ContextKind::ALL {
            let slot = self.slot(kind);
            let gl = Arc::clone(&self.gl);
            let result = self.with_context(kind, move || {
                if let Some(framebuffer) = slot.viewport_framebuffer {
                    gl.delete_framebuffer(framebuffer);
                }
                if let Some(vertex_array) = slot.vertex_array {
                    gl.bind_vertex_array(None);
                    gl.delete_vertex_array(vertex_array);
                }
            });
            if let Err(e) = result {
                crate::engine_warn!(SOURCE, "Could not release {} context objects: {}", kind, e);
            }
        }

        if self.current_kind().is_some() {
            if let Err(e) = self.display.make_current(None) {
                crate::engine_warn!(SOURCE, "Detach before destroy failed: {}", e);
            }
        }

        self.destroy_surfaces();

        let mut state = self.write();
        for slot in state.slots.iter_mut() {
            if let Some(context) = slot.context.take() {
                self.display.destroy_context(context);
            }
            *slot = ContextSlot::EMPTY;
        }
        state.config = None;

        crate::engine_info!(SOURCE, "Contexts destroyed");
    }
}

#[cfg(test)]
#[path = "context_slot_manager_tests.rs"]
mod tests;

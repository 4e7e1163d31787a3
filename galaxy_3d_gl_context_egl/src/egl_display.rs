/// EglDisplay - `NativeDisplay` on a dynamically loaded libEGL
///
/// Contexts, surfaces and configs cross the trait as integer handles holding
/// the EGL pointers. The display connection itself can be replaced by
/// `reset`, so it sits behind a mutex.

use std::ffi::c_void;
use std::sync::{Mutex, MutexGuard};
use khronos_egl as egl;
use galaxy_3d_gl_context::galaxy3d::{Error, Result};
use galaxy_3d_gl_context::galaxy3d::config::ConfigCandidate;
use galaxy_3d_gl_context::galaxy3d::native::{
    NativeDisplay, NativeWindow, CurrentBinding, ContextHandle, SurfaceHandle, ConfigId,
};
use galaxy_3d_gl_context::{engine_err, engine_debug, engine_info, engine_warn};
use crate::egl_config::{candidate_from_attribs, context_attribs, pbuffer_attribs, map_egl_error};
use crate::glow_gl::GlowGl;

const SOURCE: &str = "galaxy3d::egl::Display";

type EglInstance = egl::DynamicInstance<egl::EGL1_4>;

pub struct EglDisplay {
    egl: EglInstance,
    /// EGLDisplay of the live connection
    display: Mutex<usize>,
    debug_context: bool,
}

// SAFETY: EGL is thread-safe; handles are opaque driver pointers that any
// thread may pass back to libEGL, and the display swap is serialized.
unsafe impl Send for EglDisplay {}
unsafe impl Sync for EglDisplay {}

fn to_handle(pointer: *mut c_void) -> u64 {
    pointer as usize as u64
}

fn to_pointer(handle: u64) -> *mut c_void {
    handle as usize as *mut c_void
}

fn egl_context(context: ContextHandle) -> egl::Context {
    unsafe { egl::Context::from_ptr(to_pointer(context.0)) }
}

fn egl_surface(surface: SurfaceHandle) -> egl::Surface {
    unsafe { egl::Surface::from_ptr(to_pointer(surface.0)) }
}

fn egl_config(config: ConfigId) -> egl::Config {
    unsafe { egl::Config::from_ptr(to_pointer(config.0)) }
}

impl EglDisplay {
    /// Load libEGL and initialize the default display
    ///
    /// `debug_context` requests EGL_CONTEXT_OPENGL_DEBUG_BIT_KHR contexts.
    pub fn load(debug_context: bool) -> Result<Self> {
        let egl = unsafe { EglInstance::load_required() }
            .map_err(|e| Error::InitializationFailed(format!("libEGL could not be loaded: {}", e)))?;
        let display = Self::open(&egl)?;
        Ok(Self {
            egl,
            display: Mutex::new(display),
            debug_context,
        })
    }

    fn open(egl: &EglInstance) -> Result<usize> {
        let display = unsafe { egl.get_display(egl::DEFAULT_DISPLAY) }.ok_or_else(|| {
            Error::InitializationFailed("eglGetDisplay returned EGL_NO_DISPLAY".to_string())
        })?;
        let (major, minor) = egl
            .initialize(display)
            .map_err(|e| Error::InitializationFailed(format!("eglInitialize failed: {}", e)))?;
        egl.bind_api(egl::OPENGL_ES_API)
            .map_err(|e| Error::InitializationFailed(format!("eglBindAPI failed: {}", e)))?;

        engine_info!(SOURCE, "EGL {}.{} display initialized", major, minor);
        #[cfg(feature = "gl-debug")]
        crate::debug::log_egl_info(egl, display);

        Ok(display.as_ptr() as usize)
    }

    fn lock_display(&self) -> MutexGuard<'_, usize> {
        self.display.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn display(&self) -> egl::Display {
        let display = *self.lock_display();
        unsafe { egl::Display::from_ptr(display as *mut c_void) }
    }

    /// Address of a GL or EGL function (null when unknown)
    ///
    /// Core GL functions are found when the driver exposes
    /// EGL_KHR_get_all_proc_addresses (Android 7+, Mesa).
    pub fn proc_address(&self, name: &str) -> *const c_void {
        self.egl
            .get_proc_address(name)
            .map_or(std::ptr::null(), |function| function as *const c_void)
    }

    /// Load GL through a throwaway context
    ///
    /// glow reads the version and extension strings at load time, which
    /// needs a current context; a 1x1 pbuffer context on the first usable
    /// config provides one. The calling thread's previous binding is restored.
    pub fn load_gl(&self) -> Result<GlowGl> {
        let config = self
            .configs()?
            .first()
            .map(|candidate| candidate.id)
            .ok_or_else(|| Error::ConfigurationError("driver offers no OpenGL ES 3 config".to_string()))?;

        let context = self.create_context(config, None)?;
        let surface = match self.create_pbuffer_surface(config, 1, 1) {
            Ok(surface) => surface,
            Err(e) => {
                self.destroy_context(context);
                return Err(e);
            }
        };

        let previous = self.current();
        let loaded = self
            .make_current(Some(CurrentBinding { context, surface }))
            .map(|()| unsafe { GlowGl::load(|name| self.proc_address(name)) });
        let restored = self.make_current(previous);
        self.destroy_surface(surface);
        self.destroy_context(context);

        let gl = loaded?;
        restored?;
        Ok(gl)
    }
}

impl NativeDisplay for EglDisplay {
    fn configs(&self) -> Result<Vec<ConfigCandidate>> {
        let display = self.display();
        let count = self
            .egl
            .get_config_count(display)
            .map_err(|e| engine_err!(SOURCE, "eglGetConfigs failed: {}", e))?;
        let mut configs = Vec::with_capacity(count);
        self.egl
            .get_configs(display, &mut configs)
            .map_err(|e| engine_err!(SOURCE, "eglGetConfigs failed: {}", e))?;

        let candidates: Vec<ConfigCandidate> = configs
            .iter()
            .filter_map(|config| {
                candidate_from_attribs(ConfigId(to_handle(config.as_ptr())), |attribute| {
                    self.egl.get_config_attrib(display, *config, attribute).ok()
                })
            })
            .collect();
        engine_debug!(SOURCE, "{} of {} EGL configs usable", candidates.len(), configs.len());
        Ok(candidates)
    }

    fn create_context(&self, config: ConfigId, share_with: Option<ContextHandle>) -> Result<ContextHandle> {
        let context = self
            .egl
            .create_context(
                self.display(),
                egl_config(config),
                share_with.map(egl_context),
                &context_attribs(self.debug_context),
            )
            .map_err(|e| Error::ContextCreationFailed(format!("eglCreateContext failed: {}", e)))?;
        Ok(ContextHandle(to_handle(context.as_ptr())))
    }

    fn destroy_context(&self, context: ContextHandle) {
        if let Err(e) = self.egl.destroy_context(self.display(), egl_context(context)) {
            engine_warn!(SOURCE, "eglDestroyContext({:?}) failed: {}", context, e);
        }
    }

    fn create_window_surface(&self, config: ConfigId, window: &NativeWindow) -> Result<SurfaceHandle> {
        // SAFETY: the platform keeps the window alive while it is published
        let surface = unsafe {
            self.egl.create_window_surface(
                self.display(),
                egl_config(config),
                window.raw as egl::NativeWindowType,
                None,
            )
        }
        .map_err(|e| map_egl_error("eglCreateWindowSurface", e))?;
        Ok(SurfaceHandle(to_handle(surface.as_ptr())))
    }

    fn create_pbuffer_surface(&self, config: ConfigId, width: u32, height: u32) -> Result<SurfaceHandle> {
        let surface = self
            .egl
            .create_pbuffer_surface(self.display(), egl_config(config), &pbuffer_attribs(width, height))
            .map_err(|e| map_egl_error("eglCreatePbufferSurface", e))?;
        Ok(SurfaceHandle(to_handle(surface.as_ptr())))
    }

    fn destroy_surface(&self, surface: SurfaceHandle) {
        if let Err(e) = self.egl.destroy_surface(self.display(), egl_surface(surface)) {
            engine_warn!(SOURCE, "eglDestroySurface({:?}) failed: {}", surface, e);
        }
    }

    fn make_current(&self, binding: Option<CurrentBinding>) -> Result<()> {
        let display = self.display();
        let result = match binding {
            Some(binding) => {
                let surface = egl_surface(binding.surface);
                self.egl.make_current(display, Some(surface), Some(surface), Some(egl_context(binding.context)))
            }
            None => self.egl.make_current(display, None, None, None),
        };
        result.map_err(|e| map_egl_error("eglMakeCurrent", e))
    }

    fn current(&self) -> Option<CurrentBinding> {
        let context = self.egl.get_current_context()?;
        let surface = self.egl.get_current_surface(egl::DRAW)?;
        Some(CurrentBinding {
            context: ContextHandle(to_handle(context.as_ptr())),
            surface: SurfaceHandle(to_handle(surface.as_ptr())),
        })
    }

    fn swap_buffers(&self, surface: SurfaceHandle) -> Result<()> {
        self.egl
            .swap_buffers(self.display(), egl_surface(surface))
            .map_err(|e| map_egl_error("eglSwapBuffers", e))
    }

    fn set_swap_interval(&self, interval: i32) -> Result<()> {
        self.egl
            .swap_interval(self.display(), interval)
            .map_err(|e| map_egl_error("eglSwapInterval", e))
    }

    fn reset(&self) -> Result<()> {
        let mut display = self.lock_display();
        let old = unsafe { egl::Display::from_ptr(*display as *mut c_void) };
        if let Err(e) = self.egl.terminate(old) {
            engine_warn!(SOURCE, "eglTerminate failed: {}", e);
        }
        *display = Self::open(&self.egl)?;
        engine_info!(SOURCE, "EGL display reset");
        Ok(())
    }
}

impl Drop for EglDisplay {
    fn drop(&mut self) {
        let display = self.display();
        if let Err(e) = self.egl.terminate(display) {
            engine_warn!(SOURCE, "eglTerminate failed: {}", e);
        }
    }
}

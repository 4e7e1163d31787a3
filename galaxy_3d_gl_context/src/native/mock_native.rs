/// Mock native display + GL for unit tests (no GPU required)
///
/// Records every native call so tests can assert how many contexts,
/// surfaces and framebuffers were created, how often make-current and bind
/// were issued, and what was attached. The "current" binding is tracked per
/// OS thread like a real EGL implementation. Framebuffer names are reused
/// after deletion the way GL drivers hand them out. Failures can be injected.

use std::collections::HashMap;
use std::sync::Mutex;
use std::thread::{self, ThreadId};

use crate::config::ConfigCandidate;
use crate::error::{Error, Result};
use crate::native::{
    NativeDisplay, NativeGl, DriverCapabilities, AttachmentPoint, TextureTarget,
    FramebufferStatus, CurrentBinding, NativeWindow, NativeResource,
    ContextHandle, SurfaceHandle, ConfigId, FramebufferHandle, VertexArrayHandle,
};

/// One recorded attachment call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockAttachCall {
    Texture { attachment: AttachmentPoint, texture: NativeResource, mip_level: u32 },
    Texture2D { attachment: AttachmentPoint, target: TextureTarget, texture: NativeResource, mip_level: u32 },
    Texture2DMultisample { attachment: AttachmentPoint, texture: NativeResource, mip_level: u32, samples: u32 },
    TextureLayer { attachment: AttachmentPoint, texture: NativeResource, mip_level: u32, layer: u32 },
    Renderbuffer { attachment: AttachmentPoint, renderbuffer: NativeResource },
}

/// Kind of surface created through the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockSurfaceKind {
    Window(NativeWindow),
    Pbuffer { width: u32, height: u32 },
}

/// Everything the mock has seen
#[derive(Debug, Default)]
pub struct MockState {
    pub configs: Vec<ConfigCandidate>,
    pub capabilities: DriverCapabilities,

    next_handle: u64,
    pub contexts: HashMap<ContextHandle, Option<ContextHandle>>,
    pub contexts_created: u32,
    pub surfaces: HashMap<SurfaceHandle, MockSurfaceKind>,
    pub surfaces_created: u32,
    pub current: HashMap<ThreadId, CurrentBinding>,
    pub make_current_calls: u32,
    pub swap_calls: u32,
    pub swap_interval: Option<i32>,
    pub reset_calls: u32,

    next_gl_name: u32,
    /// Framebuffer name -> context current when it was created
    pub live_framebuffers: HashMap<FramebufferHandle, Option<ContextHandle>>,
    pub framebuffers_created: u32,
    pub deleted_framebuffers: Vec<(FramebufferHandle, Option<ContextHandle>)>,
    pub bind_calls: u32,
    pub bound_framebuffer: HashMap<Option<ContextHandle>, FramebufferHandle>,
    pub attach_calls: Vec<MockAttachCall>,
    pub draw_buffers: Vec<Option<u32>>,
    pub read_buffer: Option<Option<u32>>,
    pub live_vertex_arrays: HashMap<VertexArrayHandle, Option<ContextHandle>>,

    // Failure injection
    pub fail_context_creation: bool,
    pub fail_window_surfaces: u32,
    pub fail_pbuffer_surfaces: u32,
    pub fail_swaps: u32,
    pub lose_surface_on_swap: bool,
    pub forced_status: Option<FramebufferStatus>,
}

/// Recording mock of `NativeDisplay` and `NativeGl`
#[derive(Debug, Default)]
pub struct MockNative {
    pub state: Mutex<MockState>,
}

impl MockNative {
    /// Mock offering one exact RGB888/D24 config and every capability
    pub fn new() -> Self {
        let format = crate::config::DesiredSurfaceFormat::default();
        Self::with_configs(vec![ConfigCandidate::matching(ConfigId(1), &format)])
    }

    pub fn with_configs(configs: Vec<ConfigCandidate>) -> Self {
        let state = MockState {
            configs,
            capabilities: DriverCapabilities::all(),
            next_handle: 100,
            next_gl_name: 1,
            ..Default::default()
        };
        Self { state: Mutex::new(state) }
    }

    pub fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn set_capabilities(&self, capabilities: DriverCapabilities) {
        self.lock().capabilities = capabilities;
    }

    pub fn make_current_calls(&self) -> u32 {
        self.lock().make_current_calls
    }

    pub fn framebuffers_created(&self) -> u32 {
        self.lock().framebuffers_created
    }

    pub fn bind_calls(&self) -> u32 {
        self.lock().bind_calls
    }

    pub fn attach_calls(&self) -> Vec<MockAttachCall> {
        self.lock().attach_calls.clone()
    }

    pub fn current_on_this_thread(&self) -> Option<CurrentBinding> {
        self.lock().current.get(&thread::current().id()).copied()
    }

    fn current_context(state: &MockState) -> Option<ContextHandle> {
        state.current.get(&thread::current().id()).map(|b| b.context)
    }
}

impl NativeDisplay for MockNative {
    fn configs(&self) -> Result<Vec<ConfigCandidate>> {
        Ok(self.lock().configs.clone())
    }

    fn create_context(&self, _config: ConfigId, share_with: Option<ContextHandle>) -> Result<ContextHandle> {
        let mut state = self.lock();
        if state.fail_context_creation {
            return Err(Error::BackendError("mock: eglCreateContext failed".to_string()));
        }
        if let Some(parent) = share_with {
            if !state.contexts.contains_key(&parent) {
                return Err(Error::BackendError("mock: share context does not exist".to_string()));
            }
        }
        state.next_handle += 1;
        let handle = ContextHandle(state.next_handle);
        state.contexts.insert(handle, share_with);
        state.contexts_created += 1;
        Ok(handle)
    }

    fn destroy_context(&self, context: ContextHandle) {
        self.lock().contexts.remove(&context);
    }

    fn create_window_surface(&self, _config: ConfigId, window: &NativeWindow) -> Result<SurfaceHandle> {
        let mut state = self.lock();
        if state.fail_window_surfaces > 0 {
            state.fail_window_surfaces -= 1;
            return Err(Error::BackendError("mock: eglCreateWindowSurface failed".to_string()));
        }
        state.next_handle += 1;
        let handle = SurfaceHandle(state.next_handle);
        state.surfaces.insert(handle, MockSurfaceKind::Window(*window));
        state.surfaces_created += 1;
        Ok(handle)
    }

    fn create_pbuffer_surface(&self, _config: ConfigId, width: u32, height: u32) -> Result<SurfaceHandle> {
        let mut state = self.lock();
        if state.fail_pbuffer_surfaces > 0 {
            state.fail_pbuffer_surfaces -= 1;
            return Err(Error::BackendError("mock: eglCreatePbufferSurface failed".to_string()));
        }
        state.next_handle += 1;
        let handle = SurfaceHandle(state.next_handle);
        state.surfaces.insert(handle, MockSurfaceKind::Pbuffer { width, height });
        state.surfaces_created += 1;
        Ok(handle)
    }

    fn destroy_surface(&self, surface: SurfaceHandle) {
        self.lock().surfaces.remove(&surface);
    }

    fn make_current(&self, binding: Option<CurrentBinding>) -> Result<()> {
        let mut state = self.lock();
        state.make_current_calls += 1;
        let thread = thread::current().id();
        match binding {
            Some(binding) => {
                if !state.contexts.contains_key(&binding.context) {
                    return Err(Error::BackendError("mock: EGL_BAD_CONTEXT".to_string()));
                }
                if !state.surfaces.contains_key(&binding.surface) {
                    return Err(Error::BackendError("mock: EGL_BAD_SURFACE".to_string()));
                }
                let taken_elsewhere = state
                    .current
                    .iter()
                    .any(|(other, b)| *other != thread && b.context == binding.context);
                if taken_elsewhere {
                    return Err(Error::BackendError("mock: EGL_BAD_ACCESS".to_string()));
                }
                state.current.insert(thread, binding);
            }
            None => {
                state.current.remove(&thread);
            }
        }
        Ok(())
    }

    fn current(&self) -> Option<CurrentBinding> {
        self.current_on_this_thread()
    }

    fn swap_buffers(&self, surface: SurfaceHandle) -> Result<()> {
        let mut state = self.lock();
        state.swap_calls += 1;
        if state.lose_surface_on_swap {
            state.lose_surface_on_swap = false;
            return Err(Error::SurfaceLost("mock: EGL_BAD_NATIVE_WINDOW".to_string()));
        }
        if state.fail_swaps > 0 {
            state.fail_swaps -= 1;
            return Err(Error::BackendError("mock: EGL_BAD_SURFACE on swap".to_string()));
        }
        match state.surfaces.get(&surface) {
            Some(MockSurfaceKind::Window(_)) => Ok(()),
            _ => Err(Error::BackendError("mock: swap on non-window surface".to_string())),
        }
    }

    fn set_swap_interval(&self, interval: i32) -> Result<()> {
        self.lock().swap_interval = Some(interval);
        Ok(())
    }

    fn reset(&self) -> Result<()> {
        let mut state = self.lock();
        state.reset_calls += 1;
        state.contexts.clear();
        state.surfaces.clear();
        state.current.clear();
        // Objects die with their contexts
        state.live_framebuffers.clear();
        state.bound_framebuffer.clear();
        state.live_vertex_arrays.clear();
        Ok(())
    }
}

impl NativeGl for MockNative {
    fn capabilities(&self) -> DriverCapabilities {
        self.lock().capabilities
    }

    fn create_framebuffer(&self) -> Result<FramebufferHandle> {
        let mut state = self.lock();
        // Lowest free name, so deleted names come back like on a real driver
        let name = (1..)
            .find(|name| !state.live_framebuffers.contains_key(&FramebufferHandle(*name)))
            .unwrap();
        let handle = FramebufferHandle(name);
        let context = Self::current_context(&state);
        state.live_framebuffers.insert(handle, context);
        state.framebuffers_created += 1;
        Ok(handle)
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferHandle) {
        let mut state = self.lock();
        let context = Self::current_context(&state);
        state.live_framebuffers.remove(&framebuffer);
        state.deleted_framebuffers.push((framebuffer, context));
        if state.bound_framebuffer.get(&context) == Some(&framebuffer) {
            state.bound_framebuffer.insert(context, FramebufferHandle::DEFAULT);
        }
    }

    fn bind_framebuffer(&self, framebuffer: FramebufferHandle) {
        let mut state = self.lock();
        state.bind_calls += 1;
        let context = Self::current_context(&state);
        state.bound_framebuffer.insert(context, framebuffer);
    }

    fn framebuffer_texture(&self, attachment: AttachmentPoint, texture: NativeResource, mip_level: u32) {
        self.lock().attach_calls.push(MockAttachCall::Texture { attachment, texture, mip_level });
    }

    fn framebuffer_texture_2d(
        &self,
        attachment: AttachmentPoint,
        target: TextureTarget,
        texture: NativeResource,
        mip_level: u32,
    ) {
        self.lock().attach_calls.push(MockAttachCall::Texture2D { attachment, target, texture, mip_level });
    }

    fn framebuffer_texture_2d_multisample(
        &self,
        attachment: AttachmentPoint,
        texture: NativeResource,
        mip_level: u32,
        samples: u32,
    ) {
        self.lock().attach_calls.push(MockAttachCall::Texture2DMultisample { attachment, texture, mip_level, samples });
    }

    fn framebuffer_texture_layer(
        &self,
        attachment: AttachmentPoint,
        texture: NativeResource,
        mip_level: u32,
        layer: u32,
    ) {
        self.lock().attach_calls.push(MockAttachCall::TextureLayer { attachment, texture, mip_level, layer });
    }

    fn framebuffer_renderbuffer(&self, attachment: AttachmentPoint, renderbuffer: NativeResource) {
        self.lock().attach_calls.push(MockAttachCall::Renderbuffer { attachment, renderbuffer });
    }

    fn set_draw_buffers(&self, color_indices: &[Option<u32>]) {
        self.lock().draw_buffers = color_indices.to_vec();
    }

    fn set_read_buffer(&self, color_index: Option<u32>) {
        self.lock().read_buffer = Some(color_index);
    }

    fn check_framebuffer_status(&self) -> FramebufferStatus {
        self.lock().forced_status.unwrap_or(FramebufferStatus::Complete)
    }

    fn create_vertex_array(&self) -> Result<VertexArrayHandle> {
        let mut state = self.lock();
        let handle = VertexArrayHandle(state.next_gl_name);
        state.next_gl_name += 1;
        let context = Self::current_context(&state);
        state.live_vertex_arrays.insert(handle, context);
        Ok(handle)
    }

    fn bind_vertex_array(&self, _vertex_array: Option<VertexArrayHandle>) {}

    fn delete_vertex_array(&self, vertex_array: VertexArrayHandle) {
        self.lock().live_vertex_arrays.remove(&vertex_array);
    }
}

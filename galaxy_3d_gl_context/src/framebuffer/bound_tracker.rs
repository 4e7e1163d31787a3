/// Last framebuffer bound in one context, to skip redundant binds

use crate::native::{NativeGl, FramebufferHandle};

/// Per-context bound framebuffer cache
///
/// `None` means unknown: the next bind always reaches the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundFramebufferTracker {
    bound: Option<FramebufferHandle>,
}

impl BoundFramebufferTracker {
    pub fn new() -> Self {
        Self { bound: None }
    }

    pub fn bound(&self) -> Option<FramebufferHandle> {
        self.bound
    }

    /// Bind `framebuffer` unless it is already bound; returns whether a native call was made
    pub fn bind(&mut self, gl: &dyn NativeGl, framebuffer: FramebufferHandle) -> bool {
        if self.bound == Some(framebuffer) {
            return false;
        }
        gl.bind_framebuffer(framebuffer);
        self.bound = Some(framebuffer);
        true
    }

    /// Forget the bound value (context switch, external GL state change)
    pub fn invalidate(&mut self) {
        self.bound = None;
    }

    /// Invalidate if `framebuffer` is the tracked one; returns whether it was
    pub fn reset_if(&mut self, framebuffer: FramebufferHandle) -> bool {
        if self.bound == Some(framebuffer) {
            self.bound = None;
            true
        } else {
            false
        }
    }
}

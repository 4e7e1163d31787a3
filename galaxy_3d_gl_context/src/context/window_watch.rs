/// Native window readiness
///
/// The platform layer publishes the native window here when it appears
/// (app start / resume) and clears it when the OS takes it away. Surface
/// creation waits on the watch instead of polling, and can be cancelled.

use tokio::sync::watch;
use crate::error::{Error, Result};
use crate::native::NativeWindow;

const SOURCE: &str = "galaxy3d::gl::WindowWatch";

/// Window availability as seen by surface creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// No window yet (startup, app in background)
    Pending,
    /// A window surface can be created for this window
    Ready(NativeWindow),
    /// Waiters give up; stays until the next `set_window`
    Cancelled,
}

/// Publish/subscribe cell for the native window
pub struct WindowWatch {
    sender: watch::Sender<WindowState>,
}

impl WindowWatch {
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(WindowState::Pending);
        Self { sender }
    }

    /// Publish the platform window (`None` when the OS invalidated it)
    pub fn set_window(&self, window: Option<NativeWindow>) {
        let state = match window {
            Some(window) => WindowState::Ready(window),
            None => WindowState::Pending,
        };
        crate::engine_debug!(SOURCE, "Window state -> {:?}", state);
        self.sender.send_replace(state);
    }

    /// Wake every waiter with `Error::Cancelled`
    pub fn cancel(&self) {
        crate::engine_info!(SOURCE, "Window wait cancelled");
        self.sender.send_replace(WindowState::Cancelled);
    }

    pub fn state(&self) -> WindowState {
        *self.sender.borrow()
    }

    /// The published window, if any
    pub fn current_window(&self) -> Option<NativeWindow> {
        match self.state() {
            WindowState::Ready(window) => Some(window),
            _ => None,
        }
    }

    /// Resolve once a window is published
    ///
    /// # Errors
    ///
    /// `Error::Cancelled` if `cancel()` was called before a window appeared.
    pub async fn wait_ready(&self) -> Result<NativeWindow> {
        let mut receiver = self.sender.subscribe();
        let state = *receiver
            .wait_for(|state| !matches!(state, WindowState::Pending))
            .await
            .map_err(|_| Error::Cancelled)?;

        match state {
            WindowState::Ready(window) => Ok(window),
            _ => Err(Error::Cancelled),
        }
    }

    /// Blocking form of `wait_ready` for the synchronous surface path
    pub fn wait_ready_blocking(&self) -> Result<NativeWindow> {
        if let Some(window) = self.current_window() {
            return Ok(window);
        }
        crate::engine_info!(SOURCE, "Waiting for native window...");
        pollster::block_on(self.wait_ready())
    }
}

impl Default for WindowWatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "window_watch_tests.rs"]
mod tests;

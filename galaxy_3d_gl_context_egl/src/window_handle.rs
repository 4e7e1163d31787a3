/// Conversion of platform window handles into native windows

use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use galaxy_3d_gl_context::galaxy3d::{Error, Result};
use galaxy_3d_gl_context::galaxy3d::native::NativeWindow;

/// Native window for an EGL window surface
///
/// Supports the handle kinds whose window can be passed straight to
/// eglCreateWindowSurface (Android, X11, Win32).
pub fn native_window_from(handle: RawWindowHandle, width: u32, height: u32) -> Result<NativeWindow> {
    let raw = match handle {
        RawWindowHandle::AndroidNdk(handle) => handle.a_native_window.as_ptr() as usize,
        RawWindowHandle::Xlib(handle) => handle.window as usize,
        RawWindowHandle::Xcb(handle) => handle.window.get() as usize,
        RawWindowHandle::Win32(handle) => handle.hwnd.get() as usize,
        other => {
            return Err(Error::InvalidResource(format!(
                "window handle {:?} has no EGL native window", other
            )));
        }
    };
    Ok(NativeWindow { raw, width, height })
}

/// Native window of anything exposing a window handle (winit, SDL, ...)
pub fn native_window_of(window: &impl HasWindowHandle, width: u32, height: u32) -> Result<NativeWindow> {
    let handle = window
        .window_handle()
        .map_err(|e| Error::InvalidResource(format!("window handle unavailable: {}", e)))?;
    native_window_from(handle.as_raw(), width, height)
}

#[cfg(test)]
#[path = "window_handle_tests.rs"]
mod tests;

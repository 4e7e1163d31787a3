//! Error types for the Galaxy3D GL context layer
//!
//! This module defines the error types used throughout the context and
//! framebuffer cache, including configuration negotiation, context and
//! surface creation, framebuffer completeness and presentation.

use std::fmt;

/// Result type for Galaxy3D GL context operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D GL context errors
#[derive(Debug, Clone)]
pub enum Error {
    /// No acceptable pixel format / config exists for the requested format
    ConfigurationError(String),

    /// A native context or surface creation call failed
    ContextCreationFailed(String),

    /// The window surface became invalid after initialization
    SurfaceLost(String),

    /// Attachments do not form a complete framebuffer
    FramebufferIncomplete(String),

    /// Presenting failed too many times in a row
    PresentFailed {
        /// Number of consecutive failed presents
        consecutive_failures: u32,
        /// Last native error message
        message: String,
    },

    /// Backend-specific error (EGL, GL, etc.)
    BackendError(String),

    /// Invalid resource (binding, handle, context slot, etc.)
    InvalidResource(String),

    /// Initialization failed (device, contexts, subsystems)
    InitializationFailed(String),

    /// Waiting for a native window was cancelled
    Cancelled,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            Error::ContextCreationFailed(msg) => write!(f, "Context creation failed: {}", msg),
            Error::SurfaceLost(msg) => write!(f, "Surface lost: {}", msg),
            Error::FramebufferIncomplete(msg) => write!(f, "Framebuffer incomplete: {}", msg),
            Error::PresentFailed { consecutive_failures, message } => write!(
                f,
                "Present failed {} times in a row: {}",
                consecutive_failures, message
            ),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::Cancelled => write!(f, "Wait for native window cancelled"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Whether the error must stop graphics initialization / the current frame
    ///
    /// Only surface loss is recovered locally (by recreating surfaces).
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::SurfaceLost(_))
    }
}

// ===== ERROR MACROS =====

/// Log an ERROR (with file:line) and build an `Error::BackendError`
///
/// # Example
///
/// ```no_run
/// # use galaxy_3d_gl_context::engine_err;
/// let err = engine_err!("galaxy3d::gl", "eglMakeCurrent failed: {}", 0x3002);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::galaxy3d::Error::BackendError(message)
    }};
}

/// Log an ERROR (with file:line) and return `Err(Error::BackendError)`
///
/// # Example
///
/// ```no_run
/// # use galaxy_3d_gl_context::engine_bail;
/// # fn check(count: usize) -> galaxy_3d_gl_context::galaxy3d::Result<()> {
/// if count > 8 {
///     engine_bail!("galaxy3d::gl", "Too many color targets: {}", count);
/// }
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

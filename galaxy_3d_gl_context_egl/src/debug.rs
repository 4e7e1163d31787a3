/// Driver information dumps for `gl-debug` builds

use glow::HasContext;
use khronos_egl as egl;
use galaxy_3d_gl_context::engine_debug;

const SOURCE: &str = "galaxy3d::egl::Debug";

/// Log the EGL vendor, version and extension list
pub(crate) fn log_egl_info(instance: &egl::DynamicInstance<egl::EGL1_4>, display: egl::Display) {
    for (name, label) in [(egl::VENDOR, "vendor"), (egl::VERSION, "version"), (egl::EXTENSIONS, "extensions")] {
        match instance.query_string(Some(display), name) {
            Ok(value) => engine_debug!(SOURCE, "EGL {}: {}", label, value.to_string_lossy()),
            Err(e) => engine_debug!(SOURCE, "EGL {} unavailable: {}", label, e),
        }
    }
}

/// Log the GL renderer strings and extensions of the current context
pub(crate) fn log_gl_driver_info(gl: &glow::Context) {
    let (vendor, renderer, version) = unsafe {
        (
            gl.get_parameter_string(glow::VENDOR),
            gl.get_parameter_string(glow::RENDERER),
            gl.get_parameter_string(glow::VERSION),
        )
    };
    engine_debug!(SOURCE, "GL vendor: {}, renderer: {}, version: {}", vendor, renderer, version);

    let mut extensions: Vec<&str> = gl.supported_extensions().iter().map(String::as_str).collect();
    extensions.sort_unstable();
    engine_debug!(SOURCE, "{} GL extensions: {}", extensions.len(), extensions.join(" "));
}

/// EGL attribute lists and config translation

use khronos_egl as egl;
use galaxy_3d_gl_context::galaxy3d::Error;
use galaxy_3d_gl_context::galaxy3d::config::ConfigCandidate;
use galaxy_3d_gl_context::galaxy3d::native::ConfigId;

/// EGL_CONTEXT_CLIENT_VERSION
pub(crate) const CONTEXT_CLIENT_VERSION: egl::Int = 0x3098;
/// EGL_CONTEXT_FLAGS_KHR (EGL_KHR_create_context)
pub(crate) const CONTEXT_FLAGS_KHR: egl::Int = 0x30FC;
/// EGL_CONTEXT_OPENGL_DEBUG_BIT_KHR
pub(crate) const CONTEXT_OPENGL_DEBUG_BIT_KHR: egl::Int = 0x0001;
/// EGL_OPENGL_ES3_BIT
pub(crate) const OPENGL_ES3_BIT: egl::Int = 0x0040;
/// EGL_DEPTH_ENCODING_NV (EGL_NV_depth_nonlinear)
pub(crate) const DEPTH_ENCODING_NV: egl::Int = 0x30E2;
/// EGL_DEPTH_ENCODING_NONLINEAR_NV
pub(crate) const DEPTH_ENCODING_NONLINEAR_NV: egl::Int = 0x30E3;

/// OpenGL ES major version requested for every context
pub(crate) const CLIENT_VERSION: egl::Int = 3;

/// Translate one driver config into a candidate
///
/// `query` returns the value of an attribute, `None` when the driver does
/// not know it. Configs that cannot back both an ES 3 window surface and a
/// pbuffer are skipped, since every slot needs one or the other.
pub(crate) fn candidate_from_attribs(
    id: ConfigId,
    query: impl Fn(egl::Int) -> Option<egl::Int>,
) -> Option<ConfigCandidate> {
    let renderable = query(egl::RENDERABLE_TYPE)?;
    if renderable & OPENGL_ES3_BIT == 0 {
        return None;
    }
    let surface_type = query(egl::SURFACE_TYPE)?;
    let required = egl::WINDOW_BIT | egl::PBUFFER_BIT;
    if surface_type & required != required {
        return None;
    }

    let bits = |attribute| query(attribute).map(|value| value.max(0) as u32);
    Some(ConfigCandidate {
        id,
        red_bits: bits(egl::RED_SIZE)?,
        green_bits: bits(egl::GREEN_SIZE)?,
        blue_bits: bits(egl::BLUE_SIZE)?,
        alpha_bits: bits(egl::ALPHA_SIZE)?,
        depth_bits: bits(egl::DEPTH_SIZE)?,
        stencil_bits: bits(egl::STENCIL_SIZE)?,
        sample_buffers: bits(egl::SAMPLE_BUFFERS).unwrap_or(0),
        samples: bits(egl::SAMPLES).unwrap_or(0),
        non_linear_depth: query(DEPTH_ENCODING_NV) == Some(DEPTH_ENCODING_NONLINEAR_NV),
        native_visual_id: query(egl::NATIVE_VISUAL_ID).unwrap_or(0),
    })
}

pub(crate) fn context_attribs(debug: bool) -> Vec<egl::Int> {
    let mut attribs = vec![CONTEXT_CLIENT_VERSION, CLIENT_VERSION];
    if debug {
        attribs.extend([CONTEXT_FLAGS_KHR, CONTEXT_OPENGL_DEBUG_BIT_KHR]);
    }
    attribs.push(egl::NONE);
    attribs
}

pub(crate) fn pbuffer_attribs(width: u32, height: u32) -> [egl::Int; 5] {
    [egl::WIDTH, width as egl::Int, egl::HEIGHT, height as egl::Int, egl::NONE]
}

/// Map an EGL error from `call`
///
/// Errors meaning the window surface is gone become `SurfaceLost`, which
/// the context layer answers by recreating surfaces.
pub(crate) fn map_egl_error(call: &str, error: egl::Error) -> Error {
    match error {
        egl::Error::BadNativeWindow | egl::Error::BadSurface | egl::Error::BadCurrentSurface => {
            Error::SurfaceLost(format!("{} failed: {}", call, error))
        }
        _ => Error::BackendError(format!("{} failed: {}", call, error)),
    }
}

#[cfg(test)]
#[path = "egl_config_tests.rs"]
mod tests;

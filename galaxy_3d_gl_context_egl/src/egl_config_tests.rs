//! Unit tests for EGL config translation and attribute lists
//!
//! The attribute query is a closure, so no EGL display is needed.

use super::*;

/// ES 3 window+pbuffer config: R8G8B8A8 D24S8, no MSAA
fn rgba8_d24s8(attribute: egl::Int) -> Option<egl::Int> {
    match attribute {
        egl::RENDERABLE_TYPE => Some(OPENGL_ES3_BIT | 0x0004),
        egl::SURFACE_TYPE => Some(egl::WINDOW_BIT | egl::PBUFFER_BIT),
        egl::RED_SIZE | egl::GREEN_SIZE | egl::BLUE_SIZE | egl::ALPHA_SIZE => Some(8),
        egl::DEPTH_SIZE => Some(24),
        egl::STENCIL_SIZE => Some(8),
        egl::SAMPLE_BUFFERS | egl::SAMPLES => Some(0),
        egl::NATIVE_VISUAL_ID => Some(1),
        _ => None,
    }
}

// ============================================================================
// CONFIG TRANSLATION TESTS
// ============================================================================

#[test]
fn test_candidate_reads_bit_depths() {
    let candidate = candidate_from_attribs(ConfigId(7), rgba8_d24s8).unwrap();

    assert_eq!(candidate.id, ConfigId(7));
    assert_eq!(candidate.red_bits, 8);
    assert_eq!(candidate.alpha_bits, 8);
    assert_eq!(candidate.depth_bits, 24);
    assert_eq!(candidate.stencil_bits, 8);
    assert_eq!(candidate.samples, 0);
    assert_eq!(candidate.native_visual_id, 1);
    // No EGL_NV_depth_nonlinear on this driver
    assert!(!candidate.non_linear_depth);
}

#[test]
fn test_candidate_reads_nonlinear_depth() {
    let candidate = candidate_from_attribs(ConfigId(1), |attribute| match attribute {
        DEPTH_ENCODING_NV => Some(DEPTH_ENCODING_NONLINEAR_NV),
        other => rgba8_d24s8(other),
    })
    .unwrap();

    assert!(candidate.non_linear_depth);
}

#[test]
fn test_candidate_reads_msaa() {
    let candidate = candidate_from_attribs(ConfigId(1), |attribute| match attribute {
        egl::SAMPLE_BUFFERS => Some(1),
        egl::SAMPLES => Some(4),
        other => rgba8_d24s8(other),
    })
    .unwrap();

    assert_eq!(candidate.sample_buffers, 1);
    assert_eq!(candidate.samples, 4);
}

#[test]
fn test_es2_only_config_is_skipped() {
    let candidate = candidate_from_attribs(ConfigId(1), |attribute| match attribute {
        egl::RENDERABLE_TYPE => Some(0x0004),
        other => rgba8_d24s8(other),
    });
    assert!(candidate.is_none());
}

#[test]
fn test_window_only_config_is_skipped() {
    let candidate = candidate_from_attribs(ConfigId(1), |attribute| match attribute {
        egl::SURFACE_TYPE => Some(egl::WINDOW_BIT),
        other => rgba8_d24s8(other),
    });
    assert!(candidate.is_none());
}

#[test]
fn test_missing_color_size_is_skipped() {
    let candidate = candidate_from_attribs(ConfigId(1), |attribute| match attribute {
        egl::GREEN_SIZE => None,
        other => rgba8_d24s8(other),
    });
    assert!(candidate.is_none());
}

// ============================================================================
// ATTRIBUTE LIST TESTS
// ============================================================================

#[test]
fn test_context_attribs_request_es3() {
    assert_eq!(context_attribs(false), vec![CONTEXT_CLIENT_VERSION, 3, egl::NONE]);
}

#[test]
fn test_debug_context_attribs() {
    let attribs = context_attribs(true);
    assert_eq!(attribs.len(), 5);
    assert_eq!(&attribs[2..4], &[CONTEXT_FLAGS_KHR, CONTEXT_OPENGL_DEBUG_BIT_KHR]);
    assert_eq!(attribs.last(), Some(&egl::NONE));
}

#[test]
fn test_pbuffer_attribs() {
    assert_eq!(pbuffer_attribs(1, 1), [egl::WIDTH, 1, egl::HEIGHT, 1, egl::NONE]);
}

// ============================================================================
// ERROR MAPPING TESTS
// ============================================================================

#[test]
fn test_window_errors_become_surface_lost() {
    for error in [egl::Error::BadNativeWindow, egl::Error::BadSurface, egl::Error::BadCurrentSurface] {
        match map_egl_error("eglSwapBuffers", error) {
            Error::SurfaceLost(msg) => assert!(msg.starts_with("eglSwapBuffers failed")),
            other => panic!("Expected SurfaceLost, got {:?}", other),
        }
    }
}

#[test]
fn test_other_errors_are_backend_errors() {
    let err = map_egl_error("eglMakeCurrent", egl::Error::BadMatch);
    assert!(matches!(err, Error::BackendError(_)));
    assert!(err.is_fatal());

    let err = map_egl_error("eglSwapBuffers", egl::Error::ContextLost);
    assert!(matches!(err, Error::BackendError(_)));
}

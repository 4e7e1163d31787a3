/// Tests for ContextSlotManager
///
/// Driven by the recording mock: context sharing, surface layout,
/// scoped activation call counts, surface loss and present failures.

use super::*;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use crate::native::mock_native::{MockNative, MockSurfaceKind};

// ============================================================================
// Helpers
// ============================================================================

fn window(raw: usize) -> NativeWindow {
    NativeWindow { raw, width: 800, height: 600 }
}

fn manager_with(mock: &Arc<MockNative>, config: DeviceConfig) -> ContextSlotManager {
    ContextSlotManager::new(
        Arc::clone(mock) as Arc<dyn NativeDisplay>,
        Arc::clone(mock) as Arc<dyn NativeGl>,
        config,
    )
}

/// Manager with contexts created and a window published
fn ready_manager(config: DeviceConfig) -> (Arc<MockNative>, ContextSlotManager) {
    let mock = Arc::new(MockNative::new());
    let manager = manager_with(&mock, config);
    manager.window().set_window(Some(window(1)));
    manager.create_contexts().unwrap();
    (mock, manager)
}

fn default_ready() -> (Arc<MockNative>, ContextSlotManager) {
    ready_manager(DeviceConfig::default())
}

/// `reinitialize_surface(None)` on another thread, failing instead of hanging
fn reinitialize_without_window(manager: &Arc<ContextSlotManager>) -> Result<SurfaceRecovery> {
    let (sender, receiver) = mpsc::channel();
    let manager = Arc::clone(manager);
    thread::spawn(move || {
        let _ = sender.send(manager.reinitialize_surface(None));
    });
    receiver
        .recv_timeout(Duration::from_secs(2))
        .expect("reinitialize_surface(None) blocked waiting for a window")
}

fn assert_pbuffers_only(mock: &MockNative, manager: &ContextSlotManager) {
    for kind in ContextKind::ALL {
        let slot = manager.slot(kind);
        assert!(slot.primary_surface.is_none());
        assert_eq!(slot.active_surface(), slot.auxiliary_surface);
    }
    let state = mock.lock();
    assert_eq!(state.surfaces.len(), 3);
    assert!(state.surfaces.values().all(|s| matches!(s, MockSurfaceKind::Pbuffer { .. })));
}

// ============================================================================
// Tests: Creation
// ============================================================================

#[test]
fn test_create_contexts_sharing_layout() {
    let (mock, manager) = default_ready();

    let shared = manager.slot(ContextKind::Shared).context.unwrap();
    let rendering = manager.slot(ContextKind::Rendering).context.unwrap();
    let single = manager.slot(ContextKind::SingleThreaded).context.unwrap();

    let state = mock.lock();
    assert_eq!(state.contexts_created, 3);
    assert_eq!(state.contexts[&shared], None);
    assert_eq!(state.contexts[&rendering], Some(shared));
    assert_eq!(state.contexts[&single], None);
}

#[test]
fn test_create_contexts_surface_layout() {
    let (mock, manager) = default_ready();
    assert_eq!(manager.presenting_kind(), ContextKind::Rendering);

    for kind in ContextKind::ALL {
        let slot = manager.slot(kind);
        let auxiliary = slot.auxiliary_surface.unwrap();
        assert_eq!(
            mock.lock().surfaces[&auxiliary],
            MockSurfaceKind::Pbuffer { width: 1, height: 1 }
        );
        assert_eq!(slot.primary_surface.is_some(), kind == ContextKind::Rendering);
    }

    let primary = manager.slot(ContextKind::Rendering).primary_surface.unwrap();
    assert_eq!(mock.lock().surfaces[&primary], MockSurfaceKind::Window(window(1)));
    assert_eq!(manager.slot(ContextKind::Rendering).active_surface(), Some(primary));
}

#[test]
fn test_single_threaded_presents_when_multithreading_disabled() {
    let (_mock, manager) = ready_manager(DeviceConfig::default().with_multithreaded_rendering(false));
    assert_eq!(manager.presenting_kind(), ContextKind::SingleThreaded);
    assert!(manager.slot(ContextKind::SingleThreaded).primary_surface.is_some());
    assert!(manager.slot(ContextKind::Rendering).primary_surface.is_none());
}

#[test]
fn test_create_contexts_builds_vertex_array_per_context() {
    let (mock, manager) = default_ready();

    let state = mock.lock();
    assert_eq!(state.live_vertex_arrays.len(), 3);
    for kind in ContextKind::ALL {
        let slot = manager.slot(kind);
        let vertex_array = slot.vertex_array.unwrap();
        assert_eq!(state.live_vertex_arrays[&vertex_array], slot.context);
    }
}

#[test]
fn test_create_contexts_applies_swap_interval_and_leaves_thread_detached() {
    let (mock, manager) = ready_manager(DeviceConfig::default().with_swap_interval(0));
    assert_eq!(mock.lock().swap_interval, Some(0));
    assert_eq!(mock.current_on_this_thread(), None);
    assert_eq!(manager.current_kind(), None);
    assert_eq!(manager.generation(), 1);
}

#[test]
fn test_create_contexts_twice_fails() {
    let (_mock, manager) = default_ready();
    let result = manager.create_contexts();
    assert!(matches!(result, Err(Error::InitializationFailed(_))));
}

#[test]
fn test_create_contexts_without_configs_is_configuration_error() {
    let mock = Arc::new(MockNative::with_configs(Vec::new()));
    let manager = manager_with(&mock, DeviceConfig::default().with_wait_for_window(false));

    let result = manager.create_contexts();
    assert!(matches!(result, Err(Error::ConfigurationError(_))));
    assert_eq!(mock.lock().contexts_created, 0);
}

#[test]
fn test_context_creation_failure_is_fatal() {
    let mock = Arc::new(MockNative::new());
    mock.lock().fail_context_creation = true;
    let manager = manager_with(&mock, DeviceConfig::default().with_wait_for_window(false));

    let result = manager.create_contexts();
    assert!(matches!(result, Err(Error::ContextCreationFailed(_))));
    assert!(!manager.is_initialized());
    assert!(mock.lock().contexts.is_empty());
}

#[test]
fn test_no_window_without_wait_uses_pbuffers_only() {
    let mock = Arc::new(MockNative::new());
    let manager = manager_with(&mock, DeviceConfig::default().with_wait_for_window(false));
    manager.create_contexts().unwrap();

    for kind in ContextKind::ALL {
        assert!(manager.slot(kind).primary_surface.is_none());
        assert!(manager.slot(kind).binding().is_some());
    }
    assert_eq!(mock.lock().surfaces_created, 3);
}

#[test]
fn test_window_wait_blocks_until_published() {
    let mock = Arc::new(MockNative::new());
    let manager = manager_with(&mock, DeviceConfig::default());

    thread::scope(|scope| {
        scope.spawn(|| {
            thread::sleep(Duration::from_millis(20));
            manager.window().set_window(Some(window(5)));
        });
        manager.create_contexts().unwrap();
    });

    let primary = manager.slot(ContextKind::Rendering).primary_surface.unwrap();
    assert_eq!(mock.lock().surfaces[&primary], MockSurfaceKind::Window(window(5)));
}

#[test]
fn test_cancelled_window_wait_releases_everything() {
    let mock = Arc::new(MockNative::new());
    let manager = manager_with(&mock, DeviceConfig::default());

    let result = thread::scope(|scope| {
        scope.spawn(|| {
            thread::sleep(Duration::from_millis(20));
            manager.window().cancel();
        });
        manager.create_contexts()
    });

    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(!manager.is_initialized());
    let state = mock.lock();
    assert!(state.contexts.is_empty());
    assert!(state.surfaces.is_empty());
}

// ============================================================================
// Tests: Surface failure resets the display
// ============================================================================

#[test]
fn test_window_surface_failure_resets_display() {
    let mock = Arc::new(MockNative::new());
    mock.lock().fail_window_surfaces = 1;
    let manager = manager_with(&mock, DeviceConfig::default());
    manager.window().set_window(Some(window(1)));

    let result = manager.create_contexts();
    assert!(matches!(result, Err(Error::ContextCreationFailed(_))));
    assert!(!manager.is_initialized());
    assert_eq!(manager.slot(ContextKind::Shared), ContextSlot::EMPTY);
    assert_eq!(mock.lock().reset_calls, 1);

    // The reset path is re-entered on the next attempt
    let recovery = manager.reinitialize_surface(Some(window(2))).unwrap();
    assert_eq!(recovery, SurfaceRecovery::ContextsRecreated);
    assert!(manager.is_initialized());
    assert_eq!(manager.generation(), 1);
    assert_eq!(mock.lock().contexts.len(), 3);
}

#[test]
fn test_pbuffer_failure_during_reinitialize_resets_display() {
    let (mock, manager) = default_ready();
    mock.lock().fail_pbuffer_surfaces = 1;

    let result = manager.reinitialize_surface(Some(window(2)));
    assert!(matches!(result, Err(Error::ContextCreationFailed(_))));
    assert!(!manager.is_initialized());

    let recovery = manager.reinitialize_surface(Some(window(2))).unwrap();
    assert_eq!(recovery, SurfaceRecovery::ContextsRecreated);
    assert_eq!(manager.generation(), 2);
}

// ============================================================================
// Tests: Scoped activation
// ============================================================================

#[test]
fn test_with_context_switch_costs_one_call_each_way() {
    let (mock, manager) = default_ready();
    let before = mock.make_current_calls();

    let inside = manager.with_context(ContextKind::Rendering, || manager.current_kind()).unwrap();

    assert_eq!(inside, Some(ContextKind::Rendering));
    assert_eq!(mock.make_current_calls() - before, 2);
    assert_eq!(mock.current_on_this_thread(), None);
}

#[test]
fn test_with_context_already_current_makes_no_native_call() {
    let (mock, manager) = default_ready();
    manager.make_current(ContextKind::Rendering).unwrap();
    let before = mock.make_current_calls();

    let value = manager.with_context(ContextKind::Rendering, || 17).unwrap();

    assert_eq!(value, 17);
    assert_eq!(mock.make_current_calls(), before);
    assert!(manager.is_current(ContextKind::Rendering));
}

#[test]
fn test_with_context_restores_previous_binding() {
    let (mock, manager) = default_ready();
    manager.make_current(ContextKind::Rendering).unwrap();
    let rendering = mock.current_on_this_thread();

    manager
        .with_context(ContextKind::Shared, || {
            assert_eq!(manager.current_kind(), Some(ContextKind::Shared));
        })
        .unwrap();

    assert_eq!(mock.current_on_this_thread(), rendering);
}

#[test]
fn test_with_context_restores_on_panic() {
    let (mock, manager) = default_ready();
    manager.make_current(ContextKind::Shared).unwrap();
    let shared = mock.current_on_this_thread();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = manager.with_context(ContextKind::Rendering, || -> u32 { panic!("draw failed") });
    }));

    assert!(outcome.is_err());
    assert_eq!(mock.current_on_this_thread(), shared);
}

#[test]
fn test_with_context_before_creation_is_invalid() {
    let mock = Arc::new(MockNative::new());
    let manager = manager_with(&mock, DeviceConfig::default());
    let result = manager.with_context(ContextKind::Shared, || ());
    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert_eq!(mock.make_current_calls(), 0);
}

#[test]
fn test_context_cannot_be_current_on_two_threads() {
    let (_mock, manager) = default_ready();
    manager.make_current(ContextKind::Rendering).unwrap();

    thread::scope(|scope| {
        let other = scope.spawn(|| manager.with_context(ContextKind::Rendering, || ()));
        assert!(other.join().unwrap().is_err());

        // A different context is fine on the other thread
        let shared = scope.spawn(|| manager.with_context(ContextKind::Shared, || manager.current_kind()));
        assert_eq!(shared.join().unwrap().unwrap(), Some(ContextKind::Shared));
    });
}

#[test]
fn test_detach() {
    let (mock, manager) = default_ready();
    manager.make_current(ContextKind::Shared).unwrap();
    manager.detach().unwrap();
    assert_eq!(mock.current_on_this_thread(), None);

    let before = mock.make_current_calls();
    manager.detach().unwrap();
    assert_eq!(mock.make_current_calls(), before);
}

// ============================================================================
// Tests: Surface reinitialization
// ============================================================================

#[test]
fn test_reinitialize_surface_keeps_contexts() {
    let (mock, manager) = default_ready();
    let contexts_before: Vec<_> = ContextKind::ALL.iter().map(|k| manager.slot(*k).context).collect();
    let old_primary = manager.slot(ContextKind::Rendering).primary_surface.unwrap();

    let recovery = manager.reinitialize_surface(Some(window(2))).unwrap();

    assert_eq!(recovery, SurfaceRecovery::SurfacesRecreated);
    let contexts_after: Vec<_> = ContextKind::ALL.iter().map(|k| manager.slot(*k).context).collect();
    assert_eq!(contexts_before, contexts_after);
    assert_eq!(mock.lock().contexts_created, 3);

    let new_primary = manager.slot(ContextKind::Rendering).primary_surface.unwrap();
    assert_ne!(new_primary, old_primary);
    let state = mock.lock();
    assert!(!state.surfaces.contains_key(&old_primary));
    assert_eq!(state.surfaces.len(), 4);
    assert_eq!(state.surfaces[&new_primary], MockSurfaceKind::Window(window(2)));
}

#[test]
fn test_reinitialize_surface_reattaches_calling_thread() {
    let (mock, manager) = default_ready();
    manager.make_current(ContextKind::Rendering).unwrap();

    manager.reinitialize_surface(Some(window(3))).unwrap();

    assert!(manager.is_current(ContextKind::Rendering));
    let current = mock.current_on_this_thread().unwrap();
    assert_eq!(Some(current.surface), manager.slot(ContextKind::Rendering).primary_surface);
}

#[test]
fn test_reinitialize_surface_without_window_falls_back_to_pbuffer() {
    let (_mock, manager) = default_ready();
    manager.reinitialize_surface(None).unwrap();

    let slot = manager.slot(ContextKind::Rendering);
    assert!(slot.primary_surface.is_none());
    assert_eq!(slot.active_surface(), slot.auxiliary_surface);
    assert_eq!(manager.window().current_window(), None);
}

#[test]
fn test_reinitialize_surface_without_window_creates_contexts_on_pbuffers() {
    let mock = Arc::new(MockNative::new());
    let manager = Arc::new(manager_with(&mock, DeviceConfig::default()));

    let recovery = reinitialize_without_window(&manager).unwrap();

    assert_eq!(recovery, SurfaceRecovery::ContextsRecreated);
    assert!(manager.is_initialized());
    assert_eq!(mock.lock().contexts.len(), 3);
    assert_pbuffers_only(&mock, &manager);
}

#[test]
fn test_reinitialize_surface_without_window_after_display_reset() {
    let (mock, manager) = default_ready();
    let manager = Arc::new(manager);
    mock.lock().fail_window_surfaces = 1;

    let result = manager.reinitialize_surface(Some(window(2)));
    assert!(matches!(result, Err(Error::ContextCreationFailed(_))));
    assert_eq!(mock.lock().reset_calls, 1);

    let recovery = reinitialize_without_window(&manager).unwrap();

    assert_eq!(recovery, SurfaceRecovery::ContextsRecreated);
    assert_eq!(manager.generation(), 2);
    assert_pbuffers_only(&mock, &manager);
}

// ============================================================================
// Tests: Present
// ============================================================================

#[test]
fn test_present_swaps_window_surface() {
    let (mock, manager) = default_ready();
    assert_eq!(manager.present().unwrap(), PresentOutcome::Presented);
    assert_eq!(mock.lock().swap_calls, 1);
    assert_eq!(mock.current_on_this_thread(), None);
}

#[test]
fn test_present_without_window_skips() {
    let (mock, manager) = default_ready();
    manager.reinitialize_surface(None).unwrap();

    assert_eq!(manager.present().unwrap(), PresentOutcome::Skipped);
    assert_eq!(mock.lock().swap_calls, 0);
}

#[test]
fn test_present_recovers_when_window_returns() {
    let (mock, manager) = default_ready();
    manager.reinitialize_surface(None).unwrap();
    manager.window().set_window(Some(window(8)));

    assert_eq!(manager.present().unwrap(), PresentOutcome::Presented);
    let primary = manager.slot(ContextKind::Rendering).primary_surface.unwrap();
    assert_eq!(mock.lock().surfaces[&primary], MockSurfaceKind::Window(window(8)));
}

#[test]
fn test_present_surface_loss_recreates_surfaces() {
    let (mock, manager) = ready_manager(DeviceConfig::default().with_present_failure_threshold(Some(1)));
    let old_primary = manager.slot(ContextKind::Rendering).primary_surface.unwrap();
    mock.lock().lose_surface_on_swap = true;

    assert_eq!(manager.present().unwrap(), PresentOutcome::Dropped);
    assert_eq!(manager.consecutive_present_failures(), 0);
    let new_primary = manager.slot(ContextKind::Rendering).primary_surface.unwrap();
    assert_ne!(new_primary, old_primary);

    assert_eq!(manager.present().unwrap(), PresentOutcome::Presented);
}

#[test]
fn test_present_failures_escalate_at_threshold() {
    let (mock, manager) = ready_manager(DeviceConfig::default().with_present_failure_threshold(Some(3)));
    mock.lock().fail_swaps = 5;

    assert_eq!(manager.present().unwrap(), PresentOutcome::Dropped);
    assert_eq!(manager.present().unwrap(), PresentOutcome::Dropped);
    match manager.present() {
        Err(Error::PresentFailed { consecutive_failures, .. }) => assert_eq!(consecutive_failures, 3),
        other => panic!("Expected PresentFailed, got {:?}", other),
    }
}

#[test]
fn test_present_success_resets_failure_count() {
    let (mock, manager) = ready_manager(DeviceConfig::default().with_present_failure_threshold(Some(3)));
    mock.lock().fail_swaps = 2;

    manager.present().unwrap();
    manager.present().unwrap();
    assert_eq!(manager.consecutive_present_failures(), 2);

    assert_eq!(manager.present().unwrap(), PresentOutcome::Presented);
    assert_eq!(manager.consecutive_present_failures(), 0);
}

#[test]
fn test_present_failures_tolerated_without_threshold() {
    let (mock, manager) = ready_manager(DeviceConfig::default().with_present_failure_threshold(None));
    mock.lock().fail_swaps = 100;

    for _ in 0..20 {
        assert_eq!(manager.present().unwrap(), PresentOutcome::Dropped);
    }
    assert_eq!(manager.consecutive_present_failures(), 20);
}

// ============================================================================
// Tests: Teardown
// ============================================================================

#[test]
fn test_destroy_contexts_releases_everything() {
    let (mock, manager) = default_ready();
    manager.make_current(ContextKind::Shared).unwrap();

    manager.destroy_contexts();

    assert!(!manager.is_initialized());
    assert_eq!(mock.current_on_this_thread(), None);
    let state = mock.lock();
    assert!(state.contexts.is_empty());
    assert!(state.surfaces.is_empty());
    assert!(state.live_vertex_arrays.is_empty());
}

#[test]
fn test_destroy_contexts_deletes_viewport_framebuffer_in_its_context() {
    let (mock, manager) = default_ready();
    let framebuffer = manager
        .with_context(ContextKind::Rendering, || mock.create_framebuffer())
        .unwrap()
        .unwrap();
    manager.set_viewport_framebuffer(ContextKind::Rendering, Some(framebuffer));
    let rendering = manager.slot(ContextKind::Rendering).context;

    manager.destroy_contexts();

    assert!(mock.lock().deleted_framebuffers.contains(&(framebuffer, rendering)));
}

#[test]
fn test_destroy_contexts_is_idempotent() {
    let (mock, manager) = default_ready();
    manager.destroy_contexts();
    let calls = mock.make_current_calls();
    manager.destroy_contexts();
    assert_eq!(mock.make_current_calls(), calls);
}

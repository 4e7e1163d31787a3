//! GPU contexts: the three logical slots, scoped activation and window readiness

mod context_slot;
mod context_slot_manager;
mod window_watch;

pub use context_slot::{ContextKind, ContextSlot};
pub use context_slot_manager::{ContextSlotManager, SurfaceRecovery, PresentOutcome};
pub use window_watch::{WindowWatch, WindowState};

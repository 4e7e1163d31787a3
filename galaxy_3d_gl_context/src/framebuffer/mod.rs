//! Framebuffer objects: render target bindings, the per-key object cache and
//! the per-context bound-framebuffer trackers

mod render_target;
mod framebuffer_key;
mod bound_tracker;
mod framebuffer_cache;
mod framebuffer_state;

pub use render_target::{
    TextureId, ArrayLayer, AttachmentKind, RenderTargetBinding,
    DepthStencilAspects, DepthStencilTarget,
};
pub use framebuffer_key::{FramebufferKey, MAX_COLOR_TARGETS};
pub use bound_tracker::BoundFramebufferTracker;
pub use framebuffer_cache::{FramebufferObjectCache, PurgedFramebuffer};
pub use framebuffer_state::FramebufferState;

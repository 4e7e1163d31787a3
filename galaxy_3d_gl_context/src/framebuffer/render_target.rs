/// Render target bindings - which view of which texture a framebuffer attaches
///
/// A binding names one mip level and either one layer or all layers of a
/// texture or renderbuffer. `AttachmentKind` decides which attach call is
/// used; the whole set of bindings for a draw forms the framebuffer key.

use bitflags::bitflags;
use crate::native::NativeResource;

/// Engine-side texture identity
///
/// Unique per GPU texture object for its whole lifetime, unlike GL names
/// which the driver reuses after deletion. Purge matches on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// Which layers of a layered texture are attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArrayLayer {
    /// Whole texture (layered rendering)
    #[default]
    All,
    /// One layer, depth slice or cube face
    Layer(u32),
}

/// Texture dimensionality, selects the attach call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentKind {
    Tex2D,
    Tex2DMultisample,
    /// Platform external image (GL_TEXTURE_EXTERNAL_OES)
    External,
    Tex3D,
    Tex2DArray,
    Cube,
    CubeArray,
    Renderbuffer,
}

impl AttachmentKind {
    /// Kinds that can be attached whole as a layered target
    pub fn is_layered(self) -> bool {
        matches!(
            self,
            AttachmentKind::Tex3D | AttachmentKind::Tex2DArray | AttachmentKind::Cube | AttachmentKind::CubeArray
        )
    }
}

/// One attachment of a framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetBinding {
    pub texture: TextureId,
    /// GL name of the texture or renderbuffer
    pub resource: NativeResource,
    pub mip_level: u32,
    pub array_layer: ArrayLayer,
    pub kind: AttachmentKind,
    /// Sample count for tile-memory MSAA with implicit resolve (0 = off)
    pub implicit_resolve_samples: u32,
}

impl RenderTargetBinding {
    /// Mip 0 of a plain 2D texture
    pub fn texture_2d(texture: TextureId, resource: NativeResource) -> Self {
        Self {
            texture,
            resource,
            mip_level: 0,
            array_layer: ArrayLayer::All,
            kind: AttachmentKind::Tex2D,
            implicit_resolve_samples: 0,
        }
    }

    pub fn renderbuffer(texture: TextureId, resource: NativeResource) -> Self {
        Self {
            kind: AttachmentKind::Renderbuffer,
            ..Self::texture_2d(texture, resource)
        }
    }

    /// The swapchain back buffer
    pub fn back_buffer() -> Self {
        Self::texture_2d(TextureId(0), NativeResource::BACK_BUFFER)
    }

    pub fn with_kind(mut self, kind: AttachmentKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_mip_level(mut self, mip_level: u32) -> Self {
        self.mip_level = mip_level;
        self
    }

    pub fn with_layer(mut self, layer: u32) -> Self {
        self.array_layer = ArrayLayer::Layer(layer);
        self
    }

    pub fn with_implicit_resolve(mut self, samples: u32) -> Self {
        self.implicit_resolve_samples = samples;
        self
    }
}

bitflags! {
    /// Aspects of a depth-stencil target that are attached
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DepthStencilAspects: u8 {
        const DEPTH = 1 << 0;
        const STENCIL = 1 << 1;
    }
}

/// Depth and/or stencil attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilTarget {
    pub binding: RenderTargetBinding,
    pub aspects: DepthStencilAspects,
}

impl DepthStencilTarget {
    pub fn depth(binding: RenderTargetBinding) -> Self {
        Self { binding, aspects: DepthStencilAspects::DEPTH }
    }

    pub fn depth_stencil(binding: RenderTargetBinding) -> Self {
        Self { binding, aspects: DepthStencilAspects::DEPTH | DepthStencilAspects::STENCIL }
    }
}

//! Engine-level resource descriptors.
//!
//! These are plain value structs handed to the device layer when creating
//! or placing resources; nothing here talks to a driver.

use bitflags::bitflags;

use glint_format::DxgiFormat;

/// Opaque handle to a GPU resource owned by the device layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId(pub u64);

#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResourceDimension {
    Unknown = 0,
    Buffer = 1,
    Texture1D = 2,
    Texture2D = 3,
    Texture3D = 4,
}

impl ResourceDimension {
    pub fn from_u32(word: u32) -> Option<Self> {
        Some(match word {
            0 => Self::Unknown,
            1 => Self::Buffer,
            2 => Self::Texture1D,
            3 => Self::Texture2D,
            4 => Self::Texture3D,
            _ => return None,
        })
    }
}

/// Physical memory arrangement of a texture's texels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum TextureLayout {
    /// Driver-chosen (usually swizzled) layout.
    #[default]
    Unknown,
    /// Linear row-major layout; required for buffers.
    RowMajor,
}

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct ResourceFlags: u32 {
        const ALLOW_RENDER_TARGET = 1 << 0;
        const ALLOW_DEPTH_STENCIL = 1 << 1;
        const ALLOW_UNORDERED_ACCESS = 1 << 2;
        const DENY_SHADER_RESOURCE = 1 << 3;
    }
}

/// Description of a buffer or 1D/2D/3D texture.
///
/// Immutable value type; `alignment == 0` lets the placement rules pick
/// the default for the resource's shape.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ResourceDesc {
    pub dimension: ResourceDimension,
    pub alignment: u64,
    pub width: u64,
    pub height: u32,
    pub depth_or_array_size: u16,
    pub mip_levels: u16,
    pub format: DxgiFormat,
    pub sample_count: u32,
    pub layout: TextureLayout,
    pub flags: ResourceFlags,
}

impl ResourceDesc {
    pub fn buffer(size_bytes: u64, flags: ResourceFlags) -> Self {
        Self {
            dimension: ResourceDimension::Buffer,
            alignment: 0,
            width: size_bytes,
            height: 1,
            depth_or_array_size: 1,
            mip_levels: 1,
            format: DxgiFormat::Unknown,
            sample_count: 1,
            layout: TextureLayout::RowMajor,
            flags,
        }
    }

    pub fn tex1d(format: DxgiFormat, width: u64, array_size: u16, mip_levels: u16) -> Self {
        Self {
            dimension: ResourceDimension::Texture1D,
            alignment: 0,
            width,
            height: 1,
            depth_or_array_size: array_size,
            mip_levels,
            format,
            sample_count: 1,
            layout: TextureLayout::Unknown,
            flags: ResourceFlags::empty(),
        }
    }

    pub fn tex2d(format: DxgiFormat, width: u64, height: u32, array_size: u16, mip_levels: u16) -> Self {
        Self {
            dimension: ResourceDimension::Texture2D,
            alignment: 0,
            width,
            height,
            depth_or_array_size: array_size,
            mip_levels,
            format,
            sample_count: 1,
            layout: TextureLayout::Unknown,
            flags: ResourceFlags::empty(),
        }
    }

    pub fn tex3d(format: DxgiFormat, width: u64, height: u32, depth: u16, mip_levels: u16) -> Self {
        Self {
            dimension: ResourceDimension::Texture3D,
            alignment: 0,
            width,
            height,
            depth_or_array_size: depth,
            mip_levels,
            format,
            sample_count: 1,
            layout: TextureLayout::Unknown,
            flags: ResourceFlags::empty(),
        }
    }

    pub fn with_flags(mut self, flags: ResourceFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_layout(mut self, layout: TextureLayout) -> Self {
        self.layout = layout;
        self
    }
}

/// Memory pool a resource's backing heap lives in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum HeapKind {
    /// CPU-write, GPU-read staging memory.
    Upload,
    /// GPU-local memory.
    GpuOnly,
    /// GPU-write, CPU-read readback memory.
    Readback,
}

/// Placement properties for a heap allocation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct HeapProperties {
    pub kind: HeapKind,
    pub creation_node_mask: u32,
    pub visible_node_mask: u32,
}

impl HeapProperties {
    pub fn upload() -> Self {
        Self::new(HeapKind::Upload)
    }

    pub fn gpu_only() -> Self {
        Self::new(HeapKind::GpuOnly)
    }

    pub fn readback() -> Self {
        Self::new(HeapKind::Readback)
    }

    fn new(kind: HeapKind) -> Self {
        Self {
            kind,
            creation_node_mask: 1,
            visible_node_mask: 1,
        }
    }
}

//! View descriptors.
//!
//! Plain value structs describing how a shader stage reads or writes a
//! resource. The device layer turns one of these plus a [`ResourceId`]
//! into a [`DescriptorHandle`]; nothing here allocates descriptors.

use glint_format::DxgiFormat;

use crate::resource::ResourceId;

/// Sentinel mip count meaning "every level from `most_detailed_mip` down".
pub const ALL_MIP_LEVELS: u32 = u32::MAX;

/// Opaque handle into a device-owned descriptor heap.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DescriptorHandle(pub u64);

/// Structured-buffer shader-resource view.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BufferSrv {
    pub resource: ResourceId,
    pub first_element: u64,
    pub num_elements: u32,
    pub element_stride_bytes: u32,
}

impl BufferSrv {
    pub fn structured(resource: ResourceId, num_elements: u32, element_stride_bytes: u32) -> Self {
        Self {
            resource,
            first_element: 0,
            num_elements,
            element_stride_bytes,
        }
    }
}

/// Buffer unordered-access view, structured or raw.
///
/// Raw views address the buffer as 32-bit words; `element_stride_bytes`
/// is zero for them.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BufferUav {
    pub resource: ResourceId,
    pub first_element: u64,
    pub num_elements: u32,
    pub element_stride_bytes: u32,
    pub raw: bool,
}

impl BufferUav {
    pub fn structured(resource: ResourceId, num_elements: u32, element_stride_bytes: u32) -> Self {
        Self {
            resource,
            first_element: 0,
            num_elements,
            element_stride_bytes,
            raw: false,
        }
    }

    pub fn raw(resource: ResourceId, num_words: u32) -> Self {
        Self {
            resource,
            first_element: 0,
            num_elements: num_words,
            element_stride_bytes: 0,
            raw: true,
        }
    }
}

/// 2D texture shader-resource view.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Texture2dSrv {
    pub resource: ResourceId,
    /// `None` inherits the resource's own format; typeless resources must
    /// override.
    pub format: Option<DxgiFormat>,
    pub most_detailed_mip: u32,
    pub mip_levels: u32,
    pub plane_slice: u32,
    pub min_lod_clamp: f32,
}

impl Texture2dSrv {
    /// Full mip chain in the resource's own format.
    pub fn new(resource: ResourceId) -> Self {
        Self {
            resource,
            format: None,
            most_detailed_mip: 0,
            mip_levels: ALL_MIP_LEVELS,
            plane_slice: 0,
            min_lod_clamp: 0.0,
        }
    }

    pub fn with_format(mut self, format: DxgiFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_mip_range(mut self, most_detailed_mip: u32, mip_levels: u32) -> Self {
        self.most_detailed_mip = most_detailed_mip;
        self.mip_levels = mip_levels;
        self
    }
}

/// 3D texture shader-resource view.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Texture3dSrv {
    pub resource: ResourceId,
    pub format: Option<DxgiFormat>,
    pub most_detailed_mip: u32,
    pub mip_levels: u32,
    pub min_lod_clamp: f32,
}

impl Texture3dSrv {
    pub fn new(resource: ResourceId) -> Self {
        Self {
            resource,
            format: None,
            most_detailed_mip: 0,
            mip_levels: ALL_MIP_LEVELS,
            min_lod_clamp: 0.0,
        }
    }

    pub fn with_format(mut self, format: DxgiFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// 2D texture unordered-access view of a single mip.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Texture2dUav {
    pub resource: ResourceId,
    pub format: Option<DxgiFormat>,
    pub mip_slice: u32,
    pub plane_slice: u32,
}

impl Texture2dUav {
    pub fn new(resource: ResourceId, mip_slice: u32) -> Self {
        Self {
            resource,
            format: None,
            mip_slice,
            plane_slice: 0,
        }
    }

    pub fn with_format(mut self, format: DxgiFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// 3D texture unordered-access view of a w-slice span within one mip.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Texture3dUav {
    pub resource: ResourceId,
    pub format: Option<DxgiFormat>,
    pub mip_slice: u32,
    pub first_w_slice: u32,
    /// `u32::MAX` spans every slice from `first_w_slice`.
    pub w_size: u32,
}

impl Texture3dUav {
    pub fn new(resource: ResourceId, mip_slice: u32) -> Self {
        Self {
            resource,
            format: None,
            mip_slice,
            first_w_slice: 0,
            w_size: u32::MAX,
        }
    }
}

/// Render-target view of one mip of a 2D texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rtv {
    pub resource: ResourceId,
    pub format: Option<DxgiFormat>,
    pub mip_slice: u32,
    pub plane_slice: u32,
}

impl Rtv {
    pub fn new(resource: ResourceId) -> Self {
        Self {
            resource,
            format: None,
            mip_slice: 0,
            plane_slice: 0,
        }
    }
}

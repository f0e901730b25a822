//! Placement sizing for resource descriptors.
//!
//! Mirrors the native placement rules: buffers are linear with 64 KiB
//! granularity; textures are sized per subresource with 256-byte row
//! pitches and 512-byte subresource starts, then rounded to the placement
//! alignment. Inputs are assumed well-formed (nonzero extents, known
//! format); malformed descriptors are a caller contract violation and are
//! only caught by debug assertions.

use glint_format::{mip_extent, surface_layout, SurfaceLayout};

use crate::arena::align_up;
use crate::resource::{ResourceDesc, ResourceDimension, ResourceFlags};

pub const TEXTURE_ROW_PITCH_ALIGNMENT: u64 = 256;
pub const SUBRESOURCE_PLACEMENT_ALIGNMENT: u64 = 512;
pub const DEFAULT_PLACEMENT_ALIGNMENT: u64 = 64 * 1024;
pub const SMALL_PLACEMENT_ALIGNMENT: u64 = 4 * 1024;
const BUFFER_SIZE_GRANULARITY: u64 = 64 * 1024;

/// Size and alignment required to place one or more resources.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AllocationInfo {
    pub size_bytes: u64,
    pub alignment_bytes: u64,
}

/// Placement of one descriptor within a batched allocation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PlacedAllocation {
    pub offset_bytes: u64,
    pub size_bytes: u64,
    pub alignment_bytes: u64,
}

fn mip_layout(desc: &ResourceDesc, mip: u32) -> SurfaceLayout {
    let w = mip_extent(desc.width.min(u64::from(u32::MAX)) as u32, mip);
    let h = mip_extent(desc.height, mip);
    match surface_layout(w, h, desc.format) {
        Ok(layout) => layout,
        Err(_) => {
            debug_assert!(false, "allocation_info on unknown format {:?}", desc.format);
            SurfaceLayout {
                row_pitch_bytes: 0,
                slice_pitch_bytes: 0,
                row_count: 0,
            }
        }
    }
}

fn shape(desc: &ResourceDesc) -> (u32, u32) {
    // (array layers, base depth)
    match desc.dimension {
        ResourceDimension::Texture3D => (1, u32::from(desc.depth_or_array_size)),
        _ => (u32::from(desc.depth_or_array_size), 1),
    }
}

/// Compute the size and alignment one resource needs in a heap.
pub fn allocation_info(desc: &ResourceDesc) -> AllocationInfo {
    if desc.dimension == ResourceDimension::Buffer {
        return AllocationInfo {
            size_bytes: align_up(desc.width.max(1), BUFFER_SIZE_GRANULARITY),
            alignment_bytes: if desc.alignment != 0 {
                desc.alignment
            } else {
                DEFAULT_PLACEMENT_ALIGNMENT
            },
        };
    }

    let (layers, base_depth) = shape(desc);
    let mut size = 0u64;
    for _layer in 0..layers {
        let mut depth = base_depth;
        for mip in 0..u32::from(desc.mip_levels.max(1)) {
            let layout = mip_layout(desc, mip);
            let padded_row = align_up(layout.row_pitch_bytes, TEXTURE_ROW_PITCH_ALIGNMENT);
            let subresource = padded_row * u64::from(layout.row_count) * u64::from(depth);
            size = align_up(size, SUBRESOURCE_PLACEMENT_ALIGNMENT) + subresource;
            depth = mip_extent(depth, 1);
        }
    }

    let alignment = if desc.alignment != 0 {
        desc.alignment
    } else if !desc
        .flags
        .intersects(ResourceFlags::ALLOW_RENDER_TARGET | ResourceFlags::ALLOW_DEPTH_STENCIL)
        && size <= DEFAULT_PLACEMENT_ALIGNMENT
    {
        // Small non-attachment textures qualify for 4 KiB placement.
        SMALL_PLACEMENT_ALIGNMENT
    } else {
        DEFAULT_PLACEMENT_ALIGNMENT
    };

    AllocationInfo {
        size_bytes: align_up(size.max(1), alignment),
        alignment_bytes: alignment,
    }
}

/// Compute placements for packing `descs` into one contiguous allocation.
///
/// Returns the aggregate requirement plus one placement per descriptor in
/// input order. Each offset is a multiple of that descriptor's own
/// alignment, ranges never overlap, and placement is deterministic: the
/// same input sequence always yields the same offsets.
pub fn batched_allocation_info(descs: &[ResourceDesc]) -> (AllocationInfo, Vec<PlacedAllocation>) {
    let mut placements = Vec::with_capacity(descs.len());
    let mut cursor = 0u64;
    let mut max_alignment = 1u64;

    for desc in descs {
        let info = allocation_info(desc);
        let offset = align_up(cursor, info.alignment_bytes);
        placements.push(PlacedAllocation {
            offset_bytes: offset,
            size_bytes: info.size_bytes,
            alignment_bytes: info.alignment_bytes,
        });
        cursor = offset + info.size_bytes;
        max_alignment = max_alignment.max(info.alignment_bytes);
    }

    (
        AllocationInfo {
            size_bytes: align_up(cursor, max_alignment),
            alignment_bytes: max_alignment,
        },
        placements,
    )
}

/// Bytes an intermediate upload buffer needs to stage the subresource
/// range `[first_subresource, first_subresource + count)` of `desc`.
///
/// Subresource indices follow the usual array-major-then-mip numbering
/// (for 3D textures, mip index only).
pub fn required_upload_size(desc: &ResourceDesc, first_subresource: u32, count: u32) -> u64 {
    let mips = u32::from(desc.mip_levels.max(1));
    let (_layers, base_depth) = shape(desc);

    let mut size = 0u64;
    for sub in first_subresource..first_subresource + count {
        let mip = sub % mips;
        let layout = mip_layout(desc, mip);
        let padded_row = align_up(layout.row_pitch_bytes, TEXTURE_ROW_PITCH_ALIGNMENT);
        let depth = mip_extent(base_depth, mip);
        size = align_up(size, SUBRESOURCE_PLACEMENT_ALIGNMENT)
            + padded_row * u64::from(layout.row_count) * u64::from(depth);
    }
    size
}

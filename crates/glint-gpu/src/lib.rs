//! GPU resource-description and texture-ingestion layer.
//!
//! This crate owns everything between raw asset bytes and a device
//! layer's create calls:
//!
//! - [`dds`]: DDS container parsing into caller-owned scratch memory,
//!   one [`Subresource`] per array layer x mip x depth slice.
//! - [`arena`]: the injected [`ScratchAllocator`] seam and a bump-arena
//!   implementation of it.
//! - [`resource`]: buffer/texture descriptors and heap properties.
//! - [`alloc_info`]: placement sizing (single, batched, upload staging).
//! - [`barrier`]: sync/access/layout transition encoding with a checked
//!   compatibility table, plus the legacy state-based form.
//! - [`view`] / [`pso`]: view descriptors and pipeline-state blocks with
//!   a stable content-hashed cache key.
//!
//! No module talks to a driver; everything is deterministic value
//! manipulation that a device layer consumes.

pub mod alloc_info;
pub mod arena;
pub mod barrier;
pub mod dds;
pub mod pso;
pub mod resource;
pub mod view;

pub use alloc_info::{
    allocation_info, batched_allocation_info, required_upload_size, AllocationInfo,
    PlacedAllocation,
};
pub use arena::{align_up, ScratchAllocator, ScratchArena};
pub use barrier::{
    srv_to_uav, uav_to_srv, uav_to_uav, AccessScope, BarrierGroup, BarrierLayout, BufferBarrier,
    LegacyBarrier, QueueKind, ResourceStates, SubresourceRange, SyncScope, TextureBarrier,
};
pub use dds::{load_dds, parse_dds, DdsError, DdsLoadOptions, DdsTexture, Subresource};
pub use resource::{
    HeapKind, HeapProperties, ResourceDesc, ResourceDimension, ResourceFlags, ResourceId,
    TextureLayout,
};

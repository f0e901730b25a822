//! Synchronization barrier encoding.
//!
//! Barriers are transient value structs describing one resource-state
//! transition: a synchronization scope pair, an access scope pair, and
//! (for textures) a layout pair. The legality rules the driver enforces
//! are kept in an explicit table ([`TextureBarrier::is_legal`]) so they
//! can be audited and tested in isolation:
//! - an empty sync scope always pairs with `NO_ACCESS` on the same side;
//! - `UNORDERED_ACCESS` always pairs with the queue-appropriate
//!   unordered-access layout on that side.

use bitflags::bitflags;

use crate::resource::ResourceId;

/// Sentinel subresource index meaning "every subresource".
pub const ALL_SUBRESOURCES: u32 = u32::MAX;

bitflags! {
    /// Pipeline stages a barrier waits on / releases to.
    ///
    /// `empty()` is the "no prior work" scope.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct SyncScope: u32 {
        const COMPUTE_SHADING = 1 << 0;
        const PIXEL_SHADING = 1 << 1;
        const VERTEX_SHADING = 1 << 2;
        const RENDER_TARGET = 1 << 3;
        const DEPTH_STENCIL = 1 << 4;
        const COPY = 1 << 5;
        const ALL_SHADING = Self::COMPUTE_SHADING.bits()
            | Self::PIXEL_SHADING.bits()
            | Self::VERTEX_SHADING.bits();
    }
}

bitflags! {
    /// Memory accesses made visible by a barrier.
    ///
    /// `NO_ACCESS` is an explicit bit, not `empty()`: it asserts the
    /// resource is not accessed at all on that side and may not be
    /// combined with any other access.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct AccessScope: u32 {
        const SHADER_RESOURCE = 1 << 0;
        const UNORDERED_ACCESS = 1 << 1;
        const RENDER_TARGET = 1 << 2;
        const DEPTH_STENCIL_WRITE = 1 << 3;
        const COPY_SOURCE = 1 << 4;
        const COPY_DEST = 1 << 5;
        const NO_ACCESS = 1 << 31;
    }
}

/// Texture memory layouts a transition can move between.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BarrierLayout {
    Undefined,
    Common,
    RenderTarget,
    DepthStencilWrite,
    CopySource,
    CopyDest,
    DirectQueueShaderResource,
    DirectQueueUnorderedAccess,
    ComputeQueueShaderResource,
    ComputeQueueUnorderedAccess,
}

/// Execution context a transition is recorded on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum QueueKind {
    Direct,
    Compute,
}

impl QueueKind {
    pub fn shader_resource_layout(self) -> BarrierLayout {
        match self {
            QueueKind::Direct => BarrierLayout::DirectQueueShaderResource,
            QueueKind::Compute => BarrierLayout::ComputeQueueShaderResource,
        }
    }

    pub fn unordered_access_layout(self) -> BarrierLayout {
        match self {
            QueueKind::Direct => BarrierLayout::DirectQueueUnorderedAccess,
            QueueKind::Compute => BarrierLayout::ComputeQueueUnorderedAccess,
        }
    }
}

/// Mip/subresource span a texture barrier applies to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubresourceRange {
    pub index_or_first_mip: u32,
    pub num_mips: u32,
}

impl SubresourceRange {
    pub fn all() -> Self {
        Self {
            index_or_first_mip: ALL_SUBRESOURCES,
            num_mips: 0,
        }
    }

    pub fn single(subresource: u32) -> Self {
        Self {
            index_or_first_mip: subresource,
            num_mips: 0,
        }
    }
}

impl Default for SubresourceRange {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BufferBarrier {
    pub resource: ResourceId,
    pub sync_before: SyncScope,
    pub sync_after: SyncScope,
    pub access_before: AccessScope,
    pub access_after: AccessScope,
    pub offset: u64,
    pub size: u64,
}

impl BufferBarrier {
    /// Whole-buffer barrier.
    pub fn new(
        resource: ResourceId,
        sync_before: SyncScope,
        sync_after: SyncScope,
        access_before: AccessScope,
        access_after: AccessScope,
    ) -> Self {
        Self {
            resource,
            sync_before,
            sync_after,
            access_before,
            access_after,
            offset: 0,
            size: u64::MAX,
        }
    }

    pub fn is_legal(&self) -> bool {
        sync_access_compatible(self.sync_before, self.access_before)
            && sync_access_compatible(self.sync_after, self.access_after)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureBarrier {
    pub resource: ResourceId,
    pub sync_before: SyncScope,
    pub sync_after: SyncScope,
    pub access_before: AccessScope,
    pub access_after: AccessScope,
    pub layout_before: BarrierLayout,
    pub layout_after: BarrierLayout,
    pub range: SubresourceRange,
}

/// Layouts each access scope is allowed to pair with. Accesses absent
/// from the table are layout-unconstrained.
const ACCESS_LAYOUT_TABLE: &[(AccessScope, &[BarrierLayout])] = &[
    (
        AccessScope::UNORDERED_ACCESS,
        &[
            BarrierLayout::DirectQueueUnorderedAccess,
            BarrierLayout::ComputeQueueUnorderedAccess,
        ],
    ),
    (
        AccessScope::SHADER_RESOURCE,
        &[
            BarrierLayout::Common,
            BarrierLayout::DirectQueueShaderResource,
            BarrierLayout::ComputeQueueShaderResource,
        ],
    ),
    (AccessScope::RENDER_TARGET, &[BarrierLayout::RenderTarget]),
    (
        AccessScope::DEPTH_STENCIL_WRITE,
        &[BarrierLayout::DepthStencilWrite],
    ),
    (AccessScope::COPY_SOURCE, &[BarrierLayout::CopySource]),
    (AccessScope::COPY_DEST, &[BarrierLayout::CopyDest]),
];

fn sync_access_compatible(sync: SyncScope, access: AccessScope) -> bool {
    if access.contains(AccessScope::NO_ACCESS) {
        // NO_ACCESS stands alone.
        return access == AccessScope::NO_ACCESS;
    }
    // Any real access needs a nonempty sync scope; an empty sync scope
    // needs NO_ACCESS.
    !sync.is_empty()
}

fn access_layout_compatible(access: AccessScope, layout: BarrierLayout) -> bool {
    for (bit, layouts) in ACCESS_LAYOUT_TABLE {
        if access.contains(*bit) && !layouts.contains(&layout) {
            return false;
        }
    }
    true
}

impl TextureBarrier {
    /// Check this transition against the compatibility table.
    pub fn is_legal(&self) -> bool {
        sync_access_compatible(self.sync_before, self.access_before)
            && sync_access_compatible(self.sync_after, self.access_after)
            && access_layout_compatible(self.access_before, self.layout_before)
            && access_layout_compatible(self.access_after, self.layout_after)
    }
}

/// Shader-resource to unordered-access transition.
///
/// `with_sync` adds the execution-order dependency on prior compute work;
/// without it the transition asserts no prior access instead.
pub fn srv_to_uav(
    resource: ResourceId,
    queue: QueueKind,
    with_sync: bool,
    range: SubresourceRange,
) -> TextureBarrier {
    let (sync_before, access_before) = if with_sync {
        (SyncScope::COMPUTE_SHADING, AccessScope::SHADER_RESOURCE)
    } else {
        (SyncScope::empty(), AccessScope::NO_ACCESS)
    };
    TextureBarrier {
        resource,
        sync_before,
        sync_after: SyncScope::COMPUTE_SHADING,
        access_before,
        access_after: AccessScope::UNORDERED_ACCESS,
        layout_before: queue.shader_resource_layout(),
        layout_after: queue.unordered_access_layout(),
        range,
    }
}

/// Unordered-access to shader-resource transition.
pub fn uav_to_srv(
    resource: ResourceId,
    queue: QueueKind,
    with_sync: bool,
    range: SubresourceRange,
) -> TextureBarrier {
    let (sync_before, access_before) = if with_sync {
        (SyncScope::COMPUTE_SHADING, AccessScope::UNORDERED_ACCESS)
    } else {
        (SyncScope::empty(), AccessScope::NO_ACCESS)
    };
    TextureBarrier {
        resource,
        sync_before,
        sync_after: SyncScope::COMPUTE_SHADING,
        access_before,
        access_after: AccessScope::SHADER_RESOURCE,
        layout_before: queue.unordered_access_layout(),
        layout_after: queue.shader_resource_layout(),
        range,
    }
}

/// Unordered-access write visibility barrier (layout preserved).
pub fn uav_to_uav(resource: ResourceId, queue: QueueKind, range: SubresourceRange) -> TextureBarrier {
    TextureBarrier {
        resource,
        sync_before: SyncScope::COMPUTE_SHADING,
        sync_after: SyncScope::COMPUTE_SHADING,
        access_before: AccessScope::UNORDERED_ACCESS,
        access_after: AccessScope::UNORDERED_ACCESS,
        layout_before: queue.unordered_access_layout(),
        layout_after: queue.unordered_access_layout(),
        range,
    }
}

/// A batch of same-kind barriers submitted as one unit.
///
/// Buffer and texture barriers cannot share a group; the enum makes the
/// mix unrepresentable.
#[derive(Debug, Clone, PartialEq)]
pub enum BarrierGroup {
    Buffer(Vec<BufferBarrier>),
    Texture(Vec<TextureBarrier>),
}

impl BarrierGroup {
    pub fn buffers(barriers: impl Into<Vec<BufferBarrier>>) -> Self {
        BarrierGroup::Buffer(barriers.into())
    }

    pub fn textures(barriers: impl Into<Vec<TextureBarrier>>) -> Self {
        BarrierGroup::Texture(barriers.into())
    }

    pub fn len(&self) -> usize {
        match self {
            BarrierGroup::Buffer(b) => b.len(),
            BarrierGroup::Texture(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

bitflags! {
    /// Resource states for the legacy (pre-enhanced) barrier model.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct ResourceStates: u32 {
        const VERTEX_AND_CONSTANT_BUFFER = 1 << 0;
        const INDEX_BUFFER = 1 << 1;
        const RENDER_TARGET = 1 << 2;
        const UNORDERED_ACCESS = 1 << 3;
        const DEPTH_WRITE = 1 << 4;
        const DEPTH_READ = 1 << 5;
        const NON_PIXEL_SHADER_RESOURCE = 1 << 6;
        const PIXEL_SHADER_RESOURCE = 1 << 7;
        const COPY_DEST = 1 << 8;
        const COPY_SOURCE = 1 << 9;
        const ALL_SHADER_RESOURCE = Self::NON_PIXEL_SHADER_RESOURCE.bits()
            | Self::PIXEL_SHADER_RESOURCE.bits();
    }
}

/// Legacy state-transition barriers, kept for command lists that have not
/// moved to the enhanced sync/access/layout model.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LegacyBarrier {
    Transition {
        resource: ResourceId,
        before: ResourceStates,
        after: ResourceStates,
        subresource: u32,
    },
    Uav {
        resource: ResourceId,
    },
}

impl LegacyBarrier {
    pub fn transition(resource: ResourceId, before: ResourceStates, after: ResourceStates) -> Self {
        LegacyBarrier::Transition {
            resource,
            before,
            after,
            subresource: ALL_SUBRESOURCES,
        }
    }

    pub fn uav(resource: ResourceId) -> Self {
        LegacyBarrier::Uav { resource }
    }
}

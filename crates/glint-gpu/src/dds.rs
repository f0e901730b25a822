//! DDS texture container ingestion.
//!
//! Parses the on-disk DDS layout (magic, 124-byte header, optional DX10
//! extended header) and emits one [`Subresource`] per array layer x mip
//! level x depth slice, copying texel data into caller-injected scratch
//! memory. The parser is a single forward pass: every ceiling and size
//! check happens before the first byte of output is produced, so a failed
//! call never exposes partially-filled results.
//!
//! Reference: https://learn.microsoft.com/en-us/windows/win32/direct3ddds/dds-header

use std::io;
use std::path::Path;

use bitflags::bitflags;
use thiserror::Error;

use glint_format::{mip_extent, surface_layout, DxgiFormat};

use crate::arena::ScratchAllocator;
use crate::resource::ResourceDimension;

/// `b"DDS "` little-endian.
pub const DDS_MAGIC: u32 = 0x2053_4444;

const HEADER_SIZE: u32 = 124;
const PIXEL_FORMAT_SIZE: u32 = 32;

/// Hard ceiling on declared mip chains; bounds per-call work.
pub const MAX_MIP_LEVELS: u32 = 15;
const MAX_TEXTURE_EXTENT: u32 = 16384;
const MAX_VOLUME_EXTENT: u32 = 2048;
const MAX_ARRAY_SIZE: u32 = 2048;

/// Alignment of the scratch reservation holding decoded texel data.
const SCRATCH_ALIGN: usize = 16;

#[derive(Debug, Error)]
pub enum DdsError {
    /// The file could not be opened or read.
    #[error("file not found or unreadable: {0}")]
    FileNotFound(#[source] io::Error),

    /// The body is malformed or inconsistent with the header.
    #[error("invalid DDS container: {0}")]
    InvalidDds(&'static str),

    /// The magic or fixed-size header structure is wrong.
    #[error("invalid DDS header: {0}")]
    InvalidHeader(&'static str),

    /// The injected scratch allocator could not satisfy the request.
    #[error("scratch allocation of {requested} bytes failed")]
    AllocFailed { requested: u64 },

    /// The container declares more bytes than the configured ceiling.
    #[error("container size {len} exceeds configured limit {max}")]
    FileTooBig { len: u64, max: u64 },

    /// Catch-all for structurally unexpected conditions.
    #[error("unexpected DDS structure: {0}")]
    Unknown(&'static str),
}

/// Policy knobs for a load call.
#[derive(Debug, Clone, Copy)]
pub struct DdsLoadOptions {
    /// Reject containers larger than this many bytes before reading the
    /// body. The ceiling is policy, not format; tune it per title.
    pub max_file_bytes: u64,
}

impl Default for DdsLoadOptions {
    fn default() -> Self {
        Self {
            max_file_bytes: 1 << 30,
        }
    }
}

/// One uploadable unit: a single depth slice of one mip of one array layer.
///
/// `data_offset` indexes into the scratch buffer owned by the caller's
/// allocator. Emission order is array-major, then mip, then depth slice,
/// so `dest` can be indexed by a closed-form formula downstream.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Subresource {
    pub data_offset: usize,
    pub row_pitch_bytes: u64,
    pub slice_pitch_bytes: u64,
    pub mip_level: u16,
    pub array_layer: u32,
    pub depth_slice: u32,
}

/// Resolved shape of a parsed container.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DdsTexture {
    pub format: DxgiFormat,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub mip_count: u16,
    pub array_size: u32,
    pub is_cubemap: bool,
    /// Subresources actually written to the destination slice.
    pub subresource_count: u32,
}

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    struct HeaderFlags: u32 {
        const CAPS = 0x1;
        const HEIGHT = 0x2;
        const WIDTH = 0x4;
        const PITCH = 0x8;
        const PIXEL_FORMAT = 0x1000;
        const MIP_MAP_COUNT = 0x2_0000;
        const LINEAR_SIZE = 0x8_0000;
        const DEPTH = 0x80_0000;
    }
}

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    struct PixelFormatFlags: u32 {
        const ALPHA_PIXELS = 0x1;
        const ALPHA = 0x2;
        const FOUR_CC = 0x4;
        const RGB = 0x40;
        const YUV = 0x200;
        const LUMINANCE = 0x2_0000;
        const BUMP_DUDV = 0x8_0000;
    }
}

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    struct Caps2: u32 {
        const CUBEMAP = 0x200;
        const CUBEMAP_POSITIVE_X = 0x400;
        const CUBEMAP_NEGATIVE_X = 0x800;
        const CUBEMAP_POSITIVE_Y = 0x1000;
        const CUBEMAP_NEGATIVE_Y = 0x2000;
        const CUBEMAP_POSITIVE_Z = 0x4000;
        const CUBEMAP_NEGATIVE_Z = 0x8000;
        const VOLUME = 0x20_0000;
    }
}

impl Caps2 {
    const ALL_CUBE_FACES: Caps2 = Caps2::CUBEMAP_POSITIVE_X
        .union(Caps2::CUBEMAP_NEGATIVE_X)
        .union(Caps2::CUBEMAP_POSITIVE_Y)
        .union(Caps2::CUBEMAP_NEGATIVE_Y)
        .union(Caps2::CUBEMAP_POSITIVE_Z)
        .union(Caps2::CUBEMAP_NEGATIVE_Z);
}

#[derive(Debug, Copy, Clone)]
struct DdsPixelFormat {
    flags: PixelFormatFlags,
    four_cc: [u8; 4],
    rgb_bit_count: u32,
    r_mask: u32,
    g_mask: u32,
    b_mask: u32,
    a_mask: u32,
}

impl DdsPixelFormat {
    fn has_dx10_header(&self) -> bool {
        self.flags.contains(PixelFormatFlags::FOUR_CC) && self.four_cc == *b"DX10"
    }
}

#[derive(Debug, Copy, Clone)]
struct DdsHeader {
    #[allow(dead_code)]
    flags: HeaderFlags,
    height: u32,
    width: u32,
    depth: u32,
    mip_map_count: u32,
    pixel_format: DdsPixelFormat,
    caps2: Caps2,
}

#[derive(Debug, Copy, Clone)]
struct Dx10Header {
    dxgi_format: u32,
    resource_dimension: u32,
    misc_flag: u32,
    array_size: u32,
}

/// DX10 extended-header miscFlag bit marking a cubemap.
const DX10_MISC_TEXTURE_CUBE: u32 = 0x4;

/// Truncation-checked little-endian reader over the container bytes.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn read_u32(&mut self) -> Option<u32> {
        let end = self.pos.checked_add(4)?;
        let word = u32::from_le_bytes(self.bytes.get(self.pos..end)?.try_into().ok()?);
        self.pos = end;
        Some(word)
    }

    fn read_four_cc(&mut self) -> Option<[u8; 4]> {
        let end = self.pos.checked_add(4)?;
        let cc = self.bytes.get(self.pos..end)?.try_into().ok()?;
        self.pos = end;
        Some(cc)
    }

    fn skip(&mut self, bytes: usize) -> Option<()> {
        let end = self.pos.checked_add(bytes)?;
        if end > self.bytes.len() {
            return None;
        }
        self.pos = end;
        Some(())
    }

    fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }
}

impl DdsHeader {
    fn parse(r: &mut Reader<'_>) -> Result<Self, DdsError> {
        let truncated = DdsError::InvalidHeader("truncated header");

        let size = r.read_u32().ok_or(truncated)?;
        if size != HEADER_SIZE {
            return Err(DdsError::InvalidHeader("header size mismatch"));
        }

        let flags = HeaderFlags::from_bits_retain(
            r.read_u32().ok_or(DdsError::InvalidHeader("truncated header"))?,
        );
        let mut words = [0u32; 5];
        for w in &mut words {
            *w = r
                .read_u32()
                .ok_or(DdsError::InvalidHeader("truncated header"))?;
        }
        let [height, width, _pitch_or_linear_size, depth, mip_map_count] = words;

        // 11 reserved words.
        r.skip(4 * 11)
            .ok_or(DdsError::InvalidHeader("truncated header"))?;

        let pf_size = r
            .read_u32()
            .ok_or(DdsError::InvalidHeader("truncated header"))?;
        if pf_size != PIXEL_FORMAT_SIZE {
            return Err(DdsError::InvalidHeader("pixel format size mismatch"));
        }
        let pf_flags = PixelFormatFlags::from_bits_retain(
            r.read_u32().ok_or(DdsError::InvalidHeader("truncated header"))?,
        );
        let four_cc = r
            .read_four_cc()
            .ok_or(DdsError::InvalidHeader("truncated header"))?;
        let mut pf_words = [0u32; 5];
        for w in &mut pf_words {
            *w = r
                .read_u32()
                .ok_or(DdsError::InvalidHeader("truncated header"))?;
        }
        let [rgb_bit_count, r_mask, g_mask, b_mask, a_mask] = pf_words;

        let _caps = r
            .read_u32()
            .ok_or(DdsError::InvalidHeader("truncated header"))?;
        let caps2 = Caps2::from_bits_retain(
            r.read_u32().ok_or(DdsError::InvalidHeader("truncated header"))?,
        );
        // caps3, caps4, reserved2.
        r.skip(4 * 3)
            .ok_or(DdsError::InvalidHeader("truncated header"))?;

        Ok(DdsHeader {
            flags,
            height,
            width,
            depth,
            mip_map_count,
            pixel_format: DdsPixelFormat {
                flags: pf_flags,
                four_cc,
                rgb_bit_count,
                r_mask,
                g_mask,
                b_mask,
                a_mask,
            },
            caps2,
        })
    }
}

impl Dx10Header {
    fn parse(r: &mut Reader<'_>) -> Result<Self, DdsError> {
        let truncated = || DdsError::InvalidHeader("truncated DX10 header");
        let dxgi_format = r.read_u32().ok_or_else(truncated)?;
        let resource_dimension = r.read_u32().ok_or_else(truncated)?;
        let misc_flag = r.read_u32().ok_or_else(truncated)?;
        let array_size = r.read_u32().ok_or_else(truncated)?;
        let _misc_flags2 = r.read_u32().ok_or_else(truncated)?;
        Ok(Dx10Header {
            dxgi_format,
            resource_dimension,
            misc_flag,
            array_size,
        })
    }
}

/// Resolve a legacy (pre-DX10) pixel-format descriptor by bit masks and
/// fourCC codes. Returns `None` when no DXGI equivalent exists.
fn resolve_legacy_format(pf: &DdsPixelFormat) -> Option<DxgiFormat> {
    let masks = (pf.r_mask, pf.g_mask, pf.b_mask, pf.a_mask);

    if pf.flags.contains(PixelFormatFlags::RGB) {
        return match (pf.rgb_bit_count, masks) {
            (32, (0xff, 0xff00, 0xff_0000, 0xff00_0000)) => Some(DxgiFormat::R8G8B8A8Unorm),
            (32, (0xff_0000, 0xff00, 0xff, 0xff00_0000)) => Some(DxgiFormat::B8G8R8A8Unorm),
            (32, (0xff_0000, 0xff00, 0xff, 0)) => Some(DxgiFormat::B8G8R8X8Unorm),
            (32, (0xffff, 0xffff_0000, 0, 0)) => Some(DxgiFormat::R16G16Unorm),
            (32, (0xffff_ffff, 0, 0, 0)) => Some(DxgiFormat::R32Float),
            (16, (0x7c00, 0x3e0, 0x1f, 0x8000)) => Some(DxgiFormat::B5G5R5A1Unorm),
            (16, (0xf800, 0x7e0, 0x1f, 0)) => Some(DxgiFormat::B5G6R5Unorm),
            (16, (0xf00, 0xf0, 0xf, 0xf000)) => Some(DxgiFormat::B4G4R4A4Unorm),
            _ => None,
        };
    }

    if pf.flags.contains(PixelFormatFlags::LUMINANCE) {
        return match (pf.rgb_bit_count, masks) {
            (8, (0xff, 0, 0, 0)) => Some(DxgiFormat::R8Unorm),
            (16, (0xffff, 0, 0, 0)) => Some(DxgiFormat::R16Unorm),
            (16, (0xff, 0, 0, 0xff00)) => Some(DxgiFormat::R8G8Unorm),
            _ => None,
        };
    }

    if pf.flags.contains(PixelFormatFlags::ALPHA) && pf.rgb_bit_count == 8 {
        return Some(DxgiFormat::A8Unorm);
    }

    if pf.flags.contains(PixelFormatFlags::BUMP_DUDV) {
        return match (pf.rgb_bit_count, masks) {
            (16, (0xff, 0xff00, 0, 0)) => Some(DxgiFormat::R8G8Snorm),
            (32, (0xffff, 0xffff_0000, 0, 0)) => Some(DxgiFormat::R16G16Snorm),
            _ => None,
        };
    }

    if pf.flags.contains(PixelFormatFlags::FOUR_CC) {
        return match &pf.four_cc {
            b"DXT1" => Some(DxgiFormat::Bc1Unorm),
            b"DXT2" | b"DXT3" => Some(DxgiFormat::Bc2Unorm),
            b"DXT4" | b"DXT5" => Some(DxgiFormat::Bc3Unorm),
            b"ATI1" | b"BC4U" => Some(DxgiFormat::Bc4Unorm),
            b"BC4S" => Some(DxgiFormat::Bc4Snorm),
            b"ATI2" | b"BC5U" => Some(DxgiFormat::Bc5Unorm),
            b"BC5S" => Some(DxgiFormat::Bc5Snorm),
            b"RGBG" => Some(DxgiFormat::R8G8B8G8Unorm),
            b"GRGB" => Some(DxgiFormat::G8R8G8B8Unorm),
            b"YUY2" => Some(DxgiFormat::Yuy2),
            // Legacy D3DFMT numeric codes stored as fourCC.
            other => match u32::from_le_bytes(*other) {
                36 => Some(DxgiFormat::R16G16B16A16Unorm),
                113 => Some(DxgiFormat::R16G16B16A16Float),
                114 => Some(DxgiFormat::R32Float),
                116 => Some(DxgiFormat::R32G32B32A32Float),
                _ => None,
            },
        };
    }

    None
}

/// Shape resolved from the header pair before any layout work.
struct ResolvedShape {
    format: DxgiFormat,
    width: u32,
    height: u32,
    depth: u32,
    mip_count: u32,
    array_size: u32,
    is_cubemap: bool,
}

fn resolve_shape(header: &DdsHeader, dx10: Option<&Dx10Header>) -> Result<ResolvedShape, DdsError> {
    let width = header.width;
    let height = header.height;
    if width == 0 || height == 0 {
        return Err(DdsError::InvalidDds("zero extent"));
    }

    let mip_count = header.mip_map_count.max(1);
    if mip_count > MAX_MIP_LEVELS {
        return Err(DdsError::InvalidDds("mip count exceeds ceiling"));
    }

    let mut depth = 1u32;
    let mut array_size = 1u32;
    let mut is_cubemap = false;

    let format = match dx10 {
        Some(ext) => {
            let format = DxgiFormat::from_u32(ext.dxgi_format);
            if format.info().bytes_per_block == 0 {
                return Err(DdsError::InvalidDds("unsupported extended format"));
            }

            array_size = ext.array_size;
            if array_size == 0 {
                return Err(DdsError::InvalidDds("zero array size"));
            }

            match ResourceDimension::from_u32(ext.resource_dimension) {
                Some(ResourceDimension::Texture1D) => {
                    if height != 1 {
                        return Err(DdsError::InvalidDds("1D texture with height > 1"));
                    }
                }
                Some(ResourceDimension::Texture2D) => {
                    if ext.misc_flag & DX10_MISC_TEXTURE_CUBE != 0 {
                        is_cubemap = true;
                        array_size = array_size
                            .checked_mul(6)
                            .ok_or(DdsError::InvalidDds("cubemap array size overflow"))?;
                    }
                }
                Some(ResourceDimension::Texture3D) => {
                    if !header.caps2.contains(Caps2::VOLUME) {
                        return Err(DdsError::InvalidDds("3D texture without volume caps"));
                    }
                    if ext.array_size != 1 {
                        return Err(DdsError::InvalidDds("3D texture with array size > 1"));
                    }
                    depth = header.depth;
                }
                _ => return Err(DdsError::InvalidDds("unsupported resource dimension")),
            }
            format
        }
        None => {
            if header.caps2.contains(Caps2::VOLUME) {
                depth = header.depth;
            } else if header.caps2.contains(Caps2::CUBEMAP) {
                // Modern runtimes require all six faces.
                if !header.caps2.contains(Caps2::ALL_CUBE_FACES) {
                    return Err(DdsError::InvalidDds("partial cubemap"));
                }
                is_cubemap = true;
                array_size = 6;
            }

            resolve_legacy_format(&header.pixel_format)
                .ok_or(DdsError::InvalidDds("unresolvable legacy pixel format"))?
        }
    };

    if depth == 0 {
        return Err(DdsError::InvalidDds("zero depth"));
    }

    if depth > 1 {
        if width > MAX_VOLUME_EXTENT || height > MAX_VOLUME_EXTENT || depth > MAX_VOLUME_EXTENT {
            return Err(DdsError::InvalidDds("volume extent exceeds ceiling"));
        }
    } else if width > MAX_TEXTURE_EXTENT || height > MAX_TEXTURE_EXTENT {
        return Err(DdsError::InvalidDds("extent exceeds ceiling"));
    }
    if array_size > MAX_ARRAY_SIZE {
        return Err(DdsError::InvalidDds("array size exceeds ceiling"));
    }

    Ok(ResolvedShape {
        format,
        width,
        height,
        depth,
        mip_count,
        array_size,
        is_cubemap,
    })
}

/// Parse an in-memory DDS container.
///
/// On success, `dest[..subresource_count]` holds one entry per array layer
/// x mip x depth slice (array-major, then mip, then depth slice) and the
/// texel payload sits in a single reservation from `allocator`. On any
/// error, `dest` and the allocator are left without observable effects
/// (the one possible scratch reservation is never referenced).
pub fn parse_dds<A: ScratchAllocator>(
    bytes: &[u8],
    dest: &mut [Subresource],
    allocator: &mut A,
    options: &DdsLoadOptions,
) -> Result<DdsTexture, DdsError> {
    if bytes.len() as u64 > options.max_file_bytes {
        return Err(DdsError::FileTooBig {
            len: bytes.len() as u64,
            max: options.max_file_bytes,
        });
    }

    let mut r = Reader::new(bytes);
    let magic = r
        .read_u32()
        .ok_or(DdsError::InvalidHeader("truncated magic"))?;
    if magic != DDS_MAGIC {
        return Err(DdsError::InvalidHeader("magic mismatch"));
    }

    let header = DdsHeader::parse(&mut r)?;
    let dx10 = if header.pixel_format.has_dx10_header() {
        Some(Dx10Header::parse(&mut r)?)
    } else {
        None
    };

    let shape = resolve_shape(&header, dx10.as_ref())?;

    // Capacity contract: the destination must hold the full
    // mips x layers x base-depth product, checked before any write.
    let required_capacity = (shape.array_size as u64)
        .checked_mul(u64::from(shape.mip_count))
        .and_then(|n| n.checked_mul(u64::from(shape.depth)))
        .ok_or(DdsError::InvalidDds("subresource count overflow"))?;
    if (dest.len() as u64) < required_capacity {
        return Err(DdsError::Unknown("destination subresource capacity too small"));
    }

    // First pass: total payload size, without touching the body.
    let mut total_bytes = 0u64;
    {
        let (mut w, mut h, mut d) = (shape.width, shape.height, shape.depth);
        for _mip in 0..shape.mip_count {
            let layout = surface_layout(w, h, shape.format)
                .map_err(|_| DdsError::InvalidDds("format lost during layout"))?;
            let mip_bytes = layout
                .slice_pitch_bytes
                .checked_mul(u64::from(d))
                .ok_or(DdsError::InvalidDds("layout size overflow"))?;
            total_bytes = total_bytes
                .checked_add(mip_bytes)
                .ok_or(DdsError::InvalidDds("layout size overflow"))?;
            w = mip_extent(w, 1);
            h = mip_extent(h, 1);
            d = mip_extent(d, 1);
        }
        total_bytes = total_bytes
            .checked_mul(u64::from(shape.array_size))
            .ok_or(DdsError::InvalidDds("layout size overflow"))?;
    }

    let body = r.remaining();
    if (body.len() as u64) < total_bytes {
        return Err(DdsError::InvalidDds("body shorter than computed layout"));
    }

    let total_usize = usize::try_from(total_bytes)
        .map_err(|_| DdsError::Unknown("payload exceeds address space"))?;
    let (base_offset, scratch) = allocator
        .alloc(total_usize, SCRATCH_ALIGN)
        .ok_or(DdsError::AllocFailed {
            requested: total_bytes,
        })?;

    // The container body is tightly packed in exactly the emission order,
    // so the payload moves in one copy and offsets follow arithmetically.
    scratch.copy_from_slice(&body[..total_usize]);

    let mut offset = base_offset;
    let mut emitted = 0usize;
    for layer in 0..shape.array_size {
        let (mut w, mut h, mut d) = (shape.width, shape.height, shape.depth);
        for mip in 0..shape.mip_count {
            let layout = surface_layout(w, h, shape.format)
                .map_err(|_| DdsError::InvalidDds("format lost during layout"))?;
            for z in 0..d {
                dest[emitted] = Subresource {
                    data_offset: offset,
                    row_pitch_bytes: layout.row_pitch_bytes,
                    slice_pitch_bytes: layout.slice_pitch_bytes,
                    mip_level: mip as u16,
                    array_layer: layer,
                    depth_slice: z,
                };
                offset += layout.slice_pitch_bytes as usize;
                emitted += 1;
            }
            w = mip_extent(w, 1);
            h = mip_extent(h, 1);
            d = mip_extent(d, 1);
        }
    }

    Ok(DdsTexture {
        format: shape.format,
        width: shape.width,
        height: shape.height,
        depth: shape.depth,
        mip_count: shape.mip_count as u16,
        array_size: shape.array_size,
        is_cubemap: shape.is_cubemap,
        subresource_count: emitted as u32,
    })
}

/// Load a DDS container from disk.
///
/// The declared file size is checked against the configured ceiling before
/// the body is read; the file handle is released on every exit path.
pub fn load_dds<A: ScratchAllocator>(
    path: impl AsRef<Path>,
    dest: &mut [Subresource],
    allocator: &mut A,
    options: &DdsLoadOptions,
) -> Result<DdsTexture, DdsError> {
    let path = path.as_ref();
    let meta = std::fs::metadata(path).map_err(DdsError::FileNotFound)?;
    if meta.len() > options.max_file_bytes {
        return Err(DdsError::FileTooBig {
            len: meta.len(),
            max: options.max_file_bytes,
        });
    }

    let bytes = std::fs::read(path).map_err(DdsError::FileNotFound)?;
    parse_dds(&bytes, dest, allocator, options)
}

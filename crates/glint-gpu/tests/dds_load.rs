//! End-to-end DDS ingestion tests over synthesized containers.

use glint_format::{mip_extent, surface_layout, DxgiFormat};
use glint_gpu::{
    load_dds, parse_dds, DdsError, DdsLoadOptions, ScratchArena, Subresource,
};

const FLAG_FOUR_CC: u32 = 0x4;
const FLAG_RGB: u32 = 0x40;
const FLAG_ALPHA_PIXELS: u32 = 0x1;

const CAPS2_CUBEMAP_ALL: u32 = 0x200 | 0x400 | 0x800 | 0x1000 | 0x2000 | 0x4000 | 0x8000;
const CAPS2_VOLUME: u32 = 0x20_0000;

const DIM_TEXTURE2D: u32 = 3;
const DIM_TEXTURE3D: u32 = 4;
const MISC_TEXTURE_CUBE: u32 = 0x4;

struct PixelFormatDesc {
    flags: u32,
    four_cc: [u8; 4],
    bit_count: u32,
    masks: (u32, u32, u32, u32),
}

impl PixelFormatDesc {
    fn four_cc(cc: [u8; 4]) -> Self {
        Self {
            flags: FLAG_FOUR_CC,
            four_cc: cc,
            bit_count: 0,
            masks: (0, 0, 0, 0),
        }
    }

    fn bgra32() -> Self {
        Self {
            flags: FLAG_RGB | FLAG_ALPHA_PIXELS,
            four_cc: [0; 4],
            bit_count: 32,
            masks: (0xff_0000, 0xff00, 0xff, 0xff00_0000),
        }
    }
}

fn push_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn write_header(
    out: &mut Vec<u8>,
    width: u32,
    height: u32,
    depth: u32,
    mips: u32,
    caps2: u32,
    pf: &PixelFormatDesc,
) {
    out.extend_from_slice(b"DDS ");
    push_u32(out, 124); // header size
    push_u32(out, 0x1 | 0x2 | 0x4 | 0x1000); // caps | height | width | pixel format
    push_u32(out, height);
    push_u32(out, width);
    push_u32(out, 0); // pitch_or_linear_size
    push_u32(out, depth);
    push_u32(out, mips);
    for _ in 0..11 {
        push_u32(out, 0); // reserved
    }
    push_u32(out, 32); // pixel format size
    push_u32(out, pf.flags);
    out.extend_from_slice(&pf.four_cc);
    push_u32(out, pf.bit_count);
    push_u32(out, pf.masks.0);
    push_u32(out, pf.masks.1);
    push_u32(out, pf.masks.2);
    push_u32(out, pf.masks.3);
    push_u32(out, 0x1000); // caps: texture
    push_u32(out, caps2);
    for _ in 0..3 {
        push_u32(out, 0); // caps3, caps4, reserved2
    }
}

/// Payload bytes in emission order: layer-major, then mip, then slice.
fn append_payload(
    out: &mut Vec<u8>,
    format: DxgiFormat,
    width: u32,
    height: u32,
    depth: u32,
    mips: u32,
    layers: u32,
) {
    let mut counter = 0u64;
    for _layer in 0..layers {
        let (mut w, mut h, mut d) = (width, height, depth);
        for _mip in 0..mips {
            let layout = surface_layout(w, h, format).unwrap();
            let mip_bytes = layout.slice_pitch_bytes * u64::from(d);
            for _ in 0..mip_bytes {
                out.push((counter % 251) as u8);
                counter += 1;
            }
            w = mip_extent(w, 1);
            h = mip_extent(h, 1);
            d = mip_extent(d, 1);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn dx10_container(
    format: DxgiFormat,
    dimension: u32,
    width: u32,
    height: u32,
    depth: u32,
    mips: u32,
    array_size: u32,
    misc_flag: u32,
) -> Vec<u8> {
    let caps2 = if depth > 1 { CAPS2_VOLUME } else { 0 };
    let mut out = Vec::new();
    write_header(
        &mut out,
        width,
        height,
        depth,
        mips,
        caps2,
        &PixelFormatDesc::four_cc(*b"DX10"),
    );
    push_u32(&mut out, format as u32);
    push_u32(&mut out, dimension);
    push_u32(&mut out, misc_flag);
    push_u32(&mut out, array_size);
    push_u32(&mut out, 0); // misc_flags2

    let layers = if misc_flag & MISC_TEXTURE_CUBE != 0 {
        array_size * 6
    } else {
        array_size
    };
    append_payload(&mut out, format, width, height, depth, mips, layers);
    out
}

fn legacy_container(
    pf: &PixelFormatDesc,
    format: DxgiFormat,
    width: u32,
    height: u32,
    mips: u32,
    caps2: u32,
) -> Vec<u8> {
    let layers = if caps2 & 0x200 != 0 { 6 } else { 1 };
    let mut out = Vec::new();
    write_header(&mut out, width, height, 1, mips, caps2, pf);
    append_payload(&mut out, format, width, height, 1, mips, layers);
    out
}

fn parse(
    bytes: &[u8],
    dest_len: usize,
    arena_capacity: usize,
) -> (Result<glint_gpu::DdsTexture, DdsError>, Vec<Subresource>, ScratchArena) {
    let mut dest = vec![Subresource::default(); dest_len];
    let mut arena = ScratchArena::with_capacity(arena_capacity);
    let result = parse_dds(bytes, &mut dest, &mut arena, &DdsLoadOptions::default());
    (result, dest, arena)
}

#[test]
fn two_mip_rgba8_round_trip() {
    let bytes = dx10_container(DxgiFormat::R8G8B8A8Unorm, DIM_TEXTURE2D, 8, 4, 1, 2, 1, 0);
    let (result, dest, arena) = parse(&bytes, 2, 4096);
    let tex = result.unwrap();

    assert_eq!(tex.format, DxgiFormat::R8G8B8A8Unorm);
    assert_eq!((tex.width, tex.height, tex.depth), (8, 4, 1));
    assert_eq!((tex.mip_count, tex.array_size), (2, 1));
    assert!(!tex.is_cubemap);
    assert_eq!(tex.subresource_count, 2);

    // Pitches match the layout calculator.
    assert_eq!(dest[0].row_pitch_bytes, 32);
    assert_eq!(dest[0].slice_pitch_bytes, 128);
    assert_eq!(dest[1].row_pitch_bytes, 16);
    assert_eq!(dest[1].slice_pitch_bytes, 32);
    assert_eq!(dest[1].data_offset, dest[0].data_offset + 128);

    // Texel bytes land in the arena exactly as written.
    let body = &bytes[bytes.len() - 160..];
    let copied = &arena.bytes()[dest[0].data_offset..dest[0].data_offset + 160];
    assert_eq!(copied, body);
}

#[test]
fn cubemap_emits_layer_major_order() {
    let bytes = dx10_container(
        DxgiFormat::R8G8B8A8Unorm,
        DIM_TEXTURE2D,
        4,
        4,
        1,
        2,
        1,
        MISC_TEXTURE_CUBE,
    );
    let (result, dest, _arena) = parse(&bytes, 12, 4096);
    let tex = result.unwrap();

    assert!(tex.is_cubemap);
    assert_eq!(tex.array_size, 6);
    assert_eq!(tex.subresource_count, 12);
    for (i, sub) in dest.iter().enumerate() {
        assert_eq!(sub.array_layer, (i / 2) as u32);
        assert_eq!(sub.mip_level, (i % 2) as u16);
        assert_eq!(sub.depth_slice, 0);
    }
}

#[test]
fn volume_depth_halves_per_mip() {
    let bytes = dx10_container(DxgiFormat::R8G8B8A8Unorm, DIM_TEXTURE3D, 8, 8, 4, 3, 1, 0);
    let (result, dest, _arena) = parse(&bytes, 16, 8192);
    let tex = result.unwrap();

    assert_eq!(tex.depth, 4);
    // 4 + 2 + 1 slices across the three mips.
    assert_eq!(tex.subresource_count, 7);

    let expected: [(u16, u32); 7] = [(0, 0), (0, 1), (0, 2), (0, 3), (1, 0), (1, 1), (2, 0)];
    for (sub, (mip, slice)) in dest.iter().zip(expected) {
        assert_eq!((sub.mip_level, sub.depth_slice), (mip, slice));
        assert_eq!(sub.array_layer, 0);
    }

    // Consecutive slices are slice-pitch apart.
    assert_eq!(
        dest[1].data_offset,
        dest[0].data_offset + dest[0].slice_pitch_bytes as usize
    );
}

#[test]
fn legacy_dxt1_resolves_and_pitches() {
    let bytes = legacy_container(
        &PixelFormatDesc::four_cc(*b"DXT1"),
        DxgiFormat::Bc1Unorm,
        8,
        8,
        2,
        0,
    );
    let (result, dest, _arena) = parse(&bytes, 2, 1024);
    let tex = result.unwrap();

    assert_eq!(tex.format, DxgiFormat::Bc1Unorm);
    // 8x8 BC1: two blocks per row, 8 bytes each, two block rows.
    assert_eq!(dest[0].row_pitch_bytes, 16);
    assert_eq!(dest[0].slice_pitch_bytes, 32);
    // 4x4 mip: one block.
    assert_eq!(dest[1].row_pitch_bytes, 8);
    assert_eq!(dest[1].slice_pitch_bytes, 8);
}

#[test]
fn legacy_cubemap_via_caps2() {
    let bytes = legacy_container(
        &PixelFormatDesc::four_cc(*b"DXT5"),
        DxgiFormat::Bc3Unorm,
        4,
        4,
        1,
        CAPS2_CUBEMAP_ALL,
    );
    let (result, _dest, _arena) = parse(&bytes, 6, 1024);
    let tex = result.unwrap();

    assert_eq!(tex.format, DxgiFormat::Bc3Unorm);
    assert!(tex.is_cubemap);
    assert_eq!(tex.array_size, 6);
}

#[test]
fn legacy_partial_cubemap_is_rejected() {
    // Cubemap flag without all six face bits.
    let bytes = legacy_container(
        &PixelFormatDesc::four_cc(*b"DXT1"),
        DxgiFormat::Bc1Unorm,
        4,
        4,
        1,
        0x200 | 0x400,
    );
    let (result, _dest, _arena) = parse(&bytes, 6, 1024);
    assert!(matches!(result, Err(DdsError::InvalidDds(_))));
}

#[test]
fn legacy_bit_masks_resolve_bgra() {
    let bytes = legacy_container(
        &PixelFormatDesc::bgra32(),
        DxgiFormat::B8G8R8A8Unorm,
        4,
        2,
        1,
        0,
    );
    let (result, _dest, _arena) = parse(&bytes, 1, 256);
    assert_eq!(result.unwrap().format, DxgiFormat::B8G8R8A8Unorm);
}

#[test]
fn bad_magic_is_invalid_header() {
    let mut bytes = dx10_container(DxgiFormat::R8G8B8A8Unorm, DIM_TEXTURE2D, 4, 4, 1, 1, 1, 0);
    bytes[..4].copy_from_slice(b"XXXX");
    let (result, _dest, _arena) = parse(&bytes, 1, 1024);
    assert!(matches!(result, Err(DdsError::InvalidHeader(_))));
}

#[test]
fn wrong_header_size_is_invalid_header() {
    let mut bytes = dx10_container(DxgiFormat::R8G8B8A8Unorm, DIM_TEXTURE2D, 4, 4, 1, 1, 1, 0);
    bytes[4..8].copy_from_slice(&120u32.to_le_bytes());
    let (result, _dest, _arena) = parse(&bytes, 1, 1024);
    assert!(matches!(result, Err(DdsError::InvalidHeader(_))));
}

#[test]
fn mip_ceiling_is_enforced() {
    let bytes = dx10_container(DxgiFormat::R8G8B8A8Unorm, DIM_TEXTURE2D, 4, 4, 1, 16, 1, 0);
    let (result, _dest, _arena) = parse(&bytes, 64, 4096);
    assert!(matches!(result, Err(DdsError::InvalidDds(_))));
}

#[test]
fn short_body_is_invalid_and_writes_nothing() {
    let mut bytes = dx10_container(DxgiFormat::R8G8B8A8Unorm, DIM_TEXTURE2D, 8, 4, 1, 2, 1, 0);
    bytes.pop();
    let (result, dest, _arena) = parse(&bytes, 2, 4096);
    assert!(matches!(result, Err(DdsError::InvalidDds(_))));
    // No partial output.
    assert!(dest.iter().all(|s| *s == Subresource::default()));
}

#[test]
fn oversize_container_is_rejected_before_parsing() {
    let bytes = dx10_container(DxgiFormat::R8G8B8A8Unorm, DIM_TEXTURE2D, 8, 8, 1, 1, 1, 0);
    let mut dest = vec![Subresource::default(); 1];
    let mut arena = ScratchArena::with_capacity(1024);
    let options = DdsLoadOptions { max_file_bytes: 16 };
    let result = parse_dds(&bytes, &mut dest, &mut arena, &options);
    match result {
        Err(DdsError::FileTooBig { len, max }) => {
            assert_eq!(len, bytes.len() as u64);
            assert_eq!(max, 16);
        }
        other => panic!("expected FileTooBig, got {other:?}"),
    }
}

#[test]
fn exhausted_arena_is_alloc_failed() {
    let bytes = dx10_container(DxgiFormat::R8G8B8A8Unorm, DIM_TEXTURE2D, 8, 8, 1, 1, 1, 0);
    let (result, _dest, _arena) = parse(&bytes, 1, 16);
    match result {
        Err(DdsError::AllocFailed { requested }) => assert_eq!(requested, 256),
        other => panic!("expected AllocFailed, got {other:?}"),
    }
}

#[test]
fn short_destination_is_reported_before_any_write() {
    let bytes = dx10_container(DxgiFormat::R8G8B8A8Unorm, DIM_TEXTURE2D, 8, 4, 1, 2, 1, 0);
    let (result, dest, arena) = parse(&bytes, 1, 4096);
    assert!(matches!(result, Err(DdsError::Unknown(_))));
    assert_eq!(dest[0], Subresource::default());
    assert_eq!(arena.remaining(), arena.capacity());
}

#[test]
fn missing_file_is_file_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let mut dest = vec![Subresource::default(); 1];
    let mut arena = ScratchArena::with_capacity(64);
    let result = load_dds(
        dir.path().join("missing.dds"),
        &mut dest,
        &mut arena,
        &DdsLoadOptions::default(),
    );
    assert!(matches!(result, Err(DdsError::FileNotFound(_))));
}

#[test]
fn file_load_matches_in_memory_parse() {
    let bytes = dx10_container(DxgiFormat::Bc7Unorm, DIM_TEXTURE2D, 16, 16, 1, 3, 2, 0);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("probe.dds");
    std::fs::write(&path, &bytes).unwrap();

    let options = DdsLoadOptions::default();
    let mut file_dest = vec![Subresource::default(); 6];
    let mut file_arena = ScratchArena::with_capacity(4096);
    let from_file = load_dds(&path, &mut file_dest, &mut file_arena, &options).unwrap();

    let (in_memory, mem_dest, mem_arena) = parse(&bytes, 6, 4096);
    assert_eq!(from_file, in_memory.unwrap());
    assert_eq!(file_dest, mem_dest);
    assert_eq!(file_arena.bytes(), mem_arena.bytes());
}

#[test]
fn file_over_ceiling_is_rejected_by_metadata() {
    let bytes = dx10_container(DxgiFormat::R8G8B8A8Unorm, DIM_TEXTURE2D, 8, 8, 1, 1, 1, 0);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.dds");
    std::fs::write(&path, &bytes).unwrap();

    let mut dest = vec![Subresource::default(); 1];
    let mut arena = ScratchArena::with_capacity(1024);
    let options = DdsLoadOptions { max_file_bytes: 32 };
    let result = load_dds(&path, &mut dest, &mut arena, &options);
    assert!(matches!(result, Err(DdsError::FileTooBig { .. })));
}

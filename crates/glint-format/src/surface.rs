//! Surface layout calculator.
//!
//! Given one mip level's extent and a format, computes the row pitch,
//! slice size, and row count the CPU side needs to walk texel memory.
//! These are tight (unpadded) layouts; upload-heap padding is applied by
//! the allocation-info calculator, not here.

use thiserror::Error;

use crate::format::DxgiFormat;

/// Byte layout of a single 2D slice of one mip level.
///
/// Valid only for the `(width, height, format)` triple that produced it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SurfaceLayout {
    /// Bytes per row of blocks (or texels for uncompressed formats).
    pub row_pitch_bytes: u64,
    /// Total bytes for one 2D slice: `row_pitch_bytes * row_count`.
    pub slice_pitch_bytes: u64,
    /// Number of rows of blocks (or texel rows).
    pub row_count: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
#[error("unsupported pixel format {0:?}")]
pub struct UnsupportedFormat(pub DxgiFormat);

/// Extent of `v` at `level` mips below the base. Never less than 1.
pub fn mip_extent(v: u32, level: u32) -> u32 {
    v.checked_shr(level).unwrap_or(0).max(1)
}

/// Compute the layout of one mip level.
///
/// Block-compressed formats round the extent up to whole blocks, so any
/// positive extent yields `row_count >= 1` and at least one block per row
/// (degenerate tail mips smaller than a block still occupy a full block).
pub fn surface_layout(
    width: u32,
    height: u32,
    format: DxgiFormat,
) -> Result<SurfaceLayout, UnsupportedFormat> {
    let info = format.info();
    if info.bytes_per_block == 0 {
        return Err(UnsupportedFormat(format));
    }

    let (row_pitch_bytes, row_count) = if info.is_compressed {
        let blocks_wide = width.div_ceil(info.block_width).max(1);
        let blocks_high = height.div_ceil(info.block_height).max(1);
        (
            u64::from(blocks_wide) * u64::from(info.bytes_per_block),
            blocks_high,
        )
    } else if info.is_packed {
        // Two horizontal pixels per element; odd widths round up.
        let elements = u64::from(width.div_ceil(2).max(1));
        (elements * u64::from(info.bytes_per_block), height.max(1))
    } else {
        // Bits-per-row rounded up to whole bytes covers sub-byte and
        // irregular bit depths.
        let bits = u64::from(width.max(1)) * u64::from(info.bits_per_pixel);
        (bits.div_ceil(8), height.max(1))
    };

    Ok(SurfaceLayout {
        row_pitch_bytes,
        slice_pitch_bytes: row_pitch_bytes * u64::from(row_count),
        row_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncompressed_rgba8() {
        let layout = surface_layout(256, 128, DxgiFormat::R8G8B8A8Unorm).unwrap();
        assert_eq!(layout.row_pitch_bytes, 256 * 4);
        assert_eq!(layout.row_count, 128);
        assert_eq!(layout.slice_pitch_bytes, 256 * 4 * 128);
    }

    #[test]
    fn bc_degenerate_mip_rounds_to_whole_blocks() {
        // 5x5 BC3: 2x2 blocks of 16 bytes.
        let layout = surface_layout(5, 5, DxgiFormat::Bc3Unorm).unwrap();
        assert_eq!(layout.row_pitch_bytes, 2 * 16);
        assert_eq!(layout.row_count, 2);
        assert_eq!(layout.slice_pitch_bytes, 64);

        // A 1x1 tail mip still occupies one full block.
        let tail = surface_layout(1, 1, DxgiFormat::Bc1Unorm).unwrap();
        assert_eq!(tail.row_pitch_bytes, 8);
        assert_eq!(tail.row_count, 1);
    }

    #[test]
    fn packed_rows_round_odd_widths_up() {
        let layout = surface_layout(5, 3, DxgiFormat::Yuy2).unwrap();
        assert_eq!(layout.row_pitch_bytes, 3 * 4);
        assert_eq!(layout.row_count, 3);
    }

    #[test]
    fn doubling_width_doubles_pitch_within_rounding() {
        for format in [
            DxgiFormat::R8G8B8A8Unorm,
            DxgiFormat::B5G6R5Unorm,
            DxgiFormat::Bc1Unorm,
            DxgiFormat::Bc7Unorm,
        ] {
            let w = 64;
            let a = surface_layout(w, 64, format).unwrap();
            let b = surface_layout(w * 2, 64, format).unwrap();
            assert_eq!(b.row_pitch_bytes, a.row_pitch_bytes * 2, "{format:?}");
            assert!(a.row_count >= 1);
        }
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert_eq!(
            surface_layout(4, 4, DxgiFormat::Unknown),
            Err(UnsupportedFormat(DxgiFormat::Unknown))
        );
    }

    #[test]
    fn mip_extent_clamps_to_one() {
        assert_eq!(mip_extent(256, 0), 256);
        assert_eq!(mip_extent(256, 3), 32);
        assert_eq!(mip_extent(256, 9), 1);
        assert_eq!(mip_extent(1, 31), 1);
        assert_eq!(mip_extent(7, 40), 1);
    }
}

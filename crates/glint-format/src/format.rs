//! Pixel format registry.
//!
//! [`DxgiFormat`] uses the DXGI numeric values so the enum can be read
//! directly out of a DDS extended header. Lookups fail closed: an
//! unrecognized word resolves to [`DxgiFormat::Unknown`], whose
//! [`FormatInfo`] is the all-zero sentinel.

/// Pixel formats understood by the resource layer.
///
/// The set covers everything the legacy DDS pixel-format descriptor can
/// resolve to, the common extended-header formats, all BC families, depth
/// formats, and the packed pair formats.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DxgiFormat {
    Unknown = 0,
    R32G32B32A32Float = 2,
    R32G32B32Float = 6,
    R16G16B16A16Float = 10,
    R16G16B16A16Unorm = 11,
    R32G32Float = 16,
    R10G10B10A2Unorm = 24,
    R11G11B10Float = 26,
    R8G8B8A8Unorm = 28,
    R8G8B8A8UnormSrgb = 29,
    R8G8B8A8Snorm = 31,
    R16G16Float = 34,
    R16G16Unorm = 35,
    R16G16Snorm = 37,
    D32Float = 40,
    R32Float = 41,
    R32Uint = 42,
    D24UnormS8Uint = 45,
    R8G8Unorm = 49,
    R8G8Snorm = 51,
    R16Float = 54,
    D16Unorm = 55,
    R16Unorm = 56,
    R16Snorm = 58,
    R8Unorm = 61,
    R8Snorm = 63,
    A8Unorm = 65,
    R9G9B9E5SharedExp = 67,
    R8G8B8G8Unorm = 68,
    G8R8G8B8Unorm = 69,
    Bc1Unorm = 71,
    Bc1UnormSrgb = 72,
    Bc2Unorm = 74,
    Bc2UnormSrgb = 75,
    Bc3Unorm = 77,
    Bc3UnormSrgb = 78,
    Bc4Unorm = 80,
    Bc4Snorm = 81,
    Bc5Unorm = 83,
    Bc5Snorm = 84,
    B5G6R5Unorm = 85,
    B5G5R5A1Unorm = 86,
    B8G8R8A8Unorm = 87,
    B8G8R8X8Unorm = 88,
    B8G8R8A8UnormSrgb = 91,
    B8G8R8X8UnormSrgb = 93,
    Bc6hUf16 = 95,
    Bc6hSf16 = 96,
    Bc7Unorm = 98,
    Bc7UnormSrgb = 99,
    Yuy2 = 107,
    B4G4R4A4Unorm = 115,
}

/// Byte-layout attributes of one [`DxgiFormat`].
///
/// For block-compressed formats `block_width`/`block_height` describe the
/// pixel footprint of one block and `bytes_per_block` its storage; for
/// everything else the block is 1x1 and `bytes_per_block` is the texel
/// size. Packed formats store two horizontal pixels per element and are
/// pitched with the packed row rule instead of `bits_per_pixel`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FormatInfo {
    pub bits_per_pixel: u32,
    pub block_width: u32,
    pub block_height: u32,
    pub bytes_per_block: u32,
    pub is_compressed: bool,
    pub is_packed: bool,
    pub is_srgb: bool,
}

impl FormatInfo {
    const UNKNOWN: FormatInfo = FormatInfo {
        bits_per_pixel: 0,
        block_width: 0,
        block_height: 0,
        bytes_per_block: 0,
        is_compressed: false,
        is_packed: false,
        is_srgb: false,
    };

    const fn uncompressed(bits_per_pixel: u32, is_srgb: bool) -> FormatInfo {
        FormatInfo {
            bits_per_pixel,
            block_width: 1,
            block_height: 1,
            bytes_per_block: bits_per_pixel / 8,
            is_compressed: false,
            is_packed: false,
            is_srgb,
        }
    }

    const fn block_compressed(bytes_per_block: u32, is_srgb: bool) -> FormatInfo {
        FormatInfo {
            // 4x4 pixels per block.
            bits_per_pixel: bytes_per_block / 2,
            block_width: 4,
            block_height: 4,
            bytes_per_block,
            is_compressed: true,
            is_packed: false,
            is_srgb,
        }
    }

    const fn packed_pair() -> FormatInfo {
        FormatInfo {
            bits_per_pixel: 16,
            block_width: 1,
            block_height: 1,
            // One 4-byte element per two horizontal pixels.
            bytes_per_block: 4,
            is_compressed: false,
            is_packed: true,
            is_srgb: false,
        }
    }
}

impl DxgiFormat {
    /// Decode a format word from an extended DDS header.
    ///
    /// Fails closed: anything outside the registry maps to `Unknown`.
    pub fn from_u32(word: u32) -> Self {
        use DxgiFormat::*;
        const ALL: &[DxgiFormat] = &[
            R32G32B32A32Float,
            R32G32B32Float,
            R16G16B16A16Float,
            R16G16B16A16Unorm,
            R32G32Float,
            R10G10B10A2Unorm,
            R11G11B10Float,
            R8G8B8A8Unorm,
            R8G8B8A8UnormSrgb,
            R8G8B8A8Snorm,
            R16G16Float,
            R16G16Unorm,
            R16G16Snorm,
            D32Float,
            R32Float,
            R32Uint,
            D24UnormS8Uint,
            R8G8Unorm,
            R8G8Snorm,
            R16Float,
            D16Unorm,
            R16Unorm,
            R16Snorm,
            R8Unorm,
            R8Snorm,
            A8Unorm,
            R9G9B9E5SharedExp,
            R8G8B8G8Unorm,
            G8R8G8B8Unorm,
            Bc1Unorm,
            Bc1UnormSrgb,
            Bc2Unorm,
            Bc2UnormSrgb,
            Bc3Unorm,
            Bc3UnormSrgb,
            Bc4Unorm,
            Bc4Snorm,
            Bc5Unorm,
            Bc5Snorm,
            B5G6R5Unorm,
            B5G5R5A1Unorm,
            B8G8R8A8Unorm,
            B8G8R8X8Unorm,
            B8G8R8A8UnormSrgb,
            B8G8R8X8UnormSrgb,
            Bc6hUf16,
            Bc6hSf16,
            Bc7Unorm,
            Bc7UnormSrgb,
            Yuy2,
            B4G4R4A4Unorm,
        ];
        ALL.iter()
            .copied()
            .find(|f| *f as u32 == word)
            .unwrap_or(Unknown)
    }

    /// Layout attributes for this format. Total over the enum.
    pub fn info(self) -> FormatInfo {
        use DxgiFormat::*;
        match self {
            Unknown => FormatInfo::UNKNOWN,

            R32G32B32A32Float => FormatInfo::uncompressed(128, false),
            R32G32B32Float => FormatInfo::uncompressed(96, false),
            R16G16B16A16Float | R16G16B16A16Unorm | R32G32Float => {
                FormatInfo::uncompressed(64, false)
            }
            R10G10B10A2Unorm | R11G11B10Float | R8G8B8A8Unorm | R8G8B8A8Snorm | R16G16Float
            | R16G16Unorm | R16G16Snorm | D32Float | R32Float | R32Uint | D24UnormS8Uint
            | R9G9B9E5SharedExp | B8G8R8A8Unorm | B8G8R8X8Unorm => {
                FormatInfo::uncompressed(32, false)
            }
            R8G8B8A8UnormSrgb | B8G8R8A8UnormSrgb | B8G8R8X8UnormSrgb => {
                FormatInfo::uncompressed(32, true)
            }
            R8G8Unorm | R8G8Snorm | R16Float | D16Unorm | R16Unorm | R16Snorm | B5G6R5Unorm
            | B5G5R5A1Unorm | B4G4R4A4Unorm => FormatInfo::uncompressed(16, false),
            R8Unorm | R8Snorm | A8Unorm => FormatInfo::uncompressed(8, false),

            R8G8B8G8Unorm | G8R8G8B8Unorm | Yuy2 => FormatInfo::packed_pair(),

            Bc1Unorm | Bc4Unorm | Bc4Snorm => FormatInfo::block_compressed(8, false),
            Bc1UnormSrgb => FormatInfo::block_compressed(8, true),
            Bc2Unorm | Bc3Unorm | Bc5Unorm | Bc5Snorm | Bc6hUf16 | Bc6hSf16 | Bc7Unorm => {
                FormatInfo::block_compressed(16, false)
            }
            Bc2UnormSrgb | Bc3UnormSrgb | Bc7UnormSrgb => FormatInfo::block_compressed(16, true),
        }
    }

    /// Map an sRGB format to its linear counterpart.
    ///
    /// Identity for non-sRGB formats, and idempotent. Used to normalize
    /// cache keys where gamma does not participate in identity.
    pub fn strip_srgb(self) -> Self {
        use DxgiFormat::*;
        match self {
            R8G8B8A8UnormSrgb => R8G8B8A8Unorm,
            B8G8R8A8UnormSrgb => B8G8R8A8Unorm,
            B8G8R8X8UnormSrgb => B8G8R8X8Unorm,
            Bc1UnormSrgb => Bc1Unorm,
            Bc2UnormSrgb => Bc2Unorm,
            Bc3UnormSrgb => Bc3Unorm,
            Bc7UnormSrgb => Bc7Unorm,
            other => other,
        }
    }

    pub fn is_srgb(self) -> bool {
        self.info().is_srgb
    }

    pub fn is_compressed(self) -> bool {
        self.info().is_compressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u32_round_trips_known_formats() {
        for word in 0..140u32 {
            let format = DxgiFormat::from_u32(word);
            if format != DxgiFormat::Unknown {
                assert_eq!(format as u32, word);
            }
        }
    }

    #[test]
    fn from_u32_fails_closed() {
        assert_eq!(DxgiFormat::from_u32(1), DxgiFormat::Unknown);
        assert_eq!(DxgiFormat::from_u32(133), DxgiFormat::Unknown);
        assert_eq!(DxgiFormat::from_u32(u32::MAX), DxgiFormat::Unknown);
        assert_eq!(DxgiFormat::Unknown.info(), FormatInfo::UNKNOWN);
    }

    #[test]
    fn block_compressed_geometry() {
        let bc1 = DxgiFormat::Bc1Unorm.info();
        assert_eq!((bc1.block_width, bc1.block_height), (4, 4));
        assert_eq!(bc1.bytes_per_block, 8);
        assert_eq!(bc1.bits_per_pixel, 4);

        let bc7 = DxgiFormat::Bc7UnormSrgb.info();
        assert_eq!(bc7.bytes_per_block, 16);
        assert!(bc7.is_compressed);
        assert!(bc7.is_srgb);
    }

    #[test]
    fn strip_srgb_is_idempotent() {
        for word in 0..140u32 {
            let format = DxgiFormat::from_u32(word);
            let once = format.strip_srgb();
            assert_eq!(once.strip_srgb(), once);
            assert!(!once.is_srgb());
        }
    }

    #[test]
    fn strip_srgb_preserves_layout() {
        let srgb = DxgiFormat::Bc3UnormSrgb;
        let linear = srgb.strip_srgb();
        assert_eq!(linear, DxgiFormat::Bc3Unorm);
        assert_eq!(srgb.info().bytes_per_block, linear.info().bytes_per_block);
    }
}

//! Pixel format identification.
//!
//! [`InternalFormat`] is a flat tag for a channel layout + sample type pair.
//! Its numeric values follow the DXGI format numbering (with the same gap
//! between 115 and 130), so DX10-extended containers can be resolved by
//! value; treat the numbers as ABI.

use std::fmt;

/// Normalized pixel format of a loaded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum InternalFormat {
    #[default]
    Undefined = 0,
    R32G32B32A32Typeless = 1,
    R32G32B32A32Sfloat = 2,
    R32G32B32A32Uint = 3,
    R32G32B32A32Sint = 4,
    R32G32B32Typeless = 5,
    R32G32B32Sfloat = 6,
    R32G32B32Uint = 7,
    R32G32B32Sint = 8,
    R16G16B16A16Typeless = 9,
    R16G16B16A16Sfloat = 10,
    R16G16B16A16Unorm = 11,
    R16G16B16A16Uint = 12,
    R16G16B16A16Snorm = 13,
    R16G16B16A16Sint = 14,
    R32G32Typeless = 15,
    R32G32Sfloat = 16,
    R32G32Uint = 17,
    R32G32Sint = 18,
    R32G8X24Typeless = 19,
    D32SfloatS8X24Uint = 20,
    R32SfloatX8X24Typeless = 21,
    X32TypelessG8X24Uint = 22,
    R10G10B10A2Typeless = 23,
    R10G10B10A2Unorm = 24,
    R10G10B10A2Uint = 25,
    R11G11B10Sfloat = 26,
    R8G8B8A8Typeless = 27,
    R8G8B8A8Unorm = 28,
    R8G8B8A8Srgb = 29,
    R8G8B8A8Uint = 30,
    R8G8B8A8Snorm = 31,
    R8G8B8A8Sint = 32,
    R16G16Typeless = 33,
    R16G16Sfloat = 34,
    R16G16Unorm = 35,
    R16G16Uint = 36,
    R16G16Snorm = 37,
    R16G16Sint = 38,
    R32Typeless = 39,
    D32Sfloat = 40,
    R32Sfloat = 41,
    R32Uint = 42,
    R32Sint = 43,
    R24G8Typeless = 44,
    D24UnormS8Uint = 45,
    R24UnormX8Typeless = 46,
    X24TypelessG8Uint = 47,
    R8G8Typeless = 48,
    R8G8Unorm = 49,
    R8G8Uint = 50,
    R8G8Snorm = 51,
    R8G8Sint = 52,
    R16Typeless = 53,
    R16Sfloat = 54,
    D16Unorm = 55,
    R16Unorm = 56,
    R16Uint = 57,
    R16Snorm = 58,
    R16Sint = 59,
    R8Typeless = 60,
    R8Unorm = 61,
    R8Uint = 62,
    R8Snorm = 63,
    R8Sint = 64,
    A8Unorm = 65,
    R1Unorm = 66,
    R9G9B9E5Ufloat = 67,
    R8G8B8G8Unorm = 68,
    G8R8G8B8Unorm = 69,
    Bc1Typeless = 70,
    Bc1Unorm = 71,
    Bc1Srgb = 72,
    Bc2Typeless = 73,
    Bc2Unorm = 74,
    Bc2Srgb = 75,
    Bc3Typeless = 76,
    Bc3Unorm = 77,
    Bc3Srgb = 78,
    Bc4Typeless = 79,
    Bc4Unorm = 80,
    Bc4Snorm = 81,
    Bc5Typeless = 82,
    Bc5Unorm = 83,
    Bc5Snorm = 84,
    B5G6R5Unorm = 85,
    B5G5R5A1Unorm = 86,
    B8G8R8A8Unorm = 87,
    B8G8R8X8Unorm = 88,
    R10G10B10XrBiasA2Unorm = 89,
    B8G8R8A8Typeless = 90,
    B8G8R8A8Srgb = 91,
    B8G8R8X8Typeless = 92,
    B8G8R8X8Srgb = 93,
    Bc6hTypeless = 94,
    Bc6hUfloat = 95,
    Bc6hSfloat = 96,
    Bc7Typeless = 97,
    Bc7Unorm = 98,
    Bc7Srgb = 99,
    Ayuv = 100,
    Y410 = 101,
    Y416 = 102,
    Nv12 = 103,
    P010 = 104,
    P016 = 105,
    Yuv420Opaque = 106,
    Yuy2 = 107,
    Y210 = 108,
    Y216 = 109,
    Nv11 = 110,
    Ai44 = 111,
    Ia44 = 112,
    P8 = 113,
    A8P8 = 114,
    B4G4R4A4Unorm = 115,
    P208 = 130,
    V208 = 131,
    V408 = 132,
}

impl InternalFormat {
    /// Largest value in the numbering.
    pub const MAX: u32 = 132;

    /// Resolve a raw format number (e.g. a DXGI format field).
    pub fn from_u32(value: u32) -> Option<Self> {
        use InternalFormat::*;
        Some(match value {
            0 => Undefined,
            1 => R32G32B32A32Typeless,
            2 => R32G32B32A32Sfloat,
            3 => R32G32B32A32Uint,
            4 => R32G32B32A32Sint,
            5 => R32G32B32Typeless,
            6 => R32G32B32Sfloat,
            7 => R32G32B32Uint,
            8 => R32G32B32Sint,
            9 => R16G16B16A16Typeless,
            10 => R16G16B16A16Sfloat,
            11 => R16G16B16A16Unorm,
            12 => R16G16B16A16Uint,
            13 => R16G16B16A16Snorm,
            14 => R16G16B16A16Sint,
            15 => R32G32Typeless,
            16 => R32G32Sfloat,
            17 => R32G32Uint,
            18 => R32G32Sint,
            19 => R32G8X24Typeless,
            20 => D32SfloatS8X24Uint,
            21 => R32SfloatX8X24Typeless,
            22 => X32TypelessG8X24Uint,
            23 => R10G10B10A2Typeless,
            24 => R10G10B10A2Unorm,
            25 => R10G10B10A2Uint,
            26 => R11G11B10Sfloat,
            27 => R8G8B8A8Typeless,
            28 => R8G8B8A8Unorm,
            29 => R8G8B8A8Srgb,
            30 => R8G8B8A8Uint,
            31 => R8G8B8A8Snorm,
            32 => R8G8B8A8Sint,
            33 => R16G16Typeless,
            34 => R16G16Sfloat,
            35 => R16G16Unorm,
            36 => R16G16Uint,
            37 => R16G16Snorm,
            38 => R16G16Sint,
            39 => R32Typeless,
            40 => D32Sfloat,
            41 => R32Sfloat,
            42 => R32Uint,
            43 => R32Sint,
            44 => R24G8Typeless,
            45 => D24UnormS8Uint,
            46 => R24UnormX8Typeless,
            47 => X24TypelessG8Uint,
            48 => R8G8Typeless,
            49 => R8G8Unorm,
            50 => R8G8Uint,
            51 => R8G8Snorm,
            52 => R8G8Sint,
            53 => R16Typeless,
            54 => R16Sfloat,
            55 => D16Unorm,
            56 => R16Unorm,
            57 => R16Uint,
            58 => R16Snorm,
            59 => R16Sint,
            60 => R8Typeless,
            61 => R8Unorm,
            62 => R8Uint,
            63 => R8Snorm,
            64 => R8Sint,
            65 => A8Unorm,
            66 => R1Unorm,
            67 => R9G9B9E5Ufloat,
            68 => R8G8B8G8Unorm,
            69 => G8R8G8B8Unorm,
            70 => Bc1Typeless,
            71 => Bc1Unorm,
            72 => Bc1Srgb,
            73 => Bc2Typeless,
            74 => Bc2Unorm,
            75 => Bc2Srgb,
            76 => Bc3Typeless,
            77 => Bc3Unorm,
            78 => Bc3Srgb,
            79 => Bc4Typeless,
            80 => Bc4Unorm,
            81 => Bc4Snorm,
            82 => Bc5Typeless,
            83 => Bc5Unorm,
            84 => Bc5Snorm,
            85 => B5G6R5Unorm,
            86 => B5G5R5A1Unorm,
            87 => B8G8R8A8Unorm,
            88 => B8G8R8X8Unorm,
            89 => R10G10B10XrBiasA2Unorm,
            90 => B8G8R8A8Typeless,
            91 => B8G8R8A8Srgb,
            92 => B8G8R8X8Typeless,
            93 => B8G8R8X8Srgb,
            94 => Bc6hTypeless,
            95 => Bc6hUfloat,
            96 => Bc6hSfloat,
            97 => Bc7Typeless,
            98 => Bc7Unorm,
            99 => Bc7Srgb,
            100 => Ayuv,
            101 => Y410,
            102 => Y416,
            103 => Nv12,
            104 => P010,
            105 => P016,
            106 => Yuv420Opaque,
            107 => Yuy2,
            108 => Y210,
            109 => Y216,
            110 => Nv11,
            111 => Ai44,
            112 => Ia44,
            113 => P8,
            114 => A8P8,
            115 => B4G4R4A4Unorm,
            130 => P208,
            131 => V208,
            132 => V408,
            _ => return None,
        })
    }

    /// Numeric format value (stable ABI, DXGI-compatible).
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// True for the block-compressed (BCn) family.
    pub fn is_compressed(self) -> bool {
        matches!(
            self.as_u32(),
            70..=84 | 94..=99 // BC1-BC5, BC6H, BC7 including typeless/sRGB
        )
    }

    /// True for formats with sRGB-encoded color channels.
    pub fn is_srgb(self) -> bool {
        use InternalFormat::*;
        matches!(
            self,
            R8G8B8A8Srgb | B8G8R8A8Srgb | B8G8R8X8Srgb | Bc1Srgb | Bc2Srgb | Bc3Srgb | Bc7Srgb
        )
    }

    /// True for depth and depth-stencil formats.
    pub fn is_depth_stencil(self) -> bool {
        use InternalFormat::*;
        matches!(
            self,
            R32G8X24Typeless
                | D32SfloatS8X24Uint
                | R32SfloatX8X24Typeless
                | X32TypelessG8X24Uint
                | R24G8Typeless
                | D24UnormS8Uint
                | R24UnormX8Typeless
                | X24TypelessG8Uint
                | D32Sfloat
                | D16Unorm
        )
    }

    /// Block footprint in texels: (4, 4) for BCn formats, (1, 1) otherwise.
    pub fn block_dimensions(self) -> (u32, u32) {
        if self.is_compressed() {
            (4, 4)
        } else {
            (1, 1)
        }
    }

    /// Bytes per block for compressed formats, bytes per texel otherwise.
    ///
    /// Returns `None` for planar, packed-YUV and palettized formats, whose
    /// storage is not a flat per-texel layout.
    pub fn block_size(self) -> Option<u32> {
        use InternalFormat::*;
        let size = match self {
            Bc1Typeless | Bc1Unorm | Bc1Srgb | Bc4Typeless | Bc4Unorm | Bc4Snorm => 8,
            Bc2Typeless | Bc2Unorm | Bc2Srgb | Bc3Typeless | Bc3Unorm | Bc3Srgb | Bc5Typeless
            | Bc5Unorm | Bc5Snorm | Bc6hTypeless | Bc6hUfloat | Bc6hSfloat | Bc7Typeless
            | Bc7Unorm | Bc7Srgb => 16,
            R32G32B32A32Typeless | R32G32B32A32Sfloat | R32G32B32A32Uint | R32G32B32A32Sint => 16,
            R32G32B32Typeless | R32G32B32Sfloat | R32G32B32Uint | R32G32B32Sint => 12,
            R16G16B16A16Typeless | R16G16B16A16Sfloat | R16G16B16A16Unorm | R16G16B16A16Uint
            | R16G16B16A16Snorm | R16G16B16A16Sint | R32G32Typeless | R32G32Sfloat | R32G32Uint
            | R32G32Sint | R32G8X24Typeless | D32SfloatS8X24Uint | R32SfloatX8X24Typeless
            | X32TypelessG8X24Uint => 8,
            R10G10B10A2Typeless | R10G10B10A2Unorm | R10G10B10A2Uint | R11G11B10Sfloat
            | R8G8B8A8Typeless | R8G8B8A8Unorm | R8G8B8A8Srgb | R8G8B8A8Uint | R8G8B8A8Snorm
            | R8G8B8A8Sint | R16G16Typeless | R16G16Sfloat | R16G16Unorm | R16G16Uint
            | R16G16Snorm | R16G16Sint | R32Typeless | D32Sfloat | R32Sfloat | R32Uint
            | R32Sint | R24G8Typeless | D24UnormS8Uint | R24UnormX8Typeless
            | X24TypelessG8Uint | R9G9B9E5Ufloat | R8G8B8G8Unorm | G8R8G8B8Unorm
            | B8G8R8A8Unorm | B8G8R8X8Unorm | R10G10B10XrBiasA2Unorm | B8G8R8A8Typeless
            | B8G8R8A8Srgb | B8G8R8X8Typeless | B8G8R8X8Srgb => 4,
            R8G8Typeless | R8G8Unorm | R8G8Uint | R8G8Snorm | R8G8Sint | R16Typeless
            | R16Sfloat | D16Unorm | R16Unorm | R16Uint | R16Snorm | R16Sint | B5G6R5Unorm
            | B5G5R5A1Unorm | B4G4R4A4Unorm => 2,
            R8Typeless | R8Unorm | R8Uint | R8Snorm | R8Sint | A8Unorm => 1,
            Undefined | R1Unorm | Ayuv | Y410 | Y416 | Nv12 | P010 | P016 | Yuv420Opaque
            | Yuy2 | Y210 | Y216 | Nv11 | Ai44 | Ia44 | P8 | A8P8 | P208 | V208 | V408 => {
                return None
            }
        };
        Some(size)
    }
}

impl fmt::Display for InternalFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// How the alpha channel of a texture is meant to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum AlphaMode {
    #[default]
    Unknown = 0,
    Straight = 1,
    Premultiplied = 2,
    Opaque = 3,
    Custom = 4,
}

impl AlphaMode {
    pub fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => AlphaMode::Unknown,
            1 => AlphaMode::Straight,
            2 => AlphaMode::Premultiplied,
            3 => AlphaMode::Opaque,
            4 => AlphaMode::Custom,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbering_is_dxgi_compatible() {
        assert_eq!(InternalFormat::R8G8B8A8Unorm.as_u32(), 28);
        assert_eq!(InternalFormat::A8Unorm.as_u32(), 65);
        assert_eq!(InternalFormat::Bc1Unorm.as_u32(), 71);
        assert_eq!(InternalFormat::Bc6hUfloat.as_u32(), 95);
        assert_eq!(InternalFormat::Bc7Unorm.as_u32(), 98);
        assert_eq!(InternalFormat::B4G4R4A4Unorm.as_u32(), 115);
        assert_eq!(InternalFormat::V408.as_u32(), 132);
    }

    #[test]
    fn test_from_u32_round_trips() {
        for value in 0..=InternalFormat::MAX {
            if let Some(format) = InternalFormat::from_u32(value) {
                assert_eq!(format.as_u32(), value);
            } else {
                // The only gap in the numbering.
                assert!((116..130).contains(&value));
            }
        }
        assert_eq!(InternalFormat::from_u32(133), None);
    }

    #[test]
    fn test_compression_classification() {
        assert!(InternalFormat::Bc1Unorm.is_compressed());
        assert!(InternalFormat::Bc7Srgb.is_compressed());
        assert!(!InternalFormat::R8G8B8A8Unorm.is_compressed());
        assert!(!InternalFormat::B5G6R5Unorm.is_compressed());
        assert_eq!(InternalFormat::Bc1Unorm.block_size(), Some(8));
        assert_eq!(InternalFormat::Bc7Unorm.block_size(), Some(16));
        assert_eq!(InternalFormat::Bc1Unorm.block_dimensions(), (4, 4));
        assert_eq!(InternalFormat::R8Unorm.block_dimensions(), (1, 1));
        assert_eq!(InternalFormat::Nv12.block_size(), None);
    }

    #[test]
    fn test_alpha_mode_resolution() {
        assert_eq!(AlphaMode::from_u32(1), Some(AlphaMode::Straight));
        assert_eq!(AlphaMode::from_u32(4), Some(AlphaMode::Custom));
        assert_eq!(AlphaMode::from_u32(5), None);
    }
}

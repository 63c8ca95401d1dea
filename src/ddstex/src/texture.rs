//! Loaded texture descriptions and mip-chain layout.

use std::borrow::Cow;

use crate::format::{AlphaMode, InternalFormat};

/// Width, height and depth of a texture level, in texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent3 {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

/// Byte distances between consecutive rows (`y`) and slices (`z`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pitch {
    pub y: u32,
    pub z: u32,
}

/// Which cubemap faces a texture carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CubeFaces {
    /// Number of faces present (0, or up to 6).
    pub num: u8,
    /// OR of the face bits below.
    pub mask: u8,
}

impl CubeFaces {
    pub const POS_X: u8 = 0x01;
    pub const NEG_X: u8 = 0x02;
    pub const POS_Y: u8 = 0x04;
    pub const NEG_Y: u8 = 0x08;
    pub const POS_Z: u8 = 0x10;
    pub const NEG_Z: u8 = 0x20;
    pub const ALL: u8 = 0x3F;

    /// True when all six faces are present.
    pub fn is_complete(self) -> bool {
        self.mask & Self::ALL == Self::ALL
    }
}

/// Layout of one mip level within a texture's payload.
///
/// Offsets are relative to the start of the backing memory; faces of a
/// cubemap are consecutive array slices in +X, -X, +Y, -Y, +Z, -Z order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MipInfo {
    pub offset: u64,
    pub nbytes: u32,
    pub size: Extent3,
    pub pitch: Pitch,
}

/// Everything the container header says about a texture, minus the bytes.
#[derive(Debug, Clone, Default)]
pub(crate) struct TextureDesc {
    pub offset0: u32,
    pub nbytes: u32,
    pub size: Extent3,
    pub pitch: Pitch,
    pub arraylen: u32,
    pub nmiplevels: u32,
    pub dimension: u8,
    pub cubefaces: CubeFaces,
    pub alphamode: AlphaMode,
    pub isvolume: bool,
    pub iformat: InternalFormat,
}

/// A parsed texture: normalized description plus the backing file bytes.
///
/// Loading from memory borrows the caller's bytes; loading from a file owns
/// the buffer read from disk. Owned memory is released on drop.
#[derive(Debug)]
pub struct Texture<'a> {
    memory: Cow<'a, [u8]>,
    /// Byte offset of mip 0 of array slice 0.
    pub offset0: u32,
    /// Bytes in one mip-0 slice.
    pub nbytes: u32,
    /// Mip-0 dimensions.
    pub size: Extent3,
    /// Mip-0 row and slice pitch.
    pub pitch: Pitch,
    /// Number of array elements (1 unless a DX10 header says otherwise).
    pub arraylen: u32,
    /// Number of mip levels.
    pub nmiplevels: u32,
    /// 1, 2 or 3.
    pub dimension: u8,
    pub cubefaces: CubeFaces,
    pub alphamode: AlphaMode,
    /// Legacy volume-texture cap; DX10 files express this via `dimension`.
    pub isvolume: bool,
    pub iformat: InternalFormat,
}

impl<'a> Texture<'a> {
    pub(crate) fn from_parts(memory: Cow<'a, [u8]>, desc: TextureDesc) -> Self {
        Self {
            memory,
            offset0: desc.offset0,
            nbytes: desc.nbytes,
            size: desc.size,
            pitch: desc.pitch,
            arraylen: desc.arraylen,
            nmiplevels: desc.nmiplevels,
            dimension: desc.dimension,
            cubefaces: desc.cubefaces,
            alphamode: desc.alphamode,
            isvolume: desc.isvolume,
            iformat: desc.iformat,
        }
    }

    /// The raw file bytes backing this texture.
    pub fn data(&self) -> &[u8] {
        &self.memory
    }

    /// Fill `out` with the mip levels of array slice `textureidx` and return
    /// how many were written (at most `nmiplevels`).
    ///
    /// Each level halves every dimension (floored at 1); offsets are
    /// cumulative, and array slices are spaced by the byte size of one full
    /// mip chain.
    pub fn get_mipmaps(&self, out: &mut [MipInfo], textureidx: u32) -> usize {
        let count = (self.nmiplevels as usize).min(out.len());

        let mut level = MipInfo {
            offset: 0,
            nbytes: self.nbytes,
            size: self.size,
            pitch: self.pitch,
        };
        // Walk the full chain even when `out` is short so the array-slice
        // stride always covers every level.
        for i in 0..self.nmiplevels as usize {
            if i < count {
                out[i] = level;
            }
            level.offset += u64::from(level.nbytes);
            level.size.x = (level.size.x >> 1).max(1);
            level.size.y = (level.size.y >> 1).max(1);
            level.size.z = (level.size.z >> 1).max(1);
            level.pitch.y = (level.pitch.y >> 1).max(1);
            level.pitch.z = level.size.y * level.pitch.y;
            level.nbytes = level.size.z * level.pitch.z;
        }

        // `level.offset` has accumulated the total chain size.
        let slice_stride = level.offset;
        for info in &mut out[..count] {
            info.offset += u64::from(self.offset0) + u64::from(textureidx) * slice_stride;
        }
        count
    }

    /// The mip levels of array slice `textureidx` as a vector.
    pub fn mipmaps(&self, textureidx: u32) -> Vec<MipInfo> {
        let mut out = vec![MipInfo::default(); self.nmiplevels as usize];
        let count = self.get_mipmaps(&mut out, textureidx);
        out.truncate(count);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture_with(desc: TextureDesc) -> Texture<'static> {
        Texture::from_parts(Cow::Owned(Vec::new()), desc)
    }

    fn base_desc() -> TextureDesc {
        TextureDesc {
            offset0: 128,
            nbytes: 64 * 64 * 4,
            size: Extent3 { x: 64, y: 64, z: 1 },
            pitch: Pitch { y: 64 * 4, z: 64 * 64 * 4 },
            arraylen: 1,
            nmiplevels: 7,
            dimension: 2,
            iformat: InternalFormat::R8G8B8A8Unorm,
            ..TextureDesc::default()
        }
    }

    #[test]
    fn test_mip_sizes_halve_down_to_one() {
        let tex = texture_with(base_desc());
        let mips = tex.mipmaps(0);
        assert_eq!(mips.len(), 7);
        for (i, mip) in mips.iter().enumerate() {
            assert_eq!(mip.size.x, (64 >> i).max(1));
            assert_eq!(mip.size.y, (64 >> i).max(1));
            assert_eq!(mip.size.z, 1);
            assert_eq!(mip.pitch.z, mip.size.y * mip.pitch.y);
            assert_eq!(mip.nbytes, mip.size.z * mip.pitch.z);
        }
        assert_eq!(mips[6].size, Extent3 { x: 1, y: 1, z: 1 });
    }

    #[test]
    fn test_mip_offsets_are_cumulative() {
        let tex = texture_with(base_desc());
        let mips = tex.mipmaps(0);
        assert_eq!(mips[0].offset, 128);
        for pair in mips.windows(2) {
            assert_eq!(pair[1].offset, pair[0].offset + u64::from(pair[0].nbytes));
        }
    }

    #[test]
    fn test_array_slices_are_spaced_by_full_chain() {
        let mut desc = base_desc();
        desc.arraylen = 4;
        let tex = texture_with(desc);
        let chain: u64 = tex.mipmaps(0).iter().map(|m| u64::from(m.nbytes)).sum();
        let first = tex.mipmaps(0);
        let second = tex.mipmaps(1);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(b.offset, a.offset + chain);
        }
    }

    #[test]
    fn test_truncated_output_keeps_full_slice_stride() {
        let mut desc = base_desc();
        desc.arraylen = 2;
        let tex = texture_with(desc);
        let chain: u64 = tex.mipmaps(0).iter().map(|m| u64::from(m.nbytes)).sum();
        let mut out = [MipInfo::default(); 2];
        assert_eq!(tex.get_mipmaps(&mut out, 1), 2);
        assert_eq!(out[0].offset, 128 + chain);
    }

    #[test]
    fn test_cube_face_mask_helpers() {
        let all = CubeFaces { num: 6, mask: CubeFaces::ALL };
        assert!(all.is_complete());
        assert_eq!(all.mask.count_ones(), 6);
        let partial = CubeFaces { num: 1, mask: CubeFaces::POS_Y };
        assert!(!partial.is_complete());
    }
}

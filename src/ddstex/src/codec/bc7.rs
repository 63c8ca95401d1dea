//! BC7 blocks: LDR RGBA with 8 modes, up to 3 subsets, optional P-bits,
//! channel rotation and dual index streams.

use super::bits::get_bits_u8;
use super::color::{expand_rgba, interpolate64_rgba, Rgba8};
use super::tables::{weights_for, ANCHORS2, ANCHORS3, PARTITIONS2, PARTITIONS3};

struct ModeInfo {
    subsets: u8,
    partition_bits: u8,
    rotation_bits: u8,
    index_selection_bits: u8,
    color_bits: u8,
    alpha_bits: u8,
    /// Per-endpoint P-bits (mutually exclusive with `shared_pbits`).
    endpoint_pbits: u8,
    /// One P-bit shared by each endpoint pair.
    shared_pbits: u8,
    index_bits: u8,
    index2_bits: u8,
}

const MODE_INFO: [ModeInfo; 8] = [
    ModeInfo { subsets: 3, partition_bits: 4, rotation_bits: 0, index_selection_bits: 0, color_bits: 4, alpha_bits: 0, endpoint_pbits: 1, shared_pbits: 0, index_bits: 3, index2_bits: 0 },
    ModeInfo { subsets: 2, partition_bits: 6, rotation_bits: 0, index_selection_bits: 0, color_bits: 6, alpha_bits: 0, endpoint_pbits: 0, shared_pbits: 1, index_bits: 3, index2_bits: 0 },
    ModeInfo { subsets: 3, partition_bits: 6, rotation_bits: 0, index_selection_bits: 0, color_bits: 5, alpha_bits: 0, endpoint_pbits: 0, shared_pbits: 0, index_bits: 2, index2_bits: 0 },
    ModeInfo { subsets: 2, partition_bits: 6, rotation_bits: 0, index_selection_bits: 0, color_bits: 7, alpha_bits: 0, endpoint_pbits: 1, shared_pbits: 0, index_bits: 2, index2_bits: 0 },
    ModeInfo { subsets: 1, partition_bits: 0, rotation_bits: 2, index_selection_bits: 1, color_bits: 5, alpha_bits: 6, endpoint_pbits: 0, shared_pbits: 0, index_bits: 2, index2_bits: 3 },
    ModeInfo { subsets: 1, partition_bits: 0, rotation_bits: 2, index_selection_bits: 0, color_bits: 7, alpha_bits: 8, endpoint_pbits: 0, shared_pbits: 0, index_bits: 2, index2_bits: 2 },
    ModeInfo { subsets: 1, partition_bits: 0, rotation_bits: 0, index_selection_bits: 0, color_bits: 7, alpha_bits: 7, endpoint_pbits: 1, shared_pbits: 0, index_bits: 4, index2_bits: 0 },
    ModeInfo { subsets: 2, partition_bits: 6, rotation_bits: 0, index_selection_bits: 0, color_bits: 5, alpha_bits: 5, endpoint_pbits: 1, shared_pbits: 0, index_bits: 2, index2_bits: 0 },
];

/// Read `2 * subsets` endpoint colors: the R fields of every endpoint come
/// first, then G, then B, then the alpha fields, then the P-bits (one per
/// endpoint, or one per pair when shared).
fn read_endpoints(
    colors: &mut [Rgba8],
    block: &[u8],
    offset: usize,
    cbits: usize,
    abits: usize,
    pbits: usize,
    pshared: bool,
) {
    let n = colors.len();
    for (i, color) in colors.iter_mut().enumerate() {
        color.r = get_bits_u8(block, offset + (i) * cbits, cbits) << pbits;
        color.g = get_bits_u8(block, offset + (n + i) * cbits, cbits) << pbits;
        color.b = get_bits_u8(block, offset + (2 * n + i) * cbits, cbits) << pbits;
        color.a = if abits > 0 {
            get_bits_u8(block, offset + 3 * n * cbits + i * abits, abits) << pbits
        } else {
            0xFF
        };
    }
    if pbits > 0 {
        let pbase = offset + (3 * cbits + abits) * n;
        let or_pbit = |color: &mut Rgba8, p: u8| {
            color.r |= p;
            color.g |= p;
            color.b |= p;
            color.a |= p;
        };
        if pshared {
            for i in 0..n / 2 {
                let p = get_bits_u8(block, pbase + i * pbits, pbits);
                or_pbit(&mut colors[2 * i], p);
                or_pbit(&mut colors[2 * i + 1], p);
            }
        } else {
            for (i, color) in colors.iter_mut().enumerate() {
                let p = get_bits_u8(block, pbase + i * pbits, pbits);
                or_pbit(color, p);
            }
        }
    }
}

/// Decode a BC7 block into 4x4 RGBA8 texels.
///
/// The mode is the position of the first set bit of byte 0; a zero byte is
/// an invalid encoding and produces an all-zero block.
pub fn decompress_bc7_block(dst: &mut [u8], stride_x: usize, pitch_y: usize, block: &[u8]) {
    let mode = block[0].trailing_zeros() as usize;
    if mode >= 8 {
        for y in 0..4 {
            for x in 0..4 {
                let offset = y * pitch_y + x * stride_x;
                dst[offset..offset + 4].fill(0);
            }
        }
        return;
    }

    let info = &MODE_INFO[mode];
    let pbits = usize::from(if info.endpoint_pbits != 0 {
        info.endpoint_pbits
    } else {
        info.shared_pbits
    });
    let subsets = usize::from(info.subsets);
    let cbits = usize::from(info.color_bits);
    let abits = usize::from(info.alpha_bits);
    let ib = usize::from(info.index_bits);
    let ib2 = usize::from(info.index2_bits);

    let mut offset = mode + 1;
    let partition_set_id = if info.partition_bits > 0 {
        usize::from(get_bits_u8(block, offset, usize::from(info.partition_bits)))
    } else {
        0
    };
    offset += usize::from(info.partition_bits);
    let rotation = get_bits_u8(block, offset, usize::from(info.rotation_bits));
    offset += usize::from(info.rotation_bits);
    let index_selection = usize::from(get_bits_u8(block, offset, usize::from(info.index_selection_bits)));
    offset += usize::from(info.index_selection_bits);

    let mut colors = [Rgba8::default(); 6];
    read_endpoints(
        &mut colors[..2 * subsets],
        block,
        offset,
        cbits,
        abits,
        pbits,
        info.shared_pbits != 0,
    );
    for color in colors.iter_mut().take(2 * subsets) {
        let effective = (cbits + pbits) as u32;
        let alpha_effective = if abits > 0 { (abits + pbits) as u32 } else { 8 };
        *color = expand_rgba(*color, effective, effective, effective, alpha_effective);
    }

    let weights = [
        weights_for(ib),
        if ib2 > 0 { weights_for(ib2) } else { weights_for(ib) },
    ];

    let mut index_offset = offset
        + subsets * (2 * (3 * cbits + abits + usize::from(info.endpoint_pbits)) + usize::from(info.shared_pbits));
    let mut index2_offset = index_offset + subsets * (16 * ib - 1);

    for y in 0..4 {
        for x in 0..4 {
            let i = y * 4 + x;
            let (subset, anchor) = match subsets {
                3 => {
                    let s = ((PARTITIONS3[partition_set_id] >> (2 * i)) & 3) as usize;
                    let anchor = if s != 0 {
                        usize::from(ANCHORS3[s - 1][partition_set_id])
                    } else {
                        0
                    };
                    (s, anchor)
                }
                2 => {
                    let s = usize::from((PARTITIONS2[partition_set_id] >> i) & 1);
                    let anchor = if s != 0 {
                        usize::from(ANCHORS2[partition_set_id])
                    } else {
                        0
                    };
                    (s, anchor)
                }
                _ => (0, 0),
            };

            let count = ib - usize::from(i == anchor);
            let mut indices = [usize::from(get_bits_u8(block, index_offset, count)), 0];
            index_offset += count;
            if ib2 > 0 {
                let count2 = ib2 - usize::from(i == anchor);
                indices[1] = usize::from(get_bits_u8(block, index2_offset, count2));
                index2_offset += count2;
            } else {
                indices[1] = indices[0];
            }

            let low = colors[2 * subset];
            let high = colors[2 * subset + 1];
            let cweight = weights[index_selection][indices[index_selection]];
            let aweight = weights[1 - index_selection][indices[1 - index_selection]];
            let mut color = interpolate64_rgba(low, high, cweight, aweight);

            match rotation {
                1 => std::mem::swap(&mut color.a, &mut color.r),
                2 => std::mem::swap(&mut color.a, &mut color.g),
                3 => std::mem::swap(&mut color.a, &mut color.b),
                _ => {}
            }

            let out = y * pitch_y + x * stride_x;
            dst[out] = color.r;
            dst[out + 1] = color.g;
            dst[out + 2] = color.b;
            dst[out + 3] = color.a;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(block: &[u8; 16]) -> [u8; 64] {
        let mut dst = [0u8; 64];
        decompress_bc7_block(&mut dst, 4, 16, block);
        dst
    }

    #[test]
    fn test_invalid_mode_byte_decodes_to_zero() {
        let mut block = [0xFFu8; 16];
        block[0] = 0x00;
        assert_eq!(decode(&block), [0u8; 64]);
    }

    #[test]
    fn test_mode_is_first_set_bit() {
        assert_eq!(0b0000_0001u8.trailing_zeros(), 0);
        assert_eq!(0b0100_0000u8.trailing_zeros(), 6);
        // A set low bit wins over any higher bits.
        assert_eq!(0b1111_1111u8.trailing_zeros(), 0);
    }

    #[test]
    fn test_mode5_solid_color() {
        // Mode 5: selector bit 5 set, rotation 0. Endpoint fields: 7-bit
        // RGB pairs then 8-bit alpha pairs. All-ones color fields with both
        // endpoints equal decode to a solid opaque color.
        let mut block = [0u8; 16];
        block[0] = 0b0010_0000;
        // Color fields occupy bits 8..50 (6 fields x 7 bits); alphas
        // bits 50..66.
        for bit in 8..66 {
            block[bit / 8] |= 1 << (bit % 8);
        }
        let out = decode(&block);
        for texel in out.chunks(4) {
            assert_eq!(texel, [0xFF, 0xFF, 0xFF, 0xFF]);
        }
    }

    #[test]
    fn test_mode5_rotation_swaps_alpha_into_red() {
        let mut block = [0u8; 16];
        block[0] = 0b0010_0000;
        // Rotation field (2 bits at bit 6) = 1: swap alpha and red.
        block[0] |= 0b0100_0000;
        // Red endpoints max, alpha endpoints zero.
        for bit in 8..22 {
            block[bit / 8] |= 1 << (bit % 8);
        }
        let out = decode(&block);
        for texel in out.chunks(4) {
            // Red (0xFF) lands in alpha, alpha (0x00) lands in red.
            assert_eq!(texel, [0x00, 0x00, 0x00, 0xFF]);
        }
    }

    #[test]
    fn test_mode6_pbit_contributes_low_bit() {
        // Mode 6: 7-bit channels with a per-endpoint P-bit. The endpoint
        // fields R0 R1 G0 G1 B0 B1 A0 A1 occupy bits 7..63, so the two
        // P-bits sit at bits 63 and 64. Zero color fields with both P-bits
        // set make every channel (0 << 1) | 1 = 1 at 8 effective bits.
        let mut block = [0u8; 16];
        block[0] = 0b0100_0000;
        block[63 / 8] |= 1 << (63 % 8);
        block[64 / 8] |= 1 << (64 % 8);
        let out = decode(&block);
        for texel in out.chunks(4) {
            assert_eq!(texel, [0x01, 0x01, 0x01, 0x01]);
        }
    }

    #[test]
    fn test_anchor_index_width_reduction() {
        // Mode 1 (2 subsets, 3-bit indices): the anchor texel of each subset
        // stores one fewer bit. With partition 0, subset 1's anchor is texel
        // 15 (the last), so the total index payload is 16*3 - 2 = 46 bits,
        // filling the block exactly to bit 128.
        let header = 2 + 6; // mode selector + partition bits
        let endpoints = 2 * (2 * 3 * 6) + 2; // color fields + shared P-bits
        let indices = 16 * 3 - 2;
        assert_eq!(header + endpoints + indices, 128);
        assert_eq!(usize::from(ANCHORS2[0]), 15);
    }

    #[test]
    fn test_decoder_is_pure() {
        let mut block = [0u8; 16];
        block[0] = 0b0010_0000;
        block[5] = 0xA5;
        block[11] = 0x3C;
        assert_eq!(decode(&block), decode(&block));
    }
}

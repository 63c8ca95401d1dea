//! BC6H blocks: HDR RGB with quantized, optionally delta-coded endpoints.
//!
//! A block is 128 bits holding a mode selector, up to four endpoint triples
//! scattered through mode-specific bit positions, an optional partition id,
//! and a tail of per-texel indices. Output is three little-endian half-floats
//! per texel; `is_signed` selects the signed variant of the format.

use super::bits::{get_bits_u32, words_from_le_bytes};
use super::color::{interpolate64_rgb16, sign_extend16, Rgb16};
use super::tables::{weights_for, ANCHORS2, PARTITIONS2};

const R: u8 = 0;
const G: u8 = 1;
const B: u8 = 2;

/// One endpoint-field assignment:
/// `endpoints[e].c[channel] |= stream_bits(offset, count) << shift`.
///
/// Fields stored bit-reversed in the stream appear as runs of single-bit
/// rows with descending shifts.
type FieldRule = (u8, u8, u8, u8, u8); // (endpoint, channel, offset, count, shift)

struct ModeInfo {
    /// Endpoints 1..3 are stored as deltas against endpoint 0.
    transformed: bool,
    partition_bits: u8,
    endpoint_bits: u8,
    /// Delta field widths per channel, indexed `[r, g, b]`.
    delta_bits: [u8; 3],
    fields: &'static [FieldRule],
}

static MODE0: ModeInfo = ModeInfo {
    transformed: true,
    partition_bits: 5,
    endpoint_bits: 10,
    delta_bits: [5, 5, 5],
    fields: &[
        (2, G, 2, 1, 4),
        (2, B, 3, 1, 4),
        (3, B, 4, 1, 4),
        (0, R, 5, 10, 0),
        (0, G, 15, 10, 0),
        (0, B, 25, 10, 0),
        (1, R, 35, 5, 0),
        (3, G, 40, 1, 4),
        (2, G, 41, 4, 0),
        (1, G, 45, 5, 0),
        (3, B, 50, 1, 0),
        (3, G, 51, 4, 0),
        (1, B, 55, 5, 0),
        (3, B, 60, 1, 1),
        (2, B, 61, 4, 0),
        (2, R, 65, 5, 0),
        (3, B, 70, 1, 2),
        (3, R, 71, 5, 0),
        (3, B, 76, 1, 3),
    ],
};

static MODE1: ModeInfo = ModeInfo {
    transformed: true,
    partition_bits: 5,
    endpoint_bits: 7,
    delta_bits: [6, 6, 6],
    fields: &[
        (2, G, 2, 1, 5),
        (3, G, 3, 1, 4),
        (3, G, 4, 1, 5),
        (0, R, 5, 7, 0),
        (3, B, 12, 1, 0),
        (3, B, 13, 1, 1),
        (2, B, 14, 1, 4),
        (0, G, 15, 7, 0),
        (2, B, 22, 1, 5),
        (3, B, 23, 1, 2),
        (2, G, 24, 1, 4),
        (0, B, 25, 7, 0),
        (3, B, 32, 1, 3),
        (3, B, 33, 1, 5),
        (3, B, 34, 1, 4),
        (1, R, 35, 6, 0),
        (2, G, 41, 4, 0),
        (1, G, 45, 6, 0),
        (3, G, 51, 4, 0),
        (1, B, 55, 6, 0),
        (2, B, 61, 4, 0),
        (2, R, 65, 6, 0),
        (3, R, 71, 6, 0),
    ],
};

static MODE2: ModeInfo = ModeInfo {
    transformed: true,
    partition_bits: 5,
    endpoint_bits: 11,
    delta_bits: [5, 4, 4],
    fields: &[
        (0, R, 5, 10, 0),
        (0, G, 15, 10, 0),
        (0, B, 25, 10, 0),
        (1, R, 35, 5, 0),
        (0, R, 40, 1, 10),
        (2, G, 41, 4, 0),
        (1, G, 45, 4, 0),
        (0, G, 49, 1, 10),
        (3, B, 50, 1, 0),
        (3, G, 51, 4, 0),
        (1, B, 55, 4, 0),
        (0, B, 59, 1, 10),
        (3, B, 60, 1, 1),
        (2, B, 61, 4, 0),
        (2, R, 65, 5, 0),
        (3, B, 70, 1, 2),
        (3, R, 71, 5, 0),
        (3, B, 76, 1, 3),
    ],
};

static MODE3: ModeInfo = ModeInfo {
    transformed: false,
    partition_bits: 0,
    endpoint_bits: 10,
    delta_bits: [10, 10, 10],
    fields: &[
        (0, R, 5, 10, 0),
        (0, G, 15, 10, 0),
        (0, B, 25, 10, 0),
        (1, R, 35, 10, 0),
        (1, G, 45, 10, 0),
        (1, B, 55, 10, 0),
    ],
};

static MODE6: ModeInfo = ModeInfo {
    transformed: true,
    partition_bits: 5,
    endpoint_bits: 11,
    delta_bits: [4, 5, 4],
    fields: &[
        (0, R, 5, 10, 0),
        (0, G, 15, 10, 0),
        (0, B, 25, 10, 0),
        (1, R, 35, 4, 0),
        (0, R, 39, 1, 10),
        (3, G, 40, 1, 4),
        (2, G, 41, 4, 0),
        (1, G, 45, 5, 0),
        (0, G, 50, 1, 10),
        (3, G, 51, 4, 0),
        (1, B, 55, 4, 0),
        (0, B, 59, 1, 10),
        (3, B, 60, 1, 1),
        (2, B, 61, 4, 0),
        (2, R, 65, 4, 0),
        (3, B, 69, 1, 0),
        (3, B, 70, 1, 2),
        (3, R, 71, 4, 0),
        (2, G, 75, 1, 4),
        (3, B, 76, 1, 3),
    ],
};

static MODE7: ModeInfo = ModeInfo {
    transformed: true,
    partition_bits: 0,
    endpoint_bits: 11,
    delta_bits: [9, 9, 9],
    fields: &[
        (0, R, 5, 10, 0),
        (0, G, 15, 10, 0),
        (0, B, 25, 10, 0),
        (1, R, 35, 9, 0),
        (0, R, 44, 1, 10),
        (1, G, 45, 9, 0),
        (0, G, 54, 1, 10),
        (1, B, 55, 9, 0),
        (0, B, 64, 1, 10),
    ],
};

static MODE10: ModeInfo = ModeInfo {
    transformed: true,
    partition_bits: 5,
    endpoint_bits: 11,
    delta_bits: [4, 4, 5],
    fields: &[
        (0, R, 5, 10, 0),
        (0, G, 15, 10, 0),
        (0, B, 25, 10, 0),
        (1, R, 35, 4, 0),
        (0, R, 39, 1, 10),
        (2, B, 40, 1, 4),
        (2, G, 41, 4, 0),
        (1, G, 45, 4, 0),
        (0, G, 49, 1, 10),
        (3, B, 50, 1, 0),
        (3, G, 51, 4, 0),
        (1, B, 55, 5, 0),
        (0, B, 60, 1, 10),
        (2, B, 61, 4, 0),
        (2, R, 65, 4, 0),
        (3, B, 69, 1, 1),
        (3, B, 70, 1, 2),
        (3, R, 71, 4, 0),
        (3, B, 75, 1, 4),
        (3, B, 76, 1, 3),
    ],
};

static MODE11: ModeInfo = ModeInfo {
    transformed: true,
    partition_bits: 0,
    endpoint_bits: 12,
    delta_bits: [8, 8, 8],
    fields: &[
        (0, R, 5, 10, 0),
        (0, G, 15, 10, 0),
        (0, B, 25, 10, 0),
        (1, R, 35, 8, 0),
        (0, R, 43, 1, 11),
        (0, R, 44, 1, 10),
        (1, G, 45, 8, 0),
        (0, G, 53, 1, 11),
        (0, G, 54, 1, 10),
        (1, B, 55, 8, 0),
        (0, B, 63, 1, 11),
        (0, B, 64, 1, 10),
    ],
};

static MODE14: ModeInfo = ModeInfo {
    transformed: true,
    partition_bits: 5,
    endpoint_bits: 9,
    delta_bits: [5, 5, 5],
    fields: &[
        (0, R, 5, 9, 0),
        (2, B, 14, 1, 4),
        (0, G, 15, 9, 0),
        (2, G, 24, 1, 4),
        (0, B, 25, 9, 0),
        (3, B, 34, 1, 4),
        (1, R, 35, 5, 0),
        (3, G, 40, 1, 4),
        (2, G, 41, 4, 0),
        (1, G, 45, 5, 0),
        (3, B, 50, 1, 0),
        (3, G, 51, 4, 0),
        (1, B, 55, 5, 0),
        (3, B, 60, 1, 1),
        (2, B, 61, 4, 0),
        (2, R, 65, 5, 0),
        (3, B, 70, 1, 2),
        (3, R, 71, 5, 0),
        (3, B, 76, 1, 3),
    ],
};

static MODE15: ModeInfo = ModeInfo {
    transformed: true,
    partition_bits: 0,
    endpoint_bits: 16,
    delta_bits: [4, 4, 4],
    fields: &[
        (0, R, 5, 10, 0),
        (0, G, 15, 10, 0),
        (0, B, 25, 10, 0),
        (1, R, 35, 4, 0),
        (0, R, 39, 1, 15),
        (0, R, 40, 1, 14),
        (0, R, 41, 1, 13),
        (0, R, 42, 1, 12),
        (0, R, 43, 1, 11),
        (0, R, 44, 1, 10),
        (1, G, 45, 4, 0),
        (0, G, 49, 1, 15),
        (0, G, 50, 1, 14),
        (0, G, 51, 1, 13),
        (0, G, 52, 1, 12),
        (0, G, 53, 1, 11),
        (0, G, 54, 1, 10),
        (1, B, 55, 4, 0),
        (0, B, 59, 1, 15),
        (0, B, 60, 1, 14),
        (0, B, 61, 1, 13),
        (0, B, 62, 1, 12),
        (0, B, 63, 1, 11),
        (0, B, 64, 1, 10),
    ],
};

static MODE18: ModeInfo = ModeInfo {
    transformed: true,
    partition_bits: 5,
    endpoint_bits: 8,
    delta_bits: [6, 5, 5],
    fields: &[
        (0, R, 5, 8, 0),
        (3, G, 13, 1, 4),
        (2, B, 14, 1, 4),
        (0, G, 15, 8, 0),
        (3, B, 23, 1, 2),
        (2, G, 24, 1, 4),
        (0, B, 25, 8, 0),
        (3, B, 33, 1, 3),
        (3, B, 34, 1, 4),
        (1, R, 35, 6, 0),
        (2, G, 41, 4, 0),
        (1, G, 45, 5, 0),
        (3, B, 50, 1, 0),
        (3, G, 51, 4, 0),
        (1, B, 55, 5, 0),
        (3, B, 60, 1, 1),
        (2, B, 61, 4, 0),
        (2, R, 65, 6, 0),
        (3, R, 71, 6, 0),
    ],
};

static MODE22: ModeInfo = ModeInfo {
    transformed: true,
    partition_bits: 5,
    endpoint_bits: 8,
    delta_bits: [5, 6, 5],
    fields: &[
        (0, R, 5, 8, 0),
        (3, B, 13, 1, 0),
        (2, B, 14, 1, 4),
        (0, G, 15, 8, 0),
        (2, G, 23, 1, 5),
        (2, G, 24, 1, 4),
        (0, B, 25, 8, 0),
        (3, G, 33, 1, 5),
        (3, B, 34, 1, 4),
        (1, R, 35, 5, 0),
        (3, G, 40, 1, 4),
        (2, G, 41, 4, 0),
        (1, G, 45, 6, 0),
        (3, G, 51, 4, 0),
        (1, B, 55, 5, 0),
        (3, B, 60, 1, 1),
        (2, B, 61, 4, 0),
        (2, R, 65, 5, 0),
        (3, B, 70, 1, 2),
        (3, R, 71, 5, 0),
        (3, B, 76, 1, 3),
    ],
};

static MODE26: ModeInfo = ModeInfo {
    transformed: true,
    partition_bits: 5,
    endpoint_bits: 8,
    delta_bits: [5, 5, 6],
    fields: &[
        (0, R, 5, 8, 0),
        (3, B, 13, 1, 1),
        (2, B, 14, 1, 4),
        (0, G, 15, 8, 0),
        (2, B, 23, 1, 5),
        (2, G, 24, 1, 4),
        (0, B, 25, 8, 0),
        (3, B, 33, 1, 5),
        (3, B, 34, 1, 4),
        (1, R, 35, 5, 0),
        (3, G, 40, 1, 4),
        (2, G, 41, 4, 0),
        (1, G, 45, 5, 0),
        (3, B, 50, 1, 0),
        (3, G, 51, 4, 0),
        (1, B, 55, 6, 0),
        (2, B, 61, 4, 0),
        (2, R, 65, 5, 0),
        (3, B, 70, 1, 2),
        (3, R, 71, 5, 0),
        (3, B, 76, 1, 3),
    ],
};

static MODE30: ModeInfo = ModeInfo {
    transformed: false,
    partition_bits: 5,
    endpoint_bits: 6,
    delta_bits: [6, 6, 6],
    fields: &[
        (0, R, 5, 6, 0),
        (3, G, 11, 1, 4),
        (3, B, 12, 1, 0),
        (3, B, 13, 1, 1),
        (2, B, 14, 1, 4),
        (0, G, 15, 6, 0),
        (2, G, 21, 1, 5),
        (2, B, 22, 1, 5),
        (3, B, 23, 1, 2),
        (2, G, 24, 1, 4),
        (0, B, 25, 6, 0),
        (3, G, 31, 1, 5),
        (3, B, 32, 1, 3),
        (3, B, 33, 1, 5),
        (3, B, 34, 1, 4),
        (1, R, 35, 6, 0),
        (2, G, 41, 4, 0),
        (1, G, 45, 6, 0),
        (3, G, 51, 4, 0),
        (1, B, 55, 6, 0),
        (2, B, 61, 4, 0),
        (2, R, 65, 6, 0),
        (3, R, 71, 6, 0),
    ],
};

/// Mode parameters, or `None` for the four reserved encodings.
fn mode_info(mode: u8) -> Option<&'static ModeInfo> {
    match mode {
        0 => Some(&MODE0),
        1 => Some(&MODE1),
        2 => Some(&MODE2),
        3 => Some(&MODE3),
        6 => Some(&MODE6),
        7 => Some(&MODE7),
        10 => Some(&MODE10),
        11 => Some(&MODE11),
        14 => Some(&MODE14),
        15 => Some(&MODE15),
        18 => Some(&MODE18),
        22 => Some(&MODE22),
        26 => Some(&MODE26),
        30 => Some(&MODE30),
        _ => None,
    }
}

/// Map a quantized endpoint component onto the full 16-bit range.
fn unquantize_component(x: u16, is_signed: bool, endpoint_bits: u8) -> u16 {
    let epb = u32::from(endpoint_bits);
    if is_signed {
        if epb >= 16 {
            return x;
        }
        let negative = x & 0x8000 != 0;
        let magnitude = if negative { x.wrapping_neg() } else { x };
        let unq = if magnitude == 0 {
            0
        } else if u32::from(magnitude) >= (1u32 << (epb - 1)) - 1 {
            0x7FFF
        } else {
            (((u32::from(magnitude) << 15) + 0x4000) >> (epb - 1)) as u16
        };
        if negative {
            unq.wrapping_neg()
        } else {
            unq
        }
    } else {
        if epb >= 15 {
            return x;
        }
        if x == 0 {
            return 0;
        }
        if u32::from(x) == (1u32 << epb) - 1 {
            return 0xFFFF;
        }
        (((u32::from(x) << 15) + 0x4000) >> (epb - 1)) as u16
    }
}

fn unquantize(color: Rgb16, is_signed: bool, endpoint_bits: u8) -> Rgb16 {
    let mut out = color;
    for c in &mut out.c {
        *c = unquantize_component(*c, is_signed, endpoint_bits);
    }
    out
}

/// Rescale an interpolated component into half-float range.
fn unquantize_component_final(x: u16, is_signed: bool) -> u16 {
    if is_signed {
        let sign = x & 0x8000;
        let magnitude = if sign != 0 { x.wrapping_neg() } else { x };
        (((u32::from(magnitude) * 31) >> 5) as u16) | sign
    } else {
        ((u32::from(x) * 31) >> 6) as u16
    }
}

fn unquantize_final(color: Rgb16, is_signed: bool) -> Rgb16 {
    let mut out = color;
    for c in &mut out.c {
        *c = unquantize_component_final(*c, is_signed);
    }
    out
}

fn write_texel(dst: &mut [u8], offset: usize, color: Rgb16) {
    for (i, c) in color.c.iter().enumerate() {
        dst[offset + 2 * i..offset + 2 * i + 2].copy_from_slice(&c.to_le_bytes());
    }
}

fn zero_fill(dst: &mut [u8], stride_x: usize, pitch_y: usize) {
    for y in 0..4 {
        for x in 0..4 {
            write_texel(dst, y * pitch_y + x * stride_x, Rgb16::default());
        }
    }
}

/// Decode a BC6H block into 4x4 texels of three LE half-floats each.
///
/// `is_signed` controls sign extension of the stored endpoints; the output
/// is half-float either way. Reserved modes and configurations without
/// endpoint bits decode as an all-zero block.
pub fn decompress_bc6h_block(
    dst: &mut [u8],
    stride_x: usize,
    pitch_y: usize,
    block: &[u8],
    is_signed: bool,
) {
    let words = words_from_le_bytes(block);

    let mut mode = get_bits_u32(&words, 0, 5) as u8;
    if mode & 0x2 == 0 {
        mode &= 0x1;
    }
    let Some(info) = mode_info(mode) else {
        zero_fill(dst, stride_x, pitch_y);
        return;
    };
    let subsets: usize = if info.partition_bits > 0 { 2 } else { 1 };
    let index_bits: usize = if info.partition_bits > 0 { 3 } else { 4 };
    let epb = u32::from(info.endpoint_bits);

    let mut endpoints = [Rgb16::default(); 4];
    for &(e, channel, offset, count, shift) in info.fields {
        let bits = get_bits_u32(&words, offset as usize, count as usize) as u16;
        endpoints[e as usize].c[channel as usize] |= bits << shift;
    }

    let partition_set_id = if info.partition_bits > 0 {
        get_bits_u32(&words, 77, 5) as usize
    } else {
        0
    };

    if is_signed {
        for c in 0..3 {
            endpoints[0].c[c] = sign_extend16(endpoints[0].c[c], epb);
        }
    }
    for i in 1..2 * subsets {
        if is_signed || info.transformed {
            for c in 0..3 {
                endpoints[i].c[c] = sign_extend16(endpoints[i].c[c], u32::from(info.delta_bits[c]));
            }
        }
        if info.transformed {
            let mask = ((1u32 << epb) - 1) as u16;
            for c in 0..3 {
                endpoints[i].c[c] = endpoints[i].c[c].wrapping_add(endpoints[0].c[c]) & mask;
            }
            if is_signed {
                for c in 0..3 {
                    endpoints[i].c[c] = sign_extend16(endpoints[i].c[c], epb);
                }
            }
        }
    }
    for endpoint in endpoints.iter_mut().take(2 * subsets) {
        *endpoint = unquantize(*endpoint, is_signed, info.endpoint_bits);
    }

    let weights = weights_for(index_bits);
    let mut index_offset: usize = if info.partition_bits > 0 { 82 } else { 65 };
    for y in 0..4 {
        for x in 0..4 {
            let i = y * 4 + x;
            let (subset, anchor) = if info.partition_bits > 0 {
                let subset = usize::from((PARTITIONS2[partition_set_id] >> i) & 1);
                let anchor = if subset != 0 {
                    usize::from(ANCHORS2[partition_set_id])
                } else {
                    0
                };
                (subset, anchor)
            } else {
                (0, 0)
            };

            let count = index_bits - usize::from(i == anchor);
            let index = get_bits_u32(&words, index_offset, count) as usize;
            index_offset += count;

            let low = endpoints[2 * subset];
            let high = endpoints[2 * subset + 1];
            let color = unquantize_final(interpolate64_rgb16(low, high, weights[index]), is_signed);
            write_texel(dst, y * pitch_y + x * stride_x, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::f32_from_half;

    fn decode(block: &[u8; 16], is_signed: bool) -> [u16; 48] {
        let mut dst = [0u8; 96];
        decompress_bc6h_block(&mut dst, 6, 24, block, is_signed);
        let mut out = [0u16; 48];
        for (i, pair) in dst.chunks_exact(2).enumerate() {
            out[i] = u16::from_le_bytes([pair[0], pair[1]]);
        }
        out
    }

    #[test]
    fn test_reserved_modes_decode_to_zero() {
        for mode in [19u8, 23, 27, 31] {
            let mut block = [0xFFu8; 16];
            block[0] = (block[0] & !0x1F) | mode;
            assert_eq!(decode(&block, false), [0u16; 48], "mode {mode}");
            assert_eq!(decode(&block, true), [0u16; 48], "mode {mode}");
        }
    }

    #[test]
    fn test_two_bit_mode_selector() {
        // Low two bits 0b00 and 0b01 select modes 0 and 1 regardless of the
        // three bits above them.
        assert!(std::ptr::eq(mode_info(0b00000).unwrap(), &MODE0));
        assert!(std::ptr::eq(mode_info(0b00001).unwrap(), &MODE1));
        let mut mode = get_bits_u32(&[0b11100u32, 0, 0, 0], 0, 5) as u8;
        if mode & 0x2 == 0 {
            mode &= 0x1;
        }
        assert_eq!(mode, 0);
    }

    #[test]
    fn test_zero_endpoints_signed_decode_to_zero() {
        // Mode 3 (one subset, 10-bit untransformed endpoints), all fields 0.
        let mut block = [0u8; 16];
        block[0] = 0x03;
        assert_eq!(decode(&block, true), [0u16; 48]);
    }

    #[test]
    fn test_mode3_max_unsigned_endpoints_decode_to_half_one() {
        // Both endpoints at the 10-bit maximum unquantize to 0xFFFF and the
        // final 31/64 rescale lands on 0x7BFF, the largest finite half
        // (65504.0).
        let mut block = [0u8; 16];
        block[0] = 0x03;
        // Endpoint fields: e0 at bits 5..35, e1 at bits 35..65, all ones.
        for (offset, count) in [(5usize, 10usize), (15, 10), (25, 10), (35, 10), (45, 10), (55, 10)]
        {
            for bit in offset..offset + count {
                block[bit / 8] |= 1 << (bit % 8);
            }
        }
        let out = decode(&block, false);
        for half in out {
            assert_eq!(half, 0x7BFF);
            assert_eq!(f32_from_half(half), 65504.0);
        }
    }

    #[test]
    fn test_unquantize_endpoints_unsigned() {
        assert_eq!(unquantize_component(0, false, 10), 0);
        assert_eq!(unquantize_component(1023, false, 10), 0xFFFF);
        assert_eq!(
            unquantize_component(512, false, 10),
            (((512u32 << 15) + 0x4000) >> 9) as u16
        );
        // Identity at full precision.
        assert_eq!(unquantize_component(0x1234, false, 16), 0x1234);
    }

    #[test]
    fn test_unquantize_endpoints_signed() {
        assert_eq!(unquantize_component(0, true, 10), 0);
        // Saturation at the positive extreme.
        assert_eq!(unquantize_component(511, true, 10), 0x7FFF);
        // Negative values keep their sign through the rescale.
        let neg = unquantize_component((-5i16) as u16, true, 10);
        assert!(neg & 0x8000 != 0);
        assert_eq!(neg.wrapping_neg(), unquantize_component(5, true, 10));
    }

    #[test]
    fn test_final_rescale() {
        assert_eq!(
            unquantize_component_final(0xFFFF, false),
            ((0xFFFFu32 * 31) >> 6) as u16
        );
        assert_eq!(unquantize_component_final(0, false), 0);
        let neg = unquantize_component_final((-0x100i16) as u16, true);
        assert_eq!(neg, 0x8000 | ((0x100u32 * 31) >> 5) as u16);
    }

    #[test]
    fn test_decoder_is_pure() {
        let mut block = [0u8; 16];
        block[0] = 0x03;
        block[1] = 0xA5;
        block[7] = 0x5A;
        assert_eq!(decode(&block, false), decode(&block, false));
    }
}

//! Block-compressed texture decoding.
//!
//! Each BCn format is decoded either one 4x4 block at a time (the `_block`
//! functions) or over a whole image region in raster-scan block order. The
//! whole-image functions expect tightly packed source blocks and write into
//! a caller buffer at an arbitrary per-texel stride and per-row pitch:
//!
//! - `stride_x`: distance in bytes between horizontally adjacent texels
//!   (usually the output bytes-per-texel, e.g. 4 for RGBA8 or 6 for RGB16F).
//! - `pitch_y`: distance in bytes between rows (usually
//!   `width * stride_x` plus any alignment padding).
//!
//! `width` and `height` must be multiples of 4. The decoders allocate
//! nothing and never fail; output for RGB-only modes leaves alpha bytes
//! untouched.
//!
//! Decoded texel layouts per format:
//!
//! | format | output |
//! |--------|--------|
//! | BC1 | RGB8 or RGBA8 (per `use_alpha`) |
//! | BC2, BC3, BC7 | RGBA8 |
//! | BC4 | R8 or signed R8 |
//! | BC5 | RG8 or signed RG8 |
//! | BC6H | RGB16F (always half-float; `is_signed` selects the block
//!   variant) |
//! | Alpha4 | A8 (expanded from 4 bits) |

mod alpha4;
mod bc1;
mod bc4;
mod bc6h;
mod bc7;
mod bits;
mod color;
mod tables;

pub use alpha4::decompress_alpha4_block;
pub use bc1::decompress_bc1_block;
pub use bc4::decompress_bc4_block;
pub use bc6h::decompress_bc6h_block;
pub use bc7::decompress_bc7_block;
pub use color::{f32_from_half, linear_from_srgb, srgb_from_linear};

/// Decode a BC1 image region; 8 source bytes per block.
pub fn decompress_bc1(
    dst: &mut [u8],
    stride_x: usize,
    pitch_y: usize,
    src: &[u8],
    width: usize,
    height: usize,
    use_select: bool,
    use_alpha: bool,
) {
    let mut offset = 0;
    for y in (0..height).step_by(4) {
        for x in (0..width).step_by(4) {
            decompress_bc1_block(
                &mut dst[y * pitch_y + x * stride_x..],
                stride_x,
                pitch_y,
                &src[offset..offset + 8],
                use_select,
                use_alpha,
            );
            offset += 8;
        }
    }
}

/// Decode a BC2 image region; 16 source bytes per block (explicit alpha
/// followed by color).
pub fn decompress_bc2(
    dst: &mut [u8],
    stride_x: usize,
    pitch_y: usize,
    src: &[u8],
    width: usize,
    height: usize,
) {
    let mut offset = 0;
    for y in (0..height).step_by(4) {
        for x in (0..width).step_by(4) {
            let base = y * pitch_y + x * stride_x;
            decompress_alpha4_block(&mut dst[base + 3..], stride_x, pitch_y, &src[offset..offset + 8]);
            decompress_bc1_block(
                &mut dst[base..],
                stride_x,
                pitch_y,
                &src[offset + 8..offset + 16],
                false,
                false,
            );
            offset += 16;
        }
    }
}

/// Decode a BC3 image region; 16 source bytes per block (interpolated alpha
/// followed by color).
pub fn decompress_bc3(
    dst: &mut [u8],
    stride_x: usize,
    pitch_y: usize,
    src: &[u8],
    width: usize,
    height: usize,
) {
    let mut offset = 0;
    for y in (0..height).step_by(4) {
        for x in (0..width).step_by(4) {
            let base = y * pitch_y + x * stride_x;
            decompress_bc4_block(
                &mut dst[base + 3..],
                stride_x,
                pitch_y,
                &src[offset..offset + 8],
                false,
            );
            decompress_bc1_block(
                &mut dst[base..],
                stride_x,
                pitch_y,
                &src[offset + 8..offset + 16],
                true,
                false,
            );
            offset += 16;
        }
    }
}

/// Decode a BC4 image region; 8 source bytes per block.
pub fn decompress_bc4(
    dst: &mut [u8],
    stride_x: usize,
    pitch_y: usize,
    src: &[u8],
    width: usize,
    height: usize,
    is_signed: bool,
) {
    let mut offset = 0;
    for y in (0..height).step_by(4) {
        for x in (0..width).step_by(4) {
            decompress_bc4_block(
                &mut dst[y * pitch_y + x * stride_x..],
                stride_x,
                pitch_y,
                &src[offset..offset + 8],
                is_signed,
            );
            offset += 8;
        }
    }
}

/// Decode a BC5 image region; 16 source bytes per block, the red sub-block
/// first and the green sub-block in the following 8 bytes.
pub fn decompress_bc5(
    dst: &mut [u8],
    stride_x: usize,
    pitch_y: usize,
    src: &[u8],
    width: usize,
    height: usize,
    is_signed: bool,
) {
    let mut offset = 0;
    for y in (0..height).step_by(4) {
        for x in (0..width).step_by(4) {
            let base = y * pitch_y + x * stride_x;
            decompress_bc4_block(
                &mut dst[base..],
                stride_x,
                pitch_y,
                &src[offset..offset + 8],
                is_signed,
            );
            decompress_bc4_block(
                &mut dst[base + 1..],
                stride_x,
                pitch_y,
                &src[offset + 8..offset + 16],
                is_signed,
            );
            offset += 16;
        }
    }
}

/// Decode a BC6H image region; 16 source bytes per block.
pub fn decompress_bc6h(
    dst: &mut [u8],
    stride_x: usize,
    pitch_y: usize,
    src: &[u8],
    width: usize,
    height: usize,
    is_signed: bool,
) {
    let mut offset = 0;
    for y in (0..height).step_by(4) {
        for x in (0..width).step_by(4) {
            decompress_bc6h_block(
                &mut dst[y * pitch_y + x * stride_x..],
                stride_x,
                pitch_y,
                &src[offset..offset + 16],
                is_signed,
            );
            offset += 16;
        }
    }
}

/// Decode a BC7 image region; 16 source bytes per block.
pub fn decompress_bc7(
    dst: &mut [u8],
    stride_x: usize,
    pitch_y: usize,
    src: &[u8],
    width: usize,
    height: usize,
) {
    let mut offset = 0;
    for y in (0..height).step_by(4) {
        for x in (0..width).step_by(4) {
            decompress_bc7_block(
                &mut dst[y * pitch_y + x * stride_x..],
                stride_x,
                pitch_y,
                &src[offset..offset + 16],
            );
            offset += 16;
        }
    }
}

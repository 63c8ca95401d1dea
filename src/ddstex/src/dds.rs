//! DirectDraw Surface (DDS) container parsing.
//!
//! Handles both the legacy header (FourCC codes and channel-mask pixel
//! formats) and the DX10 extension header, normalizing everything into a
//! [`Texture`] description. Payload bytes are never touched here; mip
//! placement comes from [`Texture::get_mipmaps`].

use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use thiserror::Error;

use crate::format::{AlphaMode, InternalFormat};
use crate::texture::{CubeFaces, Extent3, Pitch, Texture, TextureDesc};

/// Errors produced while parsing a DDS file.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("not a DDS file (bad magic)")]
    InvalidMagic,

    #[error("truncated DDS file: need at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("malformed DDS header: {0}")]
    MalformedHeader(&'static str),

    #[error("unsupported DDS format: {0}")]
    UnsupportedFormat(String),

    #[error("unsupported DDS feature: {0}")]
    UnsupportedFeature(&'static str),

    #[error("i/o error reading DDS data")]
    Io(#[from] std::io::Error),
}

const DDS_MAGIC: u32 = 0x2053_4444; // "DDS "
const HEADER_SIZE: u32 = 124;
const PIXEL_FORMAT_SIZE: u32 = 32;
const HEADER_DX10_SIZE: u32 = 20;

// DDS_PIXELFORMAT.flags
const DDPF_ALPHAPIXELS: u32 = 0x1;
const DDPF_ALPHA: u32 = 0x2;
const DDPF_FOURCC: u32 = 0x4;
const DDPF_RGB: u32 = 0x40;
const DDPF_YUV: u32 = 0x200;
const DDPF_LUMINANCE: u32 = 0x20000;
// Undocumented legacy flag used for SNORM bump maps.
const DDPF_BUMPDUDV: u32 = 0x80000;

// DDS_HEADER.flags
const DDSD_HEIGHT: u32 = 0x2;
const DDSD_WIDTH: u32 = 0x4;
const DDSD_PITCH: u32 = 0x8;
const DDSD_LINEARSIZE: u32 = 0x80000;
const DDSD_DEPTH: u32 = 0x800000;

// DDS_HEADER.caps / caps2
const DDSCAPS_MIPMAP: u32 = 0x400000;
const DDSCAPS2_CUBEMAP: u32 = 0x200;
const DDSCAPS2_CUBEMAP_POSITIVEX: u32 = 0x400;
const DDSCAPS2_CUBEMAP_NEGATIVEX: u32 = 0x800;
const DDSCAPS2_CUBEMAP_POSITIVEY: u32 = 0x1000;
const DDSCAPS2_CUBEMAP_NEGATIVEY: u32 = 0x2000;
const DDSCAPS2_CUBEMAP_POSITIVEZ: u32 = 0x4000;
const DDSCAPS2_CUBEMAP_NEGATIVEZ: u32 = 0x8000;
const DDSCAPS2_VOLUME: u32 = 0x200000;

// DDS_HEADER_DXT10.resourceDimension
const DDS_DIMENSION_TEXTURE1D: u32 = 2;
const DDS_DIMENSION_TEXTURE2D: u32 = 3;
const DDS_DIMENSION_TEXTURE3D: u32 = 4;
// DDS_HEADER_DXT10.miscFlag
const DDS_RESOURCE_MISC_TEXTURECUBE: u32 = 0x4;

struct PixelFormat {
    size: u32,
    flags: u32,
    fourcc: u32,
    rgb_bit_count: u32,
    r_mask: u32,
    g_mask: u32,
    b_mask: u32,
    a_mask: u32,
}

struct Header {
    size: u32,
    flags: u32,
    height: u32,
    width: u32,
    pitch_or_linear_size: u32,
    depth: u32,
    mip_map_count: u32,
    pixel_format: PixelFormat,
    caps: u32,
    caps2: u32,
}

struct HeaderDx10 {
    dxgi_format: u32,
    resource_dimension: u32,
    misc_flag: u32,
    array_size: u32,
    misc_flags2: u32,
}

fn read_header(cursor: &mut Cursor<&[u8]>) -> Result<Header, TextureError> {
    let size = cursor.read_u32::<LittleEndian>()?;
    let flags = cursor.read_u32::<LittleEndian>()?;
    let height = cursor.read_u32::<LittleEndian>()?;
    let width = cursor.read_u32::<LittleEndian>()?;
    let pitch_or_linear_size = cursor.read_u32::<LittleEndian>()?;
    let depth = cursor.read_u32::<LittleEndian>()?;
    let mip_map_count = cursor.read_u32::<LittleEndian>()?;
    for _ in 0..11 {
        cursor.read_u32::<LittleEndian>()?; // reserved
    }
    let pixel_format = PixelFormat {
        size: cursor.read_u32::<LittleEndian>()?,
        flags: cursor.read_u32::<LittleEndian>()?,
        fourcc: cursor.read_u32::<LittleEndian>()?,
        rgb_bit_count: cursor.read_u32::<LittleEndian>()?,
        r_mask: cursor.read_u32::<LittleEndian>()?,
        g_mask: cursor.read_u32::<LittleEndian>()?,
        b_mask: cursor.read_u32::<LittleEndian>()?,
        a_mask: cursor.read_u32::<LittleEndian>()?,
    };
    let caps = cursor.read_u32::<LittleEndian>()?;
    let caps2 = cursor.read_u32::<LittleEndian>()?;
    cursor.read_u32::<LittleEndian>()?; // caps3
    cursor.read_u32::<LittleEndian>()?; // caps4
    cursor.read_u32::<LittleEndian>()?; // reserved
    Ok(Header {
        size,
        flags,
        height,
        width,
        pitch_or_linear_size,
        depth,
        mip_map_count,
        pixel_format,
        caps,
        caps2,
    })
}

fn read_header_dx10(cursor: &mut Cursor<&[u8]>) -> Result<HeaderDx10, TextureError> {
    Ok(HeaderDx10 {
        dxgi_format: cursor.read_u32::<LittleEndian>()?,
        resource_dimension: cursor.read_u32::<LittleEndian>()?,
        misc_flag: cursor.read_u32::<LittleEndian>()?,
        array_size: cursor.read_u32::<LittleEndian>()?,
        misc_flags2: cursor.read_u32::<LittleEndian>()?,
    })
}

/// `(shift, nbits)` of a channel mask that must be one contiguous bit run.
fn mask_info(mask: u32) -> Result<(u8, u8), TextureError> {
    if mask == 0 {
        return Ok((0, 0));
    }
    let shift = mask.trailing_zeros();
    let nbits = (mask >> shift).trailing_ones();
    if u64::from(mask >> shift) != (1u64 << nbits) - 1 {
        return Err(TextureError::MalformedHeader("non-contiguous channel mask"));
    }
    Ok((shift as u8, nbits as u8))
}

/// Match per-channel `(shift, nbits)` info (ordered R, G, B, A) against a
/// packed little-endian BGRA layout: B in the low bits, then G, R, A.
fn matches_bgra(ch: &[(u8, u8); 4], b: u8, g: u8, r: u8, a: u8) -> bool {
    ch[0].1 == r
        && (r == 0 || ch[0].0 == b + g)
        && ch[1].1 == g
        && (g == 0 || ch[1].0 == b)
        && ch[2].1 == b
        && (b == 0 || ch[2].0 == 0)
        && ch[3].1 == a
        && (a == 0 || ch[3].0 == b + g + r)
}

/// As [`matches_bgra`] but with R in the low bits.
fn matches_rgba(ch: &[(u8, u8); 4], r: u8, g: u8, b: u8, a: u8) -> bool {
    ch[0].1 == r
        && (r == 0 || ch[0].0 == 0)
        && ch[1].1 == g
        && (g == 0 || ch[1].0 == r)
        && ch[2].1 == b
        && (b == 0 || ch[2].0 == r + g)
        && ch[3].1 == a
        && (a == 0 || ch[3].0 == r + g + b)
}

fn fourcc_str(fourcc: u32) -> String {
    let bytes = fourcc.to_le_bytes();
    if bytes.iter().all(|b| b.is_ascii_graphic()) {
        String::from_utf8_lossy(&bytes).into_owned()
    } else {
        format!("{fourcc:#010X}")
    }
}

fn u32_code(code: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*code)
}

/// Resolve a FourCC code to a format and (sometimes) an alpha mode, or flag
/// that a DX10 header follows.
fn resolve_fourcc(
    fourcc: u32,
) -> Result<Option<(InternalFormat, Option<AlphaMode>)>, TextureError> {
    let resolved = match fourcc {
        c if c == u32_code(b"DX10") => return Ok(None),

        c if c == u32_code(b"ATI2") || c == u32_code(b"BC5U") => (InternalFormat::Bc5Unorm, None),
        c if c == u32_code(b"BC5S") => (InternalFormat::Bc5Snorm, None),
        c if c == u32_code(b"ATI1") || c == u32_code(b"BC4U") => (InternalFormat::Bc4Unorm, None),
        c if c == u32_code(b"BC4S") => (InternalFormat::Bc4Snorm, None),

        c if c == u32_code(b"DXT5") => (InternalFormat::Bc3Unorm, Some(AlphaMode::Straight)),
        c if c == u32_code(b"DXT4") => (InternalFormat::Bc3Unorm, Some(AlphaMode::Premultiplied)),
        c if c == u32_code(b"DXT3") => (InternalFormat::Bc2Unorm, Some(AlphaMode::Straight)),
        c if c == u32_code(b"DXT2") => (InternalFormat::Bc2Unorm, Some(AlphaMode::Premultiplied)),
        c if c == u32_code(b"DXT1") => (InternalFormat::Bc1Unorm, Some(AlphaMode::Premultiplied)),

        c if c == u32_code(b"RGBG") => (InternalFormat::R8G8B8G8Unorm, None),
        c if c == u32_code(b"GRGB") => (InternalFormat::G8R8G8B8Unorm, None),
        c if c == u32_code(b"YUY2") => (InternalFormat::Yuy2, None),

        // Single-byte legacy D3DFMT codes.
        0x74 => (InternalFormat::R32G32B32A32Sfloat, None),
        0x73 => (InternalFormat::R32G32Sfloat, None),
        0x72 => (InternalFormat::R32Sfloat, None),
        0x71 => (InternalFormat::R16G16B16A16Sfloat, None),
        0x70 => (InternalFormat::R16G16Sfloat, None),
        0x6F => (InternalFormat::R16Sfloat, None),
        0x6E => (InternalFormat::R16G16B16A16Snorm, None),
        0x24 => (InternalFormat::R16G16B16A16Unorm, None),

        other => {
            log::debug!("unrecognized DDS FourCC {:?} ({other:#010X})", fourcc_str(other));
            return Err(TextureError::UnsupportedFormat(format!(
                "unknown FourCC code {}",
                fourcc_str(other)
            )));
        }
    };
    Ok(Some(resolved))
}

/// Resolve the legacy pixel-format section. Returns the format, an alpha
/// mode when the format dictates one, and whether a DX10 header follows.
fn resolve_pixel_format(
    pf: &PixelFormat,
) -> Result<(InternalFormat, Option<AlphaMode>, bool), TextureError> {
    if pf.size != PIXEL_FORMAT_SIZE {
        return Err(TextureError::MalformedHeader("bad pixel format size"));
    }

    let category =
        pf.flags & (DDPF_ALPHA | DDPF_FOURCC | DDPF_RGB | DDPF_YUV | DDPF_LUMINANCE | DDPF_BUMPDUDV);
    match category {
        DDPF_ALPHA => {
            if pf.rgb_bit_count != 8 {
                return Err(TextureError::UnsupportedFormat(format!(
                    "alpha-only with {} bits per pixel",
                    pf.rgb_bit_count
                )));
            }
            if pf.a_mask != 0xFF {
                return Err(TextureError::UnsupportedFormat(format!(
                    "alpha-only with mask {:#010X}",
                    pf.a_mask
                )));
            }
            Ok((InternalFormat::A8Unorm, Some(AlphaMode::Straight), false))
        }
        DDPF_FOURCC => match resolve_fourcc(pf.fourcc)? {
            Some((format, alphamode)) => Ok((format, alphamode, false)),
            None => Ok((InternalFormat::Undefined, None, true)),
        },
        DDPF_RGB => {
            let ch = [
                mask_info(pf.r_mask)?,
                mask_info(pf.g_mask)?,
                mask_info(pf.b_mask)?,
                if pf.flags & DDPF_ALPHAPIXELS != 0 {
                    mask_info(pf.a_mask)?
                } else {
                    (0, 0)
                },
            ];
            let format = match pf.rgb_bit_count {
                16 => {
                    if matches_bgra(&ch, 5, 6, 5, 0) {
                        Some(InternalFormat::B5G6R5Unorm)
                    } else if matches_bgra(&ch, 5, 5, 5, 1) {
                        Some(InternalFormat::B5G5R5A1Unorm)
                    } else if matches_bgra(&ch, 4, 4, 4, 4) {
                        Some(InternalFormat::B4G4R4A4Unorm)
                    } else {
                        None
                    }
                }
                32 => {
                    if matches_rgba(&ch, 8, 8, 8, 8) {
                        Some(InternalFormat::R8G8B8A8Unorm)
                    } else if matches_rgba(&ch, 16, 16, 0, 0) {
                        Some(InternalFormat::R16G16Unorm)
                    } else if matches_bgra(&ch, 8, 8, 8, 8) {
                        Some(InternalFormat::B8G8R8A8Unorm)
                    } else if matches_bgra(&ch, 8, 8, 8, 0) {
                        Some(InternalFormat::B8G8R8X8Unorm)
                    } else {
                        None
                    }
                }
                0 => return Err(TextureError::MalformedHeader("zero bits per pixel")),
                _ => None,
            };
            match format {
                Some(format) => Ok((format, None, false)),
                None => Err(TextureError::UnsupportedFormat(format!(
                    "unrecognized RGB channel masks ({} bpp)",
                    pf.rgb_bit_count
                ))),
            }
        }
        DDPF_YUV => Err(TextureError::UnsupportedFeature("legacy YUV pixel formats")),
        DDPF_LUMINANCE => {
            let ch = [
                mask_info(pf.r_mask)?,
                if pf.flags & DDPF_ALPHAPIXELS != 0 {
                    mask_info(pf.a_mask)?
                } else {
                    (0, 0)
                },
                (0, 0),
                (0, 0),
            ];
            let format = match pf.rgb_bit_count {
                8 if matches_rgba(&ch, 8, 0, 0, 0) => Some(InternalFormat::R8Unorm),
                16 if matches_rgba(&ch, 8, 8, 0, 0) => Some(InternalFormat::R8G8Unorm),
                16 if matches_rgba(&ch, 16, 0, 0, 0) => Some(InternalFormat::R16Unorm),
                0 => return Err(TextureError::MalformedHeader("zero bits per pixel")),
                _ => None,
            };
            match format {
                Some(format) => Ok((format, None, false)),
                None => Err(TextureError::UnsupportedFormat(format!(
                    "unrecognized luminance channel masks ({} bpp)",
                    pf.rgb_bit_count
                ))),
            }
        }
        DDPF_BUMPDUDV => {
            let ch = [
                mask_info(pf.r_mask)?,
                mask_info(pf.g_mask)?,
                mask_info(pf.b_mask)?,
                mask_info(pf.a_mask)?,
            ];
            let format = match pf.rgb_bit_count {
                16 if matches_rgba(&ch, 8, 8, 0, 0) => Some(InternalFormat::R8G8Snorm),
                32 if matches_rgba(&ch, 8, 8, 8, 8) => Some(InternalFormat::R8G8B8A8Snorm),
                32 if matches_rgba(&ch, 16, 16, 0, 0) => Some(InternalFormat::R16G16Snorm),
                0 => return Err(TextureError::MalformedHeader("zero bits per pixel")),
                _ => None,
            };
            match format {
                Some(format) => Ok((format, None, false)),
                None => Err(TextureError::UnsupportedFormat(format!(
                    "unrecognized bump-map channel masks ({} bpp)",
                    pf.rgb_bit_count
                ))),
            }
        }
        _ => Err(TextureError::MalformedHeader(
            "conflicting pixel format flags",
        )),
    }
}

fn apply_header_dx10(desc: &mut TextureDesc, dx10: &HeaderDx10) -> Result<(), TextureError> {
    desc.iformat = InternalFormat::from_u32(dx10.dxgi_format).ok_or_else(|| {
        TextureError::UnsupportedFormat(format!("unknown DXGI format {}", dx10.dxgi_format))
    })?;

    desc.dimension = match dx10.resource_dimension {
        DDS_DIMENSION_TEXTURE1D => 1,
        DDS_DIMENSION_TEXTURE2D => 2,
        DDS_DIMENSION_TEXTURE3D => 3,
        _ => {
            return Err(TextureError::MalformedHeader(
                "unknown or missing resource dimension",
            ))
        }
    };

    if dx10.misc_flag & DDS_RESOURCE_MISC_TEXTURECUBE != 0 {
        if desc.cubefaces.num == 0 {
            return Err(TextureError::MalformedHeader(
                "cubemap with no cubemap faces",
            ));
        }
        if desc.dimension != 2 {
            return Err(TextureError::MalformedHeader("cubemap with dimension != 2"));
        }
    }

    desc.arraylen = dx10.array_size;
    if desc.dimension == 3 && desc.arraylen != 1 {
        return Err(TextureError::MalformedHeader(
            "arrays of 3D textures are not permitted",
        ));
    }

    desc.alphamode = AlphaMode::from_u32(dx10.misc_flags2 & 0x7)
        .ok_or(TextureError::MalformedHeader("invalid alpha mode"))?;
    Ok(())
}

pub(crate) fn parse(data: &[u8]) -> Result<TextureDesc, TextureError> {
    let min_len = 4 + HEADER_SIZE as usize;
    if data.len() < min_len {
        return Err(TextureError::Truncated {
            expected: min_len,
            actual: data.len(),
        });
    }
    let magic = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    if magic != DDS_MAGIC {
        return Err(TextureError::InvalidMagic);
    }

    let mut cursor = Cursor::new(&data[4..]);
    let header = read_header(&mut cursor)?;
    if header.size < HEADER_SIZE {
        return Err(TextureError::MalformedHeader("header size too small"));
    }
    if header.flags & (DDSD_HEIGHT | DDSD_WIDTH) != (DDSD_HEIGHT | DDSD_WIDTH) {
        return Err(TextureError::MalformedHeader(
            "width/height flags not both set",
        ));
    }

    let mut desc = TextureDesc {
        size: Extent3 {
            x: header.width,
            y: header.height,
            z: if header.flags & DDSD_DEPTH != 0 {
                header.depth
            } else {
                1
            },
        },
        ..TextureDesc::default()
    };
    if desc.size.x == 0 || desc.size.y == 0 || desc.size.z == 0 {
        return Err(TextureError::MalformedHeader("zero-sized texture"));
    }

    match header.flags & (DDSD_PITCH | DDSD_LINEARSIZE) {
        DDSD_PITCH => {
            desc.pitch = Pitch {
                y: header.pitch_or_linear_size,
                z: header.height * header.pitch_or_linear_size,
            };
            desc.nbytes = desc.size.z * desc.pitch.z;
        }
        DDSD_LINEARSIZE => {
            let linear = header.pitch_or_linear_size;
            desc.pitch = Pitch {
                y: linear / header.height,
                z: linear,
            };
            desc.nbytes = linear * desc.size.z;
        }
        0 => {
            return Err(TextureError::UnsupportedFeature(
                "computing pitch and linear size from the format",
            ))
        }
        _ => {
            return Err(TextureError::MalformedHeader(
                "both pitch and linear size flags set",
            ))
        }
    }

    desc.nmiplevels = header.mip_map_count;
    if header.caps & DDSCAPS_MIPMAP == 0 {
        if desc.nmiplevels > 1 {
            return Err(TextureError::MalformedHeader(
                "no mipmap capability but more than one mip level declared",
            ));
        }
        desc.nmiplevels = 1;
    }

    let (format, alphamode, has_dx10) = resolve_pixel_format(&header.pixel_format)?;
    desc.iformat = format;
    if let Some(alphamode) = alphamode {
        desc.alphamode = alphamode;
    }

    if header.caps2 & DDSCAPS2_CUBEMAP != 0 {
        let faces = [
            (DDSCAPS2_CUBEMAP_POSITIVEX, CubeFaces::POS_X),
            (DDSCAPS2_CUBEMAP_NEGATIVEX, CubeFaces::NEG_X),
            (DDSCAPS2_CUBEMAP_POSITIVEY, CubeFaces::POS_Y),
            (DDSCAPS2_CUBEMAP_NEGATIVEY, CubeFaces::NEG_Y),
            (DDSCAPS2_CUBEMAP_POSITIVEZ, CubeFaces::POS_Z),
            (DDSCAPS2_CUBEMAP_NEGATIVEZ, CubeFaces::NEG_Z),
        ];
        for (cap, bit) in faces {
            if header.caps2 & cap != 0 {
                desc.cubefaces.mask |= bit;
                desc.cubefaces.num += 1;
            }
        }
        if desc.cubefaces.num == 0 {
            return Err(TextureError::MalformedHeader(
                "cubemap capability with no faces defined",
            ));
        }
    }
    desc.isvolume = header.caps2 & DDSCAPS2_VOLUME != 0;

    desc.offset0 = 4 + header.size;
    if has_dx10 {
        let expected = 4 + header.size as usize + HEADER_DX10_SIZE as usize;
        if data.len() < expected {
            return Err(TextureError::Truncated {
                expected,
                actual: data.len(),
            });
        }
        let mut dx10_cursor = Cursor::new(&data[4 + header.size as usize..]);
        let dx10 = read_header_dx10(&mut dx10_cursor)?;
        apply_header_dx10(&mut desc, &dx10)?;
        desc.offset0 += HEADER_DX10_SIZE;
    } else {
        desc.arraylen = 1;
        desc.dimension = 2;
    }
    Ok(desc)
}

/// Parse a DDS file already resident in memory; the returned texture borrows
/// `data`.
pub fn load_memory(data: &[u8]) -> Result<Texture<'_>, TextureError> {
    let desc = parse(data)?;
    Ok(Texture::from_parts(Cow::Borrowed(data), desc))
}

/// Read and parse a DDS file from disk; the returned texture owns the bytes.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Texture<'static>, TextureError> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    log::debug!("read {} byte DDS file from {}", data.len(), path.display());
    let desc = parse(&data)?;
    Ok(Texture::from_parts(Cow::Owned(data), desc))
}

//! # ddstex
//!
//! DDS texture loading and BCn block decompression.
//!
//! This library provides functionality to:
//! - Parse DDS container files (legacy and DX10-extended) into a normalized
//!   texture description with per-mip byte ranges
//! - Decode the BC1-BC7 block-compressed formats into caller-provided
//!   buffers at arbitrary stride and pitch
//! - Convert between half-float/f32 and sRGB/linear channel values
//!
//! ## Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tex = ddstex::load_file("skybox.dds")?;
//! println!("{}x{} {}", tex.size.x, tex.size.y, tex.iformat);
//!
//! let mips = tex.mipmaps(0);
//! let mip0 = &mips[0];
//! let src = &tex.data()[mip0.offset as usize..][..mip0.nbytes as usize];
//!
//! // Decode a BC7 mip into a tightly packed RGBA8 buffer.
//! let (w, h) = (mip0.size.x as usize, mip0.size.y as usize);
//! let mut rgba = vec![0u8; w * h * 4];
//! if tex.iformat == ddstex::InternalFormat::Bc7Unorm {
//!     ddstex::codec::decompress_bc7(&mut rgba, 4, w * 4, src, w, h);
//! }
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod dds;
pub mod format;
pub mod texture;

// Re-export commonly used items
#[doc(inline)]
pub use codec::{f32_from_half, linear_from_srgb, srgb_from_linear};
#[doc(inline)]
pub use dds::{load_file, load_memory, TextureError};
#[doc(inline)]
pub use format::{AlphaMode, InternalFormat};
#[doc(inline)]
pub use texture::{CubeFaces, Extent3, MipInfo, Pitch, Texture};

//! Bit-level extraction primitives shared by the block decoders.
//!
//! Block payloads are little-endian bit streams. The BPTC decoders address
//! them at arbitrary bit offsets, with fields that may straddle an element
//! boundary, so extraction comes in two granularities: over `u32` words
//! (fields up to 32 bits) and over bytes (fields up to 8 bits).

/// Stage a 16-byte block payload into four little-endian `u32` words.
pub(crate) fn words_from_le_bytes(block: &[u8]) -> [u32; 4] {
    let mut words = [0u32; 4];
    for (i, word) in words.iter_mut().enumerate() {
        *word = u32::from_le_bytes([
            block[4 * i],
            block[4 * i + 1],
            block[4 * i + 2],
            block[4 * i + 3],
        ]);
    }
    words
}

/// Extract `count` consecutive bits starting at bit `start`, zero-extended.
///
/// Bit 0 is the least significant bit of `words[0]`. Fields that straddle a
/// word boundary are assembled from both words; `count` must be at most 32.
pub(crate) fn get_bits_u32(words: &[u32], start: usize, count: usize) -> u32 {
    debug_assert!(count <= 32);
    if count == 0 {
        return 0;
    }
    let index = start / 32;
    let bit = start % 32;
    if (start + count - 1) / 32 == index {
        let mask = if count == 32 {
            u32::MAX
        } else {
            (1u32 << count) - 1
        };
        (words[index] >> bit) & mask
    } else {
        let low_count = 32 - bit;
        let low = words[index] >> bit;
        let high = words[index + 1] & ((1u32 << (count - low_count)) - 1);
        low | (high << low_count)
    }
}

/// Byte-granularity variant of [`get_bits_u32`]; `count` must be at most 8.
pub(crate) fn get_bits_u8(bytes: &[u8], start: usize, count: usize) -> u8 {
    debug_assert!(count <= 8);
    if count == 0 {
        return 0;
    }
    let index = start / 8;
    let bit = start % 8;
    if (start + count - 1) / 8 == index {
        let mask = if count == 8 { 0xFF } else { (1u8 << count) - 1 };
        (bytes[index] >> bit) & mask
    } else {
        let low_count = 8 - bit;
        let low = bytes[index] >> bit;
        let high = bytes[index + 1] & ((1u8 << (count - low_count)) - 1);
        low | (high << low_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_staging_is_little_endian() {
        let block = [
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, //
            0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F, 0x10,
        ];
        let words = words_from_le_bytes(&block);
        assert_eq!(words, [0x04030201, 0x08070605, 0x0C0B0A09, 0x100F0E0D]);
    }

    #[test]
    fn test_get_bits_within_one_word() {
        let words = [0xDEADBEEF, 0x12345678];
        assert_eq!(get_bits_u32(&words, 0, 4), 0xF);
        assert_eq!(get_bits_u32(&words, 4, 8), 0xEE);
        assert_eq!(get_bits_u32(&words, 16, 16), 0xDEAD);
        assert_eq!(get_bits_u32(&words, 0, 32), 0xDEADBEEF);
    }

    #[test]
    fn test_get_bits_straddles_word_boundary() {
        // Low 4 bits come from the top of word 0, the rest from word 1.
        let words = [0xF0000000, 0x0000000A];
        assert_eq!(get_bits_u32(&words, 28, 8), 0xAF);
    }

    #[test]
    fn test_get_bits_zero_extended() {
        let words = [0x00000001, 0];
        assert_eq!(get_bits_u32(&words, 0, 10), 1);
        assert_eq!(get_bits_u32(&words, 1, 10), 0);
    }

    #[test]
    fn test_get_bits_u8_straddles_byte_boundary() {
        let bytes = [0b1100_0000, 0b0000_0101];
        assert_eq!(get_bits_u8(&bytes, 6, 5), 0b10111);
    }

    #[test]
    fn test_get_bits_u8_full_byte() {
        let bytes = [0xAB, 0xCD];
        assert_eq!(get_bits_u8(&bytes, 0, 8), 0xAB);
        assert_eq!(get_bits_u8(&bytes, 8, 8), 0xCD);
        assert_eq!(get_bits_u8(&bytes, 4, 8), 0xDA);
    }
}

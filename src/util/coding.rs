//! Little-endian fixed-width integer coding.

/// Appends `value` as 8 little-endian bytes.
#[inline]
pub fn put_fixed_64(dst: &mut Vec<u8>, value: u64) {
    dst.extend_from_slice(&value.to_le_bytes());
}

/// Decodes a u64 from the first 8 bytes of `src`.
///
/// Panics if `src` is shorter than 8 bytes.
#[inline]
pub fn decode_fixed_64(src: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&src[..8]);
    u64::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_64_is_little_endian() {
        let mut buf = vec![];
        put_fixed_64(&mut buf, 0x0102_0304_0506_0708);
        assert_eq!(buf, [8u8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(decode_fixed_64(&buf), 0x0102_0304_0506_0708);
    }

    #[test]
    fn test_put_fixed_64_appends() {
        let mut dst = vec![0xff];
        put_fixed_64(&mut dst, 1);
        put_fixed_64(&mut dst, u64::MAX);
        assert_eq!(dst.len(), 17);
        assert_eq!(dst[0], 0xff);
        assert_eq!(decode_fixed_64(&dst[1..]), 1);
        assert_eq!(decode_fixed_64(&dst[9..]), u64::MAX);
    }
}

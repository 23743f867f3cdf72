//! Big-endian integer and float primitives.
//!
//! Pure conversions between raw byte spans and the numeric payloads used
//! by frame headers and AVPs. Callers guarantee the span is long enough;
//! floats travel as their IEEE-754 bit pattern, never numerically
//! converted.

use bytes::{Buf, BufMut};

pub fn get_u16(src: &[u8]) -> u16 {
    (&src[..2]).get_u16()
}

pub fn get_u32(src: &[u8]) -> u32 {
    (&src[..4]).get_u32()
}

pub fn get_f32(src: &[u8]) -> f32 {
    (&src[..4]).get_f32()
}

pub fn put_u16(dst: &mut [u8], value: u16) {
    (&mut dst[..2]).put_u16(value);
}

pub fn put_u32(dst: &mut [u8], value: u32) {
    (&mut dst[..4]).put_u32(value);
}

pub fn put_f32(dst: &mut [u8], value: f32) {
    (&mut dst[..4]).put_f32(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u16_is_big_endian() {
        let mut buf = [0u8; 2];
        put_u16(&mut buf, 0x8001);
        assert_eq!(buf, [0x80, 0x01]);
        assert_eq!(get_u16(&buf), 0x8001);
    }

    #[test]
    fn u32_is_big_endian() {
        let mut buf = [0u8; 4];
        put_u32(&mut buf, 500);
        assert_eq!(buf, [0x00, 0x00, 0x01, 0xF4]);
        assert_eq!(get_u32(&buf), 500);
    }

    #[test]
    fn f32_uses_bit_pattern() {
        let mut buf = [0u8; 4];
        put_f32(&mut buf, 1.5);
        assert_eq!(get_u32(&buf), 1.5f32.to_bits());
        assert_eq!(get_f32(&buf), 1.5);
    }

    #[test]
    fn reads_only_leading_bytes() {
        assert_eq!(get_u16(&[0x12, 0x34, 0xFF]), 0x1234);
    }
}

//! µ-law and A-law expansion to 16-bit linear PCM.

use alloc::vec::Vec;

const ULAW_BIAS: i32 = 33;

/// Expand one µ-law byte.
pub fn ulaw_to_linear(byte: u8) -> i16 {
    let s = !byte;
    let negative = s & 0x80 != 0;
    let s = (s & 0x7f) as i32;
    let shift = (s >> 4) + 5;
    let magnitude = (1 << shift) | ((s & 0x0f) << (shift - 4)) | (1 << (shift - 5));
    let signed = if negative { -magnitude } else { magnitude };
    (signed - ULAW_BIAS) as i16
}

/// Expand one A-law byte.
pub fn alaw_to_linear(byte: u8) -> i16 {
    let s = byte ^ 0x55;
    let negative = s & 0x80 != 0;
    let s = (s & 0x7f) as i32;
    let shift = (s >> 4) + 4;
    let magnitude = if shift == 4 {
        (s << 1) | 1
    } else {
        (1 << shift) | ((s & 0x0f) << (shift - 4)) | (1 << (shift - 5))
    };
    (if negative { -magnitude } else { magnitude }) as i16
}

pub fn decode_ulaw(input: &[u8]) -> Vec<i16> {
    input.iter().map(|&b| ulaw_to_linear(b)).collect()
}

pub fn decode_alaw(input: &[u8]) -> Vec<i16> {
    input.iter().map(|&b| alaw_to_linear(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0xFF, 0)]
    #[case(0x7F, -66)]
    #[case(0x80, 8031)]
    #[case(0x00, -8097)]
    fn ulaw_values(#[case] byte: u8, #[case] expected: i16) {
        assert_eq!(ulaw_to_linear(byte), expected);
    }

    #[rstest]
    #[case(0x55, 1)]
    #[case(0xD5, -1)]
    #[case(0x2A, 4032)]
    #[case(0xAA, -4032)]
    fn alaw_values(#[case] byte: u8, #[case] expected: i16) {
        assert_eq!(alaw_to_linear(byte), expected);
    }

    #[test]
    fn one_sample_per_byte() {
        let input: Vec<u8> = (0..=255).collect();
        assert_eq!(decode_ulaw(&input).len(), 256);
        assert_eq!(decode_alaw(&input).len(), 256);
    }

    #[test]
    fn ulaw_is_monotonic_within_each_sign() {
        // Bytes 0x80..=0xFF descend in magnitude towards zero.
        let pos: Vec<i16> = (0x80..=0xFFu8).map(ulaw_to_linear).collect();
        assert!(pos.windows(2).all(|w| w[0] > w[1]));
    }
}

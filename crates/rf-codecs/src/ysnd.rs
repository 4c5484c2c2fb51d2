//! Ysnd nibble-delta expansion to 8-bit PCM.

use alloc::vec::Vec;

use crate::CodecError;

/// Expand Ysnd data into exactly `samples` unsigned 8-bit samples.
///
/// Each byte carries two nibbles, high first. A nibble moves the running
/// predictor by `(nibble - 8) * 2`; nibbles 0x0 and 0xF move it without
/// emitting a sample.
pub fn expand_ysnd(input: &[u8], samples: usize) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::with_capacity(samples);
    let mut p: u8 = 0x80;
    let mut bytes = input.iter();

    while out.len() < samples {
        let Some(&byte) = bytes.next() else {
            return Err(CodecError::YsndTruncated { wanted: samples, produced: out.len() });
        };
        for nibble in [byte >> 4, byte & 0x0f] {
            p = p.wrapping_add(((nibble as i8 - 8) * 2) as u8);
            if nibble != 0 && nibble != 0x0f {
                out.push(p);
                if out.len() == samples {
                    break;
                }
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_nibbles_hold_level() {
        assert_eq!(expand_ysnd(&[0x88, 0x88], 4).unwrap(), [0x80; 4]);
    }

    #[test]
    fn deltas_accumulate() {
        // Nibbles 9, 7, E, 8 move by +2, -2, +12, 0.
        assert_eq!(expand_ysnd(&[0x97, 0xE8], 4).unwrap(), [0x82, 0x80, 0x8C, 0x8C]);
    }

    #[test]
    fn sentinels_move_without_emitting() {
        // 0x0: -16, 0xF: +14, 0x8: emit
        assert_eq!(expand_ysnd(&[0x0F, 0x88], 2).unwrap(), [0x7E, 0x7E]);
    }

    #[test]
    fn predictor_wraps() {
        // Repeated +12 steps from 0x80 pass through 0xFF.
        let out = expand_ysnd(&[0xEE; 6], 12).unwrap();
        assert_eq!(out[0], 0x8C);
        assert_eq!(out[9], 0xF8);
        assert_eq!(out[10], 0x04);
        assert_eq!(out[11], 0x10);
    }

    #[test]
    fn stops_at_requested_count() {
        assert_eq!(expand_ysnd(&[0x99, 0x99], 3).unwrap().len(), 3);
    }

    #[test]
    fn short_input_is_error() {
        assert_eq!(
            expand_ysnd(&[0x00, 0x88], 3),
            Err(CodecError::YsndTruncated { wanted: 3, produced: 2 })
        );
    }
}

//! MACE 3:1 and 6:1 decoders.

use alloc::vec::Vec;
use arrayvec::ArrayVec;

use crate::mace_tables::{INDEX_DELTA_2BIT, INDEX_DELTA_3BIT, STEP_2BIT, STEP_3BIT};
use crate::{check_channels, CodecError, MAX_CHANNELS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaceVariant {
    Mace3,
    Mace6,
}

impl MaceVariant {
    /// Encoded bytes one channel consumes per step.
    pub fn bytes_per_step(self) -> usize {
        match self {
            MaceVariant::Mace3 => 2,
            MaceVariant::Mace6 => 1,
        }
    }

    /// Decoded samples per encoded byte.
    pub fn expansion(self) -> usize {
        match self {
            MaceVariant::Mace3 => 3,
            MaceVariant::Mace6 => 6,
        }
    }
}

/// Which coefficient table a codeword digit is looked up in.
#[derive(Clone, Copy)]
enum Codebook {
    ThreeBit,
    TwoBit,
}

/// Digit position -> codebook. Each byte carries a 3-bit, a 2-bit and a 3-bit digit.
const CODEBOOKS: [Codebook; 3] = [Codebook::ThreeBit, Codebook::TwoBit, Codebook::ThreeBit];

impl Codebook {
    fn stride(self) -> usize {
        match self {
            Codebook::ThreeBit => 4,
            Codebook::TwoBit => 2,
        }
    }

    fn index_delta(self, value: usize) -> i32 {
        match self {
            Codebook::ThreeBit => INDEX_DELTA_3BIT[value],
            Codebook::TwoBit => INDEX_DELTA_2BIT[value],
        }
    }

    fn step(self, row: usize, col: usize) -> i32 {
        match self {
            Codebook::ThreeBit => STEP_3BIT[row][col] as i32,
            Codebook::TwoBit => STEP_2BIT[row][col] as i32,
        }
    }
}

/// Running state for one channel.
#[derive(Clone, Copy, Debug, Default)]
struct ChannelState {
    index: i32,
    factor: i32,
    prev2: i32,
    previous: i32,
    level: i32,
}

impl ChannelState {
    fn read_table(&mut self, value: u8, book: Codebook) -> i32 {
        let value = value as usize;
        let stride = book.stride();
        let row = ((self.index & 0x7f0) >> 4) as usize;
        let current = if value < stride {
            book.step(row, value)
        } else {
            -1 - book.step(row, 2 * stride - value - 1)
        };

        self.index += book.index_delta(value) - (self.index >> 5);
        if self.index < 0 {
            self.index = 0;
        }
        current
    }

    fn mace3_byte(&mut self, byte: u8, out: &mut Vec<i16>) {
        let digits = [byte & 7, (byte >> 3) & 3, byte >> 5];
        for (digit, book) in digits.into_iter().zip(CODEBOOKS) {
            let current = self.read_table(digit, book);
            let sample = clip_int16(current + self.level);
            out.push(sample as i16);
            self.level = sample - (sample >> 3);
        }
    }

    fn mace6_byte(&mut self, byte: u8, out: &mut Vec<i16>) {
        let digits = [byte >> 5, (byte >> 3) & 3, byte & 7];
        for (digit, book) in digits.into_iter().zip(CODEBOOKS) {
            let mut current = self.read_table(digit, book);

            if (self.previous ^ current) >= 0 {
                self.factor = (self.factor + 506).min(32767);
            } else if self.factor - 314 < -32768 {
                self.factor = -32767;
            } else {
                self.factor -= 314;
            }

            current = clip_int16(current + self.level);
            self.level = (current * self.factor) >> 15;
            current >>= 1;

            let spread = (self.prev2 - current) >> 2;
            // Second-order interpolation can leave the 16-bit range; wraps like the
            // int16 store it replaces.
            out.push((self.previous + self.prev2 - spread) as i16);
            out.push((self.previous + current + spread) as i16);

            self.prev2 = self.previous;
            self.previous = current;
        }
    }
}

/// Saturate to 16 bits. The negative bound is -0x7fff, not -0x8000.
fn clip_int16(x: i32) -> i32 {
    if x > 0x7fff {
        0x7fff
    } else if x < -0x8000 {
        -0x7fff
    } else {
        x
    }
}

/// Decode a MACE stream of `channels` (1 or 2) interleaved step blocks.
///
/// `input.len()` must be a multiple of `bytes_per_step() * channels`. The
/// output holds `input.len() * expansion()` samples; each channel's block of
/// samples for a step is written before the next channel's.
pub fn decode_mace(input: &[u8], channels: usize, variant: MaceVariant) -> Result<Vec<i16>, CodecError> {
    check_channels(channels)?;
    let step_bytes = variant.bytes_per_step();
    let frame_bytes = step_bytes * channels;
    if input.len() % frame_bytes != 0 {
        return Err(CodecError::OddFrameData { len: input.len(), frame_bytes });
    }

    let mut states: ArrayVec<ChannelState, MAX_CHANNELS> = ArrayVec::new();
    for _ in 0..channels {
        states.push(ChannelState::default());
    }

    let mut out = Vec::with_capacity(input.len() * variant.expansion());
    for frame in input.chunks_exact(frame_bytes) {
        for (state, block) in states.iter_mut().zip(frame.chunks_exact(step_bytes)) {
            for &byte in block {
                match variant {
                    MaceVariant::Mace3 => state.mace3_byte(byte, &mut out),
                    MaceVariant::Mace6 => state.mace6_byte(byte, &mut out),
                }
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn clip_quirk() {
        assert_eq!(clip_int16(40000), 0x7fff);
        assert_eq!(clip_int16(-40000), -0x7fff);
        assert_eq!(clip_int16(-0x8000), -0x8000);
    }

    #[test]
    fn read_table_mirrors_upper_half() {
        let mut st = ChannelState::default();
        assert_eq!(st.read_table(0, Codebook::ThreeBit), 37);
        let mut st = ChannelState::default();
        assert_eq!(st.read_table(7, Codebook::ThreeBit), -1 - 37);
        let mut st = ChannelState::default();
        assert_eq!(st.read_table(3, Codebook::TwoBit), -1 - 64);
    }

    #[test]
    fn index_never_goes_negative() {
        let mut st = ChannelState::default();
        st.read_table(0, Codebook::TwoBit);
        assert_eq!(st.index, 0);
        st.read_table(1, Codebook::TwoBit);
        assert_eq!(st.index, 140);
    }

    #[test]
    fn mace3_zero_bytes() {
        // All-zero digits: steps 37, 64+, 37+ with level feedback.
        let out = decode_mace(&[0, 0], 1, MaceVariant::Mace3).unwrap();
        assert_eq!(out.len(), 6);
        assert_eq!(out[0], 37);
        // index after first digit: 0 - 13 -> clamped 0; row 0 -> 64; level 37 - 4 = 33
        assert_eq!(out[1], 64 + 33);
    }

    #[test]
    fn mace6_first_pair() {
        let out = decode_mace(&[0], 1, MaceVariant::Mace6).unwrap();
        assert_eq!(out.len(), 6);
        // current 37, factor 506, level 0 -> current stays 37, halved to 18.
        // outputs: 0 + 0 - ((0 - 18) >> 2) = 5 ; 0 + 18 + (-5) = 13
        assert_eq!(&out[..2], &[5, 13]);
    }

    #[test]
    fn mace3_known_output() {
        let out = decode_mace(&[0x12, 0x34, 0x56, 0x78], 1, MaceVariant::Mace3).unwrap();
        assert_eq!(out, [206, -77, -1, -558, -1133, -501, -929, -1689, -294, -11, -398, 1467]);
    }

    #[test]
    fn mace6_known_output() {
        let out = decode_mace(&[0x9A, 0xBC], 1, MaceVariant::Mace6).unwrap();
        assert_eq!(out, [-41, -125, -180, -208, -137, 32, 79, 2, -99, -225, -330, -416]);
    }

    #[test]
    fn mace6_stereo_known_output() {
        let out = decode_mace(&[0x9A, 0x33, 0xBC, 0x44], 2, MaceVariant::Mace6).unwrap();
        assert_eq!(
            out,
            [
                -41, -125, -180, -208, -137, 32, 15, 43, 31, -23, -3, 89, //
                79, 2, -99, -225, -330, -416, 230, 418, 477, 406, 182, -198,
            ]
        );
    }

    #[test]
    fn mace3_saturates_on_sustained_peaks() {
        let out = decode_mace(&[0x6B; 40], 1, MaceVariant::Mace3).unwrap();
        assert_eq!(out.iter().filter(|&&s| s == i16::MAX).count(), 76);
        assert_eq!(&out[114..], &[i16::MAX; 6]);
    }

    #[test]
    fn stereo_channels_are_independent() {
        let mono = decode_mace(&[0x5A, 0xC3], 1, MaceVariant::Mace3).unwrap();
        let stereo = decode_mace(&[0x5A, 0xC3, 0x5A, 0xC3], 2, MaceVariant::Mace3).unwrap();
        assert_eq!(&stereo[..6], &mono[..]);
        assert_eq!(&stereo[6..], &mono[..]);
    }

    #[rstest]
    #[case::mace3_mono(MaceVariant::Mace3, 1, 3)]
    #[case::mace3_stereo(MaceVariant::Mace3, 2, 6)]
    #[case::mace6_stereo(MaceVariant::Mace6, 2, 3)]
    fn misaligned_input_rejected(#[case] variant: MaceVariant, #[case] channels: usize, #[case] len: usize) {
        let input = alloc::vec![0u8; len];
        assert!(matches!(
            decode_mace(&input, channels, variant),
            Err(CodecError::OddFrameData { .. })
        ));
    }

    #[test]
    fn too_many_channels_rejected() {
        assert_eq!(
            decode_mace(&[0; 6], 3, MaceVariant::Mace6),
            Err(CodecError::UnsupportedChannels(3))
        );
    }

    proptest! {
        #[test]
        fn output_length_law(data in proptest::collection::vec(any::<u8>(), 0..256), stereo in any::<bool>()) {
            let channels = if stereo { 2 } else { 1 };
            for variant in [MaceVariant::Mace3, MaceVariant::Mace6] {
                let frame = variant.bytes_per_step() * channels;
                let len = data.len() - data.len() % frame;
                let out = decode_mace(&data[..len], channels, variant).unwrap();
                prop_assert_eq!(out.len(), len * variant.expansion());
            }
        }

        #[test]
        fn decoding_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..128)) {
            let a = decode_mace(&data, 1, MaceVariant::Mace6).unwrap();
            let b = decode_mace(&data, 1, MaceVariant::Mace6).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}

//! QuickTime IMA4 ADPCM.
//!
//! Packets are 34 bytes: a big-endian header word (9-bit predictor in the
//! high bits, 7-bit step index in the low bits) followed by 64 nibbles, low
//! nibble first. Stereo streams alternate packets between channels.

use alloc::vec;
use alloc::vec::Vec;
use arrayvec::ArrayVec;

use crate::{check_channels, CodecError, MAX_CHANNELS};

pub const IMA4_PACKET_BYTES: usize = 34;
pub const IMA4_SAMPLES_PER_PACKET: usize = 64;

const INDEX_TABLE: [i32; 16] = [-1, -1, -1, -1, 2, 4, 6, 8, -1, -1, -1, -1, 2, 4, 6, 8];

const STEP_TABLE: [i32; 89] = [
    7, 8, 9, 10, 11, 12, 13, 14, 16, 17, 19, 21, 23, 25, 28, 31, 34, 37, 41, 45, 50, 55, 60, 66,
    73, 80, 88, 97, 107, 118, 130, 143, 157, 173, 190, 209, 230, 253, 279, 307, 337, 371, 408,
    449, 494, 544, 598, 658, 724, 796, 876, 963, 1060, 1166, 1282, 1411, 1552, 1707, 1878, 2066,
    2272, 2499, 2749, 3024, 3327, 3660, 4026, 4428, 4871, 5358, 5894, 6484, 7132, 7845, 8630,
    9493, 10442, 11487, 12635, 13899, 15289, 16818, 18500, 20350, 22385, 24623, 27086, 29794,
    32767,
];

#[derive(Clone, Copy, Debug)]
struct ChannelState {
    predictor: i32,
    step_index: usize,
}

impl ChannelState {
    /// Seed from a packet header word.
    fn from_header(header: u16) -> Self {
        // The 9 predictor bits already sit in the high end of the word.
        let predictor = (header & 0xff80) as i16 as i32;
        let step_index = ((header & 0x7f) as usize).min(STEP_TABLE.len() - 1);
        Self { predictor, step_index }
    }

    fn decode_nibble(&mut self, nibble: u8) -> i16 {
        let step = STEP_TABLE[self.step_index];
        let mut diff = step >> 3;
        if nibble & 4 != 0 {
            diff += step;
        }
        if nibble & 2 != 0 {
            diff += step >> 1;
        }
        if nibble & 1 != 0 {
            diff += step >> 2;
        }
        if nibble & 8 != 0 {
            diff = -diff;
        }

        self.predictor = (self.predictor + diff).clamp(i16::MIN as i32, i16::MAX as i32);
        let next = self.step_index as i32 + INDEX_TABLE[nibble as usize];
        self.step_index = next.clamp(0, STEP_TABLE.len() as i32 - 1) as usize;
        self.predictor as i16
    }
}

/// Decode an IMA4 stream of 1 or 2 channels into interleaved samples.
///
/// Each channel is seeded from the header of its first packet and its state
/// then runs continuously across all of that channel's packets.
pub fn decode_ima4(input: &[u8], channels: usize) -> Result<Vec<i16>, CodecError> {
    check_channels(channels)?;
    let frame_bytes = IMA4_PACKET_BYTES * channels;
    if input.len() % frame_bytes != 0 {
        return Err(CodecError::OddFrameData { len: input.len(), frame_bytes });
    }
    let packets = input.len() / IMA4_PACKET_BYTES;
    let mut out = vec![0i16; packets * IMA4_SAMPLES_PER_PACKET];
    if packets == 0 {
        return Ok(out);
    }

    let mut states: ArrayVec<ChannelState, MAX_CHANNELS> = input
        .chunks_exact(IMA4_PACKET_BYTES)
        .take(channels)
        .map(|p| ChannelState::from_header(u16::from_be_bytes([p[0], p[1]])))
        .collect();

    let stereo = channels == 2;
    for (index, packet) in input.chunks_exact(IMA4_PACKET_BYTES).enumerate() {
        let (channel, mut pos, stride) = if stereo {
            (index & 1, (index & !1) * IMA4_SAMPLES_PER_PACKET + (index & 1), 2)
        } else {
            (0, index * IMA4_SAMPLES_PER_PACKET, 1)
        };
        let state = &mut states[channel];

        for &byte in &packet[2..] {
            for nibble in [byte & 0x0f, byte >> 4] {
                out[pos] = state.decode_nibble(nibble);
                pos += stride;
            }
        }
    }
    Ok(out)
}

//! Sample codecs used by classic Sound Manager `snd ` resources.
//!
//! Every decoder is a pure function from an encoded byte slice to a freshly
//! allocated sample buffer. Per-channel predictor state lives on the stack of
//! the call and is dropped on return, so independent resources can be decoded
//! in parallel without coordination.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod g711;
mod ima4;
mod mace;
mod mace_tables;
mod ysnd;

pub use g711::{alaw_to_linear, decode_alaw, decode_ulaw, ulaw_to_linear};
pub use ima4::{decode_ima4, IMA4_PACKET_BYTES, IMA4_SAMPLES_PER_PACKET};
pub use mace::{decode_mace, MaceVariant};
pub use ysnd::expand_ysnd;

use alloc::vec::Vec;
use thiserror::Error;

/// Highest channel count the ADPCM decoders keep state for.
pub const MAX_CHANNELS: usize = 2;

/// Error type for codec failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Input length is not a whole number of codec frames.
    #[error("odd frame data: {len} bytes is not a multiple of the {frame_bytes}-byte frame")]
    OddFrameData { len: usize, frame_bytes: usize },
    /// The decoder only keeps state for mono and stereo streams.
    #[error("unsupported channel count {0}")]
    UnsupportedChannels(usize),
    /// Ysnd input ended before the requested number of samples was produced.
    #[error("Ysnd data ended after {produced} of {wanted} samples")]
    YsndTruncated { wanted: usize, produced: usize },
}

/// Serialize 16-bit samples as little-endian PCM bytes.
pub fn samples_to_le_bytes(samples: &[i16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}

fn check_channels(channels: usize) -> Result<(), CodecError> {
    if channels == 0 || channels > MAX_CHANNELS {
        return Err(CodecError::UnsupportedChannels(channels));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn le_bytes_low_byte_first() {
        assert_eq!(samples_to_le_bytes(&[0x1234, -2]), [0x34, 0x12, 0xFE, 0xFF]);
    }

    #[test]
    fn channel_bounds() {
        assert!(check_channels(1).is_ok());
        assert!(check_channels(2).is_ok());
        assert_eq!(check_channels(0), Err(CodecError::UnsupportedChannels(0)));
        assert_eq!(check_channels(3), Err(CodecError::UnsupportedChannels(3)));
    }
}

//! Converters from classic Mac sound and music resources to standard files.
//!
//! `snd ` (and Ysnd-compressed `snd `) resources decode to RIFF/WAVE, or to a
//! raw MP3 stream for Beatnik format-3 sounds. `Tune` resources convert to a
//! single-track Standard MIDI File.

mod snd_format;
mod tune_format;
mod wav_format;

pub use snd_format::{decode_snd, DecodeOptions, DecodedSoundResource, LoopType};
pub use tune_format::{read_vlq, tune_to_midi, write_vlq, MIDI_DIVISION};
pub use wav_format::{build_wav, inspect_wav, SmplChunk, WavHeader, WavInfo, DEFAULT_BASE_NOTE};

use rf_codecs::CodecError;
use thiserror::Error;

/// Render a four-character code for error messages.
pub(crate) fn fourcc(code: u32) -> String {
    code.to_be_bytes()
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
        .collect()
}

/// Error type for `snd ` decoding.
#[derive(Debug, Error)]
pub enum SoundError {
    #[error("snd is too short to hold a format code ({0} bytes)")]
    MissingFormatCode(usize),
    /// A fixed-size header record ran past the end of the resource.
    #[error("truncated snd record: {0}")]
    Record(#[from] binrw::Error),
    #[error("unsupported snd format: {0}")]
    UnsupportedFormat(String),
    /// A sound command this decoder does not execute.
    #[error("sound command not implemented: {code:#06x} ({name}) {param1} {param2}")]
    UnsupportedCommand { code: u16, name: &'static str, param1: u16, param2: u32 },
    #[error("unknown sound command {code:#06x} {param1} {param2}")]
    UnknownCommand { code: u16, param1: u16, param2: u32 },
    #[error("snd contains multiple buffer commands")]
    MultipleBufferCommands,
    #[error("snd contains no commands")]
    NoCommands,
    #[error("snd contains no samples")]
    NoSamples,
    #[error("unsupported compression: {0}")]
    UnsupportedCompression(String),
    /// Computed output size disagrees with the decoded or available data.
    #[error("size mismatch: computed {computed} bytes, have {actual}")]
    SizeMismatch { computed: usize, actual: usize },
    #[error("format 3 snd is little-endian")]
    LittleEndianUnsupported,
    #[error("format 3 snd is encrypted")]
    EncryptedUnsupported,
    #[error("cannot decompress Ysnd-encoded format 3 snd")]
    YsndUnsupported,
    #[error("Ysnd contains doubly-compressed buffer (encoding {0:#04x})")]
    DoublyCompressed(u8),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Error type for `Tune` conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TuneError {
    #[error("Tune identifier is incorrect: {0}")]
    BadMagic(String),
    #[error("Tune event word at {offset:#x} runs past the end of the resource")]
    Truncated { offset: usize },
    #[error("notes produced on uninitialized partition {0}")]
    UninitializedPartition(u16),
    #[error("not enough MIDI channels for partition {0}")]
    ChannelExhausted(u16),
    #[error("metadata message too short for type field ({0} bytes)")]
    MetadataTooShort(usize),
    #[error("metadata message of {size} bytes exceeds track boundary")]
    MetadataOverrun { size: usize },
    #[error("metadata type {kind} has incorrect size {size}")]
    MetadataSize { kind: u16, size: usize },
    #[error("unknown metadata event type {0}")]
    UnknownMetadataType(u16),
    #[error("unsupported event type {kind:#x} at offset {offset:#x}")]
    UnsupportedEvent { kind: u8, offset: usize },
}

/// Error type for WAV inspection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WavError {
    #[error("WAV data too short ({0} bytes)")]
    TooShort(usize),
    #[error("missing RIFF/WAVE magic")]
    NotRiff,
    #[error("WAV format {0} is not PCM")]
    NotPcm(u16),
    #[error("WAV has no '{0}' chunk")]
    MissingChunk(&'static str),
}

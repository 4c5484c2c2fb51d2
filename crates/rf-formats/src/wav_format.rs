//! RIFF/WAVE synthesis and inspection for decoded sounds.

use crate::WavError;

/// Middle C; a `smpl` chunk is only written when the base note differs or a
/// loop is present.
pub const DEFAULT_BASE_NOTE: u8 = 60;

const BASE_HEADER_SIZE: usize = 44;
const SMPL_CHUNK_SIZE: usize = 68;

// --- Writing ---

/// Loop region and root note carried in a `smpl` chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SmplChunk {
    /// Nanoseconds per sample.
    pub sample_period: u32,
    pub base_note: u8,
    /// Byte offsets into the data chunk.
    pub loop_start: u32,
    pub loop_end: u32,
}

/// A canonical PCM WAV header, with sizes computed from the sample count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WavHeader {
    pub num_channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub data_size: u32,
    pub smpl: Option<SmplChunk>,
}

impl WavHeader {
    /// Header for `num_frames` frames of `num_channels` interleaved samples.
    pub fn new(num_frames: u32, num_channels: u16, sample_rate: u32, bits_per_sample: u16) -> Self {
        let data_size = num_frames as u64 * num_channels as u64 * bits_per_sample as u64 / 8;
        Self {
            num_channels,
            sample_rate,
            bits_per_sample,
            // Saturates; callers compare it against the payload length.
            data_size: u32::try_from(data_size).unwrap_or(u32::MAX),
            smpl: None,
        }
    }

    /// Attach loop points (in samples) and a base note. The `smpl` chunk is
    /// only added when both loop points are nonzero or the note is not middle C.
    pub fn with_loop(mut self, loop_start: u32, loop_end: u32, base_note: u8) -> Self {
        if (loop_start > 0 && loop_end > 0) || base_note != DEFAULT_BASE_NOTE {
            let bytes_per_sample = (self.bits_per_sample >> 3) as u32;
            self.smpl = Some(SmplChunk {
                sample_period: sample_period_ns(self.sample_rate),
                base_note,
                loop_start: loop_start.wrapping_mul(bytes_per_sample),
                loop_end: loop_end.wrapping_mul(bytes_per_sample),
            });
        }
        self
    }

    pub fn block_align(&self) -> u32 {
        self.num_channels as u32 * self.bits_per_sample as u32 / 8
    }

    pub fn header_size(&self) -> usize {
        BASE_HEADER_SIZE + if self.smpl.is_some() { SMPL_CHUNK_SIZE } else { 0 }
    }

    /// RIFF size field: everything after the first eight bytes.
    pub fn file_size(&self) -> u32 {
        self.data_size.saturating_add(self.header_size() as u32 - 8)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.header_size());
        put_riff_header(&mut buf, self.file_size());
        put_fmt_chunk(&mut buf, self);
        if let Some(smpl) = &self.smpl {
            put_smpl_chunk(&mut buf, smpl);
        }
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&self.data_size.to_le_bytes());
        buf
    }
}

/// `round(1e9 / rate)`, or 0 for a zero rate.
fn sample_period_ns(sample_rate: u32) -> u32 {
    if sample_rate == 0 {
        0
    } else {
        libm::round(1_000_000_000.0 / sample_rate as f64) as u32
    }
}

fn put_riff_header(buf: &mut Vec<u8>, file_size: u32) {
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");
}

fn put_fmt_chunk(buf: &mut Vec<u8>, h: &WavHeader) {
    let block_align = h.block_align();
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&h.num_channels.to_le_bytes());
    buf.extend_from_slice(&h.sample_rate.to_le_bytes());
    buf.extend_from_slice(&h.sample_rate.saturating_mul(block_align).to_le_bytes());
    buf.extend_from_slice(&u16::try_from(block_align).unwrap_or(u16::MAX).to_le_bytes());
    buf.extend_from_slice(&h.bits_per_sample.to_le_bytes());
}

fn put_smpl_chunk(buf: &mut Vec<u8>, smpl: &SmplChunk) {
    buf.extend_from_slice(b"smpl");
    let fields: [u32; 16] = [
        0x3C, // chunk size
        0,    // manufacturer
        0,    // product
        smpl.sample_period,
        smpl.base_note as u32,
        0, // pitch fraction
        0, // SMPTE format
        0, // SMPTE offset
        1, // loop count
        0x18,
        0, // cue point id
        0, // loop type: normal
        smpl.loop_start,
        smpl.loop_end,
        0, // fraction
        0, // play count: forever
    ];
    for f in fields {
        buf.extend_from_slice(&f.to_le_bytes());
    }
}

/// Concatenate a header and its sample payload.
pub fn build_wav(header: &WavHeader, payload: &[u8]) -> Vec<u8> {
    let mut buf = header.to_bytes();
    buf.extend_from_slice(payload);
    buf
}

// --- Reading ---

/// Fields recovered from a WAV file by [`inspect_wav`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WavInfo {
    pub num_channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub data_offset: usize,
    pub data_size: usize,
    pub smpl: Option<SmplChunk>,
}

/// Parse the chunk structure of a PCM WAV file.
pub fn inspect_wav(data: &[u8]) -> Result<WavInfo, WavError> {
    if data.len() < BASE_HEADER_SIZE {
        return Err(WavError::TooShort(data.len()));
    }
    if &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return Err(WavError::NotRiff);
    }

    let mut pos = 12;
    let mut fmt: Option<(u16, u32, u16)> = None;
    let mut data_chunk: Option<(usize, usize)> = None;
    let mut smpl = None;

    while data.len().saturating_sub(pos) >= 8 {
        let chunk_id = &data[pos..pos + 4];
        let chunk_size = read_u32_le(data, pos + 4) as usize;
        let body = pos + 8;

        if chunk_id == b"fmt " && chunk_size >= 16 && body + 16 <= data.len() {
            let format = read_u16_le(data, body);
            if format != 1 {
                return Err(WavError::NotPcm(format));
            }
            let channels = read_u16_le(data, body + 2);
            let rate = read_u32_le(data, body + 4);
            let bits = read_u16_le(data, body + 14);
            fmt = Some((channels, rate, bits));
        } else if chunk_id == b"smpl" && chunk_size >= 0x3C && body + 0x3C <= data.len() {
            smpl = Some(SmplChunk {
                sample_period: read_u32_le(data, body + 8),
                base_note: read_u32_le(data, body + 12) as u8,
                loop_start: read_u32_le(data, body + 44),
                loop_end: read_u32_le(data, body + 48),
            });
        } else if chunk_id == b"data" {
            data_chunk = Some((body, chunk_size));
        }

        // Chunks are padded to even length.
        pos = body.saturating_add(chunk_size.saturating_add(chunk_size & 1));
    }

    let (num_channels, sample_rate, bits_per_sample) = fmt.ok_or(WavError::MissingChunk("fmt "))?;
    let (data_offset, data_size) = data_chunk.ok_or(WavError::MissingChunk("data"))?;

    Ok(WavInfo { num_channels, sample_rate, bits_per_sample, data_offset, data_size, smpl })
}

fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

//! Sound Manager `snd ` resource decoder.
//!
//! Handles format 1 and 2 command-list resources, the Mohawk chunked
//! variant, and Beatnik's format 3 (embedded MP3). Sampled data is
//! re-emitted as a RIFF/WAVE file; compressed data is expanded to 16-bit PCM
//! first.
//! Reference: Inside Macintosh, Sound, ch. 2 ("Sound Manager Reference").

use binrw::io::Cursor;
use binrw::BinRead;
use rf_codecs::{
    decode_alaw, decode_ima4, decode_mace, decode_ulaw, expand_ysnd, samples_to_le_bytes, MaceVariant,
    IMA4_PACKET_BYTES,
};

use crate::wav_format::{build_wav, WavHeader, DEFAULT_BASE_NOTE};
use crate::{fourcc, SoundError};

// Mohawk chunk tags
const TAG_CUE: u32 = 0x4375_6523; // 'Cue#'
const TAG_DATA: u32 = 0x4461_7461; // 'Data'

// Compressed sound format tags
const FORMAT_TWOS: u32 = 0x7477_6f73;
const FORMAT_SOWT: u32 = 0x736f_7774;
const FORMAT_IMA4: u32 = 0x696d_6134;
const FORMAT_MAC3: u32 = 0x4d41_4333;
const FORMAT_MAC6: u32 = 0x4d41_4336;
const FORMAT_ULAW: u32 = 0x756c_6177;
const FORMAT_ALAW: u32 = 0x616c_6177;

const MP3_TYPE_PREFIX: u32 = 0x6d70_6700; // 'mpg?'
const SAMPLED_SOUND_FORMAT: u16 = 5;
const STEREO_FLAG: u32 = 0x40;

const ENCODING_UNCOMPRESSED: u8 = 0x00;
const ENCODING_COMPRESSED: u8 = 0xFE;
const ENCODING_EXTENDED: u8 = 0xFF;

const COMPRESSION_NONE: u16 = 0;
const COMPRESSION_MACE3: u16 = 3;
const COMPRESSION_MACE6: u16 = 4;
const COMPRESSION_FIXED: u16 = 0xFFFF;
const COMPRESSION_VARIABLE: u16 = 0xFFFE;

/// Behavior switches for [`decode_snd`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Validate structure and fill in metadata, but leave `data` empty.
    pub metadata_only: bool,
    /// Beatnik (HIRF) archive rules: accept format 3 and ignore the stereo
    /// flag on compressed sounds.
    pub hirf_semantics: bool,
    /// Treat uncompressed sample data as Ysnd nibble deltas.
    pub decompress_ysnd: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopType {
    #[default]
    Normal,
    Alternate,
    Reverse,
}

/// Result of decoding one `snd ` resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedSoundResource {
    /// `data` is a raw MP3 stream rather than a WAV file.
    pub is_mp3: bool,
    pub sample_rate: u32,
    pub base_note: u8,
    pub num_channels: u16,
    pub bits_per_sample: u16,
    /// Loop bounds in output samples.
    pub loop_start: u32,
    pub loop_end: u32,
    /// 0 loops forever.
    pub loop_repeat_count: u32,
    pub loop_type: LoopType,
    /// Offset of the first sample within `data` (the WAV header length).
    pub sample_start_offset: usize,
    pub data: Vec<u8>,
}

impl Default for DecodedSoundResource {
    fn default() -> Self {
        Self {
            is_mp3: false,
            sample_rate: 0,
            base_note: DEFAULT_BASE_NOTE,
            num_channels: 1,
            bits_per_sample: 0,
            loop_start: 0,
            loop_end: 0,
            loop_repeat_count: 0,
            loop_type: LoopType::Normal,
            sample_start_offset: 0,
            data: Vec::new(),
        }
    }
}

impl DecodedSoundResource {
    /// The sample payload without the WAV header.
    pub fn samples(&self) -> &[u8] {
        self.data.get(self.sample_start_offset..).unwrap_or(&[])
    }

    /// File extension matching `data`.
    pub fn extension(&self) -> &'static str {
        if self.is_mp3 {
            "mp3"
        } else {
            "wav"
        }
    }
}

// ---------------------------------------------------------------------------
// On-disk records
// ---------------------------------------------------------------------------

#[derive(BinRead, Debug)]
#[br(big)]
struct MohawkChunkHeader {
    kind: u32,
    /// Excludes this header.
    size: u32,
}

#[derive(BinRead, Debug)]
#[br(big)]
#[allow(dead_code)]
struct MohawkFormat {
    sample_rate: u16,
    num_samples: u32,
    sample_bits: u8,
    num_channels: u8,
    unknown: [u32; 3],
}

#[derive(BinRead, Debug)]
#[br(big)]
#[allow(dead_code)]
struct Format1Header {
    format_code: u16,
    data_format_count: u16,
}

#[derive(BinRead, Debug)]
#[br(big)]
struct DataFormat {
    data_format_id: u16,
    flags: u32,
}

#[derive(BinRead, Debug)]
#[br(big)]
#[allow(dead_code)]
struct Format2Header {
    format_code: u16,
    reference_count: u16,
    num_commands: u16,
}

/// Beatnik's extended header for MPEG-encoded samples.
#[derive(BinRead, Debug)]
#[br(big)]
#[allow(dead_code)]
struct Format3Header {
    format_code: u16,
    kind: u32,
    sample_rate: u32,
    decoded_bytes: u32,
    frame_count: u32,
    encoded_bytes: u32,
    unused: u32,
    start_frame: u32,
    channel_loop_start_frame: [u32; 6],
    channel_loop_end_frame: [u32; 6],
    name_resource_type: u32,
    name_resource_id: u32,
    base_note: u8,
    channel_count: u8,
    bits_per_sample: u8,
    is_embedded: u8,
    is_encrypted: u8,
    is_little_endian: u8,
    reserved1: [u32; 2],
    reserved2: [u32; 8],
}

#[derive(BinRead, Debug, Clone, Copy)]
#[br(big)]
struct SoundCommand {
    command: u16,
    param1: u16,
    param2: u32,
}

#[derive(BinRead, Debug)]
#[br(big)]
#[allow(dead_code)]
struct SampleBuffer {
    data_offset: u32,
    data_bytes: u32,
    /// 16.16 fixed point.
    sample_rate: u32,
    loop_start: u32,
    loop_end: u32,
    encoding: u8,
    base_note: u8,
}

#[derive(BinRead, Debug)]
#[br(big)]
#[allow(dead_code)]
struct CompressedBuffer {
    num_frames: u32,
    sample_rate_80: [u8; 10],
    marker_chunk: u32,
    format: u32,
    reserved: u32,
    state_vars: u32,
    leftover: u32,
    compression_id: u16,
    packet_size: u16,
    synth_id: u16,
    bits_per_sample: u16,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Header layout detected from the leading bytes.
enum SndLayout {
    Mohawk,
    Commands { num_channels: u16, num_commands: u16 },
    BeatnikMp3(Box<Format3Header>),
}

/// Decode a `snd ` resource payload.
pub fn decode_snd(data: &[u8], opts: &DecodeOptions) -> Result<DecodedSoundResource, SoundError> {
    if data.len() < 4 {
        return Err(SoundError::MissingFormatCode(data.len()));
    }

    let mut r = Cursor::new(data);
    match detect_layout(&mut r, opts)? {
        SndLayout::Mohawk => decode_mohawk(data, opts),
        SndLayout::BeatnikMp3(header) => decode_beatnik_mp3(data, r.position() as usize, &header, opts),
        SndLayout::Commands { num_channels, num_commands } => {
            read_commands(&mut r, num_commands)?;
            decode_sampled(&mut r, data, num_channels, opts)
        }
    }
}

fn detect_layout(r: &mut Cursor<&[u8]>, opts: &DecodeOptions) -> Result<SndLayout, SoundError> {
    let tag = u32::read_be(r)?;
    if tag == TAG_CUE || tag == TAG_DATA {
        tracing::debug!("snd: Mohawk chunked layout");
        return Ok(SndLayout::Mohawk);
    }
    r.set_position(0);

    let format_code = u16::read_be(r)?;
    r.set_position(0);
    match format_code {
        1 => {
            let header = Format1Header::read(r)?;
            let num_channels = match header.data_format_count {
                0 => 1,
                1 => {
                    let format = DataFormat::read(r)?;
                    if format.data_format_id != SAMPLED_SOUND_FORMAT {
                        return Err(SoundError::UnsupportedFormat(format!(
                            "data format {} is not sampled",
                            format.data_format_id
                        )));
                    }
                    if format.flags & STEREO_FLAG != 0 {
                        2
                    } else {
                        1
                    }
                }
                n => {
                    return Err(SoundError::UnsupportedFormat(format!("{n} data formats")));
                }
            };
            let num_commands = u16::read_be(r)?;
            tracing::debug!(num_channels, num_commands, "snd: format 1");
            Ok(SndLayout::Commands { num_channels, num_commands })
        }
        2 => {
            let header = Format2Header::read(r)?;
            tracing::debug!(num_commands = header.num_commands, "snd: format 2");
            Ok(SndLayout::Commands { num_channels: 1, num_commands: header.num_commands })
        }
        3 if opts.hirf_semantics => {
            let header = Format3Header::read(r)?;
            tracing::debug!(kind = %fourcc(header.kind), "snd: Beatnik format 3");
            Ok(SndLayout::BeatnikMp3(Box::new(header)))
        }
        other => Err(SoundError::UnsupportedFormat(format!("format code {other}"))),
    }
}

fn command_name(code: u16) -> Option<&'static str> {
    Some(match code {
        0x0003 => "quiet",
        0x0004 => "flush",
        0x0005 => "reinit",
        0x000a => "wait",
        0x000b => "pause",
        0x000c => "resume",
        0x000d => "callback",
        0x000e => "sync",
        0x0018 => "available",
        0x0019 => "version",
        0x001a => "get total cpu load",
        0x001b => "get channel cpu load",
        0x0028 => "note",
        0x0029 => "rest",
        0x002a => "set pitch",
        0x002b => "set amplitude",
        0x002c => "set timbre",
        0x002d => "get amplitude",
        0x002e => "set volume",
        0x002f => "get volume",
        0x003c => "load wave table",
        0x0052 => "set sampled pitch",
        0x0053 => "get sampled pitch",
        _ => return None,
    })
}

/// Validate the command list. Returns the buffer offset named by the single
/// sound/buffer command, if any.
fn read_commands(r: &mut Cursor<&[u8]>, num_commands: u16) -> Result<Option<u32>, SoundError> {
    if num_commands == 0 {
        return Err(SoundError::NoCommands);
    }

    let mut buffer_offset = None;
    for _ in 0..num_commands {
        let cmd = SoundCommand::read(r)?;
        match cmd.command {
            0x0000 => {}
            0x8050 | 0x8051 => {
                if buffer_offset.is_some() {
                    return Err(SoundError::MultipleBufferCommands);
                }
                buffer_offset = Some(cmd.param2);
            }
            code => {
                let SoundCommand { param1, param2, .. } = cmd;
                return Err(match command_name(code) {
                    Some(name) => SoundError::UnsupportedCommand { code, name, param1, param2 },
                    None => SoundError::UnknownCommand { code, param1, param2 },
                });
            }
        }
    }
    Ok(buffer_offset)
}

// ---------------------------------------------------------------------------
// Layout decoders
// ---------------------------------------------------------------------------

fn decode_mohawk(data: &[u8], opts: &DecodeOptions) -> Result<DecodedSoundResource, SoundError> {
    let mut r = Cursor::new(data);
    while (data.len() as u64).saturating_sub(r.position()) >= 8 {
        let chunk = MohawkChunkHeader::read(&mut r)?;
        match chunk.kind {
            TAG_CUE => r.set_position(r.position() + chunk.size as u64),
            TAG_DATA => {
                let format = MohawkFormat::read(&mut r)?;
                if format.num_channels != 1 {
                    return Err(SoundError::UnsupportedFormat(format!(
                        "Mohawk snd has {} channels",
                        format.num_channels
                    )));
                }
                if format.sample_bits != 8 {
                    return Err(SoundError::UnsupportedFormat(format!(
                        "Mohawk snd has {}-bit samples",
                        format.sample_bits
                    )));
                }

                // No loop or base note data here; base_note stays at the default 60.
                let mut ret = DecodedSoundResource {
                    sample_rate: format.sample_rate as u32,
                    bits_per_sample: 8,
                    num_channels: 1,
                    ..Default::default()
                };
                if !opts.metadata_only {
                    let pos = r.position() as usize;
                    // A short payload is an error, not a truncated WAV.
                    let payload = slice_exact(data, pos, format.num_samples as usize)?;
                    let header = WavHeader::new(format.num_samples, 1, ret.sample_rate, 8);
                    ret.sample_start_offset = header.header_size();
                    ret.data = build_wav(&header, payload);
                }
                return Ok(ret);
            }
            // Unknown chunks contribute only their header.
            _ => {}
        }
    }
    Err(SoundError::UnsupportedFormat("Mohawk snd does not contain a Data section".into()))
}

fn decode_beatnik_mp3(
    data: &[u8],
    pos: usize,
    header: &Format3Header,
    opts: &DecodeOptions,
) -> Result<DecodedSoundResource, SoundError> {
    if header.kind & 0xffff_ff00 != MP3_TYPE_PREFIX {
        return Err(SoundError::UnsupportedFormat(format!(
            "format 3 snd is '{}', not MP3",
            fourcc(header.kind)
        )));
    }
    if header.is_little_endian != 0 {
        return Err(SoundError::LittleEndianUnsupported);
    }
    if header.is_encrypted != 0 {
        return Err(SoundError::EncryptedUnsupported);
    }
    if opts.decompress_ysnd {
        return Err(SoundError::YsndUnsupported);
    }

    let mut ret = DecodedSoundResource {
        is_mp3: true,
        sample_rate: header.sample_rate >> 16,
        base_note: non_zero_note(header.base_note),
        num_channels: header.channel_count.max(1) as u16,
        bits_per_sample: header.bits_per_sample as u16,
        ..Default::default()
    };
    if !opts.metadata_only {
        ret.data = data[pos.min(data.len())..].to_vec();
    }
    Ok(ret)
}

fn non_zero_note(note: u8) -> u8 {
    if note == 0 {
        DEFAULT_BASE_NOTE
    } else {
        note
    }
}

/// Sampled-sound path shared by formats 1 and 2.
fn decode_sampled(
    r: &mut Cursor<&[u8]>,
    data: &[u8],
    num_channels: u16,
    opts: &DecodeOptions,
) -> Result<DecodedSoundResource, SoundError> {
    // Some resources carry a wrong offset in the buffer command; the sample
    // buffer always follows the command list.
    let buffer = SampleBuffer::read(r)?;
    let mut ret = DecodedSoundResource {
        sample_rate: buffer.sample_rate >> 16,
        base_note: non_zero_note(buffer.base_note),
        num_channels,
        loop_start: buffer.loop_start,
        loop_end: buffer.loop_end,
        ..Default::default()
    };
    tracing::debug!(
        encoding = buffer.encoding,
        rate = ret.sample_rate,
        data_bytes = buffer.data_bytes,
        "snd: sample buffer"
    );

    if opts.decompress_ysnd {
        return decode_ysnd(r.position() as usize, data, &buffer, ret, opts);
    }

    match buffer.encoding {
        ENCODING_UNCOMPRESSED => decode_uncompressed_8bit(r.position() as usize, data, &buffer, ret, opts),
        ENCODING_COMPRESSED | ENCODING_EXTENDED => {
            let compressed = CompressedBuffer::read(r)?;
            let pos = r.position() as usize;

            if opts.hirf_semantics && ret.num_channels == 2 {
                tracing::warn!("snd: ignoring stereo flag on Beatnik compressed sound");
                ret.num_channels = 1;
            }

            match compressed.compression_id {
                COMPRESSION_VARIABLE => {
                    Err(SoundError::UnsupportedCompression("variable-ratio compression".into()))
                }
                COMPRESSION_MACE3 => decode_with_codec(Codec::Mace3, pos, data, &compressed, ret, opts),
                COMPRESSION_MACE6 => decode_with_codec(Codec::Mace6, pos, data, &compressed, ret, opts),
                COMPRESSION_FIXED => match compressed.format {
                    FORMAT_TWOS | FORMAT_SOWT => decode_pcm(pos, data, &compressed, ret, opts),
                    FORMAT_IMA4 => decode_with_codec(Codec::Ima4, pos, data, &compressed, ret, opts),
                    FORMAT_MAC3 => decode_with_codec(Codec::Mace3, pos, data, &compressed, ret, opts),
                    FORMAT_MAC6 => decode_with_codec(Codec::Mace6, pos, data, &compressed, ret, opts),
                    FORMAT_ULAW => decode_with_codec(Codec::Ulaw, pos, data, &compressed, ret, opts),
                    FORMAT_ALAW => decode_with_codec(Codec::Alaw, pos, data, &compressed, ret, opts),
                    other => Err(SoundError::UnsupportedCompression(format!(
                        "unknown format '{}'",
                        fourcc(other)
                    ))),
                },
                COMPRESSION_NONE => decode_pcm(pos, data, &compressed, ret, opts),
                other => Err(SoundError::UnsupportedCompression(format!("unknown algorithm {other}"))),
            }
        }
        other => Err(SoundError::UnsupportedCompression(format!("unknown encoding {other:#04x}"))),
    }
}

fn decode_ysnd(
    pos: usize,
    data: &[u8],
    buffer: &SampleBuffer,
    mut ret: DecodedSoundResource,
    opts: &DecodeOptions,
) -> Result<DecodedSoundResource, SoundError> {
    if buffer.encoding != ENCODING_UNCOMPRESSED {
        return Err(SoundError::DoublyCompressed(buffer.encoding));
    }
    ret.bits_per_sample = 8;
    if !opts.metadata_only {
        let frames = buffer.data_bytes / ret.num_channels as u32;
        let header = WavHeader::new(frames, ret.num_channels, ret.sample_rate, 8).with_loop(
            ret.loop_start,
            ret.loop_end,
            ret.base_note,
        );
        let samples = expand_ysnd(data.get(pos..).unwrap_or(&[]), header.data_size as usize)?;
        ret.sample_start_offset = header.header_size();
        ret.data = build_wav(&header, &samples);
    }
    Ok(ret)
}

fn decode_uncompressed_8bit(
    pos: usize,
    data: &[u8],
    buffer: &SampleBuffer,
    mut ret: DecodedSoundResource,
    opts: &DecodeOptions,
) -> Result<DecodedSoundResource, SoundError> {
    if buffer.data_bytes == 0 {
        return Err(SoundError::NoSamples);
    }
    let available = data.len().saturating_sub(pos);
    let num_bytes = (buffer.data_bytes as usize).min(available);
    if num_bytes < buffer.data_bytes as usize {
        tracing::warn!(declared = buffer.data_bytes, available, "snd: clamping overstated sample length");
    }

    ret.bits_per_sample = 8;
    if !opts.metadata_only {
        let frames = (num_bytes / ret.num_channels as usize) as u32;
        let header = WavHeader::new(frames, ret.num_channels, ret.sample_rate, 8).with_loop(
            ret.loop_start,
            ret.loop_end,
            ret.base_note,
        );
        ret.sample_start_offset = header.header_size();
        ret.data = build_wav(&header, &data[pos..pos + header.data_size as usize]);
    }
    Ok(ret)
}

#[derive(Clone, Copy, Debug)]
enum Codec {
    Mace3,
    Mace6,
    Ima4,
    Ulaw,
    Alaw,
}

impl Codec {
    /// Encoded bytes for `frames` frames.
    fn input_len(self, frames: usize, channels: usize) -> usize {
        match self {
            Codec::Mace3 => frames.saturating_mul(2 * channels),
            Codec::Mace6 => frames.saturating_mul(channels),
            Codec::Ima4 => frames.saturating_mul(IMA4_PACKET_BYTES * channels),
            Codec::Ulaw | Codec::Alaw => frames,
        }
    }

    /// Output samples per input loop unit.
    fn loop_factor(self) -> u32 {
        match self {
            Codec::Mace3 => 3,
            Codec::Mace6 => 6,
            Codec::Ima4 => 4,
            Codec::Ulaw | Codec::Alaw => 2,
        }
    }

    fn decode(self, input: &[u8], channels: usize) -> Result<Vec<i16>, SoundError> {
        Ok(match self {
            Codec::Mace3 => decode_mace(input, channels, MaceVariant::Mace3)?,
            Codec::Mace6 => decode_mace(input, channels, MaceVariant::Mace6)?,
            Codec::Ima4 => decode_ima4(input, channels)?,
            Codec::Ulaw => decode_ulaw(input),
            Codec::Alaw => decode_alaw(input),
        })
    }
}

fn decode_with_codec(
    codec: Codec,
    pos: usize,
    data: &[u8],
    compressed: &CompressedBuffer,
    mut ret: DecodedSoundResource,
    opts: &DecodeOptions,
) -> Result<DecodedSoundResource, SoundError> {
    let channels = ret.num_channels as usize;
    let wanted = codec.input_len(compressed.num_frames as usize, channels);
    let start = pos.min(data.len());
    let end = pos.saturating_add(wanted).min(data.len());
    if end - start < wanted {
        tracing::warn!(?codec, wanted, available = end - start, "snd: compressed data is short");
    }
    tracing::debug!(?codec, channels, bytes = end - start, "snd: decoding");

    let samples = codec.decode(&data[start..end], channels)?;

    let factor = codec.loop_factor();
    ret.bits_per_sample = 16;
    ret.loop_start = ret.loop_start.saturating_mul(factor);
    ret.loop_end = ret.loop_end.saturating_mul(factor);

    if !opts.metadata_only {
        let frames = (samples.len() / channels) as u32;
        let header = WavHeader::new(frames, ret.num_channels, ret.sample_rate, 16).with_loop(
            ret.loop_start,
            ret.loop_end,
            ret.base_note,
        );
        if header.data_size as usize != 2 * samples.len() {
            return Err(SoundError::SizeMismatch {
                computed: header.data_size as usize,
                actual: 2 * samples.len(),
            });
        }
        ret.sample_start_offset = header.header_size();
        ret.data = build_wav(&header, &samples_to_le_bytes(&samples));
    }
    Ok(ret)
}

/// Uncompressed 8/16-bit PCM described by a compressed-buffer record.
fn decode_pcm(
    pos: usize,
    data: &[u8],
    compressed: &CompressedBuffer,
    mut ret: DecodedSoundResource,
    opts: &DecodeOptions,
) -> Result<DecodedSoundResource, SoundError> {
    let num_frames = compressed.num_frames;
    ret.bits_per_sample = match compressed.bits_per_sample {
        0 => (compressed.state_vars >> 16) as u16,
        bits => bits,
    };
    if !matches!(ret.bits_per_sample, 8 | 16) {
        return Err(SoundError::UnsupportedFormat(format!("{}-bit PCM", ret.bits_per_sample)));
    }

    let available = data.len().saturating_sub(pos);
    // Some stereo resources declare exactly twice the data they hold; those
    // are really mono.
    let declared = num_frames as u64 * ret.num_channels as u64 * (ret.bits_per_sample / 8) as u64;
    if ret.num_channels == 2 && declared == 2 * available as u64 {
        tracing::warn!(num_frames, available, "snd: treating stereo sound as mono");
        ret.num_channels = 1;
    }

    let header = WavHeader::new(num_frames, ret.num_channels, ret.sample_rate, ret.bits_per_sample)
        .with_loop(ret.loop_start, ret.loop_end, ret.base_note);
    let data_size = header.data_size as usize;
    if data_size == 0 {
        return Err(SoundError::NoSamples);
    }
    if data_size > available {
        return Err(SoundError::SizeMismatch { computed: data_size, actual: available });
    }

    if !opts.metadata_only {
        let mut samples = data[pos..pos + data_size].to_vec();
        if ret.bits_per_sample == 16 && compressed.format != FORMAT_SOWT {
            for pair in samples.chunks_exact_mut(2) {
                pair.swap(0, 1);
            }
        }
        ret.sample_start_offset = header.header_size();
        ret.data = build_wav(&header, &samples);
    }
    Ok(ret)
}

fn slice_exact(data: &[u8], pos: usize, len: usize) -> Result<&[u8], SoundError> {
    let available = data.len().saturating_sub(pos);
    if len > available {
        return Err(SoundError::SizeMismatch { computed: len, actual: available });
    }
    Ok(&data[pos..pos + len])
}

//! `Tune` resource to Standard MIDI File conversion.
//!
//! A tune is a QuickTime music event stream: 32-bit big-endian words whose
//! top nibble selects the event kind. Notes and controllers address
//! "partitions", which are mapped onto MIDI channels in first-seen order.

use crate::{fourcc, TuneError};

const TUNE_MAGIC: u32 = 0x6d75_7369; // 'musi'
const EVENTS_OFFSET: usize = 20;
const MAX_CHANNELS: usize = 16;

/// Ticks per quarter note in the emitted file.
pub const MIDI_DIVISION: u16 = 600;

const INSTRUMENT_MESSAGE_SIZE: usize = 0x5C;
const EXT_INSTRUMENT_MESSAGE_SIZE: usize = 0x88;

/// Big-endian word cursor over the event stream.
struct TuneReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> TuneReader<'a> {
    fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn read_u32_be(&mut self) -> Result<u32, TuneError> {
        let bytes = self
            .data
            .get(self.pos..self.pos + 4)
            .ok_or(TuneError::Truncated { offset: self.pos })?;
        self.pos += 4;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let slice = self.data.get(self.pos..self.pos.checked_add(n)?)?;
        self.pos += n;
        Some(slice)
    }

    /// Skips past the end are allowed; the scan just stops.
    fn skip(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n);
    }
}

/// Partition id to MIDI channel, assigned in first-seen order.
#[derive(Default)]
struct PartitionMap {
    ids: heapless::Vec<u16, MAX_CHANNELS>,
}

impl PartitionMap {
    fn channel(&self, partition: u16) -> Result<u8, TuneError> {
        self.ids
            .iter()
            .position(|&id| id == partition)
            .map(|ch| ch as u8)
            .ok_or(TuneError::UninitializedPartition(partition))
    }

    fn channel_or_allocate(&mut self, partition: u16) -> Result<u8, TuneError> {
        if let Ok(ch) = self.channel(partition) {
            return Ok(ch);
        }
        self.ids
            .push(partition)
            .map_err(|_| TuneError::ChannelExhausted(partition))?;
        tracing::trace!(partition, channel = self.ids.len() - 1, "tune: assigned channel");
        Ok((self.ids.len() - 1) as u8)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct MidiEvent {
    when: u64,
    status: u8,
    data: [u8; 2],
    len: u8,
}

impl MidiEvent {
    fn one(when: u64, status: u8, a: u8) -> Self {
        Self { when, status, data: [a, 0], len: 1 }
    }

    fn two(when: u64, status: u8, a: u8, b: u8) -> Self {
        Self { when, status, data: [a, b], len: 2 }
    }

    fn data(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

/// Map a 16-bit pitch bend onto the 14-bit MIDI range, returned LSB first.
fn pitch_bend_bytes(value: u16) -> (u8, u8) {
    let v = ((value as i16 as i32).clamp(-0x200, 0x1ff) + 0x200) * 0x10;
    ((v & 0x7f) as u8, ((v >> 7) & 0x7f) as u8)
}

/// Convert a `Tune` resource into a format 0 Standard MIDI File.
pub fn tune_to_midi(data: &[u8]) -> Result<Vec<u8>, TuneError> {
    let magic = data
        .get(4..8)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or(TuneError::Truncated { offset: 4 })?;
    if magic != TUNE_MAGIC {
        return Err(TuneError::BadMagic(fourcc(magic)));
    }

    let mut events: Vec<MidiEvent> = Vec::new();
    let mut partitions = PartitionMap::default();
    let mut now: u64 = 0;
    let mut r = TuneReader::new(data, EVENTS_OFFSET);

    while !r.at_end() {
        let event_offset = r.pos;
        let event = r.read_u32_be()?;
        let kind = (event >> 28) as u8;
        match kind {
            // rest
            0x0 | 0x1 => now += (event & 0x00ff_ffff) as u64,

            0x2 | 0x3 | 0x9 => {
                let (partition, key, velocity, duration) = if kind == 0x9 {
                    let options = r.read_u32_be()?;
                    (
                        ((event >> 16) & 0xfff) as u16,
                        (event >> 8) as u8,
                        ((options >> 22) & 0x7f) as u8,
                        options & 0x3f_ffff,
                    )
                } else {
                    (
                        ((event >> 24) & 0x1f) as u16,
                        (((event >> 18) & 0x3f) + 32) as u8,
                        ((event >> 11) & 0x7f) as u8,
                        event & 0x7ff,
                    )
                };
                let ch = partitions.channel(partition)?;
                events.push(MidiEvent::two(now, 0x90 | ch, key, velocity));
                events.push(MidiEvent::two(now + duration as u64, 0x80 | ch, key, velocity));
            }

            0x4 | 0x5 | 0xA => {
                let (partition, message, value) = if kind == 0xA {
                    let options = r.read_u32_be()?;
                    (((event >> 16) & 0xfff) as u16, (options >> 16) & 0x3fff, options as u16)
                } else {
                    (((event >> 24) & 0x1f) as u16, (event >> 16) & 0xff, event as u16)
                };
                let ch = partitions.channel_or_allocate(partition)?;
                match message {
                    // bank select
                    0 => {}
                    32 => {
                        let (lsb, msb) = pitch_bend_bytes(value);
                        events.push(MidiEvent::two(now, 0xE0 | ch, lsb, msb));
                    }
                    _ => events.push(MidiEvent::two(now, 0xB0 | ch, message as u8, (value >> 8) as u8)),
                }
            }

            0xF => {
                let partition = ((event >> 16) & 0xfff) as u16;
                let size = (event & 0xffff) as usize * 4;
                if size < 8 {
                    return Err(TuneError::MetadataTooShort(size));
                }
                let payload = r.take(size - 4).ok_or(TuneError::MetadataOverrun { size })?;
                let meta_kind = u16::from_be_bytes([payload[payload.len() - 4], payload[payload.len() - 3]]) & 0x3fff;
                let ch = partitions.channel_or_allocate(partition)?;
                tracing::trace!(partition, meta_kind, size, "tune: metadata");

                let instrument_at = match meta_kind {
                    1 => Some((INSTRUMENT_MESSAGE_SIZE, 0x50)),
                    6 => Some((EXT_INSTRUMENT_MESSAGE_SIZE, 0x7c)),
                    // tune difference, MIDI channel, nop, notes used
                    5 | 8 | 10 | 11 => None,
                    other => return Err(TuneError::UnknownMetadataType(other)),
                };
                if let Some((expected_size, offset)) = instrument_at {
                    if size != expected_size {
                        return Err(TuneError::MetadataSize { kind: meta_kind, size });
                    }
                    let instrument = u32::from_be_bytes([
                        payload[offset],
                        payload[offset + 1],
                        payload[offset + 2],
                        payload[offset + 3],
                    ]);
                    events.push(MidiEvent::one(now, 0xC0 | ch, instrument as u8));
                    events.push(MidiEvent::two(now, 0xB0 | ch, 7, 0x7f)); // volume
                    events.push(MidiEvent::two(now, 0xB0 | ch, 10, 0x40)); // pan
                    events.push(MidiEvent::two(now, 0xE0 | ch, 0x00, 0x40)); // bend center
                }
            }

            // reserved, one operand word
            0x8 | 0xC | 0xD | 0xE => r.skip(4),
            // markers
            0x6 | 0x7 => {}

            _ => return Err(TuneError::UnsupportedEvent { kind, offset: event_offset }),
        }
    }

    events.push(MidiEvent::two(now, 0xFF, 0x2F, 0x00));
    // Note-offs are generated ahead of later events; ties keep insertion order.
    // The stable sort places the track end before any note-off that is due at
    // the same tick or later, so such note-offs land past the end marker.
    events.sort_by_key(|e| e.when);

    tracing::debug!(events = events.len(), channels = partitions.ids.len(), ticks = now, "tune: converted");
    Ok(write_smf(&events))
}

fn write_smf(events: &[MidiEvent]) -> Vec<u8> {
    let mut track = Vec::with_capacity(events.len() * 4);
    let mut now = 0;
    for e in events {
        write_vlq(&mut track, e.when - now);
        now = e.when;
        track.push(e.status);
        track.extend_from_slice(e.data());
    }

    let mut out = Vec::with_capacity(22 + track.len());
    out.extend_from_slice(b"MThd");
    out.extend_from_slice(&6u32.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // format
    out.extend_from_slice(&1u16.to_be_bytes()); // tracks
    out.extend_from_slice(&MIDI_DIVISION.to_be_bytes());
    out.extend_from_slice(b"MTrk");
    out.extend_from_slice(&(track.len() as u32).to_be_bytes());
    out.extend_from_slice(&track);
    out
}

/// Append a MIDI variable-length quantity, most significant group first.
pub fn write_vlq(out: &mut Vec<u8>, mut value: u64) {
    let mut groups = [0u8; 10];
    let mut n = 0;
    loop {
        groups[n] = (value & 0x7f) as u8;
        n += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    for i in (0..n).rev() {
        out.push(if i > 0 { groups[i] | 0x80 } else { groups[i] });
    }
}

/// Read a variable-length quantity, returning the value and bytes consumed.
pub fn read_vlq(data: &[u8]) -> Option<(u64, usize)> {
    let mut value: u64 = 0;
    for (i, &b) in data.iter().take(10).enumerate() {
        value = (value << 7) | (b & 0x7f) as u64;
        if b & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}

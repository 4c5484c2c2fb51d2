//! Headless controller for resource fork export.
//!
//! Provides a unified API for opening a fork, listing its resources and
//! converting sounds and tunes, shared by the CLI and tests.

mod export;

use std::io;
use std::path::Path;

use rf_fork::{ByteSource, FileSource, ForkError, ResourceEntry, ResourceFork};
use rf_formats::{SoundError, TuneError};
use thiserror::Error;

// Re-export common types so callers don't need rf-fork/rf-formats directly.
pub use export::{file_name, ExportFailure, ExportOptions, ExportReport};
pub use rf_fork::ResType;
pub use rf_formats::{inspect_wav, DecodeOptions, DecodedSoundResource, WavInfo};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Fork(#[from] ForkError),
    #[error(transparent)]
    Sound(#[from] SoundError),
    #[error(transparent)]
    Tune(#[from] TuneError),
    #[error("no {res_type} resource with id {id}")]
    NotFound { res_type: ResType, id: i16 },
    #[error("{0} resources cannot be exported")]
    UnsupportedType(ResType),
    #[error("i/o: {0}")]
    Io(#[from] io::Error),
}

/// One row of a fork listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceSummary {
    pub res_type: ResType,
    pub id: i16,
    pub name: Option<String>,
    pub size: u32,
}

impl From<&ResourceEntry> for ResourceSummary {
    fn from(e: &ResourceEntry) -> Self {
        Self { res_type: e.res_type, id: e.id, name: e.name.clone(), size: e.data_length }
    }
}

/// An opened resource fork.
pub struct Archive<S> {
    fork: ResourceFork<S>,
}

impl Archive<FileSource> {
    /// Open the resource fork of `path`, or with `data_fork` set, treat the
    /// file's ordinary contents as the fork.
    pub fn open_path(path: impl AsRef<Path>, data_fork: bool) -> Result<Self, ExportError> {
        let source = if data_fork {
            FileSource::open(path)?
        } else {
            FileSource::open_resource_fork(path)?
        };
        Self::open(source)
    }
}

impl<S: ByteSource> Archive<S> {
    pub fn open(source: S) -> Result<Self, ExportError> {
        Ok(Self { fork: ResourceFork::open(source)? })
    }

    pub fn fork(&self) -> &ResourceFork<S> {
        &self.fork
    }

    /// Every resource, grouped by type in on-disk order.
    pub fn summaries(&self) -> Result<Vec<ResourceSummary>, ExportError> {
        Ok(self.fork.resource_map()?.iter().map(ResourceSummary::from).collect())
    }

    fn entry(&self, res_type: ResType, id: i16) -> Result<&ResourceEntry, ExportError> {
        self.fork
            .get_resource(res_type, id)?
            .ok_or(ExportError::NotFound { res_type, id })
    }

    /// Decode a `snd ` or `Ysnd` resource. `Ysnd` always enables nibble
    /// expansion.
    pub fn decode_sound(
        &self,
        res_type: ResType,
        id: i16,
        opts: &DecodeOptions,
    ) -> Result<DecodedSoundResource, ExportError> {
        let opts = match res_type {
            ResType::SND => *opts,
            ResType::YSND => DecodeOptions { decompress_ysnd: true, ..*opts },
            other => return Err(ExportError::UnsupportedType(other)),
        };
        let data = self.fork.read_data(self.entry(res_type, id)?)?;
        Ok(rf_formats::decode_snd(&data, &opts)?)
    }

    /// Convert a `Tune` resource to a Standard MIDI File.
    pub fn convert_tune(&self, id: i16) -> Result<Vec<u8>, ExportError> {
        let data = self.fork.read_data(self.entry(ResType::TUNE, id)?)?;
        Ok(rf_formats::tune_to_midi(&data)?)
    }

    /// Convert a single entry to its output bytes and file extension.
    fn convert(&self, entry: &ResourceEntry, opts: &DecodeOptions) -> Result<(Vec<u8>, &'static str), ExportError> {
        if entry.res_type == ResType::TUNE {
            return Ok((self.convert_tune(entry.id)?, "mid"));
        }
        let sound = self.decode_sound(entry.res_type, entry.id, opts)?;
        let ext = sound.extension();
        Ok((sound.data, ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Vec<u8> {
        std::fs::read(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/sounds.rsrc")).unwrap()
    }

    #[test]
    fn summaries_follow_map_order() {
        let archive = Archive::open(fixture()).unwrap();
        let rows = archive.summaries().unwrap();
        let keys: Vec<(String, i16)> = rows.iter().map(|r| (r.res_type.to_string(), r.id)).collect();
        assert_eq!(
            keys,
            [("snd ", 128), ("snd ", 129), ("snd ", 130), ("Tune", 128), ("Ysnd", 128), ("STR ", 128)]
                .map(|(t, id)| (t.to_string(), id))
        );
        assert_eq!(rows[0].name.as_deref(), Some("Boing"));
        assert_eq!(rows[0].size, 50);
        assert_eq!(rows[1].name, None);
    }

    #[test]
    fn decode_sound_by_id() {
        let archive = Archive::open(fixture()).unwrap();
        let sound = archive.decode_sound(ResType::SND, 128, &DecodeOptions::default()).unwrap();
        assert_eq!(sound.sample_rate, 22050);
        assert_eq!(sound.samples(), &[0x80, 0x90, 0xA0, 0xB0, 0xA0, 0x90, 0x80, 0x70]);
    }

    #[test]
    fn ysnd_type_enables_expansion() {
        let archive = Archive::open(fixture()).unwrap();
        let sound = archive.decode_sound(ResType::YSND, 128, &DecodeOptions::default()).unwrap();
        assert_eq!(sound.samples(), &[0x80, 0x80, 0x82, 0x80]);
    }

    #[test]
    fn missing_and_unsupported() {
        let archive = Archive::open(fixture()).unwrap();
        assert!(matches!(
            archive.decode_sound(ResType::SND, 1, &DecodeOptions::default()),
            Err(ExportError::NotFound { id: 1, .. })
        ));
        let str_type = ResType(*b"STR ");
        assert!(matches!(
            archive.decode_sound(str_type, 128, &DecodeOptions::default()),
            Err(ExportError::UnsupportedType(t)) if t == str_type
        ));
        assert!(matches!(
            archive.decode_sound(ResType::SND, 130, &DecodeOptions::default()),
            Err(ExportError::Sound(SoundError::UnsupportedCompression(_)))
        ));
    }

    #[test]
    fn convert_tune_by_id() {
        let archive = Archive::open(fixture()).unwrap();
        let midi = archive.convert_tune(128).unwrap();
        assert_eq!(&midi[..4], b"MThd");
        assert_eq!(midi.len(), 22 + 16);
    }

    #[test]
    fn open_rejects_non_fork() {
        let mut data = vec![0u8; 64];
        data[7] = 32; // map offset; zeros there do not repeat the header
        assert!(matches!(
            Archive::open(data),
            Err(ExportError::Fork(ForkError::InvalidHeader { .. }))
        ));
    }
}

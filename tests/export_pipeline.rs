//! End-to-end: fork file on disk -> controller -> files in an output dir.

use std::fs;
use std::path::PathBuf;

use rf_master::{inspect_wav, Archive, DecodeOptions, ExportOptions, ResType};

fn sounds_fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("crates/rf-master/tests/fixtures/sounds.rsrc")
}

#[test]
fn copied_fork_exports_identically() {
    let dir = tempfile::tempdir().unwrap();
    let fork_path = dir.path().join("copy.rsrc");
    fs::copy(sounds_fixture(), &fork_path).unwrap();

    let archive = Archive::open_path(&fork_path, true).unwrap();
    let report = archive.export_all(&dir.path().join("out"), &ExportOptions::default()).unwrap();
    assert_eq!(report.written.len(), 4);
    assert_eq!(report.failed.len(), 1);

    for path in report.written.iter().filter(|p| p.extension().is_some_and(|e| e == "wav")) {
        let wav = fs::read(path).unwrap();
        let info = inspect_wav(&wav).unwrap();
        assert_eq!(info.data_offset + info.data_size, wav.len(), "{}", path.display());
    }
}

#[test]
fn unsupported_compression_leaves_no_partial_output() {
    let archive = Archive::open_path(sounds_fixture(), true).unwrap();
    assert!(archive.decode_sound(ResType::SND, 130, &DecodeOptions::default()).is_err());

    let dir = tempfile::tempdir().unwrap();
    let opts = ExportOptions { types: Some(vec![ResType::SND]), ..Default::default() };
    let report = archive.export_all(dir.path(), &opts).unwrap();
    let mut files: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(files, ["snd_128_Boing.wav", "snd_129.wav"]);
    assert_eq!(report.failed[0].id, 130);
}

use std::fs;
use std::path::PathBuf;

use rf_master::{inspect_wav, Archive, DecodeOptions, ExportError, ExportOptions, ResType};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sounds.rsrc")
}

#[test]
fn export_all_writes_convertible_resources() {
    let archive = Archive::open_path(fixture_path(), true).unwrap();
    let out = tempfile::tempdir().unwrap();

    let report = archive.export_all(out.path(), &ExportOptions::default()).unwrap();

    let mut names: Vec<String> = report
        .written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, ["Tune_128_Theme.mid", "Ysnd_128.wav", "snd_128_Boing.wav", "snd_129.wav"]);

    assert_eq!(report.failed.len(), 1);
    assert_eq!((report.failed[0].res_type, report.failed[0].id), (ResType::SND, 130));
    assert!(!out.path().join("snd_130_Broken.wav").exists());

    let boing = fs::read(out.path().join("snd_128_Boing.wav")).unwrap();
    let info = inspect_wav(&boing).unwrap();
    assert_eq!((info.num_channels, info.sample_rate, info.bits_per_sample), (1, 22050, 8));
    assert_eq!(info.data_size, 8);

    let mace = inspect_wav(&fs::read(out.path().join("snd_129.wav")).unwrap()).unwrap();
    assert_eq!(mace.bits_per_sample, 16);
    assert_eq!(mace.data_size, 24);

    let midi = fs::read(out.path().join("Tune_128_Theme.mid")).unwrap();
    assert_eq!(&midi[..4], b"MThd");
}

#[test]
fn type_filter_limits_export() {
    let archive = Archive::open_path(fixture_path(), true).unwrap();
    let out = tempfile::tempdir().unwrap();
    let opts = ExportOptions { types: Some(vec![ResType::TUNE]), ..Default::default() };

    let report = archive.export_all(out.path(), &opts).unwrap();
    assert_eq!(report.written.len(), 1);
    assert!(report.failed.is_empty());
}

#[test]
fn metadata_only_writes_nothing() {
    let archive = Archive::open_path(fixture_path(), true).unwrap();
    let out = tempfile::tempdir().unwrap();
    let opts = ExportOptions {
        decode: DecodeOptions { metadata_only: true, ..Default::default() },
        types: Some(vec![ResType::SND]),
    };

    let report = archive.export_all(out.path(), &opts).unwrap();
    assert!(report.written.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Archive::open_path(dir.path().join("absent"), true),
        Err(ExportError::Io(_))
    ));
}

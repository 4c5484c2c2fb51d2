//! Bulk export of every convertible resource to a directory.

use std::fs;
use std::path::{Path, PathBuf};

use rf_fork::{ByteSource, ResType, ResourceEntry};
use rf_formats::DecodeOptions;

use crate::{Archive, ExportError};

/// Filter and decoder settings for [`Archive::export_all`].
#[derive(Clone, Debug, Default)]
pub struct ExportOptions {
    pub decode: DecodeOptions,
    /// Only export these types; `None` exports `snd `, `Ysnd` and `Tune`.
    pub types: Option<Vec<ResType>>,
}

impl ExportOptions {
    fn wants(&self, res_type: ResType) -> bool {
        let convertible = matches!(res_type, ResType::SND | ResType::YSND | ResType::TUNE);
        convertible && self.types.as_ref().map_or(true, |t| t.contains(&res_type))
    }
}

/// A resource that could not be converted.
#[derive(Debug)]
pub struct ExportFailure {
    pub res_type: ResType,
    pub id: i16,
    pub error: ExportError,
}

#[derive(Debug, Default)]
pub struct ExportReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<ExportFailure>,
}

/// `<type>_<id>[_<name>].<ext>`, with path-hostile characters replaced.
pub fn file_name(entry: &ResourceEntry, ext: &str) -> String {
    let mut stem = format!("{}_{}", entry.res_type.to_string().trim_end(), entry.id);
    if let Some(name) = entry.name.as_deref().filter(|n| !n.is_empty()) {
        stem.push('_');
        stem.push_str(name);
    }
    let stem: String = stem
        .chars()
        .map(|c| if c.is_control() || matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    format!("{stem}.{ext}")
}

impl<S: ByteSource> Archive<S> {
    /// Convert every matching resource into `dir`.
    ///
    /// Conversion failures are recorded in the report and do not stop the
    /// export; failing to write an output file does.
    pub fn export_all(&self, dir: &Path, opts: &ExportOptions) -> Result<ExportReport, ExportError> {
        fs::create_dir_all(dir)?;
        let mut report = ExportReport::default();

        for entry in self.fork().resource_map()?.iter() {
            if !opts.wants(entry.res_type) {
                continue;
            }
            match self.convert(entry, &opts.decode) {
                Ok((bytes, ext)) => {
                    if bytes.is_empty() {
                        // metadata-only decode
                        continue;
                    }
                    let path = dir.join(file_name(entry, ext));
                    fs::write(&path, &bytes)?;
                    tracing::debug!(path = %path.display(), bytes = bytes.len(), "exported");
                    report.written.push(path);
                }
                Err(error) => {
                    tracing::warn!(res_type = %entry.res_type, id = entry.id, %error, "skipping resource");
                    report.failed.push(ExportFailure { res_type: entry.res_type, id: entry.id, error });
                }
            }
        }

        tracing::info!(written = report.written.len(), failed = report.failed.len(), "export finished");
        Ok(report)
    }
}

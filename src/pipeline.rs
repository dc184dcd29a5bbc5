use crate::config::Config;
use crate::date::capture_date;
use crate::error::{Error, Result};
use crate::metadata::{SidecarStatus, load_sidecar};
use crate::relocator::{Relocation, Relocator, TimestampSetter};
use crate::scanner::{MediaFile, scan};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::PathBuf;

#[derive(Debug)]
pub enum Outcome {
    Relocated(Relocation),
    NoSidecar,
    Incomplete { missing: Vec<String> },
}

/// A hard error that stopped one file without stopping the run.
#[derive(Debug)]
pub struct FileFailure {
    pub file: PathBuf,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub scanned: usize,
    pub relocated: usize,
    pub skipped_no_sidecar: usize,
    pub skipped_incomplete: usize,
    pub failures: Vec<FileFailure>,
}

impl RunSummary {
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped_no_sidecar + self.skipped_incomplete
    }

    #[must_use]
    pub fn partial_moves(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| matches!(f.error, Error::PartialMove { .. }))
            .count()
    }

    /// Counts one file's outcome. Per-file errors are logged and kept;
    /// fatal errors are handed back to abort the run.
    pub fn record(&mut self, file: &MediaFile, result: Result<Outcome>) -> Result<()> {
        match result {
            Ok(Outcome::Relocated(_)) => self.relocated += 1,
            Ok(Outcome::NoSidecar) => self.skipped_no_sidecar += 1,
            Ok(Outcome::Incomplete { .. }) => self.skipped_incomplete += 1,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                match &err {
                    Error::PartialMove { .. } => error!("Inconsistent state: {err}"),
                    _ => warn!("Leaving {} in place: {err}", file.path.display()),
                }
                self.failures.push(FileFailure {
                    file: file.path.clone(),
                    error: err,
                });
            }
        }
        Ok(())
    }
}

/// Load, date and relocate a single media file.
pub fn process_file(file: &MediaFile, config: &Config, relocator: &Relocator) -> Result<Outcome> {
    let metadata = match load_sidecar(file, config)? {
        SidecarStatus::Loaded(metadata) => metadata,
        SidecarStatus::Missing => return Ok(Outcome::NoSidecar),
        SidecarStatus::Incomplete { missing } => return Ok(Outcome::Incomplete { missing }),
    };

    let date = capture_date(&metadata).map_err(|source| Error::Date {
        path: metadata.path.clone(),
        source,
    })?;

    debug!(
        "{} is \"{}\" ({}), taken {date}",
        file.path.display(),
        metadata.title().unwrap_or_default(),
        metadata.url().unwrap_or_default()
    );

    let relocation = relocator.relocate(file, date)?;
    if config.dry_run {
        info!(
            "Would move {} to {} ({date})",
            relocation.media_from.display(),
            relocation.media_to.display()
        );
    }
    Ok(Outcome::Relocated(relocation))
}

/// Runs the whole pipeline over `config.source_dir`.
///
/// Returns `Err` only for conditions that abort the run; per-file problems
/// end up in [`RunSummary::failures`].
pub fn run(config: &Config, stamper: &dyn TimestampSetter) -> Result<RunSummary> {
    let files = scan(config)?;
    let relocator = Relocator::prepare(config, stamper)?;

    let mut summary = RunSummary {
        scanned: files.len(),
        ..RunSummary::default()
    };

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) Sorting files...")
            .expect("Failed to set progress bar style"),
    );

    for file in &files {
        let result = pb.suspend(|| process_file(file, config, &relocator));
        if let Err(err) = pb.suspend(|| summary.record(file, result)) {
            pb.abandon();
            return Err(err);
        }
        pb.inc(1);
    }

    pb.finish_with_message("Sorting complete");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaKind;
    use crate::relocator::FsTimestampSetter;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn photo(path: PathBuf) -> MediaFile {
        MediaFile {
            path,
            kind: MediaKind::Photo,
        }
    }

    #[test]
    fn partial_move_is_counted_apart_from_other_failures() {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path());
        let relocator = Relocator::prepare(&config, &FsTimestampSetter).unwrap();
        let body = json!({
            "title": "ghost.jpg",
            "photoTakenTime": { "formatted": "Jan 5, 2021, 3:04:05 PM UTC" },
            "url": "https://photos.example/ghost"
        });
        fs::write(dir.path().join("ghost.jpg.json"), body.to_string()).unwrap();
        fs::write(dir.path().join("broken.jpg"), b"x").unwrap();
        fs::write(dir.path().join("broken.jpg.json"), b"{").unwrap();

        let mut summary = RunSummary::default();
        for file in [
            photo(dir.path().join("ghost.jpg")),
            photo(dir.path().join("broken.jpg")),
        ] {
            let result = process_file(&file, &config, &relocator);
            summary.record(&file, result).unwrap();
        }

        assert_eq!(summary.failures.len(), 2);
        assert_eq!(summary.partial_moves(), 1);
        assert!(matches!(
            summary.failures[0].error,
            Error::PartialMove { .. }
        ));
        assert!(dir.path().join("JSON").join("ghost.jpg.json").is_file());
    }

    #[test]
    fn fatal_errors_are_handed_back() {
        let mut summary = RunSummary::default();
        let err = Error::DestinationUnavailable {
            path: PathBuf::from("/takeout/sorted"),
            source: std::io::Error::other("read-only"),
        };

        let result = summary.record(&photo(PathBuf::from("/takeout/a.jpg")), Err(err));

        assert!(result.is_err());
        assert!(summary.failures.is_empty());
    }

    #[test]
    fn soft_skips_are_counted() {
        let mut summary = RunSummary::default();
        let file = photo(PathBuf::from("/takeout/a.jpg"));

        summary.record(&file, Ok(Outcome::NoSidecar)).unwrap();
        summary
            .record(
                &file,
                Ok(Outcome::Incomplete {
                    missing: vec!["url".to_string()],
                }),
            )
            .unwrap();

        assert_eq!(summary.skipped(), 2);
        assert!(summary.failures.is_empty());
    }
}

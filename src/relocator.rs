use crate::config::{Config, DATE_FOLDER_FORMAT};
use crate::error::{Error, Result};
use crate::scanner::MediaFile;
use chrono::{Local, NaiveDate, NaiveTime, TimeZone, Utc};
use log::{debug, warn};
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Sets the creation/modification date of a path.
pub trait TimestampSetter {
    fn set_date(&self, path: &Path, date: NaiveDate) -> io::Result<()>;
}

/// Stamps real filesystem entries with local midnight of the date.
///
/// Access and modification times are set everywhere; creation time only on
/// platforms that allow it (Windows and macOS).
#[derive(Debug, Default, Clone, Copy)]
pub struct FsTimestampSetter;

impl TimestampSetter for FsTimestampSetter {
    fn set_date(&self, path: &Path, date: NaiveDate) -> io::Result<()> {
        let time = local_midnight(date);
        let times = FileTimes::new().set_accessed(time).set_modified(time);

        #[cfg(windows)]
        let times = {
            use std::os::windows::fs::FileTimesExt;
            times.set_created(time)
        };
        #[cfg(target_os = "macos")]
        let times = {
            use std::os::macos::fs::FileTimesExt;
            times.set_created(time)
        };

        open_for_times(path)?.set_times(times)
    }
}

#[cfg(windows)]
fn open_for_times(path: &Path) -> io::Result<File> {
    use std::os::windows::fs::OpenOptionsExt;
    const FILE_WRITE_ATTRIBUTES: u32 = 0x0100;
    // Required to open directories.
    const FILE_FLAG_BACKUP_SEMANTICS: u32 = 0x0200_0000;

    fs::OpenOptions::new()
        .access_mode(FILE_WRITE_ATTRIBUTES)
        .custom_flags(FILE_FLAG_BACKUP_SEMANTICS)
        .open(path)
}

#[cfg(not(windows))]
fn open_for_times(path: &Path) -> io::Result<File> {
    File::open(path)
}

/// Midnight of `date` in the local timezone. Falls back to UTC midnight when
/// local midnight does not exist (DST gap).
#[must_use]
pub fn local_midnight(date: NaiveDate) -> SystemTime {
    let naive = date.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => SystemTime::from(local),
        None => SystemTime::from(Utc.from_utc_datetime(&naive)),
    }
}

/// Source and destination paths for one media/sidecar pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub media_from: PathBuf,
    pub media_to: PathBuf,
    pub sidecar_from: PathBuf,
    pub sidecar_to: PathBuf,
    /// Per-date folder holding `media_to`, when bucketing by date.
    pub date_dir: Option<PathBuf>,
}

pub struct Relocator<'a> {
    config: &'a Config,
    stamper: &'a dyn TimestampSetter,
    sorted_dir: PathBuf,
    metadata_dir: PathBuf,
}

impl<'a> Relocator<'a> {
    /// Creates the sorted and metadata directories when absent. Nothing is
    /// created on a dry run.
    pub fn prepare(config: &'a Config, stamper: &'a dyn TimestampSetter) -> Result<Self> {
        let sorted_dir = config.sorted_dir();
        let metadata_dir = config.metadata_dir();
        if !config.dry_run {
            for dir in [&sorted_dir, &metadata_dir] {
                fs::create_dir_all(dir).map_err(|source| Error::DestinationUnavailable {
                    path: dir.clone(),
                    source,
                })?;
            }
        }
        Ok(Self {
            config,
            stamper,
            sorted_dir,
            metadata_dir,
        })
    }

    #[must_use]
    pub fn plan(&self, file: &MediaFile, date: NaiveDate) -> Relocation {
        let name = file.path.file_name().unwrap_or_default();
        let date_dir = self
            .config
            .by_date
            .then(|| self.sorted_dir.join(date.format(DATE_FOLDER_FORMAT).to_string()));
        let media_to = date_dir
            .as_deref()
            .unwrap_or(self.sorted_dir.as_path())
            .join(name);

        let mut sidecar_name = name.to_os_string();
        sidecar_name.push(&self.config.sidecar_suffix);

        Relocation {
            media_from: file.path.clone(),
            media_to,
            sidecar_from: self.config.sidecar_path(&file.path),
            sidecar_to: self.metadata_dir.join(sidecar_name),
            date_dir,
        }
    }

    /// Moves the sidecar, then the media file, and stamps the result with
    /// `date`. Both destinations are checked before either move.
    pub fn relocate(&self, file: &MediaFile, date: NaiveDate) -> Result<Relocation> {
        let plan = self.plan(file, date);
        for target in [&plan.media_to, &plan.sidecar_to] {
            if target.exists() {
                return Err(Error::DestinationExists {
                    path: target.clone(),
                });
            }
        }
        if self.config.dry_run {
            return Ok(plan);
        }

        if let Some(dir) = &plan.date_dir {
            fs::create_dir_all(dir).map_err(|source| Error::DateFolder {
                path: dir.clone(),
                source,
            })?;
        }

        fs::rename(&plan.sidecar_from, &plan.sidecar_to).map_err(|source| Error::Move {
            from: plan.sidecar_from.clone(),
            to: plan.sidecar_to.clone(),
            source,
        })?;
        fs::rename(&plan.media_from, &plan.media_to).map_err(|source| Error::PartialMove {
            media: plan.media_from.clone(),
            sidecar: plan.sidecar_to.clone(),
            source,
        })?;
        debug!(
            "Moved {} -> {}",
            plan.media_from.display(),
            plan.media_to.display()
        );

        self.stamp(&plan.media_to, date);
        // Moving a file in bumps the folder's mtime, so restamp it each time.
        if let Some(dir) = &plan.date_dir {
            self.stamp(dir, date);
        }
        Ok(plan)
    }

    fn stamp(&self, path: &Path, date: NaiveDate) {
        if let Err(err) = self.stamper.set_date(path, date) {
            warn!("Cannot set timestamps on {}: {err}", path.display());
        }
    }
}

use crate::config::{Config, MediaKind};
use crate::error::{Error, Result};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    pub kind: MediaKind,
}

/// Immediate regular files of the source directory with a supported extension,
/// ordered by file name.
pub fn scan(config: &Config) -> Result<Vec<MediaFile>> {
    let entries = fs::read_dir(&config.source_dir).map_err(|source| Error::SourceUnavailable {
        path: config.source_dir.clone(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| Error::SourceUnavailable {
            path: config.source_dir.clone(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(rule) = config.rule_for(&path) {
            files.push(MediaFile {
                path,
                kind: rule.kind,
            });
        }
    }

    files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn keeps_only_supported_regular_files() {
        let dir = TempDir::new().unwrap();
        for name in ["b.JPG", "a.mp4", "a.mp4.json", "notes.txt"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("folder.jpg")).unwrap();

        let files = scan(&Config::new(dir.path())).unwrap();

        let names: Vec<&str> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["a.mp4", "b.JPG"]);
        assert_eq!(files[0].kind, MediaKind::Video);
        assert_eq!(files[1].kind, MediaKind::Photo);
    }

    #[test]
    fn does_not_descend_into_subdirectories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sorted")).unwrap();
        fs::write(dir.path().join("sorted").join("old.jpg"), b"x").unwrap();

        assert!(scan(&Config::new(dir.path())).unwrap().is_empty());
    }

    #[test]
    fn missing_source_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = scan(&Config::new(dir.path().join("nope"))).unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { .. }));
        assert!(err.is_fatal());
    }
}

//! Loading and validating the JSON sidecar that sits next to each media file.

use crate::config::{Config, PHOTO_TAKEN_TIME, VIDEO_TAKEN_TIME};
use crate::error::{Error, Result};
use crate::scanner::MediaFile;
use log::{debug, warn};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::PathBuf;

/// A parsed sidecar document. Read-only.
#[derive(Debug, Clone)]
pub struct SidecarMetadata {
    pub path: PathBuf,
    document: Value,
}

impl SidecarMetadata {
    pub fn new(path: impl Into<PathBuf>, document: Value) -> Self {
        Self {
            path: path.into(),
            document,
        }
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.document.get("title").and_then(Value::as_str)
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.document.get("url").and_then(Value::as_str)
    }

    /// `photoTakenTime` when present, otherwise `videoTakenTime`.
    #[must_use]
    pub fn taken_time(&self) -> Option<&Value> {
        self.document
            .get(PHOTO_TAKEN_TIME)
            .or_else(|| self.document.get(VIDEO_TAKEN_TIME))
    }
}

#[derive(Debug)]
pub enum SidecarStatus {
    Loaded(SidecarMetadata),
    /// No sidecar at the conventional path.
    Missing,
    /// Sidecar present but lacking fields required for the media kind.
    Incomplete { missing: Vec<String> },
}

pub fn load_sidecar(file: &MediaFile, config: &Config) -> Result<SidecarStatus> {
    let sidecar_path = config.sidecar_path(&file.path);
    let content = match fs::read_to_string(&sidecar_path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("No sidecar for {}", file.path.display());
            return Ok(SidecarStatus::Missing);
        }
        Err(source) => {
            return Err(Error::SidecarRead {
                path: sidecar_path,
                source,
            });
        }
    };

    let document: Value =
        serde_json::from_str(&content).map_err(|err| Error::MalformedSidecar {
            path: sidecar_path.clone(),
            reason: err.to_string(),
        })?;
    if !document.is_object() {
        return Err(Error::MalformedSidecar {
            path: sidecar_path,
            reason: "top-level value is not an object".to_string(),
        });
    }

    // Same extension lookup the scanner used; kind only when the path has no rule.
    let required: &[String] = config
        .rule_for(&file.path)
        .or_else(|| config.rule_for_kind(file.kind))
        .map(|rule| rule.required_fields.as_slice())
        .unwrap_or_default();
    let missing: Vec<String> = required
        .iter()
        .filter(|field| document.get(field.as_str()).is_none())
        .cloned()
        .collect();

    if !missing.is_empty() {
        warn!(
            "Skipping {} due to missing {} field(s) in JSON file: {}",
            file.path.display(),
            missing.join(", "),
            document
        );
        return Ok(SidecarStatus::Incomplete { missing });
    }

    Ok(SidecarStatus::Loaded(SidecarMetadata::new(
        sidecar_path,
        document,
    )))
}

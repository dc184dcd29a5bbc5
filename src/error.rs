use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a `formatted` timestamp could not become a capture date.
#[derive(Debug, Error)]
pub enum DateError {
    #[error("sidecar has neither photoTakenTime nor videoTakenTime")]
    MissingTakenTime,

    #[error("taken-time object has no \"formatted\" string")]
    MissingTimestamp,

    #[error("cannot parse timestamp {normalized:?} (raw {raw:?}): {source}")]
    Unparseable {
        raw: String,
        normalized: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("source directory {path} is not accessible: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create destination directory {path}: {source}")]
    DestinationUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read sidecar {path}: {source}")]
    SidecarRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed sidecar {path}: {reason}")]
    MalformedSidecar { path: PathBuf, reason: String },

    #[error("{path}: {source}")]
    Date {
        path: PathBuf,
        #[source]
        source: DateError,
    },

    #[error("cannot create date folder {path}: {source}")]
    DateFolder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    #[error("cannot move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "sidecar moved to {sidecar} but media {media} could not be moved: {source}; reconcile manually"
    )]
    PartialMove {
        media: PathBuf,
        sidecar: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Fatal errors abort the run; everything else is reported against one file.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. } | Self::DestinationUnavailable { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

use std::path::{Path, PathBuf};

pub const SIDECAR_SUFFIX: &str = ".json";
pub const SORTED_DIR_NAME: &str = "sorted";
pub const METADATA_DIR_NAME: &str = "JSON";
pub const DATE_FOLDER_FORMAT: &str = "%Y-%m-%d";

pub const PHOTO_TAKEN_TIME: &str = "photoTakenTime";
pub const VIDEO_TAKEN_TIME: &str = "videoTakenTime";

const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "heic", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v", "3gp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// Sidecar key holding the taken-time object for this kind.
    #[must_use]
    pub const fn taken_time_field(self) -> &'static str {
        match self {
            Self::Photo => PHOTO_TAKEN_TIME,
            Self::Video => VIDEO_TAKEN_TIME,
        }
    }
}

/// Ties a class of extensions to the sidecar fields its files must carry.
#[derive(Debug, Clone)]
pub struct MediaRule {
    pub kind: MediaKind,
    /// Lowercase, without the leading dot.
    pub extensions: Vec<String>,
    pub required_fields: Vec<String>,
}

impl MediaRule {
    fn new(kind: MediaKind, extensions: &[&str]) -> Self {
        Self {
            kind,
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
            required_fields: ["title", kind.taken_time_field(), "url"]
                .iter()
                .map(|field| field.to_string())
                .collect(),
        }
    }

    fn matches(&self, extension: &str) -> bool {
        self.extensions.iter().any(|ext| ext == extension)
    }
}

/// Everything a run needs, built once at startup and passed down the pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    pub source_dir: PathBuf,
    pub sorted_dir_name: String,
    pub metadata_dir_name: String,
    pub sidecar_suffix: String,
    pub rules: Vec<MediaRule>,
    /// Group media into `sorted/<YYYY-MM-DD>/` folders instead of a flat `sorted/`.
    pub by_date: bool,
    pub dry_run: bool,
}

impl Config {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            sorted_dir_name: SORTED_DIR_NAME.to_string(),
            metadata_dir_name: METADATA_DIR_NAME.to_string(),
            sidecar_suffix: SIDECAR_SUFFIX.to_string(),
            rules: vec![
                MediaRule::new(MediaKind::Photo, PHOTO_EXTENSIONS),
                MediaRule::new(MediaKind::Video, VIDEO_EXTENSIONS),
            ],
            by_date: false,
            dry_run: false,
        }
    }

    #[must_use]
    pub fn sorted_dir(&self) -> PathBuf {
        self.source_dir.join(&self.sorted_dir_name)
    }

    #[must_use]
    pub fn metadata_dir(&self) -> PathBuf {
        self.source_dir.join(&self.metadata_dir_name)
    }

    /// Rule for the file's extension, compared case-insensitively.
    #[must_use]
    pub fn rule_for(&self, path: &Path) -> Option<&MediaRule> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        self.rules.iter().find(|rule| rule.matches(&extension))
    }

    #[must_use]
    pub fn rule_for_kind(&self, kind: MediaKind) -> Option<&MediaRule> {
        self.rules.iter().find(|rule| rule.kind == kind)
    }

    /// `name.ext` -> `name.ext.json`, next to the media file.
    #[must_use]
    pub fn sidecar_path(&self, media_path: &Path) -> PathBuf {
        let mut raw = media_path.as_os_str().to_os_string();
        raw.push(&self.sidecar_suffix);
        PathBuf::from(raw)
    }
}

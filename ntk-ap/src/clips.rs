//! Clip resolution
//!
//! Maps clip names to the raw bytes of their sound files for the active
//! voice language. Layout on disk:
//!
//! ```text
//! <resource_path>/<language>/sound_files/<clip>.mp3
//! <resource_path>/<language>/sound_files/temp.mp3   (scratch artifact)
//! ```

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory below the language folder holding the clips
pub const SOUND_FILES_DIR: &str = "sound_files";

/// Extension of every clip file
pub const CLIP_EXTENSION: &str = "mp3";

/// File name of the concatenated advice handed to the backend
pub const SCRATCH_FILE_NAME: &str = "temp.mp3";

/// Source of clip payloads
pub trait ClipSource {
    /// Read the full contents of one clip
    fn load_clip(&self, name: &str) -> Result<Vec<u8>>;

    /// Fixed path of the scratch artifact
    fn scratch_path(&self) -> PathBuf;

    /// Switch the voice language used for subsequent lookups
    ///
    /// Sources without language variants ignore this.
    fn set_language(&mut self, _language: &str) {}
}

/// Clip source backed by the voice resource folder
#[derive(Debug, Clone)]
pub struct SoundFileStore {
    resource_path: PathBuf,
    language: String,
}

impl SoundFileStore {
    pub fn new(resource_path: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            resource_path: resource_path.into(),
            language: language.into(),
        }
    }

    pub fn resource_path(&self) -> &Path {
        &self.resource_path
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Folder holding the clips of the active language
    pub fn sound_files_dir(&self) -> PathBuf {
        self.resource_path.join(&self.language).join(SOUND_FILES_DIR)
    }

    /// Path a clip name resolves to
    pub fn clip_path(&self, name: &str) -> PathBuf {
        self.sound_files_dir()
            .join(format!("{}.{}", name, CLIP_EXTENSION))
    }
}

impl ClipSource for SoundFileStore {
    fn load_clip(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.clip_path(name);

        // Clip names are single path components
        if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
            return Err(Error::ClipRead {
                clip: name.to_string(),
                path,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "clip name is not a plain file name",
                ),
            });
        }

        let bytes = std::fs::read(&path).map_err(|source| Error::ClipRead {
            clip: name.to_string(),
            path: path.clone(),
            source,
        })?;

        debug!("Loaded clip '{}' ({} bytes)", name, bytes.len());
        Ok(bytes)
    }

    fn scratch_path(&self) -> PathBuf {
        self.sound_files_dir().join(SCRATCH_FILE_NAME)
    }

    fn set_language(&mut self, language: &str) {
        if self.language != language {
            info!("Voice language changed: {} -> {}", self.language, language);
            self.language = language.to_string();
        }
    }
}

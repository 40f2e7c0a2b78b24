use std::{fs, path::Path, sync::Arc};

use crate::error::{StoryError, StoryResult};

/// An image picked by the user, held in memory until replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSelection {
    file_name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl ImageSelection {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> StoryResult<Self> {
        let file_name = file_name.into();
        let mime_type = mime_type.into().trim().to_ascii_lowercase();
        let bytes = bytes.into();

        if !mime_type.starts_with("image/") {
            return Err(StoryError::validation(format!(
                "'{file_name}' is not an image (mime type {mime_type})"
            )));
        }
        if bytes.is_empty() {
            return Err(StoryError::validation(format!("'{file_name}' is empty")));
        }

        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    /// Reads an image from disk, guessing its mime type from the extension.
    pub fn from_path(path: &Path) -> StoryResult<Self> {
        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let bytes = fs::read(path).map_err(|e| {
            StoryError::validation(format!("failed to read '{}': {e}", path.display()))
        })?;
        Self::new(file_name, mime_type, bytes)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

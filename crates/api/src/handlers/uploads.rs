//! Multipart parsing and on-disk storage for uploaded media.
//!
//! Files live under `ServerConfig::media_root` and are addressed by a path
//! relative to it (`memes/<uuid>.png`). The public URL is built with
//! `ServerConfig::media_url_for`.

use std::collections::HashMap;

use axum::extract::Multipart;

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};

/// A file part of a multipart form.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// A parsed multipart form: at most one file plus text fields.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl MultipartForm {
    /// The named text field, trimmed. Empty values count as missing.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Take the file part or fail with 400 naming the expected field.
    pub fn take_file(&mut self, field: &str) -> AppResult<UploadedFile> {
        self.file
            .take()
            .ok_or_else(|| AppError::BadRequest(format!("Missing required '{field}' field")))
    }
}

/// Read every part of `multipart`. The part named `file_field` is kept as
/// bytes; any other part is read as text. Files larger than `max_bytes`
/// are rejected.
pub async fn read_form(
    mut multipart: Multipart,
    file_field: &str,
    max_bytes: usize,
) -> AppResult<MultipartForm> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == file_field {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            if data.len() > max_bytes {
                return Err(AppError::BadRequest(format!(
                    "Uploaded file exceeds {max_bytes} bytes"
                )));
            }
            form.file = Some(UploadedFile {
                filename,
                data: data.to_vec(),
            });
        } else if !name.is_empty() {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            form.fields.insert(name, text);
        }
    }

    Ok(form)
}

/// Write `data` to `<media_root>/<subdir>/<uuid>.<ext>` and return the path
/// relative to the media root.
pub async fn store(
    config: &ServerConfig,
    subdir: &str,
    ext: &str,
    data: &[u8],
) -> AppResult<String> {
    let dir = config.media_root.join(subdir);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    let relative = format!("{subdir}/{}.{ext}", uuid::Uuid::new_v4());
    tokio::fs::write(config.media_root.join(&relative), data)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    tracing::debug!(path = %relative, size = data.len(), "Stored upload");
    Ok(relative)
}

/// Best-effort removal of a stored file; failures are logged, not returned.
pub async fn remove(config: &ServerConfig, relative: &str) {
    let path = config.media_root.join(relative);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove media file");
    }
}

/// Lowercase extension of `filename`, or `bin` when it has none.
pub fn extension_or_default(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_fallbacks() {
        assert_eq!(extension_or_default("Report.PDF"), "pdf");
        assert_eq!(extension_or_default("README"), "bin");
        assert_eq!(extension_or_default("weird.p/df"), "bin");
    }
}

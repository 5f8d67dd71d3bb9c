/// Multipart photo uploads
///
/// [`PhotoForm`] is an extractor that reads a `multipart/form-data` body. It
/// collects the text fields and writes a `photo` file part into the uploads
/// directory under a generated name. Only PNG and JPEG images are accepted.
/// A JSON object body fills the same fields without a photo, and any other
/// body yields an empty form.
///
/// Stored files are named `<field>-<unix_millis><ext>`, with `<ext>` taken
/// from the client's original filename, and are served back by the static
/// file fallback at `/uploads/<name>`.
///
/// # Example
///
/// ```ignore
/// async fn update(form: PhotoForm) -> ApiResult<Json<Value>> {
///     let name = form.field("name");
///     let stored = form.photo.map(|file| file.filename);
///     // ...
/// }
/// ```

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::{header, HeaderMap},
    Json,
};
use serde_json::Value;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::{app::AppState, error::ApiError};

/// Name of the multipart field carrying the photo
pub const PHOTO_FIELD: &str = "photo";

/// URL path prefix under which uploads are served
pub const UPLOADS_PATH: &str = "/uploads";

/// MIME types accepted for photos
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];

/// Error type for upload handling
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The photo part's content type is not an allowed image type
    #[error("Invalid image type")]
    InvalidImageType(String),

    /// The body is not a well-formed multipart form
    #[error("Invalid multipart form: {0}")]
    Multipart(String),

    /// Writing the file to disk failed
    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// A photo written to the uploads directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Generated file name, e.g. `photo-1718000000000.png`
    pub filename: String,

    /// Full path on disk
    pub path: PathBuf,
}

/// Parsed multipart form with an optional stored photo
#[derive(Debug, Default)]
pub struct PhotoForm {
    pub fields: HashMap<String, String>,
    pub photo: Option<StoredFile>,
}

impl PhotoForm {
    /// Returns a text field's value
    pub fn field(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    /// Builds a photo-less form from a JSON object
    ///
    /// Strings are taken as-is, `null` is dropped and other values keep
    /// their JSON text.
    pub fn from_json(values: HashMap<String, Value>) -> Self {
        let fields = values
            .into_iter()
            .filter_map(|(name, value)| match value {
                Value::Null => None,
                Value::String(s) => Some((name, s)),
                other => Some((name, other.to_string())),
            })
            .collect();

        PhotoForm {
            fields,
            photo: None,
        }
    }

    /// Reads every part of `multipart`, storing the photo under `dir`
    ///
    /// # Errors
    ///
    /// - `UploadError::InvalidImageType` if the photo is not PNG or JPEG
    /// - `UploadError::Multipart` for a malformed body or a second photo
    /// - `UploadError::Io` if the file can't be written
    ///
    /// A photo already written is removed again when a later part fails.
    pub async fn read(mut multipart: Multipart, dir: &Path) -> Result<Self, UploadError> {
        let mut form = PhotoForm::default();

        let result = async {
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| UploadError::Multipart(e.body_text()))?
            {
                let name = field.name().unwrap_or_default().to_string();

                if field.file_name().is_none() {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| UploadError::Multipart(e.body_text()))?;
                    form.fields.insert(name, value);
                    continue;
                }

                if name != PHOTO_FIELD {
                    tracing::debug!(field = %name, "Ignoring unexpected file field");
                    continue;
                }

                if form.photo.is_some() {
                    return Err(UploadError::Multipart(
                        "Only one photo may be uploaded".to_string(),
                    ));
                }

                check_image_type(field.content_type())?;

                let filename = stored_file_name(
                    &name,
                    field.file_name(),
                    chrono::Utc::now().timestamp_millis(),
                );
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| UploadError::Multipart(e.body_text()))?;

                tokio::fs::create_dir_all(dir).await?;
                let path = dir.join(&filename);
                tokio::fs::write(&path, &bytes).await?;

                tracing::debug!(file = %filename, size = bytes.len(), "Stored uploaded photo");
                form.photo = Some(StoredFile { filename, path });
            }

            Ok::<_, UploadError>(())
        }
        .await;

        match result {
            Ok(()) => Ok(form),
            Err(err) => {
                if let Some(stored) = form.photo.take() {
                    remove_in_background(stored.path);
                }
                Err(err)
            }
        }
    }
}

#[async_trait]
impl FromRequest<AppState> for PhotoForm {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        match body_kind(req.headers()) {
            BodyKind::Multipart => {
                let multipart = Multipart::from_request(req, state).await?;
                Ok(PhotoForm::read(multipart, &state.config.uploads_dir()).await?)
            }
            BodyKind::Json => {
                let Json(values) = Json::<HashMap<String, Value>>::from_request(req, state).await?;
                Ok(PhotoForm::from_json(values))
            }
            BodyKind::Other => Ok(PhotoForm::default()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Multipart,
    Json,
    Other,
}

fn body_kind(headers: &HeaderMap) -> BodyKind {
    let mime = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if mime == "multipart/form-data" {
        BodyKind::Multipart
    } else if mime == "application/json" || mime.ends_with("+json") {
        BodyKind::Json
    } else {
        BodyKind::Other
    }
}

/// Rejects anything but the allowed image MIME types
pub fn check_image_type(content_type: Option<&str>) -> Result<(), UploadError> {
    match content_type {
        Some(mime) if ALLOWED_IMAGE_TYPES.contains(&mime) => Ok(()),
        other => Err(UploadError::InvalidImageType(
            other.unwrap_or_default().to_string(),
        )),
    }
}

/// Builds the on-disk name for an uploaded file
pub fn stored_file_name(field: &str, original: Option<&str>, millis: i64) -> String {
    let ext = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();

    format!("{}-{}{}", field, millis, ext)
}

/// Absolute URL for an uploaded file
///
/// Uses the request's `Host` header (and `X-Forwarded-Proto` when present),
/// falling back to `base_url`. With neither, the URL is root-relative.
pub fn public_url(headers: &HeaderMap, base_url: Option<&str>, filename: &str) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty());

    let origin = match host {
        Some(host) => {
            let scheme = headers
                .get("x-forwarded-proto")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("http");
            format!("{}://{}", scheme, host)
        }
        None => base_url.unwrap_or_default().to_string(),
    };

    format!("{}{}/{}", origin, UPLOADS_PATH, filename)
}

/// Resolves the file behind a stored photo URL
///
/// Only the last path segment is used, so a URL can never point outside `dir`.
pub fn photo_path(dir: &Path, photo_url: &str) -> Option<PathBuf> {
    let name = photo_url.rsplit('/').next()?;

    if name.is_empty() || name == "." || name == ".." || name.contains('\\') {
        return None;
    }

    Some(dir.join(name))
}

/// Deletes the file behind `photo_url` without waiting for the result
pub fn remove_photo(dir: &Path, photo_url: &str) {
    match photo_path(dir, photo_url) {
        Some(path) => remove_in_background(path),
        None => tracing::warn!(photo = %photo_url, "Photo URL has no file name, not deleting"),
    }
}

/// Spawns a best-effort file removal; failures are only logged
pub fn remove_in_background(path: PathBuf) {
    tokio::spawn(async move {
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "Deleted photo"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to delete photo"),
        }
    });
}

/**
 * Image File Store
 *
 * Content-addressed image storage. An upload is named after the BLAKE3 hash
 * of its bytes plus the extension of its format, so uploading the same image
 * twice yields the same name and a single file. Bytes are stored as received;
 * no transcoding or thumbnailing.
 *
 * The format is read from the file signature, falling back to the content
 * type the client declared. Served images take their content type from the
 * extension.
 *
 * Names handed in by clients are checked to be a single path component before
 * they touch the filesystem.
 */

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;

use crate::backend::error::BackendError;

/// Image formats accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    const ALL: [ImageFormat; 4] = [Self::Jpeg, Self::Png, Self::Gif, Self::Webp];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    /// Format of a declared content type such as `image/png`
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        let essence = mime_type.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Format of a stored name, by extension
    pub fn from_name(name: &str) -> Option<Self> {
        let (_, extension) = name.rsplit_once('.')?;
        let extension = extension.to_ascii_lowercase();
        if extension == "jpeg" {
            return Some(Self::Jpeg);
        }
        Self::ALL.into_iter().find(|format| format.extension() == extension)
    }

    /// Format from the file signature
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else {
            None
        }
    }
}

/// Name an image by its content
pub fn content_name(bytes: &[u8], format: ImageFormat) -> String {
    format!("{}.{}", blake3::hash(bytes).to_hex(), format.extension())
}

/// Whether `name` is safe to join onto the image folder
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
}

fn check_name(name: &str) -> Result<(), BackendError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(BackendError::validation("name", "Invalid image name"))
    }
}

/// Storage for uploaded recipe images
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `bytes`, returning the generated name
    async fn save(&self, bytes: Bytes, format: ImageFormat) -> Result<String, BackendError>;

    /// Bytes of a stored image, `None` if absent
    async fn load(&self, name: &str) -> Result<Option<Bytes>, BackendError>;

    /// Remove an image; returns whether a file was removed
    async fn remove(&self, name: &str) -> Result<bool, BackendError>;
}

/// Images stored as files in one folder
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn io_error(action: &str, name: &str, err: std::io::Error) -> BackendError {
        BackendError::internal(format!("failed to {} image {}: {}", action, name, err))
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn save(&self, bytes: Bytes, format: ImageFormat) -> Result<String, BackendError> {
        let name = content_name(&bytes, format);
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|err| Self::io_error("prepare folder for", &name, err))?;
        tokio::fs::write(self.root.join(&name), &bytes)
            .await
            .map_err(|err| Self::io_error("write", &name, err))?;

        tracing::info!("[Images] Stored {} ({} bytes)", name, bytes.len());
        Ok(name)
    }

    async fn load(&self, name: &str) -> Result<Option<Bytes>, BackendError> {
        check_name(name)?;
        match tokio::fs::read(self.root.join(name)).await {
            Ok(bytes) => Ok(Some(Bytes::from(bytes))),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Self::io_error("read", name, err)),
        }
    }

    async fn remove(&self, name: &str) -> Result<bool, BackendError> {
        check_name(name)?;
        match tokio::fs::remove_file(self.root.join(name)).await {
            Ok(()) => {
                tracing::info!("[Images] Removed {}", name);
                Ok(true)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(Self::io_error("remove", name, err)),
        }
    }
}

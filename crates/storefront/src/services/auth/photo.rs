//! Profile photos stored inline as data URLs.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::AuthError;

/// Largest accepted photo, before encoding.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// An image encoded as a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePhoto(String);

impl ProfilePhoto {
    /// Encode raw image bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes exceed [`MAX_PHOTO_BYTES`] or
    /// `content_type` is not an `image/*` type.
    pub fn from_bytes(content_type: &str, bytes: &[u8]) -> Result<Self, AuthError> {
        if bytes.len() > MAX_PHOTO_BYTES {
            return Err(AuthError::PhotoTooLarge {
                size: bytes.len(),
                max: MAX_PHOTO_BYTES,
            });
        }
        let content_type = content_type.trim().to_ascii_lowercase();
        if !content_type.starts_with("image/") {
            return Err(AuthError::UnsupportedPhoto(content_type));
        }
        Ok(Self(format!(
            "data:{content_type};base64,{}",
            STANDARD.encode(bytes)
        )))
    }

    /// Guess the content type from a file extension.
    #[must_use]
    pub fn content_type_for(path: &std::path::Path) -> &'static str {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            Some("jpg" | "jpeg") => "image/jpeg",
            _ => "application/octet-stream",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

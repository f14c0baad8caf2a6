//! Object key generation and public URL resolution.

use url::Url;

use vboost_models::VideoId;

use crate::error::{StorageError, StorageResult};

/// Content type of processed artifacts.
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Default bucket for processed videos.
pub const DEFAULT_BUCKET: &str = "processed-videos";

/// Public object base of a local Supabase stack.
pub const LOCAL_PUBLIC_BASE_URL: &str = "http://localhost:54321/storage/v1/object/public";

/// Object key for a processed video.
///
/// Format: `{video_id}.mp4`
pub fn processed_video_key(video_id: &VideoId) -> String {
    format!("{}.mp4", video_id)
}

/// Reject keys that would escape the bucket or produce ambiguous URLs.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::invalid_key("key is empty"));
    }
    if key.starts_with('/') {
        return Err(StorageError::invalid_key(format!("{} starts with '/'", key)));
    }
    if key.chars().any(char::is_control) {
        return Err(StorageError::invalid_key(format!("{:?} contains control characters", key)));
    }
    for segment in key.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(StorageError::invalid_key(format!("{} has an invalid path segment", key)));
        }
    }
    Ok(())
}

/// Builds public object URLs of the form `{base}/{bucket}/{key}`.
///
/// For Supabase the base is `{SUPABASE_URL}/storage/v1/object/public`.
#[derive(Debug, Clone)]
pub struct PublicUrlBuilder {
    base: Url,
    bucket: String,
}

impl PublicUrlBuilder {
    pub fn new(base_url: &str, bucket: impl Into<String>) -> StorageResult<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| StorageError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        if base.cannot_be_a_base() {
            return Err(StorageError::InvalidUrl(format!(
                "{} cannot be used as a base URL",
                base_url
            )));
        }

        let bucket = bucket.into();
        if bucket.is_empty() || bucket.contains('/') {
            return Err(StorageError::config_error(format!("invalid bucket name: {:?}", bucket)));
        }

        Ok(Self { base, bucket })
    }

    /// Build from `STORAGE_PUBLIC_BASE_URL` (or `SUPABASE_URL`) and `STORAGE_BUCKET`,
    /// falling back to a local Supabase stack.
    pub fn from_env() -> StorageResult<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let base = var("STORAGE_PUBLIC_BASE_URL")
            .or_else(|| {
                var("SUPABASE_URL")
                    .map(|u| format!("{}/storage/v1/object/public", u.trim().trim_end_matches('/')))
            })
            .unwrap_or_else(|| LOCAL_PUBLIC_BASE_URL.to_string());
        let bucket = var("STORAGE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string());

        Self::new(base.trim(), bucket.trim())
    }

    /// Public URL for `key`. Each key segment is percent-encoded.
    pub fn url_for(&self, key: &str) -> StorageResult<String> {
        validate_key(key)?;

        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StorageError::InvalidUrl(self.base.to_string()))?;
            segments.pop_if_empty().push(&self.bucket).extend(key.split('/'));
        }

        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUPABASE_BASE: &str = "https://proj.supabase.co/storage/v1/object/public";

    #[test]
    fn test_processed_video_key() {
        let id = VideoId::from("123e4567-e89b-12d3-a456-426614174000");
        assert_eq!(
            processed_video_key(&id),
            "123e4567-e89b-12d3-a456-426614174000.mp4"
        );
    }

    #[test]
    fn test_public_url_for_key() {
        let builder = PublicUrlBuilder::new(SUPABASE_BASE, "processed-videos").unwrap();
        assert_eq!(
            builder.url_for("abc.mp4").unwrap(),
            "https://proj.supabase.co/storage/v1/object/public/processed-videos/abc.mp4"
        );
    }

    #[test]
    fn test_public_url_ignores_trailing_slash() {
        let with_slash = format!("{}/", SUPABASE_BASE);
        let builder = PublicUrlBuilder::new(&with_slash, "processed-videos").unwrap();
        assert_eq!(
            builder.url_for("abc.mp4").unwrap(),
            "https://proj.supabase.co/storage/v1/object/public/processed-videos/abc.mp4"
        );
    }

    #[test]
    fn test_public_url_encodes_segments() {
        let builder = PublicUrlBuilder::new(SUPABASE_BASE, "videos").unwrap();
        let url = builder.url_for("user 1/my clip.mp4").unwrap();
        assert!(url.ends_with("/videos/user%201/my%20clip.mp4"), "{}", url);
    }

    #[test]
    fn test_invalid_keys_rejected() {
        for key in ["", "/abs.mp4", "a/../b.mp4", "a//b.mp4", "./a.mp4", "bad\nkey"] {
            assert!(validate_key(key).is_err(), "{:?} should be rejected", key);
        }
        assert!(validate_key("nested/path/clip.mp4").is_ok());
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_fallbacks() {
        std::env::remove_var("STORAGE_PUBLIC_BASE_URL");
        std::env::remove_var("STORAGE_BUCKET");
        std::env::remove_var("SUPABASE_URL");
        let local = PublicUrlBuilder::from_env().unwrap();
        assert_eq!(
            local.url_for("a.mp4").unwrap(),
            "http://localhost:54321/storage/v1/object/public/processed-videos/a.mp4"
        );

        std::env::set_var("SUPABASE_URL", "https://proj.supabase.co");
        std::env::set_var("STORAGE_BUCKET", "clips");
        let hosted = PublicUrlBuilder::from_env().unwrap();
        assert_eq!(
            hosted.url_for("a.mp4").unwrap(),
            "https://proj.supabase.co/storage/v1/object/public/clips/a.mp4"
        );

        std::env::remove_var("SUPABASE_URL");
        std::env::remove_var("STORAGE_BUCKET");
    }

    #[test]
    fn test_invalid_builder_inputs() {
        assert!(PublicUrlBuilder::new("not a url", "bucket").is_err());
        assert!(PublicUrlBuilder::new("mailto:someone@example.com", "bucket").is_err());
        assert!(PublicUrlBuilder::new(SUPABASE_BASE, "").is_err());
        assert!(PublicUrlBuilder::new(SUPABASE_BASE, "a/b").is_err());
    }
}

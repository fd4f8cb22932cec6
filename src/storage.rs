//! Portfolio image bucket backed by a local directory.
//!
//! Objects are written once under a generated key and served back by the
//! public site at `<public base url>/media/<key>`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{StudioError, StudioResult};
use crate::services::portfolio::storage_file_slug;

pub const MAX_WIDTH: u32 = 1920;
pub const MAX_HEIGHT: u32 = 1080;
pub const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
    public_base_url: String,
    compress: bool,
}

/// Keys are generated from `[a-z0-9.-]` only; anything else is rejected before touching the disk.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
}

/// `<unix millis>-<file slug>`
pub fn object_key(file_name: &str, millis: i64) -> String {
    format!("{}-{}", millis, storage_file_slug(file_name))
}

pub fn content_type(key: &str) -> mime::Mime {
    let extension = Path::new(key)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    match extension {
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "png" => mime::IMAGE_PNG,
        "gif" => mime::IMAGE_GIF,
        "webp" => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

/// Scale to fit the box keeping aspect ratio: width first, then height.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let (mut w, mut h) = (width as f64, height as f64);
    if w > max_width as f64 {
        h = (h * max_width as f64 / w).round();
        w = max_width as f64;
    }
    if h > max_height as f64 {
        w = (w * max_height as f64 / h).round();
        h = max_height as f64;
    }
    ((w as u32).max(1), (h as u32).max(1))
}

/// Re-encode as JPEG, downscaled to fit the public gallery.
pub fn compress_image(bytes: &[u8]) -> StudioResult<Vec<u8>> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = fit_within(img.width(), img.height(), MAX_WIDTH, MAX_HEIGHT);
    let img = if (width, height) == (img.width(), img.height()) {
        img
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    };

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(&img.to_rgb8())?;
    Ok(out)
}

fn with_jpeg_extension(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    format!("{}.jpg", stem)
}

impl BlobStore {
    pub fn new(
        root: impl Into<PathBuf>,
        public_base_url: &str,
        compress: bool,
    ) -> StudioResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;

        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            compress,
        })
    }

    pub fn from_config(config: &Config) -> StudioResult<Self> {
        Self::new(
            &config.storage_dir,
            &config.public_base_url,
            config.compress_uploads,
        )
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/media/{}", self.public_base_url, key)
    }

    fn path_for(&self, key: &str) -> StudioResult<PathBuf> {
        if !is_valid_key(key) {
            return Err(StudioError::InvalidValue {
                field: "object key",
                value: key.to_string(),
            });
        }
        Ok(self.root.join(key))
    }

    /// Store a new object. An existing key is never overwritten.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> StudioResult<StoredObject> {
        let (file_name, bytes) = if self.compress {
            let original = bytes.len();
            let compressed = compress_image(&bytes)?;
            debug!(original, compressed = compressed.len(), "image compressed");
            (with_jpeg_extension(file_name), compressed)
        } else {
            (file_name.to_string(), bytes)
        };

        let key = object_key(&file_name, Utc::now().timestamp_millis());
        let path = self.path_for(&key)?;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => {
                    StudioError::validation(format!("object {} already exists", key))
                }
                _ => StudioError::Io(e),
            })?;
        file.write_all(&bytes).await?;
        file.flush().await?;

        info!(%key, size = bytes.len(), "object uploaded");
        Ok(StoredObject {
            url: self.public_url(&key),
            key,
        })
    }

    pub async fn read(&self, key: &str) -> StudioResult<Vec<u8>> {
        let path = self.path_for(key)?;
        fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StudioError::not_found("object", key),
            _ => StudioError::Io(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn keys_are_prefixed_and_slugged() {
        assert_eq!(
            object_key("Ensaio Final (2).JPG", 1_700_000_000_000),
            "1700000000000-ensaio-final--2-.jpg"
        );
    }

    #[test]
    fn traversal_keys_are_rejected() {
        assert!(is_valid_key("1700-photo.jpg"));
        assert!(!is_valid_key("../etc/passwd"));
        assert!(!is_valid_key(".hidden"));
        assert!(!is_valid_key("a/b.jpg"));
        assert!(!is_valid_key(""));
    }

    #[test]
    fn fit_scales_width_then_height() {
        assert_eq!(fit_within(800, 600, 1920, 1080), (800, 600));
        assert_eq!(fit_within(3840, 2160, 1920, 1080), (1920, 1080));
        assert_eq!(fit_within(4000, 2000, 1920, 1080), (1920, 960));
        assert_eq!(fit_within(1000, 3000, 1920, 1080), (360, 1080));
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type("1-a.jpg"), mime::IMAGE_JPEG);
        assert_eq!(content_type("1-a.png"), mime::IMAGE_PNG);
        assert_eq!(content_type("1-a"), mime::APPLICATION_OCTET_STREAM);
    }

    #[tokio::test]
    async fn upload_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let bucket = BlobStore::new(dir.path(), "http://localhost:3000/", false).unwrap();

        let stored = bucket.upload("Capa.png", b"not really a png".to_vec()).await.unwrap();
        assert!(stored.key.ends_with("-capa.png"));
        assert_eq!(stored.url, format!("http://localhost:3000/media/{}", stored.key));
        assert_eq!(bucket.read(&stored.key).await.unwrap(), b"not really a png");
        assert!(matches!(
            bucket.read("1-missing.png").await,
            Err(StudioError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn compressed_uploads_become_bounded_jpegs() {
        let dir = tempfile::tempdir().unwrap();
        let bucket = BlobStore::new(dir.path(), "http://localhost:3000", true).unwrap();

        let stored = bucket.upload("wide.png", png(2400, 1200)).await.unwrap();
        assert!(stored.key.ends_with("-wide.jpg"));

        let bytes = bucket.read(&stored.key).await.unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (1920, 960));
    }
}

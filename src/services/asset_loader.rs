use std::path::PathBuf;

use crate::error::{AppError, AppResult};
use crate::models::document::{ImageAsset, ImageFormat};

/// Source of the decorative header logo.
#[async_trait::async_trait]
pub trait AssetSource: Send + Sync {
    /// `Ok(None)` means no logo is configured.
    async fn load_logo(&self) -> AppResult<Option<ImageAsset>>;
}

#[derive(Debug, Clone, Default)]
pub struct NoLogo;

#[async_trait::async_trait]
impl AssetSource for NoLogo {
    async fn load_logo(&self) -> AppResult<Option<ImageAsset>> {
        Ok(None)
    }
}

#[derive(Debug, Clone)]
pub struct FileAssetSource {
    path: PathBuf,
}

impl FileAssetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl AssetSource for FileAssetSource {
    async fn load_logo(&self) -> AppResult<Option<ImageAsset>> {
        let display = self.path.display().to_string();
        let format = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageFormat::from_extension)
            .ok_or_else(|| AppError::asset(&display, "unsupported image format"))?;

        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|err| AppError::asset(&display, err.to_string()))?;
        if bytes.is_empty() {
            return Err(AppError::asset(&display, "file is empty"));
        }

        Ok(Some(ImageAsset { format, bytes }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_an_asset_error() {
        let source = FileAssetSource::new("/definitely/not/here/logo.png");
        let error = source.load_logo().await.expect_err("missing file");
        assert!(matches!(error, AppError::Asset { .. }));
    }

    #[tokio::test]
    async fn unsupported_extension_is_rejected_before_reading() {
        let source = FileAssetSource::new("logo.gif");
        let error = source.load_logo().await.expect_err("gif unsupported");
        assert!(error.to_string().contains("unsupported image format"));
    }

    #[tokio::test]
    async fn png_file_loads_with_format() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("logo.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).expect("write logo");

        let asset = FileAssetSource::new(&path)
            .load_logo()
            .await
            .expect("logo loads")
            .expect("logo present");
        assert_eq!(asset.format, ImageFormat::Png);
        assert_eq!(asset.bytes.len(), 4);
    }

    #[tokio::test]
    async fn no_logo_loads_nothing() {
        assert!(NoLogo.load_logo().await.expect("no logo").is_none());
    }
}

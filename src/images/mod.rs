use std::sync::Arc;

use async_trait::async_trait;

pub mod cloudinary;
#[cfg(test)]
pub mod fake;

pub type DynImageHost = Arc<dyn ImageHost>;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image host request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("image host rejected the request: {0}")]
    Rejected(String),
}

/// External service that stores account images and serves them by URL.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Uploads `image` (a data URI or remote URL) and returns its hosted https URL.
    async fn upload(&self, image: &str) -> Result<String, ImageError>;

    async fn destroy(&self, public_id: &str) -> Result<(), ImageError>;
}

/// Derives the host's public id from a hosted URL: the last path segment without extension.
pub fn public_id_from_url(url: &str) -> Option<&str> {
    let file = url.rsplit('/').next()?;
    let id = file.split('.').next()?;
    (!id.is_empty()).then_some(id)
}

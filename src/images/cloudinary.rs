use async_trait::async_trait;
use serde::Deserialize;
use sha1::{Digest, Sha1};

use crate::{
    config::settings::CloudinarySettings,
    images::{ImageError, ImageHost},
};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Clone)]
pub struct Cloudinary {
    client: reqwest::Client,
    settings: CloudinarySettings,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl Cloudinary {
    pub fn new(settings: CloudinarySettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{}", API_BASE, self.settings.cloud_name, action)
    }

    fn timestamp() -> String {
        chrono::Utc::now().timestamp().to_string()
    }
}

/// Signs request parameters: `k1=v1&k2=v2` sorted by key, with the API secret appended, SHA-1 hex.
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl ImageHost for Cloudinary {
    async fn upload(&self, image: &str) -> Result<String, ImageError> {
        let timestamp = Self::timestamp();
        let signature = sign(&[("timestamp", timestamp.as_str())], &self.settings.api_secret);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .form(&[
                ("file", image),
                ("api_key", self.settings.api_key.as_str()),
                ("timestamp", timestamp.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ImageError::Rejected(format!("upload returned {}: {}", status, body)));
        }

        let uploaded: UploadResponse = response.json().await?;
        tracing::debug!("uploaded image to {}", uploaded.secure_url);
        Ok(uploaded.secure_url)
    }

    async fn destroy(&self, public_id: &str) -> Result<(), ImageError> {
        let timestamp = Self::timestamp();
        let signature = sign(
            &[("public_id", public_id), ("timestamp", timestamp.as_str())],
            &self.settings.api_secret,
        );

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&[
                ("public_id", public_id),
                ("api_key", self.settings.api_key.as_str()),
                ("timestamp", timestamp.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ImageError::Rejected(format!("destroy returned {}: {}", status, body)));
        }

        let destroyed: DestroyResponse = response.json().await?;
        // "not found" is fine: the old image is already gone
        if destroyed.result != "ok" {
            tracing::warn!("destroy of {} returned {}", public_id, destroyed.result);
        }
        Ok(())
    }
}

use std::sync::Mutex;

use async_trait::async_trait;

use crate::images::{ImageError, ImageHost};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageCall {
    Upload(String),
    Destroy(String),
}

/// Records every call in order and hands out predictable hosted URLs.
#[derive(Default)]
pub struct RecordingImageHost {
    calls: Mutex<Vec<ImageCall>>,
}

impl RecordingImageHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ImageCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageHost for RecordingImageHost {
    async fn upload(&self, image: &str) -> Result<String, ImageError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(ImageCall::Upload(image.to_string()));
        Ok(format!(
            "https://images.test/demo/image/upload/v1/img{}.png",
            calls.len()
        ))
    }

    async fn destroy(&self, public_id: &str) -> Result<(), ImageError> {
        self.calls
            .lock()
            .unwrap()
            .push(ImageCall::Destroy(public_id.to_string()));
        Ok(())
    }
}

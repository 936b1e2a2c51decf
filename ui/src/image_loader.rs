//! Image fetching for the dashboard grid.

use iced::widget::image::Handle;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Semaphore;

#[derive(Debug, Error)]
pub enum ImageLoaderError {
    #[error("network error: {0}")]
    Request(String),
    #[error("semaphore closed")]
    SemaphoreClosed,
}

/// Downloads card images with a bounded number of parallel requests.
#[derive(Debug, Clone)]
pub struct ImageLoader {
    client: reqwest::Client,
    semaphore: Arc<Semaphore>,
}

impl ImageLoader {
    pub fn new(parallel: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            semaphore: Arc::new(Semaphore::new(parallel.max(1))),
        }
    }

    pub async fn load(&self, image_url: &str) -> Result<Handle, ImageLoaderError> {
        let start = Instant::now();
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ImageLoaderError::SemaphoreClosed)?;

        let response = self
            .client
            .get(image_url)
            .send()
            .await
            .map_err(|e| ImageLoaderError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImageLoaderError::Request(format!(
                "image fetch returned status {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageLoaderError::Request(e.to_string()))?;

        tracing::debug!("image_fetch_ms" = %start.elapsed().as_millis(), "url" = image_url);
        Ok(Handle::from_memory(bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::ImageLoader;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_load_image() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/media/uploads/1.jpg");
            then.status(200).body("img");
        });

        let loader = ImageLoader::new(2);
        let url = server.url("/media/uploads/1.jpg");
        loader.load(&url).await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_load_image_non_2xx_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/media/uploads/2.jpg");
            then.status(404);
        });

        let loader = ImageLoader::new(2);
        let url = server.url("/media/uploads/2.jpg");
        assert!(loader.load(&url).await.is_err());
    }
}

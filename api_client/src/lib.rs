//! REST client for the AI Guardian moderation backend.

use chrono::{DateTime, Utc};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Items per page. Must match the server's paginator configuration exactly,
/// or the client-side page-count derivation is wrong.
pub const PAGE_SIZE: u64 = 3;

const UPLOAD_FALLBACK: &str = "Could not parse server error.";
const DELETE_FALLBACK: &str = "Failed to delete image.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    Safe,
    Unsafe,
    /// Catch-all for statuses this client predates (the server also knows
    /// `pending`).
    #[serde(other)]
    Pending,
}

/// Server-owned image record; the client only ever displays copies.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImageRecord {
    pub id: i64,
    #[serde(rename = "image")]
    pub image_url: String,
    pub moderation_status: ModerationStatus,
    pub confidence: Option<f64>,
    pub uploaded_at: DateTime<Utc>,
    pub user_id: String,
}

/// One page of the paginated image listing.
#[derive(Debug, Deserialize, Clone)]
pub struct ImagePage {
    pub results: Vec<ImageRecord>,
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
}

/// Result of submitting an image for moderation.
#[derive(Debug, Deserialize, Clone)]
pub struct ModerationOutcome {
    pub status: String,
    pub confidence: f64,
}

#[derive(Debug, Deserialize)]
struct DeleteErrorBody {
    detail: String,
}

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("request error: {0}")]
    Request(String),
    /// Server-side failure; the message is suitable for user display.
    #[error("{0}")]
    Server(String),
}

pub struct ApiClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl ApiClient {
    pub fn new(token: String) -> Self {
        ApiClient {
            client: reqwest::Client::new(),
            token,
            base_url: "http://127.0.0.1:8000".to_string(),
        }
    }

    /// Create a client with a custom backend base URL.
    pub fn with_base_url(token: String, base_url: String) -> Self {
        ApiClient {
            client: reqwest::Client::new(),
            token,
            base_url,
        }
    }

    /// Canonical first-page endpoint of the image listing.
    pub fn first_page_url(&self) -> String {
        format!("{}/api/images/", self.base_url)
    }

    /// Fetch one page of the listing. `url` is either the first-page endpoint
    /// or a page reference handed back by the server in `next`/`previous`.
    pub async fn list_images(&self, url: &str) -> Result<ImagePage, ApiClientError> {
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| ApiClientError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiClientError::Server(error_text));
        }

        response
            .json::<ImagePage>()
            .await
            .map_err(|e| ApiClientError::Request(e.to_string()))
    }

    /// Submit an image for moderation as a single multipart body.
    pub async fn moderate_image(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ModerationOutcome, ApiClientError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self
            .client
            .post(format!("{}/api/moderate/", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiClientError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            // A JSON body without an `error` key reports the status instead;
            // an unparseable body gets the generic message.
            let message = match response.json::<serde_json::Value>().await {
                Ok(body) => body
                    .get("error")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        format!("Upload failed with status: {}", status.as_u16())
                    }),
                Err(_) => UPLOAD_FALLBACK.to_string(),
            };
            return Err(ApiClientError::Server(message));
        }

        response
            .json::<ModerationOutcome>()
            .await
            .map_err(|e| ApiClientError::Request(e.to_string()))
    }

    /// Delete one image. Both 200 and 204 count as success.
    pub async fn delete_image(&self, id: i64) -> Result<(), ApiClientError> {
        let response = self
            .client
            .delete(format!("{}/api/images/{}/", self.base_url, id))
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| ApiClientError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let message = match response.json::<DeleteErrorBody>().await {
                Ok(body) => body.detail,
                Err(_) => DELETE_FALLBACK.to_string(),
            };
            return Err(ApiClientError::Server(message));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url() {
        let client = ApiClient::new("tok".into());
        assert_eq!(
            client.first_page_url(),
            "http://127.0.0.1:8000/api/images/"
        );
    }

    #[test]
    fn test_parse_image_page() {
        let json = r#"{
            "count": 7,
            "next": "http://localhost:8000/api/images/?page=3",
            "previous": "http://localhost:8000/api/images/",
            "results": [
                {
                    "id": 4,
                    "image": "http://localhost:8000/media/uploads/cat.jpg",
                    "moderation_status": "safe",
                    "confidence": 0.93,
                    "uploaded_at": "2024-05-01T12:00:00Z",
                    "user_id": "uid-1"
                }
            ]
        }"#;

        let page: ImagePage = serde_json::from_str(json).unwrap();
        assert_eq!(page.count, 7);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].id, 4);
        assert_eq!(page.results[0].moderation_status, ModerationStatus::Safe);
        assert_eq!(page.results[0].confidence, Some(0.93));
        assert_eq!(
            page.next.as_deref(),
            Some("http://localhost:8000/api/images/?page=3")
        );
    }

    #[test]
    fn test_unknown_status_falls_back_to_pending() {
        let json = r#"{
            "id": 1,
            "image": "http://localhost:8000/media/uploads/x.jpg",
            "moderation_status": "quarantined",
            "confidence": null,
            "uploaded_at": "2024-05-01T12:00:00Z",
            "user_id": "uid-1"
        }"#;

        let record: ImageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.moderation_status, ModerationStatus::Pending);
        assert_eq!(record.confidence, None);
    }
}

//! Card view models for the image grid.
//!
//! Rendering is a pure function of the record sequence: every page load
//! rebuilds the card list from scratch, so the grid can never retain stale
//! elements.

use api_client::{ImageRecord, ModerationStatus};

pub const LOADING_PLACEHOLDER: &str = "Loading images...";
pub const EMPTY_PLACEHOLDER: &str = "No images uploaded yet.";
pub const ERROR_PLACEHOLDER: &str = "Could not load images. Please try again later.";

#[derive(Debug, Clone, PartialEq)]
pub struct ImageCard {
    pub id: i64,
    pub image_url: String,
    pub status_label: String,
    pub flagged: bool,
}

pub fn build_cards(records: &[ImageRecord]) -> Vec<ImageCard> {
    records
        .iter()
        .map(|record| {
            let percent = (record.confidence.unwrap_or(0.0) * 100.0).round() as i64;
            let (status_label, flagged) = match record.moderation_status {
                ModerationStatus::Safe => (format!("✅ Approved ({}%)", percent), false),
                _ => (format!("⚠️ Flagged as Unsafe ({}%)", percent), true),
            };
            ImageCard {
                id: record.id,
                image_url: record.image_url.clone(),
                status_label,
                flagged,
            }
        })
        .collect()
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::DEFAULT_VISIBILITY_THRESHOLD;
use crate::video::VideoPageSet;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid flipbook config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("visibility threshold {0} must be within [0, 1)")]
    Threshold(f64),
    #[error("video page numbers start at 1")]
    ZeroVideoPage,
}

/// Page-level settings. Every field has a default so a page without any
/// config block still works.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlipbookConfig {
    pub container_id: String,
    pub leaf_selector: String,
    pub page_selector: String,
    pub video_id: String,
    /// 1-based page numbers. Empty means "whichever pages hold the video".
    pub video_pages: Vec<usize>,
    pub visibility_threshold: f64,
    pub start_page: usize,
}

impl Default for FlipbookConfig {
    fn default() -> Self {
        FlipbookConfig {
            container_id: "flipbook".to_string(),
            leaf_selector: ".leaf".to_string(),
            page_selector: ".page".to_string(),
            video_id: "birthday-video".to_string(),
            video_pages: Vec::new(),
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
            start_page: 0,
        }
    }
}

impl FlipbookConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: FlipbookConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // a ratio can never exceed 1, so anything at or above it would never play
        if !(0.0..1.0).contains(&self.visibility_threshold) {
            return Err(ConfigError::Threshold(self.visibility_threshold));
        }
        if self.video_pages.contains(&0) {
            return Err(ConfigError::ZeroVideoPage);
        }
        Ok(())
    }

    /// Configured video pages as 0-based ordinals, if any were given.
    pub fn video_page_set(&self) -> Option<VideoPageSet> {
        if self.video_pages.is_empty() {
            return None;
        }
        Some(VideoPageSet::new(
            self.video_pages.iter().map(|p| p.saturating_sub(1)),
        ))
    }

    /// Override the start page from a raw `?page=` value. Unparseable values
    /// are ignored.
    pub fn apply_page_param(&mut self, value: &str) {
        if let Ok(page) = value.trim().parse::<usize>() {
            self.start_page = page;
        }
    }
}

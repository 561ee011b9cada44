//! Recommended video type

use serde::{Deserialize, Serialize};

/// An educational video recommendation from the video search backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub channel: String,
    pub description: String,
    pub thumbnail: String,
    pub url: String,
}

//! Educational video search via the YouTube Data API

use serde::Deserialize;
use std::env;
use std::time::Duration;
use tracing::warn;
use url::Url;

use tutor_core::{Error, Result, Video};

const DEFAULT_API_URL: &str = "https://www.googleapis.com/youtube/v3";
const MAX_RESULTS: usize = 5;

/// Searches YouTube for educational videos related to a question.
///
/// Search failures are logged and yield an empty list; video
/// recommendations are a best-effort supplement to the answer.
pub struct YouTubeSearcher {
    api_key: String,
    api_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: ItemId,
    snippet: Snippet,
}

#[derive(Deserialize)]
struct ItemId {
    #[serde(rename = "videoId")]
    video_id: String,
}

#[derive(Deserialize)]
struct Snippet {
    title: String,
    #[serde(rename = "channelTitle")]
    channel_title: String,
    #[serde(default)]
    description: String,
    thumbnails: Thumbnails,
}

#[derive(Deserialize)]
struct Thumbnails {
    default: Thumbnail,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

impl YouTubeSearcher {
    /// Create a searcher reading `YOUTUBE_API_KEY` from the environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let api_key = env::var("YOUTUBE_API_KEY").map_err(|_| {
            Error::Configuration("YOUTUBE_API_KEY environment variable not found".to_string())
        })?;
        Ok(Self::new(api_key))
    }

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Override the API base URL (used by tests to point at a mock server)
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Search for medium-length, high-definition educational videos.
    /// Returns an empty list if the search fails.
    pub async fn search_educational_videos(&self, query: &str) -> Vec<Video> {
        match self.search(query).await {
            Ok(videos) => videos,
            Err(e) => {
                warn!("video search failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<Video>> {
        let mut url = Url::parse(&format!("{}/search", self.api_url))
            .map_err(|e| Error::VideoSearch(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("q", &format!("{} tutorial education", query))
            .append_pair("part", "snippet")
            .append_pair("type", "video")
            .append_pair("maxResults", &MAX_RESULTS.to_string())
            .append_pair("relevanceLanguage", "en")
            .append_pair("videoDuration", "medium")
            .append_pair("videoDefinition", "high")
            .append_pair("order", "relevance")
            .append_pair("key", &self.api_key);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::VideoSearch(format!(
                "YouTube API request failed with status {}",
                response.status()
            )));
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        Ok(search
            .items
            .into_iter()
            .map(|item| {
                let url = format!("https://www.youtube.com/watch?v={}", item.id.video_id);
                Video {
                    id: item.id.video_id,
                    title: item.snippet.title,
                    channel: item.snippet.channel_title,
                    description: item.snippet.description,
                    thumbnail: item.snippet.thumbnails.default.url,
                    url,
                }
            })
            .collect())
    }
}

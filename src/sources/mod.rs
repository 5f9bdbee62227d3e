use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

pub mod markup;
pub mod transcript_api;
pub mod video_metadata;

use crate::config::HttpConfig;
use crate::extractors::VideoId;
use crate::TranscriptError;

/// Code prefix marking an automatically generated caption track
pub const GENERATED_PREFIX: &str = "a.";

/// Individual caption segment with timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Segment text, markup removed
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

/// Transcript text as delivered by a single source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceTranscript {
    pub text: String,

    /// Language code of the track that was used, if known
    pub language: Option<String>,

    /// Timed segments (empty when the source only yields flat text)
    pub segments: Vec<TranscriptSegment>,
}

impl SourceTranscript {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
            segments: Vec::new(),
        }
    }

    /// Join segment texts with single spaces, keeping service order
    pub fn from_segments(segments: Vec<TranscriptSegment>, language: Option<String>) -> Self {
        let text = segments
            .iter()
            .map(|segment| segment.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            text,
            language,
            segments,
        }
    }
}

/// One available caption stream of a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    /// Language code, prefixed with `a.` for generated tracks
    pub code: String,

    /// Human-readable track name
    pub name: String,

    /// Location of the caption payload
    pub base_url: String,
}

impl CaptionTrack {
    /// Language code without the generated-track marker
    pub fn language(&self) -> &str {
        self.code.strip_prefix(GENERATED_PREFIX).unwrap_or(&self.code)
    }

    pub fn is_generated(&self) -> bool {
        self.code.starts_with(GENERATED_PREFIX)
    }
}

/// Source looking a transcript up by identifier and preferred languages
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript, preferring the given languages in order
    async fn fetch(
        &self,
        video_id: &VideoId,
        languages: &[String],
    ) -> Result<SourceTranscript, TranscriptError>;

    /// Name used in logs
    fn name(&self) -> &'static str;
}

/// Source tried after the primary one failed; works from the raw URL
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FallbackSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<SourceTranscript, TranscriptError>;

    /// Name used in logs
    fn name(&self) -> &'static str;
}

/// Caption track entry as it appears in the player response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCaptionTrack {
    base_url: String,
    language_code: String,
    kind: Option<String>,
    name: Option<TrackName>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackName {
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<TextRun>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}

/// `playerCaptionsTracklistRenderer` object
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TracklistRenderer {
    #[serde(default)]
    pub caption_tracks: Vec<RawCaptionTrack>,
}

impl CaptionTrack {
    pub(crate) fn from_raw(raw: RawCaptionTrack) -> Self {
        let code = if raw.kind.as_deref() == Some("asr") {
            format!("{}{}", GENERATED_PREFIX, raw.language_code)
        } else {
            raw.language_code
        };

        let name = raw
            .name
            .map(|name| {
                name.simple_text.unwrap_or_else(|| {
                    name.runs.into_iter().map(|run| run.text).collect::<String>()
                })
            })
            .unwrap_or_else(|| code.clone());

        Self {
            code,
            name,
            base_url: raw.base_url,
        }
    }
}

/// Convert decoded tracklist entries into caption tracks
pub(crate) fn caption_tracks(renderer: TracklistRenderer) -> Vec<CaptionTrack> {
    renderer.caption_tracks.into_iter().map(CaptionTrack::from_raw).collect()
}

/// Build the payload URL for a track, replacing any `fmt` parameter.
/// `None` requests the service's default timed-text format.
pub fn caption_url(base_url: &str, format: Option<&str>) -> Result<String, TranscriptError> {
    let mut url = Url::parse(base_url)?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "fmt")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        if let Some(format) = format {
            pairs.append_pair("fmt", format);
        }
    }

    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url.to_string())
}

/// Build the HTTP client shared by both sources
pub fn http_client(config: &HttpConfig) -> anyhow::Result<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        reqwest::header::HeaderValue::from_str(&config.accept_language)?,
    );

    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .build()?;

    Ok(client)
}

/// HTTP access used by the sources
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// GET a page or caption payload as text
    async fn get_text(&self, url: &str) -> Result<String, TranscriptError>;

    /// POST a JSON body, returning the response body as text
    async fn post_json(&self, url: &str, body: serde_json::Value) -> Result<String, TranscriptError>;
}

#[async_trait]
impl HttpFetcher for reqwest::Client {
    async fn get_text(&self, url: &str) -> Result<String, TranscriptError> {
        tracing::debug!("GET {}", url);

        let response = self.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    async fn post_json(&self, url: &str, body: serde_json::Value) -> Result<String, TranscriptError> {
        tracing::debug!("POST {}", url);

        let response = self.post(url).json(&body).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

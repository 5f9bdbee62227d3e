use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::extractors::{extract_video_id, VideoId};
use crate::sources::transcript_api::TranscriptApiSource;
use crate::sources::video_metadata::VideoMetadataSource;
use crate::sources::{self, FallbackSource, SourceTranscript, TranscriptSegment, TranscriptSource};
use crate::TranscriptError;

/// Outcome of one retrieval: the transcript, or the categorized failure
pub type TranscriptResult = std::result::Result<Transcript, TranscriptError>;

/// Callback receiving advisory notices meant for the user
pub type NoticeHook = Box<dyn Fn(&str) + Send + Sync>;

/// Which strategy produced the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptOrigin {
    Primary,
    Fallback,
}

/// Transcript retrieved for a video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: VideoId,

    /// Full transcript text
    pub text: String,

    /// Language of the caption track used, if known
    pub language: Option<String>,

    /// Timed segments (only the primary source provides them)
    pub segments: Vec<TranscriptSegment>,

    pub origin: TranscriptOrigin,

    /// Timestamp when retrieval completed
    pub fetched_at: chrono::DateTime<chrono::Utc>,
}

impl Transcript {
    fn new(video_id: VideoId, source: SourceTranscript, origin: TranscriptOrigin) -> Self {
        Self {
            video_id,
            text: source.text,
            language: source.language,
            segments: source.segments,
            origin,
            fetched_at: chrono::Utc::now(),
        }
    }
}

/// Display text and identifier for the presentation layer.
/// Failures yield their user message and no identifier.
pub fn display_parts(result: &TranscriptResult) -> (String, Option<VideoId>) {
    match result {
        Ok(transcript) => (transcript.text.clone(), Some(transcript.video_id.clone())),
        Err(err) => (err.to_string(), None),
    }
}

/// Main retrieval pipeline: primary lookup, then the caption-track fallback
pub struct TranscriptPipeline {
    primary: Box<dyn TranscriptSource>,
    fallback: Option<Box<dyn FallbackSource>>,
    languages: Vec<String>,
    notice: Option<NoticeHook>,
}

impl TranscriptPipeline {
    /// Create a pipeline backed by the YouTube sources
    pub fn new(config: &Config) -> Result<Self> {
        let client = sources::http_client(&config.http)?;

        let primary = Box::new(TranscriptApiSource::new(client.clone(), config.throttle()));
        let fallback = config.retrieval.enable_fallback.then(|| {
            Box::new(VideoMetadataSource::new(
                client,
                config.retrieval.fallback_languages.clone(),
            )) as Box<dyn FallbackSource>
        });

        Ok(Self::with_sources(
            primary,
            fallback,
            config.retrieval.preferred_languages.clone(),
        ))
    }

    /// Create a pipeline from explicit sources. Without a fallback, a primary
    /// failure is final.
    pub fn with_sources(
        primary: Box<dyn TranscriptSource>,
        fallback: Option<Box<dyn FallbackSource>>,
        languages: Vec<String>,
    ) -> Self {
        Self {
            primary,
            fallback,
            languages,
            notice: None,
        }
    }

    /// Register a callback for advisory notices (e.g. switching to the fallback)
    pub fn on_notice(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.notice = Some(Box::new(hook));
        self
    }

    /// Fetch the transcript for a URL
    pub async fn fetch(&self, url: &str) -> TranscriptResult {
        let Some(video_id) = extract_video_id(url) else {
            tracing::info!("No video id in input: {:?}", url);
            return Err(TranscriptError::InvalidUrl);
        };

        tracing::info!("Fetching transcript for {} via {}", video_id, self.primary.name());
        let primary_err = match self.primary.fetch(&video_id, &self.languages).await {
            Ok(source) => return Ok(Transcript::new(video_id, source, TranscriptOrigin::Primary)),
            Err(err) => err,
        };

        let Some(fallback) = &self.fallback else {
            return Err(primary_err);
        };

        tracing::warn!(
            "Primary source failed for {} ({}), trying {}",
            video_id,
            primary_err.category(),
            fallback.name()
        );
        self.notify("Primary transcript lookup failed, trying the caption tracks instead...");

        match fallback.fetch(url).await {
            Ok(source) => Ok(Transcript::new(video_id, source, TranscriptOrigin::Fallback)),
            Err(fallback_err) => {
                tracing::warn!("Fallback source failed for {}: {}", video_id, fallback_err);
                Err(primary_err)
            }
        }
    }

    fn notify(&self, message: &str) {
        if let Some(hook) = &self.notice {
            hook(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{MockFallbackSource, MockHttpFetcher, MockTranscriptSource};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    fn primary_failing(err: TranscriptError) -> MockTranscriptSource {
        let mut primary = MockTranscriptSource::new();
        primary.expect_name().return_const("primary");
        primary
            .expect_fetch()
            .times(1)
            .returning(move |_, _| Err(err.clone()));
        primary
    }

    fn fallback_returning(
        result: std::result::Result<SourceTranscript, TranscriptError>,
    ) -> MockFallbackSource {
        let mut fallback = MockFallbackSource::new();
        fallback.expect_name().return_const("fallback");
        fallback
            .expect_fetch()
            .times(1)
            .returning(move |_| result.clone());
        fallback
    }

    fn languages() -> Vec<String> {
        vec!["en".to_string(), "tr".to_string()]
    }

    #[tokio::test]
    async fn test_primary_success() {
        let mut primary = MockTranscriptSource::new();
        primary.expect_name().return_const("primary");
        primary
            .expect_fetch()
            .withf(|id, langs| id.as_str() == "dQw4w9WgXcQ" && langs.len() == 2 && langs[0] == "en")
            .times(1)
            .returning(|_, _| Ok(SourceTranscript::from_text("never gonna give you up")));

        let mut fallback = MockFallbackSource::new();
        fallback.expect_fetch().never();

        let pipeline =
            TranscriptPipeline::with_sources(Box::new(primary), Some(Box::new(fallback)), languages());
        let transcript = pipeline.fetch(URL).await.unwrap();

        assert_eq!(transcript.text, "never gonna give you up");
        assert_eq!(transcript.video_id.as_str(), "dQw4w9WgXcQ");
        assert_eq!(transcript.origin, TranscriptOrigin::Primary);
    }

    #[tokio::test]
    async fn test_invalid_url_touches_no_source() {
        let mut primary = MockTranscriptSource::new();
        primary.expect_fetch().never();
        let mut fallback = MockFallbackSource::new();
        fallback.expect_fetch().never();

        let pipeline =
            TranscriptPipeline::with_sources(Box::new(primary), Some(Box::new(fallback)), languages());

        let result = pipeline.fetch("").await;
        assert_eq!(result.unwrap_err(), TranscriptError::InvalidUrl);
    }

    #[tokio::test]
    async fn test_fallback_success_overrides_primary_failure() {
        let primary = primary_failing(TranscriptError::CaptionsDisabled);
        let fallback = fallback_returning(Ok(SourceTranscript::from_text("hello world")));

        let pipeline =
            TranscriptPipeline::with_sources(Box::new(primary), Some(Box::new(fallback)), languages());
        let result = pipeline.fetch(URL).await;

        let (text, video_id) = display_parts(&result);
        assert_eq!(text, "hello world");
        assert_eq!(video_id.unwrap().as_str(), "dQw4w9WgXcQ");
        assert_eq!(result.unwrap().origin, TranscriptOrigin::Fallback);
    }

    #[tokio::test]
    async fn test_primary_category_survives_fallback_failure() {
        let primary = primary_failing(TranscriptError::CaptionsDisabled);
        let fallback = fallback_returning(Err(TranscriptError::Unexpected(
            "player endpoint exploded".to_string(),
        )));

        let pipeline =
            TranscriptPipeline::with_sources(Box::new(primary), Some(Box::new(fallback)), languages());
        let result = pipeline.fetch(URL).await;

        let (text, video_id) = display_parts(&result);
        assert_eq!(text, TranscriptError::CaptionsDisabled.to_string());
        assert!(!text.contains("exploded"));
        assert!(video_id.is_none());
    }

    #[tokio::test]
    async fn test_unknown_primary_failure_keeps_raw_text() {
        let primary = primary_failing(TranscriptError::Unexpected("dns failure".to_string()));
        let fallback = fallback_returning(Err(TranscriptError::NoCaptionsFound));

        let pipeline =
            TranscriptPipeline::with_sources(Box::new(primary), Some(Box::new(fallback)), languages());
        let (text, _) = display_parts(&pipeline.fetch(URL).await);

        assert!(crate::is_error_text(&text));
        assert!(text.contains("dns failure"));
    }

    #[tokio::test]
    async fn test_without_fallback_primary_failure_is_final() {
        let primary = primary_failing(TranscriptError::RateLimited);
        let pipeline = TranscriptPipeline::with_sources(Box::new(primary), None, languages());

        assert_eq!(
            pipeline.fetch(URL).await.unwrap_err(),
            TranscriptError::RateLimited
        );
    }

    #[tokio::test]
    async fn test_fallback_receives_original_url_and_notice_is_emitted() {
        let short_url = "https://youtu.be/dQw4w9WgXcQ?t=42";
        let primary = primary_failing(TranscriptError::NoTranscriptFound);

        let mut fallback = MockFallbackSource::new();
        fallback.expect_name().return_const("fallback");
        fallback
            .expect_fetch()
            .withf(|url| url.ends_with("youtu.be/dQw4w9WgXcQ?t=42"))
            .times(1)
            .returning(|_| Ok(SourceTranscript::from_text("merhaba")));

        let notices = Arc::new(Mutex::new(Vec::new()));
        let sink = notices.clone();
        let pipeline =
            TranscriptPipeline::with_sources(Box::new(primary), Some(Box::new(fallback)), languages())
                .on_notice(move |message| sink.lock().unwrap().push(message.to_string()));

        let transcript = pipeline.fetch(short_url).await.unwrap();
        assert_eq!(transcript.text, "merhaba");
        assert_eq!(notices.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_pipeline_from_default_config() {
        assert!(TranscriptPipeline::new(&Config::default()).is_ok());
    }

    const WATCH_PAGE: &str = r#"{"playabilityStatus":{"status":"OK"},"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&lang=de","languageCode":"de"}]}},"videoDetails":{}}"#;
    const PLAYER: &str = r#"{"playabilityStatus":{"status":"OK"},"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&lang=tr","languageCode":"tr"}]}}}"#;

    fn watch_page_with_empty_captions() -> TranscriptApiSource {
        let mut http = MockHttpFetcher::new();
        http.expect_get_text()
            .withf(|url| url.contains("/watch?v="))
            .times(2)
            .returning(|_| Ok(WATCH_PAGE.to_string()));
        http.expect_get_text()
            .withf(|url| url.contains("/api/timedtext"))
            .times(2)
            .returning(|_| Ok("<transcript></transcript>".to_string()));
        TranscriptApiSource::new(http, Duration::ZERO)
    }

    fn player_serving(payload: &'static str) -> VideoMetadataSource {
        let mut http = MockHttpFetcher::new();
        http.expect_post_json()
            .times(1)
            .returning(|_, _| Ok(PLAYER.to_string()));
        http.expect_get_text()
            .withf(|url| url.contains("fmt=srv3"))
            .times(1)
            .returning(move |_| Ok(payload.to_string()));
        VideoMetadataSource::new(http, vec!["tr".to_string(), "en".to_string()])
    }

    #[tokio::test]
    async fn test_empty_primary_payload_moves_on_to_fallback() {
        let pipeline = TranscriptPipeline::with_sources(
            Box::new(watch_page_with_empty_captions()),
            Some(Box::new(player_serving("<p>Hi</p>\n<p>there</p>"))),
            vec!["de".to_string()],
        );

        let transcript = pipeline.fetch(URL).await.unwrap();
        assert_eq!(transcript.text, "Hi there");
        assert_eq!(transcript.origin, TranscriptOrigin::Fallback);
        assert_eq!(transcript.language.as_deref(), Some("tr"));
    }

    #[tokio::test]
    async fn test_empty_fallback_payload_reports_primary_failure() {
        let pipeline = TranscriptPipeline::with_sources(
            Box::new(primary_failing(TranscriptError::CaptionsDisabled)),
            Some(Box::new(player_serving(""))),
            languages(),
        );

        let result = pipeline.fetch(URL).await;
        assert_eq!(result.unwrap_err(), TranscriptError::CaptionsDisabled);
    }
}

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

use super::{
    caption_tracks, caption_url, markup, CaptionTrack, HttpFetcher, SourceTranscript,
    TracklistRenderer, TranscriptSource,
};
use crate::extractors::VideoId;
use crate::TranscriptError;

const CAPTIONS_MARKER: &str = "\"captions\":";
const VIDEO_DETAILS_MARKER: &str = ",\"videoDetails";
const RECAPTCHA_MARKER: &str = "class=\"g-recaptcha\"";
const PLAYABILITY_MARKER: &str = "\"playabilityStatus\":";

/// Primary source: reads the caption list embedded in the watch page
pub struct TranscriptApiSource {
    http: Box<dyn HttpFetcher>,
    throttle: Duration,
}

impl TranscriptApiSource {
    pub fn new(http: impl HttpFetcher + 'static, throttle: Duration) -> Self {
        Self {
            http: Box::new(http),
            throttle,
        }
    }

    /// One lookup, restricted to `languages` when given
    async fn lookup(
        &self,
        video_id: &VideoId,
        languages: Option<&[String]>,
    ) -> Result<SourceTranscript, TranscriptError> {
        // Fixed pause before every request to stay under YouTube's rate limits
        sleep(self.throttle).await;

        tracing::debug!("Loading watch page for {}", video_id);
        let html = self.http.get_text(&video_id.watch_url()).await?;

        let tracks = extract_caption_tracks(&html)?;
        let track = match languages {
            Some(languages) => find_track(&tracks, languages)
                .ok_or(TranscriptError::NoTranscriptFound)?,
            None => first_track(&tracks).ok_or(TranscriptError::CaptionsDisabled)?,
        };

        tracing::info!(
            "Using caption track '{}' ({}) for {}",
            track.name,
            track.code,
            video_id
        );

        let payload = self.http.get_text(&caption_url(&track.base_url, None)?).await?;
        let segments = markup::parse_timedtext(&payload);
        if segments.is_empty() {
            return Err(TranscriptError::Unexpected("empty caption payload".to_string()));
        }

        Ok(SourceTranscript::from_segments(
            segments,
            Some(track.language().to_string()),
        ))
    }
}

#[async_trait]
impl TranscriptSource for TranscriptApiSource {
    async fn fetch(
        &self,
        video_id: &VideoId,
        languages: &[String],
    ) -> Result<SourceTranscript, TranscriptError> {
        match self.lookup(video_id, Some(languages)).await {
            Ok(transcript) => Ok(transcript),
            Err(err) => {
                tracing::warn!(
                    "No transcript in {:?} for {} ({}), retrying with any language",
                    languages,
                    video_id,
                    err.category()
                );
                self.lookup(video_id, None).await
            }
        }
    }

    fn name(&self) -> &'static str {
        "transcript-api"
    }
}

/// Locate the caption tracklist inside a watch page and classify why it is missing
pub fn extract_caption_tracks(html: &str) -> Result<Vec<CaptionTrack>, TranscriptError> {
    let Some((_, after)) = html.split_once(CAPTIONS_MARKER) else {
        if html.contains(RECAPTCHA_MARKER) {
            return Err(TranscriptError::RateLimited);
        }
        if !html.contains(PLAYABILITY_MARKER) {
            return Err(TranscriptError::VideoUnavailable);
        }
        return Err(TranscriptError::CaptionsDisabled);
    };

    let blob = after
        .split(VIDEO_DETAILS_MARKER)
        .next()
        .unwrap_or_default()
        .replace('\n', "");

    let captions: serde_json::Value = serde_json::from_str(&blob)?;
    let renderer = match captions.get("playerCaptionsTracklistRenderer") {
        Some(value) if !value.is_null() => value.clone(),
        _ => return Err(TranscriptError::CaptionsDisabled),
    };

    let renderer: TracklistRenderer = serde_json::from_value(renderer)?;
    let tracks = caption_tracks(renderer);
    if tracks.is_empty() {
        return Err(TranscriptError::CaptionsDisabled);
    }

    Ok(tracks)
}

/// First track matching the languages in order; manual tracks beat generated ones
pub fn find_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|language| {
        let mut matching = tracks.iter().filter(|track| track.language() == language);
        let first = matching.clone().next();
        matching.find(|track| !track.is_generated()).or(first)
    })
}

/// Unrestricted pick: first manual track, else whatever comes first
fn first_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    tracks
        .iter()
        .find(|track| !track.is_generated())
        .or_else(|| tracks.first())
}

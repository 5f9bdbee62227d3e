use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{
    caption_tracks, caption_url, markup, CaptionTrack, FallbackSource, HttpFetcher,
    SourceTranscript, TracklistRenderer,
};
use crate::extractors::extract_video_id;
use crate::TranscriptError;

const PLAYER_ENDPOINT: &str = "https://www.youtube.com/youtubei/v1/player?prettyPrint=false";
const CLIENT_NAME: &str = "ANDROID";
const CLIENT_VERSION: &str = "19.09.37";
const ANDROID_SDK_VERSION: u32 = 30;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

/// Fallback source: caption tracks from the player metadata endpoint
pub struct VideoMetadataSource {
    http: Box<dyn HttpFetcher>,
    languages: Vec<String>,
}

impl VideoMetadataSource {
    pub fn new(http: impl HttpFetcher + 'static, languages: Vec<String>) -> Self {
        Self {
            http: Box::new(http),
            languages,
        }
    }

    async fn load_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, TranscriptError> {
        tracing::debug!("Loading player metadata for {}", video_id);

        let body = json!({
            "context": {
                "client": {
                    "clientName": CLIENT_NAME,
                    "clientVersion": CLIENT_VERSION,
                    "androidSdkVersion": ANDROID_SDK_VERSION,
                    "hl": "en",
                }
            },
            "videoId": video_id,
        });

        let response = self.http.post_json(PLAYER_ENDPOINT, body).await?;
        let response: PlayerResponse = serde_json::from_str(&response)?;

        tracks_from_player(response)
    }

    async fn fetch_transcript(&self, url: &str) -> Result<SourceTranscript, TranscriptError> {
        let video_id = extract_video_id(url)
            .ok_or_else(|| TranscriptError::Unexpected(format!("no video id in {}", url)))?;

        let tracks = self.load_tracks(video_id.as_str()).await?;
        let track = select_track(&tracks, &self.languages).ok_or(TranscriptError::NoCaptionsFound)?;

        tracing::info!(
            "Fallback using caption track '{}' ({}) for {}",
            track.name,
            track.code,
            video_id
        );

        let payload = self.http.get_text(&caption_url(&track.base_url, Some("srv3"))?).await?;
        let text = markup::payload_to_text(&payload);
        if text.is_empty() {
            return Err(TranscriptError::Unexpected("empty caption payload".to_string()));
        }

        Ok(SourceTranscript {
            text,
            language: Some(track.language().to_string()),
            segments: Vec::new(),
        })
    }
}

#[async_trait]
impl FallbackSource for VideoMetadataSource {
    async fn fetch(&self, url: &str) -> Result<SourceTranscript, TranscriptError> {
        self.fetch_transcript(url).await.map_err(generic_failure)
    }

    fn name(&self) -> &'static str {
        "video-metadata"
    }
}

/// This source only distinguishes "no captions"; everything else is a generic failure
fn generic_failure(err: TranscriptError) -> TranscriptError {
    match err {
        TranscriptError::NoCaptionsFound | TranscriptError::Unexpected(_) => err,
        TranscriptError::RateLimited => {
            TranscriptError::Unexpected("HTTP status client error (429 Too Many Requests)".to_string())
        }
        other => TranscriptError::Unexpected(other.category().to_string()),
    }
}

fn tracks_from_player(response: PlayerResponse) -> Result<Vec<CaptionTrack>, TranscriptError> {
    if let Some(status) = response.playability_status {
        if status.status != "OK" {
            return Err(TranscriptError::Unexpected(format!(
                "video is not playable: {}",
                status.reason.unwrap_or(status.status)
            )));
        }
    }

    Ok(response
        .captions
        .and_then(|captions| captions.player_captions_tracklist_renderer)
        .map(caption_tracks)
        .unwrap_or_default())
}

/// Pick a track: the first matching each preferred language in turn, else the first one.
/// The generated-track marker is ignored when comparing codes.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], preferred: &[String]) -> Option<&'a CaptionTrack> {
    preferred
        .iter()
        .find_map(|language| tracks.iter().find(|track| track.language() == language))
        .or_else(|| tracks.first())
}

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier patterns, tried in order. The first capture wins.
static ID_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        // watch?v=ID, /embed/ID, /shorts/ID, ...
        Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})").expect("valid id pattern"),
        Regex::new(r"youtu\.be/([0-9A-Za-z_-]{11})").expect("valid short-link pattern"),
    ]
});

/// An 11-character YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch page for this video
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }

    /// Short share link, suitable for embedding a preview
    pub fn short_url(&self) -> String {
        format!("https://youtu.be/{}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extract the video identifier from a YouTube URL.
///
/// Never fails: anything without an 11-character token after `v=`, a path
/// separator or `youtu.be/` yields `None`.
pub fn extract_video_id(url: &str) -> Option<VideoId> {
    ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| VideoId(m.as_str().to_string()))
}

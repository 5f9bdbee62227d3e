use anyhow::Result;

use crate::retrieval::Transcript;

/// `[mm:ss]` or `[h:mm:ss]` label for a segment start
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("[{}:{:02}:{:02}]", hours, minutes, secs)
    } else {
        format!("[{:02}:{:02}]", minutes, secs)
    }
}

/// Plain text. With timestamps, one line per segment; transcripts without
/// segments are always printed as flat text.
pub fn format_as_text(transcript: &Transcript, include_timestamps: bool) -> String {
    if !include_timestamps || transcript.segments.is_empty() {
        return transcript.text.clone();
    }

    transcript
        .segments
        .iter()
        .map(|segment| format!("{} {}", format_timestamp(segment.start), segment.text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_as_json(transcript: &Transcript) -> Result<String> {
    Ok(serde_json::to_string_pretty(transcript)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::extract_video_id;
    use crate::retrieval::TranscriptOrigin;
    use crate::sources::TranscriptSegment;

    fn transcript(segments: Vec<TranscriptSegment>) -> Transcript {
        Transcript {
            video_id: extract_video_id("https://youtu.be/dQw4w9WgXcQ").unwrap(),
            text: "hello world".to_string(),
            language: Some("en".to_string()),
            segments,
            origin: TranscriptOrigin::Primary,
            fetched_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "[00:00]");
        assert_eq!(format_timestamp(75.9), "[01:15]");
        assert_eq!(format_timestamp(3725.0), "[1:02:05]");
    }

    #[test]
    fn test_text_with_timestamps() {
        let t = transcript(vec![
            TranscriptSegment { text: "hello".into(), start: 0.0, duration: 1.0 },
            TranscriptSegment { text: "world".into(), start: 61.0, duration: 1.0 },
        ]);
        assert_eq!(format_as_text(&t, true), "[00:00] hello\n[01:01] world");
        assert_eq!(format_as_text(&t, false), "hello world");
    }

    #[test]
    fn test_text_without_segments_ignores_timestamps() {
        assert_eq!(format_as_text(&transcript(Vec::new()), true), "hello world");
    }

    #[test]
    fn test_json() {
        let json = format_as_json(&transcript(Vec::new())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["video_id"], "dQw4w9WgXcQ");
        assert_eq!(value["origin"], "primary");
        assert_eq!(value["text"], "hello world");
    }
}

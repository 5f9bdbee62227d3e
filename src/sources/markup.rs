//! Caption payload parsing.
//!
//! Payloads are parsed with an HTML5 parser rather than pattern matching, so
//! nested or unbalanced tags and character references are handled the same way
//! a browser would handle them.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::TranscriptSegment;

static TEXT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("text").expect("valid selector"));

/// Remove every tag from `markup` and decode character references
pub fn strip_markup(markup: &str) -> String {
    Html::parse_fragment(markup)
        .root_element()
        .text()
        .collect::<String>()
}

/// Plain text of a caption payload: markup removed, newlines turned into spaces
pub fn payload_to_text(payload: &str) -> String {
    strip_markup(payload).replace('\n', " ").trim().to_string()
}

/// Parse a timed-text document (`<transcript><text start dur>..</text></transcript>`)
/// into segments. Empty segments are skipped.
pub fn parse_timedtext(payload: &str) -> Vec<TranscriptSegment> {
    let document = Html::parse_fragment(payload);

    document
        .select(&TEXT_SELECTOR)
        .filter_map(|element| {
            let raw = element.text().collect::<String>();
            // Segment bodies are escaped twice; the second pass also drops inline <font> tags
            let text = strip_markup(&raw).replace('\n', " ").trim().to_string();
            if text.is_empty() {
                return None;
            }

            let attr = |name: &str| {
                element
                    .value()
                    .attr(name)
                    .and_then(|value| value.parse::<f64>().ok())
                    .unwrap_or(0.0)
            };

            Some(TranscriptSegment {
                text,
                start: attr("start"),
                duration: attr("dur"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_removed_and_newline_collapsed() {
        assert_eq!(payload_to_text("<p>Hi</p>\n<p>there</p>"), "Hi there");
    }

    #[test]
    fn test_srv3_document() {
        let payload = "<?xml version=\"1.0\" encoding=\"utf-8\" ?><timedtext format=\"3\">\n<body>\n<p t=\"0\" d=\"1500\">Hello</p>\n<p t=\"1500\" d=\"900\"><s>big</s> world</p>\n</body>\n</timedtext>";
        let text = payload_to_text(payload);
        assert!(text.starts_with("Hello"));
        assert!(text.ends_with("big world"));
        assert!(!text.contains('<'));
        assert!(!text.contains('\n'));
    }

    #[test]
    fn test_unbalanced_markup() {
        assert_eq!(strip_markup("<b>bold <i>and italic</b> tail"), "bold and italic tail");
    }

    #[test]
    fn test_character_references_decoded() {
        assert_eq!(strip_markup("Tom &amp; Jerry &#39;s"), "Tom & Jerry 's");
    }

    #[test]
    fn test_parse_timedtext() {
        let payload = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0.5" dur="1.25">Hello &amp;#39;world&amp;#39;</text><text start="2" dur="1">  </text><text start="3.1" dur="2">line one
line two</text></transcript>"#;
        let segments = parse_timedtext(payload);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Hello 'world'");
        assert_eq!(segments[0].start, 0.5);
        assert_eq!(segments[0].duration, 1.25);
        assert_eq!(segments[1].text, "line one line two");
        assert_eq!(segments[1].start, 3.1);
    }

    #[test]
    fn test_parse_timedtext_without_segments() {
        assert!(parse_timedtext("<transcript></transcript>").is_empty());
        assert!(parse_timedtext("").is_empty());
    }
}

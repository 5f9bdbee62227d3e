use anyhow::{Context, Result};
use docx_rs::{Docx, Paragraph, Run, Style, StyleType};
use std::io::Cursor;

/// MIME type of exported documents
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const HEADING_STYLE: &str = "Title";

/// Suggested download name for a transcript document
pub fn suggested_filename(video_id: &str) -> String {
    format!("transcript_{}.docx", video_id)
}

/// Build a Word document with a heading naming the video and the transcript as one paragraph
pub fn export_docx(text: &str, video_id: &str) -> Result<Vec<u8>> {
    let heading = Paragraph::new()
        .add_run(Run::new().add_text(format!("Video Transcript — {}", video_id)))
        .style(HEADING_STYLE);
    let body = Paragraph::new().add_run(Run::new().add_text(text));

    let mut buffer = Cursor::new(Vec::new());
    Docx::new()
        .add_style(
            Style::new(HEADING_STYLE, StyleType::Paragraph)
                .name("Title")
                .size(56)
                .bold(),
        )
        .add_paragraph(heading)
        .add_paragraph(body)
        .build()
        .pack(&mut buffer)
        .context("Failed to serialize transcript document")?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn document_xml(buffer: &[u8]) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(buffer)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn test_heading_and_body() {
        let buffer = export_docx("abc", "XYZ123").unwrap();
        let xml = document_xml(&buffer);

        assert!(xml.contains("Video Transcript — XYZ123"));
        assert!(xml.contains(">abc<"));
        assert!(xml.contains("Title"));
    }

    #[test]
    fn test_markup_characters_are_escaped() {
        let buffer = export_docx("1 < 2 & 3 > 2", "dQw4w9WgXcQ").unwrap();
        let xml = document_xml(&buffer);

        assert!(xml.contains("1 &lt; 2 &amp; 3"));
    }

    #[test]
    fn test_is_a_word_package() {
        let buffer = export_docx("abc", "XYZ123").unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(buffer.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();

        assert!(names.contains(&"[Content_Types].xml"));
        assert!(names.contains(&"word/document.xml"));
    }

    #[test]
    fn test_filename() {
        assert_eq!(suggested_filename("dQw4w9WgXcQ"), "transcript_dQw4w9WgXcQ.docx");
    }
}

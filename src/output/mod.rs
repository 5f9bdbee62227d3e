use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::retrieval::Transcript;

pub mod docx;
pub mod formatters;

pub use docx::{export_docx, suggested_filename, DOCX_MIME};
pub use formatters::*;

/// Render a transcript in the requested format
pub fn render(transcript: &Transcript, format: &OutputFormat, include_timestamps: bool) -> Result<Vec<u8>> {
    let content = match format {
        OutputFormat::Text => format_as_text(transcript, include_timestamps).into_bytes(),
        OutputFormat::Json => format_as_json(transcript)?.into_bytes(),
        OutputFormat::Docx => export_docx(&transcript.text, transcript.video_id.as_str())?,
    };

    Ok(content)
}

/// Media type of the rendered bytes
pub fn content_type(format: &OutputFormat) -> &'static str {
    match format {
        OutputFormat::Text => "text/plain; charset=utf-8",
        OutputFormat::Json => "application/json",
        OutputFormat::Docx => DOCX_MIME,
    }
}

/// Save transcript to file, returning the number of bytes written
pub async fn save_to_file(
    transcript: &Transcript,
    path: &Path,
    format: &OutputFormat,
    include_timestamps: bool,
) -> Result<u64> {
    let content = render(transcript, format, include_timestamps)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs_err::create_dir_all(parent)?;
    }

    fs_err::write(path, &content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(content.len() as u64)
}

/// Default location of the exported document for a transcript
pub fn default_docx_path(transcript: &Transcript, output_dir: Option<&Path>) -> PathBuf {
    let filename = suggested_filename(transcript.video_id.as_str());
    match output_dir {
        Some(dir) => dir.join(filename),
        None => PathBuf::from(filename),
    }
}

/// Print transcript to console
pub fn print_to_console(
    transcript: &Transcript,
    format: &OutputFormat,
    include_timestamps: bool,
) -> Result<()> {
    let content = match format {
        OutputFormat::Text => format_as_text(transcript, include_timestamps),
        OutputFormat::Json => format_as_json(transcript)?,
        OutputFormat::Docx => anyhow::bail!("Word documents cannot be printed; write them to a file"),
    };

    println!("{}", content);
    Ok(())
}

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tubescript",
    about = "Tubescript - Fetch YouTube transcripts and export them as Word documents",
    version,
    long_about = "Fetches the transcript of a YouTube video. The caption list on the watch page is tried first; when that fails, the caption tracks reported by the player are used instead. Transcripts can be printed, saved as text or JSON, or exported as a .docx document."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the transcript of a video
    Fetch {
        /// YouTube video URL (watch, embed, shorts or youtu.be links)
        #[arg(value_name = "URL")]
        url: String,

        /// Output file path (prints to console if not specified; docx defaults to transcript_<id>.docx)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format (defaults to the configured format)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Preferred transcript language, repeatable, in priority order (overrides config)
        #[arg(short, long = "language", value_name = "LANG")]
        languages: Vec<String>,

        /// Prefix each caption segment with its start time in text output
        #[arg(long)]
        timestamps: bool,

        /// Do not fall back to the player's caption tracks when the primary lookup fails
        #[arg(long)]
        no_fallback: bool,
    },

    /// Show the video id and preview link extracted from a URL
    Preview {
        /// YouTube video URL
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Show or initialize the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON with segments and metadata
    Json,
    /// Word document
    Docx,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Docx => write!(f, "docx"),
        }
    }
}

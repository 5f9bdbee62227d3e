use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubescript::cli::{Cli, Commands, OutputFormat};
use tubescript::{extract_video_id, output, utils, Config, TranscriptError, TranscriptPipeline};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; logs go to stderr so stdout carries only the transcript
    let default_filter = if cli.verbose { "tubescript=debug" } else { "tubescript=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load().await?;

    match cli.command {
        Commands::Fetch {
            url,
            output,
            format,
            languages,
            timestamps,
            no_fallback,
        } => {
            if !languages.is_empty() {
                config.retrieval.preferred_languages = languages;
            }
            if no_fallback {
                config.retrieval.enable_fallback = false;
            }
            let format = match format {
                Some(format) => format,
                None => config.default_format()?,
            };

            let progress = if cli.quiet {
                ProgressBar::hidden()
            } else {
                let progress = ProgressBar::new_spinner();
                progress.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
                );
                progress.enable_steady_tick(Duration::from_millis(100));
                progress
            };
            progress.set_message("Fetching transcript...");

            let bar = progress.clone();
            let pipeline = TranscriptPipeline::new(&config)?.on_notice(move |message| {
                bar.suspend(|| eprintln!("{} {}", style("⚠️ ").for_stderr().yellow(), style(message).for_stderr().yellow()));
            });

            let result = pipeline.fetch(&url).await;
            progress.finish_and_clear();

            let transcript = match result {
                Ok(transcript) => transcript,
                Err(err) => exit_with(&err),
            };

            if let Some(last) = transcript.segments.last() {
                tracing::info!(
                    "Fetched {} segments covering {}",
                    transcript.segments.len(),
                    utils::format_duration(last.start + last.duration)
                );
            }

            let target = match (output, &format) {
                (Some(path), _) => Some(path),
                (None, OutputFormat::Docx) => Some(output::default_docx_path(
                    &transcript,
                    config.app.output_dir.as_deref(),
                )),
                (None, _) => None,
            };

            match target {
                Some(path) => {
                    let written = output::save_to_file(&transcript, &path, &format, timestamps).await?;
                    println!(
                        "Transcript saved to: {} ({}, {})",
                        path.display(),
                        utils::format_file_size(written),
                        output::content_type(&format)
                    );
                }
                None => {
                    output::print_to_console(&transcript, &format, timestamps)?;
                }
            }
        }
        Commands::Preview { url } => match extract_video_id(&url) {
            Some(video_id) => {
                println!("Video ID: {}", video_id);
                println!("Preview: {}", video_id.short_url());
            }
            None => exit_with(&TranscriptError::InvalidUrl),
        },
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                let path = config.save().await?;
                println!("Configuration written to: {}", path.display());
            }
        }
    }

    Ok(())
}

/// Report a categorized failure the way the user should see it and exit
fn exit_with(err: &TranscriptError) -> ! {
    eprintln!("{}", style(err).for_stderr().red());
    std::process::exit(1);
}

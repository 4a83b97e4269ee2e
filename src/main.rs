//! Autosub - Subtitle Generation Workflow
//!
//! Entry point for the command-line front end: gathers a video, a subtitle
//! file, a target language and a title, asks the generation service for new
//! subtitles and plays the video with the result attached.

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use autosub::cli::{Args, Commands};
use autosub::config::Config;
use autosub::generation::HttpGenerator;
use autosub::languages::LANGUAGES;
use autosub::launcher::RequestKind;
use autosub::media::MediaProcessorFactory;
use autosub::pickers::{LanguagePicker, SubtitlePicker, VideoPicker};
use autosub::workflow::{RequestOutcome, WorkflowEngine, WorkflowState};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;
    info!("Starting Autosub - Subtitle Generation Workflow");

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Languages => {
            println!("\nSupported Languages:");
            println!("{:<8} {:<25} {:<25}", "Code", "Name", "Native Name");
            println!("{}", "-".repeat(58));

            for language in LANGUAGES {
                println!(
                    "{:<8} {:<25} {:<25}",
                    language.code, language.display_name, language.native_name
                );
            }
        }
        Commands::InitConfig { output } => {
            Config::default().save_to_file(&output)?;
            println!("Default configuration written to {}", output.display());
        }
        Commands::Generate { video, subtitle, language, title, no_play } => {
            if no_play {
                config.media.launch_player = false;
            }
            run_generate(config, video, subtitle, language, title).await?;
        }
    }

    info!("Autosub finished");
    Ok(())
}

/// Drive one workflow instance from the command-line inputs to playback
async fn run_generate(
    config: Config,
    video: Option<PathBuf>,
    subtitle: Option<PathBuf>,
    language: Option<String>,
    title: Option<String>,
) -> Result<()> {
    let playback = MediaProcessorFactory::create_playback(config.media.clone());
    if let Err(e) = playback.check_availability().await {
        warn!("{}", e);
    }

    let mut engine = WorkflowEngine::new(Box::new(Arc::clone(&playback)))
        .with_subtitle_types(config.picker.subtitle_content_types.clone());
    if let Some(limit) = config.generation.timeout() {
        engine = engine.with_generation_timeout(limit);
    }

    engine.register(
        RequestKind::SelectVideo,
        Arc::new(VideoPicker::new(video, config.picker.video_extensions.clone())),
    );
    engine.register(RequestKind::SelectSubtitle, Arc::new(SubtitlePicker::new(subtitle)));
    engine.register(RequestKind::SelectLanguage, Arc::new(LanguagePicker::new(language)));
    engine.register(
        RequestKind::RequestGeneration,
        Arc::new(HttpGenerator::new(config.generation.clone())?),
    );

    // Step 1: Gather inputs
    engine.pick_video()?;
    engine.pick_subtitle()?;
    engine.pick_language()?;
    engine.settle().await;
    if let Some(title) = title {
        engine.set_title(title)?;
    }

    // Step 2: Validate and request generation
    match engine.request_generation()? {
        RequestOutcome::NotReady(reason) => {
            println!("{}", reason);
            return Ok(());
        }
        RequestOutcome::Launched(correlation_id) => {
            info!("Generation request {} launched", correlation_id);
        }
    }

    // Step 3: Wait for the result; Ctrl-C abandons the instance
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    spinner.set_message("Generating subtitles...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    while engine.state() == &WorkflowState::GenerationRequested {
        tokio::select! {
            delivered = engine.process_next() => {
                if !delivered {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, cancelling workflow");
                engine.cancel()?;
            }
        }
    }
    spinner.finish_and_clear();

    // Step 4: Report
    match engine.state() {
        WorkflowState::Completed => {
            if let Some(generated) = engine.generated() {
                println!("Subtitles generated: {}", generated);
            }
            playback.wait_for_sessions().await;
        }
        WorkflowState::Failed(reason) => {
            anyhow::bail!("Generation failed: {}", reason);
        }
        WorkflowState::Cancelled => {
            println!("Cancelled");
        }
        WorkflowState::Gathering => {
            println!("Generation was cancelled by the service; run again to retry");
        }
        other => {
            warn!("Workflow stopped while {}", other);
        }
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".autosub").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "autosub.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Create console layer
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    // Create file layer
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    // Setup layered subscriber
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("autosub.log").display());

    Ok(())
}

//! Command-line driver for narration highlighting.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load configuration from `conf/config.toml` (or `--config <path>`).
//! - Build a narration session for the given text file.
//! - Replay it through the scripted engine, printing every playback state
//!   change as a JSON line.

mod cancellation;
mod scripted_engine;

use crate::scripted_engine::{DriverMessage, ScriptedEngine};
use anyhow::{Context, Result, anyhow};
use speech_highlight_core::config::load_config;
use speech_highlight_core::{EventOutcome, PlaybackState, SpeechHighlighter};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const DEFAULT_CONFIG_PATH: &str = "conf/config.toml";

struct Args {
    text_path: PathBuf,
    config_path: PathBuf,
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args()?;
    let config = load_config(&args.config_path);
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        path = %args.text_path.display(),
        level = %config.log_level,
        rate = config.speech.speech_rate,
        pitch = config.speech.speech_pitch,
        lang = %config.speech.speech_lang,
        unit = %config.speech.offset_unit,
        words_per_minute = config.words_per_minute,
        "Starting narration highlighter"
    );

    let text = fs::read_to_string(&args.text_path)
        .with_context(|| format!("Reading {}", args.text_path.display()))?;

    let (tx, rx) = mpsc::channel();
    let engine = ScriptedEngine::new(
        tx.clone(),
        config.words_per_minute,
        config.speech.offset_unit,
    );
    let mut highlighter = SpeechHighlighter::new(config.speech.clone(), Some(engine));
    let session = highlighter.build_session(text);

    highlighter.subscribe(|state: &PlaybackState| {
        if let Err(err) = print_state(state) {
            warn!("Failed to write playback state: {err:#}");
        }
    });

    if let Err(err) = ctrlc::set_handler(move || {
        let _ = tx.send(DriverMessage::Interrupt);
    }) {
        warn!("Failed to install Ctrl+C signal handler: {err}");
    }

    let outcome = highlighter
        .toggle(&session)
        .context("Starting narration")?;
    info!(?outcome, "Narration requested");

    for message in rx {
        match message {
            DriverMessage::Engine(event) => {
                if highlighter.handle_event(event) == EventOutcome::Reset {
                    break;
                }
            }
            DriverMessage::Interrupt => {
                info!("Received Ctrl+C; stopping narration");
                highlighter.stop();
                break;
            }
        }
    }

    highlighter.shutdown();
    Ok(())
}

fn print_state(state: &PlaybackState) -> Result<()> {
    write_state(&mut std::io::stdout().lock(), state)
}

fn write_state(out: &mut impl Write, state: &PlaybackState) -> Result<()> {
    let line = serde_json::to_string(state).context("Encoding playback state")?;
    writeln!(out, "{line}").context("Writing playback state")?;
    Ok(())
}

fn parse_args() -> Result<Args> {
    let mut text_path = None;
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a path"))?;
                config_path = PathBuf::from(path);
            }
            _ if text_path.is_none() => text_path = Some(PathBuf::from(&arg)),
            _ => return Err(anyhow!("Unexpected argument: {arg}")),
        }
    }

    let text_path = text_path
        .ok_or_else(|| anyhow!("Usage: speech-highlight <text-file> [--config <path>]"))?;
    if !text_path.exists() {
        return Err(anyhow!("File not found: {}", text_path.display()));
    }
    Ok(Args {
        text_path,
        config_path,
    })
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                // stdout carries the JSON state lines
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    warn!("Logging initialized; override level with config.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}

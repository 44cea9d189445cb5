//! BrainJam replay
//!
//! Usage:
//!   bj-replay --frames session.jsonl
//!   bj-replay --config config.json --frames session.jsonl --controls controls.jsonl
//!
//! Frames are one JSON object per line: `{"eeg": [[..]], "fnirs": [[..]], "emg": [[..]]}`.
//! Controls are one `ControlVector` per line. Output is one JSON line per
//! style vector, then one per step, then the session report.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bj_core::{ControlVector, SessionConfig};
use bj_session::{PerformanceSession, RecordedFrame};
use clap::Parser;
use serde::de::DeserializeOwned;

#[derive(Parser)]
#[command(name = "bj-replay", about = "Replay recorded biosignal frames through BrainJam")]
struct Cli {
    /// Session configuration (JSON); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Recorded frames (JSON lines)
    #[arg(short, long)]
    frames: PathBuf,

    /// Performer control vectors (JSON lines)
    #[arg(long)]
    controls: Option<PathBuf>,

    /// Pretty-print the final report
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SessionConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    let mut session = PerformanceSession::new(config).context("Invalid session config")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let frames = replay_frames(&mut session, &cli.frames, &mut out)?;
    log::info!("Replayed {frames} frames from {}", cli.frames.display());

    if let Some(path) = &cli.controls {
        let steps = replay_controls(&mut session, path, &mut out)?;
        log::info!("Replayed {steps} control steps from {}", path.display());
    }

    let report = session.report();
    let text = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    writeln!(out, "{text}")?;
    Ok(())
}

/// Parse every non-blank line of `path` as `T` and hand it to `f`
fn for_each_record<T: DeserializeOwned>(
    path: &Path,
    what: &str,
    mut f: impl FnMut(T) -> Result<()>,
) -> Result<usize> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut count = 0;
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let at = || format!("{}: line {}", path.display(), i + 1);
        let line = line.with_context(|| format!("{}: read error", at()))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: T =
            serde_json::from_str(&line).with_context(|| format!("{}: bad {what}", at()))?;
        f(record).with_context(at)?;
        count += 1;
    }
    Ok(count)
}

fn replay_frames(
    session: &mut PerformanceSession,
    path: &Path,
    out: &mut impl Write,
) -> Result<usize> {
    for_each_record(path, "frame", |frame: RecordedFrame| {
        let packet = frame.to_packet(&session.config().inference)?;
        let style = session.process_frame(&packet.eeg, &packet.fnirs, &packet.emg)?;
        writeln!(out, "{}", serde_json::to_string(&style)?)?;
        Ok(())
    })
}

fn replay_controls(
    session: &mut PerformanceSession,
    path: &Path,
    out: &mut impl Write,
) -> Result<usize> {
    for_each_record(path, "control vector", |controls: ControlVector| {
        let output = session.step(&controls);
        writeln!(out, "{}", serde_json::to_string(&output)?)?;
        Ok(())
    })
}

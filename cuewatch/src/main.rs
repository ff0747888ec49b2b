//! cuewatch: detect color-sequence cues along pixel lines of a capture.
//!
//! `scan` checks a saved image once, `watch` polls a live window or monitor.

mod capture;
mod config;
mod trace;
mod watch;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

use crate::config::Config;

#[derive(Parser)]
#[command(version, about)]
pub struct Args {
	/// Config file (defaults to `cuewatch.json` in the platform config dir).
	#[arg(long, global = true)]
	pub config: Option<PathBuf>,
	/// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
	#[arg(short, long, action = ArgAction::Count, global = true)]
	pub verbose: u8,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
	/// Scan an image file once.
	Scan {
		image: PathBuf,
		/// Only run this cue.
		#[arg(long)]
		cue: Option<String>,
		/// Override the scan line with this row.
		#[arg(long, conflicts_with = "column")]
		row: Option<u32>,
		/// Override the scan line with this column.
		#[arg(long)]
		column: Option<u32>,
		/// Print reports as JSON.
		#[arg(long)]
		json: bool,
	},
	/// Poll the configured window (or primary monitor) and log cue changes.
	Watch {
		/// Poll once and exit.
		#[arg(long)]
		once: bool,
		/// Save captures that change a verdict into this directory.
		#[arg(long)]
		dump: Option<PathBuf>,
	},
	/// List capturable windows.
	Windows,
	/// Print the config path.
	Config {
		/// Write the default config if none exists.
		#[arg(long)]
		init: bool,
	},
}

pub fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	let default_level = match args.verbose {
		0 => LevelFilter::INFO,
		1 => LevelFilter::DEBUG,
		_ => LevelFilter::TRACE,
	};
	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(
			EnvFilter::builder()
				.with_default_directive(default_level.into())
				.from_env()?,
		)
		.init();

	let config_path = Config::resolve(args.config.as_deref())?;

	match args.command {
		Command::Scan {
			image,
			cue,
			row,
			column,
			json,
		} => {
			let cfg = Config::try_load(&config_path)?;
			let line = match (row, column) {
				(Some(y), _) => Some(ie::Line::Row(ie::Position::Pixel(y))),
				(_, Some(x)) => Some(ie::Line::Column(ie::Position::Pixel(x))),
				_ => None,
			};
			scan(&image, cfg, cue.as_deref(), line, json)
		}
		Command::Watch { once, dump } => {
			let cfg = Config::load_or_default(&config_path);
			let delay = Duration::try_from_secs_f32(cfg.poll_delay_s)
				.with_context(|| format!("invalid poll_delay_s {}", cfg.poll_delay_s))?;
			let app_name = cfg.app_name.clone();

			let ie = ie::Ie::try_new(cfg.cues).context("invalid cue in config")?;
			let mut watcher = watch::Watcher::new(ie);
			if let Some(dir) = dump {
				watcher = watcher.with_dump_dir(dir);
			}

			tracing::info!(
				source = app_name.as_deref().unwrap_or("primary monitor"),
				delay_s = delay.as_secs_f32(),
				"watching"
			);
			watcher.run(delay, once.then_some(1), || capture::capture(app_name.as_deref()))
		}
		Command::Windows => {
			for w in capture::list_windows()? {
				println!("{:<32} {:>5}x{:<5} {}", w.app_name, w.width, w.height, w.title);
			}
			Ok(())
		}
		Command::Config { init } => {
			if init {
				if config_path.exists() {
					bail!("config already exists: {:?}", config_path);
				}
				Config::default().save(&config_path)?;
				tracing::info!(path = %config_path.display(), "wrote default config");
			}
			println!("{}", config_path.display());
			Ok(())
		}
	}
}

fn scan(
	path: &std::path::Path,
	cfg: Config,
	only: Option<&str>,
	line: Option<ie::Line>,
	json: bool,
) -> anyhow::Result<()> {
	let image = ie::OwnedImage::open(path)?;
	tracing::debug!(width = image.width(), height = image.height(), "loaded image");

	let mut cues = cfg.cues;
	if let Some(name) = only {
		cues.retain(|cue| cue.name == name);
		if cues.is_empty() {
			return Err(ie::ScanError::UnknownCue(name.to_string()).into());
		}
	}
	if let Some(line) = line {
		cues = cues.iter().map(|cue| cue.on_line(line)).collect();
	}

	let ie = ie::Ie::try_new(cues).context("invalid cue in config")?;
	let results = ie.detect_all_with(image.as_image(), |cue| trace::TraceObserver::new(&cue.name))?;

	if json {
		let out: Vec<_> = results
			.iter()
			.map(|r| serde_json::json!({ "cue": r.cue.name, "report": r.report }))
			.collect();
		println!("{}", serde_json::to_string_pretty(&out)?);
		return Ok(());
	}

	for result in &results {
		let verdict = if result.report.matched { "MATCH" } else { "no match" };
		println!("{}: {verdict}", result.cue.name);
		for (target, span) in result.cue.targets.iter().zip(&result.report.spans) {
			let span = match span {
				Some(span) => format!("{}..={} ({} px)", span.start, span.end, span.pixels()),
				None => "-".to_string(),
			};
			let kind = if target.required { "required" } else { "optional" };
			println!("  {} ±{:<3} {kind:<8} {span}", target.color, target.tolerance);
		}
	}
	Ok(())
}

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::trace::TraceObserver;

/// A cue whose verdict differs from the previous poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
	pub cue: String,
	pub matched: bool,
}

pub struct Watcher {
	ie: ie::Ie,
	last: HashMap<String, bool>,
	dump_dir: Option<PathBuf>,
}

impl Watcher {
	pub fn new(ie: ie::Ie) -> Self {
		Self {
			ie,
			last: HashMap::new(),
			dump_dir: None,
		}
	}

	/// Save every capture that changes a verdict into `dir`.
	pub fn with_dump_dir(mut self, dir: PathBuf) -> Self {
		self.dump_dir = Some(dir);
		self
	}

	/// Run every cue against one capture and return the verdicts that changed.
	///
	/// The first poll reports every cue.
	pub fn poll(&mut self, image: &ie::OwnedImage) -> Result<Vec<Change>> {
		let results = self
			.ie
			.detect_all_with(image.as_image(), |cue| TraceObserver::new(&cue.name))?;

		let mut changes = Vec::new();
		for result in results {
			let matched = result.report.matched;
			let previous = self.last.insert(result.cue.name.clone(), matched);
			if previous != Some(matched) {
				changes.push(Change {
					cue: result.cue.name.clone(),
					matched,
				});
			}
		}

		if !changes.is_empty() {
			if let Some(dir) = &self.dump_dir {
				std::fs::create_dir_all(dir).with_context(|| format!("create {:?}", dir))?;
				let millis = std::time::SystemTime::now()
					.duration_since(std::time::UNIX_EPOCH)
					.map(|d| d.as_millis())
					.unwrap_or_default();
				let path = dir.join(format!("capture_{millis}.png"));
				image.as_image().save_png(&path)?;
				tracing::debug!(path = %path.display(), "saved capture");
			}
		}

		Ok(changes)
	}

	/// Poll `capture` every `delay` until it's been called `limit` times (forever if `None`).
	///
	/// Capture failures are logged and retried on the next tick.
	pub fn run(
		&mut self,
		delay: Duration,
		limit: Option<usize>,
		mut capture: impl FnMut() -> Result<ie::OwnedImage>,
	) -> Result<()> {
		let mut polls = 0usize;
		loop {
			let started = Instant::now();

			match capture() {
				Ok(image) => {
					for change in self.poll(&image)? {
						tracing::info!(cue = %change.cue, matched = change.matched, "cue changed");
					}
				}
				Err(err) => tracing::warn!(error = %format!("{err:#}"), "capture failed"),
			}

			polls += 1;
			if limit.is_some_and(|limit| polls >= limit) {
				return Ok(());
			}

			std::thread::sleep(delay.saturating_sub(started.elapsed()));
		}
	}
}

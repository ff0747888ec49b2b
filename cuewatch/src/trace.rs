//! Scan observer that forwards scanner transitions to `tracing`.

use ie::sequence::{ScanEvent, ScanObserver};

pub struct TraceObserver<'a> {
	cue: &'a str,
}

impl<'a> TraceObserver<'a> {
	pub fn new(cue: &'a str) -> Self {
		Self { cue }
	}
}

impl ScanObserver for TraceObserver<'_> {
	fn on_event(&mut self, event: ScanEvent) {
		let cue = self.cue;
		match event {
			ScanEvent::Matched { px, target } => tracing::trace!(cue, px, target, "pixel matches current color"),
			ScanEvent::Advanced { px, from, to } => tracing::debug!(cue, px, from, to, "pixel matches next color"),
			ScanEvent::Reset { px, target } => {
				tracing::debug!(cue, px, target, "required color broken; resetting sequence")
			}
			ScanEvent::Held { px, target } => tracing::debug!(cue, px, target, "optional color broken; holding"),
			ScanEvent::Completed { px, reason } => tracing::debug!(cue, ?px, ?reason, "sequence complete"),
		}
	}
}

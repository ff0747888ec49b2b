mod image;
pub use self::image::*;
mod error;
pub use error::*;
pub mod cue;
pub use cue::{Cue, Line, Position};
pub mod sequence;
pub use sequence::{scan, scan_single, scan_with, MatchSpan, ScanObserver, ScanReport, TargetColor};

/// Result of one cue against one capture.
#[derive(Debug, Clone)]
pub struct CueResult<'a> {
	pub cue: &'a Cue,
	pub report: ScanReport,
}

pub struct Ie {
	cues: Vec<Cue>,
}

impl Ie {
	/// Build the engine, rejecting cues that have no targets.
	pub fn try_new(cues: Vec<Cue>) -> Result<Self> {
		if cues.iter().any(|cue| cue.targets.is_empty()) {
			return Err(ScanError::NoTargets);
		}
		Ok(Self { cues })
	}

	pub fn cues(&self) -> &[Cue] {
		&self.cues
	}

	pub fn cue(&self, name: &str) -> Option<&Cue> {
		self.cues.iter().find(|cue| cue.name == name)
	}

	pub fn detect(&self, name: &str, image: Image) -> Result<ScanReport> {
		self.cue(name)
			.ok_or_else(|| ScanError::UnknownCue(name.to_string()))?
			.detect(image)
	}

	pub fn detect_all(&self, image: Image) -> Result<Vec<CueResult<'_>>> {
		self.detect_all_with(image, |_| sequence::NoopObserver)
	}

	/// Scan every cue, each with its own observer from `observer_for`.
	pub fn detect_all_with<'a, F, O>(&'a self, image: Image, mut observer_for: F) -> Result<Vec<CueResult<'a>>>
	where
		F: FnMut(&'a Cue) -> O,
		O: ScanObserver,
	{
		self.cues
			.iter()
			.map(|cue| {
				let report = cue.detect_with(image, &mut observer_for(cue))?;
				Ok(CueResult { cue, report })
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const RED: Color = Color::new(237, 28, 36);
	const GREEN: Color = Color::new(34, 177, 76);

	fn engine() -> Ie {
		Ie::try_new(vec![
			Cue::new("red-green", Line::MIDDLE_ROW, vec![TargetColor::required(RED, 0), TargetColor::required(GREEN, 0)]),
			Cue::new("green", Line::Column(Position::Pixel(1)), vec![TargetColor::required(GREEN, 0)]),
		])
		.unwrap()
	}

	fn image() -> OwnedImage {
		// 3x1: red then two green.
		OwnedImage::from_pixels(3, 1, vec![RED, GREEN, GREEN])
	}

	#[test]
	fn test_rejects_empty_cue() {
		let cues = vec![Cue::new("empty", Line::MIDDLE_ROW, vec![])];
		assert!(matches!(Ie::try_new(cues), Err(ScanError::NoTargets)));
	}

	#[test]
	fn test_detect_by_name() {
		let ie = engine();
		let img = image();

		assert!(ie.detect("red-green", img.as_image()).unwrap().matched);
		assert!(ie.detect("green", img.as_image()).unwrap().matched);

		// Green only opens on the final pixel: the required tail never finishes.
		let short = OwnedImage::from_pixels(2, 1, vec![RED, GREEN]);
		let report = ie.detect("red-green", short.as_image()).unwrap();
		assert!(!report.matched);
		assert_eq!(report.span(1), Some(MatchSpan { start: 1, end: 1 }));
		assert_eq!(
			ie.detect("blue", img.as_image()),
			Err(ScanError::UnknownCue("blue".to_string()))
		);
	}

	#[test]
	fn test_detect_all_uses_fresh_observer_per_cue() {
		let ie = engine();
		let img = image();
		let mut seen = Vec::new();

		let results = ie
			.detect_all_with(img.as_image(), |cue| {
				seen.push(cue.name.clone());
				sequence::NoopObserver
			})
			.unwrap();

		assert_eq!(seen, vec!["red-green", "green"]);
		assert_eq!(results.len(), 2);
		assert!(results.iter().all(|r| r.report.matched));
		assert_eq!(results[1].cue.name, "green");
	}
}

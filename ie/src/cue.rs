//! Named visual cues: a scan line on the screen plus the color sequence
//! expected along it.
//!
//! Lines are placed with either absolute pixel indices or fractions of the
//! capture size, so one cue definition keeps working across resolutions.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sequence::{self, NoopObserver, ScanObserver, ScanReport, TargetColor};
use crate::{Color, Image};

/// Where a line sits along its axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Position {
    /// Absolute pixel index.
    Pixel(u32),
    /// Fraction of the image extent, `0.0..=1.0`.
    Fraction(f32),
}

impl Position {
    /// Resolve against an extent (image height for rows, width for columns).
    ///
    /// Returns `None` when the position falls outside the image.
    pub fn resolve(self, extent: u32) -> Option<u32> {
        if extent == 0 {
            return None;
        }
        let index = match self {
            Self::Pixel(px) => px,
            Self::Fraction(f) if (0.0..=1.0).contains(&f) => {
                ((extent as f32 * f) as u32).min(extent - 1)
            }
            Self::Fraction(_) => return None,
        };
        (index < extent).then_some(index)
    }
}

/// A single scan line through an image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Line {
    /// Horizontal line, read left to right.
    Row(Position),
    /// Vertical line, read top to bottom.
    Column(Position),
}

impl Line {
    /// The middle row, where most indicator bars are sampled.
    pub const MIDDLE_ROW: Self = Self::Row(Position::Fraction(0.5));

    /// Extract the observed colors along this line. Empty if the line is
    /// outside the image.
    pub fn extract(&self, image: Image) -> Vec<Color> {
        match *self {
            Self::Row(pos) => pos
                .resolve(image.height())
                .map(|y| image.row(y))
                .unwrap_or_default(),
            Self::Column(pos) => pos
                .resolve(image.width())
                .map(|x| image.column(x))
                .unwrap_or_default(),
        }
    }
}

impl Default for Line {
    fn default() -> Self {
        Self::MIDDLE_ROW
    }
}

/// A named color sequence expected along one line of the screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub name: String,
    #[serde(default)]
    pub line: Line,
    pub targets: Vec<TargetColor>,
}

impl Cue {
    pub fn new(name: impl Into<String>, line: Line, targets: Vec<TargetColor>) -> Self {
        Self {
            name: name.into(),
            line,
            targets,
        }
    }

    pub fn detect(&self, image: Image) -> Result<ScanReport> {
        self.detect_with(image, &mut NoopObserver)
    }

    pub fn detect_with<O>(&self, image: Image, observer: &mut O) -> Result<ScanReport>
    where
        O: ScanObserver + ?Sized,
    {
        let observed = self.line.extract(image);
        sequence::scan_with(&observed, &self.targets, observer)
    }

    /// Same cue scanned along a different line.
    pub fn on_line(&self, line: Line) -> Self {
        Self {
            line,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OwnedImage;

    const RED: Color = Color::new(237, 28, 36);
    const GREEN: Color = Color::new(34, 177, 76);
    const BLUE: Color = Color::new(0, 162, 232);

    /// 6x3 image: the middle row holds the red/green/blue bar, the rest is white.
    fn bar_image() -> OwnedImage {
        let mut data = vec![Color::WHITE; 6];
        data.extend([RED, RED, GREEN, GREEN, BLUE, BLUE]);
        data.extend([Color::WHITE; 6]);
        OwnedImage::from_pixels(6, 3, data)
    }

    fn rgb_cue(line: Line) -> Cue {
        Cue::new(
            "bar",
            line,
            vec![
                TargetColor::required(RED, 0),
                TargetColor::required(GREEN, 0),
                TargetColor::required(BLUE, 0),
            ],
        )
    }

    #[test]
    fn test_position_resolve() {
        assert_eq!(Position::Fraction(0.5).resolve(1080), Some(540));
        assert_eq!(Position::Fraction(1.0).resolve(1080), Some(1079));
        assert_eq!(Position::Fraction(0.0).resolve(3), Some(0));
        assert_eq!(Position::Fraction(1.5).resolve(3), None);
        assert_eq!(Position::Pixel(2).resolve(3), Some(2));
        assert_eq!(Position::Pixel(3).resolve(3), None);
        assert_eq!(Position::Pixel(0).resolve(0), None);
    }

    #[test]
    fn test_line_extract() {
        let img = bar_image();
        let view = img.as_image();

        assert_eq!(Line::MIDDLE_ROW.extract(view), vec![RED, RED, GREEN, GREEN, BLUE, BLUE]);
        assert_eq!(Line::Column(Position::Pixel(2)).extract(view), vec![Color::WHITE, GREEN, Color::WHITE]);
        assert!(Line::Row(Position::Pixel(9)).extract(view).is_empty());
    }

    #[test]
    fn test_detect_middle_row() {
        let img = bar_image();
        let report = rgb_cue(Line::MIDDLE_ROW).detect(img.as_image()).unwrap();

        assert!(report.matched);
        assert_eq!(report.span(2).map(|s| (s.start, s.end)), Some((4, 5)));
    }

    #[test]
    fn test_detect_wrong_line() {
        let img = bar_image();
        let cue = rgb_cue(Line::MIDDLE_ROW);

        assert!(!cue.on_line(Line::Row(Position::Pixel(0))).detect(img.as_image()).unwrap().matched);
        assert!(!cue.on_line(Line::Row(Position::Pixel(7))).detect(img.as_image()).unwrap().matched);
    }

    #[test]
    fn test_cue_serde() {
        let json = r##"{
            "name": "health",
            "line": {"column": 0.25},
            "targets": [
                {"color": "#ed1c24", "tolerance": 3},
                {"color": [34, 177, 76], "tolerance": 120, "required": false}
            ]
        }"##;
        let cue: Cue = serde_json::from_str(json).unwrap();

        assert_eq!(cue.name, "health");
        assert_eq!(cue.line, Line::Column(Position::Fraction(0.25)));
        assert_eq!(cue.targets[0], TargetColor::required(RED, 3));
        assert_eq!(cue.targets[1], TargetColor::optional(GREEN, 120));

        let cue: Cue = serde_json::from_str(r#"{"name": "x", "line": {"row": 12}, "targets": []}"#).unwrap();
        assert_eq!(cue.line, Line::Row(Position::Pixel(12)));

        let cue: Cue = serde_json::from_str(r#"{"name": "x", "targets": []}"#).unwrap();
        assert_eq!(cue.line, Line::MIDDLE_ROW);
    }
}

//! Ordered color sequence matching along a single line of pixels.
//!
//! The scanner walks the observed pixels once while keeping a cursor into the
//! list of expected colors. Required targets act as anchors: their run must be
//! contiguous and be followed directly by the next target (or the end of the
//! line). Optional targets are waypoints the scanner tolerates losing.
//!
//! Targets are immutable input. Match bookkeeping lives in a [`ScanReport`]
//! allocated per call, so one target list can be shared by any number of
//! concurrent scans.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};
use crate::Color;

/// One expected color in a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetColor {
    pub color: Color,

    /// Maximum per-channel absolute difference still counted as a match.
    #[serde(default)]
    pub tolerance: u8,

    /// Required ("pure") targets must be seen as one contiguous run directly
    /// followed by the next target.
    #[serde(default = "default_required", alias = "pure")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl TargetColor {
    pub const fn new(color: Color, tolerance: u8, required: bool) -> Self {
        Self {
            color,
            tolerance,
            required,
        }
    }

    pub const fn required(color: Color, tolerance: u8) -> Self {
        Self::new(color, tolerance, true)
    }

    pub const fn optional(color: Color, tolerance: u8) -> Self {
        Self::new(color, tolerance, false)
    }

    #[inline]
    pub fn matches(&self, pixel: Color) -> bool {
        pixel.within_tolerance(self.color, self.tolerance)
    }
}

/// Inclusive range of observed indices matched by one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

impl MatchSpan {
    #[inline]
    fn at(px: usize) -> Self {
        Self { start: px, end: px }
    }

    /// Number of pixels covered by the span.
    pub fn pixels(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Verdict of a list scan plus the span of every target, by target index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub matched: bool,
    pub spans: Vec<Option<MatchSpan>>,
}

impl ScanReport {
    /// Span of target `index`, `None` if it never matched (or was reset).
    pub fn span(&self, index: usize) -> Option<MatchSpan> {
        self.spans.get(index).copied().flatten()
    }
}

/// Verdict of a single-target scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SingleReport {
    pub matched: bool,
    pub span: Option<MatchSpan>,
}

/// Why a scan finished successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The last target matched the last observed pixel.
    EndOfData,
    /// The run of a required last target ended.
    RequiredRunEnded,
    /// The pass finished and the optional last target matched at some point.
    OptionalTail,
}

/// State transitions of a scan, in the order they happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEvent {
    /// Pixel `px` extended the run of target `target`.
    Matched { px: usize, target: usize },
    /// Pixel `px` broke the run of `from` and opened the run of `to`.
    Advanced { px: usize, from: usize, to: usize },
    /// Pixel `px` broke the run of required target `target`; all spans cleared.
    Reset { px: usize, target: usize },
    /// Pixel `px` broke the run of optional target `target`; state kept.
    Held { px: usize, target: usize },
    /// The scan succeeded. `px` is `None` for the end-of-pass verdict.
    Completed { px: Option<usize>, reason: Completion },
}

/// Receives scan events, e.g. for diagnostic tracing.
///
/// The scanner itself has no side effects; anything that wants to watch a
/// scan hooks in here.
pub trait ScanObserver {
    fn on_event(&mut self, event: ScanEvent);
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ScanObserver for NoopObserver {
    #[inline]
    fn on_event(&mut self, _event: ScanEvent) {}
}

impl<F: FnMut(ScanEvent)> ScanObserver for F {
    fn on_event(&mut self, event: ScanEvent) {
        self(event)
    }
}

/// Scan `observed` for the ordered `targets`.
pub fn scan(observed: &[Color], targets: &[TargetColor]) -> Result<ScanReport> {
    scan_with(observed, targets, &mut NoopObserver)
}

/// Scan `observed` for a single target.
pub fn scan_single(observed: &[Color], target: &TargetColor) -> SingleReport {
    let report = scan_from(observed, std::slice::from_ref(target), 0, &mut NoopObserver);

    SingleReport {
        matched: report.matched,
        span: report.span(0),
    }
}

/// Scan `observed` for the ordered `targets`, reporting transitions to `observer`.
pub fn scan_with<O>(observed: &[Color], targets: &[TargetColor], observer: &mut O) -> Result<ScanReport>
where
    O: ScanObserver + ?Sized,
{
    let last_target = targets.len().checked_sub(1).ok_or(ScanError::NoTargets)?;
    Ok(scan_from(observed, targets, last_target, observer))
}

/// `last_target` must be `targets.len() - 1`.
fn scan_from<O>(observed: &[Color], targets: &[TargetColor], last_target: usize, observer: &mut O) -> ScanReport
where
    O: ScanObserver + ?Sized,
{
    let mut spans: Vec<Option<MatchSpan>> = vec![None; targets.len()];
    let mut cursor = 0usize;

    let done = |spans: Vec<Option<MatchSpan>>| ScanReport {
        matched: true,
        spans,
    };

    for (px, &color) in observed.iter().enumerate() {
        let current = &targets[cursor];

        if current.matches(color) {
            spans[cursor].get_or_insert(MatchSpan::at(px)).end = px;
            observer.on_event(ScanEvent::Matched { px, target: cursor });

            if px + 1 == observed.len() && cursor == last_target {
                observer.on_event(ScanEvent::Completed {
                    px: Some(px),
                    reason: Completion::EndOfData,
                });
                return done(spans);
            }
        } else if spans[cursor].is_some() {
            if cursor < last_target {
                if targets[cursor + 1].matches(color) {
                    observer.on_event(ScanEvent::Advanced {
                        px,
                        from: cursor,
                        to: cursor + 1,
                    });
                    cursor += 1;
                    spans[cursor] = Some(MatchSpan::at(px));
                } else if current.required {
                    observer.on_event(ScanEvent::Reset { px, target: cursor });
                    spans.fill(None);
                    cursor = 0;
                } else {
                    observer.on_event(ScanEvent::Held { px, target: cursor });
                }
            } else if current.required {
                observer.on_event(ScanEvent::Completed {
                    px: Some(px),
                    reason: Completion::RequiredRunEnded,
                });
                return done(spans);
            }
        }
    }

    let tail = &targets[last_target];
    let matched = !tail.required && spans[last_target].is_some();
    if matched {
        observer.on_event(ScanEvent::Completed {
            px: None,
            reason: Completion::OptionalTail,
        });
    }

    ScanReport { matched, spans }
}

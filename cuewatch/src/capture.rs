use anyhow::{Context, Result};

/// A capturable top-level window.
#[derive(Debug, Clone)]
pub struct WindowInfo {
	pub app_name: String,
	pub title: String,
	pub width: u32,
	pub height: u32,
}

pub fn list_windows() -> Result<Vec<WindowInfo>> {
	let windows = xcap::Window::all().context("enumerate windows")?;
	Ok(windows
		.into_iter()
		.filter_map(|window| {
			Some(WindowInfo {
				app_name: window.app_name().ok()?,
				title: window.title().unwrap_or_default(),
				width: window.width().ok()?,
				height: window.height().ok()?,
			})
		})
		.collect())
}

pub fn find_window(app_name: &str) -> Option<xcap::Window> {
	let windows = xcap::Window::all().ok()?;
	windows
		.into_iter()
		.find(|window| window.app_name().ok().as_deref() == Some(app_name))
}

pub fn capture_window(app_name: &str) -> Result<ie::OwnedImage> {
	let window = find_window(app_name).with_context(|| format!("no window with app name {app_name:?}"))?;
	let img = window
		.capture_image()
		.with_context(|| format!("capture window {app_name:?}"))?;
	Ok(ie::OwnedImage::from_rgba(img.width() as usize, img.as_raw()))
}

pub fn capture_primary_monitor() -> Result<ie::OwnedImage> {
	let monitors = xcap::Monitor::all().context("enumerate monitors")?;
	let monitor = monitors
		.into_iter()
		.find(|m| m.is_primary().unwrap_or(false))
		.context("no primary monitor")?;
	let img = monitor.capture_image().context("capture primary monitor")?;
	Ok(ie::OwnedImage::from_rgba(img.width() as usize, img.as_raw()))
}

/// Capture the configured window, or the primary monitor if none is set.
pub fn capture(app_name: Option<&str>) -> Result<ie::OwnedImage> {
	match app_name {
		Some(app_name) => capture_window(app_name),
		None => capture_primary_monitor(),
	}
}

use image::RgbaImage;
use snapsolve_types::WindowBounds;
use xcap::Window;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("No active window found")]
    NoActiveWindow,

    #[error("Screen capture failed: {0}")]
    Backend(String),
}

/// Pixels of the focused window plus where it was on screen
pub struct CapturedWindow {
    pub title: String,
    pub bounds: WindowBounds,
    pub image: RgbaImage,
}

/// Anything that can grab the currently focused window
pub trait CaptureSource: Send + Sync {
    fn capture_active_window(&self) -> Result<CapturedWindow, CaptureError>;
}

/// Captures through the platform compositor via `xcap`
#[derive(Debug, Default, Clone, Copy)]
pub struct XcapCapture;

impl CaptureSource for XcapCapture {
    fn capture_active_window(&self) -> Result<CapturedWindow, CaptureError> {
        let windows = Window::all().map_err(|e| CaptureError::Backend(e.to_string()))?;

        let listed: Vec<ListedWindow<'_>> = windows
            .iter()
            .map(|w| ListedWindow {
                id: w.id(),
                title: w.title(),
                minimized: w.is_minimized(),
                width: w.width(),
                height: w.height(),
            })
            .collect();
        let index = select_window(&listed, focused_window())
            .ok_or(CaptureError::NoActiveWindow)?;
        let window = &windows[index];

        let bounds = WindowBounds {
            x: window.x(),
            y: window.y(),
            width: window.width(),
            height: window.height(),
        };
        tracing::debug!("Capturing '{}' ({})", window.title(), bounds);

        let captured = window
            .capture_image()
            .map_err(|e| CaptureError::Backend(e.to_string()))?;

        let (width, height) = (captured.width(), captured.height());
        let image = RgbaImage::from_raw(width, height, captured.into_raw()).ok_or_else(|| {
            CaptureError::Backend(format!("Invalid {width}x{height} pixel buffer"))
        })?;

        Ok(CapturedWindow {
            title: window.title().to_string(),
            bounds,
            image,
        })
    }
}

/// Answer of the platform focus query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    /// The OS reported this window id as focused
    #[cfg_attr(not(windows), allow(dead_code))]
    Window(u32),
    /// The OS reported that no window has focus
    #[cfg_attr(not(windows), allow(dead_code))]
    Nothing,
    /// No focus query on this platform
    #[cfg_attr(windows, allow(dead_code))]
    Unknown,
}

/// The subset of an `xcap::Window` that selection looks at
struct ListedWindow<'a> {
    id: u32,
    title: &'a str,
    minimized: bool,
    width: u32,
    height: u32,
}

impl ListedWindow<'_> {
    fn is_capturable(&self) -> bool {
        !self.minimized && self.width > 0 && self.height > 0
    }
}

/// Index of the window to capture.
///
/// With a focus answer only that window qualifies. Without one, fall back to
/// the first titled, capturable window in list order. That order is front to
/// back on macOS but mapping order on X11, so the fallback is a heuristic.
fn select_window(listed: &[ListedWindow<'_>], focus: Focus) -> Option<usize> {
    match focus {
        Focus::Window(id) => listed
            .iter()
            .position(|w| w.id == id && w.is_capturable()),
        Focus::Nothing => None,
        Focus::Unknown => listed
            .iter()
            .position(|w| !w.title.trim().is_empty() && w.is_capturable()),
    }
}

#[cfg(windows)]
fn focused_window() -> Focus {
    use windows::Win32::UI::WindowsAndMessaging::GetForegroundWindow;

    let hwnd = unsafe { GetForegroundWindow() };
    if hwnd.is_invalid() {
        Focus::Nothing
    } else {
        // xcap uses the truncated HWND as the window id
        Focus::Window(hwnd.0 as usize as u32)
    }
}

#[cfg(not(windows))]
fn focused_window() -> Focus {
    Focus::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listed(id: u32, title: &str, minimized: bool, width: u32) -> ListedWindow<'_> {
        ListedWindow {
            id,
            title,
            minimized,
            width,
            height: 600,
        }
    }

    #[test]
    fn test_focused_window_wins_over_list_order() {
        let windows = [
            listed(11, "Terminal", false, 800),
            listed(42, "Quiz - Browser", false, 1280),
        ];
        assert_eq!(select_window(&windows, Focus::Window(42)), Some(1));
        assert_eq!(select_window(&windows, Focus::Window(11)), Some(0));
    }

    #[test]
    fn test_focused_window_missing_or_unusable() {
        let windows = [
            listed(11, "Terminal", false, 800),
            listed(42, "Quiz", true, 1280),
            listed(7, "Zero", false, 0),
        ];
        assert_eq!(select_window(&windows, Focus::Window(99)), None);
        assert_eq!(select_window(&windows, Focus::Window(42)), None);
        assert_eq!(select_window(&windows, Focus::Window(7)), None);
        assert_eq!(select_window(&windows, Focus::Nothing), None);
    }

    #[test]
    fn test_focused_window_may_be_untitled() {
        let windows = [listed(3, "Other", false, 800), listed(5, "", false, 800)];
        assert_eq!(select_window(&windows, Focus::Window(5)), Some(1));
    }

    #[test]
    fn test_fallback_takes_first_titled_capturable_window() {
        let windows = [
            listed(1, "", false, 800),
            listed(2, "  ", false, 800),
            listed(3, "Minimised", true, 800),
            listed(4, "Collapsed", false, 0),
            listed(5, "Quiz - Browser", false, 1280),
            listed(6, "Terminal", false, 800),
        ];
        assert_eq!(select_window(&windows, Focus::Unknown), Some(4));
        assert_eq!(select_window(&windows[..4], Focus::Unknown), None);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(CaptureError::NoActiveWindow.to_string(), "No active window found");
        assert_eq!(
            CaptureError::Backend("denied".into()).to_string(),
            "Screen capture failed: denied"
        );
    }
}

//! Display/monitor detection.

use gestureflow_common::error::{GestureflowError, GestureflowResult};
use gestureflow_platform_core::{DisplayServer, MonitorInfo};

/// Detect connected monitors through `xrandr --current`.
///
/// Works on X11 and on XWayland-enabled Wayland sessions.
pub fn detect_monitors() -> GestureflowResult<Vec<MonitorInfo>> {
    tracing::debug!("Detecting monitors");

    let output = std::process::Command::new("xrandr")
        .arg("--current")
        .output()
        .map_err(|e| GestureflowError::platform(format!("Failed to run xrandr: {e}")))?;

    if !output.status.success() {
        return Err(GestureflowError::platform(format!(
            "xrandr exited with {}",
            output.status
        )));
    }

    let monitors = parse_xrandr(&String::from_utf8_lossy(&output.stdout));
    if monitors.is_empty() {
        return Err(GestureflowError::platform(
            "xrandr reported no connected outputs",
        ));
    }
    Ok(monitors)
}

/// Parse connected outputs from `xrandr --current` output.
///
/// Lines look like `HDMI-1 connected primary 2560x1440+0+0 (normal ...)`;
/// connected outputs without an active mode are skipped.
pub fn parse_xrandr(output: &str) -> Vec<MonitorInfo> {
    output
        .lines()
        .filter(|line| !line.starts_with(char::is_whitespace))
        .filter_map(|line| {
            let mut words = line.split_whitespace();
            let name = words.next()?;
            if words.next()? != "connected" {
                return None;
            }
            let mut primary = false;
            let geometry = words.find_map(|word| {
                if word == "primary" {
                    primary = true;
                    None
                } else {
                    parse_geometry(word)
                }
            })?;
            let (width, height, x, y) = geometry;
            Some(MonitorInfo {
                name: name.to_string(),
                width,
                height,
                x,
                y,
                primary,
            })
        })
        .collect()
}

/// `WIDTHxHEIGHT+X+Y`
fn parse_geometry(word: &str) -> Option<(u32, u32, i32, i32)> {
    let (width, rest) = word.split_once('x')?;
    let mut parts = rest.split('+');
    let height = parts.next()?;
    let x = parts.next()?;
    let y = parts.next()?;
    Some((
        width.parse().ok()?,
        height.parse().ok()?,
        x.parse().ok()?,
        y.parse().ok()?,
    ))
}

/// Detect the current display server.
pub fn detect_display_server() -> DisplayServer {
    if std::env::var("WAYLAND_DISPLAY").is_ok() {
        DisplayServer::Wayland
    } else if std::env::var("DISPLAY").is_ok() {
        DisplayServer::X11
    } else {
        DisplayServer::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XRANDR: &str = "\
Screen 0: minimum 320 x 200, current 4480 x 1440, maximum 16384 x 16384
eDP-1 connected 1920x1080+2560+360 (normal left inverted right x axis y axis) 344mm x 194mm
   1920x1080     60.02*+
HDMI-1 connected primary 2560x1440+0+0 (normal left inverted right x axis y axis) 597mm x 336mm
   2560x1440     59.95*+
DP-1 disconnected (normal left inverted right x axis y axis)
DP-2 connected (normal left inverted right x axis y axis)
";

    #[test]
    fn test_parse_xrandr_connected_outputs() {
        let monitors = parse_xrandr(XRANDR);
        assert_eq!(monitors.len(), 2);

        assert_eq!(monitors[0].name, "eDP-1");
        assert_eq!((monitors[0].width, monitors[0].height), (1920, 1080));
        assert_eq!((monitors[0].x, monitors[0].y), (2560, 360));
        assert!(!monitors[0].primary);

        assert_eq!(monitors[1].name, "HDMI-1");
        assert_eq!((monitors[1].width, monitors[1].height), (2560, 1440));
        assert!(monitors[1].primary);
    }

    #[test]
    fn test_parse_xrandr_empty() {
        assert!(parse_xrandr("").is_empty());
        assert!(parse_xrandr("garbage\n  1920x1080 60.0").is_empty());
    }
}

//! Virtual pointer device backed by `/dev/uinput`.
//!
//! The device exposes absolute X/Y axes sized to the active display, a
//! vertical wheel, left button (so compositors classify it as a pointer),
//! and left Ctrl for zoom chords.

use std::os::unix::fs::MetadataExt;

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{
    AbsInfo, AbsoluteAxisType, AttributeSet, EventType, InputEvent, Key, RelativeAxisType,
    UinputAbsSetup,
};
use gestureflow_common::error::{GestureflowError, GestureflowResult};
use gestureflow_platform_core::{DisplaySize, InputInjector};

const UINPUT_PATH: &str = "/dev/uinput";
const DEVICE_NAME: &str = "gestureflow-pointer";

pub struct UinputInjector {
    device: VirtualDevice,
    display: DisplaySize,
}

impl UinputInjector {
    /// Create the virtual device. Fails when `/dev/uinput` is not writable.
    pub fn new(display: DisplaySize) -> GestureflowResult<Self> {
        let device = build_device(display).map_err(|e| {
            GestureflowError::backend_unavailable(format!(
                "Failed to create uinput device: {e}; {}",
                uinput_diagnostic()
            ))
        })?;

        let (width, height) = (display.width, display.height);
        tracing::info!(
            width,
            height,
            "uinput pointer device created"
        );

        Ok(Self { device, display })
    }

    pub fn is_supported() -> bool {
        std::fs::OpenOptions::new()
            .write(true)
            .open(UINPUT_PATH)
            .is_ok()
    }

    fn emit(&mut self, events: &[InputEvent]) -> GestureflowResult<()> {
        self.device
            .emit(events)
            .map_err(|e| GestureflowError::execution(format!("uinput write failed: {e}")))
    }
}

fn build_device(display: DisplaySize) -> std::io::Result<VirtualDevice> {
    let mut keys = AttributeSet::<Key>::new();
    keys.insert(Key::BTN_LEFT);
    keys.insert(Key::KEY_LEFTCTRL);

    let mut wheel = AttributeSet::<RelativeAxisType>::new();
    wheel.insert(RelativeAxisType::REL_WHEEL);

    let abs_x = UinputAbsSetup::new(
        AbsoluteAxisType::ABS_X,
        AbsInfo::new(0, 0, display.width as i32, 0, 0, 0),
    );
    let abs_y = UinputAbsSetup::new(
        AbsoluteAxisType::ABS_Y,
        AbsInfo::new(0, 0, display.height as i32, 0, 0, 0),
    );

    VirtualDeviceBuilder::new()?
        .name(DEVICE_NAME)
        .with_keys(&keys)?
        .with_relative_axes(&wheel)?
        .with_absolute_axis(&abs_x)?
        .with_absolute_axis(&abs_y)?
        .build()
}

impl InputInjector for UinputInjector {
    fn name(&self) -> &str {
        "uinput"
    }

    fn display(&self) -> DisplaySize {
        self.display
    }

    fn move_cursor(&mut self, x: i32, y: i32) -> GestureflowResult<()> {
        self.emit(&[
            InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_X.0, x),
            InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_Y.0, y),
        ])
    }

    fn ctrl_wheel(&mut self, notches: i32) -> GestureflowResult<()> {
        let direction = notches.signum();
        for _ in 0..notches.abs() {
            self.emit(&[InputEvent::new(EventType::KEY, Key::KEY_LEFTCTRL.code(), 1)])?;
            self.emit(&[InputEvent::new(
                EventType::RELATIVE,
                RelativeAxisType::REL_WHEEL.0,
                direction,
            )])?;
            self.emit(&[InputEvent::new(EventType::KEY, Key::KEY_LEFTCTRL.code(), 0)])?;
        }
        Ok(())
    }
}

/// Human-readable explanation of why `/dev/uinput` is not usable.
pub fn uinput_diagnostic() -> String {
    let uid = unsafe { libc::geteuid() };
    let gid = unsafe { libc::getegid() };

    match std::fs::metadata(UINPUT_PATH) {
        Ok(meta) => {
            let mode = meta.mode() & 0o777;
            format!(
                "device={UINPUT_PATH} mode={mode:o} owner_uid={} owner_gid={} process_uid={uid} process_gid={gid}; grant write access (e.g. a udev rule adding the 'input' group) and log out/in",
                meta.uid(),
                meta.gid()
            )
        }
        Err(err) => format!(
            "device={UINPUT_PATH} unavailable ({err}); load the module with: sudo modprobe uinput"
        ),
    }
}

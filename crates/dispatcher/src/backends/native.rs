//! Tier 1: native input injection.

use std::sync::Mutex;

use async_trait::async_trait;
use gestureflow_common::error::{GestureflowError, GestureflowResult};
use gestureflow_platform_core::{denormalize_coords, wheel_notches, DisplaySize, InputInjector};

use crate::action::{ActionClass, TargetAction};
use crate::executor::{ActionExecutor, ActionOutcome, Tier};

pub struct NativeExecutor {
    name: String,
    injector: Mutex<Box<dyn InputInjector>>,
}

impl NativeExecutor {
    pub fn new(injector: Box<dyn InputInjector>) -> Self {
        Self {
            name: format!("native:{}", injector.name()),
            injector: Mutex::new(injector),
        }
    }

    /// Open the platform injector, or `None` when this system has none.
    #[cfg(target_os = "linux")]
    pub fn detect(display: DisplaySize) -> Option<Self> {
        match gestureflow_platform_linux::UinputInjector::new(display) {
            Ok(injector) => Some(Self::new(Box::new(injector))),
            Err(e) => {
                tracing::info!(error = %e, "Native input injection unavailable");
                None
            }
        }
    }

    #[cfg(not(target_os = "linux"))]
    pub fn detect(_display: DisplaySize) -> Option<Self> {
        tracing::info!("Native input injection is not implemented on this platform");
        None
    }
}

#[async_trait]
impl ActionExecutor for NativeExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    fn tier(&self) -> Tier {
        Tier::Native
    }

    fn supports(&self, class: ActionClass) -> bool {
        matches!(class, ActionClass::Pointer | ActionClass::Zoom)
    }

    async fn execute(&self, action: &TargetAction) -> GestureflowResult<ActionOutcome> {
        let mut injector = self
            .injector
            .lock()
            .map_err(|_| GestureflowError::execution("native injector lock poisoned"))?;

        match *action {
            TargetAction::CursorMove { x, y } => {
                let (px, py) = denormalize_coords(x, y, injector.display());
                injector.move_cursor(px, py)?;
            }
            TargetAction::ZoomIn | TargetAction::ZoomOut => {
                let delta = action.zoom_delta().unwrap_or_default();
                injector.ctrl_wheel(wheel_notches(delta))?;
            }
            _ => {
                return Err(GestureflowError::unsupported(format!(
                    "{} cannot perform {action:?}",
                    self.name
                )));
            }
        }
        Ok(ActionOutcome::Executed)
    }
}

/// Records injected input instead of touching the OS.
#[cfg(test)]
pub(crate) mod recording {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Injected {
        Move(i32, i32),
        Wheel(i32),
    }

    pub struct RecordingInjector {
        pub display: DisplaySize,
        pub log: Arc<Mutex<Vec<Injected>>>,
    }

    impl InputInjector for RecordingInjector {
        fn name(&self) -> &str {
            "recording"
        }

        fn display(&self) -> DisplaySize {
            self.display
        }

        fn move_cursor(&mut self, x: i32, y: i32) -> GestureflowResult<()> {
            self.log.lock().unwrap().push(Injected::Move(x, y));
            Ok(())
        }

        fn ctrl_wheel(&mut self, notches: i32) -> GestureflowResult<()> {
            self.log.lock().unwrap().push(Injected::Wheel(notches));
            Ok(())
        }
    }

    pub fn recording_executor(display: DisplaySize) -> (NativeExecutor, Arc<Mutex<Vec<Injected>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let injector = RecordingInjector {
            display,
            log: log.clone(),
        };
        (NativeExecutor::new(Box::new(injector)), log)
    }
}

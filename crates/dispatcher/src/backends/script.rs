//! Tier 3: one-shot automation scripts.
//!
//! Each call builds a complete script for the action, runs it through the
//! configured interpreter, and decodes the exit status:
//!
//! | exit | stdout marker | outcome |
//! |---|---|---|
//! | 0 | | executed |
//! | 3 | | no host instance |
//! | 4 | `NoPresentation` | no document |
//! | 4 | `NoSlideShow` | no active session |
//! | other | | execution error |
//!
//! Calls are not time-bounded; a hung interpreter stalls only its own
//! action.

use std::process::Stdio;

use async_trait::async_trait;
use gestureflow_common::config::ExternalCommand;
use gestureflow_common::error::{GestureflowError, GestureflowResult};
use tokio::process::Command;

use crate::action::{ActionClass, TargetAction};
use crate::executor::{ActionExecutor, ActionOutcome, Tier};

pub const EXIT_EXECUTED: i32 = 0;
pub const EXIT_NO_HOST: i32 = 3;
pub const EXIT_HOST_STATE: i32 = 4;

pub const MARKER_NO_DOCUMENT: &str = "NoPresentation";
pub const MARKER_NO_SESSION: &str = "NoSlideShow";

/// Produces the script text passed as the interpreter's last argument.
pub trait ScriptBuilder: Send + Sync {
    fn build(&self, action: &TargetAction) -> String;
}

/// PowerShell scripts driving the presentation host over COM and the
/// cursor through user32.
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerShellScripts;

const PRESENTATION_SCRIPT: &str = r#"
try { $pp = [Runtime.InteropServices.Marshal]::GetActiveObject('PowerPoint.Application') } catch { Write-Output 'NoPowerPoint'; exit 3 }
try {
    if ($pp.SlideShowWindows.Count -gt 0) {
        $view = $pp.SlideShowWindows.Item(1).View
        switch ('__ACTION__') {
            'next' { $view.Next() }
            'prev' { $view.Previous() }
            'stop' { $view.Exit() }
            'close' { $view.Exit() }
            'start' { $pp.ActivePresentation.SlideShowSettings.Run() | Out-Null }
            default { }
        }
        exit 0
    } elseif ('__ACTION__' -eq 'start') {
        if ($pp.Presentations.Count -gt 0) { $pp.ActivePresentation.SlideShowSettings.Run() | Out-Null; exit 0 }
        Write-Output 'NoPresentation'; exit 4
    } else {
        Write-Output 'NoSlideShow'; exit 4
    }
} catch { Write-Output ('CmdError ' + $_.Exception.Message); exit 5 }
"#;

const CURSOR_SCRIPT: &str = r#"
Add-Type -AssemblyName System.Windows.Forms
$w = [System.Windows.Forms.SystemInformation]::PrimaryMonitorSize.Width
$h = [System.Windows.Forms.SystemInformation]::PrimaryMonitorSize.Height
$x = [int]([math]::Round(__X__ * $w))
$y = [int]([math]::Round(__Y__ * $h))
Add-Type @"
using System; using System.Runtime.InteropServices;
public class GfCursor { [DllImport("user32.dll")] public static extern bool SetCursorPos(int X, int Y); }
"@
[GfCursor]::SetCursorPos($x, $y) | Out-Null
"#;

const WHEEL_SCRIPT: &str = r#"
Add-Type @"
using System; using System.Runtime.InteropServices;
public class GfInput {
    [DllImport("user32.dll")] public static extern void keybd_event(byte bVk, byte bScan, uint dwFlags, UIntPtr dwExtraInfo);
    [DllImport("user32.dll")] public static extern void mouse_event(uint dwFlags, uint dx, uint dy, int dwData, UIntPtr dwExtraInfo);
}
"@
for ($i = 0; $i -lt __STEPS__; $i++) {
    [GfInput]::keybd_event(0x11, 0, 0, [UIntPtr]::Zero)
    Start-Sleep -Milliseconds 10
    [GfInput]::mouse_event(0x0800, 0, 0, __WHEEL__, [UIntPtr]::Zero)
    Start-Sleep -Milliseconds 10
    [GfInput]::keybd_event(0x11, 0, 2, [UIntPtr]::Zero)
}
"#;

/// One wheel notch in Win32 units.
const WHEEL_DELTA: i32 = 120;

impl ScriptBuilder for PowerShellScripts {
    fn build(&self, action: &TargetAction) -> String {
        match *action {
            TargetAction::CursorMove { x, y } => CURSOR_SCRIPT
                .replace("__X__", &format!("{:.6}", x.clamp(0.0, 1.0)))
                .replace("__Y__", &format!("{:.6}", y.clamp(0.0, 1.0))),
            TargetAction::ZoomIn | TargetAction::ZoomOut => {
                let notches =
                    gestureflow_platform_core::wheel_notches(action.zoom_delta().unwrap_or_default());
                WHEEL_SCRIPT
                    .replace("__STEPS__", &notches.abs().to_string())
                    .replace("__WHEEL__", &(notches.signum() * WHEEL_DELTA).to_string())
            }
            _ => {
                let slide = action
                    .slide_action()
                    .map(|a| a.as_str())
                    .unwrap_or_default();
                PRESENTATION_SCRIPT.replace("__ACTION__", slide)
            }
        }
    }
}

/// Map an interpreter's exit code and output to an outcome.
pub fn decode_script_status(
    code: Option<i32>,
    stdout: &str,
    stderr: &str,
) -> GestureflowResult<ActionOutcome> {
    match code {
        Some(EXIT_EXECUTED) => Ok(ActionOutcome::Executed),
        Some(EXIT_NO_HOST) => Ok(ActionOutcome::NoHostInstance),
        Some(EXIT_HOST_STATE) if stdout.contains(MARKER_NO_DOCUMENT) => Ok(ActionOutcome::NoDocument),
        Some(EXIT_HOST_STATE) if stdout.contains(MARKER_NO_SESSION) => {
            Ok(ActionOutcome::NoActiveSession)
        }
        _ => {
            let detail = [stdout.trim(), stderr.trim()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("; ");
            let status = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
            Err(GestureflowError::execution(format!(
                "script exited with {status}: {detail}"
            )))
        }
    }
}

pub struct ScriptExecutor {
    name: String,
    command: ExternalCommand,
    builder: Box<dyn ScriptBuilder>,
}

impl ScriptExecutor {
    pub fn new(command: ExternalCommand, builder: Box<dyn ScriptBuilder>) -> Self {
        Self {
            name: format!("script:{}", command.program),
            command,
            builder,
        }
    }

    /// The production PowerShell executor.
    pub fn powershell(command: ExternalCommand) -> Self {
        Self::new(command, Box::new(PowerShellScripts))
    }
}

#[async_trait]
impl ActionExecutor for ScriptExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    fn tier(&self) -> Tier {
        Tier::Script
    }

    fn supports(&self, _class: ActionClass) -> bool {
        true
    }

    async fn execute(&self, action: &TargetAction) -> GestureflowResult<ActionOutcome> {
        let script = self.builder.build(action);
        let output = Command::new(&self.command.program)
            .args(&self.command.args)
            .arg(&script)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                GestureflowError::execution(format!("failed to run {}: {e}", self.command.program))
            })?;

        decode_script_status(
            output.status.code(),
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_exit_codes() {
        assert_eq!(decode_script_status(Some(0), "", "").unwrap(), ActionOutcome::Executed);
        assert_eq!(
            decode_script_status(Some(3), "NoPowerPoint\n", "").unwrap(),
            ActionOutcome::NoHostInstance
        );
        assert_eq!(
            decode_script_status(Some(4), "NoPresentation\n", "").unwrap(),
            ActionOutcome::NoDocument
        );
        assert_eq!(
            decode_script_status(Some(4), "NoSlideShow\n", "").unwrap(),
            ActionOutcome::NoActiveSession
        );
    }

    #[test]
    fn test_decode_failures() {
        let err = decode_script_status(Some(5), "CmdError boom\n", "").unwrap_err();
        assert!(err.to_string().contains("CmdError boom"));
        assert!(decode_script_status(Some(4), "", "").is_err());
        assert!(decode_script_status(None, "", "killed").is_err());
    }

    #[test]
    fn test_powershell_presentation_script() {
        let script = PowerShellScripts.build(&TargetAction::Close);
        assert!(script.contains("switch ('close')"));
        assert!(script.contains("'close' { $view.Exit() }"));
        assert!(!script.contains("__ACTION__"));
    }

    #[test]
    fn test_powershell_cursor_and_wheel_scripts() {
        let cursor = PowerShellScripts.build(&TargetAction::CursorMove { x: 0.25, y: 1.5 });
        assert!(cursor.contains("Round(0.250000 * $w)"));
        assert!(cursor.contains("Round(1.000000 * $h)"));

        let zoom_out = PowerShellScripts.build(&TargetAction::ZoomOut);
        assert!(zoom_out.contains("$i -lt 1;"));
        assert!(zoom_out.contains("0x0800, 0, 0, -120,"));
    }
}

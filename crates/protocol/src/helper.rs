//! Commands written to the persistent helper process, one JSON object per
//! line on its stdin.
//!
//! ```text
//! {"cmd":"ppt","action":"next"}
//! {"cmd":"cursor","x":0.5,"y":0.5}
//! {"cmd":"wheel","delta":-1}
//! ```

use gestureflow_common::error::GestureflowResult;
use serde::{Deserialize, Serialize};

/// Slide-show operation understood by the presentation host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideAction {
    Next,
    Prev,
    Stop,
    Start,
    Close,
    Laser,
}

impl SlideAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::Prev => "prev",
            Self::Stop => "stop",
            Self::Start => "start",
            Self::Close => "close",
            Self::Laser => "laser",
        }
    }
}

impl std::fmt::Display for SlideAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A helper command. Exhaustively matched on both sides of the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
pub enum HelperCommand {
    /// Presentation control.
    Ppt { action: SlideAction },

    /// Move the cursor to normalized coordinates.
    Cursor { x: f64, y: f64 },

    /// Ctrl + wheel notches; positive zooms in.
    Wheel { delta: i32 },
}

impl HelperCommand {
    /// Encode as a single newline-terminated line.
    pub fn encode_line(&self) -> GestureflowResult<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_lines_match_contract() {
        let cases = [
            (
                HelperCommand::Ppt {
                    action: SlideAction::Next,
                },
                "{\"cmd\":\"ppt\",\"action\":\"next\"}\n",
            ),
            (
                HelperCommand::Cursor { x: 0.5, y: 0.75 },
                "{\"cmd\":\"cursor\",\"x\":0.5,\"y\":0.75}\n",
            ),
            (
                HelperCommand::Wheel { delta: -1 },
                "{\"cmd\":\"wheel\",\"delta\":-1}\n",
            ),
        ];

        for (command, expected) in cases {
            assert_eq!(command.encode_line().unwrap(), expected);
        }
    }

    #[test]
    fn test_slide_action_names() {
        for action in [
            SlideAction::Next,
            SlideAction::Prev,
            SlideAction::Stop,
            SlideAction::Start,
            SlideAction::Close,
            SlideAction::Laser,
        ] {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{action}\""));
        }
    }
}

//! Message → action mapping.

use gestureflow_protocol::gesture::GestureLabel;
use gestureflow_protocol::helper::{HelperCommand, SlideAction};
use gestureflow_protocol::message::ActionMessage;

/// An OS-level action to perform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetAction {
    Next,
    Prev,
    ZoomIn,
    ZoomOut,
    Start,
    Close,
    Laser,
    /// Normalized coordinates; executors scale to their display.
    CursorMove { x: f64, y: f64 },
}

/// Groups of actions that share an executor route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionClass {
    Pointer,
    Zoom,
    Presentation,
}

impl ActionClass {
    pub const ALL: [ActionClass; 3] = [
        ActionClass::Pointer,
        ActionClass::Zoom,
        ActionClass::Presentation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pointer => "pointer",
            Self::Zoom => "zoom",
            Self::Presentation => "presentation",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Pointer => 0,
            Self::Zoom => 1,
            Self::Presentation => 2,
        }
    }
}

impl std::fmt::Display for ActionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TargetAction {
    pub fn class(&self) -> ActionClass {
        match self {
            Self::CursorMove { .. } => ActionClass::Pointer,
            Self::ZoomIn | Self::ZoomOut => ActionClass::Zoom,
            Self::Next | Self::Prev | Self::Start | Self::Close | Self::Laser => {
                ActionClass::Presentation
            }
        }
    }

    /// Slide-show operation for presentation actions.
    pub fn slide_action(&self) -> Option<SlideAction> {
        match self {
            Self::Next => Some(SlideAction::Next),
            Self::Prev => Some(SlideAction::Prev),
            Self::Start => Some(SlideAction::Start),
            Self::Close => Some(SlideAction::Close),
            Self::Laser => Some(SlideAction::Laser),
            Self::ZoomIn | Self::ZoomOut | Self::CursorMove { .. } => None,
        }
    }

    /// Signed wheel delta for zoom actions; positive zooms in.
    pub fn zoom_delta(&self) -> Option<f64> {
        match self {
            Self::ZoomIn => Some(1.0),
            Self::ZoomOut => Some(-1.0),
            _ => None,
        }
    }

    /// The helper-process command carrying this action.
    pub fn helper_command(&self) -> HelperCommand {
        match *self {
            Self::CursorMove { x, y } => HelperCommand::Cursor { x, y },
            Self::ZoomIn => HelperCommand::Wheel { delta: 1 },
            Self::ZoomOut => HelperCommand::Wheel { delta: -1 },
            Self::Next => HelperCommand::Ppt {
                action: SlideAction::Next,
            },
            Self::Prev => HelperCommand::Ppt {
                action: SlideAction::Prev,
            },
            Self::Start => HelperCommand::Ppt {
                action: SlideAction::Start,
            },
            Self::Close => HelperCommand::Ppt {
                action: SlideAction::Close,
            },
            Self::Laser => HelperCommand::Ppt {
                action: SlideAction::Laser,
            },
        }
    }
}

/// Fixed mapping table. `None` for messages that map to nothing.
pub fn map_message(message: &ActionMessage) -> Option<TargetAction> {
    match *message {
        ActionMessage::Pointer { x, y } => Some(TargetAction::CursorMove { x, y }),
        ActionMessage::Gesture { gesture } => match gesture {
            GestureLabel::SwipeRight => Some(TargetAction::Next),
            GestureLabel::SwipeLeft => Some(TargetAction::Prev),
            GestureLabel::Pinch => Some(TargetAction::ZoomOut),
            GestureLabel::Spread => Some(TargetAction::ZoomIn),
            GestureLabel::OpenPalm => Some(TargetAction::Start),
            GestureLabel::ClosedFist => Some(TargetAction::Close),
            GestureLabel::Pointing => Some(TargetAction::Laser),
            GestureLabel::None => None,
        },
    }
}

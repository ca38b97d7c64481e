use crate::layer::OverlayId;
use crate::shape::ShapeKind;

/// Notification emitted by the [`Editor`](super::Editor) as the user draws and edits overlays.
///
/// Events are queued in the [`EditSession`](super::EditSession) and delivered to the drawing
/// control by the host after every user action.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EditEvent {
    /// Drawing of a new overlay started.
    DrawingStart {
        /// The overlay being drawn.
        overlay: OverlayId,
        /// Kind of the drawn shape.
        kind: ShapeKind,
    },
    /// Drawing was finished by the user or by [`EditSession::commit_drawing`](super::EditSession::commit_drawing).
    DrawingCommit {
        /// The drawn overlay.
        overlay: OverlayId,
    },
    /// Drawing was stopped before it was committed.
    DrawingCancel {
        /// The overlay that was being drawn. It is still on the map.
        overlay: OverlayId,
    },
    /// Editing of an overlay was enabled.
    Enable {
        /// The editable overlay.
        overlay: OverlayId,
    },
    /// Editing of an overlay was disabled.
    Disable {
        /// The overlay that is not editable anymore.
        overlay: OverlayId,
    },
    /// Geometry of an overlay was changed by the user.
    Editing {
        /// The changed overlay.
        overlay: OverlayId,
    },
}

impl EditEvent {
    /// The overlay the event is about.
    pub fn overlay(&self) -> OverlayId {
        match self {
            EditEvent::DrawingStart { overlay, .. }
            | EditEvent::DrawingCommit { overlay }
            | EditEvent::DrawingCancel { overlay }
            | EditEvent::Enable { overlay }
            | EditEvent::Disable { overlay }
            | EditEvent::Editing { overlay } => *overlay,
        }
    }
}

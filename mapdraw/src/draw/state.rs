use super::DrawMode;

/// State of a drawing control.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum DrawState {
    /// No tool is active.
    #[default]
    Idle,
    /// The user draws a new shape with the given tool.
    Drawing(DrawMode),
    /// The user edits an existing shape.
    Editing(DrawMode),
}

/// Input of the [`DrawState`] machine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transition {
    /// A tool was selected in the control, or the selection was cleared.
    ModeSelected(Option<DrawMode>),
    /// The drawn shape was committed.
    Commit,
    /// Drawing was cancelled.
    Cancel,
    /// Editing of an existing shape of the given mode started.
    EditEnabled(DrawMode),
    /// Editing of the shape finished.
    EditDisabled,
}

impl DrawState {
    /// State after the transition.
    ///
    /// Selecting [`DrawMode::Delete`] leads to [`DrawState::Idle`], since deleting is done at
    /// once and does not start any gesture.
    pub fn apply(self, transition: Transition) -> DrawState {
        let next = match (self, transition) {
            (_, Transition::ModeSelected(Some(DrawMode::Delete))) => DrawState::Idle,
            (_, Transition::ModeSelected(Some(mode))) => DrawState::Drawing(mode),
            (_, Transition::ModeSelected(None)) => DrawState::Idle,
            (_, Transition::Commit | Transition::Cancel) => DrawState::Idle,
            (_, Transition::EditEnabled(mode)) => DrawState::Editing(mode),
            (DrawState::Editing(_), Transition::EditDisabled) => DrawState::Idle,
            (state, Transition::EditDisabled) => state,
        };

        if next != self {
            log::debug!("Draw state {self:?} -> {next:?} on {transition:?}");
        }

        next
    }

    /// Selected tool, if any.
    pub fn mode(&self) -> Option<DrawMode> {
        match self {
            DrawState::Idle => None,
            DrawState::Drawing(mode) | DrawState::Editing(mode) => Some(*mode),
        }
    }

    /// True while a new shape is drawn.
    pub fn is_drawing(&self) -> bool {
        matches!(self, DrawState::Drawing(_))
    }

    /// True while an existing shape is edited.
    pub fn is_editing(&self) -> bool {
        matches!(self, DrawState::Editing(_))
    }

    /// True in any state but [`DrawState::Idle`].
    pub fn is_active(&self) -> bool {
        *self != DrawState::Idle
    }
}

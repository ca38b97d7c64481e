use geojson::Feature;

use super::{
    normalize, BufferWidthRequest, ControlPosition, DrawMode, DrawState, DrawingControl,
    GeometryReport, GeometrySink, Normalized, Transition, NOT_ENOUGH_VERTICES_MESSAGE,
};
use crate::edit::{EditEvent, EditSession};
use crate::error::DrawError;
use crate::layer::OverlayId;
use crate::shape::Shape;

/// Control with a tool for every shape kind.
///
/// Every committed shape is converted into a polygon feature (see [`normalize`]) and reported as
/// a one-element [`GeometryReport::Features`]. A committed line is converted only after the user
/// answers the [`BufferWidthRequest`]:
///
/// ```
/// use mapdraw::draw::{DrawToolbox, GeometryReport};
///
/// let mut toolbox = DrawToolbox::new(|_: GeometryReport| {});
/// // after a line is drawn, the UI checks for the question and shows it:
/// if let Some(request) = toolbox.buffer_width_request() {
///     println!("{} [{}]", request.message(), request.default_value());
/// }
/// ```
///
/// The last committed shape stays on the map until another tool is selected.
pub struct DrawToolbox<S: GeometrySink> {
    sink: S,
    position: ControlPosition,
    state: DrawState,
    shape: Option<OverlayId>,
    last_feature: Option<Feature>,
    pending: Option<BufferWidthRequest>,
    prompt_open: bool,
}

impl<S: GeometrySink> DrawToolbox<S> {
    /// Creates a new toolbox reporting to the sink.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            position: ControlPosition::default(),
            state: DrawState::Idle,
            shape: None,
            last_feature: None,
            pending: None,
            prompt_open: false,
        }
    }

    /// Sets the corner the toolbox is placed in.
    pub fn with_position(mut self, position: ControlPosition) -> Self {
        self.position = position;
        self
    }

    /// State of the toolbox.
    pub fn state(&self) -> DrawState {
        self.state
    }

    /// Selected tool.
    pub fn mode(&self) -> Option<DrawMode> {
        self.state.mode()
    }

    /// The active overlay: the one being drawn or edited, or the last committed one.
    pub fn shape(&self) -> Option<OverlayId> {
        self.shape
    }

    /// The last reported feature.
    pub fn last_feature(&self) -> Option<&Feature> {
        self.last_feature.as_ref()
    }

    /// The geometry sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Question the UI should show to the user, if any.
    pub fn buffer_width_request(&self) -> Option<&BufferWidthRequest> {
        self.pending.as_ref().filter(|_| self.prompt_open)
    }

    /// True if a drawn line waits for the buffer width, even if the question was dismissed.
    pub fn has_pending_request(&self) -> bool {
        self.pending.is_some()
    }

    /// Selects a tool, or clears the selection with `None`.
    ///
    /// Selecting a shape tool removes the active overlay and starts drawing a new one.
    /// [`DrawMode::Delete`] removes the active overlay and reports [`GeometryReport::Cleared`].
    /// A line waiting for the buffer width is discarded in any case.
    pub fn select_mode(&mut self, mode: Option<DrawMode>, session: &mut EditSession) {
        self.discard_pending(session);
        self.state = self.state.apply(Transition::ModeSelected(mode));

        match mode {
            Some(DrawMode::Delete) => {
                self.remove_shape(session);
                session.stop_drawing();
                self.sink.set_geometry(GeometryReport::Cleared);
            }
            Some(mode) => {
                if let Some(kind) = mode.shape_kind() {
                    self.remove_shape(session);
                    self.shape = Some(session.start_drawing(kind));
                }
            }
            None => session.stop_drawing(),
        }
    }

    /// Finishes the current shape. A new drawing is committed; an edited shape has its editing
    /// disabled, which commits the changes.
    pub fn finish(&mut self, session: &mut EditSession) -> Result<(), DrawError> {
        if self.state.is_editing() {
            let id = self.shape.ok_or(DrawError::NoActiveShape)?;
            session.disable_edit(id)
        } else {
            session.commit_drawing();
            Ok(())
        }
    }

    /// Stops drawing or editing. Nothing is reported.
    pub fn cancel(&mut self, session: &mut EditSession) {
        if self.state.is_drawing() {
            session.stop_drawing();
        } else if self.state.is_editing() {
            self.state = self.state.apply(Transition::Cancel);
            if let Some(id) = self.shape {
                if let Err(err) = session.disable_edit(id) {
                    log::warn!("Failed to stop editing overlay {id}: {err}");
                }
            }
        }
    }

    /// Turns the last reported feature back into an editable overlay.
    ///
    /// The feature is withdrawn from the application with an empty
    /// [`GeometryReport::Features`] until editing is finished.
    pub fn edit_existing(&mut self, session: &mut EditSession) -> Result<(), DrawError> {
        let feature = self.last_feature.as_ref().ok_or(DrawError::NothingToEdit)?;
        let geometry = feature
            .geometry
            .as_ref()
            .ok_or_else(|| DrawError::Geometry("feature has no geometry".into()))?;
        let shape = Shape::from_geometry(geometry)?;
        let mode = DrawMode::from(shape.kind());

        self.discard_pending(session);
        self.remove_shape(session);
        session.stop_drawing();

        let id = session.add_overlay(shape);
        self.shape = Some(id);
        session.enable_edit(id)?;

        self.sink.set_geometry(GeometryReport::Features(vec![]));
        self.state = self.state.apply(Transition::EditEnabled(mode));

        Ok(())
    }

    /// Answers the buffer width question. On success the buffered line is reported.
    ///
    /// Invalid input is rejected with [`DrawError::InvalidBufferWidth`] and the question stays
    /// open.
    pub fn respond_buffer_width(
        &mut self,
        input: &str,
        session: &mut EditSession,
    ) -> Result<(), DrawError> {
        let request = self.pending.as_ref().ok_or(DrawError::NoPendingRequest)?;
        let width = match BufferWidthRequest::parse_width(input) {
            Ok(width) => width,
            Err(err) => {
                log::warn!("Buffer width rejected: {err}");
                return Err(err);
            }
        };

        let result = request.resolve(width, session.editor().options().precision);
        let overlay = request.overlay();
        self.pending = None;
        self.prompt_open = false;

        match result {
            Ok(feature) => {
                log::debug!("Line {overlay} buffered by {width} m");
                self.report(feature);
                Ok(())
            }
            Err(err) => {
                self.discard(overlay, session);
                Err(err)
            }
        }
    }

    /// Dismisses the buffer width question. Nothing is reported, the line stays on the map
    /// until the question is asked again with [`DrawToolbox::retry_buffer_width`] or another
    /// action discards it.
    pub fn cancel_buffer_width(&mut self) {
        if self.prompt_open {
            log::debug!("Buffer width question dismissed");
        }

        self.prompt_open = false;
    }

    /// Asks the buffer width question again.
    pub fn retry_buffer_width(&mut self) -> Result<(), DrawError> {
        if self.pending.is_none() {
            return Err(DrawError::NoPendingRequest);
        }

        self.prompt_open = true;
        Ok(())
    }

    fn report(&mut self, feature: Feature) {
        self.last_feature = Some(feature.clone());
        self.sink.set_geometry(GeometryReport::Features(vec![feature]));
    }

    fn remove_shape(&mut self, session: &mut EditSession) {
        if let Some(id) = self.shape.take() {
            session.remove_overlay(id);
        }
    }

    fn discard(&mut self, overlay: OverlayId, session: &mut EditSession) {
        session.remove_overlay(overlay);
        if self.shape == Some(overlay) {
            self.shape = None;
        }
    }

    fn discard_pending(&mut self, session: &mut EditSession) {
        self.prompt_open = false;
        if let Some(request) = self.pending.take() {
            log::debug!("Line {} waiting for buffer width discarded", request.overlay());
            self.discard(request.overlay(), session);
        }
    }

    fn convert(&mut self, overlay: OverlayId, session: &mut EditSession) {
        let Some(entry) = session.map().overlay(overlay) else {
            return;
        };

        let precision = session.editor().options().precision;
        match normalize(overlay, entry.shape(), precision) {
            Ok(Normalized::Ready(feature)) => self.report(feature),
            Ok(Normalized::NeedsBufferWidth(request)) => {
                self.pending = Some(request);
                self.prompt_open = true;
            }
            Err(err) => {
                log::warn!("Shape {overlay} discarded: {err}");
                self.sink.alert(NOT_ENOUGH_VERTICES_MESSAGE);
                self.discard(overlay, session);
            }
        }
    }
}

impl<S: GeometrySink> DrawingControl for DrawToolbox<S> {
    fn position(&self) -> ControlPosition {
        self.position
    }

    fn on_edit_event(&mut self, event: &EditEvent, session: &mut EditSession) {
        if self.shape != Some(event.overlay()) {
            return;
        }

        match *event {
            EditEvent::DrawingCommit { overlay } => {
                self.state = self.state.apply(Transition::Commit);
                self.convert(overlay, session);
                if session.map().overlay(overlay).is_some() {
                    if let Err(err) = session.disable_edit(overlay) {
                        log::warn!("Failed to stop editing overlay {overlay}: {err}");
                    }
                }
            }
            EditEvent::DrawingCancel { overlay } => {
                self.discard(overlay, session);
                self.state = self.state.apply(Transition::Cancel);
            }
            EditEvent::Disable { overlay } if self.state.is_editing() => {
                self.state = self.state.apply(Transition::EditDisabled);
                self.convert(overlay, session);
            }
            EditEvent::DrawingStart { overlay, kind } => {
                log::debug!("Drawing {kind:?} overlay {overlay}");
            }
            EditEvent::Enable { overlay } => log::debug!("Editing overlay {overlay}"),
            EditEvent::Editing { overlay } => log::trace!("Overlay {overlay} changed"),
            EditEvent::Disable { .. } => {}
        }
    }
}

use geojson::Feature;

use super::{
    ControlPosition, DrawMode, DrawState, DrawingControl, GeometryReport, GeometrySink,
    Transition, NOT_ENOUGH_VERTICES_MESSAGE,
};
use crate::edit::{EditEvent, EditSession};
use crate::error::DrawError;
use crate::layer::OverlayId;
use crate::shape::{rectangle_from_feature, Shape};

/// Control that draws a single rectangle.
///
/// The control has one shape button and three actions:
/// * **new shape** ([`SimpleDrawControl::new_shape`]) clears the current geometry and starts
///   drawing a new rectangle;
/// * **edit** ([`SimpleDrawControl::edit`]) makes the saved rectangle editable again;
/// * **save** ([`SimpleDrawControl::save`]) finishes editing and reports the rectangle as a
///   [`GeometryReport::Feature`];
/// * **delete** ([`SimpleDrawControl::delete`]) removes the rectangle and reports
///   [`GeometryReport::Cleared`].
///
/// At most one rectangle of the control is on the map at any time.
pub struct SimpleDrawControl<S: GeometrySink> {
    sink: S,
    position: ControlPosition,
    state: DrawState,
    shape: Option<OverlayId>,
    geometry: Option<Feature>,
    initial_geometry: Option<Feature>,
}

impl<S: GeometrySink> SimpleDrawControl<S> {
    /// Mode the control draws in.
    pub const MODE: DrawMode = DrawMode::Rectangle;

    /// Creates a new control reporting to the sink.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            position: ControlPosition::default(),
            state: DrawState::Idle,
            shape: None,
            geometry: None,
            initial_geometry: None,
        }
    }

    /// Sets the corner the control is placed in.
    pub fn with_position(mut self, position: ControlPosition) -> Self {
        self.position = position;
        self
    }

    /// Sets the geometry displayed (as a rectangle) when the control is mounted.
    pub fn with_geometry(mut self, feature: Feature) -> Self {
        self.initial_geometry = Some(feature);
        self
    }

    /// The last saved geometry.
    pub fn geometry(&self) -> Option<&Feature> {
        self.geometry.as_ref()
    }

    /// The rectangle overlay of the control.
    pub fn shape(&self) -> Option<OverlayId> {
        self.shape
    }

    /// State of the control.
    pub fn state(&self) -> DrawState {
        self.state
    }

    /// True while the rectangle is drawn or edited.
    pub fn is_editing(&self) -> bool {
        self.state.is_active()
    }

    /// The geometry sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Clears the current geometry and starts drawing a new rectangle.
    pub fn new_shape(&mut self, session: &mut EditSession) {
        self.sink.set_geometry(GeometryReport::Cleared);
        self.geometry = None;
        self.remove_shape(session);

        self.shape = Some(session.start_rectangle());
        self.state = self
            .state
            .apply(Transition::ModeSelected(Some(Self::MODE)));
    }

    /// Makes the saved rectangle editable. Does nothing if the rectangle is already drawn or
    /// edited.
    ///
    /// The saved geometry is withdrawn from the application ([`GeometryReport::Cleared`]) until
    /// the rectangle is saved again.
    pub fn edit(&mut self, session: &mut EditSession) -> Result<(), DrawError> {
        if self.state.is_active() {
            return Ok(());
        }

        let geometry = self.geometry.as_ref().ok_or(DrawError::NothingToEdit)?;
        let rect = rectangle_from_feature(geometry)?;

        self.remove_shape(session);
        let id = session.add_overlay(Shape::Rectangle(Some(rect)));
        self.shape = Some(id);
        session.enable_edit(id)?;

        self.geometry = None;
        self.sink.set_geometry(GeometryReport::Cleared);
        self.state = self.state.apply(Transition::EditEnabled(Self::MODE));

        Ok(())
    }

    /// Finishes editing of the rectangle. The geometry is reported when the toolkit confirms
    /// that editing is disabled.
    pub fn save(&mut self, session: &mut EditSession) -> Result<(), DrawError> {
        let id = self.shape.ok_or(DrawError::NoActiveShape)?;
        session.disable_edit(id)
    }

    /// Removes the rectangle without saving it and reports [`GeometryReport::Cleared`].
    pub fn delete(&mut self, session: &mut EditSession) {
        self.state = self.state.apply(Transition::Cancel);
        self.remove_shape(session);
        self.geometry = None;
        self.sink.set_geometry(GeometryReport::Cleared);
    }

    fn remove_shape(&mut self, session: &mut EditSession) {
        if let Some(id) = self.shape.take() {
            session.remove_overlay(id);
        }
    }

    fn on_edit_disabled(&mut self, overlay: OverlayId, session: &mut EditSession) {
        let feature = session.to_feature(overlay);
        session.remove_overlay(overlay);
        self.shape = None;
        self.state = self.state.apply(Transition::EditDisabled);
        if self.state.is_active() {
            // saved while the rectangle was still being drawn
            self.state = self.state.apply(Transition::Cancel);
        }

        let result = feature.and_then(|feature| {
            let rect = rectangle_from_feature(&feature)?;
            Ok((feature, rect))
        });

        match result {
            Ok((feature, rect)) => {
                self.sink
                    .set_geometry(GeometryReport::Feature(feature.clone()));
                self.shape = Some(session.add_overlay(Shape::Rectangle(Some(rect))));
                self.geometry = Some(feature);
            }
            Err(err) => {
                log::warn!("Failed to save the rectangle: {err}");
                self.sink.alert(NOT_ENOUGH_VERTICES_MESSAGE);
            }
        }
    }
}

impl<S: GeometrySink> DrawingControl for SimpleDrawControl<S> {
    fn position(&self) -> ControlPosition {
        self.position
    }

    fn on_mount(&mut self, session: &mut EditSession) -> Result<(), DrawError> {
        let Some(feature) = self.initial_geometry.take() else {
            return Ok(());
        };

        let rect = rectangle_from_feature(&feature)?;
        self.shape = Some(session.add_overlay(Shape::Rectangle(Some(rect))));
        self.geometry = Some(feature);

        Ok(())
    }

    fn on_edit_event(&mut self, event: &EditEvent, session: &mut EditSession) {
        if self.shape != Some(event.overlay()) {
            return;
        }

        match event {
            EditEvent::Disable { overlay } => self.on_edit_disabled(*overlay, session),
            EditEvent::DrawingCommit { overlay } => {
                log::debug!("Rectangle {overlay} drawn, waiting for save");
            }
            EditEvent::Enable { overlay } => log::debug!("Editing of rectangle {overlay} enabled"),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use geo_types::{coord, Rect};

    use super::*;
    use crate::tests::{dispatch, draw_rectangle, test_session, RecordingSink};

    fn saved_feature() -> Feature {
        Shape::Rectangle(Some(Rect::new(
            coord! { x: -123.0, y: 54.0 },
            coord! { x: -121.0, y: 56.0 },
        )))
        .to_feature(Some(6))
        .unwrap()
    }

    #[test]
    fn draw_and_save() {
        let mut session = test_session();
        let mut control = SimpleDrawControl::new(RecordingSink::default());

        control.new_shape(&mut session);
        assert_eq!(control.state(), DrawState::Drawing(DrawMode::Rectangle));
        assert_eq!(control.sink().reports, vec![GeometryReport::Cleared]);

        draw_rectangle(&mut session, (100.0, 100.0), (200.0, 150.0));
        dispatch(&mut control, &mut session);
        assert!(control.geometry().is_none());

        control.save(&mut session).unwrap();
        dispatch(&mut control, &mut session);

        let reports = &control.sink().reports;
        assert_eq!(reports.len(), 2);
        assert_matches!(&reports[1], GeometryReport::Feature(_));
        assert_eq!(control.geometry(), reports[1].features().first());
        assert_eq!(control.state(), DrawState::Idle);

        // the edited overlay is replaced by a static one
        assert_eq!(session.map().overlays().len(), 1);
        let shape = control.shape().unwrap();
        assert!(!session.map().overlay(shape).unwrap().is_editing());
    }

    #[test]
    fn new_shape_removes_previous() {
        let mut session = test_session();
        let mut control =
            SimpleDrawControl::new(RecordingSink::default()).with_geometry(saved_feature());
        control.on_mount(&mut session).unwrap();
        let first = control.shape().unwrap();

        control.new_shape(&mut session);
        dispatch(&mut control, &mut session);

        assert!(session.map().overlay(first).is_none());
        assert_eq!(session.map().overlays().len(), 1);
        assert!(control.geometry().is_none());
    }

    #[test]
    fn edit_and_save_round_trip() {
        let mut session = test_session();
        let mut control =
            SimpleDrawControl::new(RecordingSink::default()).with_geometry(saved_feature());
        control.on_mount(&mut session).unwrap();

        control.edit(&mut session).unwrap();
        dispatch(&mut control, &mut session);
        assert!(control.is_editing());
        assert!(control.geometry().is_none());
        assert_eq!(control.sink().reports, vec![GeometryReport::Cleared]);
        let edited = control.shape().unwrap();
        assert!(session.map().overlay(edited).unwrap().is_editing());
        assert_eq!(session.map().overlays().len(), 1);

        // edit while editing does nothing
        control.edit(&mut session).unwrap();
        assert_eq!(control.shape(), Some(edited));

        control.save(&mut session).unwrap();
        dispatch(&mut control, &mut session);

        assert_eq!(
            control.sink().reports.last(),
            Some(&GeometryReport::Feature(saved_feature()))
        );
        assert_eq!(session.map().overlays().len(), 1);
    }

    #[test]
    fn edit_without_geometry() {
        let mut session = test_session();
        let mut control = SimpleDrawControl::new(RecordingSink::default());

        assert_matches!(control.edit(&mut session), Err(DrawError::NothingToEdit));
        assert_matches!(control.save(&mut session), Err(DrawError::NoActiveShape));
        assert!(control.sink().reports.is_empty());
    }

    #[test]
    fn delete_does_not_save() {
        let mut session = test_session();
        let mut control =
            SimpleDrawControl::new(RecordingSink::default()).with_geometry(saved_feature());
        control.on_mount(&mut session).unwrap();
        control.edit(&mut session).unwrap();
        dispatch(&mut control, &mut session);

        control.delete(&mut session);
        dispatch(&mut control, &mut session);

        assert_eq!(
            control.sink().reports,
            vec![GeometryReport::Cleared, GeometryReport::Cleared]
        );
        assert!(session.map().overlays().is_empty());
        assert!(control.shape().is_none());
        assert!(!control.is_editing());
    }

    #[test]
    fn save_before_drawing_alerts() {
        let mut session = test_session();
        let mut control = SimpleDrawControl::new(RecordingSink::default());

        control.new_shape(&mut session);
        control.save(&mut session).unwrap();
        dispatch(&mut control, &mut session);

        assert_eq!(
            control.sink().alerts,
            vec![NOT_ENOUGH_VERTICES_MESSAGE.to_string()]
        );
        assert_eq!(control.sink().reports, vec![GeometryReport::Cleared]);
        assert!(session.map().overlays().is_empty());
        assert!(!control.is_editing());
    }
}

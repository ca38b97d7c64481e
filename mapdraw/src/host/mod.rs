//! Map host: owns the map, the user input pipeline and the mounted drawing control.
//!
//! The host is created before the UI has a map to draw into. It keeps the control until the UI
//! reports that the map surface is ready ([`MapHost::map_ready`]), then builds the [`Map`], binds
//! an [`EditSession`] to it and mounts the control. From that point the UI feeds raw input into
//! [`MapHost::handle_raw_event`] and runs button actions through [`MapHost::act`].

use crate::control::{EventProcessor, MapController, RawUserEvent, UserEventHandler};
use crate::draw::DrawingControl;
use crate::edit::EditSession;
use crate::error::DrawError;
use crate::map::Map;
use crate::messenger::Messenger;
use crate::primitives::Size;

mod options;

pub use options::{HostOptions, LatLng};

/// Host of a map with a drawing control.
pub struct MapHost<C: DrawingControl> {
    options: HostOptions,
    control: C,
    session: Option<EditSession>,
    processor: EventProcessor,
    controller: MapController,
    messenger: Option<Box<dyn Messenger>>,
}

impl<C: DrawingControl> MapHost<C> {
    /// Creates a host waiting for the map to be ready.
    pub fn new(options: HostOptions, control: C) -> Self {
        let controller = MapController::new(options.controller_config());
        Self {
            options,
            control,
            session: None,
            processor: EventProcessor::default(),
            controller,
            messenger: None,
        }
    }

    /// Sets the messenger the map requests redraws with.
    pub fn with_messenger(mut self, messenger: impl Messenger + 'static) -> Self {
        self.set_messenger(messenger);
        self
    }

    /// Sets the messenger the map requests redraws with. Can be called before or after the map
    /// is ready.
    pub fn set_messenger(&mut self, messenger: impl Messenger + 'static) {
        match &mut self.session {
            Some(session) => session.map_mut().set_messenger(Some(messenger)),
            None => self.messenger = Some(Box::new(messenger)),
        }
    }

    /// Creates the map with the given size and mounts the control on it.
    ///
    /// Can be called only once. Subsequent calls fail with [`DrawError::AlreadyMounted`].
    pub fn map_ready(&mut self, size: Size) -> Result<(), DrawError> {
        if self.session.is_some() {
            return Err(DrawError::AlreadyMounted);
        }

        let map = Map::new(
            self.options.initial_view(size),
            self.options.tile_layer.clone(),
            self.messenger.take(),
        );
        let session = self
            .session
            .insert(EditSession::with_options(map, self.options.edit.clone()));

        log::debug!("Map is ready, mounting the control");
        let result = self.control.on_mount(session);
        dispatch_events(&mut self.control, session);
        session.map().redraw();

        result
    }

    /// Returns true if the map is created and the control is mounted.
    pub fn is_ready(&self) -> bool {
        self.session.is_some()
    }

    /// Host options.
    pub fn options(&self) -> &HostOptions {
        &self.options
    }

    /// The drawing control.
    pub fn control(&self) -> &C {
        &self.control
    }

    /// The map, if it is ready.
    pub fn map(&self) -> Option<&Map> {
        self.session.as_ref().map(EditSession::map)
    }

    /// The editing toolkit, if the map is ready.
    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    /// Map controller handling panning and zooming.
    pub fn controller(&self) -> &MapController {
        &self.controller
    }

    /// Runs an action of the control (usually a button click), then delivers all the edit events
    /// the action produced to the control.
    pub fn act<R>(
        &mut self,
        action: impl FnOnce(&mut C, &mut EditSession) -> R,
    ) -> Result<R, DrawError> {
        let session = self.session.as_mut().ok_or(DrawError::MapNotReady)?;
        let result = action(&mut self.control, session);
        dispatch_events(&mut self.control, session);

        Ok(result)
    }

    /// Processes a raw input event. The editing toolkit gets the event first, the map controller
    /// after it. Events received before the map is ready are dropped.
    pub fn handle_raw_event(&mut self, event: RawUserEvent) {
        let Some(session) = self.session.as_mut() else {
            log::trace!("Map is not ready, dropping {event:?}");
            return;
        };

        let (map, editor) = session.parts_mut();
        self.processor.handle(
            event,
            map,
            &mut [editor as &mut dyn UserEventHandler, &mut self.controller],
        );

        dispatch_events(&mut self.control, session);
    }

    /// Changes the size of the map.
    pub fn resize(&mut self, size: Size) {
        if let Some(session) = &mut self.session {
            session.map_mut().set_size(size);
        }
    }

    /// Zooms in by one level. This is the "+" button of the zoom control.
    pub fn zoom_in(&mut self) -> Result<(), DrawError> {
        let session = self.session.as_mut().ok_or(DrawError::MapNotReady)?;
        self.controller.zoom_in(session.map_mut());
        Ok(())
    }

    /// Zooms out by one level. This is the "-" button of the zoom control.
    pub fn zoom_out(&mut self) -> Result<(), DrawError> {
        let session = self.session.as_mut().ok_or(DrawError::MapNotReady)?;
        self.controller.zoom_out(session.map_mut());
        Ok(())
    }
}

fn dispatch_events(control: &mut impl DrawingControl, session: &mut EditSession) {
    while let Some(event) = session.next_event() {
        log::trace!("Edit event: {event:?}");
        control.on_edit_event(&event, session);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use approx::assert_relative_eq;
    use assert_matches::assert_matches;

    use super::*;
    use crate::control::MouseButton;
    use crate::draw::{DrawMode, DrawState, DrawToolbox, GeometryReport, SimpleDrawControl};
    use crate::primitives::Point2d;
    use crate::tests::RecordingSink;
    use crate::tile_schema::web_zoom;

    type TestHost = MapHost<SimpleDrawControl<RecordingSink>>;

    fn host(options: HostOptions) -> TestHost {
        MapHost::new(options, SimpleDrawControl::new(RecordingSink::default()))
    }

    fn ready_host(options: HostOptions) -> TestHost {
        let mut host = host(options);
        host.map_ready(Size::new(400.0, 300.0)).unwrap();
        host
    }

    fn drag(host: &mut TestHost, from: (f64, f64), to: (f64, f64)) {
        host.handle_raw_event(RawUserEvent::PointerMoved(Point2d::new(from.0, from.1)));
        host.handle_raw_event(RawUserEvent::ButtonPressed(MouseButton::Left));
        host.handle_raw_event(RawUserEvent::PointerMoved(Point2d::new(to.0, to.1)));
        host.handle_raw_event(RawUserEvent::ButtonReleased(MouseButton::Left));
    }

    #[test]
    fn actions_wait_for_map() {
        let mut host = host(HostOptions::default());

        assert!(!host.is_ready());
        assert_matches!(
            host.act(|control, session| control.new_shape(session)),
            Err(DrawError::MapNotReady)
        );
        assert_matches!(host.zoom_in(), Err(DrawError::MapNotReady));
        host.handle_raw_event(RawUserEvent::ButtonPressed(MouseButton::Left));

        host.map_ready(Size::new(400.0, 300.0)).unwrap();
        assert!(host.is_ready());
        assert_matches!(
            host.map_ready(Size::new(400.0, 300.0)),
            Err(DrawError::AlreadyMounted)
        );
        assert!(host
            .act(|control, session| control.new_shape(session))
            .is_ok());
    }

    #[test]
    fn mount_draws_initial_geometry() {
        let feature = crate::shape::Shape::Rectangle(Some(geo_types::Rect::new(
            crate::latlng!(54.0, -123.0),
            crate::latlng!(56.0, -121.0),
        )))
        .to_feature(Some(6))
        .unwrap();

        let mut host = MapHost::new(
            HostOptions::default(),
            SimpleDrawControl::new(RecordingSink::default()).with_geometry(feature.clone()),
        );
        host.map_ready(Size::new(400.0, 300.0)).unwrap();

        assert_eq!(host.map().unwrap().overlays().len(), 1);
        assert_eq!(host.control().geometry(), Some(&feature));
    }

    #[test]
    fn map_is_created_from_options() {
        let host = ready_host(HostOptions::default().with_center(40.0, 10.0).with_zoom(8.0));
        let view = host.map().unwrap().view();

        assert_relative_eq!(view.position().y, 40.0, epsilon = 1e-9);
        assert_relative_eq!(view.position().x, 10.0, epsilon = 1e-9);
        assert_relative_eq!(web_zoom(view.resolution()), 8.0, epsilon = 1e-9);
        assert_eq!(view.size(), Size::new(400.0, 300.0));
    }

    #[test]
    fn drag_pans_map_when_idle() {
        let mut host = ready_host(HostOptions::default());
        let before = host.map().unwrap().view().position();

        drag(&mut host, (200.0, 150.0), (250.0, 150.0));

        let after = host.map().unwrap().view().position();
        assert!(after.x < before.x);
        assert_relative_eq!(after.y, before.y, epsilon = 1e-9);
    }

    #[test]
    fn drag_draws_rectangle_while_drawing() {
        let mut host = ready_host(HostOptions::default());
        host.act(|control, session| control.new_shape(session))
            .unwrap();
        let before = *host.map().unwrap().view();

        drag(&mut host, (100.0, 100.0), (200.0, 180.0));
        assert_eq!(host.map().unwrap().view(), &before);

        host.act(|control, session| control.save(session))
            .unwrap()
            .unwrap();

        let reports = &host.control().sink().reports;
        assert_eq!(reports.len(), 2);
        assert_matches!(&reports[1], GeometryReport::Feature(_));
        assert_eq!(host.control().state(), DrawState::Idle);
    }

    fn raw_click<C: DrawingControl>(host: &mut MapHost<C>, x: f64, y: f64) {
        host.handle_raw_event(RawUserEvent::PointerMoved(Point2d::new(x, y)));
        host.handle_raw_event(RawUserEvent::ButtonPressed(MouseButton::Left));
        host.handle_raw_event(RawUserEvent::ButtonReleased(MouseButton::Left));
    }

    #[test]
    fn quick_clicks_place_polygon_vertices() {
        let mut host = MapHost::new(
            HostOptions::default(),
            DrawToolbox::new(RecordingSink::default()),
        );
        host.map_ready(Size::new(400.0, 300.0)).unwrap();
        host.act(|toolbox, session| toolbox.select_mode(Some(DrawMode::Polygon), session))
            .unwrap();

        raw_click(&mut host, 50.0, 50.0);
        raw_click(&mut host, 250.0, 50.0);
        raw_click(&mut host, 250.0, 250.0);

        assert_eq!(host.control().state(), DrawState::Drawing(DrawMode::Polygon));
        assert!(host.control().sink().alerts.is_empty());
        assert!(host.control().sink().reports.is_empty());

        // double click on the last vertex finishes the polygon
        raw_click(&mut host, 250.0, 250.0);
        raw_click(&mut host, 250.0, 250.0);

        let sink = host.control().sink();
        assert!(sink.alerts.is_empty());
        assert_eq!(sink.reports.len(), 1);
        assert_matches!(
            sink.reports[0].features()[0].geometry.as_ref().map(|g| &g.value),
            Some(geojson::Value::Polygon(rings)) if rings[0].len() == 4
        );
        assert_eq!(host.control().state(), DrawState::Idle);
    }

    #[test]
    fn swapped_zoom_range_does_not_break_mount() {
        let options =
            HostOptions::from_json(r#"{ "min_zoom": 10, "max_zoom": 5 }"#).unwrap();
        let mut host = ready_host(options);

        let zoom = web_zoom(host.map().unwrap().view().resolution());
        assert_relative_eq!(zoom, 5.0, epsilon = 1e-9);

        host.zoom_out().unwrap();
        assert_relative_eq!(
            web_zoom(host.map().unwrap().view().resolution()),
            5.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn scroll_zoom_is_disabled_by_default() {
        let mut host = ready_host(HostOptions::default());
        let resolution = host.map().unwrap().view().resolution();

        host.handle_raw_event(RawUserEvent::Scroll(1.0));
        assert_eq!(host.map().unwrap().view().resolution(), resolution);

        let mut host = ready_host(HostOptions::default().with_scroll_wheel_zoom(true));
        host.handle_raw_event(RawUserEvent::Scroll(1.0));
        assert!(host.map().unwrap().view().resolution() < resolution);
    }

    #[test]
    fn zoom_buttons_respect_range() {
        let mut host = ready_host(HostOptions::default().with_zoom(5.0).with_zoom_range(4, 6));
        let zoom = |host: &TestHost| web_zoom(host.map().unwrap().view().resolution());

        host.zoom_in().unwrap();
        assert_relative_eq!(zoom(&host), 6.0, epsilon = 1e-9);
        host.zoom_in().unwrap();
        assert_relative_eq!(zoom(&host), 6.0, epsilon = 1e-9);

        host.zoom_out().unwrap();
        host.zoom_out().unwrap();
        host.zoom_out().unwrap();
        assert_relative_eq!(zoom(&host), 4.0, epsilon = 1e-9);
    }

    #[derive(Clone, Default)]
    struct CountingMessenger(Rc<Cell<usize>>);

    impl Messenger for CountingMessenger {
        fn request_redraw(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn messenger_is_passed_to_map() {
        let messenger = CountingMessenger::default();
        let mut host = host(HostOptions::default()).with_messenger(messenger.clone());
        host.map_ready(Size::new(400.0, 300.0)).unwrap();
        let after_mount = messenger.0.get();
        assert!(after_mount > 0);

        host.zoom_in().unwrap();
        assert!(messenger.0.get() > after_mount);
    }
}

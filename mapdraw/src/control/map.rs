use crate::control::{EventPropagation, MouseButton, UserEvent, UserEventHandler};
use crate::map::Map;
use crate::tile_schema::{web_resolution, web_zoom};
use crate::view::MapView;

/// Configuration of a [`MapController`]
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct MapControllerConfiguration {
    zoom_speed: f64,
    min_resolution: f64,
    max_resolution: f64,
    scroll_wheel_zoom: bool,
}

impl Default for MapControllerConfiguration {
    fn default() -> Self {
        Self {
            zoom_speed: 0.2,
            max_resolution: web_resolution(0.0),
            min_resolution: web_resolution(19.0),
            scroll_wheel_zoom: true,
        }
    }
}

impl MapControllerConfiguration {
    /// Magnitude of the zoom on every mouse wheel turn.
    ///
    /// For example, the value of `0.2` means, that every time the mouse wheel is turned, the map
    /// will be zoomed by 0.2 times.
    pub fn zoom_speed(&self) -> f64 {
        self.zoom_speed
    }

    /// Sets magnitude of the zoom on every mouse wheel turn.
    pub fn with_zoom_speed(mut self, speed: f64) -> Self {
        self.zoom_speed = speed;
        self
    }

    /// Maximum allowed resolution.
    pub fn max_resolution(&self) -> f64 {
        self.max_resolution
    }

    /// Minimum allowed resolution.
    pub fn min_resolution(&self) -> f64 {
        self.min_resolution
    }

    /// Sets the allowed resolutions from the range of web tile zoom levels.
    pub fn with_zoom_range(mut self, min_zoom: u32, max_zoom: u32) -> Self {
        let (min_zoom, max_zoom) = (min_zoom.min(max_zoom), min_zoom.max(max_zoom));
        self.max_resolution = web_resolution(min_zoom as f64);
        self.min_resolution = web_resolution(max_zoom as f64);
        self
    }

    /// Whether turning the mouse wheel zooms the map.
    pub fn scroll_wheel_zoom(&self) -> bool {
        self.scroll_wheel_zoom
    }

    /// Enables or disables zooming with the mouse wheel.
    pub fn with_scroll_wheel_zoom(mut self, enabled: bool) -> Self {
        self.scroll_wheel_zoom = enabled;
        self
    }
}

/// Event handler of a map, providing panning and zooming capabilities.
#[derive(Default, Copy, Clone, PartialEq, Debug)]
pub struct MapController {
    config: MapControllerConfiguration,
}

impl MapController {
    /// Creates a new instance of `MapController` with the given configuration.
    pub fn new(config: MapControllerConfiguration) -> Self {
        Self { config }
    }

    /// Returns the current configuration of the controller.
    pub fn config(&self) -> MapControllerConfiguration {
        self.config
    }

    /// Update the configuration of the controller.
    pub fn set_config(&mut self, config: MapControllerConfiguration) {
        self.config = config;
    }

    /// Zooms the map in by one zoom level, keeping the center. This is what the "+" button of
    /// the zoom control does.
    pub fn zoom_in(&self, map: &mut Map) {
        self.zoom_by_levels(map, 1.0);
    }

    /// Zooms the map out by one zoom level, keeping the center.
    pub fn zoom_out(&self, map: &mut Map) {
        self.zoom_by_levels(map, -1.0);
    }

    fn zoom_by_levels(&self, map: &mut Map, levels: f64) {
        let zoom = web_zoom(map.view().resolution()).round() + levels;
        let target = map.view().with_resolution(web_resolution(zoom));
        let adjusted = self.adjust_target_view(target);

        log::debug!("Zoom changed to {:.1}", web_zoom(adjusted.resolution()));
        map.set_view(adjusted);
    }
}

impl UserEventHandler for MapController {
    fn handle(&mut self, event: &UserEvent, map: &mut Map) -> EventPropagation {
        match event {
            UserEvent::DragStarted(button, _)
                if *button == MouseButton::Left || *button == MouseButton::Other =>
            {
                EventPropagation::Consume
            }
            UserEvent::Drag(button, delta, e) => match button {
                MouseButton::Left | MouseButton::Other => {
                    let current_position = e.screen_pointer_position;
                    let prev_position = current_position - *delta;

                    let target = map
                        .view()
                        .translate_by_pixels(prev_position, current_position);

                    map.set_view(self.adjust_target_view(target));
                    EventPropagation::Stop
                }
                _ => EventPropagation::Propagate,
            },
            UserEvent::Scroll(delta, mouse_event) => {
                if !self.config.scroll_wheel_zoom {
                    return EventPropagation::Propagate;
                }

                let zoom = self.get_zoom(*delta);
                let target = map.view().zoom(zoom, mouse_event.screen_pointer_position);
                map.set_view(self.adjust_target_view(target));

                EventPropagation::Stop
            }
            UserEvent::Zoom(zoom, center) => {
                let target = map.view().zoom(*zoom, *center);
                map.set_view(self.adjust_target_view(target));

                EventPropagation::Stop
            }
            _ => EventPropagation::Propagate,
        }
    }
}

impl MapController {
    fn get_zoom(&self, delta: f64) -> f64 {
        (self.config.zoom_speed + 1.0).powf(-delta)
    }

    /// Adjusts target view according to the controller configuration.
    fn adjust_target_view(&self, mut target: MapView) -> MapView {
        if target.resolution() < self.config.min_resolution {
            target = target.with_resolution(self.config.min_resolution);
        }

        if target.resolution() > self.config.max_resolution {
            target = target.with_resolution(self.config.max_resolution);
        }

        target
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;
    use crate::control::{MouseButtonsState, MouseEvent};
    use crate::latlng;
    use crate::layer::TileLayer;
    use crate::primitives::{Point2d, Size, Vector2d};

    fn map(zoom: f64) -> Map {
        let view = MapView::new(latlng!(55.0, -122.0), web_resolution(zoom))
            .with_size(Size::new(400.0, 300.0));
        Map::new(view, TileLayer::osm(), None)
    }

    fn mouse_event(x: f64, y: f64) -> MouseEvent {
        MouseEvent {
            screen_pointer_position: Point2d::new(x, y),
            map_pointer_position: None,
            buttons: MouseButtonsState::default(),
        }
    }

    #[test]
    fn min_resolution_is_adjusted() {
        let mut controller = MapController::default();
        let target = MapView::new(latlng!(0.0, 0.0), controller.config.min_resolution / 2.0);
        let adjusted = controller.adjust_target_view(target);

        assert_relative_eq!(adjusted.resolution(), controller.config.min_resolution);

        controller.config.min_resolution = 10.0;
        let target = target.with_resolution(1.0);
        let adjusted = controller.adjust_target_view(target);
        assert_relative_eq!(adjusted.resolution(), controller.config.min_resolution);
    }

    #[test]
    fn max_resolution_is_adjusted() {
        let mut controller = MapController::default();
        let target = MapView::new(latlng!(0.0, 0.0), controller.config.max_resolution * 2.0);
        let adjusted = controller.adjust_target_view(target);

        assert_relative_eq!(adjusted.resolution(), controller.config.max_resolution);

        controller.config.max_resolution = 10.0;
        let target = target.with_resolution(100.0);
        let adjusted = controller.adjust_target_view(target);
        assert_relative_eq!(adjusted.resolution(), controller.config.max_resolution);
    }

    #[test]
    fn zoom_buttons_change_one_level() {
        let controller = MapController::new(
            MapControllerConfiguration::default().with_zoom_range(0, 6),
        );
        let mut map = map(5.0);
        let center = map.view().position();

        controller.zoom_in(&mut map);
        assert_abs_diff_eq!(web_zoom(map.view().resolution()), 6.0, epsilon = 1e-9);
        assert_abs_diff_eq!(map.view().position().x, center.x, epsilon = 1e-9);

        controller.zoom_in(&mut map);
        assert_abs_diff_eq!(web_zoom(map.view().resolution()), 6.0, epsilon = 1e-9);

        controller.zoom_out(&mut map);
        controller.zoom_out(&mut map);
        assert_abs_diff_eq!(web_zoom(map.view().resolution()), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn scroll_is_ignored_when_disabled() {
        let mut controller = MapController::new(
            MapControllerConfiguration::default().with_scroll_wheel_zoom(false),
        );
        let mut map = map(5.0);
        let before = *map.view();

        let propagation =
            controller.handle(&UserEvent::Scroll(1.0, mouse_event(10.0, 10.0)), &mut map);
        assert_eq!(propagation, EventPropagation::Propagate);
        assert_eq!(*map.view(), before);

        controller.set_config(controller.config().with_scroll_wheel_zoom(true));
        let propagation =
            controller.handle(&UserEvent::Scroll(1.0, mouse_event(10.0, 10.0)), &mut map);
        assert_eq!(propagation, EventPropagation::Stop);
        assert!(map.view().resolution() < before.resolution());

        let zoomed_in = *map.view();
        controller.handle(&UserEvent::Scroll(-1.0, mouse_event(10.0, 10.0)), &mut map);
        controller.handle(&UserEvent::Scroll(-1.0, mouse_event(10.0, 10.0)), &mut map);
        assert!(map.view().resolution() > zoomed_in.resolution());
        assert!(map.view().resolution() > before.resolution());
    }

    #[test]
    fn drag_pans_the_map() {
        let mut controller = MapController::default();
        let mut map = map(5.0);
        let under_pointer = map.view().screen_to_map(Point2d::new(100.0, 100.0)).unwrap();

        assert_eq!(
            controller.handle(
                &UserEvent::DragStarted(MouseButton::Left, mouse_event(100.0, 100.0)),
                &mut map
            ),
            EventPropagation::Consume
        );
        controller.handle(
            &UserEvent::Drag(
                MouseButton::Left,
                Vector2d::new(20.0, -10.0),
                mouse_event(120.0, 90.0),
            ),
            &mut map,
        );

        assert_abs_diff_eq!(
            map.view().screen_to_map(Point2d::new(120.0, 90.0)).unwrap(),
            under_pointer,
            epsilon = 1e-6
        );
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use egui::{Align2, Color32, Event, Image, Pos2, Rect, Sense, Stroke, Ui, UiBuilder, Vec2};
use mapdraw::control::{MouseButton, RawUserEvent};
use mapdraw::draw::ControlPosition;
use mapdraw::geo_types::Coord;
use mapdraw::host::MapHost;
use mapdraw::layer::Overlay;
use mapdraw::primitives::{Point2d, Size};
use mapdraw::shape::{rectangle_corners, Shape};
use mapdraw::{Map, Messenger};

use crate::panel::{Alerts, ControlPanel, DialogState};

const OVERLAY_COLOR: Color32 = Color32::from_rgb(51, 136, 255);
const EDITING_COLOR: Color32 = Color32::from_rgb(255, 120, 0);
const HANDLE_RADIUS: f32 = 5.0;
const MARKER_RADIUS: f32 = 7.0;

/// State of the map widget: the map host with its drawing control and the UI state around it.
pub struct EguiMapState<C: ControlPanel> {
    host: MapHost<C>,
    requires_redraw: Arc<AtomicBool>,
    alerts: Alerts,
    dialog: DialogState,
}

impl<C: ControlPanel> EguiMapState<C> {
    /// Creates the widget state. `alerts` is the queue the control's sink puts its alerts into
    /// (see [`AlertingSink`](crate::AlertingSink)).
    pub fn new(mut host: MapHost<C>, ctx: egui::Context, alerts: Alerts) -> Self {
        let requires_redraw = Arc::new(AtomicBool::new(true));
        host.set_messenger(MapStateMessenger {
            context: ctx,
            requires_redraw: requires_redraw.clone(),
        });

        Self {
            host,
            requires_redraw,
            alerts,
            dialog: DialogState::default(),
        }
    }

    /// The map host.
    pub fn host(&self) -> &MapHost<C> {
        &self.host
    }

    /// Mutable reference to the map host.
    pub fn host_mut(&mut self) -> &mut MapHost<C> {
        &mut self.host
    }

    /// Shows the map in all the available space of the `ui`.
    ///
    /// On the first call the map is created with the size of the widget and the control is
    /// mounted.
    pub fn render(&mut self, ui: &mut Ui) {
        let available_size = ui.available_size().floor();
        let (rect, response) = ui.allocate_exact_size(available_size, Sense::click_and_drag());
        let size = Size::new(available_size.x as f64, available_size.y as f64);

        if !self.host.is_ready() {
            if let Err(err) = self.host.map_ready(size) {
                log::warn!("Failed to mount the drawing control: {err}");
            }
        } else if self.host.map().is_some_and(|map| map.view().size() != size) {
            log::trace!("Resizing map to size: {size:?}");
            self.host.resize(size);
        }

        if response.contains_pointer() || response.dragged() {
            let events = ui.input(|input_state| input_state.events.clone());
            self.process_events(&events, [-rect.left(), -rect.top()]);
        }

        if self.requires_redraw.swap(false, Ordering::Relaxed) {
            log::trace!("Redrawing the map");
        }

        if let Some(map) = self.host.map() {
            let mut map_ui = ui.new_child(UiBuilder::new().max_rect(rect));
            map_ui.set_clip_rect(rect);
            draw_tiles(map, &map_ui, rect.min);
            draw_overlays(map, &map_ui, rect.min);
        }

        let ctx = ui.ctx().clone();
        self.show_control(&ctx);
        self.show_zoom_control(&ctx);
        self.show_attribution(&ctx);
        C::show_dialogs(&mut self.host, &ctx, &mut self.dialog);
        self.show_alert(&ctx);
    }

    fn show_control(&mut self, ctx: &egui::Context) {
        let (align, offset) = anchor(self.host.control().position());
        egui::Window::new("Drawing")
            .id(egui::Id::new("mapdraw_control"))
            .title_bar(false)
            .collapsible(false)
            .resizable(false)
            .anchor(align, offset)
            .auto_sized()
            .show(ctx, |ui| C::show_panel(&mut self.host, ui));
    }

    fn show_zoom_control(&mut self, ctx: &egui::Context) {
        let Some(position) = self.host.options().zoom_control else {
            return;
        };

        let (align, offset) = anchor(position);
        egui::Window::new("Zoom")
            .id(egui::Id::new("mapdraw_zoom"))
            .title_bar(false)
            .collapsible(false)
            .resizable(false)
            .anchor(align, offset)
            .auto_sized()
            .show(ctx, |ui| {
                let result = if ui.button("+").on_hover_text("Zoom in").clicked() {
                    self.host.zoom_in()
                } else if ui.button("−").on_hover_text("Zoom out").clicked() {
                    self.host.zoom_out()
                } else {
                    Ok(())
                };

                if let Err(err) = result {
                    log::warn!("Zoom failed: {err}");
                }
            });
    }

    fn show_attribution(&self, ctx: &egui::Context) {
        let Some(attribution) = self.host.map().and_then(|map| map.tile_layer().attribution())
        else {
            return;
        };

        egui::Window::new("Attributions")
            .collapsible(false)
            .title_bar(false)
            .anchor(Align2::RIGHT_BOTTOM, [-10., -10.])
            .auto_sized()
            .show(ctx, |ui| {
                if let Some(url) = attribution.get_url() {
                    ui.hyperlink_to(attribution.get_text(), url);
                } else {
                    ui.label(attribution.get_text());
                }
            });
    }

    fn show_alert(&self, ctx: &egui::Context) {
        let Some(message) = self.alerts.front() else {
            return;
        };

        egui::Window::new("Alert")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0., 0.])
            .show(ctx, |ui| {
                ui.label(&message);
                if ui.button("OK").clicked() {
                    self.alerts.dismiss();
                }
            });
    }

    fn process_events(&mut self, events: &[Event], offset: [f32; 2]) {
        for event in events {
            if let Some(raw_event) = convert_event(event, offset) {
                self.host.handle_raw_event(raw_event);
            }
        }
    }
}

fn anchor(position: ControlPosition) -> (Align2, [f32; 2]) {
    match position {
        ControlPosition::TopLeft => (Align2::LEFT_TOP, [10., 10.]),
        ControlPosition::TopRight => (Align2::RIGHT_TOP, [-10., 10.]),
        ControlPosition::BottomLeft => (Align2::LEFT_BOTTOM, [10., -10.]),
        ControlPosition::BottomRight => (Align2::RIGHT_BOTTOM, [-10., -40.]),
    }
}

fn to_pos(point: Point2d, origin: Pos2) -> Pos2 {
    origin + Vec2::new(point.x as f32, point.y as f32)
}

fn draw_tiles(map: &Map, ui: &Ui, origin: Pos2) {
    let layer = map.tile_layer();
    let schema = layer.tile_schema();
    let view = map.view();
    let Some(tiles) = schema.iter_tiles(view) else {
        return;
    };

    for index in tiles {
        let Some((min, max)) = schema.tile_bbox(index) else {
            continue;
        };

        let top_left = view.map_to_screen(Point2d::new(min.x, max.y));
        let bottom_right = view.map_to_screen(Point2d::new(max.x, min.y));
        let tile_rect = Rect::from_min_max(to_pos(top_left, origin), to_pos(bottom_right, origin));

        Image::new(layer.tile_url(index))
            .show_loading_spinner(false)
            .paint_at(ui, tile_rect);
    }
}

fn draw_overlays(map: &Map, ui: &Ui, origin: Pos2) {
    let view = map.view();
    let painter = ui.painter();
    let to_screen = |coord: &Coord| view.lonlat_to_screen(*coord).map(|p| to_pos(p, origin));
    let screen_points =
        |coords: &[Coord]| -> Vec<Pos2> { coords.iter().filter_map(to_screen).collect() };

    for (_, overlay) in map.overlays().iter() {
        let color = overlay_color(overlay);
        let stroke = Stroke::new(3.0, color);
        let fill = color.gamma_multiply(0.2);

        match overlay.shape() {
            Shape::Polyline(vertices) => {
                painter.add(egui::Shape::line(screen_points(vertices), stroke));
            }
            Shape::Polygon(vertices) if vertices.len() < 3 => {
                painter.add(egui::Shape::line(screen_points(vertices), stroke));
            }
            Shape::Polygon(vertices) => {
                painter.add(egui::Shape::closed_line(screen_points(vertices), stroke));
            }
            Shape::Rectangle(Some(rect)) => {
                let points = screen_points(&rectangle_corners(rect)[..]);
                painter.add(egui::Shape::convex_polygon(points, fill, stroke));
            }
            Shape::Circle(Some(circle)) => {
                if let (Some(center), Some(edge)) =
                    (to_screen(&circle.center), to_screen(&circle.radius_handle()))
                {
                    painter.circle(center, center.distance(edge), fill, stroke);
                }
            }
            Shape::Marker(Some(position)) => {
                if let Some(position) = to_screen(position) {
                    painter.circle(position, MARKER_RADIUS, color, Stroke::new(2.0, Color32::WHITE));
                }
            }
            Shape::Rectangle(None) | Shape::Circle(None) | Shape::Marker(None) => {}
        }

        if overlay.is_editing() {
            for handle in overlay.shape().handles().iter().filter_map(to_screen) {
                painter.circle(handle, HANDLE_RADIUS, Color32::WHITE, Stroke::new(1.5, color));
            }
        }
    }
}

fn overlay_color(overlay: &Overlay) -> Color32 {
    if overlay.is_editing() {
        EDITING_COLOR
    } else {
        OVERLAY_COLOR
    }
}

fn convert_event(event: &Event, offset: [f32; 2]) -> Option<RawUserEvent> {
    match event {
        Event::PointerButton {
            button, pressed, ..
        } => {
            let button = match button {
                egui::PointerButton::Primary => MouseButton::Left,
                egui::PointerButton::Secondary => MouseButton::Right,
                egui::PointerButton::Middle => MouseButton::Middle,
                _ => MouseButton::Other,
            };

            Some(match pressed {
                true => RawUserEvent::ButtonPressed(button),
                false => RawUserEvent::ButtonReleased(button),
            })
        }
        Event::PointerMoved(position) => Some(RawUserEvent::PointerMoved(Point2d::new(
            (position.x + offset[0]) as f64,
            (position.y + offset[1]) as f64,
        ))),
        #[cfg(not(target_arch = "wasm32"))]
        Event::MouseWheel { delta, .. } => {
            let zoom = delta[1] as f64;

            if zoom.abs() < 0.0001 {
                return None;
            }

            Some(RawUserEvent::Scroll(zoom))
        }
        #[cfg(target_arch = "wasm32")]
        Event::MouseWheel { delta, unit, .. } => {
            // Browsers report wheel deltas in different units
            let zoom = match unit {
                egui::MouseWheelUnit::Point => delta[1] as f64 / 120.0,
                egui::MouseWheelUnit::Line => delta[1] as f64 / 6.0,
                egui::MouseWheelUnit::Page => delta[1] as f64,
            };

            if zoom.abs() < 0.0001 {
                return None;
            }

            Some(RawUserEvent::Scroll(zoom))
        }

        _ => None,
    }
}

/// Messenger that asks egui to repaint when the map changes.
#[derive(Debug, Clone)]
pub struct MapStateMessenger {
    /// Set when a redraw was requested and not done yet.
    pub requires_redraw: Arc<AtomicBool>,
    /// Egui context to request repaints from.
    pub context: egui::Context,
}

impl Messenger for MapStateMessenger {
    fn request_redraw(&self) {
        log::trace!("Redraw requested");
        if !self.requires_redraw.swap(true, Ordering::Relaxed) {
            self.context.request_repaint();
        }
    }
}

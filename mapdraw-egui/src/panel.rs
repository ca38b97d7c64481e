use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use egui::{Align2, Button, Color32, Ui};
use mapdraw::draw::{
    DrawMode, DrawToolbox, DrawingControl, GeometryReport, GeometrySink, SimpleDrawControl,
};
use mapdraw::edit::EditSession;
use mapdraw::error::DrawError;
use mapdraw::host::MapHost;

/// Queue of messages waiting to be shown to the user one by one.
#[derive(Debug, Clone, Default)]
pub struct Alerts(Rc<RefCell<VecDeque<String>>>);

impl Alerts {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message to the queue.
    pub fn push(&self, message: impl Into<String>) {
        self.0.borrow_mut().push_back(message.into());
    }

    /// The message shown now.
    pub fn front(&self) -> Option<String> {
        self.0.borrow().front().cloned()
    }

    /// Removes the message shown now.
    pub fn dismiss(&self) {
        self.0.borrow_mut().pop_front();
    }

    /// True if there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// Geometry sink that shows alerts of the control in a modal window.
pub struct AlertingSink<S> {
    sink: S,
    alerts: Alerts,
}

impl<S: GeometrySink> AlertingSink<S> {
    /// Wraps the sink. Alerts go into the given queue.
    pub fn new(sink: S, alerts: Alerts) -> Self {
        Self { sink, alerts }
    }
}

impl<S: GeometrySink> GeometrySink for AlertingSink<S> {
    fn set_geometry(&mut self, report: GeometryReport) {
        self.sink.set_geometry(report);
    }

    fn alert(&mut self, message: &str) {
        log::warn!("{message}");
        self.alerts.push(message);
    }
}

/// State of the dialog a control may show.
#[derive(Debug, Default)]
pub struct DialogState {
    input: String,
    error: Option<String>,
    open: bool,
}

/// Drawing control with egui buttons.
pub trait ControlPanel: DrawingControl + Sized {
    /// Shows the buttons of the control.
    fn show_panel(host: &mut MapHost<Self>, ui: &mut Ui);

    /// Shows the dialogs the control needs, if any.
    fn show_dialogs(_host: &mut MapHost<Self>, _ctx: &egui::Context, _dialog: &mut DialogState) {
    }
}

fn run<C: DrawingControl>(
    host: &mut MapHost<C>,
    action: impl FnOnce(&mut C, &mut EditSession) -> Result<(), DrawError>,
) {
    match host.act(action) {
        Ok(Ok(())) => {}
        Ok(Err(err)) | Err(err) => log::warn!("Control action failed: {err}"),
    }
}

impl<S: GeometrySink> ControlPanel for SimpleDrawControl<S> {
    fn show_panel(host: &mut MapHost<Self>, ui: &mut Ui) {
        let control = host.control();
        let drawing = control.state().is_drawing();
        let editing = control.is_editing();
        let has_geometry = control.geometry().is_some();

        ui.horizontal(|ui| {
            if ui
                .selectable_label(drawing, "Rectangle")
                .on_hover_text(DrawMode::Rectangle.label())
                .clicked()
            {
                run(host, |control, session| {
                    control.new_shape(session);
                    Ok(())
                });
            }

            if editing {
                if ui.button("Save").clicked() {
                    run(host, |control, session| control.save(session));
                }
            } else if ui.add_enabled(has_geometry, Button::new("Edit")).clicked() {
                run(host, |control, session| control.edit(session));
            }

            if ui.button("Delete").clicked() {
                run(host, |control, session| {
                    control.delete(session);
                    Ok(())
                });
            }
        });
    }
}

fn mode_title(mode: DrawMode) -> &'static str {
    match mode {
        DrawMode::Polyline => "Line",
        DrawMode::Polygon => "Polygon",
        DrawMode::Marker => "Marker",
        DrawMode::Rectangle => "Rectangle",
        DrawMode::Circle => "Circle",
        DrawMode::Delete => "Delete",
    }
}

impl<S: GeometrySink> ControlPanel for DrawToolbox<S> {
    fn show_panel(host: &mut MapHost<Self>, ui: &mut Ui) {
        let state = host.control().state();

        ui.horizontal(|ui| {
            for mode in DrawMode::ALL {
                let selected = state.mode() == Some(mode);
                if ui
                    .selectable_label(selected, mode_title(mode))
                    .on_hover_text(mode.label())
                    .clicked()
                {
                    // clicking the selected tool again deselects it
                    let mode = (!selected || mode == DrawMode::Delete).then_some(mode);
                    run(host, |toolbox, session| {
                        toolbox.select_mode(mode, session);
                        Ok(())
                    });
                }
            }
        });

        ui.horizontal(|ui| {
            if state.is_active() {
                if ui.button("Finish").clicked() {
                    run(host, |toolbox, session| toolbox.finish(session));
                }
                if ui.button("Cancel").clicked() {
                    run(host, |toolbox, session| {
                        toolbox.cancel(session);
                        Ok(())
                    });
                }
            } else {
                let can_edit = host.control().last_feature().is_some();
                if ui.add_enabled(can_edit, Button::new("Edit")).clicked() {
                    run(host, |toolbox, session| toolbox.edit_existing(session));
                }
            }

            let dismissed = host.control().has_pending_request()
                && host.control().buffer_width_request().is_none();
            if dismissed && ui.button("Buffer width").clicked() {
                run(host, |toolbox, _| toolbox.retry_buffer_width());
            }
        });
    }

    fn show_dialogs(host: &mut MapHost<Self>, ctx: &egui::Context, dialog: &mut DialogState) {
        let Some(request) = host.control().buffer_width_request() else {
            dialog.open = false;
            return;
        };

        if !dialog.open {
            dialog.input = request.default_value().to_string();
            dialog.error = None;
            dialog.open = true;
        }

        let message = request.message();
        let mut respond = false;
        let mut cancel = false;

        egui::Window::new("Buffer width")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0., 0.])
            .show(ctx, |ui| {
                ui.label(message);
                let response = ui.text_edit_singleline(&mut dialog.input);
                respond = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                if let Some(error) = &dialog.error {
                    ui.colored_label(Color32::RED, error);
                }

                ui.horizontal(|ui| {
                    respond |= ui.button("OK").clicked();
                    cancel = ui.button("Cancel").clicked();
                });
            });

        if respond {
            let input = dialog.input.clone();
            match host.act(|toolbox, session| toolbox.respond_buffer_width(&input, session)) {
                Ok(Ok(())) => dialog.open = false,
                Ok(Err(err)) | Err(err) => dialog.error = Some(err.to_string()),
            }
        } else if cancel {
            run(host, |toolbox, _| {
                toolbox.cancel_buffer_width();
                Ok(())
            });
            dialog.open = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alerts_are_shown_in_order() {
        let alerts = Alerts::new();
        let mut sink = AlertingSink::new(|_: GeometryReport| {}, alerts.clone());

        sink.alert("first");
        sink.alert("second");

        assert_eq!(alerts.front().as_deref(), Some("first"));
        alerts.dismiss();
        assert_eq!(alerts.front().as_deref(), Some("second"));
        alerts.dismiss();
        assert!(alerts.is_empty());
    }

    #[test]
    fn reports_go_to_inner_sink() {
        let mut reports: Vec<GeometryReport> = vec![];
        let mut sink = AlertingSink::new(
            |report: GeometryReport| reports.push(report),
            Alerts::new(),
        );

        sink.set_geometry(GeometryReport::Cleared);
        drop(sink);

        assert_eq!(reports, vec![GeometryReport::Cleared]);
    }

    #[test]
    fn every_mode_has_a_title() {
        for mode in DrawMode::ALL {
            assert!(!mode_title(mode).is_empty());
        }
    }
}

use eframe::AppCreator;
use mapdraw::host::MapHost;

use crate::{Alerts, ControlPanel, EguiMapState};

struct MapApp<C: ControlPanel> {
    map: EguiMapState<C>,
}

impl<C: ControlPanel> eframe::App for MapApp<C> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.map.render(ui);
            });
    }
}

/// Runs an application showing the map full-window, natively or in a browser canvas with id
/// `the_canvas_id`.
///
/// ```no_run
/// use mapdraw::draw::{DrawToolbox, GeometryReport};
/// use mapdraw::host::{HostOptions, MapHost};
/// use mapdraw_egui::{AlertingSink, Alerts, InitBuilder};
///
/// let alerts = Alerts::new();
/// let sink = AlertingSink::new(|report: GeometryReport| println!("{report:?}"), alerts.clone());
/// let host = MapHost::new(HostOptions::default(), DrawToolbox::new(sink));
///
/// InitBuilder::new(host, alerts).init().expect("failed to start the app");
/// ```
pub struct InitBuilder<C: ControlPanel + 'static> {
    host: MapHost<C>,
    alerts: Alerts,
    app_name: String,
    #[cfg(not(target_arch = "wasm32"))]
    native_options: Option<eframe::NativeOptions>,
    #[cfg(target_arch = "wasm32")]
    web_options: Option<eframe::WebOptions>,
}

impl<C: ControlPanel + 'static> InitBuilder<C> {
    /// Creates a builder for the host. `alerts` is the queue the control's sink puts alerts
    /// into.
    pub fn new(host: MapHost<C>, alerts: Alerts) -> Self {
        Self {
            host,
            alerts,
            app_name: "Mapdraw".to_string(),
            #[cfg(not(target_arch = "wasm32"))]
            native_options: None,
            #[cfg(target_arch = "wasm32")]
            web_options: None,
        }
    }

    /// Sets the application (window) name.
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// Sets the options of the native window.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn with_native_options(mut self, options: eframe::NativeOptions) -> Self {
        self.native_options = Some(options);
        self
    }

    /// Sets the options of the web runner.
    #[cfg(target_arch = "wasm32")]
    pub fn with_web_options(mut self, options: eframe::WebOptions) -> Self {
        self.web_options = Some(options);
        self
    }

    /// Starts the application.
    pub fn init(self) -> eframe::Result {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.init_not_wasm()
        }

        #[cfg(target_arch = "wasm32")]
        {
            self.init_wasm()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn init_not_wasm(self) -> eframe::Result {
        env_logger::init();

        let native_options = self.native_options.unwrap_or_default();
        let app_creator: AppCreator<'static> = app_creator(self.host, self.alerts);

        eframe::run_native(&self.app_name, native_options, app_creator)
    }

    #[cfg(target_arch = "wasm32")]
    fn init_wasm(self) -> eframe::Result {
        use eframe::wasm_bindgen::JsCast as _;

        // Redirect `log` message to `console.log` and friends:
        eframe::WebLogger::init(log::LevelFilter::Info).ok();

        let web_options = self.web_options.unwrap_or_default();
        let host = self.host;
        let alerts = self.alerts;

        wasm_bindgen_futures::spawn_local(async move {
            let Some(document) = web_sys::window().and_then(|window| window.document()) else {
                log::error!("No document to start the app in");
                return;
            };

            let Some(canvas) = document
                .get_element_by_id("the_canvas_id")
                .and_then(|element| element.dyn_into::<web_sys::HtmlCanvasElement>().ok())
            else {
                log::error!("the_canvas_id is not found or is not a HtmlCanvasElement");
                return;
            };

            let app_creator: AppCreator<'static> = app_creator(host, alerts);
            let start_result = eframe::WebRunner::new()
                .start(canvas, web_options, app_creator)
                .await;

            // Remove the loading text and spinner:
            if let Some(loading_text) = document.get_element_by_id("loading_text") {
                match start_result {
                    Ok(_) => {
                        loading_text.remove();
                    }
                    Err(e) => {
                        loading_text.set_inner_html(
                            "<p> The app has crashed. See the developer console for details. </p>",
                        );
                        log::error!("Failed to start eframe: {e:?}");
                    }
                }
            }
        });

        Ok(())
    }
}

fn app_creator<'app, C: ControlPanel + 'static>(
    host: MapHost<C>,
    alerts: Alerts,
) -> AppCreator<'app> {
    Box::new(move |cc: &eframe::CreationContext<'_>| {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let map = EguiMapState::new(host, cc.egui_ctx.clone(), alerts);
        Ok(Box::new(MapApp { map }))
    })
}

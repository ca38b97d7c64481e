//! Map with the full drawing toolbox. Every drawn geometry is printed to stdout as GeoJSON.

use mapdraw::draw::{DrawToolbox, GeometryReport};
use mapdraw::host::{HostOptions, MapHost};
use mapdraw_egui::{AlertingSink, Alerts, InitBuilder};

fn main() {
    let alerts = Alerts::new();
    let sink = AlertingSink::new(print_report, alerts.clone());

    let options = HostOptions::default()
        .with_center(59.94, 30.31)
        .with_zoom(11.0)
        .with_scroll_wheel_zoom(true);
    let host = MapHost::new(options, DrawToolbox::new(sink));

    InitBuilder::new(host, alerts)
        .with_app_name("Mapdraw toolbox")
        .init()
        .expect("failed to initialize");
}

fn print_report(report: GeometryReport) {
    match report.to_json() {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("Failed to serialize geometry: {err}"),
    }
}

//! Map with the rectangle control, started with an existing rectangle that can be edited.

use mapdraw::draw::{GeometryReport, SimpleDrawControl};
use mapdraw::geojson::Feature;
use mapdraw::host::{HostOptions, MapHost};
use mapdraw_egui::{AlertingSink, Alerts, InitBuilder};

const INITIAL_GEOMETRY: &str = r#"{
    "type": "Feature",
    "properties": {},
    "geometry": {
        "type": "Polygon",
        "coordinates": [[
            [-123.5, 54.5], [-120.5, 54.5], [-120.5, 55.5], [-123.5, 55.5], [-123.5, 54.5]
        ]]
    }
}"#;

fn main() {
    let alerts = Alerts::new();
    let sink = AlertingSink::new(
        |report: GeometryReport| match report.to_json() {
            Ok(json) => println!("{json}"),
            Err(err) => log::error!("Failed to serialize geometry: {err}"),
        },
        alerts.clone(),
    );

    let feature: Feature = INITIAL_GEOMETRY.parse().expect("invalid initial geometry");
    let control = SimpleDrawControl::new(sink).with_geometry(feature);
    let host = MapHost::new(HostOptions::default(), control);

    InitBuilder::new(host, alerts)
        .with_app_name("Mapdraw rectangle")
        .init()
        .expect("failed to initialize");
}

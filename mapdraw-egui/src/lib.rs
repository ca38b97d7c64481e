//! Egui widget showing a map with a mapdraw drawing control.
//!
//! [`EguiMapState`] renders the map of a [`MapHost`](mapdraw::host::MapHost): raster tiles are
//! loaded through the egui image loaders (see [`egui_extras::install_image_loaders`]), overlays
//! are painted on top of them, and the control buttons, the zoom control and the dialogs are
//! shown as egui windows.

mod egui_map;
mod panel;

pub use egui_map::{EguiMapState, MapStateMessenger};
pub use panel::{AlertingSink, Alerts, ControlPanel, DialogState};

#[cfg(feature = "init")]
mod init;
#[cfg(feature = "init")]
pub use init::InitBuilder;

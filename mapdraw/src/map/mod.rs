use crate::layer::{Overlay, OverlayId, TileLayer};
use crate::messenger::Messenger;
use crate::primitives::Size;
use crate::view::MapView;

mod overlay_collection;

pub use overlay_collection::OverlayCollection;

/// Map specifies the base tile layer, the overlays drawn over it, and the view that should be
/// rendered.
pub struct Map {
    view: MapView,
    tile_layer: TileLayer,
    overlays: OverlayCollection,
    messenger: Option<Box<dyn Messenger>>,
}

impl std::fmt::Debug for Map {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map")
            .field("view", &self.view)
            .field("tile_layer", &self.tile_layer)
            .field("overlays", &self.overlays)
            .finish_non_exhaustive()
    }
}

impl Map {
    /// Creates a new map.
    pub fn new(
        view: MapView,
        tile_layer: TileLayer,
        messenger: Option<Box<dyn Messenger + 'static>>,
    ) -> Self {
        Self {
            view,
            tile_layer,
            overlays: OverlayCollection::default(),
            messenger,
        }
    }

    /// Current view of the map.
    pub fn view(&self) -> &MapView {
        &self.view
    }

    /// Changes the view of the map to the given one.
    pub fn set_view(&mut self, view: MapView) {
        self.view = view;
        self.redraw();
    }

    /// Set the size of the map.
    pub fn set_size(&mut self, new_size: Size) {
        self.view = self.view.with_size(new_size);
    }

    /// Base layer of the map.
    pub fn tile_layer(&self) -> &TileLayer {
        &self.tile_layer
    }

    /// Overlays of the map.
    pub fn overlays(&self) -> &OverlayCollection {
        &self.overlays
    }

    /// Mutable collection of the map overlays. Changing overlays through it does not request a
    /// redraw, call [`Map::redraw`] after that.
    pub fn overlays_mut(&mut self) -> &mut OverlayCollection {
        &mut self.overlays
    }

    /// Adds an overlay on top of the map.
    pub fn add_overlay(&mut self, overlay: Overlay) -> OverlayId {
        let id = self.overlays.add(overlay);
        self.redraw();
        id
    }

    /// Removes an overlay from the map. Returns `None` if the map does not have it.
    pub fn remove_overlay(&mut self, id: OverlayId) -> Option<Overlay> {
        let removed = self.overlays.remove(id);
        if removed.is_some() {
            self.redraw();
        }

        removed
    }

    /// Overlay with the given id.
    pub fn overlay(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.get(id)
    }

    /// Request redraw of the map.
    pub fn redraw(&self) {
        if let Some(messenger) = &self.messenger {
            messenger.request_redraw()
        }
    }

    /// Sets the new event messenger for the map.
    pub fn set_messenger(&mut self, messenger: Option<impl Messenger + 'static>) {
        let messenger: Option<Box<dyn Messenger>> = if let Some(m) = messenger {
            Some(Box::new(m))
        } else {
            None
        };

        self.messenger = messenger;
    }
}

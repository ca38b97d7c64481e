use crate::layer::{Overlay, OverlayId};

/// Collection of overlays of a map.
///
/// Overlays are drawn in the order they were added, so the last added overlay is on top. Each
/// added overlay gets a new [`OverlayId`] that is used to access or remove it later.
///
/// ```
/// use mapdraw::layer::Overlay;
/// use mapdraw::map::OverlayCollection;
/// use mapdraw::shape::{Shape, ShapeKind};
///
/// let mut collection = OverlayCollection::default();
/// let first = collection.add(Overlay::new(Shape::empty(ShapeKind::Marker)));
/// let second = collection.add(Overlay::new(Shape::empty(ShapeKind::Polygon)));
///
/// assert!(collection.remove(first).is_some());
/// assert!(collection.remove(first).is_none());
/// assert_eq!(collection.len(), 1);
/// assert_eq!(collection.get(second).unwrap().kind(), ShapeKind::Polygon);
/// ```
#[derive(Debug, Default)]
pub struct OverlayCollection {
    entries: Vec<(OverlayId, Overlay)>,
    next_id: u64,
}

impl OverlayCollection {
    /// Adds the overlay on top of all others and returns its id.
    pub fn add(&mut self, overlay: Overlay) -> OverlayId {
        self.next_id += 1;
        let id = OverlayId::new(self.next_id);
        self.entries.push((id, overlay));

        id
    }

    /// Removes the overlay from the collection and returns it. Returns `None` if there is no
    /// overlay with this id.
    pub fn remove(&mut self, id: OverlayId) -> Option<Overlay> {
        let index = self.index_of(id)?;
        Some(self.entries.remove(index).1)
    }

    /// Overlay with the given id.
    pub fn get(&self, id: OverlayId) -> Option<&Overlay> {
        self.index_of(id).map(|index| &self.entries[index].1)
    }

    /// Mutable reference to the overlay with the given id.
    pub fn get_mut(&mut self, id: OverlayId) -> Option<&mut Overlay> {
        self.index_of(id).map(|index| &mut self.entries[index].1)
    }

    /// Returns true if the collection has an overlay with this id.
    pub fn contains(&self, id: OverlayId) -> bool {
        self.index_of(id).is_some()
    }

    /// Number of overlays in the collection.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no overlays.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes all overlays.
    pub fn clear(&mut self) {
        self.entries.clear()
    }

    /// Iterates over overlays from the bottom one to the top one.
    pub fn iter(&self) -> impl Iterator<Item = (OverlayId, &Overlay)> + '_ {
        self.entries.iter().map(|(id, overlay)| (*id, overlay))
    }

    /// Iterates over overlays from the top one to the bottom one.
    pub fn iter_top_down(&self) -> impl Iterator<Item = (OverlayId, &Overlay)> + '_ {
        self.entries.iter().rev().map(|(id, overlay)| (*id, overlay))
    }

    fn index_of(&self, id: OverlayId) -> Option<usize> {
        self.entries.iter().position(|(entry_id, _)| *entry_id == id)
    }
}

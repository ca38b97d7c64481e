/// Messenger is used to notify the application that the map should be redrawn.
pub trait Messenger {
    /// Requests a redraw of the map.
    fn request_redraw(&self);
}

/// Messenger that ignores all requests. Used by headless maps and in tests.
#[derive(Debug, Default, Copy, Clone)]
pub struct DummyMessenger;

impl Messenger for DummyMessenger {
    fn request_redraw(&self) {}
}

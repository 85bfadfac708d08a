use {
    crate::rect::{Rect, Region},
    std::fmt::{Display, Formatter},
    thiserror::Error,
};

/// Identity of a window in the external windowing hierarchy. The engine
/// never creates or destroys windows, it only attaches composite state
/// to them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct WindowId(pub u32);

impl Display for WindowId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Access level requested when resolving a window id.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Access {
    Read,
}

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Window {0} does not exist")]
    NoSuchWindow(WindowId),
    #[error("Access to window {0} was denied")]
    AccessDenied(WindowId),
}

/// The windowing hierarchy and resource-id lookup service.
pub trait WindowTree {
    /// Resolves and validates a window id.
    fn lookup(&self, window: WindowId, access: Access) -> Result<(), TreeError>;

    fn parent(&self, window: WindowId) -> Option<WindowId>;

    /// Position and size of the window in screen coordinates.
    fn extents(&self, window: WindowId) -> Rect;

    /// The visible region of the window in screen coordinates.
    fn clip_region(&self, window: WindowId) -> Region;
}

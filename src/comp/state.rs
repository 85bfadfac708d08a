use {
    crate::{buffer::Buffer, request::PresentRequest, tree::WindowId},
    ahash::AHashSet,
    indexmap::IndexSet,
    std::{
        cell::{Cell, RefCell},
        rc::Rc,
    },
};

/// Index of the staging buffer currently visible.
pub(super) const STAGE_CURRENT: usize = 0;
/// Index of the staging buffer composited into next.
pub(super) const STAGE_NEXT: usize = 1;

/// Per-window composite state. Created lazily on first participation,
/// dropped when the window is destroyed.
pub struct WindowState {
    pub window: WindowId,
    /// Set iff the window is directly composited into another window.
    /// Mutually exclusive with `ancestor`.
    pub target: Cell<Option<WindowId>>,
    /// Set iff the window inherits its target through a composited
    /// ancestor without being a direct client itself.
    pub ancestor: Cell<Option<WindowId>>,
    /// Windows composited into this window, in auto-list order. The
    /// order carries no stacking contract.
    pub direct_clients: RefCell<IndexSet<WindowId>>,
    /// Windows whose nearest composited ancestor is this window.
    pub descendants: RefCell<AHashSet<WindowId>>,
    /// Target-side double buffer.
    pub staging: [RefCell<Option<Rc<Buffer>>>; 2],
    /// Most recent buffer delivered from this window's own pipeline,
    /// backing composite reads between explicit frames.
    pub client_buf: RefCell<Option<Rc<Buffer>>>,
    /// Requests not yet retired for this window, in arrival order.
    pub pending: RefCell<Vec<Rc<PresentRequest>>>,
}

impl WindowState {
    pub(super) fn new(window: WindowId) -> Rc<Self> {
        Rc::new(Self {
            window,
            target: Default::default(),
            ancestor: Default::default(),
            direct_clients: Default::default(),
            descendants: Default::default(),
            staging: Default::default(),
            client_buf: Default::default(),
            pending: Default::default(),
        })
    }

    /// The window is currently compositing other windows.
    pub fn is_target(&self) -> bool {
        !self.direct_clients.borrow().is_empty()
    }

    pub(super) fn has_dependants(&self) -> bool {
        self.is_target() || !self.descendants.borrow().is_empty()
    }

    pub(super) fn assert_consistent(&self) {
        assert!(
            self.target.get().is_none() || self.ancestor.get().is_none(),
            "window {} has both a composite target and a composite ancestor",
            self.window,
        );
    }
}

use {
    crate::{
        backend::{CrtcId, FenceId},
        buffer::Buffer,
        rect::Region,
        tree::WindowId,
    },
    std::{
        cell::{Cell, RefCell},
        fmt::{Debug, Formatter},
        rc::Rc,
    },
};

/// One pending present operation. Owned by its originator until the
/// engine retires it with exactly one completion notification.
pub struct PresentRequest {
    pub window: WindowId,
    pub crtc: CrtcId,
    pub serial: u64,
    pub target_msc: Cell<u64>,
    pub buffer: RefCell<Option<Rc<Buffer>>>,
    pub idle_fence: Cell<Option<FenceId>>,
    /// Damage supplied by the presenter, in window coordinates.
    /// Consumed at composite time.
    pub update: RefCell<Option<Region>>,
    /// The buffer swap has been committed to the display pipeline and
    /// can no longer be redirected.
    pub flip_ready: Cell<bool>,
    /// Waiting for a driver vblank event.
    pub queued: Cell<bool>,
    /// Target-side frame synthesized by the engine.
    pub internal: Cell<bool>,
    /// The target this request currently composites into, if any.
    pub auto_target: Cell<Option<WindowId>>,
    /// Client requests attached to this target-side frame, at most one
    /// per window.
    pub attached_clients: RefCell<Vec<Rc<PresentRequest>>>,
    pub(crate) retired: Cell<bool>,
}

impl PresentRequest {
    pub fn new(
        window: WindowId,
        crtc: CrtcId,
        serial: u64,
        target_msc: u64,
        buffer: Option<Rc<Buffer>>,
        idle_fence: Option<FenceId>,
        update: Option<Region>,
    ) -> Rc<Self> {
        Rc::new(Self {
            window,
            crtc,
            serial,
            target_msc: Cell::new(target_msc),
            buffer: RefCell::new(buffer),
            idle_fence: Cell::new(idle_fence),
            update: RefCell::new(update),
            flip_ready: Cell::new(false),
            queued: Cell::new(false),
            internal: Cell::new(false),
            auto_target: Cell::new(None),
            attached_clients: RefCell::new(Vec::new()),
            retired: Cell::new(false),
        })
    }

    pub(crate) fn new_internal(
        window: WindowId,
        crtc: CrtcId,
        target_msc: u64,
        buffer: Rc<Buffer>,
    ) -> Rc<Self> {
        let request = Self::new(window, crtc, 0, target_msc, Some(buffer), None, None);
        request.internal.set(true);
        request
    }
}

impl Debug for PresentRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresentRequest")
            .field("window", &self.window)
            .field("serial", &self.serial)
            .field("target_msc", &self.target_msc.get())
            .field("internal", &self.internal.get())
            .field("queued", &self.queued.get())
            .finish_non_exhaustive()
    }
}

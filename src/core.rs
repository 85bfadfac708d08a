use {
    crate::{
        backend::{BackendError, FenceId},
        buffer::Buffer,
        request::PresentRequest,
        tree::WindowId,
    },
    std::rc::Rc,
};

/// What completed, from the point of view of the request originator.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CompleteKind {
    /// A client present of a pixmap.
    Buffer,
    /// An internally generated target-side frame.
    InternalFrame,
}

/// How a present request completed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CompleteMode {
    Flip,
    Copy,
    Skip,
}

/// The surrounding present machinery: completion delivery, idle
/// delivery, the driver's frame queue, and the ordinary non-auto
/// present path.
pub trait PresentCore {
    /// Delivers the completion event for a request to its originator.
    /// Called exactly once per request, by the engine's retire path.
    fn notify(
        &self,
        request: &Rc<PresentRequest>,
        kind: CompleteKind,
        mode: CompleteMode,
        ust: u64,
        msc: u64,
    );

    /// Tells a buffer's owner that the server is done with it and it
    /// may be reused. The fence, if any, has already been signalled.
    fn send_idle(&self, window: WindowId, serial: u64, buffer: &Rc<Buffer>, fence: Option<FenceId>);

    /// Registers a target-side frame for execution at its target msc.
    /// The driver later calls [`CompEngine::execute_frame`] from the
    /// dispatch loop with the actual ust/msc. Must not block, and must
    /// not deliver the frame after the engine retired it.
    ///
    /// [`CompEngine::execute_frame`]: crate::comp::CompEngine::execute_frame
    fn queue_frame(&self, request: &Rc<PresentRequest>) -> Result<(), BackendError>;

    /// Commits an unsynchronized flip of the target frame immediately.
    /// The engine composites synchronously right after this returns.
    fn flip_now(&self, request: &Rc<PresentRequest>) -> Result<(), BackendError>;

    /// Resubmits a request through the ordinary, non-auto present path.
    fn re_execute(&self, request: &Rc<PresentRequest>);

    /// Drops the vblank event a request is waiting on; the engine has
    /// taken the request over.
    fn cancel_queued(&self, request: &Rc<PresentRequest>);
}

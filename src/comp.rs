use {
    crate::{
        backend::{Backend, BackendError},
        buffer::Buffer,
        comp::state::WindowState,
        core::{CompleteKind, CompleteMode, PresentCore},
        request::PresentRequest,
        tree::{TreeError, WindowId, WindowTree},
        utils::copyhashmap::CopyHashMap,
    },
    std::rc::Rc,
    thiserror::Error,
};

mod auto_list;
mod execute;
mod schedule;
pub mod state;
mod transition;

#[derive(Debug, Error)]
pub enum CompError {
    #[error("Could not resolve window {0}")]
    BadWindow(WindowId, #[source] TreeError),
    #[error("Window {window} is already composited into target {target}")]
    Conflict { window: WindowId, target: WindowId },
    #[error("The display driver reported an error")]
    Backend(#[from] BackendError),
}

/// The auto-composite engine. One instance per server; all calls come
/// from the single dispatch loop, every public operation runs to
/// completion before returning control to it.
pub struct CompEngine {
    pub(crate) tree: Rc<dyn WindowTree>,
    pub(crate) backend: Rc<dyn Backend>,
    pub(crate) core: Rc<dyn PresentCore>,
    pub(crate) windows: CopyHashMap<WindowId, Rc<WindowState>>,
}

impl CompEngine {
    pub fn new(
        tree: &Rc<dyn WindowTree>,
        backend: &Rc<dyn Backend>,
        core: &Rc<dyn PresentCore>,
    ) -> Self {
        Self {
            tree: tree.clone(),
            backend: backend.clone(),
            core: core.clone(),
            windows: CopyHashMap::new(),
        }
    }

    /// The state of a window, if it ever participated in
    /// auto-compositing.
    pub fn state(&self, window: WindowId) -> Option<Rc<WindowState>> {
        self.windows.get(&window)
    }

    pub(crate) fn state_or_create(&self, window: WindowId) -> Rc<WindowState> {
        if let Some(state) = self.windows.get(&window) {
            return state;
        }
        let state = WindowState::new(window);
        self.windows.set(window, state.clone());
        state
    }

    /// Adds a request to its window's pending list. Every present
    /// request is registered before classification and stays registered
    /// until retired, including requests that follow the ordinary path.
    pub fn register(&self, request: &Rc<PresentRequest>) {
        self.state_or_create(request.window)
            .pending
            .borrow_mut()
            .push(request.clone());
    }

    /// Removes a request that the ordinary present path retired.
    pub fn unregister(&self, request: &Rc<PresentRequest>) {
        if let Some(state) = self.windows.get(&request.window) {
            state
                .pending
                .borrow_mut()
                .retain(|r| !Rc::ptr_eq(r, request));
        }
    }

    /// Retires a request: unlinks it and delivers the completion
    /// notification. Retiring a request twice is a defect.
    pub(crate) fn retire(
        &self,
        request: &Rc<PresentRequest>,
        kind: CompleteKind,
        mode: CompleteMode,
        ust: u64,
        msc: u64,
    ) {
        assert!(
            !request.retired.replace(true),
            "present request of window {} retired twice",
            request.window,
        );
        self.unregister(request);
        self.core.notify(request, kind, mode, ust, msc);
    }

    /// Releases a buffer back to its owner: signal the idle fence,
    /// deliver the idle notification, destroy the fence.
    pub(crate) fn release_buffer(&self, buffer: &Rc<Buffer>) {
        let fence = buffer.idle_fence.take();
        if let Some(fence) = fence {
            self.backend.signal_fence(fence);
        }
        if let Some(owner) = buffer.owner.get() {
            self.core.send_idle(owner, buffer.serial.get(), buffer, fence);
        }
        if let Some(fence) = fence {
            self.backend.destroy_fence(fence);
        }
    }

    /// Takes the buffer out of a request and releases it to the
    /// presenting client. Internal frames carry a staging buffer that
    /// is simply dropped.
    pub(crate) fn release_request_buffer(&self, request: &Rc<PresentRequest>) {
        let buffer = request.buffer.borrow_mut().take();
        if let Some(buffer) = buffer {
            if !request.internal.get() {
                buffer.owner.set(Some(request.window));
                buffer.serial.set(request.serial);
                buffer.idle_fence.set(request.idle_fence.take());
                self.release_buffer(&buffer);
            }
        }
    }
}

use {
    crate::{
        backend::CrtcId,
        comp::{
            CompEngine, CompError,
            state::{STAGE_NEXT, WindowState},
        },
        core::{CompleteKind, CompleteMode},
        request::PresentRequest,
        tree::WindowId,
    },
    std::rc::Rc,
};

/// Bound on the ancestor walk. Window trees are nowhere near this deep;
/// a longer chain means a cycle in the composite relations.
const MAX_ANCESTOR_DEPTH: usize = 1024;

impl CompEngine {
    /// Returns the state of `window` or of its nearest ancestor that is
    /// directly composited into a target. `None` means the window is
    /// not under auto-composite at all.
    pub fn client_window(&self, window: WindowId) -> Option<Rc<WindowState>> {
        let mut current = Some(window);
        for _ in 0..MAX_ANCESTOR_DEPTH {
            let w = current?;
            if let Some(state) = self.windows.get(&w) {
                if state.target.get().is_some() {
                    return Some(state);
                }
            }
            current = self.tree.parent(w);
        }
        panic!("cycle while resolving the composite ancestor of window {window}");
    }

    /// Re-resolves the governing ancestor of a window before
    /// classification and repairs the descendant edges if the hierarchy
    /// changed since the last frame.
    pub(super) fn check_ancestor(&self, state: &Rc<WindowState>) {
        if state.target.get().is_some() {
            // Composited directly.
            return;
        }
        let Some(direct) = self.client_window(state.window) else {
            return;
        };
        if state.ancestor.get() == Some(direct.window) {
            return;
        }
        if let Some(old) = state.ancestor.take() {
            if let Some(old_state) = self.windows.get(&old) {
                old_state.descendants.borrow_mut().remove(&state.window);
            }
        }
        direct.descendants.borrow_mut().insert(state.window);
        state.ancestor.set(Some(direct.window));
        state.assert_consistent();
    }

    /// Classifies a present request against the composite graph.
    /// Returns `false` if the window is not under auto-composite; the
    /// caller then proceeds with the ordinary path. The request must
    /// already be registered.
    pub fn schedule_present(&self, request: &Rc<PresentRequest>) -> Result<bool, CompError> {
        let Some(direct) = self.client_window(request.window) else {
            return Ok(false);
        };
        request.auto_target.set(direct.target.get());
        let (ust, msc) = self.backend.frame_counter(request.crtc)?;
        self.schedule(request, ust, msc)?;
        Ok(true)
    }

    pub(super) fn schedule(
        &self,
        request: &Rc<PresentRequest>,
        ust: u64,
        msc: u64,
    ) -> Result<(), CompError> {
        let state = self.state_or_create(request.window);
        self.check_ancestor(&state);
        let target = request
            .auto_target
            .get()
            .expect("scheduling a request without an auto target");
        let target_state = self.state_or_create(target);
        let requested = request.target_msc.get();
        assert!(
            requested >= msc,
            "present request of window {} targets msc {requested} behind counter {msc}",
            request.window,
        );
        if requested == msc {
            // An unsynchronized flip is wanted for the current msc but a
            // synchronized flip on the target would block it. Bump the
            // request one frame and composite right away.
            request.target_msc.set(msc + 1);
            if self.queued_frame(&target_state, msc + 1).is_none() {
                let frame = self.new_internal_frame(&target_state, request.crtc, msc + 1)?;
                if let Err(e) = self.core.flip_now(&frame) {
                    self.retire(&frame, CompleteKind::InternalFrame, CompleteMode::Skip, ust, msc);
                    return Err(e.into());
                }
                self.execute_frame(&frame, ust, msc);
            }
            log::debug!(
                "window {}: request for msc {msc} bumped, content lands in the next frame",
                request.window,
            );
            self.hold_client_buffer(&state, request);
            // The client learns about the current counter although its
            // content lands one frame later. Observed protocol behavior,
            // kept as is.
            self.retire(request, CompleteKind::Buffer, CompleteMode::Flip, ust, msc);
        } else {
            match self.queued_frame(&target_state, requested) {
                Some(frame) => {
                    // Last writer wins within one window and frame.
                    self.detach_attached_client(&frame, request.window, Some(CompleteMode::Skip));
                    frame.attached_clients.borrow_mut().push(request.clone());
                }
                None => {
                    let frame = self.new_internal_frame(&target_state, request.crtc, requested)?;
                    frame.queued.set(true);
                    if let Err(e) = self.core.queue_frame(&frame) {
                        self.retire(&frame, CompleteKind::InternalFrame, CompleteMode::Skip, ust, msc);
                        return Err(e.into());
                    }
                    frame.attached_clients.borrow_mut().push(request.clone());
                }
            }
        }
        Ok(())
    }

    /// The target-side frame queued for `msc`, if any.
    pub(super) fn queued_frame(
        &self,
        target: &WindowState,
        msc: u64,
    ) -> Option<Rc<PresentRequest>> {
        for request in target.pending.borrow().iter() {
            if request.buffer.borrow().is_none() {
                continue;
            }
            if !request.queued.get() {
                continue;
            }
            if request.target_msc.get() != msc {
                continue;
            }
            return Some(request.clone());
        }
        None
    }

    /// Synthesizes an internally generated target frame presenting the
    /// target's staging back buffer.
    fn new_internal_frame(
        &self,
        target: &Rc<WindowState>,
        crtc: CrtcId,
        msc: u64,
    ) -> Result<Rc<PresentRequest>, CompError> {
        self.stage_next_buffer(target)?;
        let buffer = target.staging[STAGE_NEXT]
            .borrow()
            .clone()
            .expect("staging back buffer missing after staging");
        let frame = PresentRequest::new_internal(target.window, crtc, msc, buffer);
        target.pending.borrow_mut().push(frame.clone());
        Ok(frame)
    }

    /// Detaches the request of `window` attached to a target-side
    /// frame, if any, optionally retiring it first.
    pub(super) fn detach_attached_client(
        &self,
        frame: &Rc<PresentRequest>,
        window: WindowId,
        notify: Option<CompleteMode>,
    ) {
        let attached = {
            let mut list = frame.attached_clients.borrow_mut();
            let Some(pos) = list.iter().position(|r| r.window == window) else {
                return;
            };
            list.remove(pos)
        };
        if let Some(mode) = notify {
            let (ust, msc) = self.backend.frame_counter(attached.crtc).unwrap_or((0, 0));
            self.release_request_buffer(&attached);
            self.retire(&attached, CompleteKind::Buffer, mode, ust, msc);
        }
    }
}

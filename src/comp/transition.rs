use {
    crate::{
        comp::{CompEngine, state::WindowState},
        core::{CompleteKind, CompleteMode},
        request::PresentRequest,
        tree::WindowId,
    },
    std::rc::Rc,
};

impl CompEngine {
    /// Re-routes the window's queued requests through the composite
    /// scheduler after it was added to an auto list. Requests whose
    /// flip is already committed are left alone.
    pub(super) fn to_auto(&self, state: &Rc<WindowState>) {
        let pending: Vec<_> = state.pending.borrow().clone();
        for request in pending {
            if request.flip_ready.get() {
                continue;
            }
            if request.auto_target.get().is_some() {
                // Already attached to a target frame.
                continue;
            }
            let (ust, msc) = match self.backend.frame_counter(request.crtc) {
                Ok(counter) => counter,
                Err(e) => {
                    log::warn!("Could not query the frame counter of crtc {}: {e}", request.crtc);
                    continue;
                }
            };
            if request.target_msc.get() <= msc {
                continue;
            }
            self.core.cancel_queued(&request);
            request.queued.set(false);
            request.auto_target.set(state.target.get());
            if let Err(e) = self.schedule(&request, ust, msc) {
                log::warn!(
                    "Could not re-route the present request of window {}: {e}",
                    request.window,
                );
            }
        }
    }

    /// Returns the window and its whole descendant subtree to manual
    /// compositing, resubmitting their pending requests through the
    /// ordinary path. Descendants are detached before their root.
    pub(super) fn to_manual(&self, state: &Rc<WindowState>) {
        let descendants: Vec<WindowId> = state.descendants.borrow().iter().copied().collect();
        for descendant in descendants {
            if let Some(child) = self.windows.get(&descendant) {
                self.to_manual(&child);
            }
        }
        let pending: Vec<_> = state.pending.borrow().clone();
        for request in pending {
            self.detach_from_target_frame(&request);
            request.auto_target.set(None);
            self.core.re_execute(&request);
        }
        if let Some(ancestor) = state.ancestor.take() {
            if let Some(ancestor_state) = self.windows.get(&ancestor) {
                ancestor_state.descendants.borrow_mut().remove(&state.window);
            }
        }
        if let Some(target) = state.target.take() {
            if let Some(target_state) = self.windows.get(&target) {
                target_state
                    .direct_clients
                    .borrow_mut()
                    .shift_remove(&state.window);
            }
        }
        state.assert_consistent();
    }

    fn detach_from_target_frame(&self, request: &Rc<PresentRequest>) {
        let Some(target) = request.auto_target.get() else {
            return;
        };
        let Some(target_state) = self.windows.get(&target) else {
            return;
        };
        for frame in target_state.pending.borrow().iter() {
            frame
                .attached_clients
                .borrow_mut()
                .retain(|r| !Rc::ptr_eq(r, request));
        }
    }

    /// Severs every composite relation of a dying window and retires
    /// its remaining requests with a skip notification.
    ///
    /// Provider-side cleanup runs first: detaching the windows that
    /// depend on this one can release staging buffers, and those
    /// decisions assume this window's own edges are still intact.
    pub fn cleanup_window(&self, window: WindowId) {
        let Some(state) = self.windows.get(&window) else {
            return;
        };
        self.cleanup_below(&state);
        self.cleanup_above(&state);
        let pending: Vec<_> = state.pending.borrow_mut().drain(..).collect();
        for request in pending {
            self.detach_from_target_frame(&request);
            let (ust, msc) = self.backend.frame_counter(request.crtc).unwrap_or((0, 0));
            let kind = match request.internal.get() {
                true => CompleteKind::InternalFrame,
                false => CompleteKind::Buffer,
            };
            self.release_request_buffer(&request);
            self.retire(&request, kind, CompleteMode::Skip, ust, msc);
        }
        let holdback = state.client_buf.borrow_mut().take();
        if let Some(buffer) = holdback {
            self.release_buffer(&buffer);
        }
        self.windows.remove(&window);
        log::debug!("window {window}: composite state dropped");
    }

    /// Cleanup of the window as a target or ancestor of other windows.
    fn cleanup_below(&self, state: &Rc<WindowState>) {
        let clients: Vec<WindowId> = state.direct_clients.borrow().iter().copied().collect();
        for client in clients {
            if let Some(client_state) = self.windows.get(&client) {
                self.to_manual(&client_state);
            }
        }
        let descendants: Vec<WindowId> = state.descendants.borrow().iter().copied().collect();
        for descendant in descendants {
            if let Some(descendant_state) = self.windows.get(&descendant) {
                self.to_manual(&descendant_state);
            }
        }
        self.release_staging(state);
    }

    /// Cleanup of the window as a client, directly or through an
    /// ancestor.
    fn cleanup_above(&self, state: &Rc<WindowState>) {
        if let Some(ancestor) = state.ancestor.take() {
            if let Some(ancestor_state) = self.windows.get(&ancestor) {
                assert!(ancestor_state.target.get().is_some());
                assert!(state.target.get().is_none());
                ancestor_state.descendants.borrow_mut().remove(&state.window);
                if let Some(target) = ancestor_state.target.get() {
                    if let Some(target_state) = self.windows.get(&target) {
                        self.check_release_staging(&target_state);
                    }
                }
            }
        } else if let Some(target) = state.target.take() {
            if let Some(target_state) = self.windows.get(&target) {
                target_state
                    .direct_clients
                    .borrow_mut()
                    .shift_remove(&state.window);
                self.check_release_staging(&target_state);
            }
        }
    }
}

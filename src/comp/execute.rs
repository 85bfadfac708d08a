use {
    crate::{
        backend::CopyArea,
        buffer::Buffer,
        comp::{
            CompEngine, CompError,
            state::{STAGE_CURRENT, STAGE_NEXT, WindowState},
        },
        core::{CompleteKind, CompleteMode},
        request::PresentRequest,
        tree::WindowId,
    },
    std::rc::Rc,
};

impl CompEngine {
    /// Prepares the staging back buffer of a target: reused if the size
    /// still matches, otherwise allocated and filled with the current
    /// target content as the baseline.
    pub(super) fn stage_next_buffer(&self, target: &Rc<WindowState>) -> Result<(), CompError> {
        let extents = self.tree.extents(target.window);
        let size = (extents.width(), extents.height());
        {
            let slot = target.staging[STAGE_NEXT].borrow();
            if let Some(buffer) = &*slot {
                if buffer.size() == size {
                    // Already prepared.
                    return Ok(());
                }
            }
        }
        // Size changed or never staged.
        target.staging[STAGE_NEXT].take();
        let crtc = self.backend.window_crtc(target.window);
        let buffer = Buffer::allocate(&self.backend, crtc, size.0, size.1)?;
        self.backend.copy_region(
            CopyArea::Window(target.window),
            CopyArea::Surface(buffer.surface),
            None,
            0,
            0,
        );
        buffer.clean.set(true);
        *target.staging[STAGE_NEXT].borrow_mut() = Some(buffer);
        Ok(())
    }

    /// Rotates the staging pair for an internally generated frame.
    fn execute_target_buf(&self, target: &Rc<WindowState>) -> Result<(), CompError> {
        self.stage_next_buffer(target)?;
        let next = target.staging[STAGE_NEXT]
            .borrow()
            .clone()
            .expect("staging back buffer missing after staging");
        if !next.clean.get() {
            // The swapped-out buffer went stale, re-baseline it from the
            // current window content.
            self.backend.copy_region(
                CopyArea::Window(target.window),
                CopyArea::Surface(next.surface),
                None,
                0,
                0,
            );
            next.clean.set(true);
        }
        self.swap_staging(target, next);
        Ok(())
    }

    /// Updates the staging pair with content the target presented
    /// itself.
    fn update_target_buf(
        &self,
        target: &Rc<WindowState>,
        frame: &Rc<PresentRequest>,
    ) -> Result<(), CompError> {
        self.stage_next_buffer(target)?;
        let render = target.staging[STAGE_NEXT]
            .borrow()
            .clone()
            .expect("staging back buffer missing after staging");
        if let Some(buffer) = &*frame.buffer.borrow() {
            self.backend.copy_region(
                CopyArea::Surface(buffer.surface),
                CopyArea::Surface(render.surface),
                None,
                0,
                0,
            );
        }
        render.clean.set(true);
        if let Some(current) = &*target.staging[STAGE_CURRENT].borrow() {
            current.clean.set(false);
        }
        self.swap_staging(target, render);
        Ok(())
    }

    fn swap_staging(&self, target: &Rc<WindowState>, next: Rc<Buffer>) {
        let current = target.staging[STAGE_CURRENT].replace(Some(next));
        *target.staging[STAGE_NEXT].borrow_mut() = current;
    }

    /// Executes a target-side frame delivered by the driver at vblank,
    /// compositing the client forest into the front staging buffer.
    /// Safe to call for frames the engine already retired.
    pub fn execute_frame(&self, frame: &Rc<PresentRequest>, ust: u64, msc: u64) {
        if frame.retired.get() {
            return;
        }
        frame.queued.set(false);
        let target = self.windows.get(&frame.window);
        let target = match &target {
            Some(t) if t.is_target() => t,
            _ => {
                // The auto list was cleared while the frame was queued.
                if frame.internal.get() {
                    frame.buffer.borrow_mut().take();
                    self.retire(frame, CompleteKind::InternalFrame, CompleteMode::Skip, ust, msc);
                }
                return;
            }
        };
        let res = match frame.internal.get() {
            true => self.execute_target_buf(target),
            false => self.update_target_buf(target, frame),
        };
        if let Err(e) = res {
            log::error!(
                "Could not stage the composite buffer of window {}: {e}",
                target.window,
            );
            self.drain_attached(frame, CompleteMode::Skip, ust, msc);
            if frame.internal.get() {
                frame.buffer.borrow_mut().take();
                self.retire(frame, CompleteKind::InternalFrame, CompleteMode::Skip, ust, msc);
            }
            return;
        }
        let clients: Vec<WindowId> = target.direct_clients.borrow().iter().copied().collect();
        for client in clients {
            self.execute_client(frame, client);
        }
        self.drain_attached(frame, CompleteMode::Flip, ust, msc);
        if frame.internal.get() {
            frame.buffer.borrow_mut().take();
            self.retire(frame, CompleteKind::InternalFrame, CompleteMode::Flip, ust, msc);
        }
    }

    /// Retires every client request still attached to the frame,
    /// releasing their buffers back to the presenters.
    fn drain_attached(&self, frame: &Rc<PresentRequest>, mode: CompleteMode, ust: u64, msc: u64) {
        let attached: Vec<_> = frame.attached_clients.borrow_mut().drain(..).collect();
        for request in attached {
            self.release_request_buffer(&request);
            self.retire(&request, CompleteKind::Buffer, mode, ust, msc);
        }
    }

    /// Composites one client window and its descendants into the
    /// frame's buffer.
    fn execute_client(&self, frame: &Rc<PresentRequest>, window: WindowId) {
        let state = self.state_or_create(window);
        let extents = self.tree.extents(window);
        let clip = self.tree.clip_region(window);
        let Some(frame_buffer) = frame.buffer.borrow().clone() else {
            return;
        };
        let attached = frame
            .attached_clients
            .borrow()
            .iter()
            .find(|r| r.window == window)
            .cloned();
        let attached_buffer = attached.as_ref().and_then(|r| r.buffer.borrow().clone());
        if let Some(request) = &attached {
            if let Some(buffer) = &attached_buffer {
                let damage = match request.update.borrow_mut().take() {
                    Some(update) => update.translate(extents.x1(), extents.y1()).intersect(&clip),
                    None => clip.clone(),
                };
                self.backend.damage(window, &damage);
                // Keep the live window coherent for later fallback reads.
                self.backend.copy_region(
                    CopyArea::Surface(buffer.surface),
                    CopyArea::Window(window),
                    None,
                    0,
                    0,
                );
            }
        }
        {
            let mut update = frame.update.borrow_mut();
            if let Some(update) = &mut *update {
                *update = update.union(&clip);
            }
        }
        let clip = clip.translate(-extents.x1(), -extents.y1());
        if let Some(buffer) = &attached_buffer {
            self.backend.copy_region(
                CopyArea::Surface(buffer.surface),
                CopyArea::Surface(frame_buffer.surface),
                Some(&clip),
                extents.x1(),
                extents.y1(),
            );
        } else {
            let holdback = state.client_buf.borrow_mut().take();
            match holdback {
                Some(buffer) => {
                    self.backend.copy_region(
                        CopyArea::Surface(buffer.surface),
                        CopyArea::Window(window),
                        None,
                        0,
                        0,
                    );
                    self.backend.damage(window, &clip);
                    self.backend.copy_region(
                        CopyArea::Surface(buffer.surface),
                        CopyArea::Surface(frame_buffer.surface),
                        Some(&clip),
                        extents.x1(),
                        extents.y1(),
                    );
                    self.release_buffer(&buffer);
                }
                None => {
                    self.backend.copy_region(
                        CopyArea::Window(window),
                        CopyArea::Surface(frame_buffer.surface),
                        Some(&clip),
                        extents.x1(),
                        extents.y1(),
                    );
                }
            }
        }
        let descendants: Vec<WindowId> = state.descendants.borrow().iter().copied().collect();
        for descendant in descendants {
            self.execute_client(frame, descendant);
        }
    }

    /// Replaces the holdback buffer of a client window with the buffer
    /// of a just-completed request, releasing the previous one.
    pub(super) fn hold_client_buffer(&self, state: &Rc<WindowState>, request: &Rc<PresentRequest>) {
        let previous = state.client_buf.borrow_mut().take();
        if let Some(buffer) = previous {
            self.release_buffer(&buffer);
        }
        let buffer = request.buffer.borrow_mut().take();
        if let Some(buffer) = buffer {
            buffer.owner.set(Some(request.window));
            buffer.serial.set(request.serial);
            buffer.idle_fence.set(request.idle_fence.take());
            *state.client_buf.borrow_mut() = Some(buffer);
        }
    }

    pub(super) fn release_staging(&self, target: &WindowState) {
        target.staging[STAGE_CURRENT].take();
        target.staging[STAGE_NEXT].take();
    }

    /// Releases the staging pair once the target has neither clients
    /// nor descendants; no gpu memory is held for an inactive target.
    pub(super) fn check_release_staging(&self, target: &WindowState) {
        if target.has_dependants() {
            return;
        }
        self.release_staging(target);
    }
}

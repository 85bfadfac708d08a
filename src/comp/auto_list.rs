use {
    crate::{
        comp::{CompEngine, CompError, state::WindowState},
        tree::{Access, WindowId},
    },
    isnt::std_1::primitive::IsntSliceExt,
    smallvec::SmallVec,
    std::rc::Rc,
};

enum Undo {
    /// The window entered auto-compositing in this call.
    Added(WindowId),
    /// The window moved over from the previous list.
    Relinked(WindowId),
}

impl CompEngine {
    /// Replaces the set of windows composited into `target`. All or
    /// nothing: on failure the previous list is restored exactly and no
    /// window is left half-migrated.
    pub fn set_auto_list(&self, target: WindowId, windows: &[WindowId]) -> Result<(), CompError> {
        if let Err(e) = self.tree.lookup(target, Access::Read) {
            return Err(CompError::BadWindow(target, e));
        }
        let target_state = self.state_or_create(target);
        let old: Vec<WindowId> = target_state.direct_clients.borrow_mut().drain(..).collect();
        let mut remaining = old.clone();
        let mut undo: SmallVec<[Undo; 8]> = SmallVec::new();
        let mut result = Ok(());
        for &window in windows {
            if let Err(e) = self.tree.lookup(window, Access::Read) {
                result = Err(CompError::BadWindow(window, e));
                break;
            }
            let state = self.state_or_create(window);
            if let Some(current) = state.target.get() {
                if current != target {
                    result = Err(CompError::Conflict {
                        window,
                        target: current,
                    });
                    break;
                }
            }
            if !target_state.direct_clients.borrow_mut().insert(window) {
                // Listed twice.
                continue;
            }
            if let Some(pos) = remaining.iter().position(|&w| w == window) {
                remaining.remove(pos);
                undo.push(Undo::Relinked(window));
            } else {
                // The window becomes a direct client. A stale descendant
                // edge is dropped; check_ancestor re-derives those.
                if let Some(ancestor) = state.ancestor.take() {
                    if let Some(ancestor_state) = self.windows.get(&ancestor) {
                        ancestor_state.descendants.borrow_mut().remove(&window);
                    }
                }
                state.target.set(Some(target));
                state.assert_consistent();
                undo.push(Undo::Added(window));
                self.to_auto(&state);
            }
        }
        if let Err(e) = result {
            self.rollback(&target_state, &old, undo);
            self.check_release_staging(&target_state);
            return Err(e);
        }
        if remaining.is_not_empty() {
            log::debug!(
                "window {target}: {} windows left the auto list",
                remaining.len(),
            );
        }
        for &window in &remaining {
            if let Some(state) = self.windows.get(&window) {
                self.to_manual(&state);
            }
        }
        self.check_release_staging(&target_state);
        target_state.assert_consistent();
        Ok(())
    }

    /// Applies the undo log in reverse, then restores the previous
    /// direct-client list wholesale.
    fn rollback(
        &self,
        target_state: &Rc<WindowState>,
        old: &[WindowId],
        undo: SmallVec<[Undo; 8]>,
    ) {
        for action in undo.into_iter().rev() {
            match action {
                Undo::Added(window) => {
                    if let Some(state) = self.windows.get(&window) {
                        self.to_manual(&state);
                    }
                }
                Undo::Relinked(_) => {
                    // Membership is restored below; the window's target
                    // field never changed.
                }
            }
        }
        let mut clients = target_state.direct_clients.borrow_mut();
        clients.clear();
        for &window in old {
            clients.insert(window);
        }
    }
}

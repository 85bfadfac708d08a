use {
    crate::{
        backend::{Backend, BackendError, CrtcId, FenceId, SurfaceId},
        tree::WindowId,
    },
    std::{
        cell::Cell,
        fmt::{Debug, Formatter},
        rc::Rc,
    },
};

/// A gpu-backed surface shared between a staging slot and in-flight
/// present requests. The backing surface and any remaining fence are
/// destroyed through the driver when the last reference goes away.
pub struct Buffer {
    backend: Rc<dyn Backend>,
    pub surface: SurfaceId,
    pub width: i32,
    pub height: i32,
    /// Window the buffer belongs to, for idle-notification routing.
    pub owner: Cell<Option<WindowId>>,
    pub serial: Cell<u64>,
    pub idle_fence: Cell<Option<FenceId>>,
    /// Content already matches the composite source.
    pub clean: Cell<bool>,
}

impl Buffer {
    /// Allocates a fresh surface through the driver.
    pub fn allocate(
        backend: &Rc<dyn Backend>,
        crtc: CrtcId,
        width: i32,
        height: i32,
    ) -> Result<Rc<Self>, BackendError> {
        let surface = backend.create_surface(crtc, width, height)?;
        Ok(Self::wrap(backend, surface, width, height))
    }

    /// Wraps an existing surface, e.g. one presented by a client.
    pub fn wrap(backend: &Rc<dyn Backend>, surface: SurfaceId, width: i32, height: i32) -> Rc<Self> {
        Rc::new(Self {
            backend: backend.clone(),
            surface,
            width,
            height,
            owner: Cell::new(None),
            serial: Cell::new(0),
            idle_fence: Cell::new(None),
            clean: Cell::new(false),
        })
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }
}

impl Debug for Buffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("surface", &self.surface)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("clean", &self.clean.get())
            .finish_non_exhaustive()
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if let Some(fence) = self.idle_fence.take() {
            self.backend.destroy_fence(fence);
        }
        self.backend.destroy_surface(self.surface);
    }
}

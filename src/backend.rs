use {
    crate::{rect::Region, tree::WindowId},
    std::fmt::{Display, Formatter},
    thiserror::Error,
};

/// A display output with its own independent frame counter.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CrtcId(pub u32);

impl Display for CrtcId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Handle of a driver-allocated surface backing a [`Buffer`].
///
/// [`Buffer`]: crate::buffer::Buffer
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SurfaceId(pub u64);

impl Display for SurfaceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Opaque synchronization fence. The engine only signals and destroys
/// fences, it never creates them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct FenceId(pub u64);

impl Display for FenceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Source or destination of a pixel copy.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CopyArea {
    /// The live pixels of a window.
    Window(WindowId),
    /// A driver-allocated surface.
    Surface(SurfaceId),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("The driver could not allocate a {0}x{1} surface")]
    SurfaceAllocation(i32, i32),
    #[error("The frame counter of crtc {0} is not available")]
    FrameCounter(CrtcId),
    #[error("The driver could not queue a frame for msc {0}")]
    QueueFrame(u64),
}

/// Display-driver primitives consumed by the engine. None of these
/// block; vblank waits are registered through
/// [`PresentCore::queue_frame`].
///
/// [`PresentCore::queue_frame`]: crate::core::PresentCore::queue_frame
pub trait Backend {
    /// Returns the `(ust, msc)` pair of the crtc. The msc increases
    /// monotonically, once per refresh.
    fn frame_counter(&self, crtc: CrtcId) -> Result<(u64, u64), BackendError>;

    /// The crtc the window is currently scanned out on.
    fn window_crtc(&self, window: WindowId) -> CrtcId;

    fn create_surface(
        &self,
        crtc: CrtcId,
        width: i32,
        height: i32,
    ) -> Result<SurfaceId, BackendError>;

    fn destroy_surface(&self, surface: SurfaceId);

    /// Copies `src` to `dst`, restricted to `clip` and shifted by
    /// `(dx, dy)`. Pixel semantics are owned by the driver.
    fn copy_region(&self, src: CopyArea, dst: CopyArea, clip: Option<&Region>, dx: i32, dy: i32);

    /// Reports a region of the window as changed for downstream damage
    /// propagation.
    fn damage(&self, window: WindowId, region: &Region);

    fn signal_fence(&self, fence: FenceId);

    fn destroy_fence(&self, fence: FenceId);
}

//! Frame scheduling: one pending frame at a time, cancellable by handle.

/// Identifies one scheduled frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// Display-refresh scheduling service
///
/// The host calls [`FrameScheduler::take_due`] on every refresh to learn which
/// scheduled frame (if any) should run now.
pub trait FrameScheduler {
    /// Request a frame on the next refresh
    fn schedule_next_frame(&mut self) -> FrameHandle;

    /// Withdraw a scheduled frame; unknown or already-run handles are ignored
    fn cancel(&mut self, handle: FrameHandle);

    /// Frame due on this refresh, consuming it
    fn take_due(&mut self) -> Option<FrameHandle>;
}

/// Scheduler for hosts that refresh on their own clock (window redraws,
/// recording loops): a scheduled frame becomes due on the next refresh
#[derive(Debug, Default)]
pub struct RefreshScheduler {
    next_id: u64,
    pending: Option<FrameHandle>,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl FrameScheduler for RefreshScheduler {
    fn schedule_next_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending = Some(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }

    fn take_due(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }
}

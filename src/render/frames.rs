use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId(u64);

/// Display-refresh callback queue. Requested frames run on the next refresh;
/// a cancelled frame never runs.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    next: u64,
    pending: BTreeSet<FrameId>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self) -> FrameId {
        self.next += 1;
        let id = FrameId(self.next);
        self.pending.insert(id);
        id
    }

    pub fn cancel(&mut self, id: FrameId) -> bool {
        self.pending.remove(&id)
    }

    /// Frames due on this refresh. Frames requested while running them wait
    /// for the next refresh.
    pub fn take_due(&mut self) -> Vec<FrameId> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

/// Handle of a self-rescheduling render task: at most one frame outstanding.
#[derive(Debug, Default)]
pub struct FrameTask {
    scheduled: Option<FrameId>,
}

impl FrameTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the next frame, replacing any frame still outstanding.
    pub fn schedule(&mut self, frames: &mut FrameScheduler) -> FrameId {
        if let Some(prev) = self.scheduled.take() {
            frames.cancel(prev);
        }
        let id = frames.request();
        self.scheduled = Some(id);
        id
    }

    pub fn cancel(&mut self, frames: &mut FrameScheduler) {
        if let Some(id) = self.scheduled.take() {
            frames.cancel(id);
            log::debug!("render frame {id:?} cancelled");
        }
    }

    pub fn owns(&self, id: FrameId) -> bool {
        self.scheduled == Some(id)
    }

    #[cfg(test)]
    pub fn is_scheduled(&self) -> bool {
        self.scheduled.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_withdraws_only_that_frame() {
        let mut frames = FrameScheduler::new();
        let a = frames.request();
        let b = frames.request();
        assert!(frames.cancel(a));
        assert!(!frames.cancel(a));
        assert_eq!(frames.take_due(), vec![b]);
        assert_eq!(frames.pending(), 0);
    }

    #[test]
    fn rescheduled_frames_wait_for_next_refresh() {
        let mut frames = FrameScheduler::new();
        let mut task = FrameTask::new();
        task.schedule(&mut frames);

        let due = frames.take_due();
        assert_eq!(due.len(), 1);
        assert!(task.owns(due[0]));

        let next = task.schedule(&mut frames);
        assert!(!task.owns(due[0]));
        assert!(task.owns(next));
        assert_eq!(frames.pending(), 1);
    }

    #[test]
    fn task_keeps_a_single_outstanding_frame() {
        let mut frames = FrameScheduler::new();
        let mut task = FrameTask::new();
        task.schedule(&mut frames);
        task.schedule(&mut frames);
        assert_eq!(frames.pending(), 1);

        task.cancel(&mut frames);
        assert_eq!(frames.pending(), 0);
        assert!(!task.is_scheduled());
    }
}

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

// ────────────────────────────────────────────────────────────────
// JobStatus - the record served by `/status`
// ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStatus {
    pub progress: u8,
    pub status: String,
}

impl JobStatus {
    pub fn new(progress: u8, status: impl Into<String>) -> Self {
        Self {
            progress: progress.min(100),
            status: status.into(),
        }
    }

    pub fn idle() -> Self {
        Self::new(0, "Idle")
    }
}

/// Ordered steps of one pipeline run, each with the progress/status it publishes on entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Starting,
    Downloading,
    Separating,
    Encoding,
    Done,
}

impl Stage {
    pub fn progress(self) -> u8 {
        match self {
            Stage::Starting => 5,
            Stage::Downloading => 10,
            Stage::Separating => 40,
            Stage::Encoding => 80,
            Stage::Done => 100,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Starting => "Starting...",
            Stage::Downloading => "Downloading Audio...",
            Stage::Separating => "Running AI Separation...",
            Stage::Encoding => "Optimizing Audio...",
            Stage::Done => "Done!",
        }
    }
}

// ────────────────────────────────────────────────────────────────
// JobState - shared holder plus the single job slot
// ────────────────────────────────────────────────────────────────

struct Inner {
    status: RwLock<JobStatus>,
    busy: AtomicBool,
}

/// Progress record of the current (or most recent) job, shared between the
/// pipeline and the status handler. Cloning shares the same record.
#[derive(Clone)]
pub struct JobState {
    inner: Arc<Inner>,
}

impl Default for JobState {
    fn default() -> Self {
        Self::new()
    }
}

impl JobState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                status: RwLock::new(JobStatus::idle()),
                busy: AtomicBool::new(false),
            }),
        }
    }

    /// Copy of the current record. Only contends with the brief writes made
    /// at stage transitions, never with a running stage.
    pub fn snapshot(&self) -> JobStatus {
        self.inner
            .status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, progress: u8, status: impl Into<String>) {
        *self
            .inner
            .status
            .write()
            .unwrap_or_else(PoisonError::into_inner) = JobStatus::new(progress, status);
    }

    /// Replaces the status text, leaving progress where it was.
    pub fn set_status(&self, status: impl Into<String>) {
        self.inner
            .status
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .status = status.into();
    }

    pub fn enter(&self, stage: Stage) {
        self.set(stage.progress(), stage.label());
    }

    /// Claims the single job slot. Returns `None` while another run holds it.
    pub fn try_begin(&self) -> Option<JobGuard> {
        self.inner
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| JobGuard {
                inner: Arc::clone(&self.inner),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.inner.busy.load(Ordering::Acquire)
    }
}

/// Holds the job slot; released on drop.
pub struct JobGuard {
    inner: Arc<Inner>,
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        self.inner.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_and_reads_are_stable() {
        let state = JobState::new();
        assert_eq!(state.snapshot(), JobStatus::idle());
        assert_eq!(state.snapshot(), state.snapshot());
    }

    #[test]
    fn clones_share_one_record() {
        let state = JobState::new();
        let reader = state.clone();
        state.enter(Stage::Separating);
        assert_eq!(
            reader.snapshot(),
            JobStatus::new(40, "Running AI Separation...")
        );
    }

    #[test]
    fn set_status_keeps_progress() {
        let state = JobState::new();
        state.enter(Stage::Encoding);
        state.set_status("Error: File Missing");
        assert_eq!(state.snapshot(), JobStatus::new(80, "Error: File Missing"));
    }

    #[test]
    fn progress_is_capped() {
        let state = JobState::new();
        state.set(250, "overflow");
        assert_eq!(state.snapshot().progress, 100);
    }

    #[test]
    fn slot_admits_one_job_at_a_time() {
        let state = JobState::new();
        let guard = state.try_begin().expect("slot should be free");
        assert!(state.is_busy());
        assert!(state.try_begin().is_none());
        drop(guard);
        assert!(!state.is_busy());
        assert!(state.try_begin().is_some());
    }
}

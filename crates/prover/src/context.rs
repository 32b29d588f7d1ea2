use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use crate::{Error, Stage};

/// No stage entered yet.
const NO_STAGE: usize = usize::MAX;

/// Deadline and cancellation state shared by every stage of one submission.
///
/// Clones share the same state: cancelling any clone cancels them all.
#[derive(Clone, Debug)]
pub struct SubmissionContext {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    deadline: Option<Instant>,
    cancelled: AtomicBool,
    stage: AtomicUsize,
}

impl SubmissionContext {
    /// Context expiring `timeout` from now, or never if `None`.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self::with_deadline(timeout.map(|t| Instant::now() + t))
    }

    pub fn with_deadline(deadline: Option<Instant>) -> Self {
        Self {
            inner: Arc::new(Inner {
                deadline,
                cancelled: AtomicBool::new(false),
                stage: AtomicUsize::new(NO_STAGE),
            }),
        }
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Time left before the deadline. `None` without a deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.inner
            .deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.inner
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Long-running collaborator calls poll this and bail out once it turns true.
    pub fn should_stop(&self) -> bool {
        self.is_cancelled() || self.is_expired()
    }

    /// The stage most recently entered.
    pub fn stage(&self) -> Option<Stage> {
        Stage::ALL.get(self.inner.stage.load(Ordering::SeqCst)).copied()
    }

    /// Record that `stage` is about to run, unless the submission was cancelled or timed out.
    pub(crate) fn enter(&self, stage: Stage) -> Result<(), Error> {
        if self.is_cancelled() {
            return Err(Error::Cancelled { stage });
        }
        if self.is_expired() {
            return Err(Error::DeadlineExceeded {
                stage,
                started: false,
            });
        }
        self.inner.stage.store(stage.index(), Ordering::SeqCst);
        Ok(())
    }

    /// Guard cancelling the context when dropped.
    pub fn cancel_on_drop(&self) -> CancelOnDrop {
        CancelOnDrop(self.clone())
    }
}

/// Cancels its [`SubmissionContext`] on drop, e.g. when the caller of an in-flight submission
/// goes away.
#[derive(Debug)]
pub struct CancelOnDrop(SubmissionContext);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_records_the_stage() {
        let ctx = SubmissionContext::new(None);
        assert_eq!(ctx.stage(), None);
        ctx.enter(Stage::GenerateProof).unwrap();
        assert_eq!(ctx.stage(), Some(Stage::GenerateProof));
        assert_eq!(ctx.remaining(), None);
    }

    #[test]
    fn cancelled_context_refuses_the_next_stage() {
        let ctx = SubmissionContext::new(None);
        ctx.enter(Stage::BuildInput).unwrap();
        ctx.clone().cancel();

        assert!(ctx.should_stop());
        assert!(matches!(
            ctx.enter(Stage::GenerateWitness),
            Err(Error::Cancelled { stage: Stage::GenerateWitness })
        ));
        assert_eq!(ctx.stage(), Some(Stage::BuildInput));
    }

    #[test]
    fn expired_context_refuses_every_stage() {
        let ctx = SubmissionContext::with_deadline(Some(Instant::now()));
        assert!(ctx.is_expired());
        assert!(matches!(
            ctx.enter(Stage::BuildInput),
            Err(Error::DeadlineExceeded {
                stage: Stage::BuildInput,
                started: false
            })
        ));
        assert_eq!(
            ctx.enter(Stage::GenerateWitness).unwrap_err().to_string(),
            "submission deadline exceeded before generating witness"
        );
    }

    #[test]
    fn guard_cancels_on_drop() {
        let ctx = SubmissionContext::new(None);
        let guard = ctx.cancel_on_drop();
        assert!(!ctx.is_cancelled());

        drop(guard);
        assert!(ctx.is_cancelled());
    }
}

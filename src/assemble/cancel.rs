//! Cooperative cancellation and per-page deadlines.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Error, PageError, Stage};

/// A shared flag that asks a run to stop.
///
/// Clones observe the same flag. Pages check it before they start and
/// between pipeline steps; a page interrupted this way is discarded.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Why a page stopped before producing output.
#[derive(Debug)]
pub(crate) enum Interrupt {
    /// The run was cancelled.
    Cancelled,
    /// Another page failed under strict error handling.
    Stopped,
    /// This page failed.
    Failed(PageError),
}

impl From<PageError> for Interrupt {
    fn from(err: PageError) -> Self {
        Interrupt::Failed(err)
    }
}

/// Checks made between the steps of one page.
pub(crate) struct Checkpoint<'a> {
    page: usize,
    token: &'a CancellationToken,
    stop: &'a AtomicBool,
    deadline: Option<(Instant, Duration)>,
}

impl<'a> Checkpoint<'a> {
    pub(crate) fn new(
        page: usize,
        token: &'a CancellationToken,
        stop: &'a AtomicBool,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            page,
            token,
            stop,
            // A limit past the end of the clock means no deadline.
            deadline: timeout.and_then(|limit| {
                Instant::now()
                    .checked_add(limit)
                    .map(|deadline| (deadline, limit))
            }),
        }
    }

    pub(crate) fn page(&self) -> usize {
        self.page
    }

    /// Fail if the run was interrupted or the page is out of time.
    ///
    /// `stage` is the step about to start and is recorded on timeout.
    pub(crate) fn check(&self, stage: Stage) -> Result<(), Interrupt> {
        if self.token.is_cancelled() {
            return Err(Interrupt::Cancelled);
        }
        if self.stop.load(Ordering::SeqCst) {
            return Err(Interrupt::Stopped);
        }
        if let Some((deadline, limit)) = self.deadline {
            if Instant::now() >= deadline {
                return Err(self.fail(stage, Error::TimedOut(limit)));
            }
        }
        Ok(())
    }

    /// Wrap an engine error as this page's failure.
    pub(crate) fn fail(&self, stage: Stage, source: Error) -> Interrupt {
        Interrupt::Failed(PageError::new(self.page, stage, source))
    }
}

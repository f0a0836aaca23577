//! Runs per-page work sequentially or on a bounded worker pool.
//!
//! Workers report each finished page over a channel; the calling thread
//! drains it, reports progress and puts results back into page order.

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::unbounded;

use super::cancel::{Checkpoint, Interrupt};
use super::options::{AssembleOptions, ErrorMode};
use crate::error::{Error, PageError, Result};

/// What happened to one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    /// The page produced output.
    Completed,
    /// The page failed and produced nothing.
    Failed,
    /// The page was dropped because the run was cancelled.
    Cancelled,
    /// The page was dropped because another page failed in strict mode.
    Skipped,
}

/// Progress report sent after each page.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    /// 0-indexed page this report is about
    pub page: usize,
    pub status: PageStatus,
    /// Pages reported so far, this one included
    pub done: usize,
    /// Pages scheduled in this run
    pub total: usize,
}

/// Per-page results of a run, ordered by page index.
pub(crate) struct RunOutcome<T> {
    pub completed: Vec<(usize, T)>,
    pub failures: Vec<PageError>,
    pub cancelled: bool,
}

/// Run `task` for every page in `pages`.
///
/// In strict mode the first failure stops new pages from starting and the
/// lowest failing page is returned as the error.
pub(crate) fn run_pages<T, F, P>(
    pages: &[usize],
    options: &AssembleOptions,
    task: F,
    mut on_progress: P,
) -> Result<RunOutcome<T>>
where
    T: Send,
    F: Fn(&Checkpoint<'_>) -> std::result::Result<T, Interrupt> + Sync,
    P: FnMut(&Progress),
{
    let stop = AtomicBool::new(false);
    let strict = options.error_mode == ErrorMode::Strict;

    let run_one = |page: usize| -> std::result::Result<T, Interrupt> {
        if options.cancellation.is_cancelled() {
            return Err(Interrupt::Cancelled);
        }
        if stop.load(Ordering::SeqCst) {
            return Err(Interrupt::Stopped);
        }
        let checkpoint = Checkpoint::new(
            page,
            &options.cancellation,
            &stop,
            options.page_timeout,
        );
        let result = task(&checkpoint);
        if strict && matches!(result, Err(Interrupt::Failed(_))) {
            stop.store(true, Ordering::SeqCst);
        }
        result
    };

    let mut collector = Collector::new(pages.len());

    if options.parallel && pages.len() > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers)
            .thread_name(|i| format!("article-parser-{}", i))
            .build()
            .map_err(|e| Error::WorkerPool(e.to_string()))?;

        log::debug!(
            "Processing {} pages on {} workers",
            pages.len(),
            pool.current_num_threads()
        );

        pool.in_place_scope(|scope| {
            let (tx, rx) = unbounded();
            for &page in pages {
                let tx = tx.clone();
                let run_one = &run_one;
                scope.spawn(move |_| {
                    // The receiver outlives every sender.
                    let _ = tx.send((page, run_one(page)));
                });
            }
            drop(tx);

            for (page, result) in rx {
                on_progress(&collector.record(page, result));
            }
        });
    } else {
        for &page in pages {
            let result = run_one(page);
            on_progress(&collector.record(page, result));
        }
    }

    let mut outcome = collector.finish();
    log::info!(
        "{} of {} pages completed, {} failed",
        outcome.completed.len(),
        pages.len(),
        outcome.failures.len()
    );

    if strict && !outcome.failures.is_empty() {
        return Err(outcome.failures.swap_remove(0).into());
    }

    Ok(outcome)
}

struct Collector<T> {
    total: usize,
    done: usize,
    completed: Vec<(usize, T)>,
    failures: Vec<PageError>,
    cancelled: bool,
}

impl<T> Collector<T> {
    fn new(total: usize) -> Self {
        Self {
            total,
            done: 0,
            completed: Vec::with_capacity(total),
            failures: Vec::new(),
            cancelled: false,
        }
    }

    fn record(&mut self, page: usize, result: std::result::Result<T, Interrupt>) -> Progress {
        self.done += 1;
        let status = match result {
            Ok(value) => {
                self.completed.push((page, value));
                PageStatus::Completed
            }
            Err(Interrupt::Failed(err)) => {
                log::warn!("{}", err);
                self.failures.push(err);
                PageStatus::Failed
            }
            Err(Interrupt::Cancelled) => {
                self.cancelled = true;
                PageStatus::Cancelled
            }
            Err(Interrupt::Stopped) => PageStatus::Skipped,
        };
        Progress {
            page,
            status,
            done: self.done,
            total: self.total,
        }
    }

    fn finish(mut self) -> RunOutcome<T> {
        self.completed.sort_by_key(|(page, _)| *page);
        self.failures.sort_by_key(|err| err.page);
        RunOutcome {
            completed: self.completed,
            failures: self.failures,
            cancelled: self.cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::cancel::CancellationToken;
    use crate::error::Stage;

    fn square(cp: &Checkpoint<'_>) -> std::result::Result<usize, Interrupt> {
        cp.check(Stage::Ocr)?;
        Ok(cp.page() * cp.page())
    }

    #[test]
    fn test_parallel_results_in_page_order() {
        let pages: Vec<usize> = (0..32).collect();
        let options = AssembleOptions::default().with_workers(4);
        let mut reports = 0;
        let outcome = run_pages(&pages, &options, square, |_| reports += 1).unwrap();

        assert_eq!(reports, 32);
        let got: Vec<_> = outcome.completed.iter().map(|(p, v)| (*p, *v)).collect();
        let expected: Vec<_> = pages.iter().map(|p| (*p, p * p)).collect();
        assert_eq!(got, expected);
        assert!(!outcome.cancelled);
    }

    #[test]
    fn test_lenient_collects_failures() {
        let pages = [0, 1, 2, 3];
        let options = AssembleOptions::default().sequential();
        let outcome = run_pages(
            &pages,
            &options,
            |cp| {
                if cp.page() % 2 == 1 {
                    Err(cp.fail(Stage::Detect, Error::Detect("bad page".into())))
                } else {
                    Ok(cp.page())
                }
            },
            |_| {},
        )
        .unwrap();

        let done: Vec<usize> = outcome.completed.iter().map(|(p, _)| *p).collect();
        let failed: Vec<usize> = outcome.failures.iter().map(|e| e.page).collect();
        assert_eq!(done, vec![0, 2]);
        assert_eq!(failed, vec![1, 3]);
    }

    #[test]
    fn test_strict_stops_at_first_failure() {
        let pages = [0, 1, 2, 3];
        let options = AssembleOptions::default().sequential().strict();
        let mut statuses = Vec::new();
        let err = run_pages(
            &pages,
            &options,
            |cp| {
                cp.check(Stage::Ocr)?;
                if cp.page() >= 1 {
                    Err(cp.fail(Stage::Ocr, Error::Ocr("engine died".into())))
                } else {
                    Ok(())
                }
            },
            |p| statuses.push(p.status),
        )
        .err()
        .unwrap();

        assert!(matches!(err, Error::Page(ref p) if p.page == 1));
        assert_eq!(
            statuses,
            vec![
                PageStatus::Completed,
                PageStatus::Failed,
                PageStatus::Skipped,
                PageStatus::Skipped
            ]
        );
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let options = AssembleOptions::default().with_cancellation(token);
        let outcome = run_pages(&[0, 1, 2], &options, square, |_| {}).unwrap();
        assert!(outcome.completed.is_empty());
        assert!(outcome.cancelled);
    }

    #[test]
    fn test_empty_run() {
        let outcome = run_pages(&[], &AssembleOptions::default(), square, |_| {}).unwrap();
        assert!(outcome.completed.is_empty());
        assert!(outcome.failures.is_empty());
    }
}

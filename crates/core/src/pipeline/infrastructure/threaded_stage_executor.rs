use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::pipeline::pipeline_error::PipelineError;
use crate::pipeline::stage_executor::{StageExecutor, StageWork};
use crate::pipeline::work_queue::WorkQueue;

/// Drains the queue with a fixed pool of scoped OS threads.
///
/// Each worker pops until the queue is empty. The first failing worker raises
/// a shared flag so its peers stop popping; the call blocks until all workers
/// have been joined and then reports the first error seen.
pub struct ThreadedStageExecutor;

impl ThreadedStageExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ThreadedStageExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl StageExecutor for ThreadedStageExecutor {
    fn execute(
        &self,
        stage: &str,
        queue: &WorkQueue,
        threads: usize,
        work: &StageWork<'_>,
    ) -> Result<(), PipelineError> {
        let threads = threads.max(1);
        let cancelled = AtomicBool::new(false);
        log::debug!(
            "Stage {stage}: {} items across {threads} workers",
            queue.len()
        );

        thread::scope(|s| {
            let handles: Vec<_> = (0..threads)
                .map(|_| s.spawn(|| run_worker(queue, work, &cancelled)))
                .collect();

            let mut first_error = None;
            for handle in handles {
                let outcome = handle.join().unwrap_or_else(|_| {
                    cancelled.store(true, Ordering::Relaxed);
                    Err(PipelineError::WorkerPanicked {
                        stage: stage.to_string(),
                    })
                });
                if let Err(e) = outcome {
                    first_error.get_or_insert(e);
                }
            }

            match first_error {
                Some(e) => Err(e),
                None => Ok(()),
            }
        })
    }
}

fn run_worker(
    queue: &WorkQueue,
    work: &StageWork<'_>,
    cancelled: &AtomicBool,
) -> Result<(), PipelineError> {
    while !cancelled.load(Ordering::Relaxed) {
        let Some(id) = queue.pop() else {
            break;
        };
        if let Err(e) = work(&id) {
            cancelled.store(true, Ordering::Relaxed);
            return Err(e);
        }
    }
    Ok(())
}

use crate::pipeline::pipeline_error::PipelineError;
use crate::pipeline::work_queue::WorkQueue;

/// Per-identifier body of a stage.
pub type StageWork<'a> = dyn Fn(&str) -> Result<(), PipelineError> + Sync + 'a;

/// Runs a stage's work over a pre-filled queue.
///
/// This is a port. Infrastructure decides how the queue is drained; callers
/// only rely on `execute` returning after every item has been handled or the
/// stage has failed.
pub trait StageExecutor: Send + Sync {
    fn execute(
        &self,
        stage: &str,
        queue: &WorkQueue,
        threads: usize,
        work: &StageWork<'_>,
    ) -> Result<(), PipelineError>;
}

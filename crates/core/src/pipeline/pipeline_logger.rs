use std::collections::BTreeMap;
use std::time::Instant;

/// Observer for stage-level pipeline events.
///
/// The use case reports its cache decisions, stage timings and artifact
/// counts here; callers pick where they end up.
pub trait PipelineLogger: Send {
    /// Report that `completed` of `total` stages have finished.
    fn progress(&mut self, completed: usize, total: usize);

    /// Record the wall-clock time a stage took.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a count or other scalar (e.g. descriptors per run).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _completed: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI logger: forwards messages to `log::info!` and keeps stage timings and
/// metrics for a closing summary.
pub struct StdoutPipelineLogger {
    timings: BTreeMap<String, f64>,
    metrics: BTreeMap<String, f64>,
    start_time: Instant,
    stages_completed: usize,
    messages: Vec<String>,
}

impl StdoutPipelineLogger {
    pub fn new() -> Self {
        Self {
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            start_time: Instant::now(),
            stages_completed: 0,
            messages: Vec::new(),
        }
    }

    /// Returns the formatted summary string, or `None` if no data recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Pipeline summary ({} stages, {:.1}s total):",
            self.stages_completed,
            elapsed_ms / 1000.0
        )];

        for (stage, &duration_ms) in &self.timings {
            let pct = if elapsed_ms > 0.0 {
                (duration_ms / elapsed_ms * 100.0).min(100.0)
            } else {
                0.0
            };
            lines.push(format!("  {stage:12}: {duration_ms:9.1}ms  ({pct:4.1}%)"));
        }
        for (name, value) in &self.metrics {
            lines.push(format!("  {name}: {value}"));
        }

        Some(lines.join("\n"))
    }

    pub fn timing_for(&self, stage: &str) -> Option<f64> {
        self.timings.get(stage).copied()
    }

    pub fn metric_for(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, completed: usize, total: usize) {
        self.stages_completed = completed;
        log::info!("Completed {completed}/{total} stages");
    }

    /// A stage timed twice keeps the accumulated total.
    fn timing(&mut self, stage: &str, duration_ms: f64) {
        *self.timings.entry(stage.to_string()).or_default() += duration_ms;
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.insert(name.to_string(), value);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

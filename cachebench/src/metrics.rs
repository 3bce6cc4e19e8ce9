//! Metrics declaration and initialization.

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Track responses handed back to callers, labelled by strategy and source.
    pub static ref RESPONSES_TOTAL: &'static str = {
        metrics::describe_counter!(
            "cachebench_responses_total",
            "Total number of intercepted requests answered."
        );
        "cachebench_responses_total"
    };
    /// Histogram of time spent answering an intercepted request.
    pub static ref RESPONSE_DURATION: &'static str = {
        metrics::describe_histogram!(
            "cachebench_response_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of intercepted requests in seconds."
        );
        "cachebench_response_duration_seconds"
    };
    /// Track store writes that failed and were dropped.
    pub static ref STORE_WRITE_FAILURES: &'static str = {
        metrics::describe_counter!(
            "cachebench_store_write_failures_total",
            "Total number of failed write-throughs."
        );
        "cachebench_store_write_failures_total"
    };

    // Offload manager metrics

    /// Track number of offload tasks spawned.
    pub static ref OFFLOAD_TASKS_SPAWNED: &'static str = {
        metrics::describe_counter!(
            "cachebench_offload_tasks_spawned_total",
            "Total number of offload tasks spawned."
        );
        "cachebench_offload_tasks_spawned_total"
    };
    /// Track number of offload tasks that ran to completion or were cancelled.
    pub static ref OFFLOAD_TASKS_COMPLETED: &'static str = {
        metrics::describe_counter!(
            "cachebench_offload_tasks_completed_total",
            "Total number of offload tasks finished."
        );
        "cachebench_offload_tasks_completed_total"
    };
    /// Track number of offload tasks cancelled by timeout.
    pub static ref OFFLOAD_TASKS_TIMEOUT: &'static str = {
        metrics::describe_counter!(
            "cachebench_offload_tasks_timeout_total",
            "Total number of offload tasks cancelled by timeout."
        );
        "cachebench_offload_tasks_timeout_total"
    };
}

/// Records one answered request.
#[cfg(feature = "metrics")]
pub(crate) fn record_response(
    strategy: cachebench_core::Strategy,
    source: cachebench_core::ResponseSource,
    elapsed: std::time::Duration,
) {
    metrics::counter!(
        *RESPONSES_TOTAL,
        "strategy" => strategy.as_str(),
        "source" => source.as_str()
    )
    .increment(1);
    metrics::histogram!(*RESPONSE_DURATION, "strategy" => strategy.as_str())
        .record(elapsed.as_secs_f64());
}

#[cfg(not(feature = "metrics"))]
#[inline(always)]
pub(crate) fn record_response(
    _strategy: cachebench_core::Strategy,
    _source: cachebench_core::ResponseSource,
    _elapsed: std::time::Duration,
) {
}

/// Records a dropped write-through.
#[cfg(feature = "metrics")]
pub(crate) fn record_store_write_failure() {
    metrics::counter!(*STORE_WRITE_FAILURES).increment(1);
}

#[cfg(not(feature = "metrics"))]
#[inline(always)]
pub(crate) fn record_store_write_failure() {}

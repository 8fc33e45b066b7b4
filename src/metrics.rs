use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

fn register() {
    // Pre-register counters so they appear even before the first increment.
    for op in [
        "list_masters",
        "get_master",
        "list_trades",
        "request_analysis",
        "request_update",
    ] {
        counter!("service_requests_total", "op" => op).absolute(0);
        counter!("service_errors_total", "op" => op).absolute(0);
    }
    counter!("stale_responses_discarded_total").absolute(0);
    counter!("clipboard_writes_total", "outcome" => "ok").absolute(0);
    counter!("clipboard_writes_total", "outcome" => "failed").absolute(0);
}

/// Install the Prometheus exporter as the global recorder and register all
/// application metrics. The handle's `render()` produces the scrape payload.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    register();
    Ok(handle)
}

/// A handle that is not installed globally. Only one recorder may exist per
/// process, so tests building many apps use this instead.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

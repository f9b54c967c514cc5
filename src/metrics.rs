use std::net::SocketAddr;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener and register all
/// application metrics. The exporter serves the text/plain scrape payload
/// at `http://{addr}/metrics`.
pub fn init_metrics(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    // Pre-register counters so they appear even before the first increment.
    counter!("predictions_recorded_total").absolute(0);
    counter!("outcomes_resolved_total").absolute(0);
    counter!("outcome_parse_failures_total").absolute(0);
    counter!("retrains_succeeded_total").absolute(0);
    counter!("retrains_failed_total").absolute(0);
    counter!("improvement_cycles_total").absolute(0);

    // Pre-register gauges at zero.
    gauge!("pending_outcomes").set(0.0);
    gauge!("active_model_accuracy").set(0.0);

    // Histogram is lazily created on first record; force creation.
    histogram!("improvement_cycle_seconds").record(0.0);

    Ok(())
}

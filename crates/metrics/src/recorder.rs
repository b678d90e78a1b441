//! Recorder setup.

use {anyhow::Result, tracing::info};

/// Renders whatever the installed recorder has collected.
#[derive(Clone)]
pub struct MetricsHandle {
    #[cfg(feature = "prometheus")]
    prometheus: metrics_exporter_prometheus::PrometheusHandle,
}

impl MetricsHandle {
    /// Prometheus text exposition, or an empty string without the
    /// `prometheus` feature.
    #[must_use]
    pub fn render(&self) -> String {
        #[cfg(feature = "prometheus")]
        {
            self.prometheus.render()
        }
        #[cfg(not(feature = "prometheus"))]
        {
            String::new()
        }
    }

    /// Handle backed by a recorder that was never installed. Metrics emitted
    /// through the facade are dropped.
    fn detached() -> Self {
        Self {
            #[cfg(feature = "prometheus")]
            prometheus: metrics_exporter_prometheus::PrometheusBuilder::new()
                .build_recorder()
                .handle(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetricsRecorderConfig {
    pub enabled: bool,
    /// Labels attached to every metric.
    pub global_labels: Vec<(String, String)>,
}

/// Install the global recorder. Call at most once per process.
///
/// # Errors
///
/// Fails if a recorder is already installed or a bucket definition is
/// rejected by the exporter.
pub fn init_metrics(config: MetricsRecorderConfig) -> Result<MetricsHandle> {
    if !config.enabled {
        info!("metrics collection is disabled");
        return Ok(MetricsHandle::detached());
    }

    #[cfg(feature = "prometheus")]
    {
        let prometheus = install_prometheus(config.global_labels)?;
        info!("prometheus metrics recorder installed");
        Ok(MetricsHandle { prometheus })
    }

    #[cfg(not(feature = "prometheus"))]
    {
        info!("metrics enabled but built without the prometheus exporter");
        Ok(MetricsHandle::detached())
    }
}

#[cfg(feature = "prometheus")]
fn install_prometheus(
    global_labels: Vec<(String, String)>,
) -> Result<metrics_exporter_prometheus::PrometheusHandle> {
    use {
        crate::{buckets, handshake},
        metrics_exporter_prometheus::{Matcher, PrometheusBuilder},
    };

    let builder = PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full(handshake::VALIDATION_DURATION_SECONDS.to_string()),
        buckets::VALIDATION_DURATION,
    )?;
    let builder = global_labels
        .into_iter()
        .fold(builder, |b, (key, value)| b.add_global_label(key, value));

    // No HTTP listener; the handle renders on demand.
    Ok(builder.install_recorder()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn disabled_config_yields_empty_render() {
        let handle = init_metrics(MetricsRecorderConfig::default()).unwrap();
        assert!(handle.render().trim().is_empty());
    }
}

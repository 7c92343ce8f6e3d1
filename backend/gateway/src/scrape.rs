//! Prometheus scrape endpoint.
//!
//! Every request computes one fresh snapshot and sets the gauges from it;
//! nothing is accumulated between scrapes. Setting and gathering happen under
//! one lock, so a body never mixes two snapshots.

use std::sync::Mutex;

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chatpulse_core::{Snapshot, unix_now};
use chatpulse_metrics::gauges;
use prometheus::{Encoder, IntGauge, Registry, TextEncoder};
use tracing::error;

use crate::server::GatewayState;

/// Gauges registered in a private registry, one per snapshot field.
pub struct GaugeExporter {
    registry: Registry,
    gauges: Mutex<Vec<IntGauge>>,
}

impl GaugeExporter {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();
        let mut registered = Vec::new();
        for g in gauges(&Snapshot::default()) {
            let gauge = IntGauge::new(g.name, g.help)?;
            registry.register(Box::new(gauge.clone()))?;
            registered.push(gauge);
        }
        Ok(Self {
            registry,
            gauges: Mutex::new(registered),
        })
    }

    /// Set every gauge from `snapshot` and encode the registry in text format.
    pub fn render(&self, snapshot: &Snapshot) -> prometheus::Result<String> {
        let families = {
            let registered = self
                .gauges
                .lock()
                .map_err(|_| prometheus::Error::Msg("gauge lock poisoned".into()))?;
            for (gauge, value) in registered.iter().zip(gauges(snapshot)) {
                gauge.set(value.value.min(i64::MAX as u64) as i64);
            }
            self.registry.gather()
        };
        let mut buf = Vec::new();
        TextEncoder::new().encode(&families, &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Handler for `GET /metrics`
pub async fn metrics(State(state): State<GatewayState>) -> Response {
    let snapshot = match state.aggregator.snapshot(unix_now()).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!(error = %e, "Scrape snapshot failed");
            return (StatusCode::SERVICE_UNAVAILABLE, "metrics store unavailable\n")
                .into_response();
        }
    };

    match state.exporter.render(&snapshot) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Encoding metrics failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed\n").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_help_type_and_value_per_gauge() {
        let exporter = GaugeExporter::new().unwrap();
        let body = exporter
            .render(&Snapshot {
                total_users: 2,
                lifetime_messages: 4,
                lifetime_commands: 2,
                events_per_minute: 4,
                active_users_5m: 1,
            })
            .unwrap();

        for name in [
            "telegram_total_users",
            "telegram_active_users_5m",
            "telegram_msgs_total",
            "telegram_cmds_total",
            "telegram_rpm_1m",
        ] {
            assert!(body.contains(&format!("# HELP {name} ")), "missing help for {name}");
            assert!(body.contains(&format!("# TYPE {name} gauge")), "missing type for {name}");
        }
        assert!(body.contains("telegram_total_users 2\n"));
        assert!(body.contains("telegram_active_users_5m 1\n"));
        assert!(body.contains("telegram_msgs_total 4\n"));
    }

    fn uniform(value: u64) -> Snapshot {
        Snapshot {
            total_users: value,
            lifetime_messages: value,
            lifetime_commands: value,
            events_per_minute: value,
            active_users_5m: value,
        }
    }

    #[test]
    fn parallel_renders_never_mix_snapshots() {
        let exporter = GaugeExporter::new().unwrap();
        std::thread::scope(|scope| {
            for value in 1..=4u64 {
                let exporter = &exporter;
                scope.spawn(move || {
                    for _ in 0..2_000 {
                        let body = exporter.render(&uniform(value)).unwrap();
                        let values: Vec<&str> = body
                            .lines()
                            .filter(|line| !line.starts_with('#'))
                            .filter_map(|line| line.rsplit(' ').next())
                            .collect();
                        assert_eq!(values.len(), 5);
                        let expected = value.to_string();
                        assert!(
                            values.iter().all(|v| *v == expected),
                            "body mixed snapshots: {body}"
                        );
                    }
                });
            }
        });
    }

    #[test]
    fn later_render_overwrites_values() {
        let exporter = GaugeExporter::new().unwrap();
        let mut snap = Snapshot {
            lifetime_messages: 10,
            ..Snapshot::default()
        };
        exporter.render(&snap).unwrap();
        snap.lifetime_messages = 3;
        let body = exporter.render(&snap).unwrap();
        assert!(body.contains("telegram_msgs_total 3\n"));
    }
}

//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the ledger.
//!
//! # Metrics
//!
//! - `member_ledger_operations_total{operation}` - Successful operations
//! - `member_ledger_rejections_total{operation,kind}` - Failed operations by error kind
//! - `member_ledger_operation_duration_seconds{operation}` - Operation latency
//! - `member_ledger_accounts_created_total` - Accounts opened

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Metrics collector
///
/// Collectors are registered on an instance registry only, so several
/// ledgers can live in one process (tests, embedded use).
#[derive(Clone)]
pub struct Metrics {
    /// Successful operations by name
    pub operations_total: IntCounterVec,

    /// Failed operations by name and error kind
    pub rejections_total: IntCounterVec,

    /// Operation latency
    pub operation_duration: HistogramVec,

    /// Accounts opened
    pub accounts_created: IntCounter,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let operations_total = IntCounterVec::new(
            Opts::new(
                "member_ledger_operations_total",
                "Total number of successful ledger operations",
            ),
            &["operation"],
        )?;
        registry.register(Box::new(operations_total.clone()))?;

        let rejections_total = IntCounterVec::new(
            Opts::new(
                "member_ledger_rejections_total",
                "Total number of failed ledger operations",
            ),
            &["operation", "kind"],
        )?;
        registry.register(Box::new(rejections_total.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "member_ledger_operation_duration_seconds",
                "Histogram of ledger operation latencies",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 1.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        let accounts_created = IntCounter::new(
            "member_ledger_accounts_created_total",
            "Total number of member accounts opened",
        )?;
        registry.register(Box::new(accounts_created.clone()))?;

        Ok(Self {
            operations_total,
            rejections_total,
            operation_duration,
            accounts_created,
            registry,
        })
    }

    /// Record a finished operation
    pub fn record_outcome<T>(
        &self,
        operation: &str,
        result: &crate::Result<T>,
        duration_seconds: f64,
    ) {
        self.operation_duration
            .with_label_values(&[operation])
            .observe(duration_seconds);
        match result {
            Ok(_) => self.operations_total.with_label_values(&[operation]).inc(),
            Err(e) => self
                .rejections_total
                .with_label_values(&[operation, e.kind()])
                .inc(),
        }
    }

    /// Record account creation
    pub fn record_account_created(&self) {
        self.accounts_created.inc();
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render all metrics in the Prometheus text format
    pub fn export(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.accounts_created.get(), 0);

        // Independent registries, no global collision
        assert!(Metrics::new().is_ok());
    }

    #[test]
    fn test_record_outcome() {
        let metrics = Metrics::new().unwrap();

        metrics.record_outcome("consume", &Ok::<_, Error>(()), 0.001);
        metrics.record_outcome(
            "consume",
            &Err::<(), _>(Error::InsufficientBalance {
                required: 700,
                available: 600,
            }),
            0.001,
        );

        assert_eq!(
            metrics.operations_total.with_label_values(&["consume"]).get(),
            1
        );
        assert_eq!(
            metrics
                .rejections_total
                .with_label_values(&["consume", "insufficient_balance"])
                .get(),
            1
        );
    }

    #[test]
    fn test_record_account_created() {
        let metrics = Metrics::new().unwrap();
        metrics.record_account_created();
        assert_eq!(metrics.accounts_created.get(), 1);
        assert!(!metrics.registry().gather().is_empty());

        let text = metrics.export().unwrap();
        assert!(text.contains("member_ledger_accounts_created_total 1"));
    }
}

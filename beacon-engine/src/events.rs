//! Scan progress events
//!
//! The analyzer emits these over an optional mpsc channel so a front end
//! can stream batch progress. Emission is best-effort: with no listener
//! attached, events are dropped silently and the pipeline is unaffected.

use crate::types::MetricFamily;
use serde::Serialize;
use uuid::Uuid;

/// Progress event emitted during a batch scan
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanEvent {
    BatchStarted {
        batch_id: Uuid,
        url_count: usize,
        competitor_groups: usize,
    },
    UrlStarted {
        url: String,
    },
    UrlCompleted {
        url: String,
        total: f64,
    },
    UrlFailed {
        url: String,
        error: String,
    },
    /// A metric family fell back past at least one configured provider
    ProviderFellBack {
        family: MetricFamily,
        source: String,
    },
    BatchCompleted {
        batch_id: Uuid,
        analyzed: usize,
    },
}

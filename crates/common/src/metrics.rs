//! Callback seams for metrics.
//!
//! Certfleet reports counters through plain callbacks rather than binding to
//! a metrics backend. Embedders bridge these to whatever registry they run;
//! the no-op constructor is the default when nothing is bridged.

use std::sync::Arc;

/// Increments a labelled counter. Label order is fixed by the reporting site.
pub type CounterVecInc = Arc<dyn Fn(&[&str]) + Send + Sync>;

/// Returns a counter callback that discards every increment.
pub fn noop_counter_vec() -> CounterVecInc {
    Arc::new(|_labels| {})
}

//! Metrics for store activity.
//!
//! Every metric carries a `store` label with the store's
//! [`StoreConfig::label`](crate::StoreConfig). No exporter is installed by
//! this crate; with no recorder installed the macros are no-ops.
//!
//! | Name | Kind | Meaning |
//! |------|------|---------|
//! | `store.updates.total` | counter | Replacements committed (`update_state` and `patch_state`) |
//! | `store.notifications.delivered` | counter | Callbacks invoked with a changed projection |
//! | `store.notifications.suppressed` | counter | Deliveries skipped because the projection was unchanged |
//! | `store.subscribers` | gauge | Currently registered subscribers |

use metrics::{describe_counter, describe_gauge};

// Re-export metrics macros for use in other modules
pub use metrics::{counter, gauge};

/// Counter of committed replacements
pub const UPDATES_TOTAL: &str = "store.updates.total";

/// Counter of delivered notifications
pub const NOTIFICATIONS_DELIVERED: &str = "store.notifications.delivered";

/// Counter of suppressed (unchanged) notifications
pub const NOTIFICATIONS_SUPPRESSED: &str = "store.notifications.suppressed";

/// Gauge of registered subscribers
pub const SUBSCRIBERS: &str = "store.subscribers";

/// Register all metric descriptions.
///
/// Call once after installing a recorder so exporters can show help text.
pub fn describe_metrics() {
    describe_counter!(UPDATES_TOTAL, "Total number of state replacements committed");
    describe_counter!(
        NOTIFICATIONS_DELIVERED,
        "Total number of subscriber notifications delivered"
    );
    describe_counter!(
        NOTIFICATIONS_SUPPRESSED,
        "Total number of notifications suppressed because the projection was unchanged"
    );
    describe_gauge!(SUBSCRIBERS, "Number of active subscribers");
}

//! Application id resolution from workload labels

use std::collections::BTreeMap;

/// Label keys consulted in precedence order; the first present one wins
pub const APP_LABEL_PRECEDENCE: [&str; 3] =
    ["app.kubernetes.io/instance", "app.kubernetes.io/name", "app"];

/// Resolve the logical application id of a workload
///
/// Returns `None` when none of the recognized labels is set. There is no
/// fallback to the workload name: unlabeled workloads stay out of every
/// application view.
pub fn resolve_app_id(labels: &BTreeMap<String, String>) -> Option<&str> {
    APP_LABEL_PRECEDENCE
        .iter()
        .filter_map(|key| labels.get(*key))
        .map(String::as_str)
        .find(|value| !value.is_empty())
}

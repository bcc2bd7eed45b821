//! Platform detection from `show version` output.

use regex::Regex;
use reconcile::Platform;
use std::sync::LazyLock;

static CHASSIS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)cisco\s+nexus\s?(\d)\d*\s+(?:([A-Z0-9][\w-]*)\s+)?chassis")
        .unwrap_or_else(|e| panic!("invalid chassis pattern: {e}"))
});

/// Detect the platform from `show version` text.
///
/// `cisco Nexus9000 C93180YC-EX chassis` becomes `N9K-C93180YC-EX`; a
/// chassis line without a model becomes just the family prefix (`N3K`).
/// Returns an empty platform when no chassis line is found.
pub fn detect(show_version: &str) -> Platform {
    let Some(caps) = CHASSIS.captures(show_version) else {
        log::debug!("no chassis line in show version output");
        return Platform::default();
    };

    let family = format!("N{}K", &caps[1]);
    let platform = match caps.get(2) {
        Some(model) => format!("{family}-{}", model.as_str().to_uppercase()),
        None => family,
    };
    Platform::new(platform)
}

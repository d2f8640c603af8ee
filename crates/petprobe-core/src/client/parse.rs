//! Parse HTTP response header lines collected during a transfer.

use std::collections::HashMap;
use std::time::Duration;

/// Turn raw header lines into a lowercase-keyed map. Status lines carry no
/// colon and are skipped; with redirects the last occurrence of a header
/// wins, matching the final response.
pub(crate) fn parse_headers(lines: &[String]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_ascii_lowercase();
            if name.is_empty() {
                continue;
            }
            map.insert(name, value.trim().to_string());
        }
    }
    map
}

/// Parse a `Retry-After` value. Only the delta-seconds form is honored;
/// the HTTP-date form falls back to the category default.
pub(crate) fn parse_retry_after(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

use chrono::{DateTime, TimeZone, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

pub fn get_resource_age(timestamp: Option<&Time>) -> String {
    match timestamp {
        Some(time) => age_since(time.0, Utc::now()),
        None => "?".to_string(),
    }
}

/// Compact age of `then` relative to `now`, kubectl style. Future
/// timestamps read as `0s`.
pub fn age_since<Tz: TimeZone>(then: DateTime<Tz>, now: DateTime<Tz>) -> String {
    let secs = (now - then).num_seconds().max(0);
    if secs >= 86400 {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 {
        format!("{}h", secs / 3600)
    } else if secs >= 60 {
        format!("{}m", secs / 60)
    } else {
        format!("{secs}s")
    }
}

/// Clips `text` to `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Badge class for an order status label.
///
/// Usage in templates: `{{ order.status|status_class }}`
#[askama::filter_fn]
pub fn status_class(value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(status_badge(&value.to_string()))
}

fn status_badge(status: &str) -> &'static str {
    match status {
        "Pending" => "badge badge-pending",
        "In Transit" => "badge badge-transit",
        "Delivered" => "badge badge-delivered",
        _ => "badge",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_badge() {
        assert_eq!(status_badge("In Transit"), "badge badge-transit");
        assert_eq!(status_badge("Cancelled"), "badge");
    }
}

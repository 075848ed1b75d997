//! Order inspection.
//!
//! ```bash
//! loomwear-cli orders list
//! loomwear-cli orders list --status in-transit
//! ```

use loomwear_backend::BackendError;
use loomwear_core::OrderStatus;
use loomwear_core::order::Order;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrdersError {
    #[error("Unknown status: {0}. Valid statuses: pending, in-transit, delivered")]
    UnknownStatus(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Print every order, newest first, optionally restricted to one status.
///
/// # Errors
///
/// Returns an error if the status is unknown or the backend call fails.
pub async fn list(status: Option<&str>) -> Result<(), OrdersError> {
    let status = status
        .map(|s| parse_status(s).ok_or_else(|| OrdersError::UnknownStatus(s.to_owned())))
        .transpose()?;

    let mut orders = super::backend_client()?.list_orders().await?;
    orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));

    let rows: Vec<String> = orders
        .iter()
        .filter(|o| status.as_ref().is_none_or(|s| &o.status == s))
        .map(order_row)
        .collect();

    #[allow(clippy::print_stdout)]
    {
        for row in &rows {
            println!("{row}");
        }
    }
    tracing::info!("{} order(s)", rows.len());
    Ok(())
}

/// Accepts the display label or a dashed slug (`in-transit`), any case.
fn parse_status(s: &str) -> Option<OrderStatus> {
    OrderStatus::SETTABLE.into_iter().find(|status| {
        let label = status.as_str();
        label.eq_ignore_ascii_case(s) || label.replace(' ', "-").eq_ignore_ascii_case(s)
    })
}

/// One tab-separated line: id, date, customer, status, total.
fn order_row(order: &Order) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        order.id,
        order.display_date(),
        order.customer_name(),
        order.status,
        order.order_summary.display_total()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("in-transit"), Some(OrderStatus::InTransit));
        assert_eq!(parse_status("In Transit"), Some(OrderStatus::InTransit));
        assert_eq!(parse_status("DELIVERED"), Some(OrderStatus::Delivered));
        assert_eq!(parse_status("Cancelled"), None);
    }

    #[test]
    fn test_order_row() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "_id": "o1",
            "shippingInformation": {
                "firstName": "Asha", "lastName": "Rao", "company": "", "address": "",
                "apartment": "", "city": "", "state": "", "postalCode": "", "country": ""
            },
            "orderSummary": { "items": [], "subtotal": 100, "shipping": 5, "taxes": 5, "total": 110 },
            "status": "In Transit",
            "orderDate": "2026-03-09T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(order_row(&order), "o1\t09/03/2026\tAsha Rao\tIn Transit\t₹110.00");
    }
}

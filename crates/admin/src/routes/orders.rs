//! Order management: listing, detail, status changes and deletion.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use loomwear_backend::BackendError;
use loomwear_core::{OrderId, OrderStatus};
use loomwear_core::order::Order;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::middleware::RequireAdmin;
use crate::notices;
use crate::state::AppState;
use crate::views::{ConfirmTemplate, PageContext};

pub const LOAD_FAILED_NOTICE: &str = "Failed to load orders.";
pub const FETCH_FAILED_NOTICE: &str = "Error fetching order details";
pub const NOT_FOUND_NOTICE: &str = "Order not found";
pub const STATUS_UPDATED_NOTICE: &str = "Order status updated successfully!";
pub const STATUS_FAILED_NOTICE: &str = "Error updating order status";
pub const INVALID_STATUS_NOTICE: &str = "Please choose a valid order status";
pub const DELETED_NOTICE: &str = "Successfully Deleted Order";
pub const DELETE_FAILED_NOTICE: &str = "Failed to delete order";

#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub page: PageContext,
    pub orders: Vec<Order>,
}

#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderTemplate {
    pub page: PageContext,
    pub order: Order,
    pub statuses: [OrderStatus; 3],
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(index))
        .route("/orders/{id}", get(show))
        .route("/orders/{id}/status", post(update_status))
        .route("/orders/{id}/delete", get(confirm_delete).post(delete))
}

/// Newest orders first; orders without a date sink to the bottom.
fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));
}

/// GET /orders
#[instrument(skip_all)]
async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> OrdersTemplate {
    let mut orders = match state.backend().list_orders().await {
        Ok(orders) => orders,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load orders");
            notices::error(&session, LOAD_FAILED_NOTICE).await;
            Vec::new()
        }
    };
    newest_first(&mut orders);

    OrdersTemplate {
        page: PageContext::build(&session, Some(admin), "orders").await,
        orders,
    }
}

/// GET /orders/{id}
#[instrument(skip(state, session, admin))]
async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
) -> Response {
    let order = match state.backend().get_order(&id).await {
        Ok(order) => order,
        Err(BackendError::NotFound(_)) => {
            notices::error(&session, NOT_FOUND_NOTICE).await;
            return Redirect::to("/orders").into_response();
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch order");
            notices::error(&session, FETCH_FAILED_NOTICE).await;
            return Redirect::to("/orders").into_response();
        }
    };

    OrderTemplate {
        page: PageContext::build(&session, Some(admin), "orders").await,
        order,
        statuses: OrderStatus::SETTABLE,
    }
    .into_response()
}

/// POST /orders/{id}/status
#[instrument(skip(state, session, _admin, form))]
async fn update_status(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Redirect {
    let back = format!("/orders/{id}");
    let Some(status) = OrderStatus::parse_settable(form.status.trim()) else {
        notices::error(&session, INVALID_STATUS_NOTICE).await;
        return Redirect::to(&back);
    };

    match state.backend().update_order_status(&id, &status).await {
        Ok(()) => {
            tracing::info!(order_id = %id, status = %status, "Order status updated");
            notices::success(&session, STATUS_UPDATED_NOTICE).await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to update order status");
            notices::error(&session, STATUS_FAILED_NOTICE).await;
        }
    }
    Redirect::to(&back)
}

/// GET /orders/{id}/delete
async fn confirm_delete(
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
) -> ConfirmTemplate {
    ConfirmTemplate {
        page: PageContext::build(&session, Some(admin), "orders").await,
        heading: "Delete order".to_string(),
        message: format!("Are you sure you want to delete order {id}?"),
        action: format!("/orders/{id}/delete"),
        cancel: "/orders".to_string(),
    }
}

/// POST /orders/{id}/delete
#[instrument(skip(state, session, _admin))]
async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<OrderId>,
) -> Redirect {
    match state.backend().delete_order(&id).await {
        Ok(()) => {
            tracing::info!(order_id = %id, "Order deleted");
            notices::success(&session, DELETED_NOTICE).await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to delete order");
            notices::error(&session, DELETE_FAILED_NOTICE).await;
        }
    }
    Redirect::to("/orders")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(id: &str, date: Option<&str>) -> Order {
        let mut value = serde_json::json!({ "_id": id, "status": "Pending" });
        if let Some(date) = date {
            value["orderDate"] = serde_json::Value::String(date.to_string());
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_newest_first() {
        let mut orders = vec![
            order("old", Some("2024-01-02T10:00:00Z")),
            order("undated", None),
            order("new", Some("2024-03-05T10:00:00Z")),
        ];
        newest_first(&mut orders);
        let ids: Vec<_> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["new", "old", "undated"]);
    }
}

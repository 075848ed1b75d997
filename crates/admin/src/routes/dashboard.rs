//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, routing::get};
use loomwear_core::catalog::CategoryCounts;
use loomwear_core::order::StatusCounts;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::middleware::RequireAdmin;
use crate::notices;
use crate::state::AppState;
use crate::views::PageContext;

pub const LOAD_FAILED_NOTICE: &str = "Failed to load dashboard data.";

/// Store-wide counts shown as dashboard cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardMetrics {
    pub users: usize,
    pub products: CategoryCounts,
    pub orders: StatusCounts,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page: PageContext,
    pub metrics: DashboardMetrics,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

/// GET /
///
/// Users, products and orders are fetched concurrently. A failed list counts
/// as empty and raises one notice.
#[instrument(skip_all)]
async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> DashboardTemplate {
    let backend = state.backend();
    let (users, products, orders) = tokio::join!(
        backend.list_users(),
        backend.list_products(),
        backend.list_orders(),
    );

    let mut failed = false;
    let mut metrics = DashboardMetrics::default();
    match users {
        Ok(users) => metrics.users = users.len(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load users");
            failed = true;
        }
    }
    match products {
        Ok(products) => metrics.products = CategoryCounts::tally(&products),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load products");
            failed = true;
        }
    }
    match orders {
        Ok(orders) => metrics.orders = StatusCounts::tally(&orders),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load orders");
            failed = true;
        }
    }
    if failed {
        notices::error(&session, LOAD_FAILED_NOTICE).await;
    }

    DashboardTemplate {
        page: PageContext::build(&session, Some(admin), "dashboard").await,
        metrics,
    }
}

//! Checkout route handlers.
//!
//! The checkout page mounts the server cart. Submitting validates the form,
//! snapshots the session cart into a one-time order and sends it to the
//! backend. No payment is taken here.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use loomwear_core::cart::Cart;
use loomwear_core::checkout::{CheckoutForm, PAYMENT_METHODS};
use loomwear_core::order::{NewOrder, OrderSummary};
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::middleware::RequireAuth;
use crate::notices;
use crate::services::cart;
use crate::state::AppState;
use crate::views::PageContext;

pub const ORDER_PLACED_NOTICE: &str = "Order has been placed successfully";
pub const ORDER_FAILED_NOTICE: &str = "Failed to create the order. Please try again.";

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub form: CheckoutForm,
    pub payment_methods: [(&'static str, &'static str); 1],
    pub cart: Cart,
    pub summary: OrderSummary,
}

/// Order outcome page template.
#[derive(Template, WebTemplate)]
#[template(path = "order_outcome.html")]
pub struct OrderOutcomeTemplate {
    pub page: PageContext,
    pub placed: bool,
}

async fn render(state: &AppState, session: &Session, form: CheckoutForm, cart: Cart) -> Response {
    let summary = OrderSummary::from_lines(cart.lines());
    CheckoutTemplate {
        page: PageContext::build(state, session).await,
        form,
        payment_methods: PAYMENT_METHODS,
        cart,
        summary,
    }
    .into_response()
}

/// Display the checkout form.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Response {
    let cart = cart::mount(state.backend(), &session, Some(&user)).await;
    let form = CheckoutForm {
        payment_type: PAYMENT_METHODS[0].0.to_string(),
        ..CheckoutForm::default()
    };
    render(&state, &session, form, cart).await
}

/// Validate the form and place the order.
///
/// Validation failures re-render the form with the entered values and a
/// notice naming the first problem.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let cart = cart::load(&session).await;

    let checkout = match form.validate(cart.subtotal()) {
        Ok(checkout) => checkout,
        Err(e) => {
            notices::error(&session, e.to_string()).await;
            return render(&state, &session, form, cart).await;
        }
    };

    let order = NewOrder::from_checkout(user.id.clone(), &checkout, &cart);
    match state.backend().create_order(&order).await {
        Ok(()) => {
            tracing::info!(
                items = order.order_summary.items.len(),
                total = %order.order_summary.total,
                "Order placed"
            );
            notices::success(&session, ORDER_PLACED_NOTICE).await;
            Redirect::to("/order-confirmation").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Order creation failed");
            notices::error(&session, ORDER_FAILED_NOTICE).await;
            Redirect::to("/order-failed").into_response()
        }
    }
}

/// Order placed page.
pub async fn confirmation(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    OrderOutcomeTemplate {
        page: PageContext::build(&state, &session).await,
        placed: true,
    }
}

/// Order failed page.
pub async fn failed(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    OrderOutcomeTemplate {
        page: PageContext::build(&state, &session).await,
        placed: false,
    }
}

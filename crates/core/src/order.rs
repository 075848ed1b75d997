//! Orders and order-total computation.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};

use crate::cart::{Cart, CartLine};
use crate::checkout::ValidCheckout;
use crate::types::price::decimal_number;
use crate::types::{OrderId, OrderStatus, ProductId, UserId, format_amount};

/// Flat shipping charge per order.
pub const SHIPPING_FLAT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Tax rate applied to the subtotal (5 %).
pub const TAX_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Reference to the ordering user.
///
/// Orders are created with `{email, id}` but the backend stores and returns
/// the bare user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderUser {
    Id(UserId),
    Ref {
        id: UserId,
        #[serde(default)]
        email: Option<String>,
    },
}

impl OrderUser {
    #[must_use]
    pub const fn id(&self) -> &UserId {
        match self {
            Self::Id(id) | Self::Ref { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactInformation {
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingInformation {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address: String,
    pub apartment: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInformation {
    #[serde(default)]
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_on_card: Option<String>,
}

/// Accepts a single URL, a list of URLs (first wins) or null.
fn deserialize_image<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Image {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<Image>::deserialize(deserializer)? {
        Some(Image::One(url)) => Some(url),
        Some(Image::Many(urls)) => urls.into_iter().next(),
        None => None,
    })
}

/// Snapshot of one purchased line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product: ProductId,
    #[serde(default)]
    pub product_name: String,
    #[serde(default, deserialize_with = "deserialize_image")]
    pub product_image: Option<String>,
    #[serde(with = "decimal_number")]
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub size: String,
}

impl OrderItem {
    #[must_use]
    pub fn from_line(line: &CartLine) -> Self {
        Self {
            product: line.product_id.clone(),
            product_name: line.name.clone(),
            product_image: line.image.clone(),
            price: line.price,
            quantity: line.quantity,
            size: line.size.clone(),
        }
    }

    #[must_use]
    pub fn display_price(&self) -> String {
        format_amount(self.price)
    }
}

/// Items and money totals of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(with = "decimal_number", default)]
    pub subtotal: Decimal,
    #[serde(with = "decimal_number", default)]
    pub shipping: Decimal,
    #[serde(with = "decimal_number", default)]
    pub taxes: Decimal,
    #[serde(with = "decimal_number", default)]
    pub total: Decimal,
}

impl OrderSummary {
    /// Compute totals for `lines`.
    ///
    /// Shipping is a flat 5; taxes are 5 % of the subtotal. Taxes and total are
    /// rounded to 2 decimal places, midpoint away from zero.
    #[must_use]
    pub fn from_lines(lines: &[CartLine]) -> Self {
        let subtotal = lines
            .iter()
            .fold(Decimal::ZERO, |acc, line| acc + line.line_total());
        let raw_taxes = subtotal * TAX_RATE;
        Self {
            items: lines.iter().map(OrderItem::from_line).collect(),
            subtotal,
            shipping: SHIPPING_FLAT,
            taxes: round_money(raw_taxes),
            total: round_money(subtotal + SHIPPING_FLAT + raw_taxes),
        }
    }

    #[must_use]
    pub fn display_subtotal(&self) -> String {
        format_amount(self.subtotal)
    }

    #[must_use]
    pub fn display_shipping(&self) -> String {
        format_amount(self.shipping)
    }

    #[must_use]
    pub fn display_taxes(&self) -> String {
        format_amount(self.taxes)
    }

    #[must_use]
    pub fn display_total(&self) -> String {
        format_amount(self.total)
    }
}

/// An order as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: OrderId,
    #[serde(default)]
    pub user: Option<OrderUser>,
    #[serde(default)]
    pub contact_information: ContactInformation,
    #[serde(default)]
    pub shipping_information: ShippingInformation,
    #[serde(default)]
    pub payment_information: Option<PaymentInformation>,
    #[serde(default)]
    pub order_summary: OrderSummary,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
}

impl Order {
    /// Whether this order belongs to `user`.
    #[must_use]
    pub fn belongs_to(&self, user: &UserId) -> bool {
        self.user.as_ref().is_some_and(|u| u.id() == user)
    }

    /// Order date as `DD/MM/YYYY`, or an empty string when unknown.
    #[must_use]
    pub fn display_date(&self) -> String {
        self.order_date
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn customer_name(&self) -> String {
        let s = &self.shipping_information;
        format!("{} {}", s.first_name, s.last_name).trim().to_owned()
    }
}

/// Payload submitted to create an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user: OrderUser,
    pub contact_information: ContactInformation,
    pub shipping_information: ShippingInformation,
    pub payment_information: PaymentInformation,
    pub order_summary: OrderSummary,
}

impl NewOrder {
    /// Snapshot the cart and the validated checkout form into an order.
    #[must_use]
    pub fn from_checkout(user: UserId, checkout: &ValidCheckout, cart: &Cart) -> Self {
        let company = if checkout.company.is_empty() {
            "none".to_owned()
        } else {
            checkout.company.clone()
        };
        Self {
            user: OrderUser::Ref {
                id: user,
                email: Some(checkout.email.to_string()),
            },
            contact_information: ContactInformation {
                email: checkout.email.to_string(),
                phone: checkout.phone.clone(),
            },
            shipping_information: ShippingInformation {
                first_name: checkout.first_name.clone(),
                last_name: checkout.last_name.clone(),
                company,
                address: checkout.address.clone(),
                apartment: checkout.apartment.clone(),
                city: checkout.city.clone(),
                state: checkout.region.clone(),
                postal_code: checkout.postal_code.clone(),
                country: checkout.country.clone(),
            },
            payment_information: PaymentInformation {
                method: checkout.payment_method.clone(),
                card_number: None,
                name_on_card: None,
            },
            order_summary: OrderSummary::from_lines(cart.lines()),
        }
    }
}

/// Order counts by status, for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_transit: usize,
    pub delivered: usize,
}

impl StatusCounts {
    #[must_use]
    pub fn tally(orders: &[Order]) -> Self {
        let mut counts = Self::default();
        for order in orders {
            match order.status {
                OrderStatus::Pending => counts.pending += 1,
                OrderStatus::InTransit => counts.in_transit += 1,
                OrderStatus::Delivered => counts.delivered += 1,
                OrderStatus::Other(_) => {}
            }
        }
        counts
    }
}

//! Orders submitted through the public form and managed from the back
//! office.
//!
//! The backend owns orders. The client only derives `price` and `food`
//! from the chosen package and validates the form before submitting.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ResourceId;
use super::validation::{
    FormValidationError, validate_email, validate_non_empty, validate_phone,
};

/// Shisha package chosen on the order form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Entry package.
    Classic,
    /// House blend with a larger food board.
    Traditional,
    /// Premium tobacco and the full food board.
    Premium,
}

const CLASSIC_FOOD: &[&str] = &["Patatas bravas", "Nachos con guacamole"];
const TRADITIONAL_FOOD: &[&str] = &[
    "Patatas bravas",
    "Nachos con guacamole",
    "Hummus con pan de pita",
];
const PREMIUM_FOOD: &[&str] = &[
    "Patatas bravas",
    "Nachos con guacamole",
    "Hummus con pan de pita",
    "Tabla de quesos",
    "Fruta fresca de temporada",
];

impl OrderType {
    /// Every package, cheapest first.
    pub const ALL: [Self; 3] = [Self::Classic, Self::Traditional, Self::Premium];

    /// Per-unit price from the fixed lookup table.
    pub fn unit_price(self) -> u32 {
        match self {
            Self::Classic => 4,
            Self::Traditional => 5,
            Self::Premium => 6,
        }
    }

    /// Total price for `quantity` units. No other adjustment applies;
    /// `None` when the total does not fit in a `u32`.
    pub fn price_for(self, quantity: u32) -> Option<u32> {
        self.unit_price().checked_mul(quantity)
    }

    fn checked_total(self, quantity: u32) -> Result<u32, FormValidationError> {
        if quantity == 0 {
            return Err(FormValidationError::ZeroQuantity { field: "quantity" });
        }
        self.price_for(quantity)
            .ok_or(FormValidationError::QuantityTooLarge { field: "quantity" })
    }

    /// Food served with the package.
    pub fn food(self) -> &'static [&'static str] {
        match self {
            Self::Classic => CLASSIC_FOOD,
            Self::Traditional => TRADITIONAL_FOOD,
            Self::Premium => PREMIUM_FOOD,
        }
    }

    /// Wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Traditional => "traditional",
            Self::Premium => "premium",
        }
    }
}

impl FromStr for OrderType {
    type Err = FormValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| FormValidationError::UnknownOption {
                field: "order type",
                value: value.to_owned(),
            })
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state. The backend is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Submitted, not yet handled.
    Pending,
    /// Being served.
    Open,
    /// Finished.
    Closed,
}

impl OrderStatus {
    /// Every status.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Open, Self::Closed];

    /// Wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = FormValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| FormValidationError::UnknownOption {
                field: "order status",
                value: value.to_owned(),
            })
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Backend identifier.
    #[serde(alias = "_id")]
    pub id: ResourceId,
    /// Customer name.
    pub name: String,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Number of shishas.
    pub quantity: u32,
    /// Free-text notes from the customer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    /// Chosen package.
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Total price in euros.
    pub price: f64,
    /// Food served with the package.
    #[serde(default)]
    pub food: Vec<String>,
    /// Lifecycle state.
    pub status: OrderStatus,
    /// When the backend stored the order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// When the order last changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for `POST /orders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    /// Customer name, trimmed.
    pub name: String,
    /// Contact phone, trimmed.
    pub phone: String,
    /// Contact email, trimmed.
    pub email: String,
    /// Number of shishas, at least one.
    pub quantity: u32,
    /// Notes, omitted when blank.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    /// Chosen package.
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Unit price times quantity.
    pub price: u32,
    /// Food list for the package.
    pub food: Vec<String>,
    /// Always `pending` for new orders.
    pub status: OrderStatus,
}

/// Raw order form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderForm {
    /// Customer name.
    pub name: String,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Number of shishas.
    pub quantity: u32,
    /// Optional notes.
    pub observations: Option<String>,
    /// Chosen package.
    pub order_type: OrderType,
}

impl OrderForm {
    /// Blank form preset to `order_type`, quantity one.
    pub fn for_type(order_type: OrderType) -> Self {
        Self {
            name: String::new(),
            phone: String::new(),
            email: String::new(),
            quantity: 1,
            observations: None,
            order_type,
        }
    }

    /// Validate the form and derive the backend payload.
    ///
    /// # Examples
    /// ```
    /// use ego_house::domain::{OrderForm, OrderType};
    ///
    /// let form = OrderForm {
    ///     name: "Ana".into(),
    ///     phone: "+34 600 123 456".into(),
    ///     email: "ana@example.com".into(),
    ///     quantity: 3,
    ///     ..OrderForm::for_type(OrderType::Premium)
    /// };
    /// let order = form.into_new_order().unwrap();
    /// assert_eq!(order.price, 18);
    /// ```
    pub fn into_new_order(self) -> Result<NewOrder, FormValidationError> {
        let name = validate_non_empty(&self.name, "name")?;
        let phone = validate_phone(&self.phone)?;
        let email = validate_email(&self.email)?;
        let price = self.order_type.checked_total(self.quantity)?;
        let observations = self
            .observations
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned);
        Ok(NewOrder {
            name,
            phone,
            email,
            quantity: self.quantity,
            observations,
            order_type: self.order_type,
            price,
            food: self.order_type.food().iter().map(|dish| (*dish).to_owned()).collect(),
            status: OrderStatus::Pending,
        })
    }
}

/// Partial update for `PUT /orders/:id`. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    /// New customer name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New contact phone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// New contact email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    /// New quantity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    /// New package.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub order_type: Option<OrderType>,
    /// Price recomputed for the new package and quantity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u32>,
    /// Food list for the new package.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food: Option<Vec<String>>,
    /// New lifecycle state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

impl OrderUpdate {
    /// Change only the status.
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Change package and quantity; price and food follow the lookup table.
    pub fn repackage(order_type: OrderType, quantity: u32) -> Result<Self, FormValidationError> {
        let price = order_type.checked_total(quantity)?;
        Ok(Self {
            quantity: Some(quantity),
            order_type: Some(order_type),
            price: Some(price),
            food: Some(order_type.food().iter().map(|dish| (*dish).to_owned()).collect()),
            ..Self::default()
        })
    }
}

/// Aggregates from `GET /orders/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderStats {
    /// Every order.
    pub total: u64,
    /// Orders not yet handled.
    pub pending: u64,
    /// Orders being served.
    pub open: u64,
    /// Finished orders.
    pub closed: u64,
    /// Revenue in euros.
    pub revenue: f64,
}

/// Local status/search filter over an already-fetched list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Only orders in this state.
    pub status: Option<OrderStatus>,
    /// Case-insensitive text matched against name, phone, and email.
    pub search: Option<String>,
}

impl OrderFilter {
    /// Whether `order` passes both the status and the text filter. Text
    /// matches name, phone, or email, ignoring case.
    pub fn matches(&self, order: &Order) -> bool {
        if self.status.is_some_and(|status| status != order.status) {
            return false;
        }
        let Some(needle) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
        else {
            return true;
        };
        let needle = needle.to_lowercase();
        [&order.name, &order.phone, &order.email]
            .into_iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Orders passing the filter, in their original order.
    pub fn apply<'a>(&self, orders: &'a [Order]) -> Vec<&'a Order> {
        orders.iter().filter(|order| self.matches(order)).collect()
    }
}

//! Typed wrappers around the `/orders` endpoints.

use std::sync::Arc;

use tracing::info;

use super::api_client::{ApiClient, path_segment};
use super::error::ApiError;
use super::listing::Listing;
use super::order::{NewOrder, Order, OrderForm, OrderStats, OrderStatus, OrderUpdate};
use super::validation::FormValidationError;
use super::ResourceId;

const ORDERS_PATH: &str = "/orders";
const STATS_PATH: &str = "/orders/stats";

/// Why an order form could not be submitted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitOrderError {
    /// The form failed local validation; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] FormValidationError),
    /// The backend rejected or never received the order.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Order endpoints.
pub struct OrderService {
    api: Arc<ApiClient>,
}

impl OrderService {
    /// Create a service over the shared client.
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Validate `form` and submit it.
    pub async fn submit(&self, form: OrderForm) -> Result<Order, SubmitOrderError> {
        let new_order = form.into_new_order()?;
        Ok(self.create(&new_order).await?)
    }

    /// `POST /orders`.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, ApiError> {
        let created: Order = self.api.post(ORDERS_PATH, order).await?;
        info!(order_id = %created.id, order_type = %created.order_type, "order created");
        Ok(created)
    }

    /// `GET /orders`.
    pub async fn list(&self) -> Result<Vec<Order>, ApiError> {
        self.api.get(ORDERS_PATH).await
    }

    /// `PUT /orders/:id`.
    pub async fn update(&self, id: &ResourceId, update: &OrderUpdate) -> Result<Order, ApiError> {
        self.api.put(&order_path(id), update).await
    }

    /// Mark an order closed.
    pub async fn close(&self, id: &ResourceId) -> Result<Order, ApiError> {
        self.set_status(id, OrderStatus::Closed).await
    }

    /// Reopen a closed order.
    pub async fn reopen(&self, id: &ResourceId) -> Result<Order, ApiError> {
        self.set_status(id, OrderStatus::Open).await
    }

    /// `DELETE /orders/:id`.
    pub async fn delete(&self, id: &ResourceId) -> Result<(), ApiError> {
        self.api
            .delete::<serde_json::Value>(&order_path(id))
            .await
            .map(drop)
    }

    /// `GET /orders/stats`.
    pub async fn stats(&self) -> Result<OrderStats, ApiError> {
        self.api.get(STATS_PATH).await
    }

    /// Reload `listing`, recording any failure on it rather than returning it.
    pub async fn refresh(&self, listing: &mut Listing<Order>) {
        listing.begin();
        listing.finish(self.list().await);
    }

    async fn set_status(&self, id: &ResourceId, status: OrderStatus) -> Result<Order, ApiError> {
        let order = self.update(id, &OrderUpdate::status(status)).await?;
        info!(order_id = %id, status = %status, "order status changed");
        Ok(order)
    }
}

fn order_path(id: &ResourceId) -> String {
    format!("{ORDERS_PATH}/{}", path_segment(id.as_ref()))
}

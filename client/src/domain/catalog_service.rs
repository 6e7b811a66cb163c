//! Typed wrappers around the `/catalog` endpoints.
//!
//! Write endpoints are admin-only on the backend; a 403 comes back as an
//! [`ApiError`] of kind `Forbidden`.

use std::sync::Arc;

use tracing::info;

use super::api_client::{ApiClient, path_segment};
use super::catalog::{Category, CategoryDraft, NewItem};
use super::error::ApiError;
use super::listing::Listing;
use super::validation::FormValidationError;
use super::ResourceId;

const CATALOG_PATH: &str = "/catalog";
const CATEGORY_PATH: &str = "/catalog/category";
const ITEM_PATH: &str = "/catalog/item";

/// Why a catalogue edit could not be sent or was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogEditError {
    /// Local validation failed; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] FormValidationError),
    /// The backend rejected or never received the edit.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Catalogue endpoints.
pub struct CatalogService {
    api: Arc<ApiClient>,
}

impl CatalogService {
    /// Create a service over the shared client.
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// `GET /catalog`.
    pub async fn list(&self) -> Result<Vec<Category>, ApiError> {
        self.api.get(CATALOG_PATH).await
    }

    /// `POST /catalog/category`.
    pub async fn create_category(&self, draft: CategoryDraft) -> Result<Category, CatalogEditError> {
        let body = draft.into_body()?;
        let created: Category = self.api.post(CATEGORY_PATH, &body).await?;
        info!(category_id = %created.id, slug = %created.slug, "category created");
        Ok(created)
    }

    /// `PUT /catalog/category/:id`.
    pub async fn update_category(
        &self,
        id: &ResourceId,
        draft: CategoryDraft,
    ) -> Result<Category, CatalogEditError> {
        let body = draft.into_body()?;
        Ok(self.api.put(&category_path(id), &body).await?)
    }

    /// `DELETE /catalog/category/:id`.
    pub async fn delete_category(&self, id: &ResourceId) -> Result<(), ApiError> {
        self.api
            .delete::<serde_json::Value>(&category_path(id))
            .await
            .map(drop)?;
        info!(category_id = %id, "category deleted");
        Ok(())
    }

    /// `POST /catalog/item`. Returns the updated category.
    pub async fn add_item(&self, item: &NewItem) -> Result<Category, ApiError> {
        self.api.post(ITEM_PATH, item).await
    }

    /// `DELETE /catalog/category/:id/item/:name`.
    pub async fn delete_item(&self, category_id: &ResourceId, item_name: &str) -> Result<(), ApiError> {
        let path = format!(
            "{}/item/{}",
            category_path(category_id),
            path_segment(item_name.trim())
        );
        self.api.delete::<serde_json::Value>(&path).await.map(drop)
    }

    /// Reload `listing`, recording any failure on it rather than returning it.
    pub async fn refresh(&self, listing: &mut Listing<Category>) {
        listing.begin();
        listing.finish(self.list().await);
    }
}

fn category_path(id: &ResourceId) -> String {
    format!("{CATEGORY_PATH}/{}", path_segment(id.as_ref()))
}

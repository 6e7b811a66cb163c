//! Loading/error bookkeeping for screens that show a fetched list.
//!
//! Read operations record their failure here instead of returning it; the
//! error stays visible until dismissed or replaced by a new attempt.

use super::error::ApiError;

/// Fetched list plus its transient UI state.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    items: Vec<T>,
    is_loading: bool,
    error: Option<ApiError>,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_loading: false,
            error: None,
        }
    }
}

impl<T> Listing<T> {
    /// Items from the last successful fetch.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Whether a fetch is running.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Error from the last failed fetch.
    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    /// Start a fetch. A new attempt supersedes the previous error.
    pub fn begin(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    /// Record the outcome of a fetch. Failures keep the previous items.
    pub fn finish(&mut self, outcome: Result<Vec<T>, ApiError>) {
        self.is_loading = false;
        match outcome {
            Ok(items) => self.items = items,
            Err(error) => self.error = Some(error),
        }
    }

    /// Hide the current error.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}

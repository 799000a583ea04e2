//! Application state for the leave engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::service::ReviewService;

/// Shared application state.
///
/// Wraps the review service so every handler sees the same store and the
/// same in-flight registry.
#[derive(Clone)]
pub struct AppState {
    service: Arc<ReviewService>,
}

impl AppState {
    /// Creates a new application state around a review service.
    pub fn new(service: ReviewService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Returns a reference to the review service.
    pub fn service(&self) -> &ReviewService {
        &self.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        // Verify AppState can be cloned (required for axum state)
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}

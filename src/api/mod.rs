//! HTTP API module for the leave engine.
//!
//! This module provides the REST endpoints used by the admin review screen:
//! history, allocation preview and decision commit.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::{ACTOR_ROLE_HEADER, create_router};
pub use request::{DecisionRequest, PreviewRequest};
pub use response::{ApiError, ApiErrorResponse, DecisionResponse};
pub use state::AppState;

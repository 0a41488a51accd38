//! HTTP API module for the compliance auditor.
//!
//! `POST /evaluate` takes a schedule document as the raw body and returns the
//! compliance report. `GET /thresholds` and `PUT /thresholds` read and
//! hot-reload the rule caps.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::{create_router, MAX_DOCUMENT_BYTES};
pub use request::EvaluateParams;
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;

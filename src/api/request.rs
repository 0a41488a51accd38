//! Request types for the compliance API.

use serde::{Deserialize, Serialize};

/// Query parameters of `POST /evaluate`.
///
/// The document itself is the raw request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluateParams {
    /// Original file name; its extension is the primary format signal.
    #[serde(default)]
    pub filename: Option<String>,
}

//! B-roll catalogue handler.

use axum::Json;

use vboost_models::{BrollOption, BrollStyle};

/// List the B-roll styles offered by the upload form.
pub async fn list_broll_styles() -> Json<Vec<BrollOption>> {
    Json(BrollStyle::ALL.iter().copied().map(BrollOption::from).collect())
}

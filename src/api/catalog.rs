//! Catalog home endpoints

use axum::{extract::State, response::Redirect, Json};

use crate::{error::AppResult, models::summary::CatalogSummary};

/// Site root: permanent redirect to the catalog
pub async fn root_redirect() -> Redirect {
    Redirect::permanent("/catalog/")
}

/// Catalog home page counters
#[utoipa::path(
    get,
    path = "/catalog/",
    tag = "catalog",
    responses(
        (status = 200, description = "Catalog counters", body = CatalogSummary)
    )
)]
pub async fn summary(State(state): State<crate::AppState>) -> AppResult<Json<CatalogSummary>> {
    let summary = state.services.catalog.summary().await?;
    Ok(Json(summary))
}

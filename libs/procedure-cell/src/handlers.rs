// libs/procedure-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::ProcedureCategory;
use crate::services::{format_duration, ProcedureCatalogue};

#[derive(Debug, Deserialize)]
pub struct ProcedureListQuery {
    pub category: Option<ProcedureCategory>,
}

pub async fn list_procedures(
    State(catalogue): State<Arc<ProcedureCatalogue>>,
    Query(query): Query<ProcedureListQuery>,
) -> Json<Value> {
    let procedures: Vec<Value> = catalogue
        .all()
        .iter()
        .filter(|p| query.category.map_or(true, |c| p.category == c))
        .map(|p| json!({
            "procedure": p,
            "duration_label": format_duration(p.duration_minutes),
            "size_label": p.size.label(),
        }))
        .collect();

    Json(json!({
        "procedures": procedures,
        "total": procedures.len(),
    }))
}

pub async fn list_categories(
    State(catalogue): State<Arc<ProcedureCatalogue>>,
) -> Json<Value> {
    Json(json!({ "categories": catalogue.categories_present() }))
}

pub async fn get_procedure(
    State(catalogue): State<Arc<ProcedureCatalogue>>,
    Path(procedure_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    catalogue
        .get(&procedure_id)
        .map(|p| Json(json!({
            "procedure": p,
            "duration_label": format_duration(p.duration_minutes),
            "size_label": p.size.label(),
        })))
        .ok_or_else(|| AppError::NotFound(format!("Procedure not found: {}", procedure_id)))
}

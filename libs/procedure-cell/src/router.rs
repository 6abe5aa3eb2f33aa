// libs/procedure-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use crate::handlers;
use crate::services::ProcedureCatalogue;

pub fn procedure_routes(catalogue: Arc<ProcedureCatalogue>) -> Router {
    Router::new()
        .route("/", get(handlers::list_procedures))
        .route("/categories", get(handlers::list_categories))
        .route("/{procedure_id}", get(handlers::get_procedure))
        .with_state(catalogue)
}

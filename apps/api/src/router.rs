use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::{admin_routes, appointment_routes, AppointmentError, AppointmentState};
use procedure_cell::router::procedure_routes;
use procedure_cell::services::ProcedureCatalogue;
use scheduling_cell::policy::SchedulingPolicy;
use shared_config::AppConfig;

pub fn create_router(
    config: Arc<AppConfig>,
    catalogue: Arc<ProcedureCatalogue>,
    policy: Arc<SchedulingPolicy>,
) -> Result<Router, AppointmentError> {
    let appointment_state = Arc::new(AppointmentState::new(config, Arc::clone(&catalogue), policy)?);

    let router = Router::new()
        .route("/", get(|| async { "Surgery booking API is running!" }))
        .nest("/procedures", procedure_routes(catalogue))
        .nest("/appointments", appointment_routes(Arc::clone(&appointment_state)))
        .nest("/admin", admin_routes(appointment_state));

    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use shared_utils::test_utils::TestConfig;
    use tower::ServiceExt;

    fn app() -> Router {
        let config = TestConfig::default().to_arc();
        let policy = SchedulingPolicy::from_config(&config).unwrap();
        let catalogue = policy.procedure_catalogue().unwrap();
        create_router(config, Arc::new(catalogue), Arc::new(policy)).unwrap()
    }

    #[tokio::test]
    async fn test_procedures_are_mounted() {
        let response = app()
            .oneshot(Request::builder().uri("/procedures").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["total"], 21);
    }

    #[tokio::test]
    async fn test_admin_is_gated() {
        let response = app()
            .oneshot(Request::builder().uri("/admin/appointments").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Local, NaiveDate};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{
    AdminAction, AdminAppointmentQuery, AppointmentError, AvailabilityQuery, CreateAppointmentRequest,
    IntegrityQuery, RescheduleAppointmentRequest,
};
use crate::services::{AdminService, BookingService};
use crate::state::AppointmentState;

fn clinic_today() -> NaiveDate {
    Local::now().date_naive()
}

fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound(id) => AppError::NotFound(format!("Appointment {} not found", id)),
        AppointmentError::SlotNotAvailable(rejection) => AppError::Conflict(rejection.to_string()),
        AppointmentError::BookingsUnknown(reason) => {
            AppError::Unavailable(format!("Existing bookings could not be loaded: {}", reason))
        }
        e @ AppointmentError::InvalidStatusTransition { .. } => AppError::Conflict(e.to_string()),
        e @ AppointmentError::NotReschedulable(_) => AppError::Conflict(e.to_string()),
        AppointmentError::UnknownProcedure(id) => AppError::BadRequest(format!("Unknown procedure: {}", id)),
        AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
        AppointmentError::DatabaseError(msg) => AppError::Database(msg),
        AppointmentError::Export(msg) => AppError::Internal(msg),
    }
}

// ==============================================================================
// BOOKING WIZARD HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppointmentState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let booking_service = BookingService::new(&state);

    let availability = booking_service
        .availability(&query, clinic_today())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "availability": availability
    })))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppointmentState>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let booking_service = BookingService::new(&state);

    let created = booking_service
        .create_appointment(request, clinic_today())
        .await
        .map_err(map_appointment_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "appointment": created.booking,
            "email_sent": created.email_sent,
            "message": "Solicitud de cita registrada, pendiente de autorización"
        })),
    ))
}

// ==============================================================================
// ADMIN HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppointmentState>>,
    Query(query): Query<AdminAppointmentQuery>,
) -> Result<Json<Value>, AppError> {
    let admin_service = AdminService::new(&state);

    let appointments = admin_service
        .list(&query.into())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_appointment_stats(
    State(state): State<Arc<AppointmentState>>,
) -> Result<Json<Value>, AppError> {
    let admin_service = AdminService::new(&state);

    let stats = admin_service
        .stats(clinic_today())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(stats)))
}

#[axum::debug_handler]
pub async fn export_appointments(
    State(state): State<Arc<AppointmentState>>,
    Query(query): Query<AdminAppointmentQuery>,
) -> Result<Response, AppError> {
    let admin_service = AdminService::new(&state);

    let export = admin_service
        .export(&query.into(), clinic_today())
        .await
        .map_err(map_appointment_error)?;

    let disposition = format!("attachment; filename=\"{}\"", export.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.content,
    )
        .into_response())
}

async fn apply_admin_action(
    state: &AppointmentState,
    appointment_id: Uuid,
    action: AdminAction,
) -> Result<Json<Value>, AppError> {
    let admin_service = AdminService::new(state);

    let appointment = admin_service
        .apply_action(appointment_id, action)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn authorize_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    apply_admin_action(&state, appointment_id, AdminAction::Authorize).await
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    apply_admin_action(&state, appointment_id, AdminAction::Cancel).await
}

#[axum::debug_handler]
pub async fn reactivate_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    apply_admin_action(&state, appointment_id, AdminAction::Reactivate).await
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let admin_service = AdminService::new(&state);

    let appointment = admin_service
        .reschedule(appointment_id, request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let admin_service = AdminService::new(&state);

    admin_service
        .delete(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn check_day_integrity(
    State(state): State<Arc<AppointmentState>>,
    Query(query): Query<IntegrityQuery>,
) -> Result<Json<Value>, AppError> {
    let admin_service = AdminService::new(&state);

    let report = admin_service
        .integrity(query.date)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(report)))
}

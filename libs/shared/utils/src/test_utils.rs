use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub store_url: String,
    pub store_anon_key: String,
    pub admin_password: String,
    pub emailjs_base_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            store_url: "http://localhost:54321".to_string(),
            store_anon_key: "test-anon-key".to_string(),
            admin_password: "test-admin-password".to_string(),
            emailjs_base_url: "http://localhost:54322".to_string(),
        }
    }
}

impl TestConfig {
    /// Point both the store and the e-mail gateway at a mock server.
    pub fn with_mock_server(uri: &str) -> Self {
        Self {
            store_url: uri.to_string(),
            emailjs_base_url: uri.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            store_url: self.store_url.clone(),
            store_anon_key: self.store_anon_key.clone(),
            admin_password: self.admin_password.clone(),
            emailjs_service_id: "service_test".to_string(),
            emailjs_template_id: "template_test".to_string(),
            emailjs_public_key: "public_test".to_string(),
            emailjs_base_url: self.emailjs_base_url.clone(),
            business_open_hour: 6,
            business_close_hour: 16,
            slot_granularity_minutes: 30,
            min_lead_days: 7,
            size_small_max_minutes: 60,
            size_medium_max_minutes: 180,
            bind_addr: "127.0.0.1:0".to_string(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Canned rows as the store returns them.
pub struct MockStoreResponses;

impl MockStoreResponses {
    /// A current-format appointment row. `procedures` is a list of
    /// `(id, name, duration_minutes, category)`.
    pub fn appointment_record(
        id: Uuid,
        procedures: &[(&str, &str, u32, &str)],
        scheduled_start: &str,
        status: &str,
    ) -> Value {
        let total: u32 = procedures.iter().map(|p| p.2).sum();
        let procedures: Vec<Value> = procedures
            .iter()
            .map(|(pid, name, duration, category)| {
                json!({
                    "id": pid,
                    "name": name,
                    "duration": duration,
                    "category": category
                })
            })
            .collect();

        json!({
            "id": id,
            "patient_name": "Ana López",
            "patient_email": "ana.lopez@example.com",
            "patient_phone": "+52 55 1234 5678",
            "procedures": procedures,
            "total_duration": total,
            "scheduled_start": scheduled_start,
            "status": status,
            "created_at": "2026-10-01T12:00:00Z"
        })
    }

    /// A row written before multi-procedure bookings existed: one surgery,
    /// camelCase fields and no procedure list.
    pub fn legacy_appointment_record(
        id: Uuid,
        surgery_id: &str,
        surgery_name: &str,
        duration: u32,
        scheduled_start: &str,
        status: &str,
    ) -> Value {
        json!({
            "id": id,
            "patientName": "Juan Pérez García",
            "patientEmail": "juan.perez@example.com",
            "patientPhone": "+52 55 9876 5432",
            "surgeryId": surgery_id,
            "surgeryName": surgery_name,
            "duration": duration,
            "scheduled_start": scheduled_start,
            "status": status
        })
    }

    pub fn blocked_date_record(date: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "date": date,
            "reason": "Día festivo",
            "is_full_day": true
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "message": message,
            "code": code
        })
    }
}

// libs/appointment-cell/src/services/validation.rs
use regex::Regex;
use tracing::debug;

use scheduling_cell::models::PatientContact;

use crate::models::AppointmentError;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE_PATTERN: &str = r"^[\d\s\-+()]{10,}$";
const MIN_NAME_CHARS: usize = 3;

/// Checks the wizard's contact form before anything reaches the store.
pub struct ContactValidator {
    email_regex: Regex,
    phone_regex: Regex,
}

impl ContactValidator {
    pub fn new() -> Result<Self, AppointmentError> {
        let email_regex = Regex::new(EMAIL_PATTERN)
            .map_err(|e| AppointmentError::ValidationError(format!("invalid email pattern: {}", e)))?;
        let phone_regex = Regex::new(PHONE_PATTERN)
            .map_err(|e| AppointmentError::ValidationError(format!("invalid phone pattern: {}", e)))?;

        Ok(Self { email_regex, phone_regex })
    }

    /// Trimmed contact with a lower-cased e-mail, or the first failing field.
    pub fn validate(&self, name: &str, email: &str, phone: &str) -> Result<PatientContact, AppointmentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppointmentError::ValidationError("El nombre es requerido".to_string()));
        }
        if name.chars().count() < MIN_NAME_CHARS {
            return Err(AppointmentError::ValidationError(
                "El nombre debe tener al menos 3 caracteres".to_string(),
            ));
        }

        let email = email.trim();
        if email.is_empty() {
            return Err(AppointmentError::ValidationError("El correo es requerido".to_string()));
        }
        if !self.email_regex.is_match(email) {
            return Err(AppointmentError::ValidationError("Ingresa un correo válido".to_string()));
        }

        let phone = phone.trim();
        if phone.is_empty() {
            return Err(AppointmentError::ValidationError("El teléfono es requerido".to_string()));
        }
        let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
        if !self.phone_regex.is_match(&compact) {
            return Err(AppointmentError::ValidationError("Ingresa un teléfono válido".to_string()));
        }

        debug!("Contact details validated");
        Ok(PatientContact {
            name: name.to_string(),
            email: email.to_lowercase(),
            phone: phone.to_string(),
        })
    }
}

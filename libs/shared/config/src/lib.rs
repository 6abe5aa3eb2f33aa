use std::env;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_url: String,
    pub store_anon_key: String,
    pub admin_password: String,
    pub emailjs_service_id: String,
    pub emailjs_template_id: String,
    pub emailjs_public_key: String,
    pub emailjs_base_url: String,
    pub business_open_hour: u32,
    pub business_close_hour: u32,
    pub slot_granularity_minutes: u32,
    pub min_lead_days: u32,
    pub size_small_max_minutes: u32,
    pub size_medium_max_minutes: u32,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            store_url: env::var("STORE_URL")
                .unwrap_or_else(|_| {
                    warn!("STORE_URL not set, using empty value");
                    String::new()
                }),
            store_anon_key: env::var("STORE_ANON_KEY")
                .unwrap_or_else(|_| {
                    warn!("STORE_ANON_KEY not set, using empty value");
                    String::new()
                }),
            admin_password: env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| {
                    warn!("ADMIN_PASSWORD not set, using the built-in default");
                    "admin123".to_string()
                }),
            emailjs_service_id: env::var("EMAILJS_SERVICE_ID")
                .unwrap_or_else(|_| {
                    warn!("EMAILJS_SERVICE_ID not set, confirmation emails disabled");
                    String::new()
                }),
            emailjs_template_id: env::var("EMAILJS_TEMPLATE_ID")
                .unwrap_or_else(|_| {
                    warn!("EMAILJS_TEMPLATE_ID not set, confirmation emails disabled");
                    String::new()
                }),
            emailjs_public_key: env::var("EMAILJS_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("EMAILJS_PUBLIC_KEY not set, confirmation emails disabled");
                    String::new()
                }),
            emailjs_base_url: env::var("EMAILJS_BASE_URL")
                .unwrap_or_else(|_| "https://api.emailjs.com".to_string()),
            business_open_hour: parse_var("BUSINESS_OPEN_HOUR", 6),
            business_close_hour: parse_var("BUSINESS_CLOSE_HOUR", 16),
            slot_granularity_minutes: parse_var("SLOT_GRANULARITY_MINUTES", 30),
            min_lead_days: parse_var("MIN_LEAD_DAYS", 7),
            size_small_max_minutes: parse_var("SIZE_SMALL_MAX_MINUTES", 60),
            size_medium_max_minutes: parse_var("SIZE_MEDIUM_MAX_MINUTES", 180),
            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.store_url.is_empty() && !self.store_anon_key.is_empty()
    }

    pub fn is_email_configured(&self) -> bool {
        !self.emailjs_service_id.is_empty()
            && !self.emailjs_template_id.is_empty()
            && !self.emailjs_public_key.is_empty()
    }
}

fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

// libs/procedure-cell/src/models.rs
use serde::{Deserialize, Serialize};
use std::fmt;

// ==============================================================================
// PROCEDURE MODELS
// ==============================================================================

/// A single surgical offering. Immutable once the catalogue is loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Procedure {
    pub id: String,
    pub name: String,
    pub duration_minutes: u32,
    pub category: ProcedureCategory,
    pub size: SizeClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Procedure {
    /// Build a procedure, deriving its size class from the duration.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        duration_minutes: u32,
        category: ProcedureCategory,
        thresholds: &SizeThresholds,
    ) -> Result<Self, CatalogueError> {
        let id = id.into();
        if duration_minutes == 0 {
            return Err(CatalogueError::InvalidDuration { id });
        }

        Ok(Self {
            id,
            name: name.into(),
            duration_minutes,
            category,
            size: thresholds.classify(duration_minutes),
            description: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn surgery_type(&self) -> SurgeryType {
        self.category.surgery_type()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ProcedureCategory {
    Facial,
    Corporal,
    #[serde(rename = "Bariatría", alias = "Bariatria", alias = "bariatric")]
    Bariatric,
}

impl ProcedureCategory {
    pub fn surgery_type(&self) -> SurgeryType {
        match self {
            ProcedureCategory::Facial | ProcedureCategory::Corporal => SurgeryType::Plastic,
            ProcedureCategory::Bariatric => SurgeryType::Bariatric,
        }
    }
}

impl fmt::Display for ProcedureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcedureCategory::Facial => write!(f, "Facial"),
            ProcedureCategory::Corporal => write!(f, "Corporal"),
            ProcedureCategory::Bariatric => write!(f, "Bariatría"),
        }
    }
}

/// The two surgery classes a weekday can be reserved for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SurgeryType {
    Plastic,
    Bariatric,
}

impl SurgeryType {
    pub fn label(&self) -> &'static str {
        match self {
            SurgeryType::Plastic => "Cirugías Plásticas",
            SurgeryType::Bariatric => "Cirugías Bariátricas",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    pub const ALL: [SizeClass; 3] = [SizeClass::Large, SizeClass::Medium, SizeClass::Small];

    pub fn label(&self) -> &'static str {
        match self {
            SizeClass::Small => "Pequeña",
            SizeClass::Medium => "Mediana",
            SizeClass::Large => "Grande",
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeClass::Small => write!(f, "small"),
            SizeClass::Medium => write!(f, "medium"),
            SizeClass::Large => write!(f, "large"),
        }
    }
}

/// Duration cut-offs for the size classes: `<= small_max` is small,
/// `<= medium_max` is medium, anything longer is large.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SizeThresholds {
    pub small_max_minutes: u32,
    pub medium_max_minutes: u32,
}

impl Default for SizeThresholds {
    fn default() -> Self {
        Self {
            small_max_minutes: 60,
            medium_max_minutes: 180,
        }
    }
}

impl SizeThresholds {
    pub fn classify(&self, duration_minutes: u32) -> SizeClass {
        if duration_minutes <= self.small_max_minutes {
            SizeClass::Small
        } else if duration_minutes <= self.medium_max_minutes {
            SizeClass::Medium
        } else {
            SizeClass::Large
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogueError {
    #[error("Procedure not found: {0}")]
    UnknownProcedure(String),

    #[error("Procedure {id} must have a positive duration")]
    InvalidDuration { id: String },

    #[error("Duplicate procedure id: {0}")]
    DuplicateId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_thresholds_boundaries() {
        let thresholds = SizeThresholds::default();

        assert_eq!(thresholds.classify(1), SizeClass::Small);
        assert_eq!(thresholds.classify(60), SizeClass::Small);
        assert_eq!(thresholds.classify(61), SizeClass::Medium);
        assert_eq!(thresholds.classify(180), SizeClass::Medium);
        assert_eq!(thresholds.classify(181), SizeClass::Large);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let result = Procedure::new("x", "X", 0, ProcedureCategory::Facial, &SizeThresholds::default());
        assert_eq!(result, Err(CatalogueError::InvalidDuration { id: "x".to_string() }));
    }

    #[test]
    fn test_category_serde_uses_clinic_names() {
        let json = serde_json::to_string(&ProcedureCategory::Bariatric).unwrap();
        assert_eq!(json, "\"Bariatría\"");

        let parsed: ProcedureCategory = serde_json::from_str("\"Bariatria\"").unwrap();
        assert_eq!(parsed, ProcedureCategory::Bariatric);
    }

    #[test]
    fn test_surgery_type_mapping() {
        assert_eq!(ProcedureCategory::Facial.surgery_type(), SurgeryType::Plastic);
        assert_eq!(ProcedureCategory::Corporal.surgery_type(), SurgeryType::Plastic);
        assert_eq!(ProcedureCategory::Bariatric.surgery_type(), SurgeryType::Bariatric);
    }
}
